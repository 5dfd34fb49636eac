//! Single-channel probing for troubleshooting.

use std::time::Instant;

use super::fetcher::ChannelFetcher;
use super::parser::parse_channel_page;
use super::types::{ChannelStatus, FetchError, TestChannelResult};

/// Probe one channel and collect everything observed along the way.
pub async fn test_channel(fetcher: &ChannelFetcher, username: &str) -> TestChannelResult {
    let url = fetcher.channel_url(username);
    let started = Instant::now();

    let mut result = TestChannelResult {
        username: username.to_string(),
        url: url.clone(),
        status: ChannelStatus::Success,
        http_status: None,
        containers_found: 0,
        posts: Vec::new(),
        elapsed_ms: 0,
        errors: Vec::new(),
    };

    match fetcher.fetch_page(&url).await {
        Ok(body) => {
            result.http_status = Some(200);
            let page = parse_channel_page(&body);
            result.containers_found = page.containers;
            result.posts = page.posts;
            if page.containers == 0 {
                let err = FetchError::NotAChannel {
                    username: username.to_string(),
                };
                result.status = ChannelStatus::from(&err);
                result.errors.push(err.to_string());
            }
        }
        Err(err) => {
            if let FetchError::BadStatus { status, .. } = &err {
                result.http_status = Some(*status);
            }
            result.status = ChannelStatus::from(&err);
            result.errors.push(err.to_string());
        }
    }

    result.elapsed_ms = started.elapsed().as_millis();
    result
}
