//! Channel fetching and the sequential scan loop.

use anyhow::Result;
use reqwest::StatusCode;
use std::io::{self, Write};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, info, warn};

use super::client::create_http_client;
use super::parser::parse_channel_page;
use super::preview::preview;
use super::types::{FetchError, ScanOptions, ScanSummary, CHANNEL_URL_BASE, REQUEST_TIMEOUT};
use crate::channels::ChannelDescriptor;
use crate::TARGET_WEB_REQUEST;

/// Fetches public channel pages and turns them into post texts.
#[derive(Debug, Clone)]
pub struct ChannelFetcher {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl ChannelFetcher {
    pub fn new() -> Result<Self> {
        Self::with_base_url(CHANNEL_URL_BASE, REQUEST_TIMEOUT)
    }

    /// Build a fetcher against another page root, e.g. a local server in tests.
    /// The username is appended to `base_url` verbatim.
    pub fn with_base_url(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            base_url: base_url.into(),
            request_timeout,
        })
    }

    pub fn channel_url(&self, username: &str) -> String {
        format!("{}{}", self.base_url, username)
    }

    /// Download a page, bounded by the request timeout. Only a 200 counts as success.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        match timeout(self.request_timeout, self.download(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Transport {
                url: url.to_string(),
                detail: format!(
                    "request timed out after {} seconds",
                    self.request_timeout.as_secs_f32()
                ),
            }),
        }
    }

    async fn download(&self, url: &str) -> Result<String, FetchError> {
        let transport = |err: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            detail: err.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        debug!(target: TARGET_WEB_REQUEST, "Request to {} returned status {}", url, status);

        if status != StatusCode::OK {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }

    /// Fetch one channel and report exactly why it yielded nothing when it fails.
    pub async fn fetch_channel(
        &self,
        descriptor: &ChannelDescriptor,
    ) -> Result<Vec<String>, FetchError> {
        let url = self.channel_url(&descriptor.username);
        debug!(target: TARGET_WEB_REQUEST, "Loading channel page {}", url);

        let body = self.fetch_page(&url).await?;
        let page = parse_channel_page(&body);
        debug!(target: TARGET_WEB_REQUEST,
               "Parsed {} message containers ({} with text) from {}",
               page.containers, page.posts.len(), url);

        if page.containers == 0 {
            return Err(FetchError::NotAChannel {
                username: descriptor.username.clone(),
            });
        }

        Ok(page.posts)
    }

    /// Fetch one channel, logging any failure and returning no posts in its place.
    pub async fn fetch_posts(&self, descriptor: &ChannelDescriptor) -> Vec<String> {
        match self.fetch_channel(descriptor).await {
            Ok(posts) => posts,
            Err(err) => {
                log_fetch_error(&err);
                Vec::new()
            }
        }
    }
}

fn log_fetch_error(err: &FetchError) {
    match err {
        FetchError::Transport { .. } => error!(target: TARGET_WEB_REQUEST, "{}", err),
        _ => warn!(target: TARGET_WEB_REQUEST, "{}", err),
    }
}

/// Process every channel in order, one at a time, writing a progress report to `out`.
///
/// A failing channel is reported and counted, then the loop moves on. `options.delay`
/// is waited between consecutive channels, after the previous request has finished.
/// Only a failure to write the report ends the run early.
pub async fn run_all<W: Write>(
    fetcher: &ChannelFetcher,
    channels: &[ChannelDescriptor],
    options: &ScanOptions,
    out: &mut W,
) -> io::Result<ScanSummary> {
    let mut summary = ScanSummary::default();

    for (index, channel) in channels.iter().enumerate() {
        if index > 0 && !options.delay.is_zero() {
            sleep(options.delay).await;
        }

        writeln!(out, "Обрабатываю канал: @{}", channel.username)?;

        let posts = match fetcher.fetch_channel(channel).await {
            Ok(posts) => posts,
            Err(err) => {
                // The report carries the diagnostic; a console warning would repeat it
                debug!(target: TARGET_WEB_REQUEST, "{}", err);
                writeln!(out, "{}", err)?;
                summary.failed += 1;
                Vec::new()
            }
        };

        writeln!(out, "Найдено постов: {}", posts.len())?;
        for (number, post) in posts.iter().take(options.preview_posts).enumerate() {
            writeln!(out, "{}. {}", number + 1, preview(post, options.preview_chars))?;
        }
        out.flush()?;

        summary.channels += 1;
        summary.posts += posts.len();
    }

    info!(target: TARGET_WEB_REQUEST,
          "Scan finished: {} channels, {} posts, {} failed",
          summary.channels, summary.posts, summary.failed);

    Ok(summary)
}
