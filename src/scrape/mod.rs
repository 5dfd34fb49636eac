//! Channel page scraping for tgscout.
//!
//! This module fetches public channel pages, extracts post texts and drives the
//! sequential scan over a channel list.

mod client;
mod diagnostics;
mod fetcher;
mod parser;
mod preview;
mod types;


pub use self::types::*;

pub use self::client::create_http_client;
pub use self::diagnostics::test_channel;
pub use self::fetcher::{run_all, ChannelFetcher};
pub use self::parser::parse_channel_page;
pub use self::preview::preview;
