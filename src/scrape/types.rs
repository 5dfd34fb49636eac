//! Type definitions and constants for the channel scraper.

use serde::Serialize;
use thiserror::Error;
use tokio::time::Duration;

/// Why a channel produced no posts. The `Display` form is the diagnostic line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Ошибка: {url} вернул статус {status}")]
    BadStatus { url: String, status: u16 },
    #[error("Канал @{username} не найден или недоступен")]
    NotAChannel { username: String },
    #[error("Ошибка при запросе {url}: {detail}")]
    Transport { url: String, detail: String },
}

/// Diagnostic status codes for channel testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChannelStatus {
    Success,
    BadStatus,
    NotAChannel,
    RequestFailed,
}

impl From<&FetchError> for ChannelStatus {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::BadStatus { .. } => ChannelStatus::BadStatus,
            FetchError::NotAChannel { .. } => ChannelStatus::NotAChannel,
            FetchError::Transport { .. } => ChannelStatus::RequestFailed,
        }
    }
}

/// Detailed results of probing a single channel page
#[derive(Debug, Clone, Serialize)]
pub struct TestChannelResult {
    pub username: String,
    pub url: String,
    pub status: ChannelStatus,
    pub http_status: Option<u16>,
    pub containers_found: usize,
    pub posts: Vec<String>,
    pub elapsed_ms: u128,
    pub errors: Vec<String>,
}

/// What one parsed channel page contained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPage {
    /// Number of message containers, text or not.
    pub containers: usize,
    /// Trimmed text of every container that has a text block, in document order.
    pub posts: Vec<String>,
}

/// Knobs for the sequential scan loop.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub delay: Duration,
    pub preview_posts: usize,
    pub preview_chars: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            delay: CHANNEL_DELAY,
            preview_posts: PREVIEW_POSTS,
            preview_chars: PREVIEW_CHARS,
        }
    }
}

/// Totals for a finished scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub channels: usize,
    pub posts: usize,
    pub failed: usize,
}

// Page markup markers. These belong to the remote site and change on its schedule, not ours.
pub const MESSAGE_SELECTOR: &str = "div.tgme_widget_message";
pub const MESSAGE_TEXT_SELECTOR: &str = ".tgme_widget_message_text";

// Constants
pub const CHANNEL_URL_BASE: &str = "https://t.me/s/";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const CHANNEL_DELAY: Duration = Duration::from_secs(1);
pub const PREVIEW_POSTS: usize = 3;
pub const PREVIEW_CHARS: usize = 100;
pub const PREVIEW_ELLIPSIS: &str = "...";
