//! Loading the list of channels to scan.
//!
//! The list is a JSON document, either a bare array of objects or an object with a
//! `channels` array. Each object needs a `username`; anything else is ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// One public channel to fetch, identified by its username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub username: String,
}

impl ChannelDescriptor {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChannelList {
    Bare(Vec<ChannelDescriptor>),
    Wrapped { channels: Vec<ChannelDescriptor> },
}

/// Parse a channel list document. Usernames are trimmed and stripped of a leading `@`;
/// entries left empty are skipped. Order and duplicates are kept as written.
pub fn parse_channels(json: &str) -> Result<Vec<ChannelDescriptor>> {
    let list: ChannelList =
        serde_json::from_str(json).context("Channel list is not a list of {\"username\": ...} objects")?;
    let raw = match list {
        ChannelList::Bare(channels) => channels,
        ChannelList::Wrapped { channels } => channels,
    };

    Ok(channels_from_list(raw.into_iter().map(|c| c.username)))
}

/// Read and parse the channel list file at `path`.
pub fn load_channels(path: impl AsRef<Path>) -> Result<Vec<ChannelDescriptor>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read channel list {}", path.display()))?;
    let channels = parse_channels(&json)
        .with_context(|| format!("Failed to parse channel list {}", path.display()))?;
    debug!("Loaded {} channels from {}", channels.len(), path.display());
    Ok(channels)
}

/// Build descriptors from plain usernames, applying the same cleanup as [`parse_channels`].
pub fn channels_from_list<I, S>(names: I) -> Vec<ChannelDescriptor>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let username = normalize_username(name.as_ref());
            if username.is_empty() {
                warn!("Skipping channel entry with an empty username");
                None
            } else {
                Some(ChannelDescriptor::new(username))
            }
        })
        .collect()
}

/// Whether `username` is a plain channel handle: ASCII letters, digits and underscores only.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn normalize_username(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).trim()
}
