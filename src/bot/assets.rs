//! Static text and image files served by name.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::TARGET_BOT;

/// A resolved asset ready to be read and served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: PathBuf,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a requested name to a file under the asset root.
    ///
    /// Only bare file names with a known extension are served; anything that could
    /// walk out of the root, or a hidden file, resolves to `None`.
    pub fn resolve(&self, name: &str) -> Option<Asset> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..")
        {
            debug!(target: TARGET_BOT, "Refusing asset name {:?}", name);
            return None;
        }

        let content_type = content_type_for(name)?;
        let path = self.root.join(name);
        if !path.is_file() {
            return None;
        }

        Some(Asset { path, content_type })
    }

    /// Load a text asset, or `None` when it is missing, not text, or unreadable.
    pub async fn read_text(&self, name: &str) -> Option<String> {
        let asset = self.resolve(name)?;
        if !asset.content_type.starts_with("text/") {
            return None;
        }
        tokio::fs::read_to_string(&asset.path).await.ok()
    }
}

fn content_type_for(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "txt" => Some("text/plain; charset=utf-8"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
