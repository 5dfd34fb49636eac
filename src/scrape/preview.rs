use super::types::PREVIEW_ELLIPSIS;

/// First `max_chars` characters of `text` followed by the ellipsis marker.
///
/// The marker is appended whether or not anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut shown: String = text.chars().take(max_chars).collect();
    shown.push_str(PREVIEW_ELLIPSIS);
    shown
}
