//! Post extraction from a channel's public page.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::types::{ChannelPage, MESSAGE_SELECTOR, MESSAGE_TEXT_SELECTOR};

static MESSAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(MESSAGE_SELECTOR).expect("message selector is valid CSS"));
static MESSAGE_TEXT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(MESSAGE_TEXT_SELECTOR).expect("message text selector is valid CSS")
});

/// Parse a channel page and collect the text of every message that has one.
///
/// Messages without a text block (photos, stickers, polls) are skipped rather than
/// reported as empty strings. Only the first text block inside a message is used.
pub fn parse_channel_page(html: &str) -> ChannelPage {
    let document = Html::parse_document(html);
    let mut page = ChannelPage::default();

    for message in document.select(&MESSAGE) {
        page.containers += 1;
        if let Some(text) = message.select(&MESSAGE_TEXT).next() {
            page.posts
                .push(text.text().collect::<String>().trim().to_string());
        }
    }

    page
}
