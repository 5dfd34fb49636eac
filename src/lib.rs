pub mod bot;
pub mod channels;
pub mod environment;
pub mod logging;
pub mod scrape;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_BOT: &str = "bot";
