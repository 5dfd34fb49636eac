//! Bot webhook receiver: accepts platform updates, relays channel previews back to
//! chats and serves static assets.

mod api;
mod assets;
mod types;
mod webhook;

pub use self::api::{BotApi, API_BASE};
pub use self::assets::{Asset, AssetStore};
pub use self::types::*;
pub use self::webhook::{
    channel_reply, public_link, respond, router, serve, validate_secret, BotState, LOGO_ASSET,
    SECRET_HEADER, WELCOME_ASSET,
};
