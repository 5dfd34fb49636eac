//! Inbound webhook receiver and static asset routes.

use anyhow::{bail, Context, Result};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use ring::constant_time;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info, warn};

use super::api::BotApi;
use super::assets::AssetStore;
use super::types::{Command, Update};
use crate::channels::ChannelDescriptor;
use crate::scrape::{preview, ChannelFetcher, PREVIEW_CHARS, PREVIEW_POSTS};
use crate::TARGET_BOT;

/// Header the platform echoes back with the secret given at registration.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";
pub const WELCOME_ASSET: &str = "welcome.txt";
pub const LOGO_ASSET: &str = "logo.png";

const DEFAULT_WELCOME: &str =
    "Привет! Я показываю последние посты публичных каналов. Отправьте /channel <username>.";
const HELP_TEXT: &str = "Команды:\n/channel <username> - последние посты канала\n/logo - логотип\n/help - эта справка";
const LOGO_UNAVAILABLE: &str = "Логотип недоступен";

/// Everything the webhook handlers share.
pub struct BotState {
    pub api: BotApi,
    pub fetcher: ChannelFetcher,
    pub assets: AssetStore,
    pub secret: String,
    /// Externally reachable root of this server, used to link assets.
    pub public_url: Option<String>,
}

pub fn router(state: Arc<BotState>) -> Router {
    Router::new()
        .route("/webhook/{secret}", post(receive_update))
        .route("/static/{name}", get(serve_asset))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: Arc<BotState>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(target: TARGET_BOT, "Webhook receiver running on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;

    info!(target: TARGET_BOT, "Webhook receiver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_err() {
        error!(target: TARGET_BOT, "Failed to listen for ctrl-c");
    }
}

/// Check a webhook secret before it is used as a path segment and header value:
/// 1 to 256 characters from `A-Z`, `a-z`, `0-9`, `_` and `-`.
pub fn validate_secret(secret: &str) -> Result<()> {
    let valid_chars = secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if secret.is_empty() || secret.len() > 256 || !valid_chars {
        bail!("Webhook secret must be 1-256 characters of A-Z, a-z, 0-9, _ or -");
    }
    Ok(())
}

fn secret_matches(expected: &str, presented: &[u8]) -> bool {
    constant_time::verify_slices_are_equal(expected.as_bytes(), presented).is_ok()
}

/// Join `path` onto the public root, keeping any path prefix the root already has.
pub fn public_link(public_url: &str, path: &str) -> Result<String> {
    let mut base = url::Url::parse(public_url)
        .with_context(|| format!("Invalid public URL: {}", public_url))?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base
        .join(path)
        .with_context(|| format!("Cannot append {} to {}", path, public_url))?
        .to_string())
}

async fn health() -> &'static str {
    "ok"
}

async fn receive_update(
    State(state): State<Arc<BotState>>,
    Path(secret): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !secret_matches(&state.secret, secret.as_bytes()) {
        warn!(target: TARGET_BOT, "Webhook call with unknown path secret");
        return StatusCode::NOT_FOUND;
    }
    if let Some(token) = headers.get(SECRET_HEADER) {
        if !secret_matches(&state.secret, token.as_bytes()) {
            warn!(target: TARGET_BOT, "Webhook call with mismatched secret header");
            return StatusCode::UNAUTHORIZED;
        }
    }

    // Answering with an error makes the platform redeliver forever, so bad payloads are dropped
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(err) => {
            warn!(target: TARGET_BOT, "Dropping unreadable update: {}", err);
            return StatusCode::OK;
        }
    };
    debug!(target: TARGET_BOT, "Received update {}", update.update_id);

    let Some(message) = update.message else {
        return StatusCode::OK;
    };
    let Some(text) = message.text else {
        return StatusCode::OK;
    };

    let chat_id = message.chat.id;
    let command = Command::parse(&text);
    info!(target: TARGET_BOT, "Chat {} sent {:?}", chat_id, command);

    tokio::spawn(async move {
        if let Err(err) = respond(&state, chat_id, command).await {
            error!(target: TARGET_BOT, "Failed to answer chat {}: {:#}", chat_id, err);
        }
    });

    StatusCode::OK
}

/// Carry out one command and send the answer to `chat_id`.
pub async fn respond(state: &BotState, chat_id: i64, command: Command) -> Result<()> {
    match command {
        Command::Start => {
            let text = state
                .assets
                .read_text(WELCOME_ASSET)
                .await
                .unwrap_or_else(|| DEFAULT_WELCOME.to_string());
            state.api.send_message(chat_id, text.trim()).await
        }
        Command::Channel(username) => {
            let reply = channel_reply(&state.fetcher, &username).await;
            state.api.send_message(chat_id, &reply).await
        }
        Command::Logo => match (&state.public_url, state.assets.resolve(LOGO_ASSET)) {
            (Some(public_url), Some(_)) => {
                let link = public_link(public_url, &format!("static/{}", LOGO_ASSET))?;
                state.api.send_photo(chat_id, &link, None).await
            }
            _ => state.api.send_message(chat_id, LOGO_UNAVAILABLE).await,
        },
        Command::Help | Command::Unknown => state.api.send_message(chat_id, HELP_TEXT).await,
    }
}

/// The channel preview relayed to a chat: the post count and the first few posts,
/// or the diagnostic when the channel could not be read.
pub async fn channel_reply(fetcher: &ChannelFetcher, username: &str) -> String {
    match fetcher
        .fetch_channel(&ChannelDescriptor::new(username))
        .await
    {
        Ok(posts) => {
            let mut lines = vec![format!("Найдено постов: {}", posts.len())];
            for (number, post) in posts.iter().take(PREVIEW_POSTS).enumerate() {
                lines.push(format!("{}. {}", number + 1, preview(post, PREVIEW_CHARS)));
            }
            lines.join("\n")
        }
        Err(err) => {
            warn!(target: TARGET_BOT, "{}", err);
            err.to_string()
        }
    }
}

async fn serve_asset(State(state): State<Arc<BotState>>, Path(name): Path<String>) -> Response {
    let Some(asset) = state.assets.resolve(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&asset.path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, asset.content_type)], bytes).into_response(),
        Err(err) => {
            error!(target: TARGET_BOT, "Failed to read asset {}: {}", asset.path.display(), err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Html;
    use axum::Json;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    type Calls = Arc<Mutex<Vec<(String, Value)>>>;

    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_bot_api() -> (String, Calls) {
        let calls: Calls = Arc::default();
        let recorded = calls.clone();
        let app = Router::new().route(
            "/{token}/{method}",
            post(move |Path((_t, method)): Path<(String, String)>, Json(payload): Json<Value>| {
                let recorded = recorded.clone();
                async move {
                    recorded.lock().unwrap().push((method, payload));
                    Json(json!({"ok": true, "result": true}))
                }
            }),
        );
        (spawn(app).await, calls)
    }

    async fn spawn_channel_site() -> String {
        let app = Router::new().route(
            "/s/{username}",
            get(|| async {
                Html(
                    r#"<div class="tgme_widget_message"><div class="tgme_widget_message_text">Only post</div></div>"#,
                )
            }),
        );
        format!("{}/s/", spawn(app).await)
    }

    struct Harness {
        server: String,
        calls: Calls,
        _assets: tempfile::TempDir,
    }

    async fn harness() -> Harness {
        let (api_base, calls) = spawn_bot_api().await;
        let site = spawn_channel_site().await;
        let assets = tempfile::tempdir().unwrap();
        std::fs::write(assets.path().join("welcome.txt"), "Добро пожаловать\n").unwrap();
        std::fs::write(assets.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let state = Arc::new(BotState {
            api: BotApi::with_base_url(api_base, "123:abc"),
            fetcher: ChannelFetcher::with_base_url(site, Duration::from_secs(5)).unwrap(),
            assets: AssetStore::new(assets.path()),
            secret: "s3cret".to_string(),
            public_url: Some("https://bot.example.com/tg".to_string()),
        });

        Harness {
            server: spawn(router(state)).await,
            calls,
            _assets: assets,
        }
    }

    async fn wait_for_calls(calls: &Calls, count: usize) -> Vec<(String, Value)> {
        for _ in 0..100 {
            if calls.lock().unwrap().len() >= count {
                break;
            }
            sleep(Duration::from_millis(20)).await;
        }
        calls.lock().unwrap().clone()
    }

    fn update(text: &str) -> Value {
        json!({
            "update_id": 1,
            "message": {"message_id": 5, "chat": {"id": 42, "type": "private"}, "text": text}
        })
    }

    #[test]
    fn test_public_link_keeps_prefix() {
        assert_eq!(
            public_link("https://bot.example.com/tg", "webhook/abc").unwrap(),
            "https://bot.example.com/tg/webhook/abc"
        );
        assert_eq!(
            public_link("https://bot.example.com", "static/logo.png").unwrap(),
            "https://bot.example.com/static/logo.png"
        );
        assert!(public_link("not a url", "x").is_err());
    }

    #[test]
    fn test_secret_checks() {
        assert!(validate_secret("s3cret_Value-1").is_ok());
        assert!(validate_secret("").is_err());
        assert!(validate_secret("has/slash").is_err());
        assert!(validate_secret("sp ace").is_err());
        assert!(validate_secret(&"a".repeat(257)).is_err());

        assert!(secret_matches("s3cret", b"s3cret"));
        assert!(!secret_matches("s3cret", b"s3creT"));
        assert!(!secret_matches("s3cret", b"s3cret-longer"));
        assert!(!secret_matches("s3cret", b""));
    }

    #[tokio::test]
    async fn test_webhook_rejects_wrong_secret() {
        let h = harness().await;
        let client = reqwest::Client::new();

        let wrong_path = client
            .post(format!("{}/webhook/nope", h.server))
            .json(&update("/help"))
            .send()
            .await
            .unwrap();
        assert_eq!(wrong_path.status(), 404);

        let prefix_only = client
            .post(format!("{}/webhook/s3cre", h.server))
            .json(&update("/help"))
            .send()
            .await
            .unwrap();
        assert_eq!(prefix_only.status(), 404);

        let wrong_header = client
            .post(format!("{}/webhook/s3cret", h.server))
            .header(SECRET_HEADER, "other")
            .json(&update("/help"))
            .send()
            .await
            .unwrap();
        assert_eq!(wrong_header.status(), 401);

        sleep(Duration::from_millis(100)).await;
        assert!(h.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_channel_command_relays_preview() {
        let h = harness().await;
        let response = reqwest::Client::new()
            .post(format!("{}/webhook/s3cret", h.server))
            .header(SECRET_HEADER, "s3cret")
            .json(&update("/channel @durov"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let calls = wait_for_calls(&h.calls, 1).await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "sendMessage");
        assert_eq!(calls[0].1["chat_id"], 42);
        assert_eq!(calls[0].1["text"], "Найдено постов: 1\n1. Only post...");
    }

    #[tokio::test]
    async fn test_start_and_logo_use_assets() {
        let h = harness().await;
        let client = reqwest::Client::new();

        for text in ["/start", "/logo"] {
            let response = client
                .post(format!("{}/webhook/s3cret", h.server))
                .json(&update(text))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 200);
            wait_for_calls(&h.calls, 1).await;
        }

        let calls = wait_for_calls(&h.calls, 2).await;
        let welcome = calls.iter().find(|(m, _)| m == "sendMessage").unwrap();
        assert_eq!(welcome.1["text"], "Добро пожаловать");
        let photo = calls.iter().find(|(m, _)| m == "sendPhoto").unwrap();
        assert_eq!(photo.1["photo"], "https://bot.example.com/tg/static/logo.png");
    }

    #[tokio::test]
    async fn test_unreadable_or_textless_updates_are_acknowledged() {
        let h = harness().await;
        let client = reqwest::Client::new();

        let garbage = client
            .post(format!("{}/webhook/s3cret", h.server))
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(garbage.status(), 200);

        let no_message = client
            .post(format!("{}/webhook/s3cret", h.server))
            .json(&json!({"update_id": 2, "channel_post": {}}))
            .send()
            .await
            .unwrap();
        assert_eq!(no_message.status(), 200);

        sleep(Duration::from_millis(100)).await;
        assert!(h.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_assets_and_health() {
        let h = harness().await;

        let logo = reqwest::get(format!("{}/static/logo.png", h.server))
            .await
            .unwrap();
        assert_eq!(logo.status(), 200);
        assert_eq!(logo.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(logo.bytes().await.unwrap().as_ref(), &[0x89, b'P', b'N', b'G']);

        let escaped = reqwest::get(format!("{}/static/..%2Fetc%2Fpasswd", h.server))
            .await
            .unwrap();
        assert_eq!(escaped.status(), 404);

        let health = reqwest::get(format!("{}/health", h.server)).await.unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");
    }
}
