use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::types::ApiResponse;
use crate::TARGET_BOT;

pub const API_BASE: &str = "https://api.telegram.org";

/// Minimal client for the bot platform's HTTP API.
#[derive(Clone)]
pub struct BotApi {
    client: Client,
    base_url: String,
    token: String,
}

impl BotApi {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(API_BASE, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call(&self, method: &str, payload: Value) -> Result<()> {
        // The token is part of the URL; errors are stripped of it before they reach a log
        debug!(target: TARGET_BOT, "Calling {} with payload: {}", method, payload);

        let response = self
            .client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Request for {} failed", method))?;

        let status = response.status();
        let body = response
            .json::<ApiResponse>()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Unreadable {} response (status {})", method, status))?;

        if !body.ok {
            return Err(anyhow!(
                "{} rejected: {}",
                method,
                body.description.unwrap_or_else(|| status.to_string())
            ));
        }
        Ok(())
    }

    /// Point the platform at `url`; it will echo `secret_token` in a header on every call.
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let mut payload = json!({ "url": url });
        if let Some(secret) = secret_token {
            payload["secret_token"] = json!(secret);
        }
        self.call("setWebhook", payload).await?;
        info!(target: TARGET_BOT, "Webhook registered at {}", url);
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<()> {
        self.call("deleteWebhook", json!({})).await?;
        info!(target: TARGET_BOT, "Webhook removed");
        Ok(())
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "disable_web_page_preview": true,
            }),
        )
        .await
    }

    pub async fn send_photo(&self, chat_id: i64, photo_url: &str, caption: Option<&str>) -> Result<()> {
        let mut payload = json!({ "chat_id": chat_id, "photo": photo_url });
        if let Some(caption) = caption {
            payload["caption"] = json!(caption);
        }
        self.call("sendPhoto", payload).await
    }
}
