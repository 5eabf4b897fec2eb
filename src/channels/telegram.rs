//! Telegram channel — long-polls the Bot API for posts in one broadcast channel.
//!
//! The bot must be a member (admin) of the channel for `channel_post`
//! updates to be delivered.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::error::ChannelError;

/// Long-poll timeout passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Delay before retrying after a failed poll.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Identifies the channel to follow: `@username` or numeric chat id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    Username(String),
    Id(i64),
}

impl ChannelTarget {
    /// Parse a configured channel. Numeric strings are chat ids, anything else
    /// is a username with or without the leading `@`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Username(raw.trim_start_matches('@').to_string()),
        }
    }

    /// Value for the Bot API `chat_id` parameter.
    pub fn chat_id_param(&self) -> serde_json::Value {
        match self {
            Self::Username(name) => serde_json::Value::String(format!("@{name}")),
            Self::Id(id) => serde_json::Value::from(*id),
        }
    }

    /// Whether a Bot API `chat` object is this channel. Usernames compare
    /// case-insensitively, as Telegram treats them.
    pub fn matches(&self, chat: &serde_json::Value) -> bool {
        match self {
            Self::Username(name) => chat
                .get("username")
                .and_then(serde_json::Value::as_str)
                .is_some_and(|u| u.eq_ignore_ascii_case(name)),
            Self::Id(id) => chat.get("id").and_then(serde_json::Value::as_i64) == Some(*id),
        }
    }
}

/// Telegram channel — follows a broadcast channel via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    target: ChannelTarget,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString, channel: &str) -> Self {
        Self {
            bot_token,
            target: ChannelTarget::parse(channel),
            client: reqwest::Client::new(),
        }
    }

    pub fn target(&self) -> &ChannelTarget {
        &self.target
    }

    fn api_url(&self, method: &str) -> String {
        bot_api_url(self.bot_token.expose_secret(), method)
    }
}

fn bot_api_url(token: &str, method: &str) -> String {
    format!("https://api.telegram.org/bot{token}/{method}")
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let target = self.target.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!(channel = ?target, "Telegram channel listening for posts...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["channel_post"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        // reqwest errors carry the URL, which holds the token.
                        tracing::warn!("Telegram poll error: {}", e.without_url());
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {}", e.without_url());
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                };

                let results = match update_results(&data) {
                    Ok(results) => results,
                    Err(reason) => {
                        tracing::warn!(reason, "Telegram getUpdates rejected");
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                };

                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64) {
                        offset = uid + 1;
                    }

                    let Some(incoming) = parse_channel_post(update, &target) else {
                        continue;
                    };

                    if tx.send(incoming).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url("getChat"))
            .json(&serde_json::json!({ "chat_id": self.target.chat_id_param() }))
            .send()
            .await
            .map_err(|e| ChannelError::HealthCheckFailed {
                name: "telegram".into(),
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        let data: serde_json::Value =
            resp.json()
                .await
                .map_err(|e| ChannelError::HealthCheckFailed {
                    name: "telegram".into(),
                    reason: e.without_url().to_string(),
                })?;

        if !status.is_success() {
            let description = data
                .get("description")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            return Err(ChannelError::HealthCheckFailed {
                name: "telegram".into(),
                reason: format!("getChat returned {status}: {description}"),
            });
        }

        let title = data
            .get("result")
            .and_then(|r| r.get("title"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("(untitled)");
        tracing::info!(title, "Connected to Telegram channel");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// The `result` array of a getUpdates reply. An `ok: false` reply or one
/// without a `result` array is an error, and the caller backs off.
fn update_results(data: &serde_json::Value) -> Result<&Vec<serde_json::Value>, &str> {
    if data.get("ok").and_then(serde_json::Value::as_bool) == Some(false) {
        return Err(data
            .get("description")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error"));
    }
    data.get("result")
        .and_then(serde_json::Value::as_array)
        .ok_or("reply has no result array")
}

/// Turn a getUpdates entry into a message if it is a text (or captioned)
/// post in the target channel.
fn parse_channel_post(
    update: &serde_json::Value,
    target: &ChannelTarget,
) -> Option<IncomingMessage> {
    let post = update.get("channel_post")?;
    let chat = post.get("chat")?;

    if !target.matches(chat) {
        tracing::debug!(
            chat_id = chat.get("id").and_then(serde_json::Value::as_i64),
            "Ignoring post from another channel"
        );
        return None;
    }

    let text = post
        .get("text")
        .or_else(|| post.get("caption"))
        .and_then(serde_json::Value::as_str)?;

    let chat_id = chat
        .get("id")
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string())
        .unwrap_or_default();
    let username = chat.get("username").and_then(serde_json::Value::as_str);

    let mut incoming = IncomingMessage::new("telegram", &chat_id, text).with_metadata(
        serde_json::json!({
            "chat_id": chat_id,
            "username": username,
            "message_id": post.get("message_id"),
        }),
    );
    if let Some(title) = chat.get("title").and_then(serde_json::Value::as_str) {
        incoming = incoming.with_user_name(title);
    }
    if let Some(sent) = post
        .get("date")
        .and_then(serde_json::Value::as_i64)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        incoming = incoming.with_received_at(sent);
    }

    Some(incoming)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn post(chat: serde_json::Value, text: &str) -> serde_json::Value {
        serde_json::json!({
            "update_id": 1001,
            "channel_post": {
                "message_id": 77,
                "date": 1_700_000_000,
                "chat": chat,
                "text": text
            }
        })
    }

    #[test]
    fn update_results_returns_result_array() {
        let data = serde_json::json!({"ok": true, "result": [{"update_id": 1}]});
        assert_eq!(update_results(&data).unwrap().len(), 1);
    }

    #[test]
    fn update_results_rejects_not_ok() {
        let data = serde_json::json!({"ok": false, "description": "Unauthorized"});
        assert_eq!(update_results(&data), Err("Unauthorized"));
    }

    #[test]
    fn update_results_rejects_missing_result() {
        let data = serde_json::json!({"ok": true});
        assert!(update_results(&data).is_err());
        let data = serde_json::json!({"ok": true, "result": {"update_id": 1}});
        assert!(update_results(&data).is_err());
    }

    fn signals_chat() -> serde_json::Value {
        serde_json::json!({
            "id": -1001234567890i64,
            "title": "Signals Crypto Global",
            "username": "signalscryptoglobal",
            "type": "channel"
        })
    }

    #[test]
    fn telegram_channel_name() {
        let ch = TelegramChannel::new(SecretString::from("fake-token"), "@signals");
        assert_eq!(ch.name(), "telegram");
    }

    #[test]
    fn telegram_api_url() {
        let ch = TelegramChannel::new(SecretString::from("123:ABC"), "@signals");
        assert_eq!(
            ch.api_url("getChat"),
            "https://api.telegram.org/bot123:ABC/getChat"
        );
    }

    // ── Channel target tests ────────────────────────────────────────

    #[test]
    fn target_parses_username() {
        assert_eq!(
            ChannelTarget::parse("@signalscryptoglobal"),
            ChannelTarget::Username("signalscryptoglobal".into())
        );
        assert_eq!(
            ChannelTarget::parse("signalscryptoglobal"),
            ChannelTarget::Username("signalscryptoglobal".into())
        );
    }

    #[test]
    fn target_parses_numeric_id() {
        assert_eq!(
            ChannelTarget::parse("-1001234567890"),
            ChannelTarget::Id(-1001234567890)
        );
    }

    #[test]
    fn target_chat_id_param() {
        assert_eq!(
            ChannelTarget::parse("signals").chat_id_param(),
            serde_json::json!("@signals")
        );
        assert_eq!(
            ChannelTarget::parse("-100").chat_id_param(),
            serde_json::json!(-100)
        );
    }

    #[test]
    fn target_matches_username_case_insensitive() {
        let target = ChannelTarget::parse("@SignalsCryptoGlobal");
        assert!(target.matches(&signals_chat()));
    }

    #[test]
    fn target_matches_id() {
        let target = ChannelTarget::parse("-1001234567890");
        assert!(target.matches(&signals_chat()));
        assert!(!ChannelTarget::parse("-1009").matches(&signals_chat()));
    }

    #[test]
    fn target_username_exact_not_substring() {
        let target = ChannelTarget::parse("@signals");
        assert!(!target.matches(&signals_chat()));
    }

    // ── Update parsing tests ────────────────────────────────────────

    #[test]
    fn parses_post_from_target_channel() {
        let target = ChannelTarget::parse("@signalscryptoglobal");
        let msg = parse_channel_post(&post(signals_chat(), "$SOL Entry: 20.5 TP 22"), &target)
            .unwrap();
        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.content, "$SOL Entry: 20.5 TP 22");
        assert_eq!(msg.user_id, "-1001234567890");
        assert_eq!(msg.user_name.as_deref(), Some("Signals Crypto Global"));
        assert_eq!(msg.metadata["message_id"], 77);
        assert_eq!(msg.received_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn ignores_other_channels() {
        let target = ChannelTarget::parse("@elsewhere");
        assert!(parse_channel_post(&post(signals_chat(), "hi"), &target).is_none());
    }

    #[test]
    fn ignores_non_channel_updates() {
        let target = ChannelTarget::parse("@signalscryptoglobal");
        let update = serde_json::json!({
            "update_id": 5,
            "message": { "chat": signals_chat(), "text": "direct" }
        });
        assert!(parse_channel_post(&update, &target).is_none());
    }

    #[test]
    fn uses_caption_for_media_posts() {
        let target = ChannelTarget::parse("@signalscryptoglobal");
        let update = serde_json::json!({
            "update_id": 6,
            "channel_post": {
                "message_id": 78,
                "chat": signals_chat(),
                "photo": [],
                "caption": "$BTC Entry 60000 TP 62000"
            }
        });
        let msg = parse_channel_post(&update, &target).unwrap();
        assert_eq!(msg.content, "$BTC Entry 60000 TP 62000");
    }

    #[test]
    fn skips_posts_without_text() {
        let target = ChannelTarget::parse("@signalscryptoglobal");
        let update = serde_json::json!({
            "update_id": 7,
            "channel_post": { "message_id": 79, "chat": signals_chat(), "sticker": {} }
        });
        assert!(parse_channel_post(&update, &target).is_none());
    }

    // ── Network error tests (expected to fail with no server) ───────

    #[tokio::test]
    async fn telegram_health_check_fails_with_fake_token() {
        let ch = TelegramChannel::new(SecretString::from("fake-token"), "@signals");
        let err = ch.health_check().await.unwrap_err();
        assert!(!err.to_string().contains("fake-token"));
    }
}
