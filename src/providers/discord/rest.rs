//! Discord REST client
//!
//! Only one call is needed: reply to a message with an embed. Rate limits
//! are reported, not retried.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use super::types::{CreateMessage, Embed, MessageReference};
use crate::core::ports::ReplySink;
use crate::models::{AppError, AppResult, BotConfig, ErrorCode, InboundMessage, Reply};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

const DISCORD_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct DiscordRest {
    client: reqwest::Client,
    api_base: String,
}

impl DiscordRest {
    pub fn new(api_base: &str, token: &str) -> AppResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bot {}", token))
            .map_err(|_| AppError::invalid_config("Bot token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DISCORD_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::invalid_config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &BotConfig) -> AppResult<Self> {
        Self::new(&config.api_base, &config.discord_token)
    }

    /// Post `embed` to `channel_id` as a reply to `message_id`
    pub async fn create_reply(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: Embed,
    ) -> AppResult<()> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let body = CreateMessage {
            embeds: vec![embed],
            message_reference: MessageReference {
                message_id: message_id.to_string(),
                channel_id: channel_id.to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorCode::DiscordRequestFailed, "Reply request failed", e)
            })?;

        let status = response.status();
        debug!(channel_id, status = status.as_u16(), "Reply posted");
        check_status(status)
    }
}

/// Map a REST status to an error code
pub fn check_status(status: StatusCode) -> AppResult<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::TOO_MANY_REQUESTS => Err(AppError::new(
            ErrorCode::DiscordRateLimited,
            "Discord rate limited the reply",
        )),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::new(
            ErrorCode::DiscordAuthFailed,
            format!("Discord rejected the reply: HTTP {}", status),
        )),
        s => Err(AppError::discord_failed(format!("HTTP error {}", s))),
    }
}

#[async_trait::async_trait]
impl ReplySink for DiscordRest {
    async fn send_reply(&self, to: &InboundMessage, reply: &Reply) -> AppResult<()> {
        self.create_reply(&to.channel_id, &to.message_id, Embed::from(reply))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert_eq!(
            check_status(StatusCode::TOO_MANY_REQUESTS).unwrap_err().code,
            ErrorCode::DiscordRateLimited
        );
        assert_eq!(
            check_status(StatusCode::FORBIDDEN).unwrap_err().code,
            ErrorCode::DiscordAuthFailed
        );
        assert_eq!(
            check_status(StatusCode::BAD_GATEWAY).unwrap_err().code,
            ErrorCode::DiscordRequestFailed
        );
    }

    #[test]
    fn test_reply_body_shape() {
        let body = CreateMessage {
            embeds: vec![Embed {
                title: "t".to_string(),
                description: "d".to_string(),
                color: 1,
                fields: vec![],
            }],
            message_reference: MessageReference {
                message_id: "10".to_string(),
                channel_id: "20".to_string(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message_reference"]["message_id"], "10");
        assert_eq!(json["message_reference"]["channel_id"], "20");
        assert_eq!(json["embeds"][0]["title"], "t");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let rest = DiscordRest::new("https://discord.com/api/v10/", "tok").unwrap();
        assert_eq!(rest.api_base, "https://discord.com/api/v10");
    }
}
