//! Chat webhook client posting markdown messages

use super::http::{HttpConfig, describe_transport_error, redact_url};
use crate::models::NotificationMessage;
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("{}", describe_transport_error(.0))]
    Transport(#[from] reqwest::Error),
}

/// `{"msgtype": "markdown", "markdown": {"title": ..., "text": ...}}`
#[derive(Debug, Serialize)]
pub struct MarkdownPayload<'a> {
    pub msgtype: &'static str,
    pub markdown: MarkdownBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct MarkdownBody<'a> {
    pub title: &'a str,
    pub text: &'a str,
}

impl<'a> From<&'a NotificationMessage> for MarkdownPayload<'a> {
    fn from(message: &'a NotificationMessage) -> Self {
        Self {
            msgtype: "markdown",
            markdown: MarkdownBody {
                title: &message.title,
                text: &message.text,
            },
        }
    }
}

/// Application-level acknowledgement some webhook hosts return with HTTP 200
#[derive(Debug, Deserialize)]
struct WebhookAck {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, config: &HttpConfig) -> Result<Self, WebhookError> {
        Ok(Self {
            http: config.client()?,
            url: url.into(),
        })
    }

    /// POST the message. Success is exactly HTTP 200; nothing is retried.
    pub async fn post(&self, message: &NotificationMessage) -> Result<(), WebhookError> {
        debug!("POST {}", redact_url(&self.url));

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&MarkdownPayload::from(message))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != StatusCode::OK {
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if let Ok(ack) = serde_json::from_str::<WebhookAck>(&body) {
            if ack.errcode != 0 {
                warn!(
                    "Webhook accepted the request but reported errcode {}: {}",
                    ack.errcode, ack.errmsg
                );
            }
        }
        Ok(())
    }
}
