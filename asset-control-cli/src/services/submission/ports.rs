//! Collaborators the workflow drives, one per external service

use crate::api::forecast::{ForecastClient, ForecastError};
use crate::api::webhook::{WebhookClient, WebhookError};
use crate::models::{ForecastRecord, NotificationMessage};
use async_trait::async_trait;
use serde_json::Value;

/// Append-only row storage
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Append one positional row
    async fn append_row(&self, row: &[Value]) -> anyhow::Result<()>;

    /// Human-readable destination for messages and logs
    fn describe(&self) -> String;
}

/// Source of per-location forecast records
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<ForecastRecord>, ForecastError>;
}

/// Chat notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &NotificationMessage) -> Result<(), WebhookError>;
}

#[async_trait]
impl ForecastSource for ForecastClient {
    async fn fetch_records(&self) -> Result<Vec<ForecastRecord>, ForecastError> {
        ForecastClient::fetch_records(self).await
    }
}

#[async_trait]
impl Notifier for WebhookClient {
    async fn notify(&self, message: &NotificationMessage) -> Result<(), WebhookError> {
        self.post(message).await
    }
}
