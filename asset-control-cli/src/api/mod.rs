//! HTTP integrations used by the submission workflow
//!
//! Each remote system gets its own client with a dedicated error type:
//! the forecast endpoint (JSON records), the chat webhook (markdown alerts)
//! and Google Sheets (row storage). Shared transport settings live in `http`.

pub mod forecast;
pub mod http;
pub mod sheets;
pub mod webhook;

pub use forecast::{ForecastClient, ForecastError};
pub use http::{HttpConfig, HttpConfigBuilder};
pub use sheets::{SheetsClient, SheetsError};
pub use webhook::{WebhookClient, WebhookError};
