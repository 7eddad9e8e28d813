//! Google Sheets access over plain HTTP
//!
//! Service-account credentials are exchanged for an OAuth2 access token
//! (signed JWT bearer grant), the spreadsheet is located by name through the
//! Drive API, and rows are appended to its first sheet with `values:append`.
//!
//! Modules:
//! - auth: service account key loading and token exchange
//! - client: spreadsheet lookup and row append

pub mod auth;
pub mod client;

pub use auth::{ServiceAccountAuth, ServiceAccountKey};
pub use client::{AppendResult, SheetsClient, Worksheet};

use super::http::describe_transport_error;
use std::path::PathBuf;

/// OAuth2 scopes needed to find a spreadsheet by name and append to it
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("{}", describe_transport_error(.0))]
    Http(#[from] reqwest::Error),
    #[error("credentials not found at {0}")]
    CredentialsNotFound(PathBuf),
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to sign token request: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("spreadsheet '{0}' not found or not shared with the service account")]
    SpreadsheetNotFound(String),
    #[error("spreadsheet '{0}' has no worksheets")]
    NoWorksheets(String),
}

/// Pull `error.message` out of a Google error body, falling back to the raw text
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error").and_then(|e| match e {
                serde_json::Value::String(s) => Some(s.clone()),
                other => other
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string),
            })
        })
        .unwrap_or_else(|| body.trim().to_string())
}
