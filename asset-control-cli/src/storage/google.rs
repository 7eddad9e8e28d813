//! Shared Google spreadsheet as the row store

use crate::api::http::HttpConfig;
use crate::api::sheets::{SCOPES, ServiceAccountAuth, ServiceAccountKey, SheetsClient, SheetsError, Worksheet};
use crate::services::submission::SheetStore;
use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::path::Path;

/// First sheet of a spreadsheet, opened once and reused for every append
pub struct GoogleSheetStore {
    client: SheetsClient,
    worksheet: Worksheet,
}

impl GoogleSheetStore {
    /// Load the key file, authorize, and open the spreadsheet by name
    pub async fn connect(credentials: &Path, spreadsheet: &str, http: &HttpConfig) -> Result<Self, SheetsError> {
        let key = ServiceAccountKey::from_file(credentials)?;
        let auth = ServiceAccountAuth::new(key, http.client()?, SCOPES);
        let client = SheetsClient::new(http.client()?, auth);
        Self::open(client, spreadsheet).await
    }

    pub async fn open(client: SheetsClient, spreadsheet: &str) -> Result<Self, SheetsError> {
        let worksheet = client.open_by_name(spreadsheet).await?;
        Ok(Self { client, worksheet })
    }
}

#[async_trait]
impl SheetStore for GoogleSheetStore {
    async fn append_row(&self, row: &[Value]) -> Result<()> {
        let result = self.client.append_row(&self.worksheet, row).await?;
        debug!(
            "Appended {} row(s) at {}",
            result.updated_rows,
            result.updated_range.as_deref().unwrap_or("?")
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "spreadsheet '{}' (sheet '{}', as {})",
            self.worksheet.spreadsheet_name,
            self.worksheet.title,
            self.client.service_account()
        )
    }
}
