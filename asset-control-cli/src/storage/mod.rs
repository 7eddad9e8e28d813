//! Row storage backends

pub mod csv;
pub mod google;

pub use self::csv::CsvSheetStore;
pub use google::GoogleSheetStore;

use crate::api::http::HttpConfig;
use crate::config::{Config, StorageBackend};
use crate::services::submission::SheetStore;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Column headers, in row order
pub const COLUMNS: [&str; 6] = ["location", "bag", "small_cage", "big_cage", "pallet", "timestamp"];

/// Open the configured backend
pub async fn open_store(config: &Config, http: &HttpConfig) -> Result<Arc<dyn SheetStore>> {
    match config.storage.backend {
        StorageBackend::GoogleSheets => {
            let credentials = config.require_credentials()?;
            let store = GoogleSheetStore::connect(credentials, &config.spreadsheet, http)
                .await
                .context("Failed to authorize Google Sheets API")?;
            Ok(Arc::new(store))
        }
        StorageBackend::Csv => Ok(Arc::new(CsvSheetStore::new(config.storage.csv_path.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    #[tokio::test]
    async fn test_open_csv_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage = StorageConfig {
            backend: StorageBackend::Csv,
            csv_path: dir.path().join("rows.csv"),
        };
        let store = open_store(&config, &HttpConfig::default()).await.unwrap();
        assert!(store.describe().contains("rows.csv"));
    }

    #[tokio::test]
    async fn test_google_store_needs_credentials() {
        let err = open_store(&Config::default(), &HttpConfig::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("credentials"));
    }

    #[tokio::test]
    async fn test_google_store_reports_missing_key_file() {
        let mut config = Config::default();
        config.credentials = Some("/nonexistent/sa.json".into());
        let err = open_store(&config, &HttpConfig::default())
            .await
            .err()
            .unwrap();
        let text = format!("{:#}", err);
        assert!(text.starts_with("Failed to authorize Google Sheets API"));
        assert!(text.contains("/nonexistent/sa.json"));
    }
}
