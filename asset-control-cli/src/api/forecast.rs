//! Client for the reporting endpoint serving per-location forecasts

use super::http::{HttpConfig, describe_transport_error, redact_url};
use crate::models::{ForecastRecord, Location};
use log::{debug, info};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("forecast endpoint returned HTTP {status}")]
    Status { status: u16 },
    #[error("{}", describe_transport_error(.0))]
    Transport(#[from] reqwest::Error),
    #[error("invalid forecast payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// GET client for the forecast endpoint. Expects a JSON array of records.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ForecastClient {
    pub fn new(endpoint: impl Into<String>, config: &HttpConfig) -> Result<Self, ForecastError> {
        Ok(Self {
            http: config.forecast_client()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch every record. Anything other than HTTP 200 is an error.
    pub async fn fetch_records(&self) -> Result<Vec<ForecastRecord>, ForecastError> {
        debug!("GET {}", redact_url(&self.endpoint));

        let response = self.http.get(&self.endpoint).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ForecastError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let records: Vec<ForecastRecord> = serde_json::from_str(&body)?;
        info!("Fetched {} forecast records", records.len());
        Ok(records)
    }
}

/// First record whose location key equals the submitted location
pub fn select_record(records: &[ForecastRecord], location: Location) -> Option<&ForecastRecord> {
    records.iter().find(|record| record.matches(location))
}
