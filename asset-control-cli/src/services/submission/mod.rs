// Submit-and-notify workflow
//
// Idle -> Validating -> Recording -> Fetching -> Notifying -> Done, with an
// early exit from any stage. Every failure is caught at its stage and lands
// in the report; nothing here returns Err to the caller or retries.

pub mod message;
pub mod ports;
pub mod report;
pub mod validator;

pub use ports::{ForecastSource, Notifier, SheetStore};
pub use report::{MessageLevel, Stage, StageMessage, SubmissionReport};

use crate::api::forecast::{ForecastClient, select_record};
use crate::api::http::redact_url;
use crate::api::webhook::WebhookClient;
use crate::config::{Config, ConfigError};
use crate::error::WorkflowError;
use crate::models::{ForecastRecord, Location, NotificationMessage, Submission, SubmissionForm};
use chrono::{Local, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Behaviour switches taken from the configuration
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Still fetch and notify when appending the row failed
    pub notify_after_record_failure: bool,
    pub message_title: String,
    /// Timezone for row timestamps; local time when `None`
    pub timezone: Option<Tz>,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            notify_after_record_failure: false,
            message_title: message::DEFAULT_TITLE.to_string(),
            timezone: None,
        }
    }
}

impl WorkflowOptions {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            notify_after_record_failure: config.notify_after_record_failure,
            message_title: config.message.title.clone(),
            timezone: config.timezone()?,
        })
    }
}

/// Runs submissions one at a time against the three collaborators
pub struct SubmissionWorkflow {
    store: Arc<dyn SheetStore>,
    forecast: Arc<dyn ForecastSource>,
    notifier: Arc<dyn Notifier>,
    options: WorkflowOptions,
}

impl SubmissionWorkflow {
    pub fn new(
        store: Arc<dyn SheetStore>,
        forecast: Arc<dyn ForecastSource>,
        notifier: Arc<dyn Notifier>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            store,
            forecast,
            notifier,
            options,
        }
    }

    /// Credential and session setup: validate configuration, build the HTTP
    /// clients and open the spreadsheet handle used for every submission.
    pub async fn connect(config: &Config) -> Result<Self, WorkflowError> {
        let options = WorkflowOptions::from_config(config)?;
        let http = config.http_config();

        let forecast = ForecastClient::new(config.require_forecast_endpoint()?, &http)
            .map_err(|e| WorkflowError::Configuration(format!("forecast client: {}", e)))?;
        let notifier = WebhookClient::new(config.require_webhook_url()?, &http)
            .map_err(|e| WorkflowError::Configuration(format!("webhook client: {}", e)))?;
        let store = crate::storage::open_store(config, &http)
            .await
            .map_err(|e| WorkflowError::Configuration(format!("{:#}", e)))?;

        info!("Recording to {}", store.describe());
        info!("Forecast from {}", redact_url(forecast.endpoint()));
        Ok(Self::new(store, Arc::new(forecast), Arc::new(notifier), options))
    }

    /// Process one submission start to finish
    pub async fn run(&self, form: SubmissionForm) -> SubmissionReport {
        let id = Uuid::new_v4();
        let mut report = SubmissionReport::new(id, form.location);
        info!(
            "[{}] Submission for {}: {:?}",
            id, form.location, form.quantities
        );

        enter(&mut report, Stage::Validating);
        if let Err(err) = validator::validate(&form.quantities) {
            warn!("[{}] Rejected: {}", id, err);
            report.fail(err);
            return report;
        }

        enter(&mut report, Stage::Recording);
        let submission = self.stamp(id, &form);
        let row = submission.to_row();
        report.submission = Some(submission);
        match self.store.append_row(&row).await {
            Ok(()) => {
                info!("[{}] Row appended to {}", id, self.store.describe());
                report.recorded = true;
                report.success(Stage::Recording, "Data logged successfully!");
            }
            Err(err) => {
                warn!("[{}] Append failed: {:#}", id, err);
                report.fail(WorkflowError::Recording(format!("{:#}", err)));
                if !self.options.notify_after_record_failure {
                    return report;
                }
                report.notice(
                    Stage::Recording,
                    "Row was not recorded; sending the alert anyway.",
                );
            }
        }

        enter(&mut report, Stage::Fetching);
        let records = match self.forecast.fetch_records().await {
            Ok(records) => records,
            Err(err) => {
                warn!("[{}] Forecast fetch failed: {}", id, err);
                report.fail(WorkflowError::Fetch(err.to_string()));
                return report;
            }
        };
        let Some(record) = select_record(&records, form.location) else {
            warn!(
                "[{}] No forecast record for {} among {} records",
                id,
                form.location,
                records.len()
            );
            report.fail(WorkflowError::NoMatch {
                location: form.location,
            });
            return report;
        };

        enter(&mut report, Stage::Notifying);
        let message = message::render(record, &self.options.message_title);
        let sent = self.notifier.notify(&message).await;
        report.notification = Some(message);
        match sent {
            Ok(()) => {
                info!("[{}] Alert sent", id);
                report.notified = true;
                report.success(Stage::Notifying, "Alert sent successfully!");
            }
            Err(err) => {
                warn!("[{}] Alert failed: {}", id, err);
                report.fail(WorkflowError::Notify(err.to_string()));
                return report;
            }
        }

        enter(&mut report, Stage::Done);
        report
    }

    fn stamp(&self, id: Uuid, form: &SubmissionForm) -> Submission {
        match self.options.timezone {
            Some(tz) => Submission::stamp(id, form, Utc::now().with_timezone(&tz)),
            None => Submission::stamp(id, form, Local::now()),
        }
    }
}

fn enter(report: &mut SubmissionReport, stage: Stage) {
    debug!("[{}] {} -> {}", report.id, report.exited_at, stage);
    report.exited_at = stage;
}

/// Fetch the record for a location and render the alert without sending it
pub async fn preview(
    source: &dyn ForecastSource,
    location: Location,
    title: &str,
) -> Result<(ForecastRecord, NotificationMessage), WorkflowError> {
    let records = source
        .fetch_records()
        .await
        .map_err(|e| WorkflowError::Fetch(e.to_string()))?;
    let record = select_record(&records, location)
        .cloned()
        .ok_or(WorkflowError::NoMatch { location })?;
    let message = message::render(&record, title);
    Ok((record, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::forecast::ForecastError;
    use crate::api::webhook::WebhookError;
    use crate::models::{Quantities, TIMESTAMP_FORMAT};
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeStore {
        rows: Mutex<Vec<Vec<Value>>>,
        fail: bool,
    }

    #[async_trait]
    impl SheetStore for FakeStore {
        async fn append_row(&self, row: &[Value]) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("API error 429: Quota exceeded");
            }
            self.rows.lock().unwrap().push(row.to_vec());
            Ok(())
        }

        fn describe(&self) -> String {
            "fake sheet".to_string()
        }
    }

    struct FakeForecast {
        records: Vec<Value>,
        status: Option<u16>,
        calls: AtomicUsize,
    }

    impl FakeForecast {
        fn with(records: Vec<Value>) -> Self {
            Self {
                records,
                status: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                records: Vec::new(),
                status: Some(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ForecastSource for FakeForecast {
        async fn fetch_records(&self) -> Result<Vec<ForecastRecord>, ForecastError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.status {
                return Err(ForecastError::Status { status });
            }
            Ok(serde_json::from_value(Value::Array(self.records.clone()))?)
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<NotificationMessage>>,
        status: Option<u16>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn notify(&self, message: &NotificationMessage) -> Result<(), WebhookError> {
            self.sent.lock().unwrap().push(message.clone());
            match self.status {
                Some(status) => Err(WebhookError::Status {
                    status,
                    body: String::new(),
                }),
                None => Ok(()),
            }
        }
    }

    struct Harness {
        store: Arc<FakeStore>,
        forecast: Arc<FakeForecast>,
        notifier: Arc<FakeNotifier>,
        workflow: SubmissionWorkflow,
    }

    fn harness(store: FakeStore, forecast: FakeForecast, notifier: FakeNotifier) -> Harness {
        harness_with(store, forecast, notifier, WorkflowOptions::default())
    }

    fn harness_with(
        store: FakeStore,
        forecast: FakeForecast,
        notifier: FakeNotifier,
        options: WorkflowOptions,
    ) -> Harness {
        let store = Arc::new(store);
        let forecast = Arc::new(forecast);
        let notifier = Arc::new(notifier);
        let workflow = SubmissionWorkflow::new(
            store.clone(),
            forecast.clone(),
            notifier.clone(),
            options,
        );
        Harness {
            store,
            forecast,
            notifier,
            workflow,
        }
    }

    fn ssw_record() -> Value {
        json!({
            "sc_node": "SSW",
            "ds": "2024-01-01",
            "fc_volume": 500,
            "fc_bag": 200,
            "fc_small_cage": 10,
            "fc_big_cage": 2,
            "fc_pallet": 1,
            "avail_bag": 50,
            "avail_small_cage": 4,
            "avail_big_cage": 0,
            "avail_pallet": 0,
            "reqmt_bag": 150,
            "reqmt_small_cage": 6,
            "reqmt_big_cage": 2,
            "reqmt_pallet": 1
        })
    }

    fn tpk_record() -> Value {
        json!({"sc_node": "TPK", "ds": "2024-01-01", "fc_volume": 80, "avail_bag": 9})
    }

    fn form(location: Location, bag: u32, small_cage: u32, big_cage: u32, pallet: u32) -> SubmissionForm {
        SubmissionForm::new(
            location,
            Quantities {
                bag,
                small_cage,
                big_cage,
                pallet,
            },
        )
    }

    #[tokio::test]
    async fn test_zero_bag_never_records() {
        let h = harness(
            FakeStore::default(),
            FakeForecast::with(vec![ssw_record()]),
            FakeNotifier::default(),
        );
        let report = h.workflow.run(form(Location::Ssw, 0, 5, 0, 0)).await;

        assert_eq!(report.exited_at, Stage::Validating);
        assert!(!report.is_success());
        assert!(h.store.rows.lock().unwrap().is_empty());
        assert_eq!(h.forecast.calls.load(Ordering::SeqCst), 0);
        assert!(h.notifier.sent.lock().unwrap().is_empty());
        assert_eq!(
            report.messages[0].text,
            "BAG is required. Please enter a value."
        );
    }

    #[tokio::test]
    async fn test_zero_small_cage_never_records() {
        let h = harness(
            FakeStore::default(),
            FakeForecast::with(vec![ssw_record()]),
            FakeNotifier::default(),
        );
        let report = h.workflow.run(form(Location::Ssw, 10, 0, 3, 3)).await;

        assert_eq!(report.exited_at, Stage::Validating);
        assert!(h.store.rows.lock().unwrap().is_empty());
        assert!(matches!(
            report.terminal_error(),
            Some(WorkflowError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_successful_submission_records_and_notifies() {
        let h = harness(
            FakeStore::default(),
            FakeForecast::with(vec![tpk_record(), ssw_record()]),
            FakeNotifier::default(),
        );
        let report = h.workflow.run(form(Location::Ssw, 100, 5, 0, 0)).await;

        assert!(report.is_success());
        assert_eq!(report.exited_at, Stage::Done);
        assert!(report.recorded);
        assert!(report.notified);

        let rows = h.store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(&row[..5], &[json!("SSW"), json!(100), json!(5), json!(0), json!(0)]);
        let timestamp = row[5].as_str().unwrap();
        assert!(NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(report.submission.as_ref().unwrap().timestamp, timestamp);

        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let text = &sent[0].text;
        assert!(text.contains("LOCATION: SSW"));
        assert!(text.contains("**AVAILABLE**\n\n- BAG: 50"));
        assert!(text.contains("**REQUIRED**\n\n- BAG: 150"));
        assert!(text.contains("**FORECAST**\n\n- BAG: 200"));
        assert_eq!(sent[0].title, "Alert");

        let texts: Vec<&str> = report.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Data logged successfully!", "Alert sent successfully!"]);
    }

    #[tokio::test]
    async fn test_no_matching_record_skips_notification() {
        let h = harness(
            FakeStore::default(),
            FakeForecast::with(vec![tpk_record()]),
            FakeNotifier::default(),
        );
        let report = h.workflow.run(form(Location::Ssw, 100, 5, 0, 0)).await;

        assert_eq!(report.exited_at, Stage::Fetching);
        assert!(report.recorded);
        assert!(h.notifier.sent.lock().unwrap().is_empty());
        assert!(matches!(
            report.terminal_error(),
            Some(WorkflowError::NoMatch {
                location: Location::Ssw
            })
        ));
        assert!(
            report
                .messages
                .last()
                .unwrap()
                .text
                .starts_with("No data found for the selected location")
        );
    }

    #[tokio::test]
    async fn test_notify_failure_keeps_recorded_row() {
        let h = harness(
            FakeStore::default(),
            FakeForecast::with(vec![ssw_record()]),
            FakeNotifier {
                status: Some(500),
                ..FakeNotifier::default()
            },
        );
        let report = h.workflow.run(form(Location::Ssw, 100, 5, 0, 0)).await;

        assert_eq!(report.exited_at, Stage::Notifying);
        assert!(!report.is_success());
        assert!(report.recorded);
        assert!(!report.notified);
        assert_eq!(h.store.rows.lock().unwrap().len(), 1);
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
        assert_eq!(
            report.terminal_error().unwrap().to_string(),
            "Failed to send alert: webhook returned HTTP 500"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_notify() {
        let h = harness(
            FakeStore::default(),
            FakeForecast::failing(502),
            FakeNotifier::default(),
        );
        let report = h.workflow.run(form(Location::Tpk, 3, 2, 1, 0)).await;

        assert_eq!(report.exited_at, Stage::Fetching);
        assert!(report.recorded);
        assert!(h.notifier.sent.lock().unwrap().is_empty());
        assert!(matches!(report.terminal_error(), Some(WorkflowError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_record_failure_skips_notification_by_default() {
        let h = harness(
            FakeStore {
                fail: true,
                ..FakeStore::default()
            },
            FakeForecast::with(vec![ssw_record()]),
            FakeNotifier::default(),
        );
        let report = h.workflow.run(form(Location::Ssw, 100, 5, 0, 0)).await;

        assert_eq!(report.exited_at, Stage::Recording);
        assert!(!report.recorded);
        assert_eq!(h.forecast.calls.load(Ordering::SeqCst), 0);
        assert!(h.notifier.sent.lock().unwrap().is_empty());
        assert_eq!(
            report.terminal_error().unwrap().to_string(),
            "Failed to log data: API error 429: Quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_record_failure_can_still_notify() {
        let options = WorkflowOptions {
            notify_after_record_failure: true,
            ..WorkflowOptions::default()
        };
        let h = harness_with(
            FakeStore {
                fail: true,
                ..FakeStore::default()
            },
            FakeForecast::with(vec![ssw_record()]),
            FakeNotifier::default(),
            options,
        );
        let report = h.workflow.run(form(Location::Ssw, 100, 5, 0, 0)).await;

        assert_eq!(report.exited_at, Stage::Done);
        assert!(!report.is_success());
        assert!(report.notified);
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
        assert!(matches!(
            report.errors.as_slice(),
            [WorkflowError::Recording(_)]
        ));
    }

    #[tokio::test]
    async fn test_failed_attempt_does_not_poison_next() {
        let h = harness(
            FakeStore::default(),
            FakeForecast::with(vec![ssw_record(), tpk_record()]),
            FakeNotifier::default(),
        );

        let first = h.workflow.run(form(Location::Tpk, 0, 0, 0, 0)).await;
        let second = h.workflow.run(form(Location::Tpk, 7, 7, 0, 0)).await;
        let third = h.workflow.run(form(Location::Tpk, 7, 7, 0, 0)).await;

        assert!(!first.is_success());
        assert!(second.is_success());
        assert!(third.is_success());
        assert_ne!(second.id, third.id);
        // duplicates are appended, not merged
        assert_eq!(h.store.rows.lock().unwrap().len(), 2);
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_timezone_option_stamps_rows() {
        let options = WorkflowOptions {
            timezone: Some(chrono_tz::Asia::Kuala_Lumpur),
            message_title: "Equipment".into(),
            ..WorkflowOptions::default()
        };
        let h = harness_with(
            FakeStore::default(),
            FakeForecast::with(vec![ssw_record()]),
            FakeNotifier::default(),
            options,
        );
        let report = h.workflow.run(form(Location::Ssw, 1, 1, 0, 0)).await;

        assert!(report.is_success());
        let submission = report.submission.unwrap();
        assert!(NaiveDateTime::parse_from_str(&submission.timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(h.notifier.sent.lock().unwrap()[0].title, "Equipment");
    }

    #[tokio::test]
    async fn test_preview() {
        let source = FakeForecast::with(vec![ssw_record()]);
        let (record, message) = preview(&source, Location::Ssw, "Alert").await.unwrap();
        assert_eq!(record.location_key, "SSW");
        assert!(message.text.contains("LOCATION: SSW"));

        let err = preview(&source, Location::Tpk, "Alert").await.unwrap_err();
        assert!(matches!(err, WorkflowError::NoMatch { .. }));
    }
}
