//! Domain types shared by the CLI, the API clients and the submission workflow

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Format used for the timestamp column of every recorded row
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Site for which equipment is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Location {
    #[serde(rename = "SSW")]
    #[value(name = "SSW")]
    Ssw,
    #[serde(rename = "TPK")]
    #[value(name = "TPK")]
    Tpk,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Ssw, Location::Tpk];

    /// Site code as it appears in the spreadsheet and in forecast records
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Ssw => "SSW",
            Location::Tpk => "TPK",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .into_iter()
            .find(|loc| loc.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown location '{}' (expected SSW or TPK)", s))
    }
}

/// The four equipment counts entered on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quantities {
    pub bag: u32,
    pub small_cage: u32,
    pub big_cage: u32,
    pub pallet: u32,
}

/// Unvalidated values yielded by the form surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub location: Location,
    pub quantities: Quantities,
}

impl SubmissionForm {
    pub fn new(location: Location, quantities: Quantities) -> Self {
        Self {
            location,
            quantities,
        }
    }
}

/// A validated, timestamped submission. Never modified after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub location: Location,
    pub quantities: Quantities,
    pub timestamp: String,
}

impl Submission {
    /// Stamp a form with the given instant
    pub fn stamp<Tz: TimeZone>(id: Uuid, form: &SubmissionForm, at: DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            id,
            location: form.location,
            quantities: form.quantities,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Positional row: `[location, bag, small_cage, big_cage, pallet, timestamp]`
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::from(self.location.as_str()),
            Value::from(self.quantities.bag),
            Value::from(self.quantities.small_cage),
            Value::from(self.quantities.big_cage),
            Value::from(self.quantities.pallet),
            Value::from(self.timestamp.clone()),
        ]
    }
}

/// One group of four equipment figures from a forecast record
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EquipmentCounts {
    pub bag: f64,
    pub small_cage: f64,
    pub big_cage: f64,
    pub pallet: f64,
}

/// Per-location projection returned by the forecast endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "RawForecastRecord", into = "RawForecastRecord")]
pub struct ForecastRecord {
    pub location_key: String,
    pub display_date: String,
    pub forecast_volume: f64,
    pub forecast: EquipmentCounts,
    pub available: EquipmentCounts,
    pub required: EquipmentCounts,
}

impl ForecastRecord {
    pub fn matches(&self, location: Location) -> bool {
        self.location_key == location.as_str()
    }
}

/// Wire shape of a forecast record: flat, snake_case keys
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct RawForecastRecord {
    #[serde(deserialize_with = "lenient_text")]
    sc_node: String,
    #[serde(default, deserialize_with = "lenient_text")]
    ds: String,
    #[serde(default, deserialize_with = "lenient_number")]
    fc_volume: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    fc_bag: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    fc_small_cage: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    fc_big_cage: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    fc_pallet: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    avail_bag: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    avail_small_cage: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    avail_big_cage: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    avail_pallet: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    reqmt_bag: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    reqmt_small_cage: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    reqmt_big_cage: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    reqmt_pallet: f64,
}

impl From<RawForecastRecord> for ForecastRecord {
    fn from(raw: RawForecastRecord) -> Self {
        Self {
            location_key: raw.sc_node,
            display_date: raw.ds,
            forecast_volume: raw.fc_volume,
            forecast: EquipmentCounts {
                bag: raw.fc_bag,
                small_cage: raw.fc_small_cage,
                big_cage: raw.fc_big_cage,
                pallet: raw.fc_pallet,
            },
            available: EquipmentCounts {
                bag: raw.avail_bag,
                small_cage: raw.avail_small_cage,
                big_cage: raw.avail_big_cage,
                pallet: raw.avail_pallet,
            },
            required: EquipmentCounts {
                bag: raw.reqmt_bag,
                small_cage: raw.reqmt_small_cage,
                big_cage: raw.reqmt_big_cage,
                pallet: raw.reqmt_pallet,
            },
        }
    }
}

impl From<ForecastRecord> for RawForecastRecord {
    fn from(record: ForecastRecord) -> Self {
        Self {
            sc_node: record.location_key,
            ds: record.display_date,
            fc_volume: record.forecast_volume,
            fc_bag: record.forecast.bag,
            fc_small_cage: record.forecast.small_cage,
            fc_big_cage: record.forecast.big_cage,
            fc_pallet: record.forecast.pallet,
            avail_bag: record.available.bag,
            avail_small_cage: record.available.small_cage,
            avail_big_cage: record.available.big_cage,
            avail_pallet: record.available.pallet,
            reqmt_bag: record.required.bag,
            reqmt_small_cage: record.required.small_cage,
            reqmt_big_cage: record.required.big_cage,
            reqmt_pallet: record.required.pallet,
        }
    }
}

/// Accept a number or a numeric string; null and blank strings read as 0
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("number out of range: {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{}'", s))),
        other => Err(serde::de::Error::custom(format!(
            "expected a number, got {}",
            other
        ))),
    }
}

/// Accept a string, or render a scalar as text
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected text, got {}",
            other
        ))),
    }
}

/// Transient chat message built from a forecast record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub title: String,
    pub text: String,
}
