//! Markdown alert built from a forecast record

use crate::models::{EquipmentCounts, ForecastRecord, NotificationMessage};
use std::fmt::Write;

/// Default message title
pub const DEFAULT_TITLE: &str = "Alert";

/// Render the alert: header, location, forecast volume, then the
/// forecast, available and required sections.
pub fn render(record: &ForecastRecord, title: &str) -> NotificationMessage {
    let mut text = String::new();

    let _ = write!(
        text,
        "**EQUIPMENT UPDATE FOR {}**\n\n",
        record.display_date
    );
    let _ = write!(text, "LOCATION: {}\n\n", record.location_key);
    let _ = write!(text, "FORECAST VOLUME: {}\n\n", record.forecast_volume);
    push_section(&mut text, "FORECAST", &record.forecast);
    push_section(&mut text, "AVAILABLE", &record.available);
    push_section(&mut text, "REQUIRED", &record.required);

    NotificationMessage {
        title: title.to_string(),
        text,
    }
}

fn push_section(text: &mut String, heading: &str, counts: &EquipmentCounts) {
    let _ = write!(text, "**{}**\n\n", heading);
    for (label, value) in [
        ("BAG", counts.bag),
        ("SMALL CAGE", counts.small_cage),
        ("BIG CAGE", counts.big_cage),
        ("PALLET", counts.pallet),
    ] {
        let _ = write!(text, "- {}: {}\n\n", label, value);
    }
}
