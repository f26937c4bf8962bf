// File: ./src/model/reminder.rs
// Medicine reminder specifications and the events derived from them.
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Wall-clock format used by reminder specifications ("08:00", "20:30").
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// A malformed time-of-day in a reminder specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSpecError {
    Malformed { name: String, value: String },
}

impl fmt::Display for TimeSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { name, value } => write!(
                f,
                "invalid time-of-day `{value}` for reminder `{name}` (expected HH:MM)"
            ),
        }
    }
}

impl Error for TimeSpecError {}

/// External input: one medicine and the times of day it should be taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSpec {
    pub name: String,
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

impl ReminderSpec {
    pub fn new<S: AsRef<str>>(name: &str, times: &[S]) -> Self {
        Self {
            name: name.to_string(),
            times: times.iter().map(|t| t.as_ref().to_string()).collect(),
            dosage: None,
            frequency: None,
        }
    }

    /// Parses every listed time-of-day. Fails on the first malformed entry.
    pub fn parse_times(&self) -> Result<Vec<NaiveTime>, TimeSpecError> {
        self.times
            .iter()
            .map(|raw| {
                NaiveTime::parse_from_str(raw, TIME_OF_DAY_FORMAT).map_err(|_| {
                    TimeSpecError::Malformed {
                        name: self.name.clone(),
                        value: raw.clone(),
                    }
                })
            })
            .collect()
    }
}

/// Next occurrence of `time` relative to `now`.
///
/// Today's occurrence if it has not elapsed yet (an exact match counts as not elapsed),
/// otherwise the same time tomorrow.
pub fn resolve_due(time: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(time);
    if today < now {
        today + Duration::days(1)
    } else {
        today
    }
}

/// One scheduled occurrence of a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub due_at: NaiveDateTime,
    pub label: String,
}

impl ReminderEvent {
    pub fn new(due_at: NaiveDateTime, label: impl Into<String>) -> Self {
        Self {
            due_at,
            label: label.into(),
        }
    }
}

impl fmt::Display for ReminderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.label, self.due_at.format("%Y-%m-%d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_resolve_due_rolls_elapsed_time_to_tomorrow() {
        let now = at(2024, 1, 1, 10, 0);
        assert_eq!(resolve_due(hm(9, 0), now), at(2024, 1, 2, 9, 0));
        assert_eq!(resolve_due(hm(11, 0), now), at(2024, 1, 1, 11, 0));
    }

    #[test]
    fn test_resolve_due_exact_now_stays_today() {
        let now = at(2024, 1, 1, 10, 0);
        assert_eq!(resolve_due(hm(10, 0), now), now);
    }

    #[test]
    fn test_resolve_due_across_month_and_year_end() {
        assert_eq!(
            resolve_due(hm(7, 30), at(2024, 1, 31, 23, 0)),
            at(2024, 2, 1, 7, 30)
        );
        assert_eq!(
            resolve_due(hm(0, 0), at(2024, 12, 31, 0, 1)),
            at(2025, 1, 1, 0, 0)
        );
    }

    #[test]
    fn test_parse_times() {
        let spec = ReminderSpec::new("Aspirin", &["08:00", "20:30"]);
        assert_eq!(spec.parse_times().unwrap(), vec![hm(8, 0), hm(20, 30)]);

        let empty = ReminderSpec::new::<&str>("Vitamin D", &[]);
        assert!(empty.parse_times().unwrap().is_empty());
    }

    #[test]
    fn test_parse_times_rejects_malformed() {
        for bad in ["25:00", "noon", "", "08:00:30", "8h"] {
            let spec = ReminderSpec::new("Aspirin", &["08:00", bad]);
            let err = spec.parse_times().unwrap_err();
            assert_eq!(
                err,
                TimeSpecError::Malformed {
                    name: "Aspirin".to_string(),
                    value: bad.to_string()
                },
                "`{bad}` should be rejected"
            );
        }
    }

    #[test]
    fn test_spec_deserializes_with_optional_fields() {
        let spec: ReminderSpec =
            serde_json::from_str(r#"{"name": "Metformin", "times": ["07:00"], "dosage": "500mg"}"#)
                .unwrap();
        assert_eq!(spec.dosage.as_deref(), Some("500mg"));
        assert!(spec.frequency.is_none());

        let bare: ReminderSpec = serde_json::from_str(r#"{"name": "Iron"}"#).unwrap();
        assert!(bare.times.is_empty());
    }

    #[test]
    fn test_event_display() {
        let ev = ReminderEvent::new(at(2024, 1, 1, 20, 0), "Aspirin");
        assert_eq!(ev.to_string(), "Aspirin → 2024-01-01 20:00");
    }
}
