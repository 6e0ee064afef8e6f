use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A backend timestamp.
///
/// The backend serializes `LocalDateTime` either as an ISO-8601 string or as a
/// `[year, month, day, hour, minute, second, nanos]` array depending on the
/// endpoint. Both are normalized to the ISO string form on decode; anything
/// unparseable is kept verbatim so it can still be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn now() -> Self {
        Self(Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the stored value as a local date-time (date-only values map to
    /// midnight).
    pub fn parse(&self) -> Option<NaiveDateTime> {
        let raw = self.0.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
        for fmt in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
        if raw.contains(',') {
            let parts = raw
                .split(',')
                .map(|p| p.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            return from_parts(&parts);
        }
        None
    }

    /// `dd/mm/yyyy HH:MM`, or the raw value when it cannot be parsed.
    pub fn display(&self) -> String {
        self.parse()
            .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_else(|| self.0.clone())
    }

    /// `dd/mm/yyyy`, or the raw value when it cannot be parsed.
    pub fn display_date(&self) -> String {
        self.parse()
            .map(|dt| dt.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| self.0.clone())
    }
}

fn from_parts(parts: &[i64]) -> Option<NaiveDateTime> {
    if parts.len() < 3 {
        return None;
    }
    let at = |i: usize| parts.get(i).copied().unwrap_or(0);
    let date = NaiveDate::from_ymd_opt(at(0) as i32, at(1) as u32, at(2) as u32)?;
    date.and_hms_opt(at(3) as u32, at(4) as u32, at(5) as u32)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Parts(Vec<i64>),
    Epoch(i64),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTimestamp::deserialize(deserializer)?;
        Ok(match raw {
            RawTimestamp::Text(text) => Timestamp(text),
            RawTimestamp::Parts(parts) => match from_parts(&parts) {
                Some(dt) => Timestamp(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
                None => Timestamp(
                    parts
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                ),
            },
            RawTimestamp::Epoch(millis) => match DateTime::from_timestamp_millis(millis) {
                Some(dt) => Timestamp(
                    dt.with_timezone(&Local)
                        .naive_local()
                        .format("%Y-%m-%dT%H:%M:%S")
                        .to_string(),
                ),
                None => Timestamp(millis.to_string()),
            },
        })
    }
}
