//! Clinical timestamps with explicit precision.
//!
//! Records can carry either a calendar date or a full zoned date-time. Both render to the CDA
//! `TS` form; the document's own effective time is always a zoned date-time.

use crate::constants::{TS_DATETIME_FORMAT, TS_DATE_FORMAT};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CdaTime {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl CdaTime {
    /// Parses RFC 3339 (`2026-01-12T10:14:00+00:00`) or a bare ISO date (`2026-01-12`).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(CdaTime::DateTime(dt));
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .map(CdaTime::Date)
    }

    /// CDA `TS` literal, e.g. `20260112` or `20260112101400+0000`.
    pub fn to_ts(&self) -> String {
        match self {
            CdaTime::Date(date) => date.format(TS_DATE_FORMAT).to_string(),
            CdaTime::DateTime(dt) => dt.format(TS_DATETIME_FORMAT).to_string(),
        }
    }

    /// Human-readable rendering for narrative blocks.
    pub fn to_display(&self) -> String {
        match self {
            CdaTime::Date(date) => date.format("%Y-%m-%d").to_string(),
            CdaTime::DateTime(dt) => dt.format("%Y-%m-%d %H:%M %:z").to_string(),
        }
    }
}

impl From<DateTime<FixedOffset>> for CdaTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        CdaTime::DateTime(value)
    }
}

impl From<NaiveDate> for CdaTime {
    fn from(value: NaiveDate) -> Self {
        CdaTime::Date(value)
    }
}

impl fmt::Display for CdaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl<'de> Deserialize<'de> for CdaTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CdaTime::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid timestamp '{s}' (expected YYYY-MM-DD or RFC 3339)"
            ))
        })
    }
}

/// CDA `TS` literal for a zoned date-time.
pub fn ts(dt: &DateTime<FixedOffset>) -> String {
    dt.format(TS_DATETIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_renders_day_precision() {
        let t = CdaTime::parse("2026-01-12").expect("date");
        assert_eq!(t.to_ts(), "20260112");
        assert_eq!(t.to_display(), "2026-01-12");
    }

    #[test]
    fn datetime_keeps_offset() {
        let t = CdaTime::parse("2026-01-12T10:14:00-05:00").expect("datetime");
        assert_eq!(t.to_ts(), "20260112101400-0500");
        assert_eq!(t.to_display(), "2026-01-12 10:14 -05:00");
    }

    #[test]
    fn rejects_unparseable_values() {
        assert!(CdaTime::parse("12/01/2026").is_none());
        let err = serde_yaml::from_str::<CdaTime>("yesterday").expect_err("should fail");
        assert!(err.to_string().contains("invalid timestamp"));
    }
}
