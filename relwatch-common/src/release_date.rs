//! Calendar date of a release
//!
//! Watermarks compare release dates. Upstream catalogs report them as text
//! with varying precision (`"2019"`, `"2019-06"`, `"2019-06-14"`), and plain
//! string comparison only works when every value is a zero-padded
//! `YYYY-MM-DD`. `ReleaseDate` normalizes at the boundary and compares as a
//! real date; it serializes back to the same ISO text.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Precision of an upstream release date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// Release date normalized to a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseDate(NaiveDate);

impl ReleaseDate {
    /// Threshold used before anything has been ingested
    pub fn epoch() -> Self {
        Self(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| Error::InvalidInput(format!("invalid date {year}-{month}-{day}")))
    }

    /// Parse upstream text with an explicit precision, padding missing
    /// month/day components with 1.
    pub fn parse_with_precision(text: &str, precision: DatePrecision) -> Result<Self> {
        let text = text.trim();
        let parts: Vec<&str> = text.split('-').collect();
        let expected = match precision {
            DatePrecision::Year => 1,
            DatePrecision::Month => 2,
            DatePrecision::Day => 3,
        };
        if parts.len() != expected {
            return Err(Error::InvalidInput(format!(
                "release date '{text}' does not match {precision:?} precision"
            )));
        }

        let year = parse_component(parts[0], 4, text)?;
        let month = match parts.get(1) {
            Some(m) => parse_component(m, 2, text)?,
            None => 1,
        };
        let day = match parts.get(2) {
            Some(d) => parse_component(d, 2, text)?,
            None => 1,
        };

        Self::from_ymd(year as i32, month, day)
    }

    /// Parse upstream text, inferring precision from its shape
    pub fn parse_lenient(text: &str) -> Result<Self> {
        let precision = match text.trim().split('-').count() {
            1 => DatePrecision::Year,
            2 => DatePrecision::Month,
            _ => DatePrecision::Day,
        };
        Self::parse_with_precision(text, precision)
    }
}

fn parse_component(part: &str, width: usize, whole: &str) -> Result<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidInput(format!("malformed release date '{whole}'")));
    }
    part.parse::<u32>()
        .map_err(|e| Error::InvalidInput(format!("malformed release date '{whole}': {e}")))
}

impl Default for ReleaseDate {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

/// Strict ISO `YYYY-MM-DD`, the persisted form
impl FromStr for ReleaseDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with_precision(s, DatePrecision::Day)
    }
}

impl Serialize for ReleaseDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReleaseDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
