//! Paste data models

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Language label used when the requested one can't be resolved
pub const FALLBACK_LANGUAGE: &str = "Text";

/// When a paste should expire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiresIn {
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "10h")]
    TenHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "2d")]
    TwoDays,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
}

impl ExpiresIn {
    pub const ALL: [ExpiresIn; 9] = [
        ExpiresIn::Never,
        ExpiresIn::OneHour,
        ExpiresIn::TwoHours,
        ExpiresIn::TenHours,
        ExpiresIn::OneDay,
        ExpiresIn::TwoDays,
        ExpiresIn::OneWeek,
        ExpiresIn::OneMonth,
        ExpiresIn::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiresIn::Never => "never",
            ExpiresIn::OneHour => "1h",
            ExpiresIn::TwoHours => "2h",
            ExpiresIn::TenHours => "10h",
            ExpiresIn::OneDay => "1d",
            ExpiresIn::TwoDays => "2d",
            ExpiresIn::OneWeek => "1w",
            ExpiresIn::OneMonth => "1m",
            ExpiresIn::OneYear => "1y",
        }
    }

    /// Exact moment a paste created at `start` gets deleted, `None` for `never`.
    /// Months and years are calendar based.
    pub fn deletes_at(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExpiresIn::Never => None,
            ExpiresIn::OneHour => Some(start + Duration::hours(1)),
            ExpiresIn::TwoHours => Some(start + Duration::hours(2)),
            ExpiresIn::TenHours => Some(start + Duration::hours(10)),
            ExpiresIn::OneDay => Some(start + Duration::days(1)),
            ExpiresIn::TwoDays => Some(start + Duration::days(2)),
            ExpiresIn::OneWeek => Some(start + Duration::days(7)),
            ExpiresIn::OneMonth => start.checked_add_months(Months::new(1)),
            ExpiresIn::OneYear => start.checked_add_months(Months::new(12)),
        }
    }
}

impl fmt::Display for ExpiresIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpiresIn {
    type Err = String;

    /// An empty string means `never`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(ExpiresIn::Never);
        }
        ExpiresIn::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("unknown expiry '{}'", s))
    }
}

/// A single paste
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paste {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_in: ExpiresIn,
    /// Zero time when the paste never expires
    #[serde(serialize_with = "crate::common::helpers::serialize_zero_time_if_none")]
    pub deletes_at: Option<DateTime<Utc>>,
    pub title: String,
    /// Empty for anonymous pastes
    #[serde(serialize_with = "crate::common::helpers::serialize_empty_if_none")]
    pub owner_id: Option<String>,
    pub private: bool,
    pub pasties: Vec<Pasty>,
}

/// A single pasty (file inside a paste)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pasty {
    pub id: String,
    pub title: String,
    pub content: String,
    pub language: String,
}

/// POST /api/v3/paste body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteCreateInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pasties: Vec<PastyCreateInfo>,
    #[serde(default)]
    pub expires_in: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PastyCreateInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub language: String,
}

/// Generic paginated result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next_page: bool,
}

/// `?page=&page_size=` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub lines: u64,
    pub words: u64,
    pub size: u64,
}

/// Statistics of a paste, overall and per pasty id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PasteStats {
    #[serde(flatten)]
    pub total: Stats,
    pub pasties: BTreeMap<String, Stats>,
}

/// Share of a paste's content written in one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LangStat {
    pub language: String,
    /// Percent of the paste's bytes, 0 to 100
    pub percentage: f32,
}

/// GET /api/v3/meta/activePastes response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivePastes {
    pub count: u64,
}
