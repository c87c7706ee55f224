//! Certification record types.
//!
//! A certification moves through three shapes:
//!
//! - [`CertificationCandidate`]: raw input straight from the caller, nothing checked yet
//! - [`ValidCertification`]: a candidate that passed every field rule
//! - [`CertificationRecord`]: a committed record with an id and timestamps
//!
//! The derived properties [`is_overdue`] and [`days_until_target`] are plain
//! functions of a record and a [`Clock`]; they are never stored.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::Clock;

/// Progress of a certification. Any value may follow any other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificationStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl CertificationStatus {
    pub const ALL: [CertificationStatus; 3] = [
        CertificationStatus::NotStarted,
        CertificationStatus::InProgress,
        CertificationStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificationStatus::NotStarted => "Not Started",
            CertificationStatus::InProgress => "In Progress",
            CertificationStatus::Completed => "Completed",
        }
    }
}

impl Display for CertificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name one of the three statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl FromStr for CertificationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CertificationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Unvalidated field values for a new certification.
///
/// `status` stays as raw text so an unknown value can be reported back to the
/// caller instead of failing deserialization.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationCandidate {
    pub name: Option<String>,
    pub provider: Option<String>,
    #[serde(deserialize_with = "deserialize_calendar_day")]
    pub target_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub study_hours_goal: Option<f64>,
}

/// Fields to change on a committed certification. Absent fields are kept.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationPatch {
    pub name: Option<String>,
    pub provider: Option<String>,
    #[serde(deserialize_with = "deserialize_calendar_day")]
    pub target_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub study_hours_goal: Option<f64>,
}

impl CertificationPatch {
    /// Overlays this patch on a committed record, producing a candidate that
    /// goes through the same pipeline as a fresh insert.
    pub fn apply_to(&self, record: &CertificationRecord) -> CertificationCandidate {
        CertificationCandidate {
            name: Some(self.name.clone().unwrap_or_else(|| record.name.clone())),
            provider: Some(self.provider.clone().unwrap_or_else(|| record.provider.clone())),
            target_date: self.target_date.or(record.target_date),
            status: Some(
                self.status
                    .clone()
                    .unwrap_or_else(|| record.status.as_str().to_string()),
            ),
            study_hours_goal: self.study_hours_goal.or(record.study_hours_goal),
        }
    }
}

/// A candidate whose every field passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCertification {
    pub name: String,
    pub provider: String,
    pub target_date: Option<NaiveDate>,
    pub status: CertificationStatus,
    pub study_hours_goal: Option<f64>,
}

impl ValidCertification {
    /// Stamps a brand new record.
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> CertificationRecord {
        CertificationRecord {
            id,
            name: self.name,
            provider: self.provider,
            target_date: self.target_date,
            status: self.status,
            study_hours_goal: self.study_hours_goal,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the fields of an existing record, keeping its id and
    /// creation time.
    pub fn into_updated(self, existing: &CertificationRecord, now: DateTime<Utc>) -> CertificationRecord {
        CertificationRecord {
            id: existing.id.clone(),
            created_at: existing.created_at,
            ..self.into_record(String::new(), now)
        }
    }
}

/// A committed certification as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationRecord {
    pub id: String,
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub status: CertificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_hours_goal: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record together with its derived properties, as returned to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationView {
    #[serde(flatten)]
    pub record: CertificationRecord,
    pub is_overdue: bool,
    pub days_until_target: Option<i64>,
}

impl CertificationView {
    pub fn new(record: CertificationRecord, clock: &impl Clock) -> Self {
        let is_overdue = is_overdue(&record, clock);
        let days_until_target = days_until_target(&record, clock);
        Self { record, is_overdue, days_until_target }
    }
}

/// True when the target day has passed and the certification is not done.
///
/// Only calendar days are compared: a target of today is never overdue.
pub fn is_overdue(record: &CertificationRecord, clock: &impl Clock) -> bool {
    match record.target_date {
        None => false,
        Some(_) if record.status == CertificationStatus::Completed => false,
        Some(target) => clock.today() > target,
    }
}

/// Whole days from today to the target day; negative once it has passed.
pub fn days_until_target(record: &CertificationRecord, clock: &impl Clock) -> Option<i64> {
    record
        .target_date
        .map(|target| target.signed_duration_since(clock.today()).num_days())
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp. A timestamp keeps the
/// calendar day of its own offset; the time of day is dropped.
fn deserialize_calendar_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(day));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|instant| Some(instant.date_naive()))
        .map_err(|e| serde::de::Error::custom(format!("invalid target date '{raw}': {e}")))
}
