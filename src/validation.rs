//! Normalization and field constraint rules for certifications.
//!
//! The commit path runs these as explicit steps:
//!
//! ```text
//! trim_fields(candidate) -> candidate'
//! validate(candidate', clock) -> Result<ValidCertification, ValidationErrors>
//! normalize(valid) -> valid'
//! ```
//!
//! Length limits see the trimmed text as supplied; provider capitalization
//! only happens once every rule has passed.
//!
//! Validation never stops at the first problem; every failing field is
//! reported so the caller can fix them all in one round trip.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::certification::{CertificationCandidate, CertificationStatus, ValidCertification};
use crate::clock::Clock;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 100;
pub const PROVIDER_MAX_LEN: usize = 60;
pub const STUDY_HOURS_MIN: f64 = 0.0;
pub const STUDY_HOURS_MAX: f64 = 1000.0;

/// The certification fields a rule can reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Provider,
    TargetDate,
    Status,
    StudyHoursGoal,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Provider => "provider",
            Field::TargetDate => "targetDate",
            Field::Status => "status",
            Field::StudyHoursGoal => "studyHoursGoal",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected field, tagged with the constraint that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldError {
    #[error("{field}: {message}")]
    Required { field: Field, message: String },
    #[error("{field}: {message}")]
    Length { field: Field, message: String },
    #[error("{field}: {message}")]
    Range { field: Field, message: String },
    #[error("{field}: {message}")]
    Enum { field: Field, message: String },
    #[error("{field}: {message}")]
    PastDate { field: Field, message: String },
    #[error("{field}: {message}")]
    Uniqueness { field: Field, message: String },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required { field, .. }
            | FieldError::Length { field, .. }
            | FieldError::Range { field, .. }
            | FieldError::Enum { field, .. }
            | FieldError::PastDate { field, .. }
            | FieldError::Uniqueness { field, .. } => *field,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FieldError::Required { message, .. }
            | FieldError::Length { message, .. }
            | FieldError::Range { message, .. }
            | FieldError::Enum { message, .. }
            | FieldError::PastDate { message, .. }
            | FieldError::Uniqueness { message, .. } => message,
        }
    }

    pub fn duplicate_name(name: &str) -> Self {
        FieldError::Uniqueness {
            field: Field::Name,
            message: format!("A certification named '{name}' already exists"),
        }
    }

    pub fn is_uniqueness(&self) -> bool {
        matches!(self, FieldError::Uniqueness { .. })
    }
}

/// Every field error raised by one commit attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// First error recorded against `field`, if any.
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field() == field)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trims surrounding whitespace from `name` and `provider`.
pub fn trim_fields(mut candidate: CertificationCandidate) -> CertificationCandidate {
    candidate.name = candidate.name.map(|name| name.trim().to_string());
    candidate.provider = candidate.provider.map(|provider| provider.trim().to_string());
    candidate
}

/// Capitalizes the first character of a validated provider.
///
/// Only the first character changes; the rest is kept as supplied, so
/// `"aZUrE"` becomes `"AZUrE"`. Running it again is a no-op.
pub fn normalize(mut valid: ValidCertification) -> ValidCertification {
    valid.provider = capitalize_first(&valid.provider);
    valid
}

pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Applies every shape rule to a trimmed candidate.
///
/// Uniqueness of the name is not checked here; it needs the store.
pub fn validate(
    candidate: &CertificationCandidate,
    clock: &impl Clock,
) -> Result<ValidCertification, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = check_name(candidate.name.as_deref(), &mut errors);
    let provider = check_provider(candidate.provider.as_deref(), &mut errors);
    check_target_date(candidate, clock, &mut errors);
    let status = check_status(candidate.status.as_deref(), &mut errors);
    check_study_hours(candidate.study_hours_goal, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidCertification {
        name: name.unwrap_or_default(),
        provider: provider.unwrap_or_default(),
        target_date: candidate.target_date,
        status,
        study_hours_goal: candidate.study_hours_goal,
    })
}

/// Same as [`validate`] but without the past-date rule. Used for updates that
/// leave an already committed target date untouched.
pub fn validate_keeping_target_date(
    candidate: &CertificationCandidate,
    clock: &impl Clock,
) -> Result<ValidCertification, ValidationErrors> {
    let without_date = CertificationCandidate {
        target_date: None,
        ..candidate.clone()
    };
    validate(&without_date, clock).map(|mut valid| {
        valid.target_date = candidate.target_date;
        valid
    })
}

fn check_name(name: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let name = match name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => {
            errors.push(FieldError::Required {
                field: Field::Name,
                message: "Please add a certification name".to_string(),
            });
            return None;
        }
    };

    let len = name.chars().count();
    if len < NAME_MIN_LEN {
        errors.push(FieldError::Length {
            field: Field::Name,
            message: format!("Certification name must be at least {NAME_MIN_LEN} characters"),
        });
        return None;
    }
    if len > NAME_MAX_LEN {
        errors.push(FieldError::Length {
            field: Field::Name,
            message: format!("Certification name cannot exceed {NAME_MAX_LEN} characters"),
        });
        return None;
    }

    Some(name.to_string())
}

fn check_provider(provider: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let provider = match provider.map(str::trim) {
        Some(provider) if !provider.is_empty() => provider,
        _ => {
            errors.push(FieldError::Required {
                field: Field::Provider,
                message: "Please add a certification provider (e.g., AWS, Azure)".to_string(),
            });
            return None;
        }
    };

    if provider.chars().count() > PROVIDER_MAX_LEN {
        errors.push(FieldError::Length {
            field: Field::Provider,
            message: format!("Provider name cannot exceed {PROVIDER_MAX_LEN} characters"),
        });
        return None;
    }

    Some(provider.to_string())
}

fn check_target_date(
    candidate: &CertificationCandidate,
    clock: &impl Clock,
    errors: &mut ValidationErrors,
) {
    if let Some(target) = candidate.target_date {
        if target < clock.today() {
            errors.push(FieldError::PastDate {
                field: Field::TargetDate,
                message: format!("Target date {target} cannot be in the past"),
            });
        }
    }
}

fn check_status(status: Option<&str>, errors: &mut ValidationErrors) -> CertificationStatus {
    match status {
        None => CertificationStatus::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.push(FieldError::Enum {
                field: Field::Status,
                message: format!(
                    "{raw} is not a valid status. Must be: Not Started, In Progress, or Completed"
                ),
            });
            CertificationStatus::default()
        }),
    }
}

fn check_study_hours(goal: Option<f64>, errors: &mut ValidationErrors) {
    let Some(goal) = goal else {
        return;
    };

    if goal.is_nan() {
        errors.push(FieldError::Range {
            field: Field::StudyHoursGoal,
            message: "Study hours goal must be a number".to_string(),
        });
    } else if goal < STUDY_HOURS_MIN {
        errors.push(FieldError::Range {
            field: Field::StudyHoursGoal,
            message: "Study hours goal cannot be negative".to_string(),
        });
    } else if goal > STUDY_HOURS_MAX {
        errors.push(FieldError::Range {
            field: Field::StudyHoursGoal,
            message: "Study hours goal cannot exceed 1000".to_string(),
        });
    }
}
