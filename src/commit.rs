//! The commit path: trim, validate, normalize, then persist.
//!
//! Nothing is written unless every rule passes. The name lookup done here is
//! advisory so the caller gets every error in one pass; the store's name
//! index still has the final word at insert time.

use log::{debug, info};
use uuid::Uuid;

use crate::cert_db_state::CertDbState;
use crate::certification::{CertificationCandidate, CertificationPatch, CertificationRecord};
use crate::clock::Clock;
use crate::error::CertError;
use crate::validation::{self, FieldError, ValidationErrors};

/// Validates `candidate` and commits it as a new record.
///
/// # Errors
///
/// [`CertError::Validation`] with every failing field, including a
/// uniqueness error when the name is taken. Storage failures pass through.
pub fn create_certification(
    store: &CertDbState,
    clock: &impl Clock,
    candidate: CertificationCandidate,
) -> Result<CertificationRecord, CertError> {
    let candidate = validation::trim_fields(candidate);
    let checked = validation::validate(&candidate, clock).map(validation::normalize);
    let duplicate = name_taken_by_other(store, candidate.name.as_deref(), None)?;

    let valid = match (checked, duplicate) {
        (Ok(valid), None) => valid,
        (checked, duplicate) => return Err(collect_errors(checked.err(), duplicate).into()),
    };

    let record = valid.into_record(Uuid::new_v4().to_string(), clock.now());
    let committed = store.create(&record)?;
    info!("Committed certification '{}' ({})", committed.name, committed.id);
    Ok(committed)
}

/// Applies `patch` to the record with `id` and commits the result.
///
/// The past-date rule only applies when the patch sets a target date.
///
/// # Errors
///
/// [`CertError::NotFound`] if no record has `id`, otherwise as
/// [`create_certification`].
pub fn update_certification(
    store: &CertDbState,
    clock: &impl Clock,
    id: &str,
    patch: CertificationPatch,
) -> Result<CertificationRecord, CertError> {
    let existing = store
        .get_by_id(id)?
        .ok_or_else(|| CertError::NotFound(id.to_string()))?;

    let candidate = validation::trim_fields(patch.apply_to(&existing));
    let checked = if patch.target_date.is_some() {
        validation::validate(&candidate, clock)
    } else {
        validation::validate_keeping_target_date(&candidate, clock)
    }
    .map(validation::normalize);
    let duplicate = name_taken_by_other(store, candidate.name.as_deref(), Some(id))?;

    let valid = match (checked, duplicate) {
        (Ok(valid), None) => valid,
        (checked, duplicate) => return Err(collect_errors(checked.err(), duplicate).into()),
    };

    let record = valid.into_updated(&existing, clock.now());
    let updated = store
        .update(&record)?
        .ok_or_else(|| CertError::NotFound(id.to_string()))?;
    debug!("Updated certification {}", updated.id);
    Ok(updated)
}

pub fn get_certification(store: &CertDbState, id: &str) -> Result<CertificationRecord, CertError> {
    store
        .get_by_id(id)?
        .ok_or_else(|| CertError::NotFound(id.to_string()))
}

pub fn list_certifications(store: &CertDbState) -> Result<Vec<CertificationRecord>, CertError> {
    store.get_all()
}

pub fn count_certifications(store: &CertDbState) -> Result<usize, CertError> {
    store.count()
}

/// Removes a record. No other rule applies on delete.
pub fn delete_certification(store: &CertDbState, id: &str) -> Result<(), CertError> {
    if store.delete_by_id(id)? {
        info!("Deleted certification {id}");
        Ok(())
    } else {
        Err(CertError::NotFound(id.to_string()))
    }
}

fn name_taken_by_other(
    store: &CertDbState,
    name: Option<&str>,
    own_id: Option<&str>,
) -> Result<Option<FieldError>, CertError> {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    Ok(match store.find_id_by_name(name)? {
        Some(holder) if Some(holder.as_str()) != own_id => Some(FieldError::duplicate_name(name)),
        _ => None,
    })
}

fn collect_errors(shape: Option<ValidationErrors>, duplicate: Option<FieldError>) -> ValidationErrors {
    let mut errors = shape.unwrap_or_default();
    if let Some(duplicate) = duplicate {
        if errors.for_field(duplicate.field()).is_none() {
            errors.push(duplicate);
        }
    }
    errors
}
