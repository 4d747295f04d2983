//! Derived fields and inter-field dependencies.
//!
//! A change is applied in one pass: write the value, refresh derived values, then
//! validate the changed field and its dependents exactly once. Writing a derived value
//! never schedules another derivation.

use chrono::NaiveDate;

use crate::models::{FieldId, FormState};
use crate::validation::dates::{age_on, parse_date};
use crate::validation::registry::{ValidationResult, ValidatorRegistry};

/// Fields whose verdict depends on the value of `field`.
pub fn dependents_of(field: FieldId) -> &'static [FieldId] {
    match field {
        FieldId::DriversLicense => &[FieldId::LicenseType, FieldId::LicenseExpiry],
        _ => &[],
    }
}

/// Writes the age derived from the birth date, or clears it when the date does not parse.
/// Returns the age written.
pub fn recompute_age(state: &mut FormState, today: NaiveDate) -> Option<i32> {
    match parse_date(state.value(FieldId::BirthDate)) {
        Some(birth) => {
            let age = age_on(birth, today);
            state.set(FieldId::Age, age.to_string());
            Some(age)
        }
        None => {
            state.clear(FieldId::Age);
            None
        }
    }
}

/// Applies one user edit. The first result is always the edited field's own verdict.
pub fn apply_change(
    state: &mut FormState,
    field: FieldId,
    value: impl Into<String>,
    registry: &ValidatorRegistry,
    today: NaiveDate,
) -> Vec<ValidationResult> {
    state.set(field, value);
    if field == FieldId::BirthDate {
        recompute_age(state, today);
    }

    let mut results = vec![registry.validate(field, state, today)];
    results.extend(
        dependents_of(field)
            .iter()
            .map(|dependent| registry.validate(*dependent, state, today)),
    );
    results
}
