//! Field → rule registry. Replaces per-field string dispatch with a lookup table that
//! is built once and shared by every session.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{FieldId, FormState};
use crate::validation::rules::{self, FieldContext, Rule};

/// Verdict for one field. Recomputed on every relevant change; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub field: FieldId,
    pub is_valid: bool,
    /// Empty when valid.
    pub message: String,
}

impl ValidationResult {
    pub fn valid(field: FieldId) -> Self {
        Self {
            field,
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(field: FieldId, message: impl Into<String>) -> Self {
        Self {
            field,
            is_valid: false,
            message: message.into(),
        }
    }

    fn from_verdict(field: FieldId, verdict: Result<(), String>) -> Self {
        match verdict {
            Ok(()) => Self::valid(field),
            Err(message) => Self::invalid(field, message),
        }
    }
}

pub struct ValidatorRegistry {
    rules: BTreeMap<FieldId, Rule>,
}

impl ValidatorRegistry {
    fn build() -> Self {
        let table: [(FieldId, Rule); 16] = [
            (FieldId::Name, rules::name),
            (FieldId::Address, rules::address),
            (FieldId::Locality, rules::required),
            (FieldId::Phone, rules::phone),
            (FieldId::Email, rules::email),
            (FieldId::MaritalStatus, rules::required),
            (FieldId::BirthDate, rules::birth_date),
            (FieldId::Age, rules::always_valid),
            (FieldId::Nationality, rules::required),
            (FieldId::TaxId, rules::tax_id),
            (FieldId::NationalId, rules::national_id),
            (FieldId::Objective, rules::always_valid),
            (FieldId::Skills, rules::skills),
            (FieldId::DriversLicense, rules::required),
            (FieldId::LicenseType, rules::license_type),
            (FieldId::LicenseExpiry, rules::license_expiry),
        ];
        Self {
            rules: table.into_iter().collect(),
        }
    }

    pub fn global() -> &'static ValidatorRegistry {
        static REGISTRY: OnceLock<ValidatorRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ValidatorRegistry::build)
    }

    /// Fields without a registered rule accept anything.
    pub fn rule_for(&self, field: FieldId) -> Rule {
        self.rules
            .get(&field)
            .copied()
            .unwrap_or(rules::always_valid)
    }

    pub fn validate(&self, field: FieldId, state: &FormState, today: NaiveDate) -> ValidationResult {
        let ctx = FieldContext { state, today };
        let verdict = (self.rule_for(field))(state.value(field), &ctx);
        debug!(field = %field, valid = verdict.is_ok(), "validated field");
        ValidationResult::from_verdict(field, verdict)
    }

    /// Validates every field, keyed by field.
    pub fn validate_all(
        &self,
        state: &FormState,
        today: NaiveDate,
    ) -> BTreeMap<FieldId, ValidationResult> {
        FieldId::ALL
            .into_iter()
            .map(|field| (field, self.validate(field, state, today)))
            .collect()
    }
}
