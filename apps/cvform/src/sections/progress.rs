use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{FieldId, FormState};
use crate::validation::ValidationResult;

/// The five form sections that each count for one fifth of the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSection {
    Personal,
    Education,
    Experience,
    Skills,
    Other,
}

impl ProgressSection {
    pub const ALL: [ProgressSection; 5] = [
        ProgressSection::Personal,
        ProgressSection::Education,
        ProgressSection::Experience,
        ProgressSection::Skills,
        ProgressSection::Other,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProgress {
    pub section: ProgressSection,
    pub required: usize,
    pub satisfied: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// 0.0 – 100.0
    pub percent: f64,
    pub completed: usize,
    pub total: usize,
    pub sections: Vec<SectionProgress>,
}

impl Progress {
    /// "Step 2 of 5 completed" style caption for the progress bar.
    pub fn caption(&self) -> String {
        format!("Step {} of {} completed", self.completed, self.total)
    }
}

/// Scalar required fields of a section. Entry fields are handled separately.
fn required_fields(section: ProgressSection, state: &FormState) -> Vec<FieldId> {
    match section {
        ProgressSection::Personal => FieldId::REQUIRED.to_vec(),
        ProgressSection::Skills => vec![FieldId::Skills],
        ProgressSection::Other if state.has_drivers_license() => vec![
            FieldId::DriversLicense,
            FieldId::LicenseType,
            FieldId::LicenseExpiry,
        ],
        ProgressSection::Other => vec![FieldId::DriversLicense],
        ProgressSection::Education | ProgressSection::Experience => Vec::new(),
    }
}

/// Required entry values of a section; entries carry no rule beyond "not blank".
fn required_entry_values(section: ProgressSection, state: &FormState) -> Vec<&str> {
    match section {
        ProgressSection::Education => state
            .education
            .iter()
            .flat_map(|e| [e.institution.as_str(), e.title.as_str()])
            .collect(),
        ProgressSection::Experience => state
            .experience
            .iter()
            .flat_map(|e| [e.employer.as_str(), e.role.as_str(), e.start_date.as_str()])
            .collect(),
        _ => Vec::new(),
    }
}

/// Computes progress from the current state and the latest verdicts.
///
/// A field counts when it is non-blank and not currently marked invalid; a field that
/// has never been validated is not marked invalid. A section is complete only when it
/// has at least one required field and all of them count.
pub fn compute_progress(
    state: &FormState,
    results: &BTreeMap<FieldId, ValidationResult>,
) -> Progress {
    let sections: Vec<SectionProgress> = ProgressSection::ALL
        .into_iter()
        .map(|section| {
            let fields = required_fields(section, state);
            let entry_values = required_entry_values(section, state);

            let fields_ok = fields
                .iter()
                .filter(|f| {
                    !state.is_blank(**f) && results.get(*f).map_or(true, |r| r.is_valid)
                })
                .count();
            let entries_ok = entry_values.iter().filter(|v| !v.trim().is_empty()).count();

            let required = fields.len() + entry_values.len();
            let satisfied = fields_ok + entries_ok;
            SectionProgress {
                section,
                required,
                satisfied,
                complete: required > 0 && satisfied == required,
            }
        })
        .collect();

    let total = sections.len();
    let completed = sections.iter().filter(|s| s.complete).count();
    Progress {
        percent: completed as f64 / total as f64 * 100.0,
        completed,
        total,
        sections,
    }
}
