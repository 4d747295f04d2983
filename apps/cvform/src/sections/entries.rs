//! Repeatable sections: education and experience lists.
//!
//! Entries are positional: index 0 is the first entry the user added, and that order
//! survives draft save/restore. Output ordering is the document assembler's business.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::FormError;
use crate::models::{EducationEntry, ExperienceEntry, FormState};

/// Hard cap on experience entries per session. Education is uncapped.
pub const MAX_EXPERIENCE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Education,
    Experience,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Education => "education",
            SectionKind::Experience => "experience",
        }
    }

    pub fn capacity(self) -> Option<usize> {
        match self {
            SectionKind::Education => None,
            SectionKind::Experience => Some(MAX_EXPERIENCE),
        }
    }

    pub fn len_in(self, state: &FormState) -> usize {
        match self {
            SectionKind::Education => state.education.len(),
            SectionKind::Experience => state.experience.len(),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Institution,
    Title,
    StartDate,
    EndDate,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Employer,
    Role,
    StartDate,
    EndDate,
    Description,
}

/// Appends a blank entry and returns its index. A full experience section is left
/// untouched and reported as a capacity error.
pub fn add_entry(state: &mut FormState, kind: SectionKind) -> Result<usize, FormError> {
    let len = kind.len_in(state);
    if let Some(max) = kind.capacity() {
        if len >= max {
            return Err(FormError::Capacity {
                what: format!("{kind} entries"),
                max,
            });
        }
    }
    match kind {
        SectionKind::Education => state.education.push(EducationEntry::default()),
        SectionKind::Experience => state.experience.push(ExperienceEntry::default()),
    }
    Ok(len)
}

/// Trims a restored or imported form down to the section caps, keeping the first
/// entries. Reports the capacity error when anything was dropped.
pub fn enforce_capacity(state: &mut FormState) -> Result<(), FormError> {
    let kind = SectionKind::Experience;
    match kind.capacity() {
        Some(max) if state.experience.len() > max => {
            state.experience.truncate(max);
            Err(FormError::Capacity {
                what: format!("{kind} entries"),
                max,
            })
        }
        _ => Ok(()),
    }
}

pub fn remove_entry(state: &mut FormState, kind: SectionKind, index: usize) -> Result<(), FormError> {
    check_index(state, kind, index)?;
    match kind {
        SectionKind::Education => {
            state.education.remove(index);
        }
        SectionKind::Experience => {
            state.experience.remove(index);
        }
    }
    Ok(())
}

pub fn set_education_field(
    state: &mut FormState,
    index: usize,
    field: EducationField,
    value: impl Into<String>,
) -> Result<(), FormError> {
    check_index(state, SectionKind::Education, index)?;
    let entry = &mut state.education[index];
    let value = value.into();
    match field {
        EducationField::Institution => entry.institution = value,
        EducationField::Title => entry.title = value,
        EducationField::StartDate => entry.start_date = value,
        EducationField::EndDate => entry.end_date = value,
        EducationField::Description => entry.description = value,
    }
    Ok(())
}

/// Setting the end date also clears the "current position" marker.
pub fn set_experience_field(
    state: &mut FormState,
    index: usize,
    field: ExperienceField,
    value: impl Into<String>,
) -> Result<(), FormError> {
    check_index(state, SectionKind::Experience, index)?;
    let entry = &mut state.experience[index];
    let value = value.into();
    match field {
        ExperienceField::Employer => entry.employer = value,
        ExperienceField::Role => entry.role = value,
        ExperienceField::StartDate => entry.start_date = value,
        ExperienceField::EndDate => entry.end_date = Some(value),
        ExperienceField::Description => entry.description = value,
    }
    Ok(())
}

/// Marks or unmarks an entry as the current position. Unmarking leaves a blank end date.
pub fn set_experience_current(
    state: &mut FormState,
    index: usize,
    current: bool,
) -> Result<(), FormError> {
    check_index(state, SectionKind::Experience, index)?;
    let entry = &mut state.experience[index];
    if current {
        entry.end_date = None;
    } else if entry.end_date.is_none() {
        entry.end_date = Some(String::new());
    }
    Ok(())
}

fn check_index(state: &FormState, kind: SectionKind, index: usize) -> Result<(), FormError> {
    let len = kind.len_in(state);
    if index >= len {
        return Err(FormError::EntryIndex {
            section: kind.as_str().to_string(),
            index,
            len,
        });
    }
    Ok(())
}
