//! Form state: the single mutable source of truth for one editing session.
//!
//! Field values are kept as the raw strings the UI layer hands over; typed views
//! (dates, skill lists, the license flag) are derived on demand so nothing can drift
//! away from what the user actually typed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of the driver's-license selector that enables the license subsection.
pub const AFFIRMATIVE: &str = "yes";

// ────────────────────────────────────────────────────────────────────────────
// Field identifiers
// ────────────────────────────────────────────────────────────────────────────

/// Every scalar field of the CV form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    Name,
    Address,
    Locality,
    Phone,
    Email,
    MaritalStatus,
    BirthDate,
    /// Derived from `BirthDate`; never typed by the user.
    Age,
    Nationality,
    /// CUIL, 11 digits with a check digit.
    TaxId,
    /// DNI, 7–8 digits.
    NationalId,
    Objective,
    Skills,
    DriversLicense,
    LicenseType,
    LicenseExpiry,
}

impl FieldId {
    pub const ALL: [FieldId; 16] = [
        FieldId::Name,
        FieldId::Address,
        FieldId::Locality,
        FieldId::Phone,
        FieldId::Email,
        FieldId::MaritalStatus,
        FieldId::BirthDate,
        FieldId::Age,
        FieldId::Nationality,
        FieldId::TaxId,
        FieldId::NationalId,
        FieldId::Objective,
        FieldId::Skills,
        FieldId::DriversLicense,
        FieldId::LicenseType,
        FieldId::LicenseExpiry,
    ];

    /// Fields that must be filled in before a document can be generated, in form order.
    pub const REQUIRED: [FieldId; 10] = [
        FieldId::Name,
        FieldId::Address,
        FieldId::Locality,
        FieldId::Phone,
        FieldId::Email,
        FieldId::MaritalStatus,
        FieldId::BirthDate,
        FieldId::Nationality,
        FieldId::TaxId,
        FieldId::NationalId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::Address => "address",
            FieldId::Locality => "locality",
            FieldId::Phone => "phone",
            FieldId::Email => "email",
            FieldId::MaritalStatus => "maritalStatus",
            FieldId::BirthDate => "birthDate",
            FieldId::Age => "age",
            FieldId::Nationality => "nationality",
            FieldId::TaxId => "taxId",
            FieldId::NationalId => "nationalId",
            FieldId::Objective => "objective",
            FieldId::Skills => "skills",
            FieldId::DriversLicense => "driversLicense",
            FieldId::LicenseType => "licenseType",
            FieldId::LicenseExpiry => "licenseExpiry",
        }
    }

    /// Human-readable label used in missing-field notices.
    pub fn label(self) -> &'static str {
        match self {
            FieldId::Name => "Full name",
            FieldId::Address => "Address",
            FieldId::Locality => "Locality",
            FieldId::Phone => "Phone",
            FieldId::Email => "Email",
            FieldId::MaritalStatus => "Marital status",
            FieldId::BirthDate => "Date of birth",
            FieldId::Age => "Age",
            FieldId::Nationality => "Nationality",
            FieldId::TaxId => "CUIL",
            FieldId::NationalId => "DNI",
            FieldId::Objective => "Career objective",
            FieldId::Skills => "Skills",
            FieldId::DriversLicense => "Driver's license",
            FieldId::LicenseType => "License type",
            FieldId::LicenseExpiry => "License expiry",
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Repeatable entries
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub institution: String,
    pub title: String,
    pub start_date: String,
    /// Completion date; sorted by its leading year digits, not as a date.
    pub end_date: String,
    pub description: String,
}

impl EducationEntry {
    /// Entries without an institution are UI placeholders and never leave the session.
    pub fn is_filled(&self) -> bool {
        !self.institution.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default)]
    pub employer: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub start_date: String,
    /// `None` marks the current position.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Default for ExperienceEntry {
    /// A freshly added entry has an empty end date, not the "current position" marker.
    fn default() -> Self {
        Self {
            employer: String::new(),
            role: String::new(),
            start_date: String::new(),
            end_date: Some(String::new()),
            description: String::new(),
        }
    }
}

impl ExperienceEntry {
    pub fn is_filled(&self) -> bool {
        !self.employer.trim().is_empty()
    }

    pub fn is_current(&self) -> bool {
        self.end_date.is_none()
    }

    /// End date to print, or `None` when the position is ongoing or the date is blank.
    pub fn finished_on(&self) -> Option<&str> {
        self.end_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Non-blank description lines, trimmed. One bullet each in the document.
    pub fn description_lines(&self) -> Vec<&str> {
        self.description
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Photo
// ────────────────────────────────────────────────────────────────────────────

/// Profile photo embedded as a `data:` URL so it survives the draft round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddedPhoto {
    pub data_url: String,
}

impl EmbeddedPhoto {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    /// MIME type declared in the data URL header, if well-formed.
    pub fn mime(&self) -> Option<&str> {
        self.data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Form state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormState {
    pub fields: BTreeMap<FieldId, String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub photo: Option<EmbeddedPhoto>,
}

impl FormState {
    /// Raw value of a field; unset fields read as the empty string.
    pub fn value(&self, field: FieldId) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn clear(&mut self, field: FieldId) {
        self.fields.remove(&field);
    }

    pub fn is_blank(&self, field: FieldId) -> bool {
        self.value(field).trim().is_empty()
    }

    pub fn has_drivers_license(&self) -> bool {
        is_affirmative(self.value(FieldId::DriversLicense))
    }

    pub fn skills(&self) -> Vec<&str> {
        parse_skills(self.value(FieldId::Skills))
    }

    /// Required fields that are blank, in form order.
    pub fn missing_required(&self) -> Vec<FieldId> {
        FieldId::REQUIRED
            .into_iter()
            .filter(|f| self.is_blank(*f))
            .collect()
    }

    /// Copy of this state with placeholder entries dropped, as persisted and rendered.
    pub fn filled_entries_only(&self) -> FormState {
        FormState {
            fields: self.fields.clone(),
            education: self
                .education
                .iter()
                .filter(|e| e.is_filled())
                .cloned()
                .collect(),
            experience: self
                .experience
                .iter()
                .filter(|e| e.is_filled())
                .cloned()
                .collect(),
            photo: self.photo.clone(),
        }
    }
}

/// Accepts the English value plus the Spanish spellings older drafts carry.
pub fn is_affirmative(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), AFFIRMATIVE | "sí" | "si")
}

/// Splits the comma-delimited skills field. Duplicates are kept; empty segments dropped.
pub fn parse_skills(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
