//! Field rules for the Argentine CV form.
//!
//! Every rule is a plain function over the raw value plus a read-only view of the rest
//! of the form, so each one can be tested on its own and the registry can map field
//! identifiers to them without any string dispatch.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::FormState;
use crate::validation::dates::{age_on, parse_date};

pub const MAX_SKILLS: usize = 5;
pub const MAX_ADDRESS_CHARS: usize = 200;
pub const PHONE_DIGITS: usize = 10;
pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 100;
pub const DNI_MIN: u32 = 1_000_000;
pub const DNI_MAX: u32 = 99_999_999;

/// CUIL check-digit weights for digits 1–10.
const CUIL_WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

pub const MSG_REQUIRED: &str = "Required field.";
pub const MSG_NAME: &str = "Letters and spaces only, 2-100 characters.";
pub const MSG_ADDRESS: &str = "At most 200 characters.";
pub const MSG_PHONE_LENGTH: &str = "Must have exactly 10 characters.";
pub const MSG_EMAIL: &str = "Invalid email.";
pub const MSG_AGE: &str = "Must be over 18 and under 100.";
pub const MSG_CUIL_FORMAT: &str = "Exactly 11 digits.";
pub const MSG_CUIL_CHECK: &str = "Invalid CUIL (wrong check digit).";
pub const MSG_DNI: &str = "7-8 digits, realistic range.";
pub const MSG_LICENSE_DATE: &str = "Must be a valid date.";
pub const MSG_LICENSE_EXPIRED: &str = "Must be current (not expired).";

/// Read-only context a rule may consult besides its own value.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub state: &'a FormState,
    pub today: NaiveDate,
}

/// A field rule: `Ok(())` when valid, otherwise the message to show next to the field.
pub type Rule = fn(&str, &FieldContext<'_>) -> Result<(), String>;

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z\s]{2,100}$").expect("static name pattern"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("static email pattern")
    })
}

fn cuil_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{11}$").expect("static cuil pattern"))
}

fn dni_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{7,8}$").expect("static dni pattern"))
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

pub fn required(value: &str, _: &FieldContext<'_>) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(MSG_REQUIRED.to_string());
    }
    Ok(())
}

pub fn always_valid(_: &str, _: &FieldContext<'_>) -> Result<(), String> {
    Ok(())
}

pub fn name(value: &str, _: &FieldContext<'_>) -> Result<(), String> {
    if !name_regex().is_match(value) {
        return Err(MSG_NAME.to_string());
    }
    Ok(())
}

pub fn address(value: &str, _: &FieldContext<'_>) -> Result<(), String> {
    if value.chars().count() > MAX_ADDRESS_CHARS {
        return Err(MSG_ADDRESS.to_string());
    }
    Ok(())
}

/// Spaces and hyphens are formatting; what remains must be exactly 10 characters.
pub fn phone(value: &str, ctx: &FieldContext<'_>) -> Result<(), String> {
    required(value, ctx)?;
    let compact = value
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .count();
    if compact != PHONE_DIGITS {
        return Err(MSG_PHONE_LENGTH.to_string());
    }
    Ok(())
}

pub fn email(value: &str, _: &FieldContext<'_>) -> Result<(), String> {
    if !email_regex().is_match(value) {
        return Err(MSG_EMAIL.to_string());
    }
    Ok(())
}

pub fn birth_date(value: &str, ctx: &FieldContext<'_>) -> Result<(), String> {
    let age = parse_date(value).map(|birth| age_on(birth, ctx.today));
    match age {
        Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Ok(()),
        _ => Err(MSG_AGE.to_string()),
    }
}

pub fn tax_id(value: &str, _: &FieldContext<'_>) -> Result<(), String> {
    if !cuil_regex().is_match(value) {
        return Err(MSG_CUIL_FORMAT.to_string());
    }
    if !cuil_check_digit_matches(value) {
        return Err(MSG_CUIL_CHECK.to_string());
    }
    Ok(())
}

pub fn national_id(value: &str, _: &FieldContext<'_>) -> Result<(), String> {
    let in_range = dni_regex().is_match(value)
        && value
            .parse::<u32>()
            .is_ok_and(|n| (DNI_MIN..=DNI_MAX).contains(&n));
    if !in_range {
        return Err(MSG_DNI.to_string());
    }
    Ok(())
}

/// Too many skills is flagged, never truncated.
pub fn skills(value: &str, _: &FieldContext<'_>) -> Result<(), String> {
    let count = crate::models::parse_skills(value).len();
    if count > MAX_SKILLS {
        return Err(format!("At most {MAX_SKILLS} skills ({count} given)."));
    }
    Ok(())
}

/// Only meaningful with a driver's license; today's date still counts as current.
pub fn license_expiry(value: &str, ctx: &FieldContext<'_>) -> Result<(), String> {
    if !ctx.state.has_drivers_license() {
        return Ok(());
    }
    required(value, ctx)?;
    let expiry = parse_date(value).ok_or_else(|| MSG_LICENSE_DATE.to_string())?;
    if expiry < ctx.today {
        return Err(MSG_LICENSE_EXPIRED.to_string());
    }
    Ok(())
}

pub fn license_type(value: &str, ctx: &FieldContext<'_>) -> Result<(), String> {
    if !ctx.state.has_drivers_license() {
        return Ok(());
    }
    required(value, ctx)
}

// ────────────────────────────────────────────────────────────────────────────
// Checksum
// ────────────────────────────────────────────────────────────────────────────

/// Modulo-10 CUIL check: `verifier = 11 - (Σ dᵢ·wᵢ mod 10)`, where 11 maps to 0 and
/// 10 maps to 9. Expects exactly 11 ASCII digits.
pub fn cuil_check_digit_matches(cuil: &str) -> bool {
    let digits: Vec<u32> = cuil.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    let sum: u32 = digits[..10]
        .iter()
        .zip(CUIL_WEIGHTS)
        .map(|(d, w)| d * w)
        .sum();
    let expected = match 11 - (sum % 10) {
        11 => 0,
        10 => 9,
        v => v,
    };
    digits[10] == expected
}
