//! FormState → DocumentTree.
//!
//! Pure and deterministic: the same form always yields the same tree. Placeholder
//! entries are dropped, experience is ordered by start date and education by the year
//! its end-date field starts with.

use std::cmp::Ordering;

use crate::document::styles::{self, COLUMN_BACKGROUND, NAME_FONT_SIZE};
use crate::document::tree::{
    Alignment, Block, Column, ColumnWidth, DocumentTree, StyleName, TextBlock,
};
use crate::models::{EducationEntry, ExperienceEntry, FieldId, FormState};
use crate::validation::dates::parse_date;

const PHOTO_SIZE: f64 = 120.0;

pub fn assemble(state: &FormState) -> DocumentTree {
    let state = state.filled_entries_only();

    DocumentTree {
        page_size: styles::PAGE_SIZE,
        page_margins: styles::PAGE_MARGINS,
        default_style: styles::default_style(),
        styles: styles::named_styles(),
        content: vec![header_row(&state), body_row(&state)],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ordering
// ────────────────────────────────────────────────────────────────────────────

/// Most recent start date first; entries whose start date does not parse go last.
/// Ties keep their entry order.
pub fn sorted_experience(entries: &[ExperienceEntry]) -> Vec<&ExperienceEntry> {
    let mut sorted: Vec<&ExperienceEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| newest_first(parse_date(&a.start_date), parse_date(&b.start_date)));
    sorted
}

/// Highest leading integer of the end-date field first (`"2019-12-01"` and `"2019"`
/// both read as 2019). Values without leading digits go last.
pub fn sorted_education(entries: &[EducationEntry]) -> Vec<&EducationEntry> {
    let mut sorted: Vec<&EducationEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| newest_first(leading_int(&a.end_date), leading_int(&b.end_date)));
    sorted
}

fn newest_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Optional sign followed by the longest run of ASCII digits, after leading whitespace.
pub fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

fn header_row(state: &FormState) -> Block {
    let photo = match &state.photo {
        Some(photo) => Block::Image {
            data_url: photo.data_url.clone(),
            width: PHOTO_SIZE,
            height: PHOTO_SIZE,
            alignment: Alignment::Center,
            margin: [0.0, 0.0, 0.0, 20.0],
        },
        None => Block::Text(
            TextBlock::new("Photo")
                .style(StyleName::Header)
                .centered()
                .margin([0.0, 0.0, 0.0, 20.0]),
        ),
    };
    let name = TextBlock::new(state.value(FieldId::Name).to_uppercase())
        .size(NAME_FONT_SIZE)
        .bold()
        .centered()
        .margin([0.0, 0.0, 0.0, 20.0]);

    Block::Columns {
        columns: vec![
            Column {
                width: ColumnWidth::Percent(25),
                background: None,
                content: vec![photo],
            },
            Column {
                width: ColumnWidth::Star,
                background: None,
                content: vec![Block::Text(name)],
            },
        ],
    }
}

fn body_row(state: &FormState) -> Block {
    Block::Columns {
        columns: vec![
            Column {
                width: ColumnWidth::Percent(40),
                background: Some(COLUMN_BACKGROUND.to_string()),
                content: contact_column(state),
            },
            Column {
                width: ColumnWidth::Percent(60),
                background: Some(COLUMN_BACKGROUND.to_string()),
                content: content_column(state),
            },
        ],
    }
}

fn contact_column(state: &FormState) -> Vec<Block> {
    let mut blocks = Vec::new();

    let labelled = [
        ("Email", state.value(FieldId::Email).to_string(), false),
        ("Phone", state.value(FieldId::Phone).to_string(), true),
        (
            "Address",
            format!("{}, {}", state.value(FieldId::Address), state.value(FieldId::Locality)),
            false,
        ),
    ];
    for (label, value, emphasised) in labelled {
        blocks.push(Block::Text(
            TextBlock::new(label)
                .style(StyleName::Subheader)
                .centered()
                .margin([0.0, 0.0, 0.0, 2.0]),
        ));
        let mut text = TextBlock::new(value)
            .style(StyleName::Body)
            .centered()
            .margin([0.0, 0.0, 0.0, 5.0]);
        if emphasised {
            text = text.bold().size(12.0);
        }
        blocks.push(Block::Text(text));
    }

    blocks.push(Block::Text(
        TextBlock::new(format!(
            "Age: {} | {}",
            state.value(FieldId::Age),
            state.value(FieldId::MaritalStatus)
        ))
        .style(StyleName::Body)
        .centered()
        .margin([0.0, 5.0, 0.0, 5.0]),
    ));
    blocks.push(Block::Text(
        TextBlock::new(format!("Nationality: {}", state.value(FieldId::Nationality)))
            .style(StyleName::Body)
            .centered()
            .margin([0.0, 0.0, 0.0, 5.0]),
    ));
    blocks.push(Block::Text(
        TextBlock::new(format!(
            "DNI: {} | CUIL: {}",
            state.value(FieldId::NationalId),
            state.value(FieldId::TaxId)
        ))
        .style(StyleName::Body)
        .centered(),
    ));
    blocks
}

fn content_column(state: &FormState) -> Vec<Block> {
    let mut blocks = Vec::new();

    let objective = state.value(FieldId::Objective).trim();
    if !objective.is_empty() {
        blocks.push(Block::Text(
            TextBlock::new(format!("Career objective: {objective}"))
                .style(StyleName::Subheader)
                .margin([0.0, 20.0, 0.0, 10.0]),
        ));
    }

    if !state.experience.is_empty() {
        blocks.push(section_header("Work Experience"));
        for entry in sorted_experience(&state.experience) {
            blocks.push(Block::Stack {
                blocks: experience_blocks(entry),
            });
        }
    }

    if !state.education.is_empty() {
        blocks.push(section_header("Education"));
        for entry in sorted_education(&state.education) {
            blocks.push(Block::Stack {
                blocks: education_blocks(entry),
            });
        }
    }

    let skills = state.skills();
    if !skills.is_empty() {
        blocks.push(section_header("Skills"));
        blocks.push(Block::Bullets {
            items: skills.into_iter().map(str::to_string).collect(),
            margin: [0.0, 0.0, 0.0, 10.0],
        });
    }

    if state.has_drivers_license() {
        blocks.push(section_header("Other"));
        blocks.push(Block::Text(
            TextBlock::new(format!(
                "Driver's license: {}, expires {}",
                state.value(FieldId::LicenseType),
                state.value(FieldId::LicenseExpiry)
            ))
            .style(StyleName::Body),
        ));
    }

    blocks
}

fn section_header(title: &str) -> Block {
    Block::SectionHeader {
        title: title.to_string(),
    }
}

/// `"2020-01-01 - 2022-05-31"`, or `"2020-01-01 (Current)"` when there is no end date.
pub fn experience_period(entry: &ExperienceEntry) -> String {
    match entry.finished_on() {
        Some(end) => format!("{} - {end}", entry.start_date),
        None => format!("{} (Current)", entry.start_date),
    }
}

fn experience_blocks(entry: &ExperienceEntry) -> Vec<Block> {
    let mut blocks = vec![
        Block::Text(
            TextBlock::new(format!("{} - {}", entry.role, entry.employer))
                .style(StyleName::Header)
                .margin([0.0, 0.0, 0.0, 2.0]),
        ),
        Block::Text(
            TextBlock::new(experience_period(entry))
                .style(StyleName::Body)
                .italics()
                .margin([0.0, 0.0, 0.0, 5.0]),
        ),
    ];
    let lines = entry.description_lines();
    if !lines.is_empty() {
        blocks.push(Block::Bullets {
            items: lines.into_iter().map(str::to_string).collect(),
            margin: [0.0, 0.0, 0.0, 10.0],
        });
    }
    blocks
}

fn education_blocks(entry: &EducationEntry) -> Vec<Block> {
    let mut blocks = vec![
        Block::Text(
            TextBlock::new(format!("{} - {}", entry.title, entry.institution))
                .style(StyleName::Header)
                .margin([0.0, 0.0, 0.0, 2.0]),
        ),
        Block::Text(
            TextBlock::new(format!("{} - {}", entry.start_date, entry.end_date))
                .style(StyleName::Body)
                .italics()
                .margin([0.0, 0.0, 0.0, 5.0]),
        ),
    ];
    let description = entry.description.trim();
    if !description.is_empty() {
        blocks.push(Block::Text(
            TextBlock::new(description)
                .style(StyleName::Body)
                .margin([0.0, 2.0, 0.0, 10.0]),
        ));
    }
    blocks
}
