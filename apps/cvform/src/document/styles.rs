use std::collections::BTreeMap;

use crate::document::tree::{Margin, PageSize, StyleName, TextStyle};

pub const PAGE_SIZE: PageSize = PageSize::A4;
pub const PAGE_MARGINS: Margin = [40.0, 60.0, 40.0, 40.0];

pub const FONT: &str = "Roboto";
pub const TEXT_COLOR: &str = "#212529";
pub const ACCENT_COLOR: &str = "#0d6efd";
pub const MUTED_COLOR: &str = "#6c757d";
pub const COLUMN_BACKGROUND: &str = "#E3F2FD";

pub const NAME_FONT_SIZE: f64 = 48.0;

pub fn default_style() -> TextStyle {
    TextStyle {
        font: Some(FONT.to_string()),
        font_size: Some(10.0),
        line_height: Some(1.2),
        color: Some(TEXT_COLOR.to_string()),
        ..Default::default()
    }
}

pub fn named_styles() -> BTreeMap<StyleName, TextStyle> {
    BTreeMap::from([
        (
            StyleName::Header,
            TextStyle {
                font: Some(FONT.to_string()),
                font_size: Some(18.0),
                bold: true,
                color: Some(ACCENT_COLOR.to_string()),
                margin: Some([0.0, 0.0, 0.0, 10.0]),
                ..Default::default()
            },
        ),
        (
            StyleName::Subheader,
            TextStyle {
                font: Some(FONT.to_string()),
                font_size: Some(14.0),
                bold: true,
                color: Some(MUTED_COLOR.to_string()),
                margin: Some([0.0, 10.0, 0.0, 5.0]),
                ..Default::default()
            },
        ),
        (
            StyleName::Body,
            TextStyle {
                margin: Some([0.0, 0.0, 0.0, 5.0]),
                ..Default::default()
            },
        ),
        (
            StyleName::Bullet,
            TextStyle {
                font_size: Some(10.0),
                margin: Some([0.0, 2.0, 0.0, 0.0]),
                ..Default::default()
            },
        ),
    ])
}
