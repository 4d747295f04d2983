//! Renderer-neutral description of the printed CV.
//!
//! The tree says what goes on the page and with which named style; a
//! `DocumentRenderer` decides how to draw it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Left, top, right, bottom, in points.
pub type Margin = [f64; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleName {
    Header,
    Subheader,
    Body,
    Bullet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Center,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

/// A run of text with an optional named style and per-block overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italics: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            font_size: None,
            bold: false,
            italics: false,
            alignment: None,
            margin: None,
        }
    }

    pub fn style(mut self, style: StyleName) -> Self {
        self.style = Some(style);
        self
    }

    pub fn size(mut self, points: f64) -> Self {
        self.font_size = Some(points);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italics(mut self) -> Self {
        self.italics = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.alignment = Some(Alignment::Center);
        self
    }

    pub fn margin(mut self, margin: Margin) -> Self {
        self.margin = Some(margin);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnWidth {
    Percent(u8),
    /// Whatever the other columns leave over.
    Star,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub width: ColumnWidth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub content: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text(TextBlock),
    Image {
        data_url: String,
        width: f64,
        height: f64,
        alignment: Alignment,
        margin: Margin,
    },
    Bullets {
        items: Vec<String>,
        margin: Margin,
    },
    Columns {
        columns: Vec<Column>,
    },
    /// Blocks kept together as one unit, e.g. a single experience entry.
    Stack {
        blocks: Vec<Block>,
    },
    SectionHeader {
        title: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    pub page_size: PageSize,
    pub page_margins: Margin,
    pub default_style: TextStyle,
    pub styles: BTreeMap<StyleName, TextStyle>,
    pub content: Vec<Block>,
}

impl DocumentTree {
    /// Every piece of text in reading order, bullets and headers included.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for block in &self.content {
            collect_texts(block, &mut out);
        }
        out
    }
}

fn collect_texts<'a>(block: &'a Block, out: &mut Vec<&'a str>) {
    match block {
        Block::Text(text) => out.push(&text.text),
        Block::Image { .. } => {}
        Block::Bullets { items, .. } => out.extend(items.iter().map(String::as_str)),
        Block::Columns { columns } => {
            for column in columns {
                for inner in &column.content {
                    collect_texts(inner, out);
                }
            }
        }
        Block::Stack { blocks } => {
            for inner in blocks {
                collect_texts(inner, out);
            }
        }
        Block::SectionHeader { title } => out.push(title),
    }
}
