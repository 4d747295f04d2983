//! UI feedback seam. The engine never touches a widget; it reports verdicts, notices,
//! previews, focus requests and progress through `UiFeedback` and lets the host render
//! them however it likes.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::FieldId;
use crate::sections::Progress;
use crate::validation::ValidationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

/// A dismissible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }
}

pub trait UiFeedback {
    /// Show or clear the error state of one field.
    fn mark_field(&mut self, result: &ValidationResult);
    fn notify(&mut self, notice: Notice);
    fn show_preview(&mut self, html: &str);
    fn focus(&mut self, field: FieldId);
    fn set_progress(&mut self, progress: &Progress);
}

/// Headless host: everything goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUi;

impl UiFeedback for TracingUi {
    fn mark_field(&mut self, result: &ValidationResult) {
        if !result.is_valid {
            warn!(field = %result.field, "{}", result.message);
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => info!("{}", notice.message),
            NoticeLevel::Warning | NoticeLevel::Danger => warn!("{}", notice.message),
        }
    }

    fn show_preview(&mut self, html: &str) {
        info!("Preview rendered ({} bytes of HTML)", html.len());
    }

    fn focus(&mut self, field: FieldId) {
        info!(field = %field, "focus requested");
    }

    fn set_progress(&mut self, progress: &Progress) {
        info!("Progress {:.0}%: {}", progress.percent, progress.caption());
    }
}

/// Keeps every call so embedders and tests can inspect what the user would have seen.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    pub marks: Vec<ValidationResult>,
    pub notices: Vec<Notice>,
    pub previews: Vec<String>,
    pub focused: Vec<FieldId>,
    pub progress: Vec<Progress>,
}

impl RecordingUi {
    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn last_progress(&self) -> Option<&Progress> {
        self.progress.last()
    }
}

impl UiFeedback for RecordingUi {
    fn mark_field(&mut self, result: &ValidationResult) {
        self.marks.push(result.clone());
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn show_preview(&mut self, html: &str) {
        self.previews.push(html.to_string());
    }

    fn focus(&mut self, field: FieldId) {
        self.focused.push(field);
    }

    fn set_progress(&mut self, progress: &Progress) {
        self.progress.push(progress.clone());
    }
}
