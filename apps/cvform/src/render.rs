//! Document output seam. The engine hands over a finished tree and a file name; how the
//! bytes are produced is the renderer's concern.

use std::path::PathBuf;

use tracing::info;

use crate::document::DocumentTree;
use crate::errors::FormError;

/// Name every generated CV is saved under.
pub const DOCUMENT_FILE_NAME: &str = "CV_Personalizado_2026.pdf";

pub trait DocumentRenderer {
    fn render(&mut self, tree: &DocumentTree, file_name: &str) -> Result<(), FormError>;
}

/// Writes the tree as pretty-printed JSON to `<output_dir>/<file_name>.json`, ready
/// for an external PDF backend.
#[derive(Debug, Clone)]
pub struct JsonFileRenderer {
    output_dir: PathBuf,
}

impl JsonFileRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(format!("{file_name}.json"))
    }
}

impl DocumentRenderer for JsonFileRenderer {
    fn render(&mut self, tree: &DocumentTree, file_name: &str) -> Result<(), FormError> {
        let path = self.output_path(file_name);
        let json = serde_json::to_string_pretty(tree)?;
        std::fs::create_dir_all(&self.output_dir)
            .and_then(|_| std::fs::write(&path, json))
            .map_err(|e| FormError::Render(format!("{}: {e}", path.display())))?;
        info!("Document written to {}", path.display());
        Ok(())
    }
}

/// Keeps rendered trees in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderer {
    pub rendered: Vec<(String, DocumentTree)>,
}

impl DocumentRenderer for MemoryRenderer {
    fn render(&mut self, tree: &DocumentTree, file_name: &str) -> Result<(), FormError> {
        self.rendered.push((file_name.to_string(), tree.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::assemble;
    use crate::models::{FieldId, FormState};

    #[test]
    fn test_json_renderer_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = JsonFileRenderer::new(dir.path().join("out"));
        let mut form = FormState::default();
        form.set(FieldId::Name, "Ana");

        renderer.render(&assemble(&form), DOCUMENT_FILE_NAME).unwrap();

        let path = dir.path().join("out").join("CV_Personalizado_2026.pdf.json");
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["page_size"], "A4");
    }

    #[test]
    fn test_json_renderer_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let mut renderer = JsonFileRenderer::new(&blocker);

        let err = renderer
            .render(&assemble(&FormState::default()), DOCUMENT_FILE_NAME)
            .unwrap_err();
        assert!(matches!(err, FormError::Render(_)));
    }
}
