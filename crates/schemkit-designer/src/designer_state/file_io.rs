//! File I/O operations (save, load, new) for designer state.

use std::path::Path;

use anyhow::Context;

use super::DesignerState;
use crate::document::Document;
use crate::serialization::DesignFile;

impl DesignerState {
    /// Save design to file and mark the current history position clean.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.cancel()?;
        let design = DesignFile::from_document(&self.document, &self.design_name);
        design.save_to_file(&path)?;

        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.history.set_clean();
        Ok(())
    }

    /// Load design from file, replacing the open document and its history.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let design = DesignFile::load_from_file(&path)?;
        let document = design
            .to_document()
            .with_context(|| format!("Invalid design in {}", path.as_ref().display()))?;

        self.cancel()?;
        self.document = document;
        self.design_name = design.metadata.name.clone();
        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.clear_history();
        Ok(())
    }

    /// Create new design (clear all).
    pub fn new_design(&mut self) {
        self.mode = Default::default();
        self.document = Document::new();
        self.current_file_path = None;
        self.design_name = "Untitled".to_string();
        self.clear_history();
    }

    /// Whether the document differs from the last save.
    pub fn is_modified(&self) -> bool {
        !self.history.is_clean()
    }

    /// Get display name for the design.
    pub fn display_name(&self) -> String {
        let name = if let Some(path) = &self.current_file_path {
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&self.design_name)
        } else {
            &self.design_name
        };

        if self.is_modified() {
            format!("{}*", name)
        } else {
            name.to_string()
        }
    }
}
