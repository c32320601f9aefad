//! Style changes applied to the selection.

use super::DesignerState;
use crate::commands::{ChangeStyle, StyleValue};
use crate::error::{DesignerError, DesignerResult};
use crate::model::{Brush, Font, Pen};

impl DesignerState {
    fn change_selection_style(&mut self, value: StyleValue) -> DesignerResult<bool> {
        let ids = self.selected_roots();
        if ids.is_empty() {
            return Err(DesignerError::EmptySelection);
        }
        match ChangeStyle::for_items(&self.document, &ids, value) {
            Some(cmd) => {
                self.push_command(cmd)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Set the outline of every selected item, descending into groups.
    pub fn set_pen(&mut self, pen: Pen) -> DesignerResult<bool> {
        self.change_selection_style(StyleValue::Pen(pen))
    }

    pub fn set_brush(&mut self, brush: Brush) -> DesignerResult<bool> {
        self.change_selection_style(StyleValue::Brush(brush))
    }

    /// Set the font of every selected text item. Returns false when the
    /// selection holds no text.
    pub fn set_font(&mut self, font: Font) -> DesignerResult<bool> {
        self.change_selection_style(StyleValue::Font(font))
    }

    /// Set the z-value of the selected top-level items.
    pub fn set_height(&mut self, z: f64) -> DesignerResult<bool> {
        self.change_selection_style(StyleValue::Height(z))
    }
}
