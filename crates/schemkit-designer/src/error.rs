//! Error types for document editing.

use schemkit_core::{ItemId, StructuralError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignerError {
    /// A document tree precondition was violated. Nothing was mutated.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Undo or redo was requested while a macro is still recording.
    #[error("Macro '{0}' is still open")]
    MacroInProgress(String),

    #[error("No macro is open")]
    NoOpenMacro,

    #[error("Item {0} is not a net")]
    NotANet(ItemId),

    #[error("Item {0} has no editable geometry")]
    UnsupportedEdit(ItemId),

    #[error("Selection is empty")]
    EmptySelection,

    /// Nets run horizontally or vertically, so they only turn in quarter
    /// turns.
    #[error("Cannot rotate nets by {0} degrees")]
    OffAxisRotation(f64),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DesignerError {
    pub fn is_structural(&self) -> bool {
        matches!(self, DesignerError::Structural(_))
    }
}

pub type DesignerResult<T> = Result<T, DesignerError>;
