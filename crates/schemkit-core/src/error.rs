//! Error handling for SchemKit
//!
//! Provides the error types shared by every layer of the editor:
//! - Structural errors (document tree precondition violations)
//! - A top-level `Error` that wraps them together with free-form failures
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::types::ItemId;

/// Structural error type
///
/// Raised by document-tree mutations when a precondition does not hold.
/// Mutations check every precondition before touching any state, so a
/// structural error always leaves the document unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// The referenced item is not part of the document
    #[error("Item {id} not found")]
    ItemNotFound {
        /// The missing item.
        id: ItemId,
    },

    /// The requested parent cannot own children
    #[error("Invalid parent {parent} for {item}: parent is not a group")]
    InvalidParent {
        /// The item being inserted or moved.
        item: ItemId,
        /// The rejected parent.
        parent: ItemId,
    },

    /// Inserting would make an item its own ancestor
    #[error("Cycle detected: {parent} is {item} or one of its descendants")]
    CycleDetected {
        /// The item being inserted or moved.
        item: ItemId,
        /// The rejected parent.
        parent: ItemId,
    },

    /// An item with this handle already exists
    #[error("Item {id} already exists")]
    DuplicateItem {
        /// The duplicated handle.
        id: ItemId,
    },

    /// The item is not a group
    #[error("Item {id} is not a group")]
    NotAGroup {
        /// The offending item.
        id: ItemId,
    },

    /// Child index out of range for the target container
    #[error("Index {index} out of range for container of {len} items")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The container length.
        len: usize,
    },
}

impl StructuralError {
    /// Shorthand for [`StructuralError::ItemNotFound`].
    pub fn not_found(id: ItemId) -> Self {
        StructuralError::ItemNotFound { id }
    }
}

/// Main error type for SchemKit
///
/// Aggregates the layer-specific errors into one type for callers that do
/// not care which layer failed.
#[derive(Error, Debug)]
pub enum Error {
    /// Structural error
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error with a message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a structural error
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Result type for SchemKit operations
pub type Result<T> = std::result::Result<T, Error>;
