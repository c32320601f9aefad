//! # SchemKit Core
//!
//! Core types, errors, and utilities shared by the SchemKit crates.
//! Provides the item handle type, the structural error taxonomy, and a
//! single-threaded event dispatcher used by the document model to notify
//! observers (canvas redraw, dirty indicators).

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{Error, Result, StructuralError};
pub use event_bus::{EventDispatcher, SubscriptionId};
pub use types::ItemId;
