//! # Event Dispatch Module
//!
//! Publish/subscribe plumbing for observers of a document: publishers emit
//! typed events without knowing subscribers, subscribers register plain
//! closures and get a handle back for unsubscribing.
//!
//! Everything here runs on the caller's thread. Document mutation is
//! synchronous and single-threaded, so handlers are `Rc`-backed and are
//! invoked in subscription order before `publish` returns.
//!
//! ## Usage
//!
//! ```rust
//! use schemkit_core::event_bus::EventDispatcher;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut dispatcher: EventDispatcher<u32> = EventDispatcher::new();
//! let seen = Rc::new(Cell::new(0));
//! let sink = seen.clone();
//! let id = dispatcher.subscribe(move |value| sink.set(*value));
//!
//! dispatcher.publish(&7);
//! assert_eq!(seen.get(), 7);
//! assert!(dispatcher.unsubscribe(id));
//! ```

mod bus;

pub use bus::{EventDispatcher, SubscriptionId};
