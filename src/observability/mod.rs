//! Observability subsystem
//!
//! Structured JSON-line logging for the record store.
//!
//! # Principles
//!
//! 1. Observability is read-only and never fails an operation
//! 2. Synchronous, no background threads
//! 3. Deterministic field ordering
//! 4. Off unless the store config enables it
//!
//! # Usage
//!
//! ```ignore
//! use jsontable::observability::{Event, Logger};
//!
//! Logger::info(Event::TableRewrite.as_str(), &[("rows", "42")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{EventScope, ScopeEvents, INSERT_EVENTS};
