//! Core systems for the filter bar.
//!
//! This crate provides the reactive building blocks the panel engine is
//! assembled from:
//!
//! - **Signal/Slot System**: Type-safe notification from panel components to
//!   the host
//! - **Property System**: Change-detecting value cells
//! - **Logging**: `tracing` targets, span names and a summary macro
//!
//! # Example
//!
//! ```
//! use filterbar_core::{Property, Signal};
//!
//! let hidden = Property::new(Vec::<String>::new());
//! let hidden_changed = Signal::<Vec<String>>::new();
//!
//! let next = vec!["country".to_string()];
//! if hidden.set(next.clone()) {
//!     hidden_changed.emit(next);
//! }
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use logging::PerfSpan;
pub use property::{Property, ReadOnlyProperty};
pub use signal::{ConnectionId, Signal};
