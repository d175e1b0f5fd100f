//! Logging facilities for the filter bar.
//!
//! The filter bar uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("filterbar=debug")
//!     .init();
//! ```
//!
//! Every event is emitted under one of the [`targets`], so hosts can filter
//! per subsystem, and render passes are wrapped in a [`PerfSpan`].

/// Span names used throughout the filter bar for tracing.
pub mod span_names {
    /// One full render pass of the panel.
    pub const RENDER: &str = "filterbar::render";
    /// Slot allocation for a render pass.
    pub const ALLOCATE: &str = "filterbar::allocate";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "filterbar_core::signal";
    /// Panel orchestration target.
    pub const PANEL: &str = "filterbar::panel";
    /// Scope classification target.
    pub const SCOPE: &str = "filterbar::scope";
    /// Merge engine target.
    pub const MERGE: &str = "filterbar::merge";
    /// Slot allocation target.
    pub const SLOTS: &str = "filterbar::slots";
    /// Overflow coordination target.
    pub const OVERFLOW: &str = "filterbar::overflow";
    /// Highlight synchronization target.
    pub const HIGHLIGHT: &str = "filterbar::highlight";
    /// Configuration loading target.
    pub const CONFIG: &str = "filterbar::config";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of a render pass.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "filterbar::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Debug event under the crate-wide `filterbar` target.
///
/// Used for per-pass summaries that do not belong to a single subsystem.
#[macro_export]
macro_rules! filterbar_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "filterbar", $($arg)*)
    };
}
