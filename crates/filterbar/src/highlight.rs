//! Revealing a highlighted filter that is hidden in the overflow dropdown.

use serde::{Deserialize, Serialize};

use filterbar_core::Signal;
use filterbar_core::logging::targets;

use crate::item::FilterId;

/// Externally driven "highlight this filter" request.
///
/// The host bumps `version` on every request, so highlighting the same id
/// twice is distinguishable from no change at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSignal {
    pub id: Option<FilterId>,
    pub version: u64,
}

impl HighlightSignal {
    pub fn new(id: impl Into<FilterId>, version: u64) -> Self {
        Self {
            id: Some(id.into()),
            version,
        }
    }
}

/// Requests the overflow dropdown to open when a highlighted filter is in it.
#[derive(Default)]
pub struct HighlightSynchronizer {
    /// Highest version handled so far. `None` until a request with an id
    /// arrives.
    handled_version: Option<u64>,
    /// Emitted with the highlighted id when the dropdown should open.
    pub open_requested: Signal<FilterId>,
}

impl HighlightSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a highlight request against the current overflow set.
    ///
    /// A request is handled once, and only if its version is newer than every
    /// version handled before. Signals without an id never consume a version.
    /// Returns `true` if an open request was emitted.
    pub fn on_highlight(&mut self, signal: &HighlightSignal, overflowed: &[FilterId]) -> bool {
        let Some(id) = signal.id.as_ref() else {
            return false;
        };
        if self
            .handled_version
            .is_some_and(|handled| signal.version <= handled)
        {
            return false;
        }
        self.handled_version = Some(signal.version);

        if !overflowed.contains(id) {
            tracing::trace!(target: targets::HIGHLIGHT, %id, "highlighted filter is not overflowed");
            return false;
        }
        tracing::debug!(target: targets::HIGHLIGHT, %id, version = signal.version, "opening overflow for highlighted filter");
        self.open_requested.emit(id.clone());
        true
    }
}
