//! Overflow coordination for the horizontal layout.
//!
//! Measurements arrive asynchronously through a [`MeasurementPort`]. Reports
//! that land between two render passes are coalesced, so only the last one
//! is applied when the next pass commits. The committed overflow set is an
//! ordered list of ids held in a [`Property`]; because `Vec` equality is
//! element-wise, a report with the same members in a different order counts
//! as a change, while an identical report is dropped before it can trigger
//! another layout round.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use filterbar_core::logging::targets;
use filterbar_core::{Property, ReadOnlyProperty, Signal};

use crate::item::{FilterId, FilterItem};
use crate::measure::{ItemExtent, OverflowMeasurer};

/// How the panel is laid out. Supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Full-height sidebar. No overflow.
    #[default]
    Vertical,
    /// Single fixed-width row with an overflow dropdown.
    Horizontal,
}

/// One report from the measurement collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Measurement {
    /// Ids that did not fit, in left-to-right row order.
    Overflowed(Vec<FilterId>),
    /// The row could not be measured, e.g. a zero-width container.
    Unavailable,
}

/// Handle through which the host reports measurements.
///
/// Cheap to clone and safe to use from any thread.
#[derive(Debug, Clone, Default)]
pub struct MeasurementPort {
    pending: Arc<Mutex<Option<Measurement>>>,
}

impl MeasurementPort {
    /// Queue a measurement for the next render commit.
    ///
    /// Replaces any report that has not been committed yet.
    pub fn report(&self, measurement: Measurement) {
        if self.pending.lock().replace(measurement).is_some() {
            tracing::trace!(target: targets::OVERFLOW, "coalesced uncommitted measurement");
        }
    }

    /// Run `measurer` over the row and queue its result.
    pub fn measure_with<M>(&self, measurer: &M, available_width: f32, items: &[ItemExtent])
    where
        M: OverflowMeasurer + ?Sized,
    {
        self.report(measurer.measure(available_width, items));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    fn take(&self) -> Option<Measurement> {
        self.pending.lock().take()
    }
}

static_assertions::assert_impl_all!(MeasurementPort: Send, Sync, Clone);

/// Overflowed items of one render pass, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverflowSplit {
    /// Overflowed in-scope native filters, in overflow order.
    pub in_scope: Vec<FilterItem>,
    /// Overflowed cross-filters, in overflow order.
    pub cross_filters: Vec<FilterItem>,
}

impl OverflowSplit {
    /// Overflowed items holding a value: natives with a value, then all
    /// cross-filters.
    pub fn active(&self) -> Vec<&FilterItem> {
        self.in_scope
            .iter()
            .filter(|item| item.has_value)
            .chain(&self.cross_filters)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.in_scope.is_empty() && self.cross_filters.is_empty()
    }
}

/// Owner of the layout mode and the overflow set.
pub struct OverflowCoordinator {
    mode: LayoutMode,
    overflowed: Property<Vec<FilterId>>,
    port: MeasurementPort,
    /// Emitted with the new overflow set whenever it changes.
    pub overflow_changed: Signal<Vec<FilterId>>,
}

impl Default for OverflowCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl OverflowCoordinator {
    pub fn new() -> Self {
        Self {
            mode: LayoutMode::default(),
            overflowed: Property::new(Vec::new()),
            port: MeasurementPort::default(),
            overflow_changed: Signal::new(),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// A port feeding this coordinator.
    pub fn port(&self) -> MeasurementPort {
        self.port.clone()
    }

    /// The committed overflow set.
    pub fn overflowed(&self) -> ReadOnlyProperty<'_, Vec<FilterId>> {
        ReadOnlyProperty::new(&self.overflowed)
    }

    pub fn is_overflowed(&self, id: &FilterId) -> bool {
        self.overflowed.with(|ids| ids.contains(id))
    }

    /// Switch layout mode. Returns `true` if the mode changed.
    ///
    /// Leaving the horizontal layout clears the overflow set and discards
    /// any pending measurement, since vertical layout has no overflow.
    pub fn set_mode(&mut self, mode: LayoutMode) -> bool {
        if self.mode == mode {
            return false;
        }
        tracing::debug!(target: targets::OVERFLOW, from = ?self.mode, to = ?mode, "layout mode changed");
        self.mode = mode;
        if mode == LayoutMode::Vertical {
            self.port.take();
            self.update(Vec::new());
        }
        true
    }

    /// Commit the pending measurement, if any, against the current items.
    ///
    /// `known` holds the ids of the current horizontal row. Ids outside it
    /// are stale and dropped, both from the incoming measurement and from the
    /// committed set. Returns `true` if the overflow set changed.
    pub fn commit(&mut self, known: &HashSet<&FilterId>) -> bool {
        let candidate = match self.port.take() {
            Some(measurement) => self.candidate(measurement),
            None => self.overflowed.get(),
        };
        if self.mode == LayoutMode::Vertical {
            return false;
        }

        let mut stale = Vec::new();
        let mut seen = HashSet::with_capacity(candidate.len());
        let next: Vec<FilterId> = candidate
            .into_iter()
            .filter(|id| {
                if !known.contains(id) {
                    stale.push(id.clone());
                    return false;
                }
                seen.insert(id.clone())
            })
            .collect();
        if !stale.is_empty() {
            tracing::debug!(target: targets::OVERFLOW, ?stale, "ignoring stale overflow ids");
        }
        self.update(next)
    }

    fn candidate(&self, measurement: Measurement) -> Vec<FilterId> {
        if self.mode == LayoutMode::Vertical {
            tracing::debug!(target: targets::OVERFLOW, "discarding measurement in vertical layout");
            return Vec::new();
        }
        match measurement {
            Measurement::Overflowed(ids) => ids,
            Measurement::Unavailable => {
                tracing::debug!(target: targets::OVERFLOW, "measurement unavailable; showing everything inline");
                Vec::new()
            }
        }
    }

    fn update(&self, next: Vec<FilterId>) -> bool {
        if !self.overflowed.set(next.clone()) {
            return false;
        }
        tracing::debug!(target: targets::OVERFLOW, overflowed = ?next, "overflow set changed");
        self.overflow_changed.emit(next);
        true
    }

    /// Pick the overflowed items out of this pass's row, in overflow order.
    pub fn split(&self, in_scope: &[FilterItem], cross_filters: &[FilterItem]) -> OverflowSplit {
        let by_id: HashMap<&FilterId, &FilterItem> = in_scope
            .iter()
            .chain(cross_filters)
            .map(|item| (&item.id, item))
            .collect();

        let mut split = OverflowSplit::default();
        self.overflowed.with(|ids| {
            for item in ids.iter().filter_map(|id| by_id.get(id)) {
                if item.is_cross() {
                    split.cross_filters.push((*item).clone());
                } else {
                    split.in_scope.push((*item).clone());
                }
            }
        });
        split
    }
}
