//! Width-based overflow measurement for the horizontal row.
//!
//! The host render layer knows the real widths of the laid-out controls and
//! decides when to measure. It hands the ordered item extents to an
//! [`OverflowMeasurer`] and reports the result through a
//! [`MeasurementPort`](crate::overflow::MeasurementPort).

use serde::{Deserialize, Serialize};

use crate::item::FilterId;
use crate::overflow::Measurement;

/// Laid-out width of one row item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemExtent {
    pub id: FilterId,
    pub width: f32,
}

impl ItemExtent {
    pub fn new(id: impl Into<FilterId>, width: f32) -> Self {
        Self {
            id: id.into(),
            width,
        }
    }
}

/// Decides which row items do not fit in the available width.
pub trait OverflowMeasurer {
    /// Return the ids that do not fit, in row order, or
    /// [`Measurement::Unavailable`] if no meaningful answer exists.
    fn measure(&self, available_width: f32, items: &[ItemExtent]) -> Measurement;
}

/// Spacing metrics of the horizontal row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowMetrics {
    /// Spacing between items.
    pub spacing: f32,
    /// Padding on each side of the row.
    pub padding: f32,
    /// Width of the overflow trigger.
    pub trigger_width: f32,
}

impl Default for RowMetrics {
    fn default() -> Self {
        Self {
            spacing: 8.0,
            padding: 16.0,
            trigger_width: 120.0,
        }
    }
}

/// Fits items left to right, reserving room for the overflow trigger once
/// anything has to overflow.
#[derive(Debug, Clone, Default)]
pub struct RowMeasurer {
    metrics: RowMetrics,
}

impl RowMeasurer {
    pub fn new(metrics: RowMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &RowMetrics {
        &self.metrics
    }
}

impl OverflowMeasurer for RowMeasurer {
    fn measure(&self, available_width: f32, items: &[ItemExtent]) -> Measurement {
        let available = available_width - self.metrics.padding * 2.0;
        if !available.is_finite() || available <= 0.0 {
            return Measurement::Unavailable;
        }

        let spacing = self.metrics.spacing;
        let total: f32 = items.iter().map(|item| item.width).sum::<f32>()
            + spacing * items.len().saturating_sub(1) as f32;
        if total <= available {
            return Measurement::Overflowed(Vec::new());
        }

        // Overflow is needed, so the trigger takes space at the row's end.
        let limit = available - self.metrics.trigger_width - spacing;
        let mut pos = 0.0;
        let mut first_overflow = items.len();
        for (i, item) in items.iter().enumerate() {
            if pos + item.width > limit {
                first_overflow = i;
                break;
            }
            pos += item.width + spacing;
        }

        Measurement::Overflowed(items[first_overflow..].iter().map(|item| item.id.clone()).collect())
    }
}
