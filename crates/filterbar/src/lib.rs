//! Adaptive filter bar for dashboards.
//!
//! The panel arranges a dashboard's filter controls either as a vertical
//! sidebar or as a single horizontal row whose trailing items spill into an
//! overflow dropdown. It combines three kinds of entries:
//!
//! - **Native filters** configured on the dashboard, split into in-scope
//!   and out-of-scope by the active tabs
//! - **Cross-filters** emitted by chart interactions
//! - **Out-of-scope filters**, grouped in a collapsed section
//!
//! Every filter id owns one render slot for as long as it keeps appearing.
//! Moving between the row, the dropdown and the out-of-scope section only
//! relocates the slot, so control state survives layout changes.
//!
//! # Example
//!
//! ```
//! use filterbar::{
//!     ControlFactory, FilterControl, FilterItem, FilterPanel, FilterSnapshot, LayoutMode,
//!     Measurement, NativeFilter, PanelConfig, PanelInput,
//! };
//!
//! struct Control;
//! impl FilterControl for Control {}
//!
//! struct Factory;
//! impl ControlFactory for Factory {
//!     type Control = Control;
//!     fn create(&mut self, _item: &FilterItem) -> Control {
//!         Control
//!     }
//! }
//!
//! let mut panel = FilterPanel::new(Factory, PanelConfig::default());
//! let snapshot = FilterSnapshot::new(vec![
//!     NativeFilter::new("region", "Region"),
//!     NativeFilter::new("country", "Country").with_value(true),
//! ]);
//!
//! panel
//!     .measurement_port()
//!     .report(Measurement::Overflowed(vec!["country".into()]));
//! let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
//!
//! let view = view.as_horizontal().unwrap();
//! assert_eq!(view.trigger.count, 1);
//! assert_eq!(view.trigger.tooltip, "Applied filters: Country");
//! ```

pub mod config;
pub mod cross_filter;
pub mod error;
pub mod highlight;
pub mod item;
pub mod measure;
pub mod merge;
pub mod overflow;
pub mod panel;
pub mod scope;
pub mod slots;

pub use filterbar_core::*;

pub use config::{PanelConfig, TriggerLabels};
pub use cross_filter::{CrossFilter, CrossFilterSources, DataMask, DataMaskState, select_cross_filters};
pub use error::{Error, Result};
pub use highlight::{HighlightSignal, HighlightSynchronizer};
pub use item::{ChartId, FilterId, FilterItem, FilterKind, FilterScope, NativeFilter};
pub use measure::{ItemExtent, OverflowMeasurer, RowMeasurer, RowMetrics};
pub use merge::merge;
pub use overflow::{LayoutMode, Measurement, MeasurementPort, OverflowCoordinator, OverflowSplit};
pub use panel::{FilterPanel, FilterSnapshot, PanelInput, PanelView, SelectionChange};
pub use scope::{ScopeContext, ScopePartition, ScopeResolver, TabScopeResolver};
pub use slots::{Allocation, ControlFactory, FilterControl, Placement, RenderSlot, SlotKey, SlotTable};
