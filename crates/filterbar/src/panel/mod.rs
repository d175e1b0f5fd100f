//! The filter panel orchestrator.
//!
//! [`FilterPanel::render`] is the single entry point. Each call takes one
//! consistent snapshot of the inputs and runs the pipeline in a fixed order:
//!
//! 1. scope partition of the native filters and cross-filter items
//! 2. merge into row order
//! 3. slot allocation for every present filter
//! 4. layout mode switch and overflow commit
//! 5. highlight handling
//! 6. clear-all requests
//! 7. layout composition and placement updates
//!
//! # Example
//!
//! ```
//! use filterbar::{
//!     ControlFactory, FilterControl, FilterItem, FilterPanel, FilterSnapshot, LayoutMode,
//!     NativeFilter, PanelConfig, PanelInput,
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
//!     NativeFilter::new("region", "Region").with_value(true),
//! ]);
//!
//! let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
//! assert_eq!(view.as_horizontal().unwrap().inline().count(), 1);
//! ```

mod view;

pub use view::{
    CollapsibleSection, DropdownContent, HorizontalView, OverflowTrigger, PanelView, RowEntry,
    SlotRef, VerticalView,
};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use filterbar_core::logging::{span_names, targets};
use filterbar_core::{PerfSpan, Signal, filterbar_debug};

use crate::config::PanelConfig;
use crate::cross_filter::CrossFilter;
use crate::error::{Error, Result};
use crate::highlight::{HighlightSignal, HighlightSynchronizer};
use crate::item::{FilterId, FilterItem, NativeFilter};
use crate::merge::merge;
use crate::overflow::{LayoutMode, MeasurementPort, OverflowCoordinator};
use crate::scope::{ScopeContext, ScopePartition, ScopeResolver, TabScopeResolver};
use crate::slots::{ControlFactory, FilterControl, Placement, SlotKey, SlotTable};

static NO_HIGHLIGHT: HighlightSignal = HighlightSignal {
    id: None,
    version: 0,
};

/// Native filters and the scope they are evaluated in, read together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSnapshot {
    pub filters: Vec<NativeFilter>,
    pub scope: ScopeContext,
}

impl FilterSnapshot {
    /// A snapshot for a dashboard without tabs.
    pub fn new(filters: Vec<NativeFilter>) -> Self {
        Self {
            filters,
            scope: ScopeContext::default(),
        }
    }

    pub fn with_scope(mut self, scope: ScopeContext) -> Self {
        self.scope = scope;
        self
    }
}

/// Inputs of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct PanelInput<'a> {
    pub layout_mode: LayoutMode,
    pub filters: &'a FilterSnapshot,
    pub cross_filters: &'a [CrossFilter],
    pub highlight: &'a HighlightSignal,
    /// Filters whose controls must reset their selection.
    pub clear_all: &'a [FilterId],
}

impl<'a> PanelInput<'a> {
    pub fn new(
        layout_mode: LayoutMode,
        filters: &'a FilterSnapshot,
        cross_filters: &'a [CrossFilter],
    ) -> Self {
        Self {
            layout_mode,
            filters,
            cross_filters,
            highlight: &NO_HIGHLIGHT,
            clear_all: &[],
        }
    }

    pub fn with_highlight(mut self, highlight: &'a HighlightSignal) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_clear_all(mut self, clear_all: &'a [FilterId]) -> Self {
        self.clear_all = clear_all;
        self
    }
}

/// A user interaction reported upward. The value is opaque to the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChange {
    pub filter_id: FilterId,
    pub value: Value,
}

/// Arranges filter controls into the vertical or horizontal layout.
///
/// Owns the slot table and the overflow coordinator. Neither is writable
/// from outside; all state enters through [`render`](Self::render) and the
/// [`MeasurementPort`].
pub struct FilterPanel<F: ControlFactory, R = TabScopeResolver> {
    config: PanelConfig,
    factory: F,
    resolver: R,
    slots: SlotTable<F::Control>,
    overflow: OverflowCoordinator,
    highlight: HighlightSynchronizer,
    /// Emitted when a control reports a new selection.
    pub selection_changed: Signal<SelectionChange>,
    /// Emitted after a control has been cleared by a clear-all request.
    pub clear_all_completed: Signal<FilterId>,
}

impl<F: ControlFactory> FilterPanel<F> {
    /// Create a panel using tab-based scope resolution.
    pub fn new(factory: F, config: PanelConfig) -> Self {
        Self::with_resolver(factory, TabScopeResolver, config)
    }
}

impl<F: ControlFactory, R: ScopeResolver> FilterPanel<F, R> {
    pub fn with_resolver(factory: F, resolver: R, config: PanelConfig) -> Self {
        Self {
            config,
            factory,
            resolver,
            slots: SlotTable::new(),
            overflow: OverflowCoordinator::new(),
            highlight: HighlightSynchronizer::new(),
            selection_changed: Signal::new(),
            clear_all_completed: Signal::new(),
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Handle for reporting row measurements.
    pub fn measurement_port(&self) -> MeasurementPort {
        self.overflow.port()
    }

    /// Emitted with the new overflow set whenever it changes.
    pub fn overflow_changed(&self) -> &Signal<Vec<FilterId>> {
        &self.overflow.overflow_changed
    }

    /// Emitted when the overflow dropdown should open for a highlighted filter.
    pub fn open_overflow_requested(&self) -> &Signal<FilterId> {
        &self.highlight.open_requested
    }

    /// The committed overflow set, in row order.
    pub fn overflowed(&self) -> Vec<FilterId> {
        self.overflow.overflowed().get()
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.overflow.mode()
    }

    pub fn slots(&self) -> &SlotTable<F::Control> {
        &self.slots
    }

    pub fn control(&self, key: SlotKey) -> Option<&F::Control> {
        self.slots.get(key).map(|slot| slot.control())
    }

    /// Mutable access to a control, for forwarding user input to it.
    pub fn control_mut(&mut self, key: SlotKey) -> Option<&mut F::Control> {
        self.slots.get_mut(key).map(|slot| slot.control_mut())
    }

    /// Report a selection made in a control.
    pub fn notify_selection(&self, filter_id: &FilterId, value: Value) -> Result<()> {
        if self.slots.key_of(filter_id).is_none() {
            return Err(Error::UnknownFilter(filter_id.clone()));
        }
        self.selection_changed.emit(SelectionChange {
            filter_id: filter_id.clone(),
            value,
        });
        Ok(())
    }

    /// Run one render pass and compose the layout.
    pub fn render(&mut self, input: PanelInput<'_>) -> PanelView {
        let _perf = PerfSpan::new(span_names::RENDER);
        let snapshot = input.filters;

        let partition = self
            .resolver
            .partition(&snapshot.filters, &snapshot.scope)
            .reconcile();
        let cross_items = cross_filter_items(input.cross_filters, &partition);
        let merged = merge(&cross_items, &partition.in_scope);

        let mut present = merged.clone();
        present.extend(partition.out_of_scope.iter().cloned());
        self.slots.allocate(&present, &mut self.factory);

        self.overflow.set_mode(input.layout_mode);
        let row_ids: HashSet<&FilterId> = merged.iter().map(|item| &item.id).collect();
        self.overflow.commit(&row_ids);

        let overflowed = self.overflow.overflowed().get();
        self.highlight.on_highlight(input.highlight, &overflowed);

        for id in input.clear_all {
            self.clear(id);
        }

        let boundary = merged
            .iter()
            .position(|item| !item.is_cross())
            .unwrap_or(merged.len());
        let (cross, natives) = merged.split_at(boundary);
        let out_of_scope = place_all(&mut self.slots, &partition.out_of_scope, Placement::OutOfScope);
        let layout = Layout {
            cross,
            natives,
            out_of_scope,
            force_render: partition.has_required_first(),
            show_collapse_panel: snapshot.scope.has_tabs && !snapshot.filters.is_empty(),
        };

        filterbar_debug!(
            mode = ?input.layout_mode,
            cross = cross.len(),
            in_scope = natives.len(),
            out_of_scope = partition.out_of_scope.len(),
            overflowed = overflowed.len(),
            "render pass"
        );

        match input.layout_mode {
            LayoutMode::Vertical => PanelView::Vertical(self.vertical(&layout)),
            LayoutMode::Horizontal => PanelView::Horizontal(self.horizontal(&layout)),
        }
    }

    fn clear(&mut self, id: &FilterId) {
        let Some(slot) = self.slots.key_of(id).and_then(|key| self.slots.get_mut(key)) else {
            tracing::debug!(target: targets::PANEL, %id, "clear-all for unknown filter");
            return;
        };
        slot.control_mut().clear();
        self.clear_all_completed.emit(id.clone());
    }

    fn vertical(&mut self, layout: &Layout<'_>) -> VerticalView {
        let cross_filters = place_all(&mut self.slots, layout.cross, Placement::Inline);
        let in_scope = place_all(&mut self.slots, layout.natives, Placement::Inline);
        VerticalView {
            cross_filters,
            in_scope,
            out_of_scope: layout.out_of_scope_section(),
        }
    }

    fn horizontal(&mut self, layout: &Layout<'_>) -> HorizontalView {
        let split = self.overflow.split(layout.natives, layout.cross);
        let last_cross = layout.cross.last().map(|item| &item.id);

        let mut row = Vec::with_capacity(layout.cross.len() + layout.natives.len());
        for item in layout.cross.iter().chain(layout.natives) {
            let overflowed = self.overflow.is_overflowed(&item.id);
            let placement = if overflowed {
                Placement::Overflowed
            } else {
                Placement::Inline
            };
            if let Some(slot) = place(&mut self.slots, item, placement) {
                row.push(RowEntry {
                    slot,
                    overflowed,
                    last_cross_filter: !layout.natives.is_empty() && last_cross == Some(&item.id),
                });
            }
        }

        let active = split.active();
        let trigger = OverflowTrigger {
            text: self.config.labels.trigger_text.clone(),
            count: active.len(),
            tooltip: self
                .config
                .labels
                .tooltip(active.iter().map(|item| item.name.as_str())),
        };

        let has_out_of_scope = layout.show_collapse_panel && !layout.out_of_scope.is_empty();
        let dropdown = (!split.is_empty() || has_out_of_scope).then(|| DropdownContent {
            cross_filters: refs(&self.slots, &split.cross_filters),
            in_scope: refs(&self.slots, &split.in_scope),
            out_of_scope: layout.out_of_scope_section(),
        });

        HorizontalView {
            row,
            trigger,
            dropdown,
            force_render: layout.force_render,
        }
    }
}

/// Borrowed pieces of one pass, shared by both layout templates.
struct Layout<'a> {
    cross: &'a [FilterItem],
    natives: &'a [FilterItem],
    /// Out-of-scope slots, already placed whether or not a section shows them.
    out_of_scope: Vec<SlotRef>,
    force_render: bool,
    show_collapse_panel: bool,
}

impl Layout<'_> {
    fn out_of_scope_section(&self) -> Option<CollapsibleSection> {
        self.show_collapse_panel.then(|| CollapsibleSection {
            slots: self.out_of_scope.clone(),
            force_render: self.force_render,
        })
    }
}

/// Cross-filter items for this pass, minus any that collide with an
/// out-of-scope native id. In-scope collisions are left to [`merge`].
fn cross_filter_items(cross_filters: &[CrossFilter], partition: &ScopePartition) -> Vec<FilterItem> {
    let out_of_scope: HashSet<&FilterId> = partition.out_of_scope.iter().map(|item| &item.id).collect();
    cross_filters
        .iter()
        .enumerate()
        .map(|(order, cross)| cross.to_item(order))
        .filter(|item| {
            let collides = out_of_scope.contains(&item.id);
            if collides {
                tracing::warn!(
                    target: targets::MERGE,
                    id = %item.id,
                    "cross-filter id collides with an out-of-scope native filter; keeping the native filter"
                );
            }
            !collides
        })
        .collect()
}

fn slot_ref<C>(slots: &SlotTable<C>, item: &FilterItem) -> Option<SlotRef> {
    slots.key_of(&item.id).map(|key| SlotRef {
        key,
        id: item.id.clone(),
        kind: item.kind,
    })
}

fn refs<C>(slots: &SlotTable<C>, items: &[FilterItem]) -> Vec<SlotRef> {
    items.iter().filter_map(|item| slot_ref(slots, item)).collect()
}

fn place<C: FilterControl>(slots: &mut SlotTable<C>, item: &FilterItem, placement: Placement) -> Option<SlotRef> {
    let slot = slot_ref(slots, item)?;
    slots.place(slot.key, placement);
    Some(slot)
}

fn place_all<C: FilterControl>(slots: &mut SlotTable<C>, items: &[FilterItem], placement: Placement) -> Vec<SlotRef> {
    items
        .iter()
        .filter_map(|item| place(slots, item, placement))
        .collect()
}
