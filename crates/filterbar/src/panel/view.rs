//! The composed layout produced by a render pass.
//!
//! Views never own controls. Every entry is a [`SlotRef`], and the same
//! filter resolves to the same slot whether it shows up inline, in the
//! overflow dropdown or in the out-of-scope section.

use std::fmt::{self, Write as _};

use crate::item::{FilterId, FilterKind};
use crate::overflow::LayoutMode;
use crate::slots::SlotKey;

/// Reference from a view position to a render slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRef {
    pub key: SlotKey,
    pub id: FilterId,
    pub kind: FilterKind,
}

/// A collapsible group of slots, collapsed by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsibleSection {
    pub slots: Vec<SlotRef>,
    /// Mount the contents even while collapsed.
    pub force_render: bool,
}

/// Layout of the vertical sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerticalView {
    pub cross_filters: Vec<SlotRef>,
    pub in_scope: Vec<SlotRef>,
    /// Present when the dashboard has tabs and at least one filter.
    pub out_of_scope: Option<CollapsibleSection>,
}

/// One entry of the horizontal row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEntry {
    pub slot: SlotRef,
    /// Hidden from the row and shown in the dropdown instead.
    pub overflowed: bool,
    /// Final cross-filter with native filters after it.
    pub last_cross_filter: bool,
}

/// The "more filters" trigger at the end of the horizontal row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowTrigger {
    pub text: String,
    /// Overflowed items that hold a value.
    pub count: usize,
    pub tooltip: String,
}

/// Contents of the overflow dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownContent {
    pub cross_filters: Vec<SlotRef>,
    pub in_scope: Vec<SlotRef>,
    pub out_of_scope: Option<CollapsibleSection>,
}

impl DropdownContent {
    /// All slots in display order.
    pub fn slots(&self) -> impl Iterator<Item = &SlotRef> {
        self.cross_filters
            .iter()
            .chain(&self.in_scope)
            .chain(self.out_of_scope.iter().flat_map(|section| &section.slots))
    }
}

/// Layout of the horizontal bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizontalView {
    /// Cross-filters then in-scope natives, in merge order.
    pub row: Vec<RowEntry>,
    pub trigger: OverflowTrigger,
    /// Absent when there is nothing to put in it.
    pub dropdown: Option<DropdownContent>,
    /// Mount the dropdown contents even while closed.
    pub force_render: bool,
}

impl HorizontalView {
    /// Slots visible in the row.
    pub fn inline(&self) -> impl Iterator<Item = &SlotRef> {
        self.row.iter().filter(|e| !e.overflowed).map(|e| &e.slot)
    }

    /// Slots moved from the row to the dropdown.
    pub fn overflowed(&self) -> impl Iterator<Item = &SlotRef> {
        self.row.iter().filter(|e| e.overflowed).map(|e| &e.slot)
    }
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    Vertical(VerticalView),
    Horizontal(HorizontalView),
}

impl PanelView {
    pub fn layout_mode(&self) -> LayoutMode {
        match self {
            Self::Vertical(_) => LayoutMode::Vertical,
            Self::Horizontal(_) => LayoutMode::Horizontal,
        }
    }

    pub fn as_vertical(&self) -> Option<&VerticalView> {
        match self {
            Self::Vertical(view) => Some(view),
            Self::Horizontal(_) => None,
        }
    }

    pub fn as_horizontal(&self) -> Option<&HorizontalView> {
        match self {
            Self::Horizontal(view) => Some(view),
            Self::Vertical(_) => None,
        }
    }
}

fn write_slot(out: &mut String, indent: usize, slot: &SlotRef, note: &str) -> fmt::Result {
    let kind = match slot.kind {
        FilterKind::Native => "",
        FilterKind::Cross => " (cross)",
    };
    writeln!(out, "{:indent$}- {}{}{}", "", slot.id, kind, note, indent = indent)
}

fn write_section(out: &mut String, indent: usize, section: &CollapsibleSection) -> fmt::Result {
    let force = if section.force_render { ", force-rendered" } else { "" };
    writeln!(out, "{:indent$}out of scope (collapsed{force})", "", indent = indent)?;
    for slot in &section.slots {
        write_slot(out, indent + 2, slot, "")?;
    }
    Ok(())
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        match self {
            Self::Vertical(view) => {
                writeln!(out, "vertical")?;
                for slot in view.cross_filters.iter().chain(&view.in_scope) {
                    write_slot(&mut out, 2, slot, "")?;
                }
                if let Some(section) = &view.out_of_scope {
                    write_section(&mut out, 2, section)?;
                }
            }
            Self::Horizontal(view) => {
                writeln!(out, "horizontal")?;
                for entry in &view.row {
                    let note = if entry.overflowed { " [overflowed]" } else { "" };
                    write_slot(&mut out, 2, &entry.slot, note)?;
                }
                writeln!(
                    out,
                    "  trigger \"{}\" ({}): {}",
                    view.trigger.text, view.trigger.count, view.trigger.tooltip
                )?;
                if let Some(dropdown) = &view.dropdown {
                    writeln!(out, "  dropdown")?;
                    for slot in dropdown.cross_filters.iter().chain(&dropdown.in_scope) {
                        write_slot(&mut out, 4, slot, "")?;
                    }
                    if let Some(section) = &dropdown.out_of_scope {
                        write_section(&mut out, 4, section)?;
                    }
                }
            }
        }
        f.write_str(&out)
    }
}
