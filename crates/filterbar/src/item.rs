//! Filter identities and the per-render item model.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a chart on the dashboard.
pub type ChartId = u64;

/// Globally unique identifier of a filter, native or cross.
///
/// The id is the stable key threaded through scope partitions, slot tables
/// and overflow sets. Native filter ids come from the dashboard
/// configuration; cross-filter ids are synthesized with [`FilterId::cross`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(String);

impl FilterId {
    /// Create an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the cross-filter emitted by `emitter` under `name`.
    ///
    /// Combines the name with the chart id so a single chart can emit more
    /// than one cross-filter.
    pub fn cross(name: &str, emitter: ChartId) -> Self {
        Self(format!("{name}{emitter}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FilterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FilterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FilterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FilterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Which source produced a filter item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Configured on the dashboard, with an explicit scope.
    Native,
    /// Emitted by a user interacting with a chart.
    Cross,
}

/// One renderable filter for a single render pass.
///
/// Items are immutable values; every update replaces them wholesale. Only
/// the `id` is meant to be compared across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterItem {
    pub id: FilterId,
    pub kind: FilterKind,
    /// Display name, used for the overflow trigger summary.
    pub name: String,
    /// Position within the source list the item came from.
    pub order: usize,
    pub required_first: bool,
    pub has_value: bool,
}

impl FilterItem {
    /// Whether the item counts as holding a value.
    ///
    /// Active cross-filters always do.
    pub fn holds_value(&self) -> bool {
        self.kind == FilterKind::Cross || self.has_value
    }

    /// Whether the item came from the cross-filter source.
    pub fn is_cross(&self) -> bool {
        self.kind == FilterKind::Cross
    }
}

/// Where a native filter applies on a tabbed dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterScope {
    /// Layout containers (tabs) the filter is rooted in.
    pub root_path: Vec<String>,
    /// Charts the filter applies to.
    pub charts_in_scope: Vec<ChartId>,
}

/// A native filter as delivered by the filter configuration source,
/// already paired with its current value state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeFilter {
    pub id: FilterId,
    pub name: String,
    #[serde(default)]
    pub required_first: bool,
    #[serde(default)]
    pub has_value: bool,
    #[serde(default)]
    pub scope: FilterScope,
}

impl NativeFilter {
    /// Create a filter with no value, no scope and no required-first flag.
    pub fn new(id: impl Into<FilterId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required_first: false,
            has_value: false,
            scope: FilterScope::default(),
        }
    }

    /// Mark whether the filter currently holds a value.
    pub fn with_value(mut self, has_value: bool) -> Self {
        self.has_value = has_value;
        self
    }

    /// Mark the filter as required-first.
    pub fn required_first(mut self, required_first: bool) -> Self {
        self.required_first = required_first;
        self
    }

    /// Set the filter's scope.
    pub fn with_scope(mut self, scope: FilterScope) -> Self {
        self.scope = scope;
        self
    }

    /// The render item for this filter at position `order`.
    pub fn to_item(&self, order: usize) -> FilterItem {
        FilterItem {
            id: self.id.clone(),
            kind: FilterKind::Native,
            name: self.name.clone(),
            order,
            required_first: self.required_first,
            has_value: self.has_value,
        }
    }
}
