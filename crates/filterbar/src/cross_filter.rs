//! Derivation of active cross-filters from global filter state.
//!
//! A chart emits a cross-filter when a user selects something in it. The
//! selection lands in the chart's [`DataMask`]. [`select_cross_filters`] walks
//! the dashboard's charts in layout order and turns every non-empty mask into
//! a [`CrossFilter`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::{ChartId, FilterId, FilterItem, FilterKind};

/// The user-visible state of one chart's selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Raw selected value, scalar or array.
    pub value: Option<Value>,
    /// Preformatted label for the selection, preferred over `value`.
    pub label: Option<String>,
}

/// One column restriction a chart pushes to the rest of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraFilter {
    pub col: String,
    pub op: String,
    #[serde(default)]
    pub val: Value,
}

/// Global filter state for one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataMask {
    pub filter_state: FilterState,
    pub extra_filters: Vec<ExtraFilter>,
}

/// Global filter state for the whole dashboard, keyed by emitting chart.
pub type DataMaskState = HashMap<ChartId, DataMask>;

/// A chart's placement in the dashboard layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayoutItem {
    /// Layout node id of the chart.
    pub id: String,
    pub chart_id: ChartId,
    pub slice_name: String,
    pub slice_name_override: Option<String>,
    /// Layout node ids enclosing the chart, outermost first.
    pub parents: Vec<String>,
}

impl ChartLayoutItem {
    fn display_name(&self) -> &str {
        self.slice_name_override
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.slice_name)
    }
}

/// An active cross-filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossFilter {
    pub emitter_id: ChartId,
    /// Name of the emitting chart.
    pub name: String,
    /// Column the selection restricts, translated through the verbose map.
    pub column: Option<String>,
    /// Human-readable selection.
    pub value: Option<String>,
    /// Layout path to the emitting chart.
    pub path: Vec<String>,
}

impl CrossFilter {
    pub fn id(&self) -> FilterId {
        FilterId::cross(&self.name, self.emitter_id)
    }

    /// The render item for this cross-filter at position `order`.
    pub fn to_item(&self, order: usize) -> FilterItem {
        FilterItem {
            id: self.id(),
            kind: FilterKind::Cross,
            name: self.name.clone(),
            order,
            required_first: false,
            has_value: true,
        }
    }
}

/// Everything the selector reads, taken from a single state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CrossFilterSources<'a> {
    pub data_mask: &'a DataMaskState,
    /// Charts in dashboard layout order.
    pub chart_ids: &'a [ChartId],
    pub chart_layout_items: &'a [ChartLayoutItem],
    /// Per-chart mapping from column name to verbose name.
    pub verbose_maps: &'a HashMap<ChartId, HashMap<String, String>>,
}

/// Derive the active cross-filters, in chart order.
///
/// A chart contributes a cross-filter when its mask holds a non-empty value
/// and at least one column restriction.
pub fn select_cross_filters(sources: &CrossFilterSources<'_>) -> Vec<CrossFilter> {
    let layout_by_chart: HashMap<ChartId, &ChartLayoutItem> = sources
        .chart_layout_items
        .iter()
        .map(|item| (item.chart_id, item))
        .collect();

    sources
        .chart_ids
        .iter()
        .filter_map(|&chart_id| {
            let mask = sources.data_mask.get(&chart_id)?;
            if !mask.filter_state.value.as_ref().is_some_and(is_truthy) {
                return None;
            }
            let column = mask.extra_filters.first()?.col.clone();
            let layout = layout_by_chart.get(&chart_id);

            let mut path: Vec<String> = layout.map(|l| l.parents.clone()).unwrap_or_default();
            path.push(layout.map(|l| l.id.clone()).unwrap_or_default());

            let verbose = sources
                .verbose_maps
                .get(&chart_id)
                .and_then(|map| map.get(&column))
                .cloned();

            Some(CrossFilter {
                emitter_id: chart_id,
                name: layout.map(|l| l.display_name().to_string()).unwrap_or_default(),
                column: Some(verbose.unwrap_or(column)),
                value: extract_label(&mask.filter_state),
                path,
            })
        })
        .collect()
}

/// Human-readable form of a selection.
///
/// Uses the label when it is complete, otherwise joins the raw values.
pub fn extract_label(state: &FilterState) -> Option<String> {
    if let Some(label) = state.label.as_ref().filter(|l| !l.contains("undefined")) {
        return Some(label.clone());
    }
    let value = state.value.as_ref().filter(|v| is_truthy(v))?;
    let parts: Vec<String> = match value {
        Value::Array(values) => values.iter().map(value_text).collect(),
        other => vec![value_text(other)],
    };
    Some(parts.join(", "))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
