//! Scope classification of native filters.
//!
//! On a dashboard with tabs, only filters that apply to something in the
//! currently active tabs are shown inline. The rest are kept, in order, in
//! the out-of-scope half of a [`ScopePartition`] so they stay addressable.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use filterbar_core::logging::targets;

use crate::item::{ChartId, FilterId, FilterItem, NativeFilter};

/// The dashboard's current tab/section state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeContext {
    /// Whether the dashboard layout contains tabs at all.
    pub has_tabs: bool,
    /// Tabs currently selected anywhere on the dashboard.
    pub active_tabs: HashSet<String>,
    /// For each chart, the tabs enclosing it.
    pub chart_tab_parents: HashMap<ChartId, Vec<String>>,
}

impl ScopeContext {
    /// Whether `chart` is visible under the active tabs.
    ///
    /// Charts without tab parents are visible on every tab.
    pub fn is_chart_visible(&self, chart: ChartId) -> bool {
        match self.chart_tab_parents.get(&chart) {
            None => true,
            Some(parents) => parents.iter().all(|tab| self.active_tabs.contains(tab)),
        }
    }
}

/// Native filters split by scope, each half in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopePartition {
    pub in_scope: Vec<FilterItem>,
    pub out_of_scope: Vec<FilterItem>,
}

impl ScopePartition {
    /// Drop out-of-scope entries whose id also appears in scope.
    ///
    /// Such an overlap is an upstream configuration bug. The in-scope entry
    /// wins so the filter keeps rendering inline.
    pub fn reconcile(mut self) -> Self {
        let in_scope: HashSet<&FilterId> = self.in_scope.iter().map(|item| &item.id).collect();
        let before = self.out_of_scope.len();
        let mut conflicts = Vec::new();
        self.out_of_scope.retain(|item| {
            let conflict = in_scope.contains(&item.id);
            if conflict {
                conflicts.push(item.id.clone());
            }
            !conflict
        });
        if !conflicts.is_empty() {
            tracing::warn!(
                target: targets::SCOPE,
                ?conflicts,
                dropped = before - self.out_of_scope.len(),
                "filters reported both in and out of scope; keeping them in scope"
            );
        }
        self
    }

    /// Whether any filter on either side is required-first.
    pub fn has_required_first(&self) -> bool {
        self.in_scope
            .iter()
            .chain(&self.out_of_scope)
            .any(|item| item.required_first)
    }
}

/// Splits configured filters into in-scope and out-of-scope.
pub trait ScopeResolver {
    fn partition(&self, filters: &[NativeFilter], context: &ScopeContext) -> ScopePartition;
}

/// Resolves scope from the active tabs.
///
/// A filter is in scope when the dashboard has no tabs, when any chart it
/// applies to is visible under the active tabs, or when any tab in its root
/// path is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabScopeResolver;

impl TabScopeResolver {
    fn is_in_scope(filter: &NativeFilter, context: &ScopeContext) -> bool {
        let chart_in_scope = filter
            .scope
            .charts_in_scope
            .iter()
            .any(|&chart| context.is_chart_visible(chart));
        let root_in_active_tab = filter
            .scope
            .root_path
            .iter()
            .any(|tab| context.active_tabs.contains(tab));
        chart_in_scope || root_in_active_tab
    }
}

impl ScopeResolver for TabScopeResolver {
    fn partition(&self, filters: &[NativeFilter], context: &ScopeContext) -> ScopePartition {
        let mut partition = ScopePartition::default();
        for (order, filter) in filters.iter().enumerate() {
            let item = filter.to_item(order);
            if !context.has_tabs || Self::is_in_scope(filter, context) {
                partition.in_scope.push(item);
            } else {
                partition.out_of_scope.push(item);
            }
        }
        partition
    }
}
