//! Ordering of cross-filters and in-scope native filters into one sequence.

use std::collections::HashSet;

use filterbar_core::logging::targets;

use crate::item::{FilterId, FilterItem};

/// Merge cross-filters and in-scope native filters into render order.
///
/// Cross-filters come first. Each group keeps its input order; there is no
/// secondary sort. If a cross-filter id collides with a native id the native
/// entry wins and the cross-filter is dropped.
pub fn merge(cross_filters: &[FilterItem], in_scope_native: &[FilterItem]) -> Vec<FilterItem> {
    let native_ids: HashSet<&FilterId> = in_scope_native.iter().map(|item| &item.id).collect();

    let mut merged = Vec::with_capacity(cross_filters.len() + in_scope_native.len());
    for item in cross_filters {
        if native_ids.contains(&item.id) {
            tracing::warn!(
                target: targets::MERGE,
                id = %item.id,
                "cross-filter id collides with a native filter; keeping the native filter"
            );
            continue;
        }
        merged.push(item.clone());
    }
    merged.extend(in_scope_native.iter().cloned());
    merged
}
