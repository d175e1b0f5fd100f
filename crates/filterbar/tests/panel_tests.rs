//! End-to-end tests for the filter panel.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use filterbar::{
    ControlFactory, CrossFilter, Error, FilterControl, FilterId, FilterItem, FilterPanel,
    FilterScope, FilterSnapshot, HighlightSignal, LayoutMode, Measurement, NativeFilter,
    PanelConfig, PanelInput, Placement, ScopeContext, ScopePartition, ScopeResolver,
};

#[derive(Debug)]
struct Recorder {
    id: FilterId,
    placements: Vec<Placement>,
    cleared: usize,
}

impl FilterControl for Recorder {
    fn set_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    fn clear(&mut self) {
        self.cleared += 1;
    }
}

#[derive(Default)]
struct RecorderFactory {
    created: Arc<AtomicUsize>,
}

impl ControlFactory for RecorderFactory {
    type Control = Recorder;

    fn create(&mut self, item: &FilterItem) -> Recorder {
        self.created.fetch_add(1, Ordering::SeqCst);
        Recorder {
            id: item.id.clone(),
            placements: Vec::new(),
            cleared: 0,
        }
    }
}

fn panel() -> (FilterPanel<RecorderFactory>, Arc<AtomicUsize>) {
    let factory = RecorderFactory::default();
    let created = factory.created.clone();
    (FilterPanel::new(factory, PanelConfig::default()), created)
}

fn ids(view: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    view.into_iter().map(|id| id.as_ref().to_string()).collect()
}

fn cross(name: &str, emitter: u64) -> CrossFilter {
    CrossFilter {
        emitter_id: emitter,
        name: name.to_string(),
        column: Some("country".to_string()),
        value: Some("France".to_string()),
        path: vec!["ROOT_ID".to_string()],
    }
}

fn rooted(id: &str, tab: &str) -> NativeFilter {
    NativeFilter::new(id, id).with_value(true).with_scope(FilterScope {
        root_path: vec![tab.to_string()],
        charts_in_scope: Vec::new(),
    })
}

fn tabbed(filters: Vec<NativeFilter>, active: &str) -> FilterSnapshot {
    FilterSnapshot::new(filters).with_scope(ScopeContext {
        has_tabs: true,
        active_tabs: HashSet::from([active.to_string()]),
        chart_tab_parents: HashMap::new(),
    })
}

fn natives(names: &[&str]) -> FilterSnapshot {
    FilterSnapshot::new(
        names
            .iter()
            .map(|name| NativeFilter::new(*name, *name).with_value(true))
            .collect(),
    )
}

fn report(panel: &FilterPanel<RecorderFactory>, overflowed: &[&str]) {
    panel.measurement_port().report(Measurement::Overflowed(
        overflowed.iter().map(|id| FilterId::from(*id)).collect(),
    ));
}

#[test]
fn test_vertical_out_of_scope_section() {
    let (mut panel, _) = panel();
    let snapshot = tabbed(vec![rooted("A", "TAB-1"), rooted("B", "TAB-2")], "TAB-1");

    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &[]));
    let view = view.as_vertical().unwrap();

    assert!(view.cross_filters.is_empty());
    assert_eq!(ids(view.in_scope.iter().map(|s| &s.id)), vec!["A"]);
    let section = view.out_of_scope.as_ref().unwrap();
    assert_eq!(ids(section.slots.iter().map(|s| &s.id)), vec!["B"]);
    assert!(!section.force_render);
}

#[test]
fn test_vertical_required_first_forces_render() {
    let (mut panel, _) = panel();
    let snapshot = tabbed(
        vec![rooted("A", "TAB-1"), rooted("B", "TAB-2").required_first(true)],
        "TAB-1",
    );

    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &[]));
    let section = view.as_vertical().unwrap().out_of_scope.clone().unwrap();
    assert!(section.force_render);
}

#[test]
fn test_no_tabs_means_no_out_of_scope_section() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A"]);

    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &[]));
    assert!(view.as_vertical().unwrap().out_of_scope.is_none());

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    assert!(view.as_horizontal().unwrap().dropdown.is_none());
}

#[test]
fn test_vertical_lists_cross_filters_first() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A"]);
    let crosses = [cross("X", 1)];

    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &crosses));
    let view = view.as_vertical().unwrap();
    assert_eq!(ids(view.cross_filters.iter().map(|s| &s.id)), vec!["X1"]);
    assert_eq!(ids(view.in_scope.iter().map(|s| &s.id)), vec!["A"]);
}

#[test]
fn test_horizontal_overflow_scenario() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B", "C"]);
    let crosses = [cross("X", 1)];
    report(&panel, &["B", "C"]);

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));
    let view = view.as_horizontal().unwrap();

    assert_eq!(ids(view.inline().map(|s| &s.id)), vec!["X1", "A"]);
    assert_eq!(ids(view.overflowed().map(|s| &s.id)), vec!["B", "C"]);
    assert_eq!(view.trigger.text, "More filters");
    assert_eq!(view.trigger.count, 2);
    assert_eq!(view.trigger.tooltip, "Applied filters: B, C");

    let dropdown = view.dropdown.as_ref().unwrap();
    assert!(dropdown.cross_filters.is_empty());
    assert_eq!(ids(dropdown.in_scope.iter().map(|s| &s.id)), vec!["B", "C"]);
    assert!(dropdown.out_of_scope.is_none());

    let marked: Vec<bool> = view.row.iter().map(|e| e.last_cross_filter).collect();
    assert_eq!(marked, vec![true, false, false, false]);
}

#[test]
fn test_reordered_overflow_updates_dropdown_order() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B", "C"]);
    let crosses = [cross("X", 1)];
    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();
    panel.overflow_changed().connect(move |ids: &Vec<FilterId>| {
        changes_clone.lock().push(ids.clone());
    });

    report(&panel, &["B", "C"]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));
    report(&panel, &["B", "C"]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));
    assert_eq!(changes.lock().len(), 1);

    report(&panel, &["C", "B"]);
    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));

    assert_eq!(changes.lock().len(), 2);
    assert_eq!(ids(changes.lock()[1].iter()), vec!["C", "B"]);
    let dropdown = view.as_horizontal().unwrap().dropdown.clone().unwrap();
    assert_eq!(ids(dropdown.in_scope.iter().map(|s| &s.id)), vec!["C", "B"]);
}

#[test]
fn test_trigger_counts_only_items_with_values() {
    let (mut panel, _) = panel();
    let snapshot = FilterSnapshot::new(vec![
        NativeFilter::new("A", "A"),
        NativeFilter::new("B", "B"),
        NativeFilter::new("C", "C").with_value(true),
    ]);
    let crosses = [cross("X", 1)];
    report(&panel, &["X1", "B", "C"]);

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));
    let view = view.as_horizontal().unwrap();

    assert_eq!(view.trigger.count, 2);
    assert_eq!(view.trigger.tooltip, "Applied filters: C, X");
    let dropdown = view.dropdown.as_ref().unwrap();
    assert_eq!(ids(dropdown.cross_filters.iter().map(|s| &s.id)), vec!["X1"]);
    assert_eq!(ids(dropdown.in_scope.iter().map(|s| &s.id)), vec!["B", "C"]);
}

#[test]
fn test_empty_trigger_tooltip() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A"]);

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    let trigger = &view.as_horizontal().unwrap().trigger;
    assert_eq!(trigger.count, 0);
    assert_eq!(trigger.tooltip, "No applied filters");
}

#[test]
fn test_dropdown_holds_out_of_scope_section_on_tabbed_dashboard() {
    let (mut panel, _) = panel();
    let snapshot = tabbed(vec![rooted("A", "TAB-1"), rooted("B", "TAB-2")], "TAB-1");

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    let view = view.as_horizontal().unwrap();

    assert_eq!(ids(view.inline().map(|s| &s.id)), vec!["A"]);
    assert_eq!(view.trigger.count, 0);
    let section = view.dropdown.as_ref().unwrap().out_of_scope.as_ref().unwrap();
    assert_eq!(ids(section.slots.iter().map(|s| &s.id)), vec!["B"]);
}

#[test]
fn test_slots_survive_mode_switches_and_overflow_changes() {
    let (mut panel, created) = panel();
    let snapshot = natives(&["A", "B", "C"]);
    let crosses = [cross("X", 1)];

    panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &crosses));
    let key_b = panel.slots().key_of(&FilterId::from("B")).unwrap();
    assert_eq!(created.load(Ordering::SeqCst), 4);

    report(&panel, &["B", "C"]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));
    report(&panel, &["C"]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));
    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &crosses));

    assert_eq!(created.load(Ordering::SeqCst), 4);
    assert_eq!(panel.slots().instances_created(), 4);
    assert_eq!(panel.slots().key_of(&FilterId::from("B")), Some(key_b));
    assert!(panel.overflowed().is_empty());
    assert_eq!(view.as_vertical().unwrap().in_scope[1].key, key_b);

    let recorder = panel.control(key_b).unwrap();
    assert_eq!(recorder.id.as_str(), "B");
    assert_eq!(
        recorder.placements,
        vec![Placement::Inline, Placement::Overflowed, Placement::Inline]
    );
}

#[test]
fn test_slot_follows_filter_across_scope_change() {
    let (mut panel, created) = panel();
    let filters = vec![rooted("A", "TAB-1"), rooted("B", "TAB-2")];

    panel.render(PanelInput::new(LayoutMode::Vertical, &tabbed(filters.clone(), "TAB-1"), &[]));
    let key_b = panel.slots().key_of(&FilterId::from("B")).unwrap();
    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &tabbed(filters, "TAB-2"), &[]));

    let view = view.as_vertical().unwrap();
    assert_eq!(view.in_scope[0].key, key_b);
    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_eq!(
        panel.control(key_b).unwrap().placements,
        vec![Placement::OutOfScope, Placement::Inline]
    );
}

#[test]
fn test_removed_filter_releases_its_slot() {
    let (mut panel, created) = panel();
    panel.render(PanelInput::new(LayoutMode::Vertical, &natives(&["A", "B"]), &[]));
    let key_b = panel.slots().key_of(&FilterId::from("B")).unwrap();

    panel.render(PanelInput::new(LayoutMode::Vertical, &natives(&["A"]), &[]));
    assert!(panel.control(key_b).is_none());

    panel.render(PanelInput::new(LayoutMode::Vertical, &natives(&["A", "B"]), &[]));
    assert_eq!(created.load(Ordering::SeqCst), 3);
}

#[test]
fn test_stale_measurement_ids_are_ignored() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B"]);
    report(&panel, &["B", "GONE"]);

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    assert_eq!(ids(view.as_horizontal().unwrap().overflowed().map(|s| &s.id)), vec!["B"]);

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &natives(&["A"]), &[]));
    assert!(view.as_horizontal().unwrap().dropdown.is_none());
    assert!(panel.overflowed().is_empty());
}

#[test]
fn test_unavailable_measurement_shows_everything_inline() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B"]);
    report(&panel, &["B"]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));

    panel.measurement_port().report(Measurement::Unavailable);
    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    assert_eq!(ids(view.as_horizontal().unwrap().inline().map(|s| &s.id)), vec!["A", "B"]);
}

#[test]
fn test_measurement_in_vertical_mode_is_discarded() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B"]);
    report(&panel, &["B"]);
    panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &[]));
    assert!(panel.overflowed().is_empty());

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    assert_eq!(view.as_horizontal().unwrap().overflowed().count(), 0);
}

#[test]
fn test_highlight_opens_dropdown_once_per_version() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B", "C"]);
    let opened = Arc::new(Mutex::new(Vec::new()));
    let opened_clone = opened.clone();
    panel.open_overflow_requested().connect(move |id: &FilterId| {
        opened_clone.lock().push(id.clone());
    });

    report(&panel, &["B", "C"]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));

    let highlight = HighlightSignal::new("C", 1);
    let input = PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]).with_highlight(&highlight);
    panel.render(input);
    panel.render(input);
    assert_eq!(ids(opened.lock().iter()), vec!["C"]);

    let inline = HighlightSignal::new("A", 2);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]).with_highlight(&inline));
    let again = HighlightSignal::new("C", 3);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]).with_highlight(&again));
    assert_eq!(ids(opened.lock().iter()), vec!["C", "C"]);
}

fn count_opens(panel: &FilterPanel<RecorderFactory>) -> Arc<AtomicUsize> {
    let opens = Arc::new(AtomicUsize::new(0));
    let opens_clone = opens.clone();
    panel.open_overflow_requested().connect(move |_| {
        opens_clone.fetch_add(1, Ordering::SeqCst);
    });
    opens
}

#[test]
fn test_plain_render_does_not_rearm_handled_highlight() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B", "C"]);
    let opens = count_opens(&panel);
    report(&panel, &["B", "C"]);

    let highlight = HighlightSignal::new("C", 1);
    let highlighted = PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]).with_highlight(&highlight);
    panel.render(highlighted);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    panel.render(highlighted);

    assert_eq!(opens.load(Ordering::SeqCst), 1);
}

#[test]
fn test_highlight_at_version_zero_fires_after_plain_render() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B"]);
    let opens = count_opens(&panel);
    report(&panel, &["B"]);

    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    let highlight = HighlightSignal::new("B", 0);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]).with_highlight(&highlight));

    assert_eq!(opens.load(Ordering::SeqCst), 1);
}

#[test]
fn test_disconnected_host_stops_receiving_overflow_changes() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B"]);
    let changes = Arc::new(AtomicUsize::new(0));
    let changes_clone = changes.clone();
    let id = panel.overflow_changed().connect(move |_| {
        changes_clone.fetch_add(1, Ordering::SeqCst);
    });

    report(&panel, &["B"]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));
    assert!(panel.overflow_changed().disconnect(id));
    report(&panel, &[]);
    panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &[]));

    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert!(panel.overflowed().is_empty());
}

/// Puts filters whose id starts with "hidden" out of scope, tabs or not.
struct PrefixResolver;

impl ScopeResolver for PrefixResolver {
    fn partition(&self, filters: &[NativeFilter], _context: &ScopeContext) -> ScopePartition {
        let mut partition = ScopePartition::default();
        for (order, filter) in filters.iter().enumerate() {
            let item = filter.to_item(order);
            if filter.id.as_str().starts_with("hidden") {
                partition.out_of_scope.push(item);
            } else {
                partition.in_scope.push(item);
            }
        }
        partition
    }
}

#[test]
fn test_out_of_scope_placement_without_collapse_section() {
    let mut panel = FilterPanel::with_resolver(RecorderFactory::default(), PrefixResolver, PanelConfig::default());
    let visible = natives(&["A", "hidden-B"]);

    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &visible, &[]));
    let key_b = panel.slots().key_of(&FilterId::from("hidden-B")).unwrap();
    assert!(view.as_vertical().unwrap().out_of_scope.is_none());
    assert_eq!(panel.control(key_b).unwrap().placements, vec![Placement::OutOfScope]);

    let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &visible, &[]));
    let view = view.as_horizontal().unwrap();
    assert_eq!(ids(view.inline().map(|s| &s.id)), vec!["A"]);
    assert!(view.dropdown.is_none());
    assert_eq!(panel.control(key_b).unwrap().placements, vec![Placement::OutOfScope]);
}

#[test]
fn test_clear_all_resets_present_controls() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A", "B"]);
    let completed = Arc::new(AtomicUsize::new(0));
    let completed_clone = completed.clone();
    panel.clear_all_completed.connect(move |_| {
        completed_clone.fetch_add(1, Ordering::SeqCst);
    });

    let clear = [FilterId::from("A"), FilterId::from("MISSING")];
    panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &[]).with_clear_all(&clear));

    let key_a = panel.slots().key_of(&FilterId::from("A")).unwrap();
    let key_b = panel.slots().key_of(&FilterId::from("B")).unwrap();
    assert_eq!(panel.control(key_a).unwrap().cleared, 1);
    assert_eq!(panel.control(key_b).unwrap().cleared, 0);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_selection_is_reported_for_known_filters_only() {
    let (mut panel, _) = panel();
    let snapshot = natives(&["A"]);
    panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &[]));

    let selected = Arc::new(Mutex::new(Vec::new()));
    let selected_clone = selected.clone();
    panel.selection_changed.connect(move |change| {
        selected_clone.lock().push(change.clone());
    });

    panel
        .notify_selection(&FilterId::from("A"), serde_json::json!(["France"]))
        .unwrap();
    let err = panel
        .notify_selection(&FilterId::from("Z"), serde_json::json!(null))
        .unwrap_err();

    assert!(matches!(err, Error::UnknownFilter(ref id) if id.as_str() == "Z"));
    let selected = selected.lock();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].value, serde_json::json!(["France"]));
}

#[test]
fn test_native_wins_over_colliding_cross_filter() {
    let (mut panel, created) = panel();
    let snapshot = natives(&["X1"]);
    let crosses = [cross("X", 1)];

    let view = panel.render(PanelInput::new(LayoutMode::Vertical, &snapshot, &crosses));
    let view = view.as_vertical().unwrap();
    assert!(view.cross_filters.is_empty());
    assert_eq!(ids(view.in_scope.iter().map(|s| &s.id)), vec!["X1"]);
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[test]
fn test_render_under_subscriber_prints_tree() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("filterbar=trace")
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let (mut panel, _) = panel();
        let snapshot = natives(&["A", "B"]);
        let crosses = [cross("X", 1)];
        report(&panel, &["B"]);

        let view = panel.render(PanelInput::new(LayoutMode::Horizontal, &snapshot, &crosses));
        let tree = view.to_string();
        assert!(tree.starts_with("horizontal\n"));
        assert!(tree.contains("- X1 (cross)"));
        assert!(tree.contains("- B [overflowed]"));
        assert!(tree.contains("trigger \"More filters\" (1): Applied filters: B"));
    });
}
