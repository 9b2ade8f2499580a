//! Integration tests for layout validation driven through the editor.
//!
//! Exercises: catalog → editor operations → validate_layout / can_switch_to_3d
//!
//! All tests are pure logic with no rendering or storage.

use habitat_logic::catalog::{find_main_module_type, find_sub_module_type, main_module_types};
use habitat_logic::layout::{Connection, LayoutState, PlacedMainModule, PlacedSubModule, Rotation};
use habitat_logic::validation::{
    can_switch_to_3d, find_floating_modules, validate_layout, Diagnostic, Severity,
};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

fn count_containing(diagnostics: &[Diagnostic], needle: &str) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.message.contains(needle))
        .count()
}

fn make_main(id: &str, type_id: &str, x: f32, y: f32) -> PlacedMainModule {
    PlacedMainModule::new(id, find_main_module_type(type_id).unwrap(), x, y)
}

fn make_conn(id: &str, from: (&str, &str), to: (&str, &str)) -> Connection {
    Connection {
        id: id.into(),
        from_module_id: from.0.into(),
        from_port_id: from.1.into(),
        to_module_id: to.0.into(),
        to_port_id: to.1.into(),
    }
}

/// A two-crew station that passes every check except the shower
/// recommendation (the only shower-capable module is shorter than a stall).
fn small_station() -> LayoutState {
    let mut state = LayoutState::new(2);
    let hab = state.place_main_module("habitat-container", 0.0, 0.0).unwrap();
    let svc = state.place_main_module("service-module", 0.0, 4.0).unwrap();
    let hyg = state.place_main_module("hygiene-module", 4.0, 0.0).unwrap();
    let gym = state.place_main_module("exercise-module", -3.0, 0.0).unwrap();

    state.connect(&hab, "hab-s", &svc, "svc-n").unwrap();
    state.connect(&hab, "hab-e", &hyg, "hyg-s").unwrap();
    state.connect(&hab, "hab-w", &gym, "ex-s").unwrap();

    state.place_sub_module("bed", 0.0, 0.0).unwrap();
    state.place_sub_module("bed", 0.0, 1.5).unwrap();
    state.place_sub_module("toilet", 0.5, 4.5).unwrap();
    state.place_sub_module("treadmill", -2.5, 0.5).unwrap();
    state
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn empty_layout_blocks_3d() {
    let state = LayoutState::default();
    let diagnostics = validate_layout(&state);
    let msgs = messages(&diagnostics);

    assert!(msgs.contains(&"Insufficient volume: 0.0m³ / 40.0m³ required for 4 crew"));
    assert!(msgs.contains(&"Need 4 beds for 4 crew (have 0)"));
    assert!(msgs.contains(&"Need at least 2 toilet(s) for 4 crew (have 0)"));
    assert!(msgs.contains(&"Recommend 1 shower(s) for 4 crew (have 0)"));
    assert!(msgs.contains(&"Recommend 2 exercise device(s) for 4 crew (have 0)"));

    let check = can_switch_to_3d(&state);
    assert!(!check.can_switch);
    assert_eq!(check.errors.len(), 3);
}

#[test]
fn overfilled_habitat_warns_and_errors() {
    let mut state = LayoutState::default();
    let hab = make_main("hab-1", "habitat-container", 0.0, 0.0);
    let bed = find_sub_module_type("bed").unwrap();
    state.main_modules.push(hab);
    for i in 0..4 {
        state
            .sub_modules
            .push(PlacedSubModule::new(format!("bed-{i}"), "hab-1", bed, 0.0, i as f32));
    }

    let diagnostics = validate_layout(&state);
    let warning = diagnostics
        .iter()
        .find(|d| d.message == "Habitat is at 108% capacity")
        .expect("capacity warning");
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.module_id.as_deref(), Some("hab-1"));
    assert_eq!(count_containing(&diagnostics, "Habitat exceeds volume capacity"), 1);
    assert_eq!(count_containing(&diagnostics, "not connected"), 0);
}

#[test]
fn overlapping_unconnected_pair() {
    let mut state = LayoutState::default();
    state
        .main_modules
        .push(make_main("hab-1", "habitat-container", 0.0, 0.0));
    state
        .main_modules
        .push(make_main("hab-2", "habitat-container", 2.0, 2.0));

    let diagnostics = validate_layout(&state);
    let msgs = messages(&diagnostics);
    assert!(msgs.contains(&"2 overlapping module(s) detected"));
    assert!(msgs.contains(&"1 module(s) are not connected to the station"));
    assert_eq!(count_containing(&diagnostics, "overlapping"), 1);
    assert_eq!(count_containing(&diagnostics, "not connected"), 1);
}

#[test]
fn dangling_parent_reported_once() {
    let mut state = LayoutState::default();
    state
        .main_modules
        .push(make_main("hab-1", "habitat-container", 0.0, 0.0));
    state.sub_modules.push(PlacedSubModule::new(
        "bed-1",
        "hab-404",
        find_sub_module_type("bed").unwrap(),
        0.0,
        0.0,
    ));

    let diagnostics = validate_layout(&state);
    assert_eq!(count_containing(&diagnostics, "Bed has no parent module"), 1);
    assert_eq!(count_containing(&diagnostics, "cannot be placed"), 0);
}

#[test]
fn port_compatibility_through_editor() {
    let mut state = LayoutState::default();
    let hab = state.place_main_module("habitat-container", 0.0, 0.0).unwrap();
    let log = state.place_main_module("logistics-module", 0.0, 4.0).unwrap();
    state.connect(&hab, "hab-s", &log, "log-n").unwrap();

    let diagnostics = validate_layout(&state);
    let incompatible: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.message.starts_with("Incompatible port types"))
        .collect();
    assert_eq!(incompatible.len(), 1);
    assert_eq!(
        incompatible[0].message,
        "Incompatible port types: hab-port and airlock-port"
    );
    assert_eq!(incompatible[0].module_id.as_deref(), Some(hab.as_str()));

    let mut state = LayoutState::default();
    let hab = state.place_main_module("habitat-container", 0.0, 0.0).unwrap();
    let svc = state.place_main_module("service-module", 0.0, 4.0).unwrap();
    state.connect(&hab, "hab-s", &svc, "svc-n").unwrap();
    assert_eq!(
        count_containing(&validate_layout(&state), "Incompatible port types"),
        0
    );
}

// ── Whole-station behavior ─────────────────────────────────────────────

#[test]
fn small_station_is_ready_for_3d() {
    let state = small_station();
    let diagnostics = validate_layout(&state);
    assert_eq!(
        messages(&diagnostics),
        vec!["Recommend 1 shower(s) for 2 crew (have 0)"]
    );

    let check = can_switch_to_3d(&state);
    assert!(check.can_switch);
    assert!(check.errors.is_empty());
}

#[test]
fn shower_in_hygiene_is_too_tall() {
    let mut state = small_station();
    state.place_sub_module("shower", 4.5, 0.5).unwrap();
    let diagnostics = validate_layout(&state);
    assert!(messages(&diagnostics)
        .contains(&"Shower height (2.51m) exceeds Hygiene height (2.5m)"));
    assert_eq!(count_containing(&diagnostics, "shower(s)"), 0);
    assert!(!can_switch_to_3d(&state).can_switch);
}

#[test]
fn deleting_hub_floats_the_rest() {
    let mut state = small_station();
    let hub = state.main_modules[0].instance_id.clone();
    state.delete_main_module(&hub).unwrap();

    assert!(state.connections.is_empty());
    assert_eq!(state.sub_modules.len(), 2);
    let diagnostics = validate_layout(&state);
    assert!(messages(&diagnostics).contains(&"2 module(s) are not connected to the station"));
    assert!(messages(&diagnostics).contains(&"Need 2 beds for 2 crew (have 0)"));
}

#[test]
fn rotation_can_create_overlap() {
    let mut state = LayoutState::default();
    let a = state.place_main_module("service-module", 0.0, 0.0).unwrap();
    state.place_main_module("service-module", 0.0, 2.0).unwrap();
    assert_eq!(count_containing(&validate_layout(&state), "overlapping"), 0);

    state.rotate_main_module(&a).unwrap();
    assert_eq!(
        count_containing(&validate_layout(&state), "2 overlapping module(s)"),
        1
    );
}

#[test]
fn validation_is_idempotent() {
    let mut state = small_station();
    state.place_sub_module("bed", 0.5, 0.5).unwrap();
    state.connections.push(make_conn("c-x", ("ghost", "p"), ("ghost-2", "q")));
    let first = validate_layout(&state);
    let second = validate_layout(&state);
    assert_eq!(first, second);
    assert_eq!(can_switch_to_3d(&state), can_switch_to_3d(&state));
}

#[test]
fn reconnecting_reduces_floating_count() {
    let mut state = LayoutState::default();
    for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
        state
            .main_modules
            .push(make_main(id, "external-module", i as f32 * 10.0, 0.0));
    }
    state.connections.push(make_conn("1", ("a", "ext-e"), ("b", "ext-w")));
    assert_eq!(find_floating_modules(&state), vec!["c", "d"]);

    state.connections.push(make_conn("2", ("c", "ext-w"), ("b", "ext-e")));
    assert_eq!(find_floating_modules(&state), vec!["d"]);
    assert!(messages(&validate_layout(&state))
        .contains(&"1 module(s) are not connected to the station"));

    state.connections.push(make_conn("3", ("d", "ext-w"), ("c", "ext-e")));
    assert!(find_floating_modules(&state).is_empty());
    assert_eq!(count_containing(&validate_layout(&state), "not connected"), 0);
}

#[test]
fn layout_round_trips_through_json() {
    let state = small_station();
    let json = serde_json::to_string(&state).unwrap();
    assert!(json.contains("\"crewSize\":2"));
    assert!(json.contains("\"instanceId\""));
    let restored: LayoutState = serde_json::from_str(&json).unwrap();
    assert_eq!(validate_layout(&restored), validate_layout(&state));
}

// ── Properties ─────────────────────────────────────────────────────────

fn arb_rotation() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        Just(Rotation::Deg0),
        Just(Rotation::Deg90),
        Just(Rotation::Deg180),
        Just(Rotation::Deg270),
    ]
}

fn arb_type_index() -> impl Strategy<Value = usize> {
    0..main_module_types().len()
}

proptest! {
    #[test]
    fn single_module_never_floats(
        type_idx in arb_type_index(),
        x in -50i32..50,
        y in -50i32..50,
        dangling in 0usize..4,
    ) {
        let kind = &main_module_types()[type_idx];
        let mut state = LayoutState::default();
        state.main_modules.push(PlacedMainModule::new("solo", kind, x as f32 * 0.5, y as f32 * 0.5));
        for i in 0..dangling {
            state.connections.push(make_conn(&format!("c{i}"), ("solo", "p"), ("elsewhere", "q")));
        }
        let diagnostics = validate_layout(&state);
        prop_assert_eq!(count_containing(&diagnostics, "not connected"), 0);
    }

    #[test]
    fn separated_modules_never_overlap(
        a_idx in arb_type_index(),
        b_idx in arb_type_index(),
        a_rot in arb_rotation(),
        b_rot in arb_rotation(),
        x in -40i32..40,
        y in -40i32..40,
        gap in 0i32..10,
        offset in -20i32..20,
        horizontal in any::<bool>(),
        dx in -40i32..40,
        dy in -40i32..40,
    ) {
        // Half-meter steps keep every coordinate exact in f32.
        let step = |n: i32| n as f32 * 0.5;
        let mut a = PlacedMainModule::new("a", &main_module_types()[a_idx], step(x), step(y));
        a.rotation = a_rot;
        let (aw, ad) = habitat_logic::geometry::effective_footprint(&a);

        let (bx, by) = if horizontal {
            (a.x + aw + step(gap), a.y + step(offset))
        } else {
            (a.x + step(offset), a.y + ad + step(gap))
        };
        let mut b = PlacedMainModule::new("b", &main_module_types()[b_idx], bx, by);
        b.rotation = b_rot;

        let mut state = LayoutState::default();
        state.main_modules = vec![a, b];
        prop_assert_eq!(count_containing(&validate_layout(&state), "overlapping"), 0);

        for m in &mut state.main_modules {
            m.x += step(dx);
            m.y += step(dy);
        }
        prop_assert_eq!(count_containing(&validate_layout(&state), "overlapping"), 0);
    }
}
