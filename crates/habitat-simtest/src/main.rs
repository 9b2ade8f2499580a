//! Habitat Builder Headless Harness
//!
//! Validates catalog data, editor behavior and the layout rules without a
//! front end. Runs entirely in-process: no rendering, no storage.
//!
//! Usage:
//!   cargo run -p habitat-simtest
//!   cargo run -p habitat-simtest -- --verbose
//!   cargo run -p habitat-simtest -- --config rules.json
//!   cargo run -p habitat-simtest -- path/to/layout.json

use habitat_logic::catalog::{
    can_ports_connect, find_sub_module_type, main_module_types, sub_module_types, PortType,
};
use habitat_logic::config::{validate_config, ValidationConfig};
use habitat_logic::layout::LayoutState;
use habitat_logic::validation::{can_switch_to_3d_with, validate_layout_with, Severity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

// ── Sample station (editor-built blueprint) ─────────────────────────────
const SAMPLE_STATION_JSON: &str = include_str!("../../../data/sample_station.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationBlueprint {
    name: String,
    crew_size: u32,
    modules: Vec<ModuleSpec>,
    sub_modules: Vec<SubModuleSpec>,
    connections: Vec<ConnectionSpec>,
    #[serde(default)]
    expected_warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModuleSpec {
    key: String,
    #[serde(rename = "type")]
    type_id: String,
    x: f32,
    y: f32,
    /// Quarter turns clockwise, in degrees.
    #[serde(default)]
    rotation: u16,
}

#[derive(Debug, Deserialize)]
struct SubModuleSpec {
    #[serde(rename = "type")]
    type_id: String,
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionSpec {
    from: String,
    from_port: String,
    to: String,
    to_port: String,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    config_path: Option<String>,
    layout_path: Option<String>,
}

fn parse_args() -> Options {
    let mut options = Options {
        verbose: false,
        config_path: None,
        layout_path: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--config" => options.config_path = args.next(),
            _ => options.layout_path = Some(arg),
        }
    }
    options
}

fn main() {
    let options = parse_args();
    println!("=== Habitat Builder Harness ===\n");

    let config = match &options.config_path {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => ValidationConfig::default(),
    };

    if let Some(path) = &options.layout_path {
        if let Err(e) = report_layout_file(path, &config) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    let verbose = options.verbose;
    let mut results = Vec::new();

    // 1. Catalog consistency
    results.extend(validate_catalog(verbose));

    // 2. Bundled sample station
    results.extend(validate_sample_station(&config, verbose));

    // 3. Editor cascade and selection behavior
    results.extend(validate_editor(verbose));

    // 4. Seeded random layouts
    results.extend(validate_random_sweep(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_config(path: &str) -> Result<ValidationConfig, String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read config {}: {}", path, e))?;
    let config: ValidationConfig = serde_json::from_str(&text)
        .map_err(|e| format!("cannot parse config {}: {}", path, e))?;
    let errors = validate_config(&config);
    if !errors.is_empty() {
        return Err(format!("invalid config {}: {:?}", path, errors));
    }
    println!("Loaded validation config from {}", path);
    Ok(config)
}

/// Validate a saved layout and print every diagnostic.
fn report_layout_file(path: &str, config: &ValidationConfig) -> Result<(), String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read layout {}: {}", path, e))?;
    let state: LayoutState = serde_json::from_str(&text)
        .map_err(|e| format!("cannot parse layout {}: {}", path, e))?;

    println!(
        "--- {} ({} main, {} sub, {} connections, crew {}) ---",
        path,
        state.main_modules.len(),
        state.sub_modules.len(),
        state.connections.len(),
        state.crew_size
    );

    let diagnostics = validate_layout_with(&state, config);
    if diagnostics.is_empty() {
        println!("  no findings");
    }
    for d in &diagnostics {
        let tag = match d.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        match &d.module_id {
            Some(id) => println!("  {} [{}] {}", tag, id, d.message),
            None => println!("  {} {}", tag, d.message),
        }
    }

    let check = can_switch_to_3d_with(&state, config);
    println!(
        "\n3D view: {}",
        if check.can_switch {
            "available".to_string()
        } else {
            format!("blocked ({} errors)", check.errors.len())
        }
    );
    Ok(())
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Module Catalog ---");
    let mut results = Vec::new();
    let mains = main_module_types();
    let subs = sub_module_types();

    let main_ids: HashSet<_> = mains.iter().map(|m| m.id.as_str()).collect();
    let sub_ids: HashSet<_> = subs.iter().map(|s| s.id.as_str()).collect();
    results.push(TestResult {
        name: "catalog_unique_ids".into(),
        passed: main_ids.len() == mains.len() && sub_ids.len() == subs.len(),
        detail: format!("{} main types, {} sub types", mains.len(), subs.len()),
    });

    let unresolved: Vec<String> = mains
        .iter()
        .flat_map(|m| {
            m.allowed_sub_modules
                .iter()
                .filter(|id| find_sub_module_type(id).is_none())
                .map(move |id| format!("{} → {}", m.id, id))
        })
        .collect();
    results.push(TestResult {
        name: "catalog_allowed_resolve".into(),
        passed: unresolved.is_empty(),
        detail: if unresolved.is_empty() {
            "every allowed sub-module id resolves".into()
        } else {
            format!("unresolved: {}", unresolved.join(", "))
        },
    });

    let dup_ports: Vec<&str> = mains
        .iter()
        .filter(|m| {
            let ids: HashSet<_> = m.ports.iter().map(|p| p.id.as_str()).collect();
            ids.len() != m.ports.len()
        })
        .map(|m| m.id.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_unique_ports".into(),
        passed: dup_ports.is_empty(),
        detail: if dup_ports.is_empty() {
            "port ids unique per module".into()
        } else {
            format!("duplicate ports on {}", dup_ports.join(", "))
        },
    });

    let bad_dims = mains
        .iter()
        .filter(|m| m.width <= 0.0 || m.depth <= 0.0 || m.height <= 0.0 || m.volume < 0.0)
        .count()
        + subs
            .iter()
            .filter(|s| s.width <= 0.0 || s.depth <= 0.0 || s.height <= 0.0 || s.volume < 0.0)
            .count();
    results.push(TestResult {
        name: "catalog_dimensions".into(),
        passed: bad_dims == 0,
        detail: format!("{} types with bad dimensions", bad_dims),
    });

    // Ports that fit at least one other port somewhere in the catalog
    let port_types: HashSet<PortType> = mains
        .iter()
        .flat_map(|m| m.ports.iter().map(|p| p.port_type))
        .collect();
    let dead_ends: Vec<PortType> = port_types
        .iter()
        .copied()
        .filter(|&a| !port_types.iter().any(|&b| can_ports_connect(a, b)))
        .collect();
    results.push(TestResult {
        name: "catalog_ports_dockable".into(),
        passed: dead_ends.is_empty(),
        detail: format!("{} port types in use", port_types.len()),
    });

    if verbose {
        println!("  Main modules:");
        for m in mains {
            println!(
                "    {:22} {:5.2}×{:5.2}×{:4.2}m {:7.3}m³ ports={} subs={}",
                m.id,
                m.width,
                m.depth,
                m.height,
                m.volume,
                m.ports.len(),
                m.allowed_sub_modules.len()
            );
        }
    }

    results
}

// ── 2. Sample station ───────────────────────────────────────────────────

/// Build a blueprint through the editor, mapping blueprint keys to the
/// instance ids the editor assigns.
fn build_station(blueprint: &StationBlueprint) -> Result<LayoutState, String> {
    let mut state = LayoutState::new(blueprint.crew_size);
    let mut ids: HashMap<&str, String> = HashMap::new();

    for m in &blueprint.modules {
        let id = state
            .place_main_module(&m.type_id, m.x, m.y)
            .map_err(|e| format!("{}: {}", m.key, e))?;
        for _ in 0..(m.rotation / 90) % 4 {
            state
                .rotate_main_module(&id)
                .map_err(|e| format!("{}: {}", m.key, e))?;
        }
        ids.insert(m.key.as_str(), id);
    }

    for s in &blueprint.sub_modules {
        let id = state
            .place_sub_module(&s.type_id, s.x, s.y)
            .map_err(|e| format!("{} at ({}, {}): {}", s.type_id, s.x, s.y, e))?;
        if s.z > 0.0 {
            state.set_sub_module_z(&id, s.z).map_err(|e| e.to_string())?;
        }
    }

    for c in &blueprint.connections {
        let from = ids
            .get(c.from.as_str())
            .ok_or_else(|| format!("unknown module key {}", c.from))?;
        let to = ids
            .get(c.to.as_str())
            .ok_or_else(|| format!("unknown module key {}", c.to))?;
        state
            .connect(from, &c.from_port, to, &c.to_port)
            .map_err(|e| format!("{} → {}: {}", c.from, c.to, e))?;
    }

    Ok(state)
}

fn validate_sample_station(config: &ValidationConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Sample Station ---");
    let mut results = Vec::new();

    let blueprint: StationBlueprint = match serde_json::from_str(SAMPLE_STATION_JSON) {
        Ok(b) => b,
        Err(e) => {
            results.push(TestResult {
                name: "sample_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    let state = match build_station(&blueprint) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "sample_build".into(),
                passed: false,
                detail: e,
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "sample_build".into(),
        passed: true,
        detail: format!(
            "{}: {} main, {} sub, {} connections",
            blueprint.name,
            state.main_modules.len(),
            state.sub_modules.len(),
            state.connections.len()
        ),
    });

    let diagnostics = validate_layout_with(&state, config);
    let errors: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.message.as_str())
        .collect();
    results.push(TestResult {
        name: "sample_no_errors".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            "no error diagnostics".into()
        } else {
            errors.join("; ")
        },
    });

    let warnings: Vec<&str> = diagnostics
        .iter()
        .filter(|d| !d.is_error())
        .map(|d| d.message.as_str())
        .collect();
    results.push(TestResult {
        name: "sample_expected_warnings".into(),
        passed: warnings == blueprint.expected_warnings,
        detail: format!("{:?}", warnings),
    });

    let check = can_switch_to_3d_with(&state, config);
    results.push(TestResult {
        name: "sample_switch_3d".into(),
        passed: check.can_switch,
        detail: format!("can_switch={}", check.can_switch),
    });

    // Saved form must reload to the same findings
    let reloaded = serde_json::to_string(&state)
        .ok()
        .and_then(|json| serde_json::from_str::<LayoutState>(&json).ok());
    results.push(TestResult {
        name: "sample_json_reload".into(),
        passed: reloaded
            .as_ref()
            .is_some_and(|s| validate_layout_with(s, config) == diagnostics),
        detail: "layout survives a JSON round trip".into(),
    });

    if verbose {
        println!(
            "  Total volume: {:.1}m³ for {} crew",
            state.total_volume(),
            state.crew_size
        );
        for m in &state.main_modules {
            let used: f64 = state
                .children_of(&m.instance_id)
                .map(|s| s.kind.volume)
                .sum();
            println!(
                "    {:24} {:>6.2}m³ / {:>6.2}m³ links={}",
                m.instance_id,
                used,
                m.kind.volume,
                state.connections_of(&m.instance_id).count()
            );
        }
    }

    results
}

// ── 3. Editor ───────────────────────────────────────────────────────────

fn validate_editor(verbose: bool) -> Vec<TestResult> {
    println!("--- Editor ---");
    let mut results = Vec::new();

    let mut state = LayoutState::default();
    let ok = (|| -> Result<(String, String, String), habitat_logic::editor::EditError> {
        let hab = state.place_main_module("habitat-container", 0.0, 0.0)?;
        let svc = state.place_main_module("service-module", 0.0, 4.0)?;
        state.connect(&hab, "hab-s", &svc, "svc-n")?;
        let bed = state.place_sub_module("bed", 0.5, 0.5)?;
        state.place_sub_module("toilet", 0.5, 4.5)?;
        state.select_sub_module(&bed)?;
        Ok((hab, svc, bed))
    })();

    let (hab, svc, bed) = match ok {
        Ok(ids) => ids,
        Err(e) => {
            results.push(TestResult {
                name: "editor_setup".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let deleted = state.delete_main_module(&hab).is_ok();
    results.push(TestResult {
        name: "editor_cascade_delete".into(),
        passed: deleted
            && state.sub_module(&bed).is_none()
            && state.connections.is_empty()
            && state.sub_modules.len() == 1
            && state.selected_sub_module_id.is_none(),
        detail: format!(
            "{} sub-modules, {} connections left",
            state.sub_modules.len(),
            state.connections.len()
        ),
    });

    let rejected_drop = state.place_sub_module("bed", 50.0, 50.0).is_err();
    let rejected_type = state.place_sub_module("bed", 0.5, 4.5).is_err();
    results.push(TestResult {
        name: "editor_rejects_bad_drops".into(),
        passed: rejected_drop && rejected_type && state.sub_modules.len() == 1,
        detail: "outside drop and disallowed type both refused".into(),
    });

    let mut degrees = Vec::new();
    for _ in 0..4 {
        if state.rotate_main_module(&svc).is_err() {
            break;
        }
        if let Some(m) = state.main_module(&svc) {
            degrees.push(m.rotation.degrees());
        }
    }
    results.push(TestResult {
        name: "editor_rotation_cycle".into(),
        passed: degrees == [90, 180, 270, 0],
        detail: format!("{:?}", degrees),
    });

    if verbose {
        println!("  After deleting {}:", hab);
        for m in &state.main_modules {
            println!("    main {:24} at ({}, {}) {}", m.instance_id, m.x, m.y, m.rotation);
        }
        for s in &state.sub_modules {
            println!(
                "    sub  {:24} in {} at ({}, {})",
                s.instance_id, s.parent_instance_id, s.x, s.y
            );
        }
    }

    results
}

// ── 4. Random sweep ─────────────────────────────────────────────────────

const SWEEP_SEEDS: u64 = 64;

/// Editor-driven random layout. Refused edits are part of the sweep.
fn random_layout(seed: u64) -> LayoutState {
    let mut rng = StdRng::seed_from_u64(seed);
    let mains = main_module_types();
    let subs = sub_module_types();

    let mut state = LayoutState::new(rng.gen_range(1..=8));
    let mut placed = Vec::new();

    for _ in 0..rng.gen_range(1..=6) {
        let kind = &mains[rng.gen_range(0..mains.len())];
        let x = rng.gen_range(-20..20) as f32 * 0.5;
        let y = rng.gen_range(-20..20) as f32 * 0.5;
        if let Ok(id) = state.place_main_module(&kind.id, x, y) {
            for _ in 0..rng.gen_range(0..4) {
                let _ = state.rotate_main_module(&id);
            }
            placed.push(id);
        }
    }

    for _ in 0..rng.gen_range(0..12) {
        let kind = &subs[rng.gen_range(0..subs.len())];
        let x = rng.gen_range(-10.0..10.0);
        let y = rng.gen_range(-10.0..10.0);
        if let Ok(id) = state.place_sub_module(&kind.id, x, y) {
            if rng.gen_bool(0.2) {
                let _ = state.set_sub_module_z(&id, rng.gen_range(0.0..1.5));
            }
        }
    }

    if placed.is_empty() {
        return state;
    }
    for _ in 0..rng.gen_range(0..8) {
        let a = &placed[rng.gen_range(0..placed.len())];
        let b = &placed[rng.gen_range(0..placed.len())];
        let (Some(ma), Some(mb)) = (state.main_module(a), state.main_module(b)) else {
            continue;
        };
        let pa = ma.kind.ports[rng.gen_range(0..ma.kind.ports.len())].id.clone();
        let pb = mb.kind.ports[rng.gen_range(0..mb.kind.ports.len())].id.clone();
        let _ = state.connect(a, &pa, b, &pb);
    }

    state
}

fn validate_random_sweep(config: &ValidationConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Random Sweep ({} seeds) ---", SWEEP_SEEDS);
    let mut results = Vec::new();

    let mut nondeterministic = Vec::new();
    let mut gate_mismatch = Vec::new();
    let mut dangling = Vec::new();
    let mut cascade_leaks = Vec::new();
    let mut switchable = 0;

    for seed in 0..SWEEP_SEEDS {
        let state = random_layout(seed);
        if state != random_layout(seed) {
            nondeterministic.push(seed);
            continue;
        }

        let first = validate_layout_with(&state, config);
        if first != validate_layout_with(&state, config) {
            nondeterministic.push(seed);
        }

        let check = can_switch_to_3d_with(&state, config);
        let expected = !first.iter().any(|d| d.is_error()) && !state.main_modules.is_empty();
        if check.can_switch != expected {
            gate_mismatch.push(seed);
        }
        if check.can_switch {
            switchable += 1;
        }

        // The editor never produces dangling references
        if first
            .iter()
            .any(|d| d.message.contains("non-existent") || d.message.contains("no parent"))
        {
            dangling.push(seed);
        }

        let mut pruned = state.clone();
        if let Some(victim) = pruned.main_modules.first().map(|m| m.instance_id.clone()) {
            let deleted = pruned.delete_main_module(&victim).is_ok();
            let leaked = !deleted
                || pruned
                    .sub_modules
                    .iter()
                    .any(|s| s.parent_instance_id == victim)
                || pruned.connections.iter().any(|c| c.touches(&victim));
            if leaked {
                cascade_leaks.push(seed);
            }
        }

        if verbose {
            let errors = first.iter().filter(|d| d.is_error()).count();
            println!(
                "  seed {:3}: crew={} main={} sub={} conn={} errors={} warnings={}",
                seed,
                state.crew_size,
                state.main_modules.len(),
                state.sub_modules.len(),
                state.connections.len(),
                errors,
                first.len() - errors
            );
        }
    }

    results.push(TestResult {
        name: "sweep_deterministic".into(),
        passed: nondeterministic.is_empty(),
        detail: format!("differing seeds: {:?}", nondeterministic),
    });
    results.push(TestResult {
        name: "sweep_switch_gate".into(),
        passed: gate_mismatch.is_empty(),
        detail: format!("{} of {} layouts can switch to 3D", switchable, SWEEP_SEEDS),
    });
    results.push(TestResult {
        name: "sweep_no_dangling_refs".into(),
        passed: dangling.is_empty(),
        detail: format!("seeds with dangling refs: {:?}", dangling),
    });
    results.push(TestResult {
        name: "sweep_cascade_delete".into(),
        passed: cascade_leaks.is_empty(),
        detail: format!("seeds leaking after delete: {:?}", cascade_leaks),
    });

    results
}
