//! Layout validation: the rules that decide whether a station is livable.
//!
//! Pure functions that take a [`LayoutState`] and return diagnostics. No
//! check depends on another, and dangling references (a connection to a
//! module that isn't placed, a sub-module whose parent is gone) are
//! reported as errors rather than treated as exceptional input.
//!
//! [`validate_layout`] runs every check and concatenates the results in a
//! fixed order:
//!
//! 1. connectivity
//! 2. main-module overlap
//! 3. parent capacity
//! 4. crew volume
//! 5. essential fixtures
//! 6. vertical clearance
//! 7. port connections
//! 8. sub-module placement

use crate::catalog::can_ports_connect;
use crate::config::ValidationConfig;
use crate::constants::sub_module_ids;
use crate::geometry::{intervals_overlap, main_module_rect, sub_module_rect};
use crate::graph::ConnectionGraph;
use crate::layout::{LayoutState, PlacedSubModule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The layout is not physically or logically valid.
    Error,
    /// Valid but worth a second look.
    Warning,
}

/// A single finding from the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    /// Main-module instance to highlight, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            module_id: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            module_id: None,
        }
    }

    pub fn on_module(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ── 1. Connectivity ─────────────────────────────────────────────────────

/// Instance ids of main modules not reachable from the first placed module.
pub fn find_floating_modules(state: &LayoutState) -> Vec<&str> {
    if state.main_modules.len() <= 1 {
        return Vec::new();
    }

    let graph = ConnectionGraph::from_connections(&state.connections);
    let reached = graph.reachable_from(state.main_modules[0].instance_id.as_str());

    state
        .main_modules
        .iter()
        .map(|m| m.instance_id.as_str())
        .filter(|id| !reached.contains(id))
        .collect()
}

/// One error for the whole layout if any module is floating.
pub fn check_connectivity(state: &LayoutState) -> Vec<Diagnostic> {
    let floating = find_floating_modules(state);
    match floating.first() {
        Some(&first) => vec![Diagnostic::error(format!(
            "{} module(s) are not connected to the station",
            floating.len()
        ))
        .on_module(first)],
        None => Vec::new(),
    }
}

// ── 2. Main-module overlap ──────────────────────────────────────────────

/// Unique ids of main modules involved in at least one overlapping pair,
/// in placement order.
pub fn find_overlapping_modules(state: &LayoutState) -> Vec<&str> {
    let modules = &state.main_modules;
    let rects: Vec<_> = modules.iter().map(main_module_rect).collect();
    let mut involved = vec![false; modules.len()];

    for i in 0..modules.len() {
        for j in (i + 1)..modules.len() {
            if rects[i].overlaps(&rects[j]) {
                involved[i] = true;
                involved[j] = true;
            }
        }
    }

    // Two placements may share an instance id in a hand-edited layout;
    // count each id once.
    let mut seen = HashSet::new();
    modules
        .iter()
        .zip(involved)
        .filter(|(_, hit)| *hit)
        .map(|(m, _)| m.instance_id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}

pub fn check_main_module_overlaps(state: &LayoutState) -> Vec<Diagnostic> {
    let overlapping = find_overlapping_modules(state);
    if overlapping.is_empty() {
        return Vec::new();
    }
    vec![Diagnostic::error(format!(
        "{} overlapping module(s) detected",
        overlapping.len()
    ))]
}

// ── 3. Parent capacity ──────────────────────────────────────────────────

/// Warn near capacity, error over capacity. A module over 100% gets both.
pub fn check_parent_capacity(state: &LayoutState, config: &ValidationConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for module in &state.main_modules {
        let used: f64 = state
            .children_of(&module.instance_id)
            .map(|s| s.kind.volume)
            .sum();
        let available = module.kind.volume;
        let name = &module.kind.short_name;

        if used > available * config.capacity_warning_fraction {
            let message = if available > 0.0 {
                let pct = (used / available * 100.0).round();
                format!("{} is at {}% capacity", name, pct as i64)
            } else {
                format!("{} is at capacity", name)
            };
            diagnostics.push(Diagnostic::warning(message).on_module(&module.instance_id));
        }

        if used > available {
            diagnostics.push(
                Diagnostic::error(format!("{} exceeds volume capacity", name))
                    .on_module(&module.instance_id),
            );
        }
    }

    diagnostics
}

// ── 4. Crew volume ──────────────────────────────────────────────────────

/// Total main-module volume against the crew's minimum. Sub-module
/// volumes don't count.
pub fn check_crew_volume(state: &LayoutState, config: &ValidationConfig) -> Vec<Diagnostic> {
    let total = state.total_volume();
    let required = config.required_volume(state.crew_size);

    if total < required {
        return vec![Diagnostic::error(format!(
            "Insufficient volume: {:.1}m³ / {:.1}m³ required for {} crew",
            round_to_tenth(total),
            round_to_tenth(required),
            state.crew_size
        ))];
    }
    Vec::new()
}

/// Round half away from zero to one decimal. `{:.1}` alone rounds exact
/// ties like 26.25 to even.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ── 5. Essentials ───────────────────────────────────────────────────────

/// Layout-wide fixture counts against per-crew minimums. Beds and toilets
/// are required; showers and exercise devices are recommended.
pub fn check_essentials(state: &LayoutState, config: &ValidationConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let crew = state.crew_size;

    let count = |pred: &dyn Fn(&str) -> bool| {
        state
            .sub_modules
            .iter()
            .filter(|s| pred(s.kind.id.as_str()))
            .count()
    };
    let beds = count(&|id| id == sub_module_ids::BED);
    let toilets = count(&|id| id == sub_module_ids::TOILET);
    let showers = count(&|id| id == sub_module_ids::SHOWER);
    let exercise = count(&sub_module_ids::is_exercise_device);

    let min_beds = config.min_beds(crew);
    let min_toilets = config.min_toilets(crew);
    let min_showers = config.min_showers(crew);
    let min_exercise = config.min_exercise_devices(crew);

    if beds < min_beds as usize {
        diagnostics.push(Diagnostic::error(format!(
            "Need {} beds for {} crew (have {})",
            min_beds, crew, beds
        )));
    }
    if toilets < min_toilets as usize {
        diagnostics.push(Diagnostic::error(format!(
            "Need at least {} toilet(s) for {} crew (have {})",
            min_toilets, crew, toilets
        )));
    }
    if showers < min_showers as usize {
        diagnostics.push(Diagnostic::warning(format!(
            "Recommend {} shower(s) for {} crew (have {})",
            min_showers, crew, showers
        )));
    }
    if exercise < min_exercise as usize {
        diagnostics.push(Diagnostic::warning(format!(
            "Recommend {} exercise device(s) for {} crew (have {})",
            min_exercise, crew, exercise
        )));
    }

    diagnostics
}

// ── 6. Vertical clearance ───────────────────────────────────────────────

/// Pairwise collision between two sub-modules of the same parent.
///
/// Footprints are tested first. Only when both modules are z-aware does
/// the vertical interval get a chance to separate them; if either one is
/// not z-aware, overlapping footprints always collide.
pub fn sub_modules_collide(a: &PlacedSubModule, b: &PlacedSubModule) -> bool {
    if !sub_module_rect(a).overlaps(&sub_module_rect(b)) {
        return false;
    }
    if a.kind.z_aware && b.kind.z_aware {
        return intervals_overlap(a.z, a.kind.height, b.z, b.kind.height);
    }
    true
}

/// Height and collision checks over each module's z-aware children.
pub fn check_z_clearance(state: &LayoutState) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for module in &state.main_modules {
        let children: Vec<&PlacedSubModule> = state
            .children_of(&module.instance_id)
            .filter(|s| s.kind.z_aware)
            .collect();

        for sub in &children {
            if sub.kind.height > module.kind.height {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "{} height ({}m) exceeds {} height ({}m)",
                        sub.kind.short_name,
                        sub.kind.height,
                        module.kind.short_name,
                        module.kind.height
                    ))
                    .on_module(&module.instance_id),
                );
            }
        }

        for i in 0..children.len() {
            for j in (i + 1)..children.len() {
                if sub_modules_collide(children[i], children[j]) {
                    diagnostics.push(
                        Diagnostic::error(format!(
                            "Sub-modules overlap in {}",
                            module.kind.short_name
                        ))
                        .on_module(&module.instance_id),
                    );
                }
            }
        }
    }

    diagnostics
}

// ── 7. Port connections ─────────────────────────────────────────────────

/// Every connection must name placed modules and real ports of compatible
/// types.
pub fn check_port_connections(state: &LayoutState) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for conn in &state.connections {
        let from = state.main_module(&conn.from_module_id);
        let to = state.main_module(&conn.to_module_id);
        let (Some(from), Some(to)) = (from, to) else {
            diagnostics.push(Diagnostic::error(
                "Connection references non-existent module",
            ));
            continue;
        };

        let from_port = from.port(&conn.from_port_id);
        let to_port = to.port(&conn.to_port_id);
        let (Some(from_port), Some(to_port)) = (from_port, to_port) else {
            diagnostics.push(Diagnostic::error("Connection references non-existent port"));
            continue;
        };

        if !can_ports_connect(from_port.port_type, to_port.port_type) {
            diagnostics.push(
                Diagnostic::error(format!(
                    "Incompatible port types: {} and {}",
                    from_port.port_type, to_port.port_type
                ))
                .on_module(&from.instance_id),
            );
        }
    }

    diagnostics
}

// ── 8. Sub-module placement ─────────────────────────────────────────────

/// Each sub-module needs a placed parent that allows its type.
pub fn check_sub_module_placement(state: &LayoutState) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for sub in &state.sub_modules {
        let Some(parent) = state.main_module(&sub.parent_instance_id) else {
            diagnostics.push(Diagnostic::error(format!(
                "{} has no parent module",
                sub.kind.short_name
            )));
            continue;
        };

        if !parent.kind.allows(&sub.kind.id) {
            diagnostics.push(
                Diagnostic::error(format!(
                    "{} cannot be placed in {}",
                    sub.kind.short_name, parent.kind.short_name
                ))
                .on_module(&parent.instance_id),
            );
        }
    }

    diagnostics
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all checks with the default thresholds.
pub fn validate_layout(state: &LayoutState) -> Vec<Diagnostic> {
    validate_layout_with(state, &ValidationConfig::default())
}

/// Run all checks and return combined results in check order.
pub fn validate_layout_with(state: &LayoutState, config: &ValidationConfig) -> Vec<Diagnostic> {
    let mut all = Vec::new();
    all.extend(check_connectivity(state));
    all.extend(check_main_module_overlaps(state));
    all.extend(check_parent_capacity(state, config));
    all.extend(check_crew_volume(state, config));
    all.extend(check_essentials(state, config));
    all.extend(check_z_clearance(state));
    all.extend(check_port_connections(state));
    all.extend(check_sub_module_placement(state));

    log::debug!(
        "validated layout: {} main, {} sub, {} connections → {} errors, {} warnings",
        state.main_modules.len(),
        state.sub_modules.len(),
        state.connections.len(),
        all.iter().filter(|d| d.is_error()).count(),
        all.iter().filter(|d| !d.is_error()).count()
    );
    all
}

/// Result of asking whether the layout may move on to the 3D view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchCheck {
    pub can_switch: bool,
    /// Error-severity diagnostics only.
    pub errors: Vec<Diagnostic>,
}

/// True when at least one module is placed and nothing is an error.
/// Warnings never block.
pub fn can_switch_to_3d(state: &LayoutState) -> SwitchCheck {
    can_switch_to_3d_with(state, &ValidationConfig::default())
}

pub fn can_switch_to_3d_with(state: &LayoutState, config: &ValidationConfig) -> SwitchCheck {
    let errors: Vec<Diagnostic> = validate_layout_with(state, config)
        .into_iter()
        .filter(Diagnostic::is_error)
        .collect();
    SwitchCheck {
        can_switch: errors.is_empty() && !state.main_modules.is_empty(),
        errors,
    }
}
