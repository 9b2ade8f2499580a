//! Layout state: placed modules, connections, crew size and selection.
//!
//! Placed instances embed a copy of their catalog type (flattened on the
//! wire, so a placed module serializes with the same field names as its
//! catalog entry plus the placement fields). Nothing here refers back into
//! the catalog after placement.

use crate::catalog::{MainModuleType, Port, SubModuleType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Crew size a fresh layout starts with.
pub const DEFAULT_CREW_SIZE: u32 = 4;

// ============================================================================
// ROTATION
// ============================================================================

/// Main-module rotation in 90° steps. Serialized as integer degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// The next rotation clockwise, wrapping 270 → 0.
    pub fn next(&self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// True when width and depth trade places.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be 0, 90, 180 or 270 degrees, got {degrees}"))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        rotation.degrees()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

// ============================================================================
// PLACED INSTANCES
// ============================================================================

/// A main module placed on the global plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedMainModule {
    pub instance_id: String,
    #[serde(flatten)]
    pub kind: MainModuleType,
    /// Top-left corner on the global plane (m).
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl PlacedMainModule {
    pub fn new(instance_id: impl Into<String>, kind: &MainModuleType, x: f32, y: f32) -> Self {
        Self {
            instance_id: instance_id.into(),
            kind: kind.clone(),
            x,
            y,
            rotation: Rotation::Deg0,
        }
    }

    pub fn port(&self, port_id: &str) -> Option<&Port> {
        self.kind.port(port_id)
    }
}

/// A sub-module placed inside a main module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSubModule {
    pub instance_id: String,
    pub parent_instance_id: String,
    #[serde(flatten)]
    pub kind: SubModuleType,
    /// Offset from the parent's local origin, unrotated parent frame (m).
    pub x: f32,
    pub y: f32,
    /// Height of the base above the parent's floor (m).
    #[serde(default)]
    pub z: f32,
}

impl PlacedSubModule {
    pub fn new(
        instance_id: impl Into<String>,
        parent_instance_id: impl Into<String>,
        kind: &SubModuleType,
        x: f32,
        y: f32,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            parent_instance_id: parent_instance_id.into(),
            kind: kind.clone(),
            x,
            y,
            z: 0.0,
        }
    }
}

/// A docking link between two main-module ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub from_module_id: String,
    pub from_port_id: String,
    pub to_module_id: String,
    pub to_port_id: String,
}

impl Connection {
    pub fn touches(&self, module_id: &str) -> bool {
        self.from_module_id == module_id || self.to_module_id == module_id
    }

    /// True if this connection occupies the given port.
    pub fn uses_port(&self, module_id: &str, port_id: &str) -> bool {
        (self.from_module_id == module_id && self.from_port_id == port_id)
            || (self.to_module_id == module_id && self.to_port_id == port_id)
    }
}

// ============================================================================
// LAYOUT STATE
// ============================================================================

/// Everything the user edits. The validation engine only ever reads this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub crew_size: u32,
    #[serde(default)]
    pub main_modules: Vec<PlacedMainModule>,
    #[serde(default)]
    pub sub_modules: Vec<PlacedSubModule>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub selected_main_module_id: Option<String>,
    #[serde(default)]
    pub selected_sub_module_id: Option<String>,
    /// Source of instance-id suffixes for the editor.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub(crate) next_instance: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new(DEFAULT_CREW_SIZE)
    }
}

impl LayoutState {
    /// An empty layout for the given crew.
    pub fn new(crew_size: u32) -> Self {
        Self {
            crew_size,
            main_modules: Vec::new(),
            sub_modules: Vec::new(),
            connections: Vec::new(),
            selected_main_module_id: None,
            selected_sub_module_id: None,
            next_instance: 0,
        }
    }

    pub fn main_module(&self, instance_id: &str) -> Option<&PlacedMainModule> {
        self.main_modules
            .iter()
            .find(|m| m.instance_id == instance_id)
    }

    pub fn sub_module(&self, instance_id: &str) -> Option<&PlacedSubModule> {
        self.sub_modules
            .iter()
            .find(|s| s.instance_id == instance_id)
    }

    /// Direct sub-module children of a main module.
    pub fn children_of<'a>(
        &'a self,
        parent_id: &'a str,
    ) -> impl Iterator<Item = &'a PlacedSubModule> + 'a {
        self.sub_modules
            .iter()
            .filter(move |s| s.parent_instance_id == parent_id)
    }

    /// Connections with either end on the given main module.
    pub fn connections_of<'a>(
        &'a self,
        module_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(module_id))
    }

    /// Total internal volume of all placed main modules (m³).
    pub fn total_volume(&self) -> f64 {
        self.main_modules.iter().map(|m| m.kind.volume).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.main_modules.is_empty() && self.sub_modules.is_empty() && self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{find_main_module_type, find_sub_module_type};

    #[test]
    fn rotation_cycle() {
        let mut r = Rotation::Deg0;
        let mut seen = vec![r.degrees()];
        for _ in 0..4 {
            r = r.next();
            seen.push(r.degrees());
        }
        assert_eq!(seen, vec![0, 90, 180, 270, 0]);
    }

    #[test]
    fn rotation_axis_swap() {
        assert!(!Rotation::Deg0.swaps_axes());
        assert!(Rotation::Deg90.swaps_axes());
        assert!(!Rotation::Deg180.swaps_axes());
        assert!(Rotation::Deg270.swaps_axes());
    }

    #[test]
    fn rotation_rejects_odd_angles() {
        assert!(serde_json::from_str::<Rotation>("45").is_err());
        assert_eq!(serde_json::from_str::<Rotation>("270").unwrap(), Rotation::Deg270);
        assert_eq!(serde_json::to_string(&Rotation::Deg90).unwrap(), "90");
    }

    #[test]
    fn default_state_is_empty() {
        let state = LayoutState::default();
        assert_eq!(state.crew_size, 4);
        assert!(state.is_empty());
        assert_eq!(state.total_volume(), 0.0);
    }

    #[test]
    fn placed_module_flattens_catalog_fields() {
        let habitat = find_main_module_type("habitat-container").unwrap();
        let placed = PlacedMainModule::new("hab-1", habitat, 1.0, 2.0);
        let value = serde_json::to_value(&placed).unwrap();
        assert_eq!(value["instanceId"], "hab-1");
        assert_eq!(value["id"], "habitat-container");
        assert_eq!(value["volume"], 40.0);
        assert_eq!(value["rotation"], 0);

        let back: PlacedMainModule = serde_json::from_value(value).unwrap();
        assert_eq!(back, placed);
    }

    #[test]
    fn children_and_connections_lookup() {
        let habitat = find_main_module_type("habitat-container").unwrap();
        let bed = find_sub_module_type("bed").unwrap();
        let mut state = LayoutState::new(2);
        state
            .main_modules
            .push(PlacedMainModule::new("a", habitat, 0.0, 0.0));
        state
            .main_modules
            .push(PlacedMainModule::new("b", habitat, 4.0, 0.0));
        state
            .sub_modules
            .push(PlacedSubModule::new("bed-1", "a", bed, 0.0, 0.0));
        state.connections.push(Connection {
            id: "c1".into(),
            from_module_id: "a".into(),
            from_port_id: "hab-e".into(),
            to_module_id: "b".into(),
            to_port_id: "hab-w".into(),
        });

        assert_eq!(state.children_of("a").count(), 1);
        assert_eq!(state.children_of("b").count(), 0);
        assert_eq!(state.connections_of("b").count(), 1);
        assert!(state.connections[0].uses_port("b", "hab-w"));
        assert!(!state.connections[0].uses_port("b", "hab-e"));
        assert_eq!(state.total_volume(), 80.0);
    }

    #[test]
    fn layout_json_without_counter() {
        let json = r#"{
            "crewSize": 3,
            "mainModules": [],
            "subModules": [],
            "connections": [],
            "selectedMainModuleId": null,
            "selectedSubModuleId": null
        }"#;
        let state: LayoutState = serde_json::from_str(json).unwrap();
        assert_eq!(state.crew_size, 3);
        assert_eq!(state, LayoutState::new(3));
    }
}
