//! Static module catalog of main-module and sub-module type definitions.
//!
//! The catalog is process-wide read-only reference data. It is built once on
//! first access and handed out as `&'static` slices; placed instances copy
//! the fields they need out of it and never write back.
//!
//! ```
//! use habitat_logic::catalog::{find_main_module_type, can_ports_connect, PortType};
//!
//! let habitat = find_main_module_type("habitat-container").unwrap();
//! assert_eq!(habitat.volume, 40.0);
//! assert!(can_ports_connect(PortType::Hab, PortType::Svc));
//! ```

use crate::constants::{main_module_ids as mm, sub_module_ids as sm};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// PORTS
// ============================================================================

/// Connector type of a port. Determines which ports may be joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    #[serde(rename = "hab-port")]
    Hab,
    #[serde(rename = "svc-port")]
    Svc,
    #[serde(rename = "std-port")]
    Std,
    #[serde(rename = "airlock-port")]
    Airlock,
}

impl PortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hab => "hab-port",
            Self::Svc => "svc-port",
            Self::Std => "std-port",
            Self::Airlock => "airlock-port",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which face of the module a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortSide {
    North,
    South,
    East,
    West,
    Top,
    Bottom,
}

/// A connection point on a main module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(rename = "type")]
    pub port_type: PortType,
    #[serde(rename = "position")]
    pub side: PortSide,
    /// Offset from the module's local origin (m).
    pub x: f32,
    pub y: f32,
}

/// Port compatibility: identical types always mate, `std-port` mates with
/// anything, and habitation/service ports mate with each other.
pub fn can_ports_connect(a: PortType, b: PortType) -> bool {
    if a == b {
        return true;
    }
    if a == PortType::Std || b == PortType::Std {
        return true;
    }
    matches!(
        (a, b),
        (PortType::Hab, PortType::Svc) | (PortType::Svc, PortType::Hab)
    )
}

// ============================================================================
// MODULE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainCategory {
    Habitat,
    Service,
    Hygiene,
    Galley,
    Wardroom,
    Exercise,
    Medical,
    Maintenance,
    Logistics,
    Storage,
    Research,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubCategory {
    Living,
    Hygiene,
    Dining,
    Exercise,
    Medical,
    Maintenance,
    Storage,
    Control,
}

/// Surface a sub-module may be mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorType {
    Floor,
    Wall,
    Ceiling,
}

/// A structural habitat unit placed directly on the layout grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainModuleType {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    /// Internal pressurised volume (m³).
    pub volume: f64,
    pub category: MainCategory,
    pub color: String,
    pub ports: Vec<Port>,
    pub allowed_sub_modules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

impl MainModuleType {
    pub fn port(&self, port_id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == port_id)
    }

    pub fn allows(&self, sub_type_id: &str) -> bool {
        self.allowed_sub_modules.iter().any(|id| id == sub_type_id)
    }
}

/// A fixture or piece of equipment placed inside a main module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubModuleType {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub volume: f64,
    pub category: SubCategory,
    pub color: String,
    pub allowed_anchors: Vec<AnchorType>,
    /// Whether vertical offset and height take part in collision checks.
    pub z_aware: bool,
}

// ============================================================================
// TABLES
// ============================================================================

static MAIN_MODULES: OnceLock<Vec<MainModuleType>> = OnceLock::new();
static SUB_MODULES: OnceLock<Vec<SubModuleType>> = OnceLock::new();

/// All main-module types, in library display order.
pub fn main_module_types() -> &'static [MainModuleType] {
    MAIN_MODULES.get_or_init(build_main_modules)
}

/// All sub-module types, in library display order.
pub fn sub_module_types() -> &'static [SubModuleType] {
    SUB_MODULES.get_or_init(build_sub_modules)
}

pub fn find_main_module_type(id: &str) -> Option<&'static MainModuleType> {
    main_module_types().iter().find(|m| m.id == id)
}

pub fn find_sub_module_type(id: &str) -> Option<&'static SubModuleType> {
    sub_module_types().iter().find(|s| s.id == id)
}

fn port(id: &str, port_type: PortType, side: PortSide, x: f32, y: f32) -> Port {
    Port {
        id: id.to_string(),
        port_type,
        side,
        x,
        y,
    }
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn build_main_modules() -> Vec<MainModuleType> {
    use PortSide::{East, North, South, West};
    use PortType::{Airlock, Hab, Std, Svc};

    vec![
        MainModuleType {
            id: mm::HABITAT.into(),
            name: "Habitat Container".into(),
            short_name: "Habitat".into(),
            width: 4.0,
            depth: 4.0,
            height: 2.5,
            volume: 40.0,
            category: MainCategory::Habitat,
            color: "#4A90E2".into(),
            ports: vec![
                port("hab-n", Hab, North, 2.0, 0.0),
                port("hab-s", Hab, South, 2.0, 4.0),
                port("hab-e", Std, East, 4.0, 2.0),
                port("hab-w", Std, West, 0.0, 2.0),
            ],
            allowed_sub_modules: ids(&[sm::BED, sm::DESK, sm::LAVATORY, sm::SENSOR, sm::LOCKER]),
            max_connections: Some(4),
        },
        MainModuleType {
            id: mm::SERVICE.into(),
            name: "Service Module".into(),
            short_name: "Service".into(),
            width: 2.5,
            depth: 2.0,
            height: 2.5,
            volume: 12.5,
            category: MainCategory::Service,
            color: "#50C878".into(),
            ports: vec![
                port("svc-n", Svc, North, 1.25, 0.0),
                port("svc-s", Svc, South, 1.25, 2.0),
                port("svc-e", Std, East, 2.5, 1.0),
            ],
            allowed_sub_modules: ids(&[sm::TOILET, sm::LAVATORY, sm::SENSOR]),
            max_connections: Some(3),
        },
        MainModuleType {
            id: mm::HYGIENE.into(),
            name: "Hygiene Module".into(),
            short_name: "Hygiene".into(),
            width: 2.0,
            depth: 2.0,
            height: 2.5,
            volume: 10.0,
            category: MainCategory::Hygiene,
            color: "#5FD392".into(),
            ports: vec![
                port("hyg-n", Svc, North, 1.0, 0.0),
                port("hyg-s", Std, South, 1.0, 2.0),
            ],
            allowed_sub_modules: ids(&[sm::SHOWER, sm::LAVATORY, sm::SENSOR]),
            max_connections: Some(2),
        },
        MainModuleType {
            id: mm::GALLEY.into(),
            name: "Galley Module".into(),
            short_name: "Galley".into(),
            width: 3.0,
            depth: 2.5,
            height: 2.0,
            volume: 15.0,
            category: MainCategory::Galley,
            color: "#F39C12".into(),
            ports: vec![
                port("gal-n", Std, North, 1.5, 0.0),
                port("gal-e", Std, East, 3.0, 1.25),
                port("gal-w", Std, West, 0.0, 1.25),
            ],
            allowed_sub_modules: ids(&[sm::GALLEY_EQUIPMENT, sm::LAVATORY, sm::LOCKER]),
            max_connections: Some(3),
        },
        MainModuleType {
            id: mm::WARDROOM.into(),
            name: "Wardroom / Dining Module".into(),
            short_name: "Wardroom".into(),
            width: 3.5,
            depth: 3.0,
            height: 2.0,
            volume: 21.0,
            category: MainCategory::Wardroom,
            color: "#F5A623".into(),
            ports: vec![
                port("ward-n", Std, North, 1.75, 0.0),
                port("ward-s", Std, South, 1.75, 3.0),
                port("ward-e", Std, East, 3.5, 1.5),
            ],
            allowed_sub_modules: ids(&[sm::DINING_TABLE, sm::LOCKER, sm::SENSOR]),
            max_connections: Some(3),
        },
        MainModuleType {
            id: mm::EXERCISE.into(),
            name: "Exercise Module".into(),
            short_name: "Exercise".into(),
            width: 3.0,
            depth: 3.0,
            height: 2.5,
            volume: 22.5,
            category: MainCategory::Exercise,
            color: "#E74C3C".into(),
            ports: vec![
                port("ex-n", Std, North, 1.5, 0.0),
                port("ex-s", Std, South, 1.5, 3.0),
            ],
            allowed_sub_modules: ids(&[sm::TREADMILL, sm::CYCLE, sm::ARED, sm::SENSOR]),
            max_connections: Some(2),
        },
        MainModuleType {
            id: mm::MEDICAL.into(),
            name: "Medical Module".into(),
            short_name: "Medical".into(),
            width: 3.0,
            depth: 2.5,
            height: 2.5,
            volume: 18.75,
            category: MainCategory::Medical,
            color: "#1ABC9C".into(),
            ports: vec![
                port("med-n", Std, North, 1.5, 0.0),
                port("med-e", Std, East, 3.0, 1.25),
            ],
            allowed_sub_modules: ids(&[sm::MEDICAL_BED, sm::CONTROL_PANEL, sm::LOCKER]),
            max_connections: Some(2),
        },
        MainModuleType {
            id: mm::MAINTENANCE.into(),
            name: "Maintenance / Workbench Module".into(),
            short_name: "Maintenance".into(),
            width: 2.5,
            depth: 2.5,
            height: 2.5,
            volume: 15.625,
            category: MainCategory::Maintenance,
            color: "#95A5A6".into(),
            ports: vec![
                port("maint-n", Std, North, 1.25, 0.0),
                port("maint-s", Std, South, 1.25, 2.5),
            ],
            allowed_sub_modules: ids(&[sm::WORKBENCH, sm::CONTROL_PANEL, sm::LOCKER]),
            max_connections: Some(2),
        },
        MainModuleType {
            id: mm::LOGISTICS.into(),
            name: "Logistics / Airlock Module".into(),
            short_name: "Logistics".into(),
            width: 2.5,
            depth: 2.5,
            height: 2.5,
            volume: 15.625,
            category: MainCategory::Logistics,
            color: "#7F8C8D".into(),
            ports: vec![
                port("log-n", Airlock, North, 1.25, 0.0),
                port("log-e", Std, East, 2.5, 1.25),
            ],
            allowed_sub_modules: ids(&[sm::LOGISTICS_RACK, sm::LOCKER]),
            max_connections: Some(2),
        },
        MainModuleType {
            id: mm::STORAGE.into(),
            name: "Storage Module".into(),
            short_name: "Storage".into(),
            width: 2.0,
            depth: 2.5,
            height: 2.5,
            volume: 12.5,
            category: MainCategory::Storage,
            color: "#34495E".into(),
            ports: vec![
                port("stor-n", Std, North, 1.0, 0.0),
                port("stor-s", Std, South, 1.0, 2.5),
            ],
            allowed_sub_modules: ids(&[sm::LOCKER, sm::LOGISTICS_RACK]),
            max_connections: Some(2),
        },
        MainModuleType {
            id: mm::RESEARCH.into(),
            name: "Research / Lab Module".into(),
            short_name: "Research".into(),
            width: 3.5,
            depth: 3.0,
            height: 2.5,
            volume: 26.25,
            category: MainCategory::Research,
            color: "#8E44AD".into(),
            ports: vec![
                port("res-n", Std, North, 1.75, 0.0),
                port("res-e", Std, East, 3.5, 1.5),
                port("res-w", Std, West, 0.0, 1.5),
            ],
            allowed_sub_modules: ids(&[sm::DESK, sm::WORKBENCH, sm::CONTROL_PANEL]),
            max_connections: Some(3),
        },
        MainModuleType {
            id: mm::EXTERNAL.into(),
            name: "External / Structure Module".into(),
            short_name: "Structure".into(),
            width: 2.0,
            depth: 2.0,
            height: 2.0,
            volume: 0.0, // structural only
            category: MainCategory::External,
            color: "#2C3E50".into(),
            ports: vec![
                port("ext-n", Std, North, 1.0, 0.0),
                port("ext-s", Std, South, 1.0, 2.0),
                port("ext-e", Std, East, 2.0, 1.0),
                port("ext-w", Std, West, 0.0, 1.0),
            ],
            allowed_sub_modules: Vec::new(),
            max_connections: Some(4),
        },
    ]
}

fn build_sub_modules() -> Vec<SubModuleType> {
    use AnchorType::{Ceiling, Floor, Wall};

    // (id, name, short, w, d, h, volume, category, color, anchors, z_aware)
    let rows: [(&str, &str, &str, f32, f32, f32, f64, SubCategory, &str, &[AnchorType], bool);
        16] = [
        (sm::BED, "Bed / Bunk", "Bed", 2.00, 1.45, 2.00, 10.76, SubCategory::Living, "#4A90E2", &[Floor, Wall], true),
        (sm::DESK, "Desk / Private Workstation", "Desk", 2.02, 0.98, 1.91, 4.35, SubCategory::Living, "#5C9FE8", &[Floor, Wall], true),
        (sm::TOILET, "Toilet Unit (UWMS)", "Toilet", 0.65, 0.67, 1.49, 2.36, SubCategory::Hygiene, "#50C878", &[Floor], true),
        (sm::LAVATORY, "Lavatory / Sink", "Lavatory", 0.65, 0.54, 1.70, 2.69, SubCategory::Hygiene, "#5FD392", &[Floor, Wall], true),
        (sm::SHOWER, "Shower Stall", "Shower", 1.21, 1.43, 2.51, 4.34, SubCategory::Hygiene, "#6EE3A5", &[Floor], true),
        (sm::TREADMILL, "Treadmill Device", "Treadmill", 0.65, 0.69, 1.91, 6.12, SubCategory::Exercise, "#E74C3C", &[Floor], true),
        (sm::CYCLE, "Cycle Ergometer", "Cycle", 0.65, 0.69, 1.45, 3.38, SubCategory::Exercise, "#EC5E4F", &[Floor], true),
        (sm::ARED, "Resistive Device (ARED)", "ARED", 0.65, 0.69, 1.91, 3.92, SubCategory::Exercise, "#F17062", &[Floor], true),
        (sm::MEDICAL_BED, "Medical Bed / Stretcher", "Med Bed", 2.00, 1.45, 2.00, 5.80, SubCategory::Medical, "#1ABC9C", &[Floor], true),
        (sm::GALLEY_EQUIPMENT, "Small Galley Equipment", "Galley Equip", 1.41, 1.41, 1.91, 4.35, SubCategory::Dining, "#F39C12", &[Floor, Wall], true),
        (sm::DINING_TABLE, "Dining Table / Small Table", "Table", 1.19, 1.19, 1.91, 10.09, SubCategory::Dining, "#F5A623", &[Floor], false),
        (sm::WORKBENCH, "Workbench Tool Station", "Workbench", 1.18, 2.05, 2.00, 4.82, SubCategory::Maintenance, "#95A5A6", &[Floor, Wall], true),
        (sm::LOCKER, "Storage Locker / Locker Shelf", "Locker", 0.60, 0.60, 1.80, 0.65, SubCategory::Storage, "#7F8C8D", &[Floor, Wall], true),
        (sm::LOGISTICS_RACK, "Logistics Rack / Pallet", "Logistics", 0.98, 2.02, 2.31, 6.00, SubCategory::Storage, "#34495E", &[Floor], true),
        (sm::CONTROL_PANEL, "Control Panel / Systems Rack", "Controls", 0.80, 0.50, 2.00, 0.80, SubCategory::Control, "#2C3E50", &[Wall], true),
        (sm::SENSOR, "Sensor / Environmental Unit", "Sensor", 0.40, 0.40, 0.60, 0.10, SubCategory::Control, "#16A085", &[Wall, Ceiling], false),
    ];

    rows.iter()
        .map(
            |&(id, name, short_name, width, depth, height, volume, category, color, anchors, z_aware)| {
                SubModuleType {
                    id: id.to_string(),
                    name: name.to_string(),
                    short_name: short_name.to_string(),
                    width,
                    depth,
                    height,
                    volume,
                    category,
                    color: color.to_string(),
                    allowed_anchors: anchors.to_vec(),
                    z_aware,
                }
            },
        )
        .collect()
}
