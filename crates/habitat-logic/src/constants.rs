//! Catalog ids and fixed rule constants.
//!
//! Module types are referenced by string id everywhere (placed instances,
//! allowed-sub-module lists, layout files). These constants name the ids the
//! rules engine needs to recognise so that no check matches on a bare
//! string literal.

pub mod main_module_ids {
    pub const HABITAT: &str = "habitat-container";
    pub const SERVICE: &str = "service-module";
    pub const HYGIENE: &str = "hygiene-module";
    pub const GALLEY: &str = "galley-module";
    pub const WARDROOM: &str = "wardroom-module";
    pub const EXERCISE: &str = "exercise-module";
    pub const MEDICAL: &str = "medical-module";
    pub const MAINTENANCE: &str = "maintenance-module";
    pub const LOGISTICS: &str = "logistics-module";
    pub const STORAGE: &str = "storage-module";
    pub const RESEARCH: &str = "research-module";
    pub const EXTERNAL: &str = "external-module";
}

pub mod sub_module_ids {
    // Living
    pub const BED: &str = "bed";
    pub const DESK: &str = "desk";
    // Hygiene
    pub const TOILET: &str = "toilet";
    pub const LAVATORY: &str = "lavatory";
    pub const SHOWER: &str = "shower";
    // Exercise
    pub const TREADMILL: &str = "treadmill";
    pub const CYCLE: &str = "cycle";
    pub const ARED: &str = "ared";
    // Medical
    pub const MEDICAL_BED: &str = "medical-bed";
    // Dining
    pub const GALLEY_EQUIPMENT: &str = "galley-equipment";
    pub const DINING_TABLE: &str = "dining-table";
    // Maintenance & storage
    pub const WORKBENCH: &str = "workbench";
    pub const LOCKER: &str = "locker";
    pub const LOGISTICS_RACK: &str = "logistics-rack";
    // Control
    pub const CONTROL_PANEL: &str = "control-panel";
    pub const SENSOR: &str = "sensor";

    /// Returns true if this sub-module counts toward the exercise-device
    /// requirement.
    pub fn is_exercise_device(id: &str) -> bool {
        matches!(id, TREADMILL | CYCLE | ARED)
    }
}

/// Grid pitch used by the editor when snapping main-module positions (m).
pub const GRID_SIZE_M: f32 = 0.5;

/// Crew sizes at or below this use the small-crew volume rate.
pub const SMALL_CREW_MAX: u32 = 4;

/// Minimum habitable volume per crew member for small crews (m³).
pub const MIN_VOLUME_PER_CREW_SMALL: f64 = 10.0;

/// Minimum habitable volume per crew member for larger crews (m³).
pub const MIN_VOLUME_PER_CREW_LARGE: f64 = 8.5;

/// Fraction of a module's volume above which it is reported as near capacity.
pub const CAPACITY_WARNING_FRACTION: f64 = 0.9;

#[cfg(test)]
mod tests {
    use super::sub_module_ids::*;

    #[test]
    fn exercise_devices() {
        assert!(is_exercise_device(TREADMILL));
        assert!(is_exercise_device(CYCLE));
        assert!(is_exercise_device(ARED));
        assert!(!is_exercise_device(BED));
        assert!(!is_exercise_device("exercise-module"));
    }
}
