//! Tunable thresholds for layout validation and editing.
//!
//! The defaults reproduce the habitability guidelines the builder ships
//! with. A front end (or the headless harness) can load an alternative set
//! from JSON; any field left out keeps its default.
//!
//! ```
//! use habitat_logic::config::{ValidationConfig, validate_config};
//!
//! let config = ValidationConfig::default();
//! assert!(validate_config(&config).is_empty());
//! assert_eq!(config.min_volume_per_crew(4), 10.0);
//! assert_eq!(config.min_volume_per_crew(6), 8.5);
//! ```

use crate::constants::{
    CAPACITY_WARNING_FRACTION, GRID_SIZE_M, MIN_VOLUME_PER_CREW_LARGE,
    MIN_VOLUME_PER_CREW_SMALL, SMALL_CREW_MAX,
};
use serde::{Deserialize, Serialize};

/// Validation and editor thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Sub-module volume fraction above which a module is "at capacity".
    pub capacity_warning_fraction: f64,
    /// Crews at or below this size use `volume_per_crew_small`.
    pub small_crew_max: u32,
    pub volume_per_crew_small: f64,
    pub volume_per_crew_large: f64,
    /// Crew members per toilet (rounded up).
    pub crew_per_toilet: u32,
    /// Crew members per shower (rounded up, at least one shower).
    pub crew_per_shower: u32,
    /// Crew members per exercise device (rounded up, at least one device).
    pub crew_per_exercise_device: u32,
    /// Snap pitch for main-module placement (m).
    pub grid_size: f32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            capacity_warning_fraction: CAPACITY_WARNING_FRACTION,
            small_crew_max: SMALL_CREW_MAX,
            volume_per_crew_small: MIN_VOLUME_PER_CREW_SMALL,
            volume_per_crew_large: MIN_VOLUME_PER_CREW_LARGE,
            crew_per_toilet: 3,
            crew_per_shower: 4,
            crew_per_exercise_device: 3,
            grid_size: GRID_SIZE_M,
        }
    }
}

impl ValidationConfig {
    /// Per-person volume rate. Chosen once from the whole crew size, not
    /// applied progressively.
    pub fn min_volume_per_crew(&self, crew_size: u32) -> f64 {
        if crew_size <= self.small_crew_max {
            self.volume_per_crew_small
        } else {
            self.volume_per_crew_large
        }
    }

    /// Minimum total main-module volume for a crew (m³).
    pub fn required_volume(&self, crew_size: u32) -> f64 {
        crew_size as f64 * self.min_volume_per_crew(crew_size)
    }

    pub fn min_beds(&self, crew_size: u32) -> u32 {
        crew_size
    }

    pub fn min_toilets(&self, crew_size: u32) -> u32 {
        crew_size.div_ceil(self.crew_per_toilet.max(1))
    }

    pub fn min_showers(&self, crew_size: u32) -> u32 {
        crew_size.div_ceil(self.crew_per_shower.max(1)).max(1)
    }

    pub fn min_exercise_devices(&self, crew_size: u32) -> u32 {
        crew_size
            .div_ceil(self.crew_per_exercise_device.max(1))
            .max(1)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Capacity fraction outside (0, 1].
    CapacityFractionOutOfRange(f64),
    /// Per-crew volume rate not positive.
    NonPositiveVolumeRate(f64),
    /// A crew-per-fixture divisor of zero.
    ZeroCrewDivisor(&'static str),
    /// Grid pitch not positive.
    NonPositiveGrid(f32),
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &ValidationConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !(config.capacity_warning_fraction > 0.0 && config.capacity_warning_fraction <= 1.0) {
        errors.push(ConfigError::CapacityFractionOutOfRange(
            config.capacity_warning_fraction,
        ));
    }
    for rate in [config.volume_per_crew_small, config.volume_per_crew_large] {
        if rate.is_nan() || rate <= 0.0 {
            errors.push(ConfigError::NonPositiveVolumeRate(rate));
        }
    }
    for (name, divisor) in [
        ("crewPerToilet", config.crew_per_toilet),
        ("crewPerShower", config.crew_per_shower),
        ("crewPerExerciseDevice", config.crew_per_exercise_device),
    ] {
        if divisor == 0 {
            errors.push(ConfigError::ZeroCrewDivisor(name));
        }
    }
    if config.grid_size.is_nan() || config.grid_size <= 0.0 {
        errors.push(ConfigError::NonPositiveGrid(config.grid_size));
    }

    errors
}
