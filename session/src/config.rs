//! TOML configuration for a farming session.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use elemental_farm_core::{
    ElementImpact, PlantCatalog, PlantType, SoilProfile, IMBALANCE_MARGIN, SOIL_BALANCE_MARGIN,
};
use elemental_farm_system_bookkeeping as bookkeeping;
use elemental_farm_system_imbalance as imbalance;
use elemental_farm_system_weather::{self as weather, LightningConfig};
use elemental_farm_world::{default_soils, Rules, DEFAULT_COLUMNS, DEFAULT_ROWS};
use serde::{Deserialize, Serialize};

/// Largest number of cells a farm may have.
pub const MAX_CELLS: u32 = 4_096;

/// Errors raised while loading or validating a [`FarmConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read farm configuration from {}", .path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration is not valid TOML or does not match the schema.
    #[error("failed to parse farm configuration")]
    Parse(#[from] toml::de::Error),
    /// The farm grid has no cells.
    #[error("farm grid must contain at least one cell, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The farm grid has more than [`MAX_CELLS`] cells.
    #[error("farm grid {columns}x{rows} exceeds {} cells", MAX_CELLS)]
    GridTooLarge {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// An explicit soil layout does not cover the grid exactly.
    #[error("farm has {expected} cells but {found} soil profiles were listed")]
    SoilCount {
        /// Number of cells in the grid.
        expected: u32,
        /// Number of soil profiles listed.
        found: usize,
    },
    /// A plant override contains negative quantities.
    #[error("impact of {} contains negative quantities", .plant.name())]
    NegativeImpact {
        /// Plant whose override is invalid.
        plant: PlantType,
    },
    /// A threshold margin is negative.
    #[error("{name} must not be negative, got {value}")]
    NegativeMargin {
        /// Name of the offending setting.
        name: &'static str,
        /// Configured value.
        value: i32,
    },
    /// The lightning chance threshold lies outside `0.0..=1.0`.
    #[error("lightning_chance must lie within 0.0..=1.0, got {0}")]
    LightningChance(f32),
    /// A lightning intensity setting is negative or not a number.
    #[error("{name} must be a non-negative number, got {value}")]
    NegativeLightning {
        /// Name of the offending setting.
        name: &'static str,
        /// Configured value.
        value: f32,
    },
}

/// Complete configuration of one farming session.
///
/// Every section is optional and defaults to the game's tuning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FarmConfig {
    /// Grid layout and onboarding.
    pub farm: FarmSection,
    /// Imbalance and soil tint margins.
    pub thresholds: ThresholdSection,
    /// Weather controller tuning.
    pub weather: WeatherSection,
    /// Per-plant impact overrides.
    pub plants: PlantSection,
    /// Day clock and goal tuning.
    pub bookkeeping: BookkeepingSection,
}

/// `[farm]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FarmSection {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Row-major soil profile per cell; warm west and damp east edges when absent.
    pub soils: Option<Vec<SoilProfile>>,
    /// Starts the session with onboarding already finished.
    pub skip_onboarding: bool,
}

impl Default for FarmSection {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            soils: None,
            skip_onboarding: false,
        }
    }
}

/// `[thresholds]` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdSection {
    /// Lead over the average share that marks an element as dominant.
    pub imbalance_margin: i32,
    /// Lead the top soil element needs to tint a cell.
    pub soil_margin: i32,
}

impl Default for ThresholdSection {
    fn default() -> Self {
        Self {
            imbalance_margin: IMBALANCE_MARGIN,
            soil_margin: SOIL_BALANCE_MARGIN,
        }
    }
}

/// `[weather]` section.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherSection {
    /// Seed of the lightning random stream.
    pub seed: u64,
    /// Minimum time between two lightning flashes.
    pub lightning_cooldown_ms: u64,
    /// Uniform draw a flash must exceed.
    pub lightning_chance: f32,
    /// Intensity a flash starts at.
    pub lightning_intensity: f32,
    /// Intensity lost per millisecond after a flash.
    pub lightning_decay_per_ms: f32,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            seed: 0,
            lightning_cooldown_ms: 5_000,
            lightning_chance: 0.97,
            lightning_intensity: 0.8,
            lightning_decay_per_ms: 0.004,
        }
    }
}

/// `[plants.*]` tables overriding the default impact of individual crops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantSection {
    /// Override for pumpkins.
    pub pumpkin: Option<ElementImpact>,
    /// Override for potatoes.
    pub potato: Option<ElementImpact>,
    /// Override for carrots.
    pub carrot: Option<ElementImpact>,
    /// Override for tomatoes.
    pub tomato: Option<ElementImpact>,
}

impl PlantSection {
    fn overrides(&self) -> impl Iterator<Item = (PlantType, ElementImpact)> + '_ {
        [
            (PlantType::Pumpkin, self.pumpkin),
            (PlantType::Potato, self.potato),
            (PlantType::Carrot, self.carrot),
            (PlantType::Tomato, self.tomato),
        ]
        .into_iter()
        .filter_map(|(plant, impact)| Some((plant, impact?)))
    }
}

/// `[bookkeeping]` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookkeepingSection {
    /// Length of one in-game day.
    pub day_length_ms: u64,
    /// Seed of the daily goal draw.
    pub goal_seed: u64,
}

impl Default for BookkeepingSection {
    fn default() -> Self {
        Self {
            day_length_ms: 60_000,
            goal_seed: 0,
        }
    }
}

impl FarmConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let FarmSection { columns, rows, .. } = self.farm;
        if columns == 0 || rows == 0 {
            return Err(ConfigError::EmptyGrid { columns, rows });
        }
        let cells = columns
            .checked_mul(rows)
            .filter(|cells| *cells <= MAX_CELLS)
            .ok_or(ConfigError::GridTooLarge { columns, rows })?;
        if let Some(soils) = &self.farm.soils {
            if usize::try_from(cells).map_or(true, |expected| expected != soils.len()) {
                return Err(ConfigError::SoilCount {
                    expected: cells,
                    found: soils.len(),
                });
            }
        }

        for (name, value) in [
            ("imbalance_margin", self.thresholds.imbalance_margin),
            ("soil_margin", self.thresholds.soil_margin),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeMargin { name, value });
            }
        }

        for (plant, impact) in self.plants.overrides() {
            if !impact.consumes.is_non_negative() || !impact.returns.is_non_negative() {
                return Err(ConfigError::NegativeImpact { plant });
            }
        }

        let chance = self.weather.lightning_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigError::LightningChance(chance));
        }
        for (name, value) in [
            ("lightning_intensity", self.weather.lightning_intensity),
            ("lightning_decay_per_ms", self.weather.lightning_decay_per_ms),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::NegativeLightning { name, value });
            }
        }
        Ok(())
    }

    /// Row-major soil profile of every cell.
    #[must_use]
    pub fn soils(&self) -> Vec<SoilProfile> {
        self.farm
            .soils
            .clone()
            .unwrap_or_else(|| default_soils(self.farm.columns, self.farm.rows))
    }

    /// Plant catalog with the configured overrides applied.
    #[must_use]
    pub fn catalog(&self) -> PlantCatalog {
        self.plants
            .overrides()
            .fold(PlantCatalog::default(), |catalog, (plant, impact)| {
                catalog.with_impact(plant, impact)
            })
    }

    /// World rules derived from the configuration.
    #[must_use]
    pub fn rules(&self) -> Rules {
        Rules {
            catalog: self.catalog(),
            soil_margin: self.thresholds.soil_margin,
        }
    }

    /// Imbalance detector configuration; the detector sleeps through onboarding.
    #[must_use]
    pub fn detector_config(&self) -> imbalance::Config {
        imbalance::Config::new(self.thresholds.imbalance_margin, true)
    }

    /// Weather controller configuration.
    #[must_use]
    pub fn weather_config(&self) -> weather::Config {
        let section = &self.weather;
        weather::Config::new(section.seed).with_lightning(LightningConfig::new(
            Duration::from_millis(section.lightning_cooldown_ms),
            section.lightning_chance,
            section.lightning_intensity,
            section.lightning_decay_per_ms,
        ))
    }

    /// Bookkeeping configuration.
    #[must_use]
    pub fn bookkeeping_config(&self) -> bookkeeping::Config {
        bookkeeping::Config::new(Duration::from_millis(self.bookkeeping.day_length_ms))
            .with_goal_seed(self.bookkeeping.goal_seed)
    }
}
