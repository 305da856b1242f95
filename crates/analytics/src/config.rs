//! Engine configuration

use citation_store::{RateTable, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use traffic_model::{ObjectClass, Zone};
use traffic_state::{StateThresholds, ThresholdError};

/// Configuration errors; fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid lane zone ({0:?}): must be a rectangle inside [0,1] x [0,1]")]
    InvalidZone(Zone),

    #[error("Overlap threshold {0} must lie in (0, 1)")]
    InvalidOverlapThreshold(f32),

    #[error("Window capacity must be at least 1")]
    InvalidWindowCapacity,

    #[error(transparent)]
    Thresholds(#[from] ThresholdError),

    #[error(transparent)]
    Rates(#[from] StoreError),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// All tunable knobs of the engine; see the defaults for the stock setup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lane-termination / no-entry zone
    pub lane_zone: Zone,
    /// IoU above which a vehicle pair counts as a possible collision
    pub overlap_threshold: f32,
    /// Rolling window capacity in frames
    pub window_capacity: usize,
    /// Congestion level cutoffs over the mean vehicle count
    pub state_thresholds: StateThresholds,
    /// Monetary amount per violation kind
    pub rate_table: RateTable,
    /// Whether a helmet-capable detection source is configured
    pub helmet_enabled: bool,
    /// Class treated as the emergency-vehicle proxy
    pub emergency_class: ObjectClass,
    /// Accident alert stays raised for this long after the last open
    /// accident violation
    pub accident_alert_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lane_zone: Zone::default(),
            overlap_threshold: 0.3,
            window_capacity: 20,
            state_thresholds: StateThresholds::default(),
            rate_table: RateTable::default(),
            helmet_enabled: false,
            emergency_class: ObjectClass::Bus,
            accident_alert_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Validate every knob; invalid configuration is fatal at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.lane_zone.is_valid() {
            return Err(ConfigError::InvalidZone(self.lane_zone));
        }
        if !(self.overlap_threshold > 0.0 && self.overlap_threshold < 1.0) {
            return Err(ConfigError::InvalidOverlapThreshold(self.overlap_threshold));
        }
        if self.window_capacity == 0 {
            return Err(ConfigError::InvalidWindowCapacity);
        }
        self.state_thresholds.validate()?;
        self.rate_table.validate()?;
        Ok(())
    }

    /// Load configuration: defaults, then an optional file, then
    /// `TRAFFIC_*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let loaded = builder
            .add_source(config::Environment::with_prefix("TRAFFIC").separator("__"))
            .build()?;

        let cfg: EngineConfig = loaded.try_deserialize()?;
        cfg.validate()?;
        info!(
            window_capacity = cfg.window_capacity,
            overlap_threshold = cfg.overlap_threshold,
            helmet_enabled = cfg.helmet_enabled,
            "Engine configuration loaded"
        );
        Ok(cfg)
    }
}
