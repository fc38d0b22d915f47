//! Engine configuration.
//!
//! One JSON document configures both analyses and logging. Every field is
//! optional; missing fields take their defaults.
//!
//! ```
//! use u_scatter::config::EngineConfig;
//! use u_scatter::surface::InterpolationMethod;
//!
//! let config = EngineConfig::from_json_str(r#"{
//!     "correlation": { "confidence_level": 0.99 },
//!     "surface": { "resolution": 64, "method": "cubic" }
//! }"#).unwrap();
//! assert_eq!(config.correlation.confidence_level, 0.99);
//! assert_eq!(config.surface.method, InterpolationMethod::Cubic);
//! assert_eq!(config.surface.cubic_min_points, 10);
//! assert_eq!(config.logging.level, "info");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::correlation::{CorrelationAnalyzer, CorrelationOptions};
use crate::error::ScatterError;
use crate::logging::LogConfig;
use crate::pca::{PcaAnalyzer, PcaOptions};
use crate::surface::{SurfaceInterpolator, SurfaceOptions};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub correlation: CorrelationOptions,
    pub surface: SurfaceOptions,
    pub pca: PcaOptions,
    pub logging: LogConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ScatterError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ScatterError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Checks every section's ranges.
    pub fn validate(&self) -> Result<(), ScatterError> {
        self.correlation.validate()?;
        self.surface.validate()?;
        self.pca.validate()?;
        self.logging.validate()
    }

    pub fn to_json_pretty(&self) -> Result<String, ScatterError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn correlation_analyzer(&self) -> CorrelationAnalyzer {
        CorrelationAnalyzer::with_options(self.correlation)
    }

    pub fn surface_interpolator(&self) -> SurfaceInterpolator {
        SurfaceInterpolator::with_options(self.surface)
    }

    pub fn pca_analyzer(&self) -> PcaAnalyzer {
        PcaAnalyzer::with_options(self.pca)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
