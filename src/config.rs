use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_THRESHOLD: f64 = 20.0;
pub const DEFAULT_OUTPUT_DIR: &str = "static";

/// Matplotlib's 10x4 inch figure at 100 dpi.
pub const DEFAULT_CHART_WIDTH: u32 = 1000;
pub const DEFAULT_CHART_HEIGHT: u32 = 400;

const MIN_CHART_WIDTH: u32 = 200;
const MIN_CHART_HEIGHT: u32 = 100;
/// Each chart is rasterised into a `width * height * 3` byte buffer.
const MAX_CHART_WIDTH: u32 = 8000;
const MAX_CHART_HEIGHT: u32 = 8000;

/// Parameters for one analysis run. Passed explicitly into `run_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing moving-average window, in samples.
    pub window: usize,
    /// Samples with a value strictly below this are reported.
    pub threshold: f64,
    /// Directory that receives the chart images and the CSV export.
    pub output_dir: PathBuf,
    /// Chart image width in pixels, 200 to 8000.
    pub chart_width: u32,
    /// Chart image height in pixels, 100 to 8000.
    pub chart_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

impl AnalysisConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "window must be at least 1 sample".to_string(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(AnalysisError::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.chart_width < MIN_CHART_WIDTH || self.chart_height < MIN_CHART_HEIGHT {
            return Err(AnalysisError::InvalidConfig(format!(
                "chart size {}x{} is below the {MIN_CHART_WIDTH}x{MIN_CHART_HEIGHT} minimum",
                self.chart_width, self.chart_height
            )));
        }
        if self.chart_width > MAX_CHART_WIDTH || self.chart_height > MAX_CHART_HEIGHT {
            return Err(AnalysisError::InvalidConfig(format!(
                "chart size {}x{} exceeds the {MAX_CHART_WIDTH}x{MAX_CHART_HEIGHT} maximum",
                self.chart_width, self.chart_height
            )));
        }
        Ok(())
    }
}
