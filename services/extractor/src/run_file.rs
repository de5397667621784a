//! The model run file (`RUN_FLO2D.json`) written next to the model outputs.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Time and naming keys of a run file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunFile {
    #[serde(rename = "MODEL_STATE_DATE")]
    pub model_state_date: Option<String>,
    #[serde(rename = "MODEL_STATE_TIME")]
    pub model_state_time: Option<String>,
    #[serde(rename = "TIMESERIES_START_DATE")]
    pub timeseries_start_date: Option<String>,
    #[serde(rename = "TIMESERIES_START_TIME")]
    pub timeseries_start_time: Option<String>,
    #[serde(rename = "FLO2D_OUTPUT_SUFFIX")]
    pub output_suffix: Option<String>,
    #[serde(rename = "RUN_NAME")]
    pub run_name: Option<String>,
    #[serde(rename = "UTC_OFFSET")]
    pub utc_offset: Option<String>,
}

impl RunFile {
    /// Read a run file. A missing file yields an empty run file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No run file");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run file {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid run file {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let run_file: RunFile = serde_json::from_str(content)?;
        Ok(run_file.without_blanks())
    }

    // Empty strings mean "not set".
    fn without_blanks(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            model_state_date: keep(self.model_state_date),
            model_state_time: keep(self.model_state_time),
            timeseries_start_date: keep(self.timeseries_start_date),
            timeseries_start_time: keep(self.timeseries_start_time),
            output_suffix: keep(self.output_suffix),
            run_name: keep(self.run_name),
            utc_offset: keep(self.utc_offset),
        }
    }
}
