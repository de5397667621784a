//! Configuration loader for the FLO-2D extractor
//!
//! Loads and validates the YAML configuration file (extractor.yaml) covering:
//! - Model name, cell size and directories
//! - Input and output file names
//! - Grid thresholds and the model-hour window
//! - Station maps and forecast storage settings
//! - Logging
//!
//! Supports environment variable substitution using ${VAR} syntax.

use anyhow::{Context, Result};
use flo2d_common::StationMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// Extractor Configuration (extractor.yaml)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorFileConfig {
    pub model: Option<String>,
    pub cell_size: Option<f64>,
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
    /// Run file with model times, relative to the input directory.
    pub run_file: Option<String>,
    pub inputs: InputsConfig,
    pub outputs: OutputsConfig,
    pub grid: GridConfig,
    pub water_level: WaterLevelConfig,
    pub sink: SinkConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub reference_points: Option<String>,
    pub depth: Option<String>,
    pub hydrograph: Option<String>,
    pub max_surface: Option<String>,
    pub topography: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    pub grid_file: Option<String>,
    pub grid_dir: Option<String>,
    pub water_level_file: Option<String>,
    pub water_level_dir: Option<String>,
    pub max_grid_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub min_threshold: Option<f64>,
    pub nodata: Option<f64>,
    pub depth_column: Option<usize>,
    pub start_hour: Option<f64>,
    pub end_hour: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterLevelConfig {
    /// `elevation` or `depth`.
    pub channel_column: Option<String>,
    pub flood_plain_column: Option<usize>,
    pub missing_value: Option<f64>,
    pub force_insert: Option<bool>,
    pub run_name: Option<String>,
    pub utc_offset: Option<String>,
    pub stations: StationMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// JSON catalog file; defaults to `catalog.json` in the output directory.
    pub catalog: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse extractor.yaml with environment variable substitution
pub fn load_extractor_config<P: AsRef<Path>>(path: P) -> Result<ExtractorFileConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read extractor config from {:?}", path.as_ref()))?;

    parse_extractor_config(&content)
        .with_context(|| format!("Invalid extractor config {:?}", path.as_ref()))
}

/// Parse extractor YAML text
pub fn parse_extractor_config(content: &str) -> Result<ExtractorFileConfig> {
    let expanded = expand_env_vars(content)?;

    // An empty document means "all defaults".
    let config: ExtractorFileConfig = if expanded.trim().is_empty() {
        ExtractorFileConfig::default()
    } else {
        serde_yaml::from_str(&expanded).with_context(|| "Failed to parse extractor config YAML")?
    };

    validate_extractor_config(&config)?;

    Ok(config)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            let value = resolve_var_expr(&var_expr)?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
pub const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];

fn validate_extractor_config(config: &ExtractorFileConfig) -> Result<()> {
    if let Some(cell_size) = config.cell_size {
        anyhow::ensure!(
            cell_size.is_finite() && cell_size > 0.0,
            "Cell size must be greater than 0, got {}",
            cell_size
        );
    }

    if let (Some(start), Some(end)) = (config.grid.start_hour, config.grid.end_hour) {
        anyhow::ensure!(
            start <= end,
            "Grid start hour {} is after end hour {}",
            start,
            end
        );
    }

    for column in [config.grid.depth_column, config.water_level.flood_plain_column]
        .into_iter()
        .flatten()
    {
        anyhow::ensure!(column > 0, "Value columns are 1-based; column 0 is the cell id");
    }

    if let Some(column) = &config.water_level.channel_column {
        anyhow::ensure!(
            matches!(column.to_lowercase().as_str(), "elevation" | "depth"),
            "Invalid channel column: {}. Must be one of: [\"elevation\", \"depth\"]",
            column
        );
    }

    anyhow::ensure!(
        VALID_LOG_LEVELS.contains(&config.logging.level.as_str()),
        "Invalid log level: {}. Must be one of: {:?}",
        config.logging.level,
        VALID_LOG_LEVELS
    );

    anyhow::ensure!(
        VALID_LOG_FORMATS.contains(&config.logging.format.as_str()),
        "Invalid log format: {}. Must be one of: {:?}",
        config.logging.format,
        VALID_LOG_FORMATS
    );

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
