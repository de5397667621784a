//! FLO-2D extractor command line tool.
//!
//! Configuration comes from an optional YAML file, the model run file
//! (`RUN_FLO2D.json`) and command line options; see [`config::resolve_config`].

pub mod config;
pub mod config_loader;
pub mod logging;
pub mod run_file;

pub use config::{resolve_config, ResolvedConfig, RunArgs, CATALOG_FILE_NAME, RUN_FILE_NAME};
pub use config_loader::{load_extractor_config, parse_extractor_config, ExtractorFileConfig};
pub use logging::{init_logging, LogFormat};
pub use run_file::RunFile;
