//! Materialization decisions, output file naming and lazy directories.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use flo2d_common::{file_safe_name, model_time_to_datetime, FILE_STAMP_FORMAT};
use tracing::debug;

use crate::error::{IngestionError, Result};

/// Outcome of the materialization decision for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialize {
    /// Write the block, stamped with this time.
    At(NaiveDateTime),
    /// The block is older than the cutoff.
    BeforeCutoff,
    /// `reference + offset_hours` is not a representable timestamp.
    OutOfRange,
}

/// Whether a block at `offset_hours` past `reference` is new enough to write.
pub fn should_materialize(reference: NaiveDateTime, offset_hours: f64, cutoff: NaiveDateTime) -> Materialize {
    match model_time_to_datetime(reference, offset_hours) {
        Some(at) if at >= cutoff => Materialize::At(at),
        Some(_) => Materialize::BeforeCutoff,
        None => Materialize::OutOfRange,
    }
}

/// Insert `-{part}` before the extension of `template`.
///
/// `water_level_grid.asc` + `2017-05-20_06-00-00` gives
/// `water_level_grid-2017-05-20_06-00-00.asc`.
pub fn insert_before_extension(template: &str, part: &str) -> String {
    match template.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, part, ext),
        _ => format!("{}-{}", template, part),
    }
}

/// File name of the grid written for a block time.
pub fn grid_file_name(template: &str, at: NaiveDateTime) -> String {
    insert_before_extension(template, &at.format(FILE_STAMP_FORMAT).to_string())
}

/// File name of a station series, stamped with the model state time.
pub fn station_file_name(template: &str, station: &str, state: NaiveDateTime) -> String {
    let part = format!(
        "{}-{}",
        file_safe_name(station),
        state.format(FILE_STAMP_FORMAT)
    );
    insert_before_extension(template, &part)
}

/// An output directory created on first use.
#[derive(Debug, Clone)]
pub struct OutputDir {
    path: PathBuf,
    ready: bool,
}

impl OutputDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ready: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory if needed and return it. Repeated calls are cheap.
    pub fn ensure(&mut self) -> Result<&Path> {
        if !self.ready {
            std::fs::create_dir_all(&self.path).map_err(|source| {
                IngestionError::DirectoryCreate {
                    path: self.path.clone(),
                    source,
                }
            })?;
            debug!(path = %self.path.display(), "Output directory ready");
            self.ready = true;
        }
        Ok(&self.path)
    }

    /// Path of a file inside the directory, creating the directory first.
    pub fn file(&mut self, name: &str) -> Result<PathBuf> {
        Ok(self.ensure()?.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 5, 20)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_should_materialize() {
        let base = at(0, 0);
        let cutoff = at(6, 0);
        assert_eq!(should_materialize(base, 5.5, cutoff), Materialize::BeforeCutoff);
        assert_eq!(should_materialize(base, 6.0, cutoff), Materialize::At(cutoff));
        assert_eq!(
            should_materialize(base, 30.0, cutoff),
            Materialize::At(at(0, 0) + chrono::Duration::hours(30))
        );
        assert_eq!(should_materialize(base, f64::INFINITY, cutoff), Materialize::OutOfRange);
        assert_eq!(should_materialize(base, 1e12, cutoff), Materialize::OutOfRange);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            grid_file_name("water_level_grid.asc", at(6, 30)),
            "water_level_grid-2017-05-20_06-30-00.asc"
        );
        assert_eq!(
            station_file_name("water_level.txt", "Parlimant Lake Side", at(6, 0)),
            "water_level-Parlimant_Lake_Side-2017-05-20_06-00-00.txt"
        );
        assert_eq!(insert_before_extension("grid", "x"), "grid-x");
        assert_eq!(insert_before_extension("a.b.asc", "x"), "a.b-x.asc");
    }

    #[test]
    fn test_output_dir_is_lazy_and_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dir = OutputDir::new(tmp.path().join("water_level_grid-2017-05-20"));
        assert!(!dir.path().exists());

        let file = dir.file("a.asc").unwrap();
        assert!(dir.path().is_dir());
        assert_eq!(file.parent(), Some(dir.path()));

        // Already-existing directories are fine, also when created elsewhere.
        let mut again = OutputDir::new(dir.path().to_path_buf());
        assert!(again.ensure().is_ok());
    }
}
