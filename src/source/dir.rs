// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Serve enrollment CSVs from a local directory of enrollment_<year>.csv files
// role: source/dir
// inputs: directory path
// outputs: Years discovered from file names; raw CSV text per year
// side_effects: Reads the filesystem
// invariants:
// - available years are exactly the years with a matching file
// - file name match is case-insensitive
// errors: DataSourceUnavailable when the directory or file cannot be read
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tracing::debug;

use super::{decode_text, DataSource};
use crate::error::{EnrError, Result};
use crate::model::AvailableYears;

static RE_ENR_FILE: Lazy<regex::Regex> =
  Lazy::new(|| regex::Regex::new(r"(?i)^enrollment_(\d{4})\.csv$").unwrap());

pub struct DirSource {
  root: PathBuf,
}

impl DirSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Map of year to file path for every recognized file in the directory.
  fn scan(&self) -> Result<Vec<(i32, PathBuf)>> {
    let entries = std::fs::read_dir(&self.root)
      .map_err(|e| EnrError::unavailable(self.name(), format!("reading {}: {}", self.root.display(), e)))?;

    let mut out = Vec::new();

    for entry in entries.flatten() {
      let file_name = entry.file_name();
      let Some(name) = file_name.to_str() else { continue };

      if let Some(year) = RE_ENR_FILE
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
      {
        out.push((year, entry.path()));
      }
    }
    out.sort();

    Ok(out)
  }
}

impl DataSource for DirSource {
  fn name(&self) -> String {
    format!("dir:{}", self.root.display())
  }

  fn available_years(&self) -> Result<AvailableYears> {
    Ok(self.scan()?.into_iter().map(|(y, _)| y).collect())
  }

  fn load_year(&self, year: i32) -> Result<String> {
    let path = self
      .scan()?
      .into_iter()
      .find(|(y, _)| *y == year)
      .map(|(_, p)| p)
      .ok_or_else(|| EnrError::unavailable(self.name(), format!("no enrollment file for {}", year)))?;
    debug!(path = %path.display(), year, "reading enrollment file");

    let bytes = std::fs::read(&path)
      .map_err(|e| EnrError::unavailable(self.name(), format!("reading {}: {}", path.display(), e)))?;

    Ok(decode_text(&bytes, &path.to_string_lossy()))
  }
}
