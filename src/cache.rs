// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: On-disk cache layout for downloaded enrollment files, plus status listing and clearing
// role: persistence/cache
// inputs: Settings (cache_dir, cache_max_age); optional year to clear
// outputs: CacheEntry listings; count of removed files
// side_effects: Reads and deletes files under cache_dir
// invariants:
// - cache files are named enr_<year>.csv directly under cache_dir
// - a missing cache directory is an empty cache, not an error
// - entries are listed in ascending year order
// errors: IO failures other than NotFound surface as DataSourceUnavailable naming the cache dir
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::error::{EnrError, Result};

static RE_CACHE_FILE: Lazy<regex::Regex> = Lazy::new(|| regex::Regex::new(r"^enr_(\d{4})\.csv$").unwrap());

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CacheEntry {
  pub year: i32,
  pub path: String,
  pub bytes: u64,
  pub modified: String,
  pub fresh: bool,
}

pub fn cache_path(cache_dir: &Path, year: i32) -> PathBuf {
  cache_dir.join(format!("enr_{}.csv", year))
}

/// True when the file at `path` was modified less than `max_age` ago.
pub fn is_fresh(path: &Path, max_age: Duration) -> bool {
  std::fs::metadata(path)
    .and_then(|m| m.modified())
    .ok()
    // mtime slightly ahead of the clock counts as age zero
    .map(|mtime| SystemTime::now().duration_since(mtime).unwrap_or(Duration::ZERO))
    .map(|age| age < max_age)
    .unwrap_or(false)
}

fn cached_files(cache_dir: &Path) -> Result<Vec<(i32, PathBuf)>> {
  let entries = match std::fs::read_dir(cache_dir) {
    Ok(e) => e,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(cache_error(cache_dir, e)),
  };

  let mut out = Vec::new();

  for entry in entries.flatten() {
    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else { continue };

    if let Some(year) = RE_CACHE_FILE
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

pub fn cache_status(settings: &Settings) -> Result<Vec<CacheEntry>> {
  let mut out = Vec::new();

  for (year, path) in cached_files(&settings.cache_dir)? {
    let meta = std::fs::metadata(&path).map_err(|e| cache_error(&settings.cache_dir, e))?;
    let modified = meta
      .modified()
      .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true))
      .unwrap_or_default();

    out.push(CacheEntry {
      year,
      path: path.to_string_lossy().to_string(),
      bytes: meta.len(),
      modified,
      fresh: is_fresh(&path, settings.cache_max_age),
    });
  }

  Ok(out)
}

/// Remove cached files for `year`, or every cached year when `None`. Returns the number removed.
pub fn clear_cache(settings: &Settings, year: Option<i32>) -> Result<usize> {
  let mut removed = 0;

  for (y, path) in cached_files(&settings.cache_dir)? {
    if year.is_some_and(|want| want != y) {
      continue;
    }
    std::fs::remove_file(&path).map_err(|e| cache_error(&settings.cache_dir, e))?;
    removed += 1;
  }
  info!(removed, dir = %settings.cache_dir.display(), "cleared enrollment cache");

  Ok(removed)
}

fn cache_error(dir: &Path, e: std::io::Error) -> EnrError {
  EnrError::unavailable(format!("cache:{}", dir.display()), e.to_string())
}
