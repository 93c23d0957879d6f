// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read-through on-disk cache wrapper around another DataSource
// role: source/cache-wrapper
// inputs: inner source; cache directory; max age
// outputs: Same as the inner source; fresh cache files served without touching it
// side_effects: Writes enr_<year>.csv under the cache directory
// invariants:
// - available_years always delegates (the year table is cheap and authoritative)
// - cache write failures are logged and never fail a load
// - stale files are refreshed from the inner source
// - invalidate removes the year's file so a bad download is not served again
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use super::{decode_text, DataSource};
use crate::cache::{cache_path, is_fresh};
use crate::error::Result;
use crate::model::AvailableYears;

pub struct CachedSource<S: DataSource> {
  inner: S,
  dir: PathBuf,
  max_age: Duration,
}

impl<S: DataSource> CachedSource<S> {
  pub fn new(inner: S, dir: PathBuf, max_age: Duration) -> Self {
    Self { inner, dir, max_age }
  }

  pub fn inner(&self) -> &S {
    &self.inner
  }

  fn write_cache(&self, year: i32, text: &str) {
    let path = cache_path(&self.dir, year);
    let res = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, text));

    if let Err(e) = res {
      warn!(path = %path.display(), error = %e, "could not write enrollment cache");
    }
  }
}

impl<S: DataSource> DataSource for CachedSource<S> {
  fn name(&self) -> String {
    format!("cache:{}+{}", self.dir.display(), self.inner.name())
  }

  fn available_years(&self) -> Result<AvailableYears> {
    self.inner.available_years()
  }

  fn load_year(&self, year: i32) -> Result<String> {
    let path = cache_path(&self.dir, year);

    if is_fresh(&path, self.max_age) {
      match std::fs::read(&path) {
        Ok(bytes) => {
          debug!(path = %path.display(), year, "enrollment cache hit");
          return Ok(decode_text(&bytes, &path.to_string_lossy()));
        }
        Err(e) => warn!(path = %path.display(), error = %e, "unreadable cache file; refetching"),
      }
    }

    let text = self.inner.load_year(year)?;
    self.write_cache(year, &text);

    Ok(text)
  }

  fn invalidate(&self, year: i32) {
    let path = cache_path(&self.dir, year);

    match std::fs::remove_file(&path) {
      Ok(()) => debug!(path = %path.display(), year, "dropped undecodable cache file"),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => warn!(path = %path.display(), error = %e, "could not remove cache file"),
    }
    self.inner.invalidate(year);
  }
}
