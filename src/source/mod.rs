// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Trait seam over where enrollment files come from (HTTP, local directory, on-disk cache, memory)
// role: source/namespace
// outputs: DataSource trait, concrete sources, and build_source for Settings
// invariants: Sources only return raw CSV text; decoding happens in crate::parse
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod cached;
pub mod dir;
pub mod http;
pub mod memory;

use tracing::warn;

use crate::config::{Settings, SourceSettings};
use crate::error::Result;
use crate::model::AvailableYears;

pub use cached::CachedSource;
pub use dir::DirSource;
pub use http::HttpSource;
pub use memory::MemorySource;

pub trait DataSource: Send + Sync {
  /// Short identifier used in errors and logs, e.g. `dir:/srv/enr`.
  fn name(&self) -> String;

  fn available_years(&self) -> Result<AvailableYears>;

  /// Raw CSV text for one school year.
  fn load_year(&self, year: i32) -> Result<String>;

  /// Forget any stored copy of `year` (called when its text fails to decode).
  fn invalidate(&self, _year: i32) {}
}

/// Decode file bytes as UTF-8, replacing invalid sequences with U+FFFD.
///
/// Some exports are Windows-1252; replacement is logged so garbled names can be traced.
pub fn decode_text(bytes: &[u8], origin: &str) -> String {
  match std::str::from_utf8(bytes) {
    Ok(text) => text.to_string(),
    Err(e) => {
      warn!(origin, valid_up_to = e.valid_up_to(), "non-UTF-8 bytes replaced while decoding enrollment file");
      String::from_utf8_lossy(bytes).into_owned()
    }
  }
}

/// Build the source described by `settings`; HTTP sources get the on-disk cache when enabled.
pub fn build_source(settings: &Settings) -> Result<Box<dyn DataSource>> {
  let source: Box<dyn DataSource> = match &settings.source {
    SourceSettings::Dir { path } => Box::new(DirSource::new(path.clone())),
    SourceSettings::Http { url_template } => {
      let http = HttpSource::new(url_template, settings.timeout, settings.years_override.clone())?;

      if settings.use_cache {
        Box::new(CachedSource::new(http, settings.cache_dir.clone(), settings.cache_max_age))
      } else {
        Box::new(http)
      }
    }
  };

  Ok(source)
}
