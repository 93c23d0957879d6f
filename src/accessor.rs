// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Enrollment accessor: year validation, default year, memoized decoding, parallel multi-year fetch, crate-level entry points
// role: accessor/orchestrator
// inputs: Settings (crate-level functions) or an injected DataSource
// outputs: AvailableYears; Vec<EnrollmentRecord>; Vec<TidyRecord>
// side_effects: Source reads (network or filesystem); in-memory memo per accessor
// invariants:
// - a year outside available_years() fails with InvalidYear before any load
// - an empty available set is DataSourceUnavailable, never an empty success
// - memo hands out clones; Enrollment is Send + Sync
// - fetch_multi output is ordered by ascending year regardless of completion order
// errors: EnrError propagated unchanged from sources and parsing
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{EnrError, Result};
use crate::model::{AvailableYears, EnrollmentRecord, TidyRecord};
use crate::parse::parse_enrollment_csv;
use crate::source::{build_source, DataSource};
use crate::tidy::tidy_enr;
use crate::years;

pub struct Enrollment {
  source: Box<dyn DataSource>,
  memo: Mutex<HashMap<i32, Arc<Vec<EnrollmentRecord>>>>,
}

impl Enrollment {
  pub fn from_settings(settings: &Settings) -> Result<Self> {
    Ok(Self::with_source(build_source(settings)?))
  }

  pub fn with_source(source: Box<dyn DataSource>) -> Self {
    Self {
      source,
      memo: Mutex::new(HashMap::new()),
    }
  }

  pub fn source_name(&self) -> String {
    self.source.name()
  }

  pub fn available_years(&self) -> Result<AvailableYears> {
    let years = self.source.available_years()?;

    if years.is_empty() {
      return Err(EnrError::unavailable(self.source.name(), "no enrollment years found"));
    }

    Ok(years)
  }

  /// Most recent available year.
  pub fn default_year(&self) -> Result<i32> {
    let years = self.available_years()?;
    years::default_year(&years).ok_or_else(|| EnrError::unavailable(self.source.name(), "no enrollment years found"))
  }

  fn resolve_year(&self, year: Option<i32>) -> Result<i32> {
    let years = self.available_years()?;

    match year {
      Some(y) => years::check_year(y, &years),
      None => years::default_year(&years)
        .ok_or_else(|| EnrError::unavailable(self.source.name(), "no enrollment years found")),
    }
  }

  /// Memo guard; a poisoned memo is bypassed, so loads still succeed uncached.
  fn memo(&self) -> Option<MutexGuard<'_, HashMap<i32, Arc<Vec<EnrollmentRecord>>>>> {
    match self.memo.lock() {
      Ok(guard) => Some(guard),
      Err(_) => {
        debug!(source = %self.source.name(), "enrollment memo lock poisoned; bypassing memo");
        None
      }
    }
  }

  fn load(&self, year: i32) -> Result<Arc<Vec<EnrollmentRecord>>> {
    if let Some(hit) = self.memo().and_then(|m| m.get(&year).cloned()) {
      debug!(year, "enrollment memo hit");
      return Ok(hit);
    }

    let text = self.source.load_year(year)?;
    let records = match parse_enrollment_csv(&text, year, &self.source.name()) {
      Ok(r) => Arc::new(r),
      Err(e) => {
        self.source.invalidate(year);
        return Err(e);
      }
    };
    info!(year, rows = records.len(), source = %self.source.name(), "decoded enrollment");

    if let Some(mut m) = self.memo() {
      m.insert(year, records.clone());
    }

    Ok(records)
  }

  /// Enrollment records for `year`, or the most recent year when `None`.
  pub fn fetch(&self, year: Option<i32>) -> Result<Vec<EnrollmentRecord>> {
    let year = self.resolve_year(year)?;
    Ok(self.load(year)?.as_ref().clone())
  }

  pub fn fetch_tidy(&self, year: Option<i32>) -> Result<Vec<TidyRecord>> {
    let year = self.resolve_year(year)?;
    Ok(tidy_enr(&self.load(year)?))
  }

  /// Records for several years, fetched in parallel and concatenated in ascending year order.
  ///
  /// Every year is validated before any load; duplicates are fetched once.
  pub fn fetch_multi(&self, years: &[i32]) -> Result<Vec<EnrollmentRecord>> {
    let available = self.available_years()?;
    let mut wanted: Vec<i32> = Vec::with_capacity(years.len());

    for y in years {
      let y = years::check_year(*y, &available)?;
      if !wanted.contains(&y) {
        wanted.push(y);
      }
    }
    wanted.sort_unstable();

    let per_year: Vec<Arc<Vec<EnrollmentRecord>>> =
      wanted.par_iter().map(|y| self.load(*y)).collect::<Result<Vec<_>>>()?;

    Ok(per_year.iter().flat_map(|recs| recs.iter().cloned()).collect())
  }
}

// --- crate-level entry points ---
// One accessor per process, rebuilt when the resolved settings change.
type SharedAccessor = Mutex<Option<(Settings, Arc<Enrollment>)>>;

static DEFAULT_ACCESSOR: Lazy<SharedAccessor> = Lazy::new(|| Mutex::new(None));

/// Accessor for the current environment settings.
pub fn default_accessor() -> Result<Arc<Enrollment>> {
  let settings = Settings::from_env()?;
  accessor_for(&settings)
}

pub fn accessor_for(settings: &Settings) -> Result<Arc<Enrollment>> {
  let mut slot = DEFAULT_ACCESSOR
    .lock()
    .map_err(|_| EnrError::Config("accessor lock poisoned".into()))?;

  if let Some((cached_settings, acc)) = slot.as_ref() {
    if cached_settings == settings {
      return Ok(acc.clone());
    }
  }

  let acc = Arc::new(Enrollment::from_settings(settings)?);
  *slot = Some((settings.clone(), acc.clone()));

  Ok(acc)
}

/// The set of years for which enrollment data can be fetched.
pub fn get_available_years() -> Result<AvailableYears> {
  default_accessor()?.available_years()
}

/// Enrollment records for one school year (ending year); `None` selects the most recent year.
pub fn fetch_enr(year: Option<i32>) -> Result<Vec<EnrollmentRecord>> {
  default_accessor()?.fetch(year)
}

pub fn fetch_enr_tidy(year: Option<i32>) -> Result<Vec<TidyRecord>> {
  default_accessor()?.fetch_tidy(year)
}

pub fn fetch_enr_multi(years: &[i32]) -> Result<Vec<EnrollmentRecord>> {
  default_accessor()?.fetch_multi(years)
}
