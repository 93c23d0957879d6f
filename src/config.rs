// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve accessor settings (source location, cache, timeouts, year overrides) from the environment
// role: config/settings
// inputs: MDSCHOOLDATA_* environment variables
// outputs: Settings value compared by equality to decide accessor reuse
// invariants:
// - DATA_DIR takes precedence over URL_TEMPLATE
// - url_template always contains "{year}"
// - unset variables fall back to documented defaults
// errors: Config for unparsable values
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EnrError, Result};
use crate::model::AvailableYears;
use crate::years;

pub const ENV_DATA_DIR: &str = "MDSCHOOLDATA_DATA_DIR";
pub const ENV_URL_TEMPLATE: &str = "MDSCHOOLDATA_URL_TEMPLATE";
pub const ENV_CACHE_DIR: &str = "MDSCHOOLDATA_CACHE_DIR";
pub const ENV_NO_CACHE: &str = "MDSCHOOLDATA_NO_CACHE";
pub const ENV_CACHE_MAX_AGE_DAYS: &str = "MDSCHOOLDATA_CACHE_MAX_AGE_DAYS";
pub const ENV_TIMEOUT_SECS: &str = "MDSCHOOLDATA_TIMEOUT_SECS";
pub const ENV_YEARS: &str = "MDSCHOOLDATA_YEARS";

/// Maryland Report Card enrollment download, one CSV per school year.
pub const DEFAULT_URL_TEMPLATE: &str =
  "https://reportcard.msde.maryland.gov/DataDownloads/FileDownload/{year}/Enrollment_{year}.csv";
pub const DEFAULT_CACHE_MAX_AGE_DAYS: u64 = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSettings {
  Http { url_template: String },
  Dir { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub source: SourceSettings,
  pub cache_dir: PathBuf,
  pub use_cache: bool,
  pub cache_max_age: Duration,
  pub timeout: Duration,
  /// Replaces the published year table for HTTP sources.
  pub years_override: Option<AvailableYears>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      source: SourceSettings::Http {
        url_template: DEFAULT_URL_TEMPLATE.to_string(),
      },
      cache_dir: default_cache_dir(),
      use_cache: true,
      cache_max_age: Duration::from_secs(DEFAULT_CACHE_MAX_AGE_DAYS * SECS_PER_DAY),
      timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
      years_override: None,
    }
  }
}

impl Settings {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build settings from an arbitrary key lookup (the environment in production).
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut settings = Settings::default();

    if let Some(t) = get(ENV_URL_TEMPLATE) {
      settings.source = SourceSettings::Http {
        url_template: validate_template(&t)?,
      };
    }
    // DATA_DIR wins over a URL template when both are set
    if let Some(dir) = get(ENV_DATA_DIR) {
      settings.source = SourceSettings::Dir { path: PathBuf::from(dir) };
    }
    if let Some(dir) = get(ENV_CACHE_DIR) {
      settings.cache_dir = PathBuf::from(dir);
    }
    if let Some(v) = get(ENV_NO_CACHE) {
      settings.use_cache = !parse_flag(ENV_NO_CACHE, &v)?;
    }
    if let Some(v) = get(ENV_CACHE_MAX_AGE_DAYS) {
      settings.cache_max_age = days(ENV_CACHE_MAX_AGE_DAYS, parse_u64(ENV_CACHE_MAX_AGE_DAYS, &v)?)?;
    }
    if let Some(v) = get(ENV_TIMEOUT_SECS) {
      settings.timeout = Duration::from_secs(parse_u64(ENV_TIMEOUT_SECS, &v)?);
    }
    if let Some(v) = get(ENV_YEARS) {
      settings.years_override = Some(years::parse_year_list(&v)?);
    }

    Ok(settings)
  }
}

pub fn default_cache_dir() -> PathBuf {
  std::env::temp_dir().join("mdschooldata")
}

pub fn validate_template(t: &str) -> Result<String> {
  if !t.contains("{year}") {
    return Err(EnrError::Config(format!("url template {:?} has no {{year}} placeholder", t)));
  }
  Ok(t.to_string())
}

const SECS_PER_DAY: u64 = 24 * 60 * 60;

fn days(key: &str, n: u64) -> Result<Duration> {
  n.checked_mul(SECS_PER_DAY)
    .map(Duration::from_secs)
    .ok_or_else(|| EnrError::Config(format!("{} is too large: {} days", key, n)))
}

fn parse_u64(key: &str, v: &str) -> Result<u64> {
  v.parse::<u64>()
    .map_err(|_| EnrError::Config(format!("{} must be a non-negative integer, got {:?}", key, v)))
}

fn parse_flag(key: &str, v: &str) -> Result<bool> {
  match v.to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(EnrError::Config(format!("{} must be a boolean, got {:?}", key, v))),
  }
}
