//! Maryland public school enrollment data, one school year at a time.
//!
//! ```no_run
//! let years = mdschooldata::get_available_years()?;
//! let latest = mdschooldata::fetch_enr(None)?;
//! let first = mdschooldata::fetch_enr(years.iter().next().copied())?;
//! # Ok::<(), mdschooldata::EnrError>(())
//! ```
//!
//! Where the data comes from is resolved from `MDSCHOOLDATA_*` environment
//! variables (see [`config`]); use [`Enrollment`] directly to inject a source.

pub mod accessor;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod source;
pub mod tidy;
pub mod years;

pub use accessor::{fetch_enr, fetch_enr_multi, fetch_enr_tidy, get_available_years, Enrollment};
pub use cache::{cache_status, clear_cache, CacheEntry};
pub use config::Settings;
pub use error::{EnrError, Result};
pub use model::{AggregationLevel, AvailableYears, EnrollmentRecord, TidyRecord};
pub use tidy::{enr_grade_aggs, tidy_enr};

/// Package release of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
  VERSION
}
