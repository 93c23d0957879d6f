// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed error taxonomy for the enrollment accessor (bad input vs. infrastructure failure)
// role: errors/types
// outputs: EnrError and the crate Result alias
// invariants:
// - InvalidYear is raised before any I/O happens
// - DataSourceUnavailable always names the source that failed
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub type Result<T, E = EnrError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum EnrError {
  /// Requested year is not in the available set; retry with a valid year.
  #[error("invalid year {year}: enrollment data is available for {min}-{max}")]
  InvalidYear { year: i32, min: i32, max: i32 },

  /// The underlying data could not be reached, read, or decoded.
  #[error("data source unavailable ({source_name}): {reason}")]
  DataSourceUnavailable { source_name: String, reason: String },

  /// Settings could not be resolved from the environment or CLI.
  #[error("invalid configuration: {0}")]
  Config(String),
}

impl EnrError {
  pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
    EnrError::DataSourceUnavailable {
      source_name: source_name.into(),
      reason: reason.into(),
    }
  }

  pub fn is_invalid_year(&self) -> bool {
    matches!(self, EnrError::InvalidYear { .. })
  }

  pub fn is_unavailable(&self) -> bool {
    matches!(self, EnrError::DataSourceUnavailable { .. })
  }
}
