use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::DataSource;
use crate::error::{EnrError, Result};
use crate::model::AvailableYears;

/// In-memory source for embedding packaged data or injecting fixtures.
pub struct MemorySource {
  label: String,
  files: BTreeMap<i32, String>,
  loads: Mutex<HashMap<i32, usize>>,
}

impl MemorySource {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      files: BTreeMap::new(),
      loads: Mutex::new(HashMap::new()),
    }
  }

  pub fn with_year(mut self, year: i32, csv: impl Into<String>) -> Self {
    self.files.insert(year, csv.into());
    self
  }

  /// How many times `load_year(year)` has been called.
  pub fn load_count(&self, year: i32) -> usize {
    self.loads.lock().ok().and_then(|m| m.get(&year).copied()).unwrap_or(0)
  }
}

impl DataSource for MemorySource {
  fn name(&self) -> String {
    format!("memory:{}", self.label)
  }

  fn available_years(&self) -> Result<AvailableYears> {
    Ok(self.files.keys().copied().collect())
  }

  fn load_year(&self, year: i32) -> Result<String> {
    if let Ok(mut m) = self.loads.lock() {
      *m.entry(year).or_insert(0) += 1;
    }

    self
      .files
      .get(&year)
      .cloned()
      .ok_or_else(|| EnrError::unavailable(self.name(), format!("no enrollment file for {}", year)))
  }
}
