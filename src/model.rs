// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the enrollment data model (wide records, tidy rows, aggregation level) shared by parsing, tidying and output
// role: model/types
// outputs: Serializable structs with stable snake_case field names
// invariants: Counts are Option<u32>; suppressed cells are None, never zero; end_year is the year a school year ends
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Years for which a dataset snapshot exists.
pub type AvailableYears = BTreeSet<i32>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AggregationLevel {
  State,
  District,
  School,
}

/// Column order of [`EnrollmentRecord`] when written as CSV.
pub const ENROLLMENT_COLUMNS: [&str; 30] = [
  "end_year", "level", "district_id", "district_name", "school_id", "school_name", "row_total",
  "white", "black", "hispanic", "asian", "native_american", "pacific_islander", "multiracial",
  "male", "female",
  "grade_pk", "grade_k", "grade_01", "grade_02", "grade_03", "grade_04", "grade_05", "grade_06",
  "grade_07", "grade_08", "grade_09", "grade_10", "grade_11", "grade_12",
];

/// Column order of [`TidyRecord`] when written as CSV.
pub const TIDY_COLUMNS: [&str; 13] = [
  "end_year", "level", "district_id", "district_name", "school_id", "school_name", "grade_level",
  "subgroup", "n_students", "pct", "is_state", "is_district", "is_school",
];

/// One row of the wide enrollment table: a state, district (LSS) or school total.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct EnrollmentRecord {
  pub end_year: i32,
  pub level: Option<AggregationLevel>,
  pub district_id: Option<String>,
  pub district_name: Option<String>,
  pub school_id: Option<String>,
  pub school_name: Option<String>,

  pub row_total: Option<u32>,

  pub white: Option<u32>,
  pub black: Option<u32>,
  pub hispanic: Option<u32>,
  pub asian: Option<u32>,
  pub native_american: Option<u32>,
  pub pacific_islander: Option<u32>,
  pub multiracial: Option<u32>,

  pub male: Option<u32>,
  pub female: Option<u32>,

  pub grade_pk: Option<u32>,
  pub grade_k: Option<u32>,
  pub grade_01: Option<u32>,
  pub grade_02: Option<u32>,
  pub grade_03: Option<u32>,
  pub grade_04: Option<u32>,
  pub grade_05: Option<u32>,
  pub grade_06: Option<u32>,
  pub grade_07: Option<u32>,
  pub grade_08: Option<u32>,
  pub grade_09: Option<u32>,
  pub grade_10: Option<u32>,
  pub grade_11: Option<u32>,
  pub grade_12: Option<u32>,
}

impl EnrollmentRecord {
  /// Resolved aggregation level; rows decoded without one are treated as schools.
  pub fn level(&self) -> AggregationLevel {
    self.level.unwrap_or(AggregationLevel::School)
  }

  /// Demographic subgroup counts in output order.
  pub fn subgroups(&self) -> [(&'static str, Option<u32>); 9] {
    [
      ("white", self.white),
      ("black", self.black),
      ("hispanic", self.hispanic),
      ("asian", self.asian),
      ("native_american", self.native_american),
      ("pacific_islander", self.pacific_islander),
      ("multiracial", self.multiracial),
      ("male", self.male),
      ("female", self.female),
    ]
  }

  /// Grade counts in output order, labelled the way tidy rows label them.
  pub fn grades(&self) -> [(&'static str, Option<u32>); 14] {
    [
      ("PK", self.grade_pk),
      ("K", self.grade_k),
      ("01", self.grade_01),
      ("02", self.grade_02),
      ("03", self.grade_03),
      ("04", self.grade_04),
      ("05", self.grade_05),
      ("06", self.grade_06),
      ("07", self.grade_07),
      ("08", self.grade_08),
      ("09", self.grade_09),
      ("10", self.grade_10),
      ("11", self.grade_11),
      ("12", self.grade_12),
    ]
  }
}

/// Long-form enrollment row: one count per entity, grade level and subgroup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TidyRecord {
  pub end_year: i32,
  pub level: AggregationLevel,
  pub district_id: Option<String>,
  pub district_name: Option<String>,
  pub school_id: Option<String>,
  pub school_name: Option<String>,
  pub grade_level: String,
  pub subgroup: String,
  pub n_students: u32,
  pub pct: Option<f64>,
  pub is_state: bool,
  pub is_district: bool,
  pub is_school: bool,
}
