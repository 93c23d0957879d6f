// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reshape wide enrollment records into long (tidy) rows and build grade-band aggregates
// role: transform/tidy
// inputs: &[EnrollmentRecord] or &[TidyRecord]
// outputs: Vec<TidyRecord> with aggregation flags and shares of the row total
// invariants:
// - per record: TOTAL/total_enrollment first, then subgroups at TOTAL, then grades at total_enrollment
// - missing counts produce no row
// - pct is None when the row total is missing or zero
// - exactly one of is_state / is_district / is_school is true
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::model::{AggregationLevel, EnrollmentRecord, TidyRecord};

pub const GRADE_TOTAL: &str = "TOTAL";
pub const SUBGROUP_TOTAL: &str = "total_enrollment";

const K8: [&str; 9] = ["K", "01", "02", "03", "04", "05", "06", "07", "08"];
const HS: [&str; 4] = ["09", "10", "11", "12"];

fn row(rec: &EnrollmentRecord, grade_level: &str, subgroup: &str, n: u32) -> TidyRecord {
  let level = rec.level();
  let pct = match rec.row_total {
    Some(total) if total > 0 => Some(n as f64 / total as f64),
    _ => None,
  };

  TidyRecord {
    end_year: rec.end_year,
    level,
    district_id: rec.district_id.clone(),
    district_name: rec.district_name.clone(),
    school_id: rec.school_id.clone(),
    school_name: rec.school_name.clone(),
    grade_level: grade_level.to_string(),
    subgroup: subgroup.to_string(),
    n_students: n,
    pct,
    is_state: level == AggregationLevel::State,
    is_district: level == AggregationLevel::District,
    is_school: level == AggregationLevel::School,
  }
}

pub fn tidy_enr(records: &[EnrollmentRecord]) -> Vec<TidyRecord> {
  let mut out = Vec::with_capacity(records.len() * 8);

  for rec in records {
    if let Some(total) = rec.row_total {
      out.push(row(rec, GRADE_TOTAL, SUBGROUP_TOTAL, total));
    }
    for (subgroup, n) in rec.subgroups() {
      if let Some(n) = n {
        out.push(row(rec, GRADE_TOTAL, subgroup, n));
      }
    }
    for (grade, n) in rec.grades() {
      if let Some(n) = n {
        out.push(row(rec, grade, SUBGROUP_TOTAL, n));
      }
    }
  }

  out
}

/// K8, HS and K12 totals per entity, built from `total_enrollment` grade rows.
///
/// A band is emitted only when at least one of its grades is present. `pct` is
/// left empty since the band is not a share of any single source row.
pub fn enr_grade_aggs(tidy: &[TidyRecord]) -> Vec<TidyRecord> {
  let mut out: Vec<TidyRecord> = Vec::new();
  let mut i = 0;

  // rows for one entity are contiguous in tidy_enr output
  while i < tidy.len() {
    let mut j = i + 1;
    while j < tidy.len() && same_entity(&tidy[i], &tidy[j]) {
      j += 1;
    }
    let group = &tidy[i..j];

    for (label, grades) in [("K8", &K8[..]), ("HS", &HS[..])] {
      if let Some(agg) = band(group, label, grades) {
        out.push(agg);
      }
    }
    let k12: Vec<&str> = K8.iter().chain(HS.iter()).copied().collect();
    if let Some(agg) = band(group, "K12", &k12) {
      out.push(agg);
    }

    i = j;
  }

  out
}

fn same_entity(a: &TidyRecord, b: &TidyRecord) -> bool {
  a.end_year == b.end_year
    && a.level == b.level
    && a.district_id == b.district_id
    && a.district_name == b.district_name
    && a.school_id == b.school_id
    && a.school_name == b.school_name
}

fn band(group: &[TidyRecord], label: &str, grades: &[&str]) -> Option<TidyRecord> {
  let members: Vec<&TidyRecord> = group
    .iter()
    .filter(|r| r.subgroup == SUBGROUP_TOTAL && grades.contains(&r.grade_level.as_str()))
    .collect();
  let first = members.first()?;

  let mut agg = (*first).clone();
  agg.grade_level = label.to_string();
  agg.n_students = members.iter().map(|r| r.n_students).sum();
  agg.pct = None;

  Some(agg)
}
