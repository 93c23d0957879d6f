// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Decode upstream enrollment CSV text into EnrollmentRecord rows (wide files and per-grade long files)
// role: parsing/csv
// inputs: raw CSV text; requested end year; source name for error context
// outputs: Vec<EnrollmentRecord> in file order (long files: first-seen entity order)
// invariants:
// - header spellings are normalized then matched through a fixed alias table; unknown columns are ignored
// - suppressed or non-numeric count cells decode to None, never zero
// - rows whose year column names a different end year are dropped
// - a header-only file decodes to an empty Vec
// errors: DataSourceUnavailable when the layout has no entity or no count columns, or the CSV is unreadable
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{EnrError, Result};
use crate::model::{AggregationLevel, EnrollmentRecord};
use crate::years::end_year_from_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Year,
  DistrictId,
  DistrictName,
  SchoolId,
  SchoolName,
  GradeLabel,
  Total,
  White,
  Black,
  Hispanic,
  Asian,
  NativeAmerican,
  PacificIslander,
  Multiracial,
  Male,
  Female,
  GradePk,
  GradeK,
  Grade(u8),
}

impl Field {
  fn is_entity(&self) -> bool {
    matches!(
      self,
      Field::DistrictId | Field::DistrictName | Field::SchoolId | Field::SchoolName
    )
  }

  fn is_count(&self) -> bool {
    !self.is_entity() && !matches!(self, Field::Year | Field::GradeLabel)
  }
}

/// Lowercase, collapse runs of non-alphanumerics to `_`, strip a leading BOM.
pub fn normalize_header(h: &str) -> String {
  let h = h.trim_start_matches('\u{feff}').trim().to_lowercase();
  let mut out = String::with_capacity(h.len());
  let mut pending_sep = false;

  for ch in h.chars() {
    if ch.is_ascii_alphanumeric() {
      if pending_sep && !out.is_empty() {
        out.push('_');
      }
      pending_sep = false;
      out.push(ch);
    } else {
      pending_sep = true;
    }
  }

  out
}

static RE_GRADE_HEADER: Lazy<regex::Regex> =
  Lazy::new(|| regex::Regex::new(r"^(?:grade_?|gr_?|g)0?(\d{1,2})$").unwrap());

/// Map a normalized header to the record field it feeds.
pub fn field_for(header: &str) -> Option<Field> {
  let f = match header {
    "year" | "school_year" | "end_year" | "academic_year" | "sy" => Field::Year,
    "lss_number" | "lss" | "lss_code" | "lss_id" | "lea" | "lea_number" | "lea_id" | "district_id" | "district_number"
    | "district_code" => Field::DistrictId,
    "lss_name" | "lea_name" | "district_name" | "district" | "school_system" => Field::DistrictName,
    "school_number" | "school_id" | "school_code" | "sch_number" => Field::SchoolId,
    "school_name" | "school" => Field::SchoolName,
    "grade" | "grade_level" | "grade_band" => Field::GradeLabel,
    "enrollment" | "total_enrollment" | "enrolled_count" | "enrollment_count" | "total" | "all_students" | "row_total"
    | "count" => Field::Total,
    "white" => Field::White,
    "black" | "african_american" | "black_or_african_american" | "black_african_american" => Field::Black,
    "hispanic" | "hispanic_latino" | "hispanic_or_latino" | "hispanic_latino_of_any_race" => Field::Hispanic,
    "asian" => Field::Asian,
    "native_american" | "american_indian" | "american_indian_or_alaska_native" | "american_indian_alaska_native" => {
      Field::NativeAmerican
    }
    "pacific_islander" | "native_hawaiian_or_other_pacific_islander" | "native_hawaiian_other_pacific_islander" => {
      Field::PacificIslander
    }
    "multiracial" | "multi_racial" | "two_or_more" | "two_or_more_races" => Field::Multiracial,
    "male" | "males" => Field::Male,
    "female" | "females" => Field::Female,
    "pk" | "pre_k" | "grade_pk" | "prekindergarten" | "pre_kindergarten" => Field::GradePk,
    "k" | "kg" | "grade_k" | "kindergarten" => Field::GradeK,
    other => return grade_number(other, &RE_GRADE_HEADER).map(Field::Grade),
  };

  Some(f)
}

fn grade_number(s: &str, re: &regex::Regex) -> Option<u8> {
  re.captures(s)
    .and_then(|c| c.get(1))
    .and_then(|m| m.as_str().parse::<u8>().ok())
    .filter(|n| (1..=12).contains(n))
}

/// Which slot a long-format grade cell fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GradeSlot {
  AllGrades,
  Grade(Field),
}

fn grade_slot(label: &str) -> Option<GradeSlot> {
  static RE_GRADE_LABEL: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^(?:grade_?|gr_?|g)?0?(\d{1,2})$").unwrap());

  let norm = normalize_header(label);
  let slot = match norm.as_str() {
    "all" | "all_grades" | "total" | "all_students" => GradeSlot::AllGrades,
    "pk" | "pre_k" | "prekindergarten" | "pre_kindergarten" => GradeSlot::Grade(Field::GradePk),
    "k" | "kg" | "kindergarten" => GradeSlot::Grade(Field::GradeK),
    other => GradeSlot::Grade(Field::Grade(grade_number(other, &RE_GRADE_LABEL)?)),
  };

  Some(slot)
}

/// Decode a count cell; suppression markers and junk become `None`.
pub fn parse_count(cell: &str) -> Option<u32> {
  let s = cell.trim();

  if s.is_empty() || s.starts_with('<') || s.starts_with('>') || s.starts_with('≤') || s.starts_with('≥') {
    return None;
  }
  if s.chars().all(|c| c == '*' || c == '-' || c == '—') {
    return None;
  }

  let cleaned: String = s.chars().filter(|c| *c != ',').collect();

  if let Ok(n) = cleaned.parse::<u32>() {
    return Some(n);
  }
  match cleaned.parse::<f64>() {
    Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Some(f as u32),
    _ => None,
  }
}

fn is_aggregate_marker(s: &str) -> bool {
  let t = s.trim();
  t.is_empty()
    || t.chars().all(|c| c == '0')
    || ["a", "all", "state", "statewide", "maryland", "all lss", "all schools"]
      .iter()
      .any(|m| t.eq_ignore_ascii_case(m))
}

fn clean_id(raw: Option<&str>, width: usize) -> Option<String> {
  let s = raw?.trim();

  if is_aggregate_marker(s) {
    return None;
  }
  if s.chars().all(|c| c.is_ascii_digit()) && s.len() < width {
    return Some(format!("{:0>width$}", s, width = width));
  }

  Some(s.to_string())
}

fn clean_name(raw: Option<&str>) -> Option<String> {
  raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn level_for(rec: &EnrollmentRecord) -> AggregationLevel {
  let state_name = rec
    .district_name
    .as_deref()
    .map(is_aggregate_marker)
    .unwrap_or(true);

  if rec.district_id.is_none() && state_name {
    AggregationLevel::State
  } else if rec.school_id.is_none() && rec.school_name.as_deref().map(is_aggregate_marker).unwrap_or(true) {
    AggregationLevel::District
  } else {
    AggregationLevel::School
  }
}

fn set_count(rec: &mut EnrollmentRecord, field: Field, value: Option<u32>) {
  let slot = match field {
    Field::Total => &mut rec.row_total,
    Field::White => &mut rec.white,
    Field::Black => &mut rec.black,
    Field::Hispanic => &mut rec.hispanic,
    Field::Asian => &mut rec.asian,
    Field::NativeAmerican => &mut rec.native_american,
    Field::PacificIslander => &mut rec.pacific_islander,
    Field::Multiracial => &mut rec.multiracial,
    Field::Male => &mut rec.male,
    Field::Female => &mut rec.female,
    Field::GradePk => &mut rec.grade_pk,
    Field::GradeK => &mut rec.grade_k,
    Field::Grade(1) => &mut rec.grade_01,
    Field::Grade(2) => &mut rec.grade_02,
    Field::Grade(3) => &mut rec.grade_03,
    Field::Grade(4) => &mut rec.grade_04,
    Field::Grade(5) => &mut rec.grade_05,
    Field::Grade(6) => &mut rec.grade_06,
    Field::Grade(7) => &mut rec.grade_07,
    Field::Grade(8) => &mut rec.grade_08,
    Field::Grade(9) => &mut rec.grade_09,
    Field::Grade(10) => &mut rec.grade_10,
    Field::Grade(11) => &mut rec.grade_11,
    Field::Grade(12) => &mut rec.grade_12,
    _ => return,
  };
  *slot = value;
}

/// District id and name, school id and name: what separates entities in long files.
type EntityKey = (Option<String>, Option<String>, Option<String>, Option<String>);

/// Column index for each recognized field; first occurrence wins.
struct Layout {
  columns: Vec<(usize, Field)>,
}

impl Layout {
  fn from_headers(headers: &csv::StringRecord) -> Self {
    let mut columns: Vec<(usize, Field)> = Vec::new();

    for (idx, h) in headers.iter().enumerate() {
      let norm = normalize_header(h);
      match field_for(&norm) {
        Some(f) if !columns.iter().any(|(_, seen)| *seen == f) => columns.push((idx, f)),
        Some(_) => debug!(header = h, "duplicate column ignored"),
        None => debug!(header = h, "unrecognized column ignored"),
      }
    }

    Self { columns }
  }

  fn index_of(&self, field: Field) -> Option<usize> {
    self.columns.iter().find(|(_, f)| *f == field).map(|(i, _)| *i)
  }

  fn is_long(&self) -> bool {
    self.index_of(Field::GradeLabel).is_some() && self.index_of(Field::Total).is_some()
  }

  fn is_decodable(&self) -> bool {
    self.columns.iter().any(|(_, f)| f.is_entity()) && self.columns.iter().any(|(_, f)| f.is_count())
  }
}

/// Decode one year's CSV text into records.
pub fn parse_enrollment_csv(text: &str, year: i32, source_name: &str) -> Result<Vec<EnrollmentRecord>> {
  let mut rdr = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(text.as_bytes());

  let headers = rdr
    .headers()
    .map_err(|e| EnrError::unavailable(source_name, format!("reading CSV header: {}", e)))?
    .clone();
  let layout = Layout::from_headers(&headers);

  if !layout.is_decodable() {
    return Err(EnrError::unavailable(
      source_name,
      format!("unrecognized enrollment layout (columns: {})", headers.iter().collect::<Vec<_>>().join(", ")),
    ));
  }

  let long = layout.is_long();
  let mut out: Vec<EnrollmentRecord> = Vec::new();
  let mut by_entity: HashMap<EntityKey, usize> = HashMap::new();
  // entities with at least one suppressed or blank grade cell
  let mut incomplete: HashSet<usize> = HashSet::new();
  let mut skipped_years = 0usize;

  for (line, row) in rdr.records().enumerate() {
    let row = row.map_err(|e| EnrError::unavailable(source_name, format!("CSV row {}: {}", line + 2, e)))?;
    let cell = |f: Field| layout.index_of(f).and_then(|i| row.get(i));

    if let Some(y) = cell(Field::Year).and_then(end_year_from_label) {
      if y != year {
        skipped_years += 1;
        continue;
      }
    }

    let mut rec = EnrollmentRecord {
      end_year: year,
      district_id: clean_id(cell(Field::DistrictId), 2),
      district_name: clean_name(cell(Field::DistrictName)),
      school_id: clean_id(cell(Field::SchoolId), 4),
      school_name: clean_name(cell(Field::SchoolName)),
      ..Default::default()
    };
    rec.level = Some(level_for(&rec));

    if long {
      let Some(slot) = cell(Field::GradeLabel).and_then(grade_slot) else {
        debug!(line = line + 2, "unrecognized grade label skipped");
        continue;
      };
      let key = (
        rec.district_id.clone(),
        rec.district_name.clone(),
        rec.school_id.clone(),
        rec.school_name.clone(),
      );
      let idx = *by_entity.entry(key).or_insert_with(|| {
        out.push(rec);
        out.len() - 1
      });
      let count = cell(Field::Total).and_then(parse_count);
      let target = &mut out[idx];

      match slot {
        GradeSlot::AllGrades => target.row_total = count,
        GradeSlot::Grade(f) => {
          if count.is_none() {
            incomplete.insert(idx);
          }
          set_count(target, f, count)
        }
      }
      continue;
    }

    for (idx, field) in &layout.columns {
      if field.is_count() {
        set_count(&mut rec, *field, row.get(*idx).and_then(parse_count));
      }
    }
    out.push(rec);
  }

  if long {
    // a suppressed grade makes the sum unknown, not smaller
    for (_, rec) in out
      .iter_mut()
      .enumerate()
      .filter(|(i, r)| r.row_total.is_none() && !incomplete.contains(i))
    {
      let present: Vec<u32> = rec.grades().iter().filter_map(|(_, n)| *n).collect();
      if !present.is_empty() {
        rec.row_total = Some(present.iter().sum());
      }
    }
  }
  if skipped_years > 0 {
    debug!(skipped_years, year, "dropped rows for other years");
  }

  Ok(out)
}
