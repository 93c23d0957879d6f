// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Static table of published enrollment years, the default-year rule, year validation and year-list parsing
// role: domain/years
// inputs: Available year sets; override strings like "2019,2021" or "2015-2024"
// outputs: AvailableYears sets; validated years; InvalidYear errors
// invariants:
// - default year is the maximum of the set
// - check_year never performs I/O
// - school-year labels ("2023-24", "2023-2024") resolve to the ending year
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;

use crate::error::{EnrError, Result};
use crate::model::AvailableYears;

/// First school year (ending) published in the enrollment downloads.
pub const FIRST_PUBLISHED_YEAR: i32 = 2014;
/// Most recent school year (ending) published in the enrollment downloads.
pub const LAST_PUBLISHED_YEAR: i32 = 2024;

pub fn published_years() -> AvailableYears {
  (FIRST_PUBLISHED_YEAR..=LAST_PUBLISHED_YEAR).collect()
}

pub fn default_year(years: &AvailableYears) -> Option<i32> {
  years.iter().next_back().copied()
}

/// Fail with `InvalidYear` unless `year` is a member of `years`.
pub fn check_year(year: i32, years: &AvailableYears) -> Result<i32> {
  if years.contains(&year) {
    return Ok(year);
  }
  let min = years.iter().next().copied().unwrap_or(year);
  let max = years.iter().next_back().copied().unwrap_or(year);

  Err(EnrError::InvalidYear { year, min, max })
}

/// Parse a year list such as `2019,2020`, `2015-2024`, or a mix of both.
pub fn parse_year_list(s: &str) -> Result<AvailableYears> {
  let mut out = AvailableYears::new();

  for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
    match part.split_once('-') {
      Some((a, b)) => {
        let start = parse_one(a)?;
        let end = parse_one(b)?;
        if start > end {
          return Err(EnrError::Config(format!("year range {} is reversed", part)));
        }
        out.extend(start..=end);
      }
      None => {
        out.insert(parse_one(part)?);
      }
    }
  }

  if out.is_empty() {
    return Err(EnrError::Config(format!("year list {:?} is empty", s)));
  }

  Ok(out)
}

fn parse_one(s: &str) -> Result<i32> {
  let s = s.trim();
  match s.parse::<i32>() {
    Ok(y) if (1900..=2100).contains(&y) => Ok(y),
    _ => Err(EnrError::Config(format!("{:?} is not a four-digit year", s))),
  }
}

/// Resolve a year cell from an upstream file to the ending year of the school year.
///
/// Accepts `2024`, `2023-2024`, `2023-24` and `SY 2023-24`.
pub fn end_year_from_label(label: &str) -> Option<i32> {
  static RE_SCHOOL_YEAR: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"(\d{4})(?:\s*[-/]\s*(\d{4}|\d{2}))?").unwrap());

  let caps = RE_SCHOOL_YEAR.captures(label.trim())?;
  let start: i32 = caps.get(1)?.as_str().parse().ok()?;

  match caps.get(2) {
    None => Some(start),
    Some(m) if m.as_str().len() == 4 => m.as_str().parse().ok(),
    Some(m) => {
      let yy: i32 = m.as_str().parse().ok()?;
      let century = start - start.rem_euclid(100);
      let end = century + yy;
      Some(if end < start { end + 100 } else { end })
    }
  }
}
