use mdschooldata::{fetch_enr, fetch_enr_multi, fetch_enr_tidy, get_available_years, EnrError};
use serial_test::serial;
use test_support::{enrollment_fixture_dir, with_env, EnvGuard};

fn fixture_env() -> EnvGuard {
  let dir = enrollment_fixture_dir().to_string_lossy().to_string();
  with_env(&[("MDSCHOOLDATA_DATA_DIR", dir.as_str())])
}

#[test]
fn version_matches_package() {
  assert_eq!(mdschooldata::VERSION, env!("CARGO_PKG_VERSION"));
  assert_eq!(mdschooldata::version(), mdschooldata::VERSION);

  let re = regex::Regex::new(r"^\d+\.\d+\.\d+").unwrap();
  assert!(re.is_match(mdschooldata::version()));
}

#[test]
#[serial]
fn available_years_are_stable_across_calls() {
  let _env = fixture_env();

  let first = get_available_years().unwrap();
  let second = get_available_years().unwrap();

  assert_eq!(first, second);
  assert_eq!(first.into_iter().collect::<Vec<_>>(), vec![2022, 2023, 2024]);
}

#[test]
#[serial]
fn every_available_year_fetches() {
  let _env = fixture_env();

  for year in get_available_years().unwrap() {
    let recs = fetch_enr(Some(year)).unwrap_or_else(|e| panic!("{year}: {e}"));
    assert!(recs.iter().all(|r| r.end_year == year));
  }
  // header-only file is a valid, empty year
  assert!(fetch_enr(Some(2022)).unwrap().is_empty());
}

#[test]
#[serial]
fn no_year_means_most_recent() {
  let _env = fixture_env();

  let latest = fetch_enr(None).unwrap();
  assert_eq!(latest, fetch_enr(Some(2024)).unwrap());
  assert_eq!(latest.len(), 4);
}

#[test]
#[serial]
fn years_outside_the_table_are_invalid() {
  let _env = fixture_env();

  for bad in [1999, 2021, 2030] {
    match fetch_enr(Some(bad)) {
      Err(EnrError::InvalidYear { year, min, max }) => assert_eq!((year, min, max), (bad, 2022, 2024)),
      other => panic!("expected InvalidYear for {bad}, got {other:?}"),
    }
  }

  let msg = fetch_enr(Some(1999)).unwrap_err().to_string();
  assert!(msg.contains("1999") && msg.contains("2022-2024"), "{msg}");
}

#[test]
#[serial]
fn missing_data_dir_is_unavailable() {
  let td = test_support::tempdir();
  let missing = td.path().join("nope").to_string_lossy().to_string();
  let _env = with_env(&[("MDSCHOOLDATA_DATA_DIR", missing.as_str())]);

  assert!(get_available_years().unwrap_err().is_unavailable());
  assert!(fetch_enr(None).unwrap_err().is_unavailable());
}

#[test]
#[serial]
fn empty_data_dir_is_unavailable_not_empty() {
  let td = test_support::tempdir();
  let dir = td.path().to_string_lossy().to_string();
  let _env = with_env(&[("MDSCHOOLDATA_DATA_DIR", dir.as_str())]);

  assert!(get_available_years().unwrap_err().is_unavailable());
}

#[test]
#[serial]
fn multi_year_fetch_is_year_ordered() {
  let _env = fixture_env();

  let recs = fetch_enr_multi(&[2024, 2023, 2024]).unwrap();
  let years: Vec<i32> = recs.iter().map(|r| r.end_year).collect();

  let mut sorted = years.clone();
  sorted.sort();
  assert_eq!(years, sorted);
  assert_eq!(recs.len(), 4 + 3);

  assert!(fetch_enr_multi(&[2023, 1990]).unwrap_err().is_invalid_year());
}

#[test]
#[serial]
fn tidy_rows_carry_one_level_flag() {
  let _env = fixture_env();

  let rows = fetch_enr_tidy(Some(2024)).unwrap();
  assert!(!rows.is_empty());
  for r in &rows {
    let flags = [r.is_state, r.is_district, r.is_school];
    assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{r:?}");
    if let Some(p) = r.pct {
      assert!((0.0..=1.0).contains(&p), "{r:?}");
    }
  }
}
