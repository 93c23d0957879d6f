use mdschooldata::source::DirSource;
use mdschooldata::{AggregationLevel, Enrollment};
use test_support::enrollment_fixture_dir;

fn accessor() -> Enrollment {
  test_support::init_tracing();
  Enrollment::with_source(Box::new(DirSource::new(enrollment_fixture_dir())))
}

#[test]
fn long_file_pivots_to_one_row_per_entity() {
  let recs = accessor().fetch(Some(2023)).unwrap();
  assert_eq!(recs.len(), 3);

  let state = &recs[0];
  assert_eq!(state.level(), AggregationLevel::State);
  assert_eq!(state.row_total, Some(990));
  assert_eq!(state.grade_k, Some(85));

  let district = &recs[1];
  assert_eq!(district.level(), AggregationLevel::District);
  assert_eq!(district.district_id.as_deref(), Some("03"));
  assert_eq!(district.row_total, Some(590));

  let school = &recs[2];
  assert_eq!(school.school_id.as_deref(), Some("0101"));
  assert_eq!(school.grade_pk, Some(10));
  assert_eq!(school.grade_01, None, "suppressed cell stays missing");
  assert_eq!(school.row_total, None, "suppressed grade leaves the total unknown");
}

#[test]
fn wide_file_pads_ids_and_keeps_suppression_missing() {
  let recs = accessor().fetch(Some(2024)).unwrap();

  let state = &recs[0];
  assert_eq!(state.level(), AggregationLevel::State);
  assert_eq!(state.row_total, Some(1000));
  assert_eq!(state.native_american, None);

  let high = recs.iter().find(|r| r.school_name.as_deref() == Some("Sample High")).unwrap();
  assert_eq!(high.district_id.as_deref(), Some("03"));
  assert_eq!(high.school_id.as_deref(), Some("0201"));
  assert_eq!(high.grade_k, None);
  assert_eq!(high.grade_12, Some(63));
}
