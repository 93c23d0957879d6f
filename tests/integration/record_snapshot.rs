use mdschooldata::source::DirSource;
use mdschooldata::Enrollment;
use test_support::enrollment_fixture_dir;

#[test]
fn state_row_2024_snapshot() {
  test_support::init_insta();
  let acc = Enrollment::with_source(Box::new(DirSource::new(enrollment_fixture_dir())));
  let recs = acc.fetch(Some(2024)).unwrap();

  insta::assert_json_snapshot!(recs[0], @r###"
  {
    "end_year": 2024,
    "level": "state",
    "district_id": null,
    "district_name": "All LSS",
    "school_id": null,
    "school_name": "All Schools",
    "row_total": 1000,
    "white": 400,
    "black": 300,
    "hispanic": 200,
    "asian": 50,
    "native_american": null,
    "pacific_islander": null,
    "multiracial": 40,
    "male": 510,
    "female": 490,
    "grade_pk": 20,
    "grade_k": 80,
    "grade_01": 60,
    "grade_02": 60,
    "grade_03": 60,
    "grade_04": 60,
    "grade_05": 60,
    "grade_06": 60,
    "grade_07": 60,
    "grade_08": 60,
    "grade_09": 105,
    "grade_10": 105,
    "grade_11": 105,
    "grade_12": 105
  }
  "###);
}

#[test]
fn school_tidy_rows_snapshot() {
  test_support::init_insta();
  let acc = Enrollment::with_source(Box::new(DirSource::new(enrollment_fixture_dir())));
  let rows = acc.fetch_tidy(Some(2023)).unwrap();

  let school: Vec<String> = rows
    .iter()
    .filter(|r| r.is_school)
    .map(|r| format!("{} {} {}", r.grade_level, r.subgroup, r.n_students))
    .collect();

  insta::assert_json_snapshot!(school, @r###"
  [
    "PK total_enrollment 10",
    "K total_enrollment 50",
    "02 total_enrollment 40"
  ]
  "###);
}
