use std::time::Duration;

use mdschooldata::config::{Settings, SourceSettings};
use mdschooldata::{cache_status, Enrollment, EnrError};
use test_support::{read_fixture_text, serve_canned, Canned};

fn http_settings(base: &str, cache_dir: &std::path::Path) -> Settings {
  Settings {
    source: SourceSettings::Http {
      url_template: format!("{}/enr/{{year}}.csv", base),
    },
    cache_dir: cache_dir.to_path_buf(),
    use_cache: true,
    cache_max_age: Duration::from_secs(3600),
    timeout: Duration::from_secs(5),
    years_override: Some([2023, 2024].into_iter().collect()),
  }
}

#[test]
fn download_populates_cache_and_cache_survives_server() {
  test_support::init_tracing();
  let cache = test_support::tempdir();
  let wide = read_fixture_text("enrollment/enrollment_2024.csv");

  let (base, server) = serve_canned(
    vec![("/enr/2024.csv", Canned::ok(wide)), ("/enr/2023.csv", Canned::not_found())],
    2,
  );
  let settings = http_settings(&base, cache.path());

  let acc = Enrollment::from_settings(&settings).unwrap();
  assert_eq!(acc.available_years().unwrap().into_iter().collect::<Vec<_>>(), vec![2023, 2024]);

  let recs = acc.fetch(None).unwrap();
  assert_eq!(recs.len(), 4);
  assert!(recs.iter().all(|r| r.end_year == 2024));

  match acc.fetch(Some(2023)) {
    Err(EnrError::DataSourceUnavailable { reason, .. }) => assert!(reason.contains("404"), "{reason}"),
    other => panic!("expected DataSourceUnavailable, got {other:?}"),
  }
  server.join().unwrap();

  let status = cache_status(&settings).unwrap();
  assert_eq!(status.len(), 1);
  assert_eq!(status[0].year, 2024);
  assert!(status[0].fresh);

  // fresh accessor, no server: served from disk
  let again = Enrollment::from_settings(&settings).unwrap();
  assert_eq!(again.fetch(Some(2024)).unwrap(), recs);

  assert!(again.fetch(Some(2019)).unwrap_err().is_invalid_year());
}

#[test]
fn no_cache_goes_to_network_every_time() {
  let cache = test_support::tempdir();
  let (base, server) = serve_canned(vec![], 1);
  let mut settings = http_settings(&base, cache.path());
  settings.use_cache = false;

  let acc = Enrollment::from_settings(&settings).unwrap();
  assert!(acc.fetch(Some(2024)).unwrap_err().is_unavailable());
  server.join().unwrap();

  assert!(cache_status(&settings).unwrap().is_empty());
}

#[test]
fn garbage_body_is_unavailable() {
  let cache = test_support::tempdir();
  let (base, server) = serve_canned(vec![("/enr/2024.csv", Canned::ok("<html>maintenance</html>\n"))], 1);
  let settings = http_settings(&base, cache.path());

  let err = Enrollment::from_settings(&settings).unwrap().fetch(Some(2024)).unwrap_err();
  server.join().unwrap();

  assert!(err.is_unavailable(), "{err:?}");
  assert!(cache_status(&settings).unwrap().is_empty(), "undecodable body must not stay cached");
}
