// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch yearly enrollment CSVs over HTTP from a URL template
// role: source/http
// inputs: url template containing "{year}"; request timeout; optional year override
// outputs: Raw CSV text per year; the published year table as available years
// side_effects: Network calls to the configured host
// invariants:
// - Every failure (transport, non-2xx, unreadable body) maps to DataSourceUnavailable
// - Requests carry a mdschooldata User-Agent
// errors: DataSourceUnavailable naming the URL and the status or transport error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Read;
use std::time::Duration;

use tracing::{debug, info};

use super::{decode_text, DataSource};
use crate::config::validate_template;
use crate::error::{EnrError, Result};
use crate::model::AvailableYears;
use crate::years;

pub struct HttpSource {
  agent: ureq::Agent,
  url_template: String,
  years: AvailableYears,
}

impl HttpSource {
  pub fn new(url_template: &str, timeout: Duration, years_override: Option<AvailableYears>) -> Result<Self> {
    let url_template = validate_template(url_template)?;
    let agent = ureq::AgentBuilder::new()
      .timeout(timeout)
      .user_agent(&format!("mdschooldata/{}", crate::VERSION))
      .build();

    Ok(Self {
      agent,
      url_template,
      years: years_override.unwrap_or_else(years::published_years),
    })
  }

  pub fn url_for(&self, year: i32) -> String {
    self.url_template.replace("{year}", &year.to_string())
  }
}

impl DataSource for HttpSource {
  fn name(&self) -> String {
    format!("http:{}", self.url_template)
  }

  fn available_years(&self) -> Result<AvailableYears> {
    Ok(self.years.clone())
  }

  fn load_year(&self, year: i32) -> Result<String> {
    let url = self.url_for(year);
    debug!(%url, year, "requesting enrollment file");

    let resp = match self.agent.get(&url).call() {
      Ok(r) => r,
      Err(ureq::Error::Status(code, _)) => {
        return Err(EnrError::unavailable(self.name(), format!("GET {} returned HTTP {}", url, code)));
      }
      Err(ureq::Error::Transport(t)) => {
        return Err(EnrError::unavailable(self.name(), format!("GET {} failed: {}", url, t)));
      }
    };

    // whole body, no size cap
    let mut buf: Vec<u8> = Vec::new();
    resp
      .into_reader()
      .read_to_end(&mut buf)
      .map_err(|e| EnrError::unavailable(self.name(), format!("reading body from {}: {}", url, e)))?;
    let body = decode_text(&buf, &url);
    info!(%url, year, bytes = body.len(), "downloaded enrollment file");

    Ok(body)
  }
}
