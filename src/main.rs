use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mdschooldata::model::{ENROLLMENT_COLUMNS, TIDY_COLUMNS};
use mdschooldata::{cache_status, clear_cache, enr_grade_aggs, tidy_enr, Enrollment, Settings};

mod cli;
mod util;

use crate::cli::{CacheAction, Cli, Command, EffectiveConfig, Format, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // logs go to stderr so stdout stays machine-readable
  let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  let _ = fmt().with_env_filter(env).with_writer(std::io::stderr).try_init();

  // Phase 1: normalize CLI over environment settings
  let env_settings = Settings::from_env().context("reading MDSCHOOLDATA_* environment")?;
  let cfg = normalize(cli, env_settings)?;

  // Phase 2: dispatch
  run(&cfg)
}

fn run(cfg: &EffectiveConfig) -> Result<()> {
  match &cfg.command {
    Command::Years => {
      let acc = Enrollment::from_settings(&cfg.settings)?;
      let years: Vec<i32> = acc.available_years()?.into_iter().collect();
      util::write_output("-", &util::to_json_bytes(&years)?)
    }
    Command::Enr { year, tidy, grade_aggs, format, out } => {
      let acc = Enrollment::from_settings(&cfg.settings)?;
      let records = match year.as_slice() {
        [] => acc.fetch(None)?,
        [one] => acc.fetch(Some(*one))?,
        many => acc.fetch_multi(many)?,
      };

      let bytes = if *tidy {
        let mut rows = tidy_enr(&records);
        if *grade_aggs {
          let aggs = enr_grade_aggs(&rows);
          rows.extend(aggs);
        }
        match format {
          Format::Json => util::to_json_bytes(&rows)?,
          Format::Csv => util::to_csv_bytes(&rows, &TIDY_COLUMNS)?,
        }
      } else {
        match format {
          Format::Json => util::to_json_bytes(&records)?,
          Format::Csv => util::to_csv_bytes(&records, &ENROLLMENT_COLUMNS)?,
        }
      };

      util::write_output(out, &bytes)
    }
    Command::Cache { action: CacheAction::Status } => {
      let entries = cache_status(&cfg.settings)?;
      util::write_output("-", &util::to_json_bytes(&entries)?)
    }
    Command::Cache { action: CacheAction::Clear { year } } => {
      let removed = clear_cache(&cfg.settings, *year)?;
      util::write_output("-", &util::to_json_bytes(&serde_json::json!({ "removed": removed }))?)
    }
  }
}
