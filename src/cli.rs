use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use mdschooldata::config::{validate_template, Settings, SourceSettings};
use mdschooldata::years;

use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "mdschooldata",
    version,
    about = "Fetch Maryland public school enrollment data by school year",
    long_about = None
)]
pub struct Cli {
  /// Read enrollment_<year>.csv files from this directory instead of downloading
  #[arg(long, global = true)]
  pub data_dir: Option<PathBuf>,

  /// Download URL template; "{year}" is replaced by the school year (ending)
  #[arg(long, global = true)]
  pub url_template: Option<String>,

  /// Directory for downloaded files (default: $TMPDIR/mdschooldata)
  #[arg(long, global = true)]
  pub cache_dir: Option<PathBuf>,

  /// Always download; neither read nor write the on-disk cache
  #[arg(long, global = true)]
  pub no_cache: bool,

  /// HTTP timeout in seconds
  #[arg(long, global = true)]
  pub timeout_secs: Option<u64>,

  /// Override the published year table, e.g. "2015-2024" or "2019,2021"
  #[arg(long, global = true)]
  pub years: Option<String>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
  /// List the school years (ending year) with enrollment data
  Years,

  /// Fetch enrollment records
  Enr {
    /// School year (ending), repeatable; default: most recent year
    #[arg(long = "year")]
    year: Vec<i32>,

    /// Long format: one row per entity, grade level and subgroup
    #[arg(long)]
    tidy: bool,

    /// Append K8/HS/K12 grade-band totals (implies --tidy)
    #[arg(long)]
    grade_aggs: bool,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Output file (default stdout "-")
    #[arg(long, default_value = "-")]
    out: String,
  },

  /// Inspect or clear the on-disk download cache
  Cache {
    #[command(subcommand)]
    action: CacheAction,
  },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheAction {
  /// List cached years
  Status,
  /// Remove cached files
  Clear {
    /// Only this school year (ending)
    #[arg(long)]
    year: Option<i32>,
  },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Json,
  Csv,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub settings: Settings,
  pub command: Command,
}

/// Merge CLI flags over environment-derived settings.
pub fn normalize(cli: Cli, env: Settings) -> Result<EffectiveConfig> {
  let Some(command) = cli.command else {
    bail!("Provide a command: years, enr, or cache (see --help)")
  };

  if cli.data_dir.is_some() && cli.url_template.is_some() {
    bail!("Ambiguous source: choose only one of --data-dir | --url-template");
  }

  let mut settings = env;

  if let Some(t) = &cli.url_template {
    settings.source = SourceSettings::Http {
      url_template: validate_template(t)?,
    };
  }
  if let Some(dir) = &cli.data_dir {
    settings.source = SourceSettings::Dir {
      path: PathBuf::from(util::canonicalize_lossy(dir)),
    };
  }
  if let Some(dir) = cli.cache_dir {
    settings.cache_dir = dir;
  }
  if cli.no_cache {
    settings.use_cache = false;
  }
  if let Some(secs) = cli.timeout_secs {
    settings.timeout = Duration::from_secs(secs);
  }
  if let Some(list) = &cli.years {
    settings.years_override = Some(years::parse_year_list(list)?);
  }

  let command = match command {
    Command::Enr { year, tidy, grade_aggs, format, out } => Command::Enr {
      year,
      tidy: tidy || grade_aggs,
      grade_aggs,
      format,
      out,
    },
    other => other,
  };

  Ok(EffectiveConfig { settings, command })
}
