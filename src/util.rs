// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: CLI helpers for paths, output writing (JSON/CSV to stdout or file), and man page rendering
// role: utilities/helpers
// inputs: Serializable rows; output target ("-" for stdout); clap CommandFactory
// outputs: Canonicalized paths, written files, man page text
// side_effects: write_output creates parent directories and files
// invariants:
// - "-" always means stdout
// - CSV output has a header row even when there are no rows
// errors: IO errors bubble with the output path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::CommandFactory;
use serde::Serialize;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Serialize rows as pretty JSON.
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
  let mut buf = serde_json::to_vec_pretty(value)?;
  buf.push(b'\n');
  Ok(buf)
}

/// Serialize rows as CSV using the struct field names as the header.
pub fn to_csv_bytes<T: Serialize>(rows: &[T], header: &[&str]) -> Result<Vec<u8>> {
  let mut wtr = csv::Writer::from_writer(Vec::new());

  if rows.is_empty() {
    wtr.write_record(header)?;
  }
  for r in rows {
    wtr.serialize(r)?;
  }

  wtr.into_inner().context("flushing CSV output")
}

/// Write bytes to stdout when `out` is "-", otherwise to the file at `out`.
pub fn write_output(out: &str, bytes: &[u8]) -> Result<()> {
  if out == "-" {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(bytes)?;
    lock.flush()?;
    return Ok(());
  }

  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
