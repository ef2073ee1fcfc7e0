//! Aggregation model: scan a results directory and group execution durations
//! by GPU count.

use crate::Result;
use crate::diagnostics;
use crate::exec::{self, EXEC_INFO_TABLE, RequiredFields};
use crate::gpus::{GpuParser, GpusError};
use crate::timing;

use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of the per-execution result files.
pub const RESULT_EXTENSION: &str = ".sqlite3";

/// GPU count -> durations in seconds, in processing order.
pub type GpuTimings = BTreeMap<u32, Vec<f64>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub candidates: usize,
    pub used: usize,
    pub skipped: usize,
}

/// Why a result file contributed nothing.
#[derive(Debug)]
enum Skip {
    NoTable,
    Incomplete(exec::MissingFields),
    Gpus(GpusError),
    Format(anyhow::Error),
    Negative(f64),
    Failed(anyhow::Error),
}

/// A usable execution: its group and its duration.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    gpus: u32,
    seconds: f64,
}

/// Scan `dir` for result files and group their durations by GPU count.
///
/// A file that cannot be used is reported and skipped; only failing to list
/// `dir` itself is an error.
pub fn collect_timings(dir: &Path) -> Result<(GpuTimings, ScanSummary)> {
    let parser = GpuParser::new()?;
    let files = result_files(dir)?;

    let mut timings = GpuTimings::new();
    let mut summary = ScanSummary {
        candidates: files.len(),
        ..ScanSummary::default()
    };

    for path in &files {
        let name = file_name(path);
        match process_file(&parser, path) {
            Ok(sample) => {
                timings.entry(sample.gpus).or_default().push(sample.seconds);
                summary.used += 1;
            }
            Err(skip) => {
                report_skip(&name, skip);
                summary.skipped += 1;
            }
        }
    }

    Ok((timings, summary))
}

/// Regular files in `dir` whose name ends with the result extension, sorted by
/// name so that repeated runs visit them in the same order.
fn result_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("list directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list directory {}", dir.display()))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && entry.file_name().to_string_lossy().ends_with(RESULT_EXTENSION) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn process_file(parser: &GpuParser, path: &Path) -> std::result::Result<Sample, Skip> {
    let info = match exec::read_exec_info(path) {
        Ok(Some(info)) => info,
        Ok(None) => return Err(Skip::NoTable),
        Err(e) => return Err(Skip::Failed(e)),
    };

    let RequiredFields {
        command,
        start_time,
        end_time,
    } = info.required().map_err(Skip::Incomplete)?;

    let gpus = parser.find(command).map_err(Skip::Gpus)?.count();

    let start = timing::parse_timestamp(start_time).map_err(Skip::Format)?;
    let end = timing::parse_timestamp(end_time).map_err(Skip::Format)?;
    let seconds = timing::elapsed_seconds(start, end).map_err(Skip::Failed)?;

    if seconds < 0.0 {
        return Err(Skip::Negative(seconds));
    }

    Ok(Sample { gpus, seconds })
}

fn report_skip(name: &str, skip: Skip) {
    match skip {
        Skip::NoTable => diagnostics::file_error(format!(
            "table '{}' does not exist in '{}'. Skipping file.",
            EXEC_INFO_TABLE, name
        )),
        Skip::Incomplete(missing) => diagnostics::file_warn(format!(
            "incomplete data in '{}' ({}). Skipping.",
            name, missing
        )),
        Skip::Gpus(e) => diagnostics::file_warn(format!("{} in '{}'. Skipping.", e, name)),
        Skip::Format(e) => diagnostics::file_error(format!(
            "FORMAT ERROR in '{}': {}. Skipping.",
            name,
            diagnostics::error_message(&e)
        )),
        Skip::Negative(seconds) => diagnostics::file_warn(format!(
            "negative time detected ({}s) in '{}'. IGNORED.",
            seconds, name
        )),
        Skip::Failed(e) => diagnostics::file_error(format!(
            "failed to process '{}': {}",
            name,
            diagnostics::error_message(&e)
        )),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rusqlite::{Connection, params};
    use tempfile::TempDir;

    fn write_run(dir: &Path, name: &str, props: &[(&str, &str)]) {
        let conn = Connection::open(dir.join(name)).unwrap();
        conn.execute_batch("CREATE TABLE exec_info (Property TEXT, Value TEXT);")
            .unwrap();
        for (k, v) in props {
            conn.execute(
                "INSERT INTO exec_info (Property, Value) VALUES (?1, ?2)",
                params![k, v],
            )
            .unwrap();
        }
    }

    fn run(dir: &Path, name: &str, command: &str, start: &str, end: &str) {
        write_run(
            dir,
            name,
            &[("Command", command), ("Start Time", start), ("End Time", end)],
        );
    }

    #[test]
    fn groups_by_last_gpu() {
        let dir = TempDir::new().unwrap();
        run(
            dir.path(),
            "a.sqlite3",
            "mgpusim -gpus=0,1,3",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:00:02.000000",
        );
        run(
            dir.path(),
            "b.sqlite3",
            "mgpusim -gpus=3",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:00:00.250000",
        );
        run(
            dir.path(),
            "c.sqlite3",
            "mgpusim -gpus=1",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:01:00.000000",
        );

        let (timings, summary) = collect_timings(dir.path()).unwrap();
        assert_eq!(timings.get(&3), Some(&vec![2.0, 0.25]));
        assert_eq!(timings.get(&1), Some(&vec![60.0]));
        assert_eq!(timings.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(
            summary,
            ScanSummary {
                candidates: 3,
                used: 3,
                skipped: 0
            }
        );
    }

    #[test]
    fn bad_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let p = dir.path();
        run(
            p,
            "ok.sqlite3",
            "mgpusim -gpus=2",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:00:01.500000",
        );
        // no exec_info table
        Connection::open(p.join("empty.sqlite3"))
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();
        // no -gpus=
        run(
            p,
            "nogpus.sqlite3",
            "mgpusim -timing",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:00:01.000000",
        );
        // negative
        run(
            p,
            "negative.sqlite3",
            "mgpusim -gpus=2",
            "2024-01-01 00:00:05.000000",
            "2024-01-01 00:00:01.000000",
        );
        // unparseable timestamp
        run(
            p,
            "format.sqlite3",
            "mgpusim -gpus=2",
            "01/01/2024 00:00",
            "2024-01-01 00:00:01.000000",
        );
        // incomplete
        write_run(p, "partial.sqlite3", &[("Command", "mgpusim -gpus=2")]);
        // not a database
        fs::write(p.join("junk.sqlite3"), "junk\n".repeat(200)).unwrap();

        let (timings, summary) = collect_timings(p).unwrap();
        assert_eq!(timings.len(), 1);
        assert_eq!(timings.get(&2), Some(&vec![1.5]));
        assert_eq!(
            summary,
            ScanSummary {
                candidates: 7,
                used: 1,
                skipped: 6
            }
        );
    }

    #[test]
    fn other_extensions_are_ignored() {
        let dir = TempDir::new().unwrap();
        run(
            dir.path(),
            "run.sqlite",
            "mgpusim -gpus=2",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:00:01.000000",
        );
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("nested.sqlite3")).unwrap();

        let (timings, summary) = collect_timings(dir.path()).unwrap();
        assert!(timings.is_empty());
        assert_eq!(summary, ScanSummary::default());
    }

    #[test]
    fn whole_second_timestamps_are_skipped() {
        let dir = TempDir::new().unwrap();
        run(
            dir.path(),
            "coarse.sqlite3",
            "mgpusim -gpus=2",
            "2024-01-01 00:00:00",
            "2024-01-01 00:00:05",
        );
        run(
            dir.path(),
            "fine.sqlite3",
            "mgpusim -gpus=2",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:00:05.000000",
        );

        let (timings, summary) = collect_timings(dir.path()).unwrap();
        assert_eq!(timings.get(&2), Some(&vec![5.0]));
        assert_eq!(summary.used, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn zero_duration_is_kept() {
        let dir = TempDir::new().unwrap();
        run(
            dir.path(),
            "same.sqlite3",
            "mgpusim -gpus=4",
            "2024-01-01 00:00:00.000000",
            "2024-01-01 00:00:00.000000",
        );
        let (timings, _) = collect_timings(dir.path()).unwrap();
        assert_eq!(timings.get(&4), Some(&vec![0.0]));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(collect_timings(&dir.path().join("nope")).is_err());
    }
}
