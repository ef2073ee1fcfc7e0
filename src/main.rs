use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod diagnostics;
mod exec;
mod gpus;
mod model;
mod render;
mod timing;

pub type Result<T> = anyhow::Result<T>;

/// Exit status for a missing argument or an unusable directory, including one
/// that cannot be listed after passing the existence check.
const EXIT_USAGE: u8 = 1;

/// Exit status when the data was collected but the report could not be written.
const EXIT_WRITE_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "bench-timings", version)]
#[command(about = "Summarize benchmark durations per GPU count", long_about = None)]
struct Cli {
    /// Directory holding the *.sqlite3 result files; the report is written here.
    dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help / --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if !cli.dir.is_dir() {
        diagnostics::error(format!("directory does not exist: {}", cli.dir.display()));
        return ExitCode::from(EXIT_USAGE);
    }

    run(&cli.dir)
}

fn run(dir: &Path) -> ExitCode {
    diagnostics::info(format!("Processing result files in: {}", dir.display()));
    diagnostics::info(format!("Reading table: {}\n", exec::EXEC_INFO_TABLE));

    // 1) Collect durations per GPU count.
    let (timings, summary) = match model::collect_timings(dir) {
        Ok(v) => v,
        // Directory vanished or became unreadable since the check in main.
        Err(e) => {
            diagnostics::error(diagnostics::error_message(&e));
            return ExitCode::from(EXIT_USAGE);
        }
    };

    diagnostics::info(format!(
        "\nScanned {}: {} files, {} used, {} skipped.",
        dir.display(),
        summary.candidates,
        summary.used,
        summary.skipped
    ));

    if timings.is_empty() {
        diagnostics::info(format!(
            "Finished processing {}: no valid data, no report written.",
            dir.display()
        ));
        return ExitCode::SUCCESS;
    }

    for (gpus, values) in &timings {
        diagnostics::info(format!("  {} GPUs: {} runs", gpus, values.len()));
    }

    // 2) Sample and write the report.
    match render::write_report(dir, &timings) {
        Ok(path) => {
            diagnostics::info(format!("Results saved to: {}", path.display()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            diagnostics::error(format!(
                "could not write the report in {}: {}",
                dir.display(),
                diagnostics::error_message(&e)
            ));
            ExitCode::from(EXIT_WRITE_FAILED)
        }
    }
}
