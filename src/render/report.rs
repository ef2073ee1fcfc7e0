use crate::Result;
use crate::model::GpuTimings;

use anyhow::Context;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_FILE_NAME: &str = "resultados_benchmark.csv";

/// Duration columns per row; larger groups are sampled down to this.
pub const MAX_SAMPLES: usize = 10;

/// Up to `MAX_SAMPLES` values, drawn uniformly without replacement when the
/// group is larger. Smaller groups are returned whole, in stored order.
pub fn sample_durations<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> Vec<f64> {
    if values.len() > MAX_SAMPLES {
        values.choose_multiple(rng, MAX_SAMPLES).copied().collect()
    } else {
        values.to_vec()
    }
}

/// Six decimals with a comma separator: `12.5` -> `12,500000`.
pub fn format_seconds(v: f64) -> String {
    format!("{:.6}", v).replace('.', ",")
}

fn header() -> Vec<String> {
    let mut cols = vec!["GPUs".to_string()];
    cols.extend((1..=MAX_SAMPLES).map(|i| format!("Tiempo_{} (s)", i)));
    cols
}

/// Render the report: header, then one row per GPU count in ascending order.
/// Rows are not padded, so a group with fewer than `MAX_SAMPLES` values has
/// fewer fields.
pub fn render_report<R: Rng + ?Sized>(timings: &GpuTimings, rng: &mut R) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    wtr.write_record(header())?;
    for (gpus, values) in timings {
        let mut row = vec![gpus.to_string()];
        row.extend(sample_durations(values, rng).into_iter().map(format_seconds));
        wtr.write_record(&row)?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Render with a fresh thread RNG and write `<dir>/resultados_benchmark.csv`.
pub fn write_report(dir: &Path, timings: &GpuTimings) -> Result<PathBuf> {
    let text = render_report(timings, &mut rand::rng())
        .with_context(|| format!("render report for {}", dir.display()))?;
    let path = dir.join(REPORT_FILE_NAME);
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
