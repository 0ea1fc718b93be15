//! Rendering of summaries, sample reports and file exports.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use corrsim_engine::accumulate::PathEnsemble;
use corrsim_engine::summary::{PercentileTable, SummaryTable};

use crate::config::OutputFormat;
use crate::pipeline::{SampleReport, ScenarioRun};
use crate::{CliError, Result};

/// Table rows are shown once per this many steps, plus the last step.
const TABLE_STRIDE: usize = 12;

#[derive(Serialize)]
struct SummaryDocument<'a> {
    dates: &'a [NaiveDate],
    #[serde(flatten)]
    summary: &'a SummaryTable,
}

fn level_labels(levels: &[f64]) -> Vec<String> {
    levels.iter().map(|level| format!("p{}", level)).collect()
}

fn table_steps(steps: usize) -> Vec<usize> {
    let mut rows: Vec<usize> = (TABLE_STRIDE - 1..steps).step_by(TABLE_STRIDE).collect();
    if steps > 0 && rows.last() != Some(&(steps - 1)) {
        rows.push(steps - 1);
    }
    rows
}

fn date_label(dates: &[NaiveDate], step: usize) -> String {
    dates
        .get(step)
        .map_or_else(|| format!("step {}", step + 1), NaiveDate::to_string)
}

fn write_percentile_table<W: Write>(
    out: &mut W,
    title: &str,
    table: &PercentileTable,
    dates: &[NaiveDate],
) -> Result<()> {
    let labels = level_labels(table.levels());
    let rule = format!("├{}┤", vec!["─".repeat(14); labels.len() + 1].join("┼"));

    writeln!(out, "\n{}", title)?;
    writeln!(out, "┌{}┐", vec!["─".repeat(14); labels.len() + 1].join("┬"))?;
    write!(out, "│ {:<12} ", "Date")?;
    for label in &labels {
        write!(out, "│ {:>12} ", label)?;
    }
    writeln!(out, "│")?;
    writeln!(out, "{}", rule)?;
    for step in table_steps(table.steps()) {
        write!(out, "│ {:<12} ", date_label(dates, step))?;
        for value in table.row(step) {
            write!(out, "│ {:>12.2} ", value)?;
        }
        writeln!(out, "│")?;
    }
    writeln!(out, "└{}┘", vec!["─".repeat(14); labels.len() + 1].join("┴"))?;
    Ok(())
}

fn write_summary_table<W: Write>(out: &mut W, run: &ScenarioRun) -> Result<()> {
    let summary = &run.summary;
    writeln!(
        out,
        "{} paths x {} steps{}",
        summary.paths,
        summary.steps,
        run.ensemble
            .seed()
            .map_or_else(String::new, |seed| format!(" (seed {})", seed))
    )?;

    write_percentile_table(out, "Nominal balance", &summary.nominal, &run.dates)?;
    writeln!(out, "Mean terminal balance: {:.2}", summary.terminal_mean)?;

    if let Some(pv) = &summary.present_value {
        write_percentile_table(out, "Present value", pv, &run.dates)?;
    }
    if let Some(mean) = summary.terminal_present_value_mean {
        writeln!(out, "Mean terminal present value: {:.2}", mean)?;
    }
    Ok(())
}

fn write_summary_csv<W: Write>(out: W, run: &ScenarioRun) -> Result<()> {
    let summary = &run.summary;
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["date".to_string(), "series".to_string()];
    header.extend(level_labels(&summary.levels));
    writer.write_record(&header)?;

    let mut series = vec![("nominal", &summary.nominal)];
    if let Some(pv) = &summary.present_value {
        series.push(("present_value", pv));
    }
    for (name, table) in series {
        for step in 0..table.steps() {
            let mut record = vec![date_label(&run.dates, step), name.to_string()];
            record.extend(table.row(step).iter().map(f64::to_string));
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes a run summary in the requested format.
pub fn write_summary<W: Write>(mut out: W, run: &ScenarioRun, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => write_summary_table(&mut out, run),
        OutputFormat::Json => {
            let document = SummaryDocument {
                dates: &run.dates,
                summary: &run.summary,
            };
            serde_json::to_writer_pretty(&mut out, &document)?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Csv => write_summary_csv(out, run),
    }
}

/// Writes up to `max_paths` trajectories as long-format CSV
/// (`date,simulation,value`).
pub fn write_trajectories<W: Write>(
    out: W,
    ensemble: &PathEnsemble,
    dates: &[NaiveDate],
    max_paths: usize,
) -> Result<()> {
    if dates.len() != ensemble.steps() {
        return Err(CliError::InvalidArgument(format!(
            "{} dates for {} steps",
            dates.len(),
            ensemble.steps()
        )));
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["date", "simulation", "value"])?;
    for (simulation, path) in ensemble.trajectories(max_paths).iter().enumerate() {
        for (date, value) in dates.iter().zip(path) {
            writer.write_record([date.to_string(), simulation.to_string(), value.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes density grids as CSV (`column,x,density`).
pub fn write_densities<W: Write>(out: W, grids: &[(usize, Vec<(f64, f64)>)]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["column", "x", "density"])?;
    for (column, grid) in grids {
        for (x, density) in grid {
            writer.write_record([column.to_string(), x.to_string(), density.to_string()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_matrix<W: Write>(out: &mut W, title: &str, values: &[f64], dim: usize) -> Result<()> {
    writeln!(out, "{}", title)?;
    for row in values.chunks(dim.max(1)) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>8.4}", v)).collect();
        writeln!(out, "  {}", cells.join(" "))?;
    }
    Ok(())
}

/// Writes a sample report in the requested format.
pub fn write_sample_report<W: Write>(
    mut out: W,
    report: &SampleReport,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{} paths, dimension {}", report.paths, report.dimension)?;
            write_matrix(&mut out, "Target correlation", &report.target, report.dimension)?;
            write_matrix(&mut out, "Spearman (uniforms)", &report.spearman, report.dimension)?;
            if !report.pearson.is_empty() {
                write_matrix(&mut out, "Pearson (columns)", &report.pearson, report.columns.len())?;
            }

            writeln!(out, "KS uniformity (critical value {:.4})", report.ks_critical_value)?;
            for (j, d) in report.ks_statistics.iter().enumerate() {
                let verdict = if *d > report.ks_critical_value { "REJECT" } else { "ok" };
                writeln!(out, "  u{}: {:.4} {}", j, d, verdict)?;
            }

            if !report.columns.is_empty() {
                writeln!(out, "Columns")?;
            }
            for column in &report.columns {
                write!(
                    out,
                    "  {} {:<20} mean {:>12.4} min {:>12.4} max {:>12.4}",
                    column.column, column.kind, column.mean, column.min, column.max
                )?;
                match column.zero_fraction {
                    Some(zeros) => writeln!(out, " zeros {:.4}", zeros)?,
                    None => writeln!(out)?,
                }
            }
            Ok(())
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(["column", "kind", "mean", "min", "max", "zero_fraction"])?;
            for column in &report.columns {
                writer.write_record([
                    column.column.to_string(),
                    column.kind.clone(),
                    column.mean.to_string(),
                    column.min.to_string(),
                    column.max.to_string(),
                    column
                        .zero_fraction
                        .map_or_else(String::new, |z| z.to_string()),
                ])?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}
