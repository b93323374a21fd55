use crate::infra::ConfiguredStore;
use campus_analytics::config::AppConfig;
use campus_analytics::error::AppError;
use campus_analytics::statistics::{self, Dashboard, PanelOutcome, ReportKind, ReportRows};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum DashboardFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Report name as listed by `catalogue`, e.g. topCourses
    pub(crate) name: String,
    /// Row cap for ranked reports; zero or negative falls back to the default
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) limit: Option<i64>,
    /// JSON record file or CSV directory (overrides APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// JSON record file or CSV directory (overrides APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = DashboardFormat::Table)]
    pub(crate) format: DashboardFormat,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let store = ConfiguredStore::open(records_path(args.data)?)?;
    let rows = statistics::run_report(&store, &args.name, args.limit)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_rows(&rows, args.format, &mut out)?;
    out.flush()?;
    Ok(())
}

pub(crate) fn run_catalogue() -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_catalogue(&mut out)?;
    out.flush()?;
    Ok(())
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let store = ConfiguredStore::open(records_path(args.data)?)?;
    let dashboard = Dashboard::collect(&store);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_dashboard(&dashboard, args.format, &mut out)?;
    out.flush()?;

    if let Some(summary) = failure_summary(&dashboard) {
        writeln!(io::stderr(), "{summary}")?;
    }
    Ok(())
}

fn failure_summary(dashboard: &Dashboard) -> Option<String> {
    let failed: Vec<&str> = dashboard
        .failed()
        .map(|panel| panel.report.name())
        .collect();
    if failed.is_empty() {
        return None;
    }
    Some(format!(
        "{} of {} reports failed: {}",
        failed.len(),
        dashboard.panels.len(),
        failed.join(", ")
    ))
}

/// `--data` wins over `APP_DATA_PATH`; neither selects the demo dataset.
fn records_path(flag: Option<PathBuf>) -> Result<Option<PathBuf>, AppError> {
    match flag {
        Some(path) => Ok(Some(path)),
        None => Ok(AppConfig::load()?.data.records_path),
    }
}

pub(crate) fn render_rows<W: Write>(
    rows: &ReportRows,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => out.write_all(&csv_bytes(rows)?)?,
        OutputFormat::Table => write_table(rows, out)?,
    }
    Ok(())
}

pub(crate) fn render_dashboard<W: Write>(
    dashboard: &Dashboard,
    format: DashboardFormat,
    out: &mut W,
) -> Result<(), AppError> {
    match format {
        DashboardFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, dashboard)?;
            writeln!(out)?;
        }
        DashboardFormat::Table => {
            for panel in &dashboard.panels {
                writeln!(out, "== {} ({}) ==", panel.title, panel.report)?;
                match &panel.outcome {
                    PanelOutcome::Ready { rows } => write_table(rows, out)?,
                    PanelOutcome::Failed { error } => writeln!(out, "unavailable: {error}")?,
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn write_catalogue<W: Write>(out: &mut W) -> io::Result<()> {
    for kind in ReportKind::ordered() {
        let limit = if kind.accepts_limit() { "  [--limit]" } else { "" };
        writeln!(out, "{:<22} {}{}", kind.name(), kind.title(), limit)?;
    }
    Ok(())
}

fn csv_bytes(rows: &ReportRows) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    match rows {
        ReportRows::StudentsByYear(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::StudentsByMajor(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::StudentsByGender(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::TopCourses(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::EnrollmentsByCategory(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::GpaByMajor(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::GradeDistribution(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::CourseSuccessRates(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::EnrollmentStatus(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::TopInstructors(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::EnrollmentTrends(rows) => serialize_rows(&mut writer, rows)?,
        ReportRows::ClassSize(rows) => serialize_rows(&mut writer, rows)?,
    }
    writer
        .into_inner()
        .map_err(|err| AppError::Render(err.to_string()))
}

fn serialize_rows<T: Serialize>(
    writer: &mut csv::Writer<Vec<u8>>,
    rows: &[T],
) -> Result<(), csv::Error> {
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(())
}

/// Left-aligned columns built from the CSV rendering of the rows.
fn write_table<W: Write>(rows: &ReportRows, out: &mut W) -> Result<(), AppError> {
    if rows.is_empty() {
        writeln!(out, "(no rows)")?;
        return Ok(());
    }

    let bytes = csv_bytes(rows)?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let header = reader.headers()?.clone();
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;

    let widths: Vec<usize> = (0..header.len())
        .map(|column| {
            records
                .iter()
                .filter_map(|record| record.get(column))
                .chain(header.get(column))
                .map(str::len)
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_line(out, header.iter(), &widths)?;
    let rule: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
    write_line(out, rule.iter().map(String::as_str), &widths)?;
    for record in &records {
        write_line(out, record.iter(), &widths)?;
    }
    Ok(())
}

fn write_line<'a, W: Write>(
    out: &mut W,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> io::Result<()> {
    let line = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}
