use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use stream_gauge_service::importers::WorkbookDownloader;
use stream_gauge_service::services::ingest_service::{
    ingest_workbook_bytes, ingest_workbook_file, spreadsheet_files, IngestReport,
};
use stream_gauge_service::services::measurement_service::select;
use stream_gauge_service::services::{Selection, StatisticsRow, StatisticsTable, Trend};
use stream_gauge_service::utils::{date_label, split_list};

#[derive(Parser)]
#[command(name = "ingest-workbook")]
#[command(about = "Ingest stream gauging workbooks and print summary statistics", long_about = None)]
struct Cli {
    /// Path to a single workbook (takes precedence over --dir and --url)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Folder of workbooks; every spreadsheet directly inside is ingested
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Download the workbook from this export URL
    #[arg(long, env = "WORKBOOK_URL")]
    url: Option<String>,

    /// Only report this site code
    #[arg(long)]
    site: Option<String>,

    /// Only report these dates (comma separated, YYYY/MM/DD)
    #[arg(long)]
    dates: Option<String>,

    /// Also list every skipped sheet
    #[arg(long)]
    show_failures: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let started = Instant::now();

    let report = if let Some(file) = cli.file.clone() {
        tokio::task::spawn_blocking(move || ingest_workbook_file(file)).await??
    } else if let Some(dir) = cli.dir.clone() {
        tokio::task::spawn_blocking(move || ingest_dir_with_progress(dir)).await??
    } else if let Some(url) = cli.url.clone() {
        let downloader = WorkbookDownloader::new(url.clone());
        let bytes = downloader.download().await?;
        info!("Downloaded {} bytes", bytes.len());
        tokio::task::spawn_blocking(move || ingest_workbook_bytes(&url, bytes)).await??
    } else {
        return Err("one of --file, --dir or --url (WORKBOOK_URL) is required".into());
    };

    let selection = Selection {
        site: cli.site.clone(),
        dates: cli.dates.as_deref().map(split_list).unwrap_or_default(),
    };
    let selected = select(&report.measurements, &selection);
    let table = StatisticsTable::from_measurements(&selected);

    println!(
        "\nIngested {} measurements across {} sites in {:.2?} ({} sheets skipped)",
        report.measurements.len(),
        report.sites.len(),
        started.elapsed(),
        report.failures.len()
    );
    println!("Sites: {}", report.sites.join(", "));
    println!(
        "Dates: {}",
        report
            .dates
            .iter()
            .map(|d| date_label(*d))
            .collect::<Vec<_>>()
            .join(", ")
    );

    print_table(&table);

    if cli.show_failures && !report.failures.is_empty() {
        println!("\nSkipped sheets:");
        for failure in &report.failures {
            println!(
                "  {} / {} [{}]: {}",
                failure.workbook, failure.sheet, failure.kind, failure.message
            );
        }
    }

    Ok(())
}

fn ingest_dir_with_progress(
    dir: PathBuf,
) -> Result<IngestReport, stream_gauge_service::services::IngestError> {
    let files = spreadsheet_files(&dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }

    let mut reports = Vec::with_capacity(files.len());
    for path in &files {
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        match ingest_workbook_file(path) {
            Ok(report) => reports.push(report),
            Err(e) => warn!("Skipping workbook: {}", e),
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("✓ Read {} workbooks", reports.len()));

    Ok(IngestReport::merge(reports))
}

fn print_table(table: &StatisticsTable) {
    if table.rows.is_empty() {
        println!("\nNo measurements match the selection");
        return;
    }

    println!();
    println!(
        "{:<12} {:<12} {:>16} {:>16} {:>22} {:>24}",
        table.columns[0],
        table.columns[1],
        table.columns[2],
        table.columns[3],
        table.columns[4],
        table.columns[5]
    );
    println!("{}", "=".repeat(107));

    for row in &table.rows {
        println!("{}", format_row(row));
    }
}

fn format_row(row: &StatisticsRow) -> String {
    let trends = row.trends();
    let mark = |value: f64, trend: Option<Trend>| match trend {
        Some(trend) => format!("{} {:.2}", arrow(trend), value),
        None => format!("{value:.2}"),
    };

    let avg_depth = match row.avg_depth_ft {
        Some(value) => mark(value, trends.and_then(|t| t.avg_depth)),
        None => "-".to_string(),
    };

    format!(
        "{:<12} {:<12} {:>16} {:>16} {:>22} {:>24}",
        if row.is_delta { "  Δ" } else { row.location.as_str() },
        date_label(row.date),
        mark(row.max_depth_ft, trends.map(|t| t.max_depth)),
        avg_depth,
        mark(row.total_discharge_cfs, trends.map(|t| t.total_discharge)),
        mark(row.average_velocity_fps, trends.map(|t| t.average_velocity)),
    )
}

fn arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Increase => "▲",
        Trend::Decrease => "▼",
        Trend::Unchanged => "=",
    }
}
