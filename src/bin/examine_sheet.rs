use clap::Parser;
use std::path::PathBuf;

use stream_gauge_service::importers::sheet_parser::{is_measurement_sheet, split_sheet};
use stream_gauge_service::importers::workbook::{open_workbook_file, WorkbookSource};
use stream_gauge_service::measurement::build_from_tables;
use stream_gauge_service::measurement::schema::{cell_text, is_blank, METADATA_SCHEMA};

#[derive(Parser)]
#[command(name = "examine-sheet")]
#[command(about = "Dump the metadata block and flow table of a gauging sheet", long_about = None)]
struct Cli {
    /// Path to the workbook
    #[arg(long)]
    file: PathBuf,

    /// Sheet to examine; lists sheets when omitted
    #[arg(long)]
    sheet: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("Opening workbook: {}", cli.file.display());
    let mut workbook = open_workbook_file(&cli.file)?;

    println!("\nSheet names:");
    for (i, name) in workbook.sheet_names().iter().enumerate() {
        let marker = if is_measurement_sheet(name) { "" } else { " (ignored)" };
        println!("  {i}: {name}{marker}");
    }

    let Some(sheet_name) = cli.sheet else {
        return Ok(());
    };

    println!("\n\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let range = workbook.sheet_range(&sheet_name)?;
    println!("Used range: {:?} to {:?}", range.start(), range.end());

    let tables = split_sheet(&sheet_name, &range);

    println!("\nMetadata block (non-empty cells):");
    println!("{}", "=".repeat(100));
    for row in 0..tables.metadata.height() {
        for col in 0..tables.metadata.width() {
            let Some(cell) = tables.metadata.get(row, col) else {
                continue;
            };
            if is_blank(cell) {
                continue;
            }
            let fields: Vec<&str> = METADATA_SCHEMA
                .iter()
                .filter(|loc| {
                    (loc.primary.row, loc.primary.col) == (row, col)
                        || loc.fallback.map(|f| (f.row, f.col)) == Some((row, col))
                })
                .map(|loc| loc.field.name())
                .collect();
            let label = if fields.is_empty() {
                String::new()
            } else {
                format!("  <- {}", fields.join(", "))
            };
            println!(
                "  ({row:2},{col:2}) [{}]{label}",
                cell_text(cell).unwrap_or_else(|| cell.to_string())
            );
        }
    }

    println!("\nResolved fields:");
    for location in METADATA_SCHEMA.iter() {
        let value = location
            .resolve(&tables.metadata)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "[blank]".to_string());
        println!("  {:<12} {}", location.field.name(), value);
    }

    println!("\nFlow table headers: {:?}", tables.flow.headers());
    println!("Flow rows: {}", tables.flow.rows().len());
    for (i, row) in tables.flow.rows().iter().enumerate().take(10) {
        let cells: Vec<String> = row.iter().map(|c| format!("[{c}]")).collect();
        println!("  Row {:3}: {}", i + 1, cells.join(" "));
    }

    println!("\n{}", "=".repeat(100));
    match build_from_tables(&tables) {
        Ok(m) => println!(
            "Measurement: site {} on {}, discharge {:.2} cfs over {:.2} sq ft",
            m.site_code, m.date, m.discharge_cfs, m.area_sqft
        ),
        Err(e) => println!("Sheet would be skipped: {e}"),
    }

    Ok(())
}
