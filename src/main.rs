use anyhow::{Context, Result};
use meteorite_regions::{
    cli::{Cli, Commands},
    download::{read_snapshot, write_snapshot, DatasetClient},
    filter::resolve_regions,
    parser::RawRecord,
    schema::{RegionTable, ALL_REGIONS, METEORITE_DATA},
    writer::{load_regions, RunReport},
    ConsoleUi, Ui, UiApp,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Sync {
            url,
            db,
            include,
            exclude,
            tui,
        } => {
            let regions = resolve_regions(include, exclude)?;

            if tui {
                let mut app = UiApp::new()?;
                match sync(&url, &db, &regions, &mut app) {
                    Ok(report) => app.finish(&report.summary())?,
                    Err(err) => {
                        app.restore()?;
                        return Err(err);
                    }
                }
            } else {
                let report = sync(&url, &db, &regions, &mut ConsoleUi::new())?;
                println!("\n{}", report.summary());
            }
        }

        Commands::Download { url, output } => {
            let mut ui = ConsoleUi::new();
            let records = DatasetClient::new()?.fetch_records(&url, &mut ui)?;
            write_snapshot(&output, &records)
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("\nSaved {} records to {:?}", records.len(), output);
        }

        Commands::Load {
            input,
            db,
            include,
            exclude,
        } => {
            let regions = resolve_regions(include, exclude)?;
            let mut ui = ConsoleUi::new();

            let records = read_snapshot(&input, &mut ui)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let report = load(&records, &db, &regions, &mut ui)?;
            println!("\n{}", report.summary());
        }

        Commands::ListRegions => {
            println!("Master table: {}\n", METEORITE_DATA.name);
            println!("Regions:\n");
            for region in ALL_REGIONS {
                println!(
                    "  {:<20} {:<30} {}",
                    region.key,
                    region.table_name(),
                    region.bounds
                );
            }
        }
    }

    Ok(())
}

/// Fetch, decode and load. Only fatal failures are returned as errors;
/// per-table failures are part of the report.
fn sync(url: &str, db: &Path, regions: &[&RegionTable], ui: &mut impl Ui) -> Result<RunReport> {
    let records = DatasetClient::new()?.fetch_records(url, ui)?;
    load(&records, db, regions, ui)
}

fn load(
    records: &[RawRecord],
    db: &Path,
    regions: &[&RegionTable],
    ui: &mut impl Ui,
) -> Result<RunReport> {
    let report = load_regions(records, db, regions, ui)
        .with_context(|| format!("Failed to load {:?}", db))?;

    for failed in report.failures() {
        tracing::warn!(table = failed.table, "table refresh failed");
    }

    Ok(report)
}
