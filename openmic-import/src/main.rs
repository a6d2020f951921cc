//! Catalog CSV importer - Main entry point
//!
//! One-shot batch job: decode a CSV (encoding + delimiter sniffing), map its
//! columns through the alias table, normalize, and bulk-upsert into the songs
//! table. Runs as its own process so a bulk load never happens inside the
//! request-serving binary.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod decode;
mod error;
mod importer;
mod sniff;

use decode::ForcedEncoding;

/// Command-line arguments for openmic-import
#[derive(Parser, Debug)]
#[command(name = "openmic-import")]
#[command(about = "Import a song catalog CSV into the OpenMic database")]
#[command(version)]
struct Args {
    /// Path to the CSV file
    #[arg(long, env = "CSV_PATH")]
    csv: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "openmic.db")]
    database: PathBuf,

    /// Character encoding (auto, utf8, latin1, utf16le, utf16be)
    #[arg(long, env = "CSV_ENCODING", default_value = "auto", value_parser = ForcedEncoding::parse)]
    encoding: ForcedEncoding,

    /// Delete every existing song before importing
    #[arg(long, default_value_t = false)]
    replace: bool,

    /// Parse and report without writing to the database
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Ensure the schema and indexes exist, then exit
    #[arg(long, default_value_t = false)]
    indexes_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let started = Instant::now();

    let pool = openmic_common::db::init_database(&args.database)
        .await
        .context("Failed to open database")?;

    if args.indexes_only {
        info!("Schema and indexes ensured, nothing imported");
        return Ok(());
    }

    let csv_path = args
        .csv
        .context("--csv (or CSV_PATH) is required unless --indexes-only")?;
    info!("Importing {}", csv_path.display());

    let bytes = std::fs::read(&csv_path)
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;
    let text = decode::decode(&bytes, args.encoding);
    let (text, declared) = sniff::strip_sep_directive(&text);
    let (table, delimiter) =
        sniff::sniff_table(text, declared).context("Could not detect a usable CSV schema")?;
    info!(
        "Delimiter {:?}, {} columns, {} data rows",
        delimiter as char,
        table.fields.len(),
        table.rows.len()
    );

    if args.dry_run {
        info!("Dry run: {} rows parsed, nothing written", table.rows.len());
        return Ok(());
    }

    if args.replace {
        let deleted = importer::clear_songs(&pool).await?;
        warn!("Replace mode: deleted {} existing songs", deleted);
    }

    let stats = importer::import_rows(&pool, &table).await?;
    info!(
        "Import finished in {:.1?}: read {}, upserted {}, modified {}, skipped {}",
        started.elapsed(),
        stats.read,
        stats.upserted,
        stats.modified,
        stats.skipped
    );

    let dupes = importer::duplicate_groups(&pool, 10).await?;
    if dupes.is_empty() {
        info!("No duplicate (artist, title) groups");
    } else {
        warn!("{} duplicate groups found:", dupes.len());
        for group in &dupes {
            warn!("  {} / {} x{}", group.artist_norm, group.title_norm, group.count);
        }
    }

    Ok(())
}
