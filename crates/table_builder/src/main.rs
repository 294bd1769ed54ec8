//! Table Builder CLI
//!
//! Play-by-play CSV → run-expectancy table artifacts (JSON + metadata).

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "table_builder")]
#[command(about = "Build run-expectancy tables from play-by-play CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build the count-state run-expectancy table
    Count {
        /// Input play-by-play CSV file
        #[arg(long)]
        r#in: PathBuf,

        /// Output table JSON path
        #[arg(long)]
        out: PathBuf,

        /// Schema version (e.g., "v1")
        #[arg(long, default_value = "v1")]
        schema_version: String,

        /// Verify the artifact after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Build the hit-type run-expectancy table
    Hits {
        /// Input play-by-play CSV file
        #[arg(long)]
        r#in: PathBuf,

        /// Output table JSON path
        #[arg(long)]
        out: PathBuf,

        /// Schema version (e.g., "v1")
        #[arg(long, default_value = "v1")]
        schema_version: String,

        /// Verify the artifact after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Count {
            r#in,
            out,
            schema_version,
            verify,
            metadata,
        } => {
            println!("🔨 Building count table...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());

            let meta = table_builder::build_count_table(&r#in, &out, &schema_version)?;
            finish(&out, verify, metadata, meta)?;
        }

        Commands::Hits {
            r#in,
            out,
            schema_version,
            verify,
            metadata,
        } => {
            println!("🔨 Building hit table...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());

            let meta = table_builder::build_hit_table(&r#in, &out, &schema_version)?;
            finish(&out, verify, metadata, meta)?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn finish(
    out: &std::path::Path,
    verify: bool,
    metadata: Option<PathBuf>,
    meta: table_builder::TableMetadata,
) -> Result<()> {
    println!("\n✅ Table built successfully!");
    println!("   States:   {}", meta.entries);
    println!("   Rows:     {}", meta.source_rows);
    println!("   Checksum: {}", meta.checksum);
    println!("   Created:  {}", meta.created_at);

    if verify {
        println!("\n🔍 Verifying table integrity...");
        if table_builder::verify_table(out, &meta.checksum)? {
            println!("✅ Table verification passed");
        } else {
            anyhow::bail!("❌ Table verification failed - checksum mismatch!");
        }
    }

    if let Some(metadata_path) = metadata {
        let metadata_json = serde_json::to_string_pretty(&meta)?;
        std::fs::write(&metadata_path, metadata_json)?;
        println!("\n📄 Metadata saved to: {}", metadata_path.display());
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("table_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
