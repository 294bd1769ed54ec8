//! Run-Value CLI
//!
//! Season processing (augmented output + registry), registry-only training
//! passes, and batter leaderboards over the augmented stream.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rv_core::analysis::{build_leaderboard, write_leaderboard};
use rv_core::{
    load_registry, save_registry, BatterRegistry, CountTable, HitTable, PassStats, RunExpectancy,
    Season, TripleWeighting, UnknownStatePolicy,
};

#[derive(Parser)]
#[command(name = "rv_cli")]
#[command(about = "Pitch-level swing/take run-value analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Augment a season's pitch stream with run-value decision columns
    Process {
        /// Input pitch stream CSV
        #[arg(long)]
        pitches: PathBuf,

        /// Output augmented CSV path
        #[arg(long)]
        out: PathBuf,

        /// Count-state run-expectancy table (JSON)
        #[arg(long)]
        count_table: PathBuf,

        /// Hit-type run-expectancy table (JSON)
        #[arg(long)]
        hit_table: PathBuf,

        /// Warm-start registry from a prior season
        #[arg(long)]
        registry_in: Option<PathBuf>,

        /// Persist the registry here at pass end
        #[arg(long)]
        registry_out: Option<PathBuf>,

        /// Skip rows outside the trained table domain instead of failing
        #[arg(long, default_value = "false")]
        skip_unknown_states: bool,

        /// Weight the triple term by the observed triple rate instead of
        /// the double rate
        #[arg(long, default_value = "false")]
        triple_rate: bool,
    },

    /// Build or extend a batter registry without valuing pitches
    Train {
        /// Input pitch stream CSV
        #[arg(long)]
        pitches: PathBuf,

        /// Extend this registry instead of starting empty
        #[arg(long)]
        registry_in: Option<PathBuf>,

        /// Persist the registry here
        #[arg(long)]
        registry_out: PathBuf,
    },

    /// Aggregate an augmented stream into a batter leaderboard
    Leaderboard {
        /// Input augmented CSV
        #[arg(long)]
        r#in: PathBuf,

        /// Output leaderboard CSV
        #[arg(long)]
        out: PathBuf,

        /// Drop batters under this many completed plate appearances
        #[arg(long)]
        min_pa: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            pitches,
            out,
            count_table,
            hit_table,
            registry_in,
            registry_out,
            skip_unknown_states,
            triple_rate,
        } => {
            println!("⚾ Processing season...");
            println!("   Pitches: {}", pitches.display());
            println!("   Output:  {}", out.display());

            let count = CountTable::load(&count_table)
                .with_context(|| format!("Failed to load count table: {}", count_table.display()))?;
            let hit = HitTable::load(&hit_table)
                .with_context(|| format!("Failed to load hit table: {}", hit_table.display()))?;

            let mut engine = RunExpectancy::new(count, hit);
            if triple_rate {
                engine = engine.with_triple_weighting(TripleWeighting::TripleRate);
            }

            let mut season = Season::with_registry(engine, open_registry(registry_in.as_deref())?);
            if skip_unknown_states {
                season = season.with_unknown_state_policy(UnknownStatePolicy::SkipRow);
            }

            let stats = season.process_file(&pitches, &out)?;
            print_stats(&stats);

            if let Some(path) = registry_out {
                let registry = season.into_registry();
                save_registry(&path, &registry)?;
                println!(
                    "\n💾 Registry saved: {} batters to {}",
                    registry.len(),
                    path.display()
                );
            }
        }

        Commands::Train {
            pitches,
            registry_in,
            registry_out,
        } => {
            println!("⚾ Training registry...");
            println!("   Pitches: {}", pitches.display());

            // No valuation happens on a training pass, so the engine can
            // run on empty tables.
            let engine = RunExpectancy::new(CountTable::default(), HitTable::default());
            let mut season = Season::with_registry(engine, open_registry(registry_in.as_deref())?);

            let stats = season.process_season(&pitches)?;
            print_stats(&stats);

            let registry = season.into_registry();
            save_registry(&registry_out, &registry)?;
            println!(
                "\n💾 Registry saved: {} batters to {}",
                registry.len(),
                registry_out.display()
            );
        }

        Commands::Leaderboard { r#in, out, min_pa } => {
            println!("⚾ Building leaderboard...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());

            let lines = build_leaderboard(&r#in, min_pa)?;
            write_leaderboard(&out, &lines)?;
            println!("\n✅ Leaderboard written: {} batters", lines.len());
        }
    }

    Ok(())
}

fn open_registry(path: Option<&Path>) -> Result<BatterRegistry> {
    match path {
        Some(path) => {
            let registry = load_registry(path)
                .with_context(|| format!("Failed to load registry: {}", path.display()))?;
            println!("   Warm start: {} batters from {}", registry.len(), path.display());
            Ok(registry)
        }
        None => Ok(BatterRegistry::new()),
    }
}

fn print_stats(stats: &PassStats) {
    println!("\n✅ Pass complete!");
    println!("   Rows read: {}", stats.rows);
    println!("   Emitted:   {}", stats.emitted);
    println!("   Valued:    {}", stats.valued);
    println!("   No data:   {}", stats.no_data);
    println!("   Observed:  {}", stats.observed);
    println!("   Skipped:   {}", stats.skipped);
}
