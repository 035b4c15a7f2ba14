//! Cabinet Admin Binary
//!
//! Maintenance commands for a record file.

use std::fs;
use std::path::PathBuf;

use cabinet::{Cabinet, Config, Criteria, Snapshot, ValidationRules};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// Cabinet Admin
#[derive(Parser, Debug)]
#[command(name = "cabinet-admin")]
#[command(about = "Maintenance tool for Cabinet record files")]
#[command(version)]
struct Args {
    /// Record file
    #[arg(short, long, default_value = "cabinet.db")]
    file: PathBuf,

    /// Validation rule preset
    #[arg(short, long, value_enum, default_value_t = RulePreset::Default)]
    rules: RulePreset,

    /// Fixed name width of the file's slots (bytes)
    #[arg(long, default_value = "60")]
    max_name_len: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RulePreset {
    Default,
    Custom,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show active and deleted record counts
    Stat,

    /// Drop deleted slots from the file
    Compact,

    /// Print records
    List {
        /// Criteria, e.g. "firstname = 'Ann' and lastname = 'Lee'"
        #[arg(short = 'w', long = "where", default_value = "")]
        filter: String,
    },

    /// Write every active record to a binary snapshot image
    Export {
        /// Output image path
        output: PathBuf,
    },

    /// Restore records from a binary snapshot image
    Import {
        /// Input image path
        input: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cabinet=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::info!("Cabinet Admin v{}", cabinet::VERSION);
    tracing::info!("Record file: {}", args.file.display());

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> cabinet::Result<()> {
    let rules = match args.rules {
        RulePreset::Default => ValidationRules::default(),
        RulePreset::Custom => ValidationRules::custom(),
    };
    let config = Config::builder()
        .file(&args.file)
        .max_name_len(args.max_name_len)
        .rules(rules)
        .build();

    let mut cabinet = Cabinet::open(config)?;

    match args.command {
        Commands::Stat => {
            let stats = cabinet.stat();
            println!("{} record(s), {} deleted", stats.active, stats.removed);
        }
        Commands::Compact => {
            let dropped = cabinet.compact()?;
            println!("Dropped {} slot(s)", dropped);
        }
        Commands::List { filter } => {
            let criteria: Criteria = filter.parse()?;
            let selection = cabinet.select(&criteria)?;
            for record in cabinet.records(&selection) {
                println!("{}", record?);
            }
        }
        Commands::Export { output } => {
            let snapshot = cabinet.snapshot()?;
            fs::write(&output, snapshot.to_bytes()?)?;
            println!("Exported {} record(s) to {}", snapshot.len(), output.display());
        }
        Commands::Import { input } => {
            let snapshot = Snapshot::from_bytes(&fs::read(&input)?)?;
            let report = cabinet.restore(&snapshot);
            for (id, error) in &report.rejected {
                println!("Record #{} skipped: {}", id, error);
            }
            println!(
                "Imported {} of {} record(s)",
                report.applied,
                snapshot.len()
            );
        }
    }

    Ok(())
}
