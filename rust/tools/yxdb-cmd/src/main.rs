use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "yxdb-cmd")]
#[command(about = "Command-line utility for inspecting YXDB databases")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the record count and schema of a database
    Inspect {
        /// Path to the database
        path: String,
    },

    /// Print the first records as JSON lines
    Head {
        /// Number of records to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u64,

        /// Path to the database
        path: String,
    },

    /// Print a spatial field of every record as GeoJSON, one line per record
    Geojson {
        /// Name of the spatial field
        #[arg(long)]
        field: String,

        /// Path to the database
        path: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Inspect { path } => commands::inspect::run(&path, &mut out)?,
        Commands::Head { count, path } => commands::head::run(count, &path, &mut out)?,
        Commands::Geojson { field, path } => commands::geojson::run(&field, &path, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
