//! REALTY CLI
//!
//! Runs searches and recommendations directly against a data directory.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use realty::query::DEFAULT_TOP_N;
use realty::{DataContext, Precision, RadiusSearch, SimilarityRecommender};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// REALTY CLI - Offline Queries
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory containing location_distance.json and cosine_sim{1,2,3}.json
    #[arg(short, long, default_value = "./datasets")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Properties within a radius of a location
    Search {
        location: String,
        /// Radius in kilometers
        radius: f64,
        #[arg(long, value_enum, default_value_t = Rounding::Whole)]
        rounding: Rounding,
    },
    /// Properties most similar to a given one
    Recommend {
        apartment: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },
    /// List known locations and apartments
    Options,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Rounding {
    Whole,
    Hundredths,
}

impl From<Rounding> for Precision {
    fn from(r: Rounding) -> Self {
        match r {
            Rounding::Whole => Precision::Whole,
            Rounding::Hundredths => Precision::Hundredths,
        }
    }
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("realty=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = DataContext::load(&args.data_dir)
        .with_context(|| format!("failed to load data from {}", args.data_dir.display()))?;

    match args.command {
        Command::Search {
            location,
            radius,
            rounding,
        } => {
            let hits = RadiusSearch::new(&data).search(&location, radius, rounding.into())?;
            if hits.is_empty() {
                println!("No properties within {} km of {}", radius, location);
            }
            for hit in hits {
                println!("{} - {} kms", hit.name, hit.distance_km);
            }
        }

        Command::Recommend { apartment, top_n } => {
            let recs = SimilarityRecommender::new(&data).lookup(&apartment, top_n)?;
            if recs.is_empty() {
                println!("No recommendations for {}", apartment);
            }
            for (rank, rec) in recs.iter().enumerate() {
                println!("{:>2}. {} ({:.4})", rank + 1, rec.name, rec.score);
            }
        }

        Command::Options => {
            println!("Locations:");
            for name in data.table().sorted_columns() {
                println!("  {}", name);
            }
            println!("Apartments:");
            for name in data.table().sorted_rows() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
