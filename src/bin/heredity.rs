//! Command line front end: reads a family roster and prints each person's
//! posterior gene and trait distributions.
use clap::{ArgAction, Parser, ValueEnum};
use heredity::prelude::*;
use heredity::report;
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Exact gene and trait posteriors for a family tree
#[derive(Parser)]
#[command(name = "heredity")]
#[command(version)]
struct Cli {
    /// Roster CSV with name, mother, father and trait columns
    roster: PathBuf,

    /// JSON file replacing the built-in probability tables
    #[arg(long)]
    cpt: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Shard the enumeration across all cores
    #[arg(long)]
    parallel: bool,

    /// Treat unrecognised trait values as unobserved instead of failing
    #[arg(long)]
    lenient_traits: bool,

    /// Give up after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<String, Box<dyn Error>> {
    let cpt = match &cli.cpt {
        Some(path) => {
            info!("loading probability tables from {}", path.display());
            Cpt::from_path(path)?
        }
        None => Cpt::default(),
    };

    let policy = if cli.lenient_traits {
        TraitPolicy::Lenient
    } else {
        TraitPolicy::Strict
    };
    let family = RosterBuilder::new()
        .trait_policy(policy)
        .from_path(&cli.roster)?;
    info!(
        "loaded {} people from {}",
        family.len(),
        cli.roster.display()
    );

    let mut options = InferenceOptions::new().parallel(cli.parallel);
    if let Some(secs) = cli.timeout_secs {
        options = options.deadline(Duration::from_secs(secs));
    }
    let marginals = family.infer_with(&cpt, &options)?;

    Ok(match cli.format {
        Format::Text => report::render_text(&marginals),
        Format::Json => report::render_json(&marginals)? + "\n",
    })
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
