//! Steamsnap CLI - Steam review snapshots
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use steamsnap::{logging, pipeline, render, Config, GeminiClient, ReviewCache, SteamClient, SummariseOptions, Summariser};

#[derive(Parser)]
#[command(name = "steamsnap")]
#[command(author, version, about = "Summarise Steam reviews into short snapshots", long_about = None)]
struct Cli {
    /// Print raw reviews and enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch reviews for a game and summarise them
    Run(RunArgs),
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Exact (or fuzzy) Steam game title
    game: String,
    /// Number of reviews to fetch
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=20))]
    count: u32,
    /// Output format
    #[arg(long, value_enum, ignore_case = true, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    /// Also save the snapshots to this JSON file
    #[arg(long)]
    out: Option<PathBuf>,
    /// Enable fuzzy title matching
    #[arg(long)]
    fuzzy: bool,
    /// Path to the LLM cache file
    #[arg(long)]
    cache_file: Option<PathBuf>,
    /// Disable the LLM cache
    #[arg(long)]
    no_cache: bool,
    /// Config file to use instead of the default lookup
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    match cli.command {
        Commands::Run(args) => run(args, cli.debug).await?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "steamsnap", &mut std::io::stdout());
        }
    }

    Ok(())
}

async fn run(args: RunArgs, debug: bool) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let client = GeminiClient::from_config(&config)?;
    let summariser = Summariser::with_options(client, SummariseOptions::from(&config.summarise));
    let steam = SteamClient::new(config.steam.clone())?;

    let reviews = steam
        .fetch_reviews(&args.game, args.count, args.fuzzy)
        .await
        .context("failed to fetch reviews")?;

    if debug {
        for review in &reviews {
            eprintln!("{} {}\n", format!("Raw review ({}):", review.author).cyan(), review.text);
        }
    }

    let cache_path = args.cache_file.unwrap_or_else(|| config.storage.cache.clone());
    let mut cache = (!args.no_cache).then(|| ReviewCache::load(&cache_path));

    let total = reviews.len();
    let show_progress = total > 0 && atty::is(atty::Stream::Stderr);
    let snapshots = pipeline::summarise_reviews(&reviews, &summariser, cache.as_mut(), |done| {
        if show_progress {
            eprint!("\rSummarising reviews... {}/{}", done, total);
            let _ = std::io::stderr().flush();
        }
    })
    .await;
    if show_progress {
        eprintln!();
    }

    if let Some(cache) = &cache {
        cache
            .save()
            .with_context(|| format!("failed to write cache {}", cache.path().display()))?;
    }

    match args.format {
        OutputFormat::Json => println!("{}", render::render_json(&snapshots)?),
        OutputFormat::Table => println!("{}", render::render_table(&args.game, &snapshots)),
    }

    if let Some(out) = &args.out {
        std::fs::write(out, render::render_json(&snapshots)?)
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("{}", format!("Saved to {}", out.display()).green());
    }

    Ok(())
}
