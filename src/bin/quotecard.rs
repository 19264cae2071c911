use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore as _, SeedableRng};

use quotecard::{
    CardRenderer, CompletionQuoteSource, Config, Pipeline, QuoteSource, ReelsPublisher,
    ScheduleSet, SystemClock, config as cfg,
};

#[derive(Parser, Debug)]
#[command(name = "quotecard", version)]
struct Cli {
    /// Optional JSON config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory for assets and outputs (overrides the config value).
    #[arg(long)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the card and thumbnail from the given text, skipping the quote
    /// service, video, and upload steps.
    Render(RenderArgs),
    /// Run one full production cycle now.
    Post,
    /// Draw and print a daily slot set without running anything.
    Schedule(ScheduleArgs),
    /// Run the polling scheduler loop indefinitely.
    Run,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Quote text to render (at most 110 characters).
    #[arg(long)]
    text: String,
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    /// Seed for reproducible slot draws; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(root) = cli.root {
        config.dirs = quotecard::Dirs::new(root);
    }
    config.validate()?;

    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Post => cmd_post(config),
        Command::Schedule(args) => cmd_schedule(config, args),
        Command::Run => cmd_run(config),
    }
}

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

fn cmd_render(config: Config, args: RenderArgs) -> anyhow::Result<()> {
    if args.text.chars().count() > quotecard::MAX_QUOTE_LEN {
        anyhow::bail!(
            "quote text is longer than {} characters",
            quotecard::MAX_QUOTE_LEN
        );
    }

    quotecard::assets::ensure_dirs(&config.dirs)?;
    let renderer = CardRenderer::new(&config);
    let artifacts = renderer.render(&args.text, &mut entropy_rng())?;
    eprintln!("wrote {}", artifacts.card.display());
    eprintln!("wrote {}", artifacts.thumbnail.display());
    Ok(())
}

fn build_pipeline(config: Config) -> anyhow::Result<Pipeline> {
    let api_key = cfg::completion_api_key().context("quote generation cannot start")?;

    let mut seed_rng = entropy_rng();
    let source: Box<dyn QuoteSource> = Box::new(CompletionQuoteSource::new(
        api_key,
        config.completion_model.clone(),
        StdRng::seed_from_u64(seed_rng.next_u64()),
    )?);

    Ok(Pipeline::new(
        config,
        source,
        Box::new(ReelsPublisher),
        entropy_rng(),
    )?)
}

fn cmd_post(config: Config) -> anyhow::Result<()> {
    let mut pipeline = build_pipeline(config)?;
    let artifacts = pipeline.run_cycle()?;
    eprintln!("posted {}", artifacts.card.display());
    Ok(())
}

fn cmd_schedule(config: Config, args: ScheduleArgs) -> anyhow::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => entropy_rng(),
    };
    let set = ScheduleSet::generate_daily(&config.windows, &mut rng)?;
    for slot in set.slots() {
        println!("{slot}");
    }
    Ok(())
}

fn cmd_run(config: Config) -> anyhow::Result<()> {
    let mut pipeline = build_pipeline(config)?;
    pipeline.run_loop(&SystemClock)?;
    Ok(())
}
