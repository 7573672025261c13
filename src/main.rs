use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use tidefeed::app::App;
use tidefeed::config::Config;
use tidefeed::feed::{
    FeedController, FeedEvent, StaticSource, UuidGenerator, ViewportSentinel, MAX_REPEATED_POSTS,
};
use tidefeed::keybindings::KeybindingRegistry;
use tidefeed::{sample, ui};

/// Get the config directory path (~/.config/tidefeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("tidefeed");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(name = "tidefeed", about = "Infinite-scroll social feed in the terminal")]
struct Args {
    /// Config file (defaults to ~/.config/tidefeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON array of posts to page through instead of the built-in sample
    #[arg(long, value_name = "FILE")]
    posts: Option<PathBuf>,

    /// Posts revealed per page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Delay before the first page appears, in milliseconds
    #[arg(long, value_name = "MS")]
    initial_delay_ms: Option<u64>,

    /// Cycle the dataset this many times
    #[arg(long, value_name = "N", default_value_t = 1)]
    repeat: usize,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Logs go to `--log-file` when given. Without one, stderr would draw over
/// the TUI, so logging stays off unless `RUST_LOG` asks for it.
fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let (writer, default_filter) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            (BoxMakeWriter::new(Arc::new(file)), "info")
        }
        None => (BoxMakeWriter::new(std::io::stderr), "off"),
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    // CLI flags win over the config file
    if let Some(page_size) = args.page_size {
        anyhow::ensure!(page_size > 0, "--page-size must be at least 1");
        config.page_size = page_size;
    }
    if let Some(delay) = args.initial_delay_ms {
        config.initial_delay_ms = delay;
    }
    if args.posts.is_some() {
        config.posts_file = args.posts.clone();
    }
    anyhow::ensure!(args.repeat > 0, "--repeat must be at least 1");

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
        eprintln!("Warning: {}", warning);
    }

    let posts = match &config.posts_file {
        Some(path) => sample::load_posts(path)
            .with_context(|| format!("Failed to load posts from '{}'", path.display()))?,
        None => sample::sample_posts(),
    };
    if posts.is_empty() {
        tracing::warn!("Dataset is empty, the feed will show no posts");
    }
    let source = StaticSource::repeated(&posts, args.repeat).with_context(|| {
        format!(
            "--repeat {} over {} posts exceeds the {} post limit",
            args.repeat,
            posts.len(),
            MAX_REPEATED_POSTS
        )
    })?;
    tracing::info!(
        posts = source.len(),
        page_size = config.page_size,
        initial_delay_ms = config.initial_delay_ms,
        "Starting feed"
    );

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(32);

    let feed = FeedController::new(
        config.feed_settings(),
        Arc::new(source),
        Arc::new(UuidGenerator),
        ViewportSentinel::new(config.sentinel_options()),
        event_tx,
    );

    let mut app = App::new(feed, keybindings);
    app.feed.mount();

    // Run the TUI
    ui::run(&mut app, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
