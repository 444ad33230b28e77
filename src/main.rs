//! inset - cached remote-content embedding
//!
//! CLI entry point: resolves the embedding config, probes the persistent
//! store, and runs the content pipeline once.

use clap::Parser;
use console::style;
use indicatif::ProgressBar;
use inset::config::EmbedConfig;
use inset::error::{InsetError, InsetResult};
use inset::pipeline::{ContentPipeline, Renderer};
use inset::store::{open_persistent_store, KeyValueStore, MemoryStore};
use inset::transport::UreqTransport;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Embed remote HTML or Markdown content through a jittered-TTL cache
#[derive(Parser)]
#[command(name = "inset", version)]
struct Cli {
    /// Source URL to embed
    src: String,

    /// Content format of the source: html or markdown (default html)
    #[arg(long)]
    format: Option<String>,

    /// Cache key prefix (default "insert")
    #[arg(long)]
    prefix: Option<String>,

    /// Write the result to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip the persistent store and cache in memory only
    #[arg(long)]
    no_cache: bool,

    /// Directory for the persistent store
    #[arg(long, env = "INSET_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Markdown rendering endpoint
    #[arg(long, env = "INSET_RENDER_ENDPOINT")]
    render_endpoint: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Writes the delivered content to stdout or a file
struct OutputRenderer {
    out: Option<PathBuf>,
    write_error: Option<std::io::Error>,
}

impl OutputRenderer {
    fn new(out: Option<PathBuf>) -> Self {
        Self {
            out,
            write_error: None,
        }
    }
}

impl Renderer for OutputRenderer {
    fn set_content(&mut self, html: &str) {
        match &self.out {
            Some(path) => {
                if let Err(e) = std::fs::write(path, html) {
                    self.write_error = Some(e);
                }
            }
            None => println!("{}", html),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> InsetResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("inset=warn"),
        1 => EnvFilter::new("inset=info"),
        _ => EnvFilter::new("inset=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let store: Arc<dyn KeyValueStore> = if cli.no_cache {
        debug!("Persistent store disabled (--no-cache)");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(open_persistent_store(cli.store_dir.as_deref())?)
    };

    let config = EmbedConfig::resolve(&cli.src, cli.prefix.as_deref(), cli.format.as_deref());

    let transport = Arc::new(UreqTransport::new());
    let mut pipeline = ContentPipeline::new(store, transport, &config);
    if let Some(endpoint) = &cli.render_endpoint {
        pipeline = pipeline.with_render_endpoint(endpoint);
    }

    let spinner = if console::Term::stderr().is_term() {
        let spinner = ProgressBar::new_spinner().with_message("now loading...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        Some(spinner)
    } else {
        None
    };

    let mut renderer = OutputRenderer::new(cli.out);
    pipeline.run(&config.src, config.format, &mut renderer).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let Some(e) = renderer.write_error {
        return Err(InsetError::io("writing output", e));
    }

    Ok(())
}
