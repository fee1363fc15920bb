//! Quadrant multiplexing demo.
//!
//! Runs the pipeline once at the default configuration (G = 512, D = 384,
//! seed 42) and prints one similarity line per phrase.  Logs go to stderr;
//! set `RUST_LOG=quadplex=debug` for per-stage detail.
//!
//! Run: `cargo run --release`

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quadplex::{run, write_outputs, HashingEmbedder, MultiplexConfig};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = MultiplexConfig::default();
    let embedder = HashingEmbedder::new(config.embedding_dim);

    let outcome = run(&config, &embedder).context("multiplexing run failed")?;
    for row in &outcome.similarities {
        println!("{row}");
    }

    let figures = write_outputs(&config, &outcome)
        .with_context(|| format!("writing figures to {}", config.figure_dir))?;
    tracing::info!(
        heatmap = %figures.heatmap.display(),
        heatmap_figure = %figures.heatmap_figure.display(),
        comparison = %figures.comparison.display(),
        "done"
    );
    Ok(())
}
