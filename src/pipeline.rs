//! One forward pass: embed → project → encode → multiplex → decode → score.
//!
//! Every stage receives the [`MultiplexConfig`] (or the values it needs)
//! explicitly.  The pass runs once, synchronously, and fails on the first
//! error.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::{MultiplexConfig, PHRASE_COUNT};
use crate::decoder::decode_all;
use crate::embedder::{Embedder, Embedding};
use crate::error::{QuadplexError, Result};
use crate::field::{encode_all, Grid};
use crate::pinv::PseudoInverse;
use crate::projection::generate_projections;
use crate::quadrant::{multiplex, CompositeField};
use crate::render::{write_figures, ComparisonPanel, FigurePaths};
use crate::similarity::{similarity_report, SimilarityRow};

pub const REPORT_FILE: &str = "report.json";

/// Everything a run produces, minus the projection matrices.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub embeddings: Vec<Embedding>,
    pub fields: Vec<Grid>,
    pub composite: CompositeField,
    pub decoded: Vec<Embedding>,
    pub similarities: Vec<SimilarityRow>,
}

/// Execute the full pipeline.
pub fn run(config: &MultiplexConfig, embedder: &dyn Embedder) -> Result<RunOutcome> {
    config.validate()?;
    if embedder.dim() != config.embedding_dim {
        return Err(QuadplexError::mismatch("embedder dimension", config.embedding_dim, embedder.dim()));
    }
    info!(
        grid_size = config.grid_size,
        embedding_dim = config.embedding_dim,
        seed = config.seed,
        scale = config.scale,
        "starting quadrant multiplexing run"
    );

    let embeddings = embedder.embed_all(&config.phrases)?;
    let projections =
        generate_projections(config.grid_size, config.embedding_dim, config.seed, PHRASE_COUNT)?;

    let fields = encode_all(&projections, &embeddings)?;
    let composite = multiplex(&fields, config.scale)?;
    info!(grid_size = composite.size(), "composite field assembled");

    let pinvs = projections
        .iter()
        .map(|p| PseudoInverse::new(p.matrix(), config.rcond))
        .collect::<Result<Vec<_>>>()?;
    let decoded = decode_all(&composite, &pinvs)?;

    let similarities = similarity_report(&config.phrases, &embeddings, &decoded)?;
    for row in &similarities {
        info!(phrase = %row.phrase, similarity = row.similarity, "decoded");
    }

    Ok(RunOutcome { embeddings, fields, composite, decoded, similarities })
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a MultiplexConfig,
    similarities: &'a [SimilarityRow],
}

/// Write the figures and the JSON run report into `config.figure_dir`.
pub fn write_outputs(config: &MultiplexConfig, outcome: &RunOutcome) -> Result<FigurePaths> {
    let dir = Path::new(&config.figure_dir);
    let panels: Vec<ComparisonPanel<'_>> = outcome
        .similarities
        .iter()
        .zip(outcome.embeddings.iter().zip(&outcome.decoded))
        .map(|(row, (original, decoded))| ComparisonPanel { row, original, decoded })
        .collect();
    let paths = write_figures(dir, &outcome.composite, &config.phrases, &panels)?;

    let report = Report { config, similarities: &outcome.similarities };
    fs::write(dir.join(REPORT_FILE), serde_json::to_string_pretty(&report)?)?;
    Ok(paths)
}
