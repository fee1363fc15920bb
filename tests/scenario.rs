//! End-to-end scenarios: reduced grid, and the full 512 grid at a narrow
//! embedding width.

use quadplex::config::DEFAULT_PHRASES;
use quadplex::embedder::UNIT_TOLERANCE;
use quadplex::config::DEFAULT_GRID_SIZE;
use quadplex::quadrant::Quadrant;
use quadplex::{run, write_outputs, Embedder, HashingEmbedder, MultiplexConfig, RunOutcome};

const GRID: usize = 16;
const DIM: usize = 32;

fn config() -> MultiplexConfig {
    MultiplexConfig::default().with_grid_size(GRID).with_embedding_dim(DIM)
}

#[test]
fn four_phrases_four_lines_and_figures() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config().with_figure_dir(dir.path().to_string_lossy());
    let out = run(&cfg, &HashingEmbedder::new(DIM)).unwrap();

    println!("\n══ Quadrant multiplexing: G={GRID}, D={DIM}, seed={} ══", cfg.seed);
    let lines: Vec<String> = out.similarities.iter().map(|r| r.to_string()).collect();
    for line in &lines {
        println!("{line}");
    }

    assert_formatted_lines(&lines);

    let figures = write_outputs(&cfg, &out).unwrap();
    assert!(figures.heatmap.exists());
    assert!(figures.heatmap_figure.exists());
    assert!(figures.comparison.exists());
}

fn assert_formatted_lines(lines: &[String]) {
    assert_eq!(lines.len(), 4);
    for (line, phrase) in lines.iter().zip(DEFAULT_PHRASES) {
        let prefix = format!("Similarity for '{phrase}': ");
        assert!(line.starts_with(&prefix), "{line}");
        let value = &line[prefix.len()..];
        let decimals = value.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 4, "{line}");
        let v: f64 = value.parse().unwrap();
        assert!((-1.0..=1.0).contains(&v));
    }
}

fn assert_quadrants_bit_exact(cfg: &MultiplexConfig, out: &RunOutcome) {
    let g = cfg.grid_size;
    let composite = out.composite.grid();
    assert_eq!(composite.size(), g);
    for (i, q) in Quadrant::ALL.into_iter().enumerate() {
        let expected = out.fields[i].clone().scaled(cfg.scale);
        for r in q.rows(g) {
            for c in q.cols(g) {
                assert_eq!(composite.get(r, c).to_bits(), expected.get(r, c).to_bits());
            }
        }
    }
}

#[test]
fn full_grid_at_default_seed() {
    // Full 512 x 512 geometry; D = 8 keeps the projections at 64 MB.
    let cfg = MultiplexConfig::default().with_embedding_dim(8);
    assert_eq!(cfg.grid_size, DEFAULT_GRID_SIZE);
    assert_eq!(cfg.seed, 42);
    let out = run(&cfg, &HashingEmbedder::new(8)).unwrap();

    assert_eq!(out.composite.size(), 512);
    assert!(out.fields.iter().all(|f| f.size() == 512));
    assert_quadrants_bit_exact(&cfg, &out);

    let lines: Vec<String> = out.similarities.iter().map(|r| r.to_string()).collect();
    println!("\n══ Quadrant multiplexing: G=512, D=8, seed=42 ══");
    for line in &lines {
        println!("{line}");
    }
    assert_formatted_lines(&lines);
}

#[test]
fn invariants_hold_across_the_pass() {
    let cfg = config();
    let embedder = HashingEmbedder::new(DIM);
    let out = run(&cfg, &embedder).unwrap();

    for (phrase, e) in cfg.phrases.iter().zip(&out.embeddings) {
        assert!((e.norm() - 1.0).abs() < UNIT_TOLERANCE, "{phrase} embedding");
        assert_eq!(e, &embedder.embed(phrase).unwrap());
    }
    for d in &out.decoded {
        assert!((d.norm() - 1.0).abs() < UNIT_TOLERANCE);
    }

    assert_quadrants_bit_exact(&cfg, &out);
}

#[test]
fn rerun_is_bit_for_bit_reproducible() {
    let cfg = config();
    let embedder = HashingEmbedder::new(DIM);
    let a = run(&cfg, &embedder).unwrap();
    let b = run(&cfg, &embedder).unwrap();
    assert_eq!(a.fields, b.fields);
    assert_eq!(a.composite, b.composite);
    assert_eq!(a.similarities, b.similarities);
}
