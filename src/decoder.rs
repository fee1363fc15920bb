//! Quadrant demultiplexer / decoder.
//!
//! Decoding phrase i:
//!   1. zero G×G grid carrying only quadrant i of the composite,
//!   2. flatten row-major,
//!   3. apply P_i⁺,
//!   4. normalise to unit length.
//!
//! Only a quarter of each field survives multiplexing and the survivor is
//! scaled by 0.7; normalisation removes the scale but not the loss.  The
//! decoded vector is the least-squares embedding whose field best matches
//! one quadrant with zeros elsewhere, so it only partially correlates with
//! the original.

use tracing::debug;

use crate::embedder::Embedding;
use crate::error::{QuadplexError, Result};
use crate::field::Grid;
use crate::pinv::PseudoInverse;
use crate::quadrant::{isolate, CompositeField, Quadrant};

/// Recover the embedding stored in `quadrant` of the composite.
pub fn decode_quadrant(
    composite: &CompositeField,
    quadrant: Quadrant,
    pinv: &PseudoInverse<'_>,
) -> Result<Embedding> {
    let isolated = isolate(composite, quadrant);
    let decoded = decode_grid(&isolated, pinv)?;
    debug!(quadrant = quadrant.label(), norm = decoded.norm(), "decoded quadrant");
    Ok(decoded)
}

/// Apply the pseudo-inverse to a whole grid and normalise.
///
/// With an unmultiplexed field this is an exact round trip.
pub fn decode_grid(grid: &Grid, pinv: &PseudoInverse<'_>) -> Result<Embedding> {
    let raw = pinv.apply(grid.as_flat())?;
    Ok(Embedding::normalized(raw))
}

/// Decode every quadrant in phrase order.
pub fn decode_all(composite: &CompositeField, pinvs: &[PseudoInverse<'_>]) -> Result<Vec<Embedding>> {
    if pinvs.len() != Quadrant::ALL.len() {
        return Err(QuadplexError::WrongPhraseCount {
            expected: Quadrant::ALL.len(),
            actual: pinvs.len(),
        });
    }
    Quadrant::ALL
        .into_iter()
        .zip(pinvs)
        .map(|(q, p)| decode_quadrant(composite, q, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::{Embedder, HashingEmbedder, UNIT_TOLERANCE};
    use crate::field::{encode, encode_all};
    use crate::projection::generate_projections;
    use crate::quadrant::multiplex;

    const PHRASES: [&str; 4] = ["Hello World", "Good Morning", "How Are You", "See You Later"];
    const RCOND: f64 = 1e-12;

    #[test]
    fn whole_field_round_trip_recovers_embedding() {
        // G² = 64 rows, D = 16: full column rank, so P⁺P = I.
        let (g, d) = (8, 16);
        let projections = generate_projections(g, d, 42, 4).unwrap();
        let embedder = HashingEmbedder::new(d);

        println!("\n{:<16} {:>12}", "Phrase", "max |Δ|");
        for (phrase, p) in PHRASES.iter().zip(&projections) {
            let e = embedder.embed(phrase).unwrap();
            let field = encode(p, &e).unwrap();
            let pinv = PseudoInverse::new(p.matrix(), RCOND).unwrap();
            let back = decode_grid(&field, &pinv).unwrap();
            let err = back
                .as_slice()
                .iter()
                .zip(e.as_slice())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0f64, f64::max);
            println!("{phrase:<16} {err:>12.2e}");
            assert!(err < 1e-9, "{phrase}: round trip error {err}");
        }
    }

    #[test]
    fn quadrant_decoding_is_unit_length_and_positively_correlated() {
        let (g, d) = (16, 24);
        let projections = generate_projections(g, d, 42, 4).unwrap();
        let embedder = HashingEmbedder::new(d);
        let phrases: Vec<String> = PHRASES.iter().map(|s| s.to_string()).collect();
        let embeddings = embedder.embed_all(&phrases).unwrap();
        let fields = encode_all(&projections, &embeddings).unwrap();
        let composite = multiplex(&fields, 0.7).unwrap();
        let pinvs: Vec<_> = projections
            .iter()
            .map(|p| PseudoInverse::new(p.matrix(), RCOND).unwrap())
            .collect();

        let decoded = decode_all(&composite, &pinvs).unwrap();
        assert_eq!(decoded.len(), 4);
        for (i, (orig, dec)) in embeddings.iter().zip(&decoded).enumerate() {
            let sim = orig.cosine(dec);
            println!("{:<16} similarity {sim:.4}", PHRASES[i]);
            assert!((dec.norm() - 1.0).abs() < UNIT_TOLERANCE);
            assert!((-1.0..=1.0).contains(&sim));
            assert!(sim > 0.0, "{}: decoded vector points away from original", PHRASES[i]);
        }
    }

    #[test]
    fn decode_all_needs_one_inverse_per_quadrant() {
        let projections = generate_projections(4, 3, 42, 4).unwrap();
        let fields: Vec<Grid> = (0..4).map(|_| Grid::zeros(4)).collect();
        let composite = multiplex(&fields, 0.7).unwrap();
        let pinvs: Vec<_> = projections[..2]
            .iter()
            .map(|p| PseudoInverse::new(p.matrix(), RCOND).unwrap())
            .collect();
        assert!(matches!(
            decode_all(&composite, &pinvs),
            Err(QuadplexError::WrongPhraseCount { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn empty_quadrant_decodes_to_zero_vector() {
        let projections = generate_projections(4, 3, 42, 1).unwrap();
        let fields: Vec<Grid> = (0..4).map(|_| Grid::zeros(4)).collect();
        let composite = multiplex(&fields, 0.7).unwrap();
        let pinv = PseudoInverse::new(projections[0].matrix(), RCOND).unwrap();
        let dec = decode_quadrant(&composite, Quadrant::TopLeft, &pinv).unwrap();
        assert_eq!(dec.norm(), 0.0);
    }
}
