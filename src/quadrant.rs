//! Quadrant multiplexing and demultiplexing.
//!
//! The G×G grid splits into four Q×Q quadrants, Q = G/2.  Phrase i owns
//! quadrant (row, col) = (i / 2, i % 2):
//!
//! ```text
//!            cols [0,Q)     cols [Q,G)
//! rows [0,Q)   0 TopLeft      1 TopRight
//! rows [Q,G)   2 BottomLeft   3 BottomRight
//! ```
//!
//! The multiplexer copies each phrase's own region of its field into the
//! composite and scales the result.  The other three regions of every
//! field are discarded, so demultiplexing recovers only a quarter of each
//! field's energy.

use std::ops::Range;

use tracing::debug;

use crate::config::PHRASE_COUNT;
use crate::error::{QuadplexError, Result};
use crate::field::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// All quadrants in phrase order.
    pub const ALL: [Quadrant; PHRASE_COUNT] =
        [Quadrant::TopLeft, Quadrant::TopRight, Quadrant::BottomLeft, Quadrant::BottomRight];

    pub fn index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }

    /// Block coordinates (row, col), each 0 or 1.
    pub fn block(self) -> (usize, usize) {
        let i = self.index();
        (i / 2, i % 2)
    }

    pub fn rows(self, grid_size: usize) -> Range<usize> {
        let q = grid_size / 2;
        let (r, _) = self.block();
        r * q..(r + 1) * q
    }

    pub fn cols(self, grid_size: usize) -> Range<usize> {
        let q = grid_size / 2;
        let (_, c) = self.block();
        c * q..(c + 1) * q
    }

    pub fn contains(self, grid_size: usize, row: usize, col: usize) -> bool {
        self.rows(grid_size).contains(&row) && self.cols(grid_size).contains(&col)
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "TL",
            Quadrant::TopRight => "TR",
            Quadrant::BottomLeft => "BL",
            Quadrant::BottomRight => "BR",
        }
    }
}

/// Copy `quadrant` of `src` into the same location of `dst`.
fn copy_quadrant(dst: &mut Grid, src: &Grid, quadrant: Quadrant) {
    let g = src.size();
    let cols = quadrant.cols(g);
    for r in quadrant.rows(g) {
        dst.row_mut(r)[cols.clone()].copy_from_slice(&src.row(r)[cols.clone()]);
    }
}

/// The scaled composite of four quadrant-multiplexed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeField {
    grid: Grid,
}

impl CompositeField {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }
}

/// Assemble the composite: quadrant i from `fields[i]`, then scale.
pub fn multiplex(fields: &[Grid], scale: f64) -> Result<CompositeField> {
    if fields.len() != PHRASE_COUNT {
        return Err(QuadplexError::WrongPhraseCount { expected: PHRASE_COUNT, actual: fields.len() });
    }
    let g = fields[0].size();
    if g < 2 || g % 2 != 0 {
        return Err(QuadplexError::OddGridSize(g));
    }
    if let Some(bad) = fields.iter().find(|f| f.size() != g) {
        return Err(QuadplexError::mismatch("multiplexed field size", g, bad.size()));
    }

    let mut composite = Grid::zeros(g);
    for (field, quadrant) in fields.iter().zip(Quadrant::ALL) {
        copy_quadrant(&mut composite, field, quadrant);
    }
    debug!(grid_size = g, scale, "multiplexed four fields");
    Ok(CompositeField { grid: composite.scaled(scale) })
}

/// Zero grid carrying only `quadrant` of the composite, at its own location.
pub fn isolate(composite: &CompositeField, quadrant: Quadrant) -> Grid {
    let mut out = Grid::zeros(composite.size());
    copy_quadrant(&mut out, &composite.grid, quadrant);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Field i is filled with (i + 1) * 100 + r * G + c so every cell is traceable.
    fn tagged_fields(g: usize) -> Vec<Grid> {
        (0..4)
            .map(|i| {
                let cells = (0..g * g).map(|k| ((i + 1) * 100 + k) as f64).collect();
                Grid::from_flat(g, cells).unwrap()
            })
            .collect()
    }

    #[test]
    fn index_maps_to_reading_order() {
        for (i, q) in Quadrant::ALL.into_iter().enumerate() {
            assert_eq!(q.index(), i);
        }
        assert_eq!(Quadrant::TopRight.block(), (0, 1));
        assert_eq!(Quadrant::BottomLeft.block(), (1, 0));
        assert_eq!(Quadrant::BottomRight.rows(8), 4..8);
        assert_eq!(Quadrant::TopRight.cols(8), 4..8);
    }

    #[test]
    fn each_quadrant_is_scaled_copy_of_its_field() {
        let g = 6;
        let fields = tagged_fields(g);
        let composite = multiplex(&fields, 0.7).unwrap();
        assert_eq!(composite.size(), g);

        for (i, q) in Quadrant::ALL.into_iter().enumerate() {
            let expected = fields[i].clone().scaled(0.7);
            for r in q.rows(g) {
                for c in q.cols(g) {
                    assert_eq!(
                        composite.grid().get(r, c).to_bits(),
                        expected.get(r, c).to_bits(),
                        "{} cell ({r}, {c})",
                        q.label()
                    );
                }
            }
        }
    }

    #[test]
    fn isolate_zeroes_everything_outside_the_quadrant() {
        let g = 4;
        let composite = multiplex(&tagged_fields(g), 0.7).unwrap();
        for q in Quadrant::ALL {
            let iso = isolate(&composite, q);
            for r in 0..g {
                for c in 0..g {
                    if q.contains(g, r, c) {
                        assert_eq!(iso.get(r, c), composite.grid().get(r, c));
                    } else {
                        assert_eq!(iso.get(r, c), 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn multiplex_rejects_bad_inputs() {
        let fields = tagged_fields(4);
        assert!(matches!(
            multiplex(&fields[..3], 0.7),
            Err(QuadplexError::WrongPhraseCount { expected: 4, actual: 3 })
        ));

        let mut mixed = fields.clone();
        mixed[2] = Grid::zeros(6);
        assert!(matches!(multiplex(&mixed, 0.7), Err(QuadplexError::DimensionMismatch { .. })));

        let odd: Vec<Grid> = (0..4).map(|_| Grid::zeros(3)).collect();
        assert!(matches!(multiplex(&odd, 0.7), Err(QuadplexError::OddGridSize(3))));
    }

    proptest! {
        #[test]
        fn quadrants_partition_the_grid(half in 1usize..16, row in 0usize..32, col in 0usize..32) {
            let g = half * 2;
            prop_assume!(row < g && col < g);
            let owners = Quadrant::ALL.iter().filter(|q| q.contains(g, row, col)).count();
            prop_assert_eq!(owners, 1);
        }

        #[test]
        fn isolated_quadrants_sum_back_to_composite(half in 1usize..6, scale in -2.0f64..2.0) {
            let g = half * 2;
            let composite = multiplex(&tagged_fields(g), scale).unwrap();
            let mut sum = vec![0.0f64; g * g];
            for q in Quadrant::ALL {
                for (s, x) in sum.iter_mut().zip(isolate(&composite, q).as_flat()) {
                    *s += x;
                }
            }
            prop_assert_eq!(sum.as_slice(), composite.grid().as_flat());
        }
    }
}
