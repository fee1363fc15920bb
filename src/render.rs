//! Figure output.
//!
//! Three files, all for human inspection only:
//!
//! - **Heatmap image**: the composite field as a PNG, one pixel per cell,
//!   plasma-like colormap over the min/max range, dashed white lines on the
//!   quadrant boundaries.
//! - **Heatmap figure**: an SVG that frames the PNG with a title naming the
//!   phrase in each quadrant, axis labels, a split-line legend and a colour
//!   bar labelled "Field Intensity" with its min and max.
//! - **Comparison** SVG with a 2×2 panel grid; each panel overlays the
//!   original embedding (solid) and the decoded one (dashed).
//!
//! Nothing here feeds back into the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use tracing::info;

use crate::embedder::Embedding;
use crate::error::Result;
use crate::quadrant::{CompositeField, Quadrant};
use crate::similarity::SimilarityRow;

pub const HEATMAP_FILE: &str = "multiplexed_beam.png";
pub const HEATMAP_FIGURE_FILE: &str = "multiplexed_beam.svg";
pub const COMPARISON_FILE: &str = "decoded_comparison.svg";

/// Dash period, in pixels, for the quadrant boundary markers.
const DASH: usize = 8;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

// ─── Colormap ────────────────────────────────────────────────────────────────

/// Plasma control points, evenly spaced on [0, 1].
const PLASMA: [[f64; 3]; 5] = [
    [13.0, 8.0, 135.0],
    [126.0, 3.0, 168.0],
    [204.0, 71.0, 120.0],
    [248.0, 149.0, 64.0],
    [240.0, 249.0, 33.0],
];

/// Map `t` ∈ [0, 1] to RGB by piecewise-linear interpolation.
pub fn plasma(t: f64) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let x = t * (PLASMA.len() - 1) as f64;
    let i = (x.floor() as usize).min(PLASMA.len() - 2);
    let f = x - i as f64;
    let (a, b) = (PLASMA[i], PLASMA[i + 1]);
    [0, 1, 2].map(|k| (a[k] + (b[k] - a[k]) * f).round() as u8)
}

fn plasma_hex(t: f64) -> String {
    let [r, g, b] = plasma(t);
    format!("#{r:02x}{g:02x}{b:02x}")
}

// ─── Heatmap ─────────────────────────────────────────────────────────────────

fn on_split(k: usize, q: usize, along: usize) -> bool {
    k == q && (along / DASH) % 2 == 0
}

/// The composite as an RGB image; pixel (x, y) is cell (row y, col x).
pub fn heatmap_image(composite: &CompositeField) -> RgbImage {
    let grid = composite.grid();
    let g = grid.size();
    let q = g / 2;
    let (lo, hi) = grid.value_range();
    let span = if hi > lo { hi - lo } else { 1.0 };

    ImageBuffer::from_fn(g as u32, g as u32, |x, y| {
        let (row, col) = (y as usize, x as usize);
        if on_split(row, q, col) || on_split(col, q, row) {
            WHITE
        } else {
            Rgb(plasma((grid.get(row, col) - lo) / span))
        }
    })
}

pub fn write_heatmap(path: &Path, composite: &CompositeField) -> Result<()> {
    heatmap_image(composite).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

const FIG_IMAGE: f64 = 512.0;
const FIG_LEFT: f64 = 64.0;
const FIG_TOP: f64 = 96.0;
const BAR_W: f64 = 20.0;
const BAR_STOPS: usize = 11;

/// SVG figure around the heatmap PNG at `image_href`.
///
/// `phrases` are in quadrant order; missing entries are labelled "-".
pub fn heatmap_svg(composite: &CompositeField, phrases: &[String], image_href: &str) -> String {
    let (lo, hi) = composite.grid().value_range();
    let label = |q: Quadrant| {
        let phrase = phrases.get(q.index()).map(String::as_str).unwrap_or("-");
        format!("{}: '{}'", q.label(), xml_escape(phrase))
    };
    let [tl, tr, bl, br] = Quadrant::ALL.map(label);
    let bar_x = FIG_LEFT + FIG_IMAGE + 32.0;
    let width = bar_x + BAR_W + 96.0;
    let height = FIG_TOP + FIG_IMAGE + 72.0;
    let centre = FIG_LEFT + FIG_IMAGE / 2.0;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" font-family="sans-serif" font-size="12">
<rect width="100%" height="100%" fill="white"/>
<text x="{centre}" y="24" text-anchor="middle" font-size="15">TRBE-ZyRA 2x2 Multiplexed Beam</text>
<text x="{centre}" y="46" text-anchor="middle">{tl}, {tr}</text>
<text x="{centre}" y="64" text-anchor="middle">{bl}, {br}</text>
"#
    );

    svg.push_str(&format!(
        r#"<image x="{FIG_LEFT}" y="{FIG_TOP}" width="{FIG_IMAGE}" height="{FIG_IMAGE}" preserveAspectRatio="none" style="image-rendering:pixelated" href="{href}" xlink:href="{href}"/>
<text x="{centre}" y="{xl}" text-anchor="middle">X Axis</text>
<text x="20" y="{mid}" text-anchor="middle" transform="rotate(-90 20 {mid})">Y Axis</text>
"#,
        href = xml_escape(image_href),
        xl = FIG_TOP + FIG_IMAGE + 28.0,
        mid = FIG_TOP + FIG_IMAGE / 2.0,
    ));

    // split-line legend, lower left inside the image
    let lx = FIG_LEFT + 12.0;
    let ly = FIG_TOP + FIG_IMAGE - 44.0;
    svg.push_str(&format!(
        r##"<rect x="{lx}" y="{ly}" width="136" height="36" fill="#000" fill-opacity="0.45"/>
<line x1="{a}" y1="{y1}" x2="{b}" y2="{y1}" stroke="white" stroke-dasharray="4 3"/>
<text x="{t}" y="{ty1}" fill="white">Vertical Split</text>
<line x1="{a}" y1="{y2}" x2="{b}" y2="{y2}" stroke="white" stroke-dasharray="4 3"/>
<text x="{t}" y="{ty2}" fill="white">Horizontal Split</text>
"##,
        a = lx + 6.0,
        b = lx + 30.0,
        t = lx + 36.0,
        y1 = ly + 12.0,
        ty1 = ly + 16.0,
        y2 = ly + 26.0,
        ty2 = ly + 30.0,
    ));

    // colour bar: bottom = min, top = max
    let mut stops = String::new();
    for k in 0..BAR_STOPS {
        let t = k as f64 / (BAR_STOPS - 1) as f64;
        stops.push_str(&format!(
            r#"<stop offset="{pct:.0}%" stop-color="{c}"/>"#,
            pct = t * 100.0,
            c = plasma_hex(t)
        ));
    }
    svg.push_str(&format!(
        r##"<defs><linearGradient id="intensity" x1="0" y1="1" x2="0" y2="0">{stops}</linearGradient></defs>
<rect x="{bar_x}" y="{FIG_TOP}" width="{BAR_W}" height="{FIG_IMAGE}" fill="url(#intensity)" stroke="#333"/>
<text x="{tx}" y="{top}">{hi:.3}</text>
<text x="{tx}" y="{bottom}">{lo:.3}</text>
<text x="{lx2}" y="{mid}" text-anchor="middle" transform="rotate(-90 {lx2} {mid})">Field Intensity</text>
</svg>
"##,
        tx = bar_x + BAR_W + 6.0,
        top = FIG_TOP + 10.0,
        bottom = FIG_TOP + FIG_IMAGE,
        lx2 = bar_x + BAR_W + 72.0,
        mid = FIG_TOP + FIG_IMAGE / 2.0,
    ));
    svg
}

// ─── Comparison panels ───────────────────────────────────────────────────────

const PANEL_W: f64 = 560.0;
const PANEL_H: f64 = 400.0;
const MARGIN: f64 = 48.0;

/// One panel's data: phrase, original and decoded curves, score.
pub struct ComparisonPanel<'a> {
    pub row: &'a SimilarityRow,
    pub original: &'a Embedding,
    pub decoded: &'a Embedding,
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn polyline(values: &[f64], x0: f64, y0: f64, lo: f64, hi: f64) -> String {
    let w = PANEL_W - 2.0 * MARGIN;
    let h = PANEL_H - 2.0 * MARGIN;
    let span = if hi > lo { hi - lo } else { 1.0 };
    let step = if values.len() > 1 { w / (values.len() - 1) as f64 } else { 0.0 };
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = x0 + MARGIN + i as f64 * step;
            let y = y0 + MARGIN + h * (1.0 - (v - lo) / span);
            format!("{x:.1},{y:.1} ")
        })
        .collect()
}

/// SVG document with the 2×2 comparison panels in quadrant order.
pub fn comparison_svg(panels: &[ComparisonPanel<'_>]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" font-family="sans-serif" font-size="12">
"#,
        w = 2.0 * PANEL_W,
        h = 2.0 * PANEL_H
    );
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

    for (panel, quadrant) in panels.iter().zip(Quadrant::ALL) {
        let (r, c) = quadrant.block();
        let (x0, y0) = (c as f64 * PANEL_W, r as f64 * PANEL_H);
        let (orig, dec) = (panel.original.as_slice(), panel.decoded.as_slice());
        let (lo, hi) = orig
            .iter()
            .chain(dec)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let phrase = xml_escape(&panel.row.phrase);

        svg.push_str(&format!(
            r##"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="none" stroke="#999"/>"##,
            x = x0 + MARGIN,
            y = y0 + MARGIN,
            w = PANEL_W - 2.0 * MARGIN,
            h = PANEL_H - 2.0 * MARGIN
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="14">'{phrase}' | Similarity: {s:.4}</text>"#,
            x = x0 + PANEL_W / 2.0,
            y = y0 + MARGIN - 16.0,
            s = panel.row.similarity
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r##"<polyline fill="none" stroke="#1f77b4" stroke-width="1" points="{}"/>"##,
            polyline(orig, x0, y0, lo, hi)
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r##"<polyline fill="none" stroke="#ff7f0e" stroke-width="1" stroke-dasharray="4 3" points="{}"/>"##,
            polyline(dec, x0, y0, lo, hi)
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r##"<text x="{x}" y="{y1}" fill="#1f77b4">Original '{phrase}'</text><text x="{x}" y="{y2}" fill="#ff7f0e">Decoded '{phrase}'</text>"##,
            x = x0 + MARGIN + 8.0,
            y1 = y0 + MARGIN + 16.0,
            y2 = y0 + MARGIN + 32.0
        ));
        svg.push('\n');
    }
    svg.push_str("</svg>\n");
    svg
}

/// Paths of the written figures.
#[derive(Debug, Clone)]
pub struct FigurePaths {
    pub heatmap: PathBuf,
    pub heatmap_figure: PathBuf,
    pub comparison: PathBuf,
}

/// Write every figure into `dir`, creating it if needed.
///
/// `phrases` label the heatmap quadrants, in phrase order.
pub fn write_figures(
    dir: &Path,
    composite: &CompositeField,
    phrases: &[String],
    panels: &[ComparisonPanel<'_>],
) -> Result<FigurePaths> {
    fs::create_dir_all(dir)?;
    let heatmap = dir.join(HEATMAP_FILE);
    write_heatmap(&heatmap, composite)?;
    let heatmap_figure = dir.join(HEATMAP_FIGURE_FILE);
    fs::write(&heatmap_figure, heatmap_svg(composite, phrases, HEATMAP_FILE))?;
    let comparison = dir.join(COMPARISON_FILE);
    fs::write(&comparison, comparison_svg(panels))?;
    info!(
        heatmap = %heatmap.display(),
        heatmap_figure = %heatmap_figure.display(),
        comparison = %comparison.display(),
        "figures written"
    );
    Ok(FigurePaths { heatmap, heatmap_figure, comparison })
}
