// Two-panel SVG plot of the word map.
//
// The top panel is a scatter of the projected points coloured by cluster;
// the bottom panel draws each word at its point in the cluster colour. Both
// panels share the same data-range axes.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::cluster_color;
use crate::pipeline::word_map::WordMap;

const PANEL_WIDTH: f64 = 800.0;
const PANEL_HEIGHT: f64 = 800.0;
const MARGIN: f64 = 40.0;
const POINT_RADIUS: f64 = 5.0;
const LABEL_FONT: &str = "SimHei, 'Noto Sans CJK SC', sans-serif";
const LABEL_SIZE: u32 = 20;

/// Render the word map as an SVG document.
pub fn render_svg(map: &WordMap) -> String {
    let (x_range, y_range) = data_ranges(map);
    let total_height = PANEL_HEIGHT * 2.0;
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{PANEL_WIDTH}" height="{total_height}" viewBox="0 0 {PANEL_WIDTH} {total_height}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="white"/>"#
    );

    for panel in 0..2 {
        let top = panel as f64 * PANEL_HEIGHT;
        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="black"/>"#,
            MARGIN,
            top + MARGIN,
            PANEL_WIDTH - 2.0 * MARGIN,
            PANEL_HEIGHT - 2.0 * MARGIN
        );
    }

    for (i, word) in map.words.iter().enumerate() {
        let (r, g, b) = cluster_color(map.labels.get(i).copied().unwrap_or(0));
        // Missing coordinates (fewer than two columns) sit on the axis
        let coord = |c: usize| map.points.get([i, c]).copied().unwrap_or(0.0);
        let x = scale(coord(0), x_range, MARGIN, PANEL_WIDTH - MARGIN);
        // SVG y grows downward; flip so larger values are higher up
        let y = scale(coord(1), y_range, PANEL_HEIGHT - MARGIN, MARGIN);

        let _ = writeln!(
            svg,
            r#"<circle cx="{x:.2}" cy="{y:.2}" r="{POINT_RADIUS}" fill="rgb({r},{g},{b})"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x:.2}" y="{:.2}" font-family="{LABEL_FONT}" font-size="{LABEL_SIZE}" fill="rgb({r},{g},{b})">{}</text>"#,
            y + PANEL_HEIGHT,
            escape_xml(word)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render and write the plot, creating parent directories as needed.
pub fn write_svg(map: &WordMap, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, render_svg(map))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), words = map.words.len(), "Wrote word map plot");
    Ok(())
}

/// Min/max of each coordinate, widened when degenerate.
fn data_ranges(map: &WordMap) -> ((f64, f64), (f64, f64)) {
    let range = |col: usize| {
        if col >= map.points.ncols() {
            return (-1.0, 1.0);
        }
        let (lo, hi) = map
            .points
            .column(col)
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() || !hi.is_finite() {
            (-1.0, 1.0)
        } else if hi - lo < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        }
    };
    (range(0), range(1))
}

fn scale(value: f64, (lo, hi): (f64, f64), out_lo: f64, out_hi: f64) -> f64 {
    out_lo + (value - lo) / (hi - lo) * (out_hi - out_lo)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn sample_map() -> WordMap {
        WordMap {
            words: vec!["中文".into(), "a&b".into()],
            labels: vec![0, 1],
            points: array![[0.0, 0.0], [1.0, 2.0]],
            skipped: vec![],
            n_clusters: 2,
        }
    }

    #[test]
    fn test_render_contains_words_and_points() {
        let svg = render_svg(&sample_map());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(">中文</text>"));
        assert!(svg.contains(">a&amp;b</text>"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_render_single_column_points() {
        let mut map = sample_map();
        map.points = array![[0.5], [1.5]];
        let svg = render_svg(&map);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(">中文</text>"));
        let (x, y) = data_ranges(&map);
        assert_eq!(x, (0.5, 1.5));
        assert_eq!(y, (-1.0, 1.0));
    }

    #[test]
    fn test_render_missing_rows() {
        let mut map = sample_map();
        map.points = Array2::zeros((0, 2));
        let svg = render_svg(&map);
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_scale_maps_extremes() {
        assert_eq!(scale(0.0, (0.0, 1.0), 40.0, 760.0), 40.0);
        assert_eq!(scale(1.0, (0.0, 1.0), 40.0, 760.0), 760.0);
        // flipped axis
        assert_eq!(scale(1.0, (0.0, 1.0), 760.0, 40.0), 40.0);
    }

    #[test]
    fn test_degenerate_range_is_widened() {
        let mut map = sample_map();
        map.points = array![[3.0, 3.0], [3.0, 3.0]];
        let (x, y) = data_ranges(&map);
        assert_eq!(x, (2.0, 4.0));
        assert_eq!(y, (2.0, 4.0));
    }
}
