//! SVG pictures of a chain over its problem's regions.
//!
//! One-dimensional systems get each `B_i` plotted over the state space with
//! its 0-sublevel set shaded. Two-dimensional systems get the 0-sublevel
//! sets as shaded cells of a sample grid. Both show the initial and unsafe
//! boxes.

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

use crate::config::IbcProblem;
use crate::numeric::linspace;
use crate::region::Region;
use crate::template::NumericChain;

const SIZE: (u32, u32) = (640, 420);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PALETTE: [RGBColor; 5] = [BLUE, MAGENTA, CYAN, BLACK, ORANGE];
const INITIAL_COLOR: RGBColor = GREEN;
const UNSAFE_COLOR: RGBColor = RED;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render a {0}-dimensional state space")]
    UnsupportedDimension(usize),
    #[error("chain has no certificates")]
    EmptyChain,
    #[error("need at least 2 samples per axis, got {0}")]
    TooFewSamples(usize),
    #[error("B_{certificate} is not finite on the sample grid")]
    NonFinite { certificate: usize },
    #[error("Plot backend error: {0}")]
    Backend(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Backend(e.to_string())
    }
}

fn color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Widen a degenerate or reversed range so the chart has a nonzero extent.
fn padded(lo: f64, hi: f64) -> Range<f64> {
    if hi > lo {
        let pad = (hi - lo) * 0.05;
        (lo - pad)..(hi + pad)
    } else {
        (lo - 1.0)..(lo + 1.0)
    }
}

pub fn render_svg<C: NumericChain>(
    problem: &IbcProblem,
    chain: &C,
    samples: usize,
    labels: &[&str],
) -> Result<String, RenderError> {
    if chain.certificate_count() == 0 {
        return Err(RenderError::EmptyChain);
    }
    if samples < 2 {
        return Err(RenderError::TooFewSamples(samples));
    }
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        match problem.dim() {
            1 => {
                let label = labels.first().copied().unwrap_or("x");
                draw_1d(&root, problem, chain, samples, label)?
            }
            2 => draw_2d(&root, problem, chain, samples, labels)?,
            dim => return Err(RenderError::UnsupportedDimension(dim)),
        }
        root.present()?;
    }
    Ok(svg)
}

pub fn write_svg(path: &Path, svg: &str) -> Result<(), RenderError> {
    std::fs::write(path, svg).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Bounds of `region` as a rectangle in chart coordinates. A 1-D region
/// spans the whole vertical range `y`.
fn region_box(region: &Region, y: &Range<f64>) -> [(f64, f64); 2] {
    let axes = region.axes();
    let (bottom, top) = match axes.get(1) {
        Some(a) => (a.low, a.high),
        None => (y.start, y.end),
    };
    [(axes[0].low, bottom), (axes[0].high, top)]
}

fn draw_1d<C: NumericChain>(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    problem: &IbcProblem,
    chain: &C,
    samples: usize,
    label: &str,
) -> Result<(), RenderError> {
    let space = &problem.state_space().axes()[0];
    let xs = linspace(space.low, space.high, samples);
    let mut curves = Vec::with_capacity(chain.certificate_count());
    for i in 0..chain.certificate_count() {
        let ys: Vec<f64> = xs.iter().map(|&x| chain.eval(i, &[x])).collect();
        if ys.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::NonFinite { certificate: i });
        }
        curves.push(ys);
    }
    let (lo, hi) = curves
        .iter()
        .flatten()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let y_range = padded(lo, hi);

    let mut chart = ChartBuilder::on(root)
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(padded(space.low, space.high), y_range.clone())?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(format!("{label}(t)"))
        .y_desc("B_i")
        .draw()?;

    for (name, region, fill) in [
        ("Initial", problem.initial(), INITIAL_COLOR),
        ("Unsafe", problem.unsafe_set(), UNSAFE_COLOR),
    ] {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                region_box(region, &y_range),
                fill.mix(0.35).filled(),
            )))?
            .label(name)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], fill.mix(0.35).filled())
            });
    }

    let half_step = (xs[1] - xs[0]) / 2.0;
    for (i, ys) in curves.iter().enumerate() {
        let c = color(i);
        chart.draw_series(
            xs.iter()
                .zip(ys)
                .filter(|&(_, &y)| y <= 0.0)
                .map(|(&x, &y)| {
                    Rectangle::new([(x - half_step, y), (x + half_step, 0.0)], c.mix(0.15).filled())
                }),
        )?;
        chart
            .draw_series(LineSeries::new(
                xs.iter().copied().zip(ys.iter().copied()),
                c.stroke_width(2),
            ))?
            .label(format!("B{i}"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], c.stroke_width(2)));
    }
    chart.draw_series(LineSeries::new(
        vec![(space.low, 0.0), (space.high, 0.0)],
        &BLACK,
    ))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

/// Grid cells, centred on the sample points, where `B_certificate <= 0`.
fn sublevel_cells<C: NumericChain>(
    problem: &IbcProblem,
    chain: &C,
    certificate: usize,
    samples: usize,
) -> Vec<[(f64, f64); 2]> {
    let axes = problem.state_space().axes();
    let xs = linspace(axes[0].low, axes[0].high, samples);
    let ys = linspace(axes[1].low, axes[1].high, samples);
    let half_w = (xs[1] - xs[0]) / 2.0;
    let half_h = (ys[1] - ys[0]) / 2.0;
    let mut cells = Vec::new();
    for &y in &ys {
        for &x in &xs {
            if chain.eval(certificate, &[x, y]) <= 0.0 {
                cells.push([(x - half_w, y - half_h), (x + half_w, y + half_h)]);
            }
        }
    }
    cells
}

fn draw_2d<C: NumericChain>(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    problem: &IbcProblem,
    chain: &C,
    samples: usize,
    labels: &[&str],
) -> Result<(), RenderError> {
    let axes = problem.state_space().axes();
    let (sx, sy) = (&axes[0], &axes[1]);
    let y_range = padded(sy.low, sy.high);

    let mut chart = ChartBuilder::on(root)
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(48)
        .build_cartesian_2d(padded(sx.low, sx.high), y_range.clone())?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(labels.first().copied().unwrap_or("x0"))
        .y_desc(labels.get(1).copied().unwrap_or("x1"))
        .draw()?;

    for i in 0..chain.certificate_count() {
        let c = color(i);
        chart
            .draw_series(
                sublevel_cells(problem, chain, i, samples)
                    .into_iter()
                    .map(|cell| Rectangle::new(cell, c.mix(0.3).filled())),
            )?
            .label(format!("B{i}"))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], c.mix(0.3).filled())
            });
    }

    for (name, region, fill) in [
        ("Initial", problem.initial(), INITIAL_COLOR),
        ("Unsafe", problem.unsafe_set(), UNSAFE_COLOR),
    ] {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                region_box(region, &y_range),
                fill.mix(0.35).filled(),
            )))?
            .label(name)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], fill.mix(0.35).filled())
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems;

    #[test]
    fn one_dimensional_plot_has_a_curve_per_certificate() {
        let problem = systems::linear_1d().expect("built-in");
        let svg = render_svg(&problem, &systems::linear_1d_chain(), 100, &["x"]).expect("render");
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(">B0</text>"));
        assert!(svg.contains(">B1</text>"));
        assert!(svg.contains(">Unsafe</text>"));
        assert!(svg.contains(">x(t)</text>"));
        let upper = svg.to_ascii_uppercase();
        assert!(upper.contains("#0000FF"));
        assert!(upper.contains("#FF00FF"));
    }

    #[test]
    fn two_dimensional_plot_shades_sublevel_cells() {
        let problem = systems::lotka_volterra().expect("built-in");
        let chain = systems::lotka_volterra_chain();
        let svg = render_svg(&problem, &chain, 30, &["v", "p"]).expect("render");
        assert!(svg.contains(">v</text>"));
        assert!(svg.contains(">p</text>"));
        assert!(svg.contains(">Initial</text>"));
        assert!(svg.matches("<rect").count() > 30);
    }

    #[test]
    fn sublevel_cells_sit_on_nonpositive_samples() {
        let problem = systems::lotka_volterra().expect("built-in");
        let chain = systems::lotka_volterra_chain();
        for i in 0..chain.certificate_count() {
            let cells = sublevel_cells(&problem, &chain, i, 30);
            assert!(!cells.is_empty(), "B{i} has an empty sublevel set");
            for [(x0, y0), (x1, y1)] in cells {
                let centre = [(x0 + x1) / 2.0, (y0 + y1) / 2.0];
                assert!(chain.eval(i, &centre) <= 1e-9);
            }
        }
    }

    #[test]
    fn degenerate_inputs_are_errors() {
        let problem = systems::linear_1d().expect("built-in");
        assert!(matches!(
            render_svg(&problem, &systems::linear_1d_chain(), 1, &[]),
            Err(RenderError::TooFewSamples(1))
        ));
        let empty = crate::template::FixedChain::new(Vec::new());
        assert!(matches!(
            render_svg(&problem, &empty, 10, &[]),
            Err(RenderError::EmptyChain)
        ));
        struct Nan;
        impl NumericChain for Nan {
            fn certificate_count(&self) -> usize {
                1
            }
            fn eval(&self, _: usize, _: &[f64]) -> f64 {
                f64::NAN
            }
        }
        assert!(matches!(
            render_svg(&problem, &Nan, 10, &[]),
            Err(RenderError::NonFinite { certificate: 0 })
        ));
    }

    #[test]
    fn backend_errors_keep_their_message() {
        let err: RenderError = DrawingAreaErrorKind::<std::io::Error>::LayoutError.into();
        assert!(matches!(err, RenderError::Backend(_)));
    }

    #[test]
    fn write_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("no-such-dir").join("plot.svg");
        let err = write_svg(&missing, "<svg/>").unwrap_err();
        assert!(err.to_string().contains("plot.svg"));
        let ok = dir.path().join("plot.svg");
        write_svg(&ok, "<svg/>").expect("write");
        assert_eq!(std::fs::read_to_string(ok).expect("read"), "<svg/>");
    }
}
