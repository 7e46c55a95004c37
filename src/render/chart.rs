use std::io::Cursor;
use std::ops::Range;

use image::{ImageFormat, RgbImage};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};

use crate::config::AnalysisConfig;
use crate::data::datetime::{format_axis_label, to_axis_value};
use crate::error::{AnalysisError, Result};
use crate::render::glyphs::GlyphBackend;
use crate::state::series::{AccelerationPoint, Extrema, IndexedSample, Series};
use crate::state::theme::{color_for_index, Theme};

pub const PLOT_ORIGINAL: &str = "plot_1_original.png";
pub const PLOT_MOVING_AVERAGE: &str = "plot_2_ma.png";
pub const PLOT_PEAKS_TROUGHS: &str = "plot_3_peaks_troughs.png";
pub const PLOT_BELOW_THRESHOLD: &str = "plot_4_below20.png";
pub const PLOT_ACCELERATION: &str = "plot_5_acceleration.png";

/// Chart file names in presentation order.
pub const CHART_NAMES: [&str; 5] = [
    PLOT_ORIGINAL,
    PLOT_MOVING_AVERAGE,
    PLOT_PEAKS_TROUGHS,
    PLOT_BELOW_THRESHOLD,
    PLOT_ACCELERATION,
];

const LINE_WIDTH: u32 = 2;
const MARKER_RADIUS: u32 = 3;
const ACCEL_MARKER_RADIUS: u32 = 4;
const TITLE_FONT_SIZE: f64 = 20.0;
const LABEL_FONT_SIZE: f64 = 10.0;

/// Something drawn on top of the raw series line.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// A second line sharing the series' x positions.
    Line { label: String, y: Vec<f64> },
    /// Scatter markers at `(x, y)` data coordinates.
    Markers {
        label: String,
        points: Vec<(f64, f64)>,
        radius: u32,
    },
}

impl Overlay {
    fn markers(label: &str, samples: &[IndexedSample], radius: u32) -> Self {
        Overlay::Markers {
            label: label.to_string(),
            points: samples
                .iter()
                .map(|s| (to_axis_value(s.timestamp), s.value))
                .collect(),
            radius,
        }
    }

    /// Markers at the given series positions; out-of-range indices are skipped.
    fn markers_at(label: &str, series: &Series, indices: &[usize], radius: u32) -> Self {
        let samples: Vec<IndexedSample> = indices
            .iter()
            .filter_map(|&i| IndexedSample::from_series(series, i))
            .collect();
        Self::markers(label, &samples, radius)
    }

    pub fn label(&self) -> &str {
        match self {
            Overlay::Line { label, .. } | Overlay::Markers { label, .. } => label,
        }
    }
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub file_name: &'static str,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub base_label: String,
    pub overlays: Vec<Overlay>,
}

impl ChartSpec {
    fn new(file_name: &'static str, title: &str, overlays: Vec<Overlay>) -> Self {
        Self {
            file_name,
            title: title.to_string(),
            x_label: "Timestamp".to_string(),
            y_label: "Voltage".to_string(),
            base_label: "Voltage".to_string(),
            overlays,
        }
    }
}

/// The five standard charts for one analysis. Empty marker sets are kept
/// as empty overlays.
pub fn chart_specs(
    series: &Series,
    extrema: &Extrema,
    below: &[IndexedSample],
    acceleration: &[AccelerationPoint],
    config: &AnalysisConfig,
) -> Vec<ChartSpec> {
    vec![
        ChartSpec::new(PLOT_ORIGINAL, "Original Voltage Data", Vec::new()),
        ChartSpec::new(
            PLOT_MOVING_AVERAGE,
            &format!("Voltage with {}-point Moving Average", series.window()),
            vec![Overlay::Line {
                label: format!("{}-point MA", series.window()),
                y: series.moving_average().to_vec(),
            }],
        ),
        ChartSpec::new(
            PLOT_PEAKS_TROUGHS,
            "Local Peaks & Troughs",
            vec![
                Overlay::markers_at("Peaks", series, &extrema.peak_indices(), MARKER_RADIUS),
                Overlay::markers_at("Troughs", series, &extrema.trough_indices(), MARKER_RADIUS),
            ],
        ),
        ChartSpec::new(
            PLOT_BELOW_THRESHOLD,
            &format!("Voltage Below {}", config.threshold),
            vec![Overlay::markers(
                &format!("Voltage < {}", config.threshold),
                below,
                MARKER_RADIUS,
            )],
        ),
        ChartSpec::new(
            PLOT_ACCELERATION,
            "Downward Acceleration Points",
            vec![Overlay::markers(
                "Downward Acceleration",
                acceleration,
                ACCEL_MARKER_RADIUS,
            )],
        ),
    ]
}

/// Padded `(x, y)` ranges covering every finite point. Each axis gets 5%
/// padding per side; a degenerate axis is widened by 0.5 each way and an
/// empty one falls back to `0..1`.
pub fn axis_ranges(points: impl IntoIterator<Item = (f64, f64)>) -> (Range<f64>, Range<f64>) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for (x, y) in points {
        if x.is_finite() {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
        }
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    (pad_axis(x_min, x_max), pad_axis(y_min, y_max))
}

fn pad_axis(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = (max - min) * 0.05;
    let pad = if pad.abs() < 1e-15 { 0.5 } else { pad };
    (min - pad)..(max + pad)
}

/// Consecutive finite points; a NaN or infinite value breaks the line.
fn line_segments(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (&x, &y) in xs.iter().zip(ys) {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Rasterise one chart and return it PNG-encoded.
pub fn render_chart(
    spec: &ChartSpec,
    series: &Series,
    width: u32,
    height: u32,
    theme: &Theme,
) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = GlyphBackend::new(BitMapBackend::with_buffer(&mut buffer, (width, height)))
            .into_drawing_area();
        draw_chart(&root, spec, series, theme)
            .and_then(|()| root.present())
            .map_err(|e| AnalysisError::Render(e.to_string()))?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| AnalysisError::Render(format!("bad {width}x{height} pixel buffer")))?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    series: &Series,
    theme: &Theme,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let xs: Vec<f64> = series
        .samples()
        .iter()
        .map(|s| to_axis_value(s.timestamp))
        .collect();
    let ys = series.values();

    let mut extent: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    for overlay in &spec.overlays {
        match overlay {
            Overlay::Line { y, .. } => extent.extend(xs.iter().copied().zip(y.iter().copied())),
            Overlay::Markers { points, .. } => extent.extend(points.iter().copied()),
        }
    }
    let (x_range, y_range) = axis_ranges(extent);

    root.fill(&theme.background)?;
    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, font(TITLE_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(5)
        .y_labels(6)
        .x_label_formatter(&|x| format_axis_label(*x))
        .axis_style(&theme.frame)
        .bold_line_style(&theme.grid)
        .light_line_style(&theme.background)
        .label_style(font(LABEL_FONT_SIZE))
        .draw()?;

    draw_line(&mut chart, &spec.base_label, &xs, &ys, color_for_index(0))?;
    for (i, overlay) in spec.overlays.iter().enumerate() {
        let color = color_for_index(i + 1);
        match overlay {
            Overlay::Line { label, y } => draw_line(&mut chart, label, &xs, y, color)?,
            Overlay::Markers { label, points, radius } => {
                if points.is_empty() {
                    continue;
                }
                let radius = *radius;
                chart
                    .draw_series(
                        points
                            .iter()
                            .filter(|(x, y)| x.is_finite() && y.is_finite())
                            .map(|&(x, y)| Circle::new((x, y), radius, color.filled())),
                    )?
                    .label(label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), radius, color.filled()));
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(font(LABEL_FONT_SIZE))
        .background_style(&theme.background.mix(0.8))
        .border_style(&theme.grid)
        .draw()?;
    Ok(())
}

/// Draw `ys` against `xs` as one labelled line, broken at missing values.
fn draw_line<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    label: &str,
    xs: &[f64],
    ys: &[f64],
    color: RGBColor,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let style = color.stroke_width(LINE_WIDTH);
    for segment in line_segments(xs, ys) {
        chart.draw_series(LineSeries::new(segment, style))?;
    }
    chart
        .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), style))?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    Ok(())
}
