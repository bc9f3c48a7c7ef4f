//! Static Chart Renderer
//! Draws planned charts to PNG files with plotters.
//!
//! Layout per kind:
//! - Bar: categories on X with rotated labels, value on Y
//! - HorizontalBar: categories on Y (first on top), value on X
//! - Pie: two-slice share with percentages
//! - Line / DualLine: years on X, secondary Y axis on the right for DualLine

use crate::charts::plotter::{ChartData, ChartKind, PALETTE, PIE_COLORS};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const FONT: &str = "sans-serif";
const PRIMARY: RGBColor = RGBColor(52, 152, 219); // Blue
const SECONDARY: RGBColor = RGBColor(231, 76, 60); // Red

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn StdError>>;

pub struct StaticChartRenderer {
    output_dir: PathBuf,
    size: (u32, u32),
}

impl StaticChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            output_dir: output_dir.into(),
            size,
        }
    }

    /// Create the output directory if needed.
    pub fn prepare(&self) -> Result<(), ChartError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ChartError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Draw one chart and return the written file path.
    pub fn render(&self, chart: &ChartData) -> Result<PathBuf, ChartError> {
        let path = self.output_dir.join(&chart.file_name);
        Self::draw(chart, &path, self.size).map_err(|e| ChartError::Render {
            path: path.clone(),
            message: e.to_string(),
        })?;
        info!(path = %path.display(), "chart saved");
        Ok(path)
    }

    fn draw(chart: &ChartData, path: &Path, size: (u32, u32)) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        match &chart.kind {
            ChartKind::Bar { labels, values } => Self::draw_bars(&root, chart, labels, values)?,
            ChartKind::HorizontalBar { labels, values } => {
                Self::draw_horizontal_bars(&root, chart, labels, values)?
            }
            ChartKind::Pie { labels, values } => Self::draw_pie(&root, chart, labels, values)?,
            ChartKind::Line { points } => Self::draw_line(&root, chart, points)?,
            ChartKind::DualLine {
                primary,
                primary_label,
                secondary,
                secondary_label,
            } => Self::draw_dual_line(
                &root,
                chart,
                (primary, primary_label),
                (secondary, secondary_label),
            )?,
        }

        root.present()?;
        Ok(())
    }

    fn draw_bars(root: &Area<'_>, chart: &ChartData, labels: &[String], values: &[f64]) -> DrawResult {
        let n = labels.len() as u32;
        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 28))
            .margin(15)
            .x_label_area_size(160)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..axis_max(values))?;

        let label_style = (FONT, 14).into_font().transform(FontTransform::Rotate90);
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_labels(labels.len())
            .x_label_style(label_style)
            .x_label_formatter(&|x| segment_label(labels, x, false))
            .draw()?;

        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style_func(|x, _| bar_color(x).filled())
                .margin(8)
                .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
        )?;
        Ok(())
    }

    fn draw_horizontal_bars(
        root: &Area<'_>,
        chart: &ChartData,
        labels: &[String],
        values: &[f64],
    ) -> DrawResult {
        let n = labels.len() as u32;
        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 28))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(220)
            .build_cartesian_2d(0f64..axis_max(values), (0u32..n).into_segmented())?;

        ctx.configure_mesh()
            .disable_y_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .y_labels(labels.len())
            .y_label_formatter(&|y| segment_label(labels, y, true))
            .draw()?;

        // Row 0 is drawn at the top of the axis
        ctx.draw_series(
            Histogram::horizontal(&ctx)
                .style_func(|y, _| bar_color(y).filled())
                .margin(6)
                .data(
                    values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (n - 1 - i as u32, *v)),
                ),
        )?;
        Ok(())
    }

    fn draw_pie(root: &Area<'_>, chart: &ChartData, labels: &[String], values: &[f64]) -> DrawResult {
        let area = root.titled(&chart.title, (FONT, 28))?;
        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;
        let colors: Vec<RGBColor> = PIE_COLORS.iter().cycle().take(values.len()).copied().collect();

        let mut pie = Pie::new(&center, &radius, values, &colors, labels);
        pie.start_angle(-90.0);
        pie.label_style((FONT, 22).into_font().color(&BLACK));
        pie.percentages((FONT, 20).into_font().color(&BLACK));
        area.draw(&pie)?;
        Ok(())
    }

    fn draw_line(root: &Area<'_>, chart: &ChartData, points: &[(i64, f64)]) -> DrawResult {
        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 28))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(year_range(points), 0f64..axis_max(&values))?;

        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_label_formatter(&|year| year.to_string())
            .draw()?;

        ctx.draw_series(LineSeries::new(
            points.iter().map(|(year, v)| (*year as i32, *v)),
            PRIMARY.stroke_width(2),
        ))?;
        ctx.draw_series(
            points
                .iter()
                .map(|(year, v)| Circle::new((*year as i32, *v), 4, PRIMARY.filled())),
        )?;
        Ok(())
    }

    fn draw_dual_line(
        root: &Area<'_>,
        chart: &ChartData,
        primary: (&[(i64, f64)], &str),
        secondary: (&[(i64, f64)], &str),
    ) -> DrawResult {
        let (primary_points, primary_label) = primary;
        let (secondary_points, secondary_label) = secondary;
        let primary_max = primary_points.iter().map(|(_, v)| *v).fold(1.0, f64::max) * 1.05;
        let secondary_values: Vec<f64> = secondary_points.iter().map(|(_, v)| *v).collect();
        let years = year_range(primary_points);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 28))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .right_y_label_area_size(70)
            .build_cartesian_2d(years.clone(), 0f64..primary_max)?
            .set_secondary_coord(years, 0f64..axis_max(&secondary_values));

        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_label_formatter(&|year| year.to_string())
            .y_label_style((FONT, 14).into_font().color(&PRIMARY))
            .draw()?;
        ctx.configure_secondary_axes()
            .y_desc(secondary_label)
            .label_style((FONT, 14).into_font().color(&SECONDARY))
            .draw()?;

        ctx.draw_series(LineSeries::new(
            primary_points.iter().map(|(year, v)| (*year as i32, *v)),
            PRIMARY.stroke_width(2),
        ))?
        .label(primary_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PRIMARY.stroke_width(2)));

        ctx.draw_secondary_series(LineSeries::new(
            secondary_points.iter().map(|(year, v)| (*year as i32, *v)),
            SECONDARY.stroke_width(2),
        ))?
        .label(secondary_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SECONDARY.stroke_width(2)));

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    }
}

/// Upper bound for a value axis with 10% headroom.
fn axis_max(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Year axis padded by one on each side.
fn year_range(points: &[(i64, f64)]) -> std::ops::Range<i32> {
    let first = points.iter().map(|(y, _)| *y).min().unwrap_or(0) as i32;
    let last = points.iter().map(|(y, _)| *y).max().unwrap_or(0) as i32;
    (first - 1)..(last + 1)
}

fn segment_index(value: &SegmentValue<u32>) -> Option<usize> {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => Some(*i as usize),
        SegmentValue::Last => None,
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<u32>, top_down: bool) -> String {
    let Some(index) = segment_index(value) else {
        return String::new();
    };
    let index = if top_down {
        match labels.len().checked_sub(1 + index) {
            Some(i) => i,
            None => return String::new(),
        }
    } else {
        index
    };
    labels.get(index).cloned().unwrap_or_default()
}

fn bar_color(value: &SegmentValue<u32>) -> RGBColor {
    PALETTE[segment_index(value).unwrap_or(0) % PALETTE.len()]
}
