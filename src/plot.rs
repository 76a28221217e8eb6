//! Damage scatter plot (Ductility vs `Creep_Rate`)
//!
//! One circle per trial at `(Ductility, Creep_Rate)`. Marker area is
//! `Damage * 200` square pixels, so the radius is `sqrt(Damage * 200) / 2`.
//! Rendered to SVG; nothing downstream consumes the image.

use crate::config::{AxisLimits, PlotConfig};
use crate::storage::{TrialTable, DAMAGE_COLUMN};
use crate::{Error, Result};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::info;

/// Marker area per unit of damage, in square pixels
pub const MARKER_AREA_SCALE: f64 = 200.0;

const X_COLUMN: &str = "Ductility";
const Y_COLUMN: &str = "Creep_Rate";
const X_LABEL: &str = "Creep Ductility (low-high)";
const Y_LABEL: &str = "Creep Strain Rate (slow-fast)";

/// Fraction of the data span added on each side in data-range mode
const DATA_RANGE_PADDING: f64 = 0.05;

/// One plotted trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    /// Ductility
    pub x: f64,
    /// Creep rate
    pub y: f64,
    /// Marker radius in pixels
    pub radius: f64,
}

/// Marker radius for a damage value (negative damage draws nothing)
#[must_use]
pub fn marker_radius(damage: f64) -> f64 {
    (damage.max(0.0) * MARKER_AREA_SCALE).sqrt() / 2.0
}

/// Points of the scatter plot, in row order
///
/// # Errors
/// Returns error if a plotted column is missing from the table
pub fn scatter_points(table: &TrialTable) -> Result<Vec<ScatterPoint>> {
    let xs = table.column_values(X_COLUMN)?;
    let ys = table.column_values(Y_COLUMN)?;
    let damage = table.column_values(DAMAGE_COLUMN)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .zip(damage)
        .map(|((x, y), d)| ScatterPoint {
            x,
            y,
            radius: marker_radius(d),
        })
        .collect())
}

/// Axis ranges for the chosen mode
///
/// Row-count mode gives `[0, row_count]` on both axes regardless of the
/// plotted values. Data-range mode pads the column extremes by 5% plus the
/// `f32` rounding of [`TrialTable::column_stats`], so every point lies inside.
///
/// # Errors
/// Returns error if data-range statistics cannot be computed
#[allow(clippy::cast_precision_loss)]
pub fn axis_ranges(table: &TrialTable, limits: AxisLimits) -> Result<(Range<f64>, Range<f64>)> {
    match limits {
        AxisLimits::RowCount => {
            // A zero-width range cannot be mapped onto pixels
            let upper = (table.num_rows() as f64).max(1.0);
            Ok((0.0..upper, 0.0..upper))
        }
        AxisLimits::DataRange => {
            let pad = |name: &str| -> Result<Range<f64>> {
                let stats = table.column_stats(name)?;
                // Stats are f32 reductions; widen by what that rounding can hide
                let slack = stats.min.abs().max(stats.max.abs()) * f64::from(f32::EPSILON);
                let span = (stats.max - stats.min).max(f64::EPSILON);
                let margin = span.mul_add(DATA_RANGE_PADDING, slack);
                Ok((stats.min - margin)..(stats.max + margin))
            };
            Ok((pad(X_COLUMN)?, pad(Y_COLUMN)?))
        }
    }
}

/// Render the scatter plot of `table` to `path` as SVG
///
/// # Errors
/// Returns error if the plotted columns are missing or the file cannot be
/// written
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_scatter(table: &TrialTable, config: &PlotConfig, path: &Path) -> Result<()> {
    let points = scatter_points(table)?;
    let (x_range, y_range) = axis_ranges(table, config.axis_limits)?;
    let plot_err = |e: &dyn std::fmt::Display| Error::PlotError(format!("{}: {e}", path.display()));

    let root = SVGBackend::new(path, config.size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| plot_err(&e))?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .draw()
        .map_err(|e| plot_err(&e))?;

    let style = BLUE.mix(0.6).filled();
    chart
        .draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.x, p.y), p.radius.round() as u32, style)),
        )
        .map_err(|e| plot_err(&e))?;

    root.present().map_err(|e| plot_err(&e))?;
    info!(path = %path.display(), points = points.len(), "rendered damage scatter plot");
    Ok(())
}
