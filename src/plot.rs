//! Render the estimated hourly curves to an image.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::regression::HourlyCurves;
use crate::TripError;

const WIDTH: u32 = 2000;
const HEIGHT: u32 = 1000;

/// Render a two-panel chart: speed on the left, tau on the right, both
/// against hour of day, with line and point markers.
///
/// Hours recorded as `NaN` (the sentinel for undeterminable buckets) are left
/// out of the drawn series rather than breaking the chart.
pub fn render_curves(curves: &HourlyCurves, path: &Path) -> Result<(), TripError> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| TripError::Render(e.to_string()))?;
    let (left, right) = root.split_horizontally((WIDTH / 2) as i32);

    draw_panel(
        &left,
        "Estimated speed by hour of day",
        "speed (km/h)",
        &curves.speed,
    )?;
    draw_panel(
        &right,
        "Estimated pickup offset by hour of day",
        "tau (min)",
        &curves.tau,
    )?;

    root.present().map_err(|e| TripError::Render(e.to_string()))?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_label: &str,
    values: &[f64; 24],
) -> Result<(), TripError> {
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(hour, v)| (hour as f64, *v))
        .collect();

    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| {
            (lo.min(v), hi.max(v))
        });
    // Flat or fully-NaN series still need a non-degenerate axis.
    let (y_min, y_max) = if points.is_empty() {
        (0.0, 1.0)
    } else if y_min == y_max {
        (y_min - 1.0, y_max + 1.0)
    } else {
        let pad = (y_max - y_min) * 0.05;
        (y_min - pad, y_max + pad)
    };

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..23.5, y_min..y_max)
        .map_err(|e| TripError::Render(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("hour of day")
        .y_desc(y_label)
        .draw()
        .map_err(|e| TripError::Render(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(|e| TripError::Render(e.to_string()))?;
    chart
        .draw_series(points.iter().map(|p| Circle::new(*p, 4, BLUE.filled())))
        .map_err(|e| TripError::Render(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Writes an actual image; needs a writable temp dir and font support.
    #[ignore]
    #[test]
    fn render_writes_image() {
        let curves = HourlyCurves {
            tau: [1.0; 24],
            speed: [30.0; 24],
        };
        let path = std::env::temp_dir().join("taxi_trips_curves.png");
        render_curves(&curves, &path).unwrap();
        assert!(path.exists());
    }
}
