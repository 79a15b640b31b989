use plotters::prelude::*;
use std::path::{Path, PathBuf};
use valuation_core::{ChartRenderer, ChartSpec, ValuationError};

const CHART_SIZE: (u32, u32) = (800, 400);

/// Writes `<dir>/<SYMBOL>_dcf.png`: discounted FCF per year against a flat market cap line.
pub struct PngChartRenderer {
    dir: PathBuf,
}

impl PngChartRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_dcf.png", file_stem(symbol)))
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf, ValuationError> {
        if chart.discounted_fcfs.is_empty() {
            return Err(ValuationError::RenderError("no cash flows to plot".to_string()));
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            ValuationError::RenderError(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.path_for(&chart.symbol);
        draw_chart(&path, chart).map_err(|e| ValuationError::RenderError(e.to_string()))?;
        Ok(path)
    }
}

fn draw_chart(path: &Path, spec: &ChartSpec) -> Result<(), Box<dyn std::error::Error>> {
    let points = spec.points();
    let last_year = points.last().map(|(year, _)| *year).unwrap_or(1);
    let (y_min, y_max) = value_range(&spec.discounted_fcfs, spec.market_cap);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0u32..last_year + 1, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("USD")
        .y_label_formatter(&|v| compact_usd(*v))
        .draw()?;

    chart
        .draw_series(LineSeries::new(points.clone(), &BLUE))?
        .label("Discounted FCF")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())))?;

    chart
        .draw_series(LineSeries::new(
            vec![(0u32, spec.market_cap), (last_year + 1, spec.market_cap)],
            &RED,
        ))?
        .label("Market Cap")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Vertical range covering every value, zero and the market cap, with headroom.
fn value_range(values: &[f64], market_cap: f64) -> (f64, f64) {
    let finite = values.iter().copied().chain(std::iter::once(market_cap)).filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi <= lo {
        return (lo, lo + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
}

/// Axis label such as `$1.5B`.
fn compact_usd(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e12 {
        format!("{}${:.1}T", sign, abs / 1e12)
    } else if abs >= 1e9 {
        format!("{}${:.1}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.1}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.1}K", sign, abs / 1e3)
    } else {
        format!("{}${:.0}", sign, abs)
    }
}

fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}
