//! Renderers for analysis results.
//!
//! - [`MetricsRenderer`]: fixed-layout text readout. p-values in scientific
//!   notation, counts as integers, everything else to 6 decimals; undefined
//!   values print as `-`.
//! - [`JsonRenderer`]: `serde_json` records. NaN fields serialize as `null`.

use std::fmt::Write;

use crate::correlation::AnalysisResult;
use crate::error::ScatterError;
use crate::interfaces::Renderer;
use crate::surface::SurfaceAnalysis;

const LABEL_WIDTH: usize = 14;

// ── Metrics text ──────────────────────────────────────────────────────

/// Plain-text metrics readout.
///
/// ```
/// use u_scatter::correlation::CorrelationAnalyzer;
/// use u_scatter::dataset::{Column, Dataset};
/// use u_scatter::interfaces::Renderer;
/// use u_scatter::report::MetricsRenderer;
///
/// let ds = Dataset::from_columns([
///     ("x", Column::dense(vec![1.0, 2.0, 3.0, 4.0])),
///     ("y", Column::dense(vec![2.0, 4.1, 5.9, 8.0])),
/// ]).unwrap();
/// let result = CorrelationAnalyzer::new().analyze(&ds, "x", "y").unwrap();
/// let text = MetricsRenderer.render_analysis(&result).unwrap();
/// assert!(text.contains("Data Points:  4"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRenderer;

impl Renderer for MetricsRenderer {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn render_analysis(&self, r: &AnalysisResult) -> Result<String, ScatterError> {
        let mut out = String::new();
        writeln!(out, "Linearity Metrics ({} vs {})", r.column_y, r.column_x)?;
        line(&mut out, "Slope:", &decimal(r.slope))?;
        line(&mut out, "Intercept:", &decimal(r.intercept))?;
        line(&mut out, "R²:", &decimal(r.r_squared))?;
        line(&mut out, "RMSE:", &decimal(r.rmse))?;
        line(&mut out, "Pearson r:", &decimal(r.pearson_r))?;
        line(&mut out, "P-value:", &scientific(r.p_value))?;
        line(&mut out, "Std. error:", &decimal(r.std_err))?;
        line(&mut out, "Data Points:", &r.sample_size.to_string())?;
        line(&mut out, "Rows dropped:", &r.rows_dropped.to_string())?;
        Ok(out)
    }

    fn render_surface(&self, s: &SurfaceAnalysis) -> Result<String, ScatterError> {
        let mut out = String::new();
        let (w, h) = s.grid.resolution;
        writeln!(
            out,
            "Surface Metrics ({} over {}, {})",
            s.column_z, s.column_x, s.column_y
        )?;
        line(&mut out, "Method:", s.grid.method.as_str())?;
        line(&mut out, "Grid:", &format!("{w} x {h}"))?;
        line(&mut out, "Min:", &decimal(s.stats.min))?;
        line(&mut out, "Max:", &decimal(s.stats.max))?;
        line(&mut out, "Mean:", &decimal(s.stats.mean))?;
        line(&mut out, "Std:", &decimal(s.stats.std))?;
        line(
            &mut out,
            "Max gradient:",
            &s.stats.gradient_max.map_or_else(|| "-".to_string(), decimal),
        )?;
        line(&mut out, "Data cells:", &s.stats.data_cells.to_string())?;
        line(&mut out, "Empty cells:", &s.stats.empty_cells.to_string())?;
        line(&mut out, "Data Points:", &s.sample_size.to_string())?;
        Ok(out)
    }
}

fn line(out: &mut String, label: &str, value: &str) -> std::fmt::Result {
    writeln!(out, "{label:<width$}{value}", width = LABEL_WIDTH)
}

fn decimal(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.6}")
    } else {
        "-".to_string()
    }
}

/// Four-digit mantissa with a signed, two-digit exponent: `1.2346e-05`.
fn scientific(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let formatted = format!("{v:.4e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

// ── JSON ──────────────────────────────────────────────────────────────

/// JSON renderer over the results' `serde` representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn encode<T: serde::Serialize>(&self, value: &T) -> Result<String, ScatterError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(encoded)
    }
}

impl Renderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render_analysis(&self, result: &AnalysisResult) -> Result<String, ScatterError> {
        self.encode(result)
    }

    fn render_surface(&self, surface: &SurfaceAnalysis) -> Result<String, ScatterError> {
        self.encode(surface)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
