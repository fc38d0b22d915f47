//! Pairwise linear-correlation diagnostics.
//!
//! [`CorrelationAnalyzer`] fits `y = slope·x + intercept` by ordinary least
//! squares over the rows valid for both columns and reports goodness of fit,
//! Pearson's r and the significance of the slope.
//!
//! # Degenerate inputs
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | fewer than 2 valid rows | [`InsufficientData`](ScatterError::InsufficientData) |
//! | `x` has zero variance | [`DegenerateInput`](ScatterError::DegenerateInput) |
//! | `y` has zero variance, distinct columns | [`DegenerateInput`](ScatterError::DegenerateInput) |
//! | `column_x == column_y` | exact `slope = 1`, `intercept = 0`, `r² = 1`, `rmse = 0`, `r = 1`, constant columns included |
//! | exactly 2 valid rows | `std_err`, `p_value` and `slope_ci` are NaN (`df = 0`) |
//!
//! # Example
//!
//! ```
//! use u_scatter::correlation::CorrelationAnalyzer;
//! use u_scatter::dataset::{Column, Dataset};
//!
//! let ds = Dataset::from_columns([
//!     ("x", Column::dense(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
//!     ("y", Column::dense(vec![5.0, 7.0, 9.0, 11.0, 13.0])),
//! ]).unwrap();
//!
//! let result = CorrelationAnalyzer::new().analyze(&ds, "x", "y").unwrap();
//! assert_eq!(result.slope, 2.0);
//! assert_eq!(result.intercept, 3.0);
//! assert_eq!(result.r_squared, 1.0);
//! assert_eq!(result.sample_size, 5);
//! ```

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use crate::dataset::Dataset;
use crate::error::ScatterError;
use crate::interfaces::Analyzer;
use crate::selection::{count_valid_rows, select_pair, ColumnSelection, PairedSamples};

/// Minimum number of valid rows for a fit.
pub const MIN_SAMPLES: usize = 2;

// ── Options ───────────────────────────────────────────────────────────

/// Options for correlation analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationOptions {
    /// Two-sided confidence level for [`AnalysisResult::slope_ci`]. Default: 0.95.
    pub confidence_level: f64,
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }
}

impl CorrelationOptions {
    /// Checks that `confidence_level` lies strictly inside `(0, 1)`.
    pub fn validate(&self) -> Result<(), ScatterError> {
        if self.confidence_level > 0.0 && self.confidence_level < 1.0 {
            Ok(())
        } else {
            Err(ScatterError::InvalidOption {
                name: "confidence_level".into(),
                reason: format!("must be in (0, 1), got {}", self.confidence_level),
            })
        }
    }
}

// ── Result ────────────────────────────────────────────────────────────

/// Regression and correlation diagnostics for one column pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub column_x: String,
    pub column_y: String,
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Root mean square of the residuals (divisor `n`).
    pub rmse: f64,
    /// Pearson product-moment correlation.
    pub pearson_r: f64,
    /// Two-sided p-value for H0: slope = 0. NaN when `sample_size == 2`.
    pub p_value: f64,
    /// Standard error of the slope. NaN when `sample_size == 2`.
    pub std_err: f64,
    /// Rows valid for both columns.
    pub sample_size: usize,
    /// Mean absolute residual.
    pub mae: f64,
    /// Mean squared residual.
    pub mse: f64,
    /// Rows removed because either value was missing or non-finite.
    pub rows_dropped: usize,
    /// `(min, max)` of the cleaned x values.
    pub x_range: (f64, f64),
    /// `(min, max)` of the cleaned y values.
    pub y_range: (f64, f64),
    /// Confidence interval of the slope at the configured level.
    pub slope_ci: (f64, f64),
}

impl AnalysisResult {
    /// Degrees of freedom of the residuals.
    pub fn degrees_of_freedom(&self) -> usize {
        self.sample_size.saturating_sub(2)
    }
}

// ── Analyzer ──────────────────────────────────────────────────────────

/// Ordinary least-squares correlation analyzer.
#[derive(Debug, Clone, Default)]
pub struct CorrelationAnalyzer {
    options: CorrelationOptions,
}

impl CorrelationAnalyzer {
    /// Creates an analyzer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CorrelationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CorrelationOptions {
        &self.options
    }

    /// Cheap pre-check: both columns exist, are numeric, and at least one row
    /// is valid for both. Never fails; `column_x == column_y` is allowed.
    ///
    /// ```
    /// use u_scatter::correlation::CorrelationAnalyzer;
    /// use u_scatter::dataset::{Column, Dataset};
    ///
    /// let ds = Dataset::from_columns([("a", Column::dense(vec![1.0, 2.0, 3.0]))]).unwrap();
    /// let analyzer = CorrelationAnalyzer::new();
    /// assert!(analyzer.validate(&ds, "a", "a"));
    /// assert!(!analyzer.validate(&ds, "a", "b"));
    /// ```
    pub fn validate(&self, dataset: &Dataset, column_x: &str, column_y: &str) -> bool {
        let valid = match ColumnSelection::pair(column_x, column_y) {
            ColumnSelection::Identical(c) => count_valid_rows(dataset, &[c]),
            ColumnSelection::Distinct { x, y } => count_valid_rows(dataset, &[x, y]),
        };
        matches!(valid, Ok(n) if n >= 1)
    }

    /// Runs the full analysis for `(column_x, column_y)`.
    #[tracing::instrument(level = "debug", skip(self, dataset))]
    pub fn analyze(
        &self,
        dataset: &Dataset,
        column_x: &str,
        column_y: &str,
    ) -> Result<AnalysisResult, ScatterError> {
        self.options.validate()?;
        let samples = select_pair(dataset, column_x, column_y)?;
        tracing::debug!(
            sample_size = samples.len(),
            rows_dropped = samples.rows_dropped,
            identical = samples.identical,
            "correlation samples selected"
        );

        let fit = if samples.identical {
            fit_identical(&samples, column_x)?
        } else {
            fit_distinct(&samples, column_x, column_y, self.options.confidence_level)?
        };

        Ok(AnalysisResult {
            column_x: column_x.to_string(),
            column_y: column_y.to_string(),
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            rmse: fit.mse.sqrt(),
            pearson_r: fit.pearson_r,
            p_value: fit.p_value,
            std_err: fit.std_err,
            sample_size: samples.len(),
            mae: fit.mae,
            mse: fit.mse,
            rows_dropped: samples.rows_dropped,
            x_range: value_range(&samples.x),
            y_range: value_range(&samples.y),
            slope_ci: fit.slope_ci,
        })
    }
}

/// Column pair for [`Analyzer`] dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSelection {
    pub column_x: String,
    pub column_y: String,
}

impl PairSelection {
    pub fn new(column_x: impl Into<String>, column_y: impl Into<String>) -> Self {
        Self {
            column_x: column_x.into(),
            column_y: column_y.into(),
        }
    }
}

impl Analyzer for CorrelationAnalyzer {
    type Selection = PairSelection;
    type Output = AnalysisResult;

    fn name(&self) -> &'static str {
        "correlation"
    }

    fn required_columns(&self) -> usize {
        2
    }

    fn validate(&self, dataset: &Dataset, selection: &PairSelection) -> bool {
        CorrelationAnalyzer::validate(self, dataset, &selection.column_x, &selection.column_y)
    }

    fn analyze(
        &self,
        dataset: &Dataset,
        selection: &PairSelection,
    ) -> Result<AnalysisResult, ScatterError> {
        CorrelationAnalyzer::analyze(self, dataset, &selection.column_x, &selection.column_y)
    }
}

// ── Fitting ───────────────────────────────────────────────────────────

struct LinearFit {
    slope: f64,
    intercept: f64,
    r_squared: f64,
    pearson_r: f64,
    p_value: f64,
    std_err: f64,
    mae: f64,
    mse: f64,
    slope_ci: (f64, f64),
}

/// `column_x == column_y`: the fit is exact by construction, constant
/// columns included (every residual is zero).
fn fit_identical(samples: &PairedSamples, column: &str) -> Result<LinearFit, ScatterError> {
    let n = samples.len();
    if n < MIN_SAMPLES {
        return Err(ScatterError::insufficient(&[column, column], MIN_SAMPLES, n));
    }
    let defined = n > 2;
    let (std_err, p_value, slope_ci) = if defined {
        (0.0, 0.0, (1.0, 1.0))
    } else {
        (f64::NAN, f64::NAN, (f64::NAN, f64::NAN))
    };

    Ok(LinearFit {
        slope: 1.0,
        intercept: 0.0,
        r_squared: 1.0,
        pearson_r: 1.0,
        p_value,
        std_err,
        mae: 0.0,
        mse: 0.0,
        slope_ci,
    })
}

fn fit_distinct(
    samples: &PairedSamples,
    column_x: &str,
    column_y: &str,
    confidence_level: f64,
) -> Result<LinearFit, ScatterError> {
    let columns = [column_x, column_y];
    let (x, y) = (&samples.x, &samples.y);
    let n = x.len();
    if n < MIN_SAMPLES {
        return Err(ScatterError::insufficient(&columns, MIN_SAMPLES, n));
    }

    let x_mean = Statistics::mean(x.iter());
    let y_mean = Statistics::mean(y.iter());

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 {
        tracing::warn!(column_x, "x column has zero variance");
        return Err(ScatterError::degenerate(
            &columns,
            n,
            format!("column '{column_x}' has zero variance; slope is undefined"),
        ));
    }
    if syy == 0.0 {
        tracing::warn!(column_y, "y column has zero variance");
        return Err(ScatterError::degenerate(
            &columns,
            n,
            format!("column '{column_y}' has zero variance; correlation is undefined"),
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let (mut ss_res, mut sum_abs) = (0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let r = yi - (slope * xi + intercept);
        ss_res += r * r;
        sum_abs += r.abs();
    }

    let r_squared = 1.0 - ss_res / syy;
    let pearson_r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let (std_err, p_value, slope_ci) =
        slope_inference(slope, ss_res, sxx, n, confidence_level, &columns)?;

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        pearson_r,
        p_value,
        std_err,
        mae: sum_abs / n as f64,
        mse: ss_res / n as f64,
        slope_ci,
    })
}

/// Standard error, two-sided p-value and confidence interval of the slope
/// from a Student t with `n - 2` degrees of freedom.
fn slope_inference(
    slope: f64,
    ss_res: f64,
    sxx: f64,
    n: usize,
    confidence_level: f64,
    columns: &[&str],
) -> Result<(f64, f64, (f64, f64)), ScatterError> {
    let df = n.saturating_sub(2);
    if df == 0 {
        return Ok((f64::NAN, f64::NAN, (f64::NAN, f64::NAN)));
    }

    let std_err = (ss_res / df as f64 / sxx).sqrt();
    if std_err == 0.0 {
        return Ok((0.0, 0.0, (slope, slope)));
    }

    let dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|e| ScatterError::degenerate(columns, n, format!("t distribution: {e}")))?;
    let t = slope / std_err;
    let p_value = (2.0 * dist.sf(t.abs())).min(1.0);
    let q = dist.inverse_cdf(0.5 + confidence_level / 2.0);
    Ok((std_err, p_value, (slope - q * std_err, slope + q * std_err)))
}

fn value_range(values: &[f64]) -> (f64, f64) {
    (Statistics::min(values.iter()), Statistics::max(values.iter()))
}

// ── Tests ─────────────────────────────────────────────────────────────
