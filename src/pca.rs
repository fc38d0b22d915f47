//! Principal component projection of several numeric columns.
//!
//! [`PcaAnalyzer`] centres the selected feature columns, optionally scales
//! each one to unit variance, diagonalises their sample covariance matrix and
//! projects every cleaned row onto the leading components. The scores are
//! the coordinates of a 2-D or 3-D latent-space scatter view.
//!
//! Rows with a missing or non-finite value in any feature are dropped.
//! [`PcaResult::kept_rows`] maps each score back to its dataset row, so labels
//! from a target column can be attached to the projected points.
//!
//! ```
//! use u_scatter::dataset::{Column, Dataset};
//! use u_scatter::pca::{PcaAnalyzer, PcaSelection};
//!
//! let ds = Dataset::from_columns([
//!     ("a", Column::dense(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
//!     ("b", Column::dense(vec![10.0, 20.0, 30.0, 40.0, 50.0])),
//!     ("c", Column::dense(vec![0.3, 0.1, 0.4, 0.1, 0.5])),
//! ]).unwrap();
//!
//! let result = PcaAnalyzer::new().analyze(&ds, &PcaSelection::all_numeric()).unwrap();
//! assert_eq!(result.feature_columns, ["a", "b", "c"]);
//! assert_eq!(result.scores.len(), 5);
//! assert!(result.explained_variance_ratio[0] > 0.6);
//! ```

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::dataset::{DataType, Dataset};
use crate::error::ScatterError;
use crate::interfaces::Analyzer;
use crate::selection::{count_valid_rows, select_columns};

/// Minimum number of feature columns.
pub const MIN_FEATURES: usize = 2;

/// Minimum number of valid rows.
pub const MIN_SAMPLES: usize = 2;

const MAX_SWEEPS: usize = 64;

// ── Options ───────────────────────────────────────────────────────────

/// Options for principal component analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcaOptions {
    /// Components to retain. Default: 2.
    pub n_components: usize,
    /// Scale every feature to unit variance before the decomposition.
    /// Default: true.
    pub standardize: bool,
}

impl Default for PcaOptions {
    fn default() -> Self {
        Self {
            n_components: 2,
            standardize: true,
        }
    }
}

impl PcaOptions {
    pub fn validate(&self) -> Result<(), ScatterError> {
        if self.n_components == 0 {
            return Err(ScatterError::InvalidOption {
                name: "n_components".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ── Selection ─────────────────────────────────────────────────────────

/// Feature columns for [`PcaAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PcaSelection {
    /// Feature columns in order. Empty means every numeric column except
    /// `target`, in dataset order.
    pub features: Vec<String>,
    /// Label column. Never used as a feature by automatic selection.
    pub target: Option<String>,
}

impl PcaSelection {
    pub fn new<S: Into<String>>(features: impl IntoIterator<Item = S>) -> Self {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            target: None,
        }
    }

    /// Every numeric column.
    pub fn all_numeric() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Resolves the feature names against `dataset`.
    pub fn resolve<'a>(&'a self, dataset: &'a Dataset) -> Vec<&'a str> {
        if !self.features.is_empty() {
            return self.features.iter().map(String::as_str).collect();
        }
        dataset
            .iter()
            .filter(|(name, column)| {
                column.data_type() == DataType::Numeric && Some(*name) != self.target.as_deref()
            })
            .map(|(name, _)| name)
            .collect()
    }
}

// ── Result ────────────────────────────────────────────────────────────

/// Leading principal components of a feature set and the projected rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaResult {
    pub feature_columns: Vec<String>,
    pub target: Option<String>,
    pub n_components: usize,
    /// Whether features were scaled to unit variance.
    pub standardized: bool,
    /// Variance along each retained component, descending.
    pub eigenvalues: Vec<f64>,
    /// Share of the total variance carried by each retained component.
    pub explained_variance_ratio: Vec<f64>,
    pub cumulative_variance_ratio: Vec<f64>,
    /// One unit vector per component, one entry per feature. The entry of
    /// largest magnitude is positive.
    pub loadings: Vec<Vec<f64>>,
    /// One row per kept sample, one entry per component.
    pub scores: Vec<Vec<f64>>,
    /// Feature means used for centring.
    pub means: Vec<f64>,
    /// Divisor applied to each centred feature: the population standard
    /// deviation when standardizing (1 for a constant feature), else 1.
    pub scales: Vec<f64>,
    pub sample_size: usize,
    pub rows_dropped: usize,
    /// Dataset row of each score row.
    pub kept_rows: Vec<usize>,
}

impl PcaResult {
    pub fn n_features(&self) -> usize {
        self.feature_columns.len()
    }

    /// Variance share of all retained components together.
    pub fn total_variance_explained(&self) -> f64 {
        self.cumulative_variance_ratio.last().copied().unwrap_or(0.0)
    }

    /// Scores of component `idx` across all kept rows.
    pub fn component_scores(&self, idx: usize) -> Option<Vec<f64>> {
        (idx < self.n_components).then(|| self.scores.iter().map(|row| row[idx]).collect())
    }
}

// ── Analyzer ──────────────────────────────────────────────────────────

/// Principal component analyzer over numeric feature columns.
#[derive(Debug, Clone, Default)]
pub struct PcaAnalyzer {
    options: PcaOptions,
}

impl PcaAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PcaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PcaOptions {
        &self.options
    }

    /// Cheap pre-check: enough numeric features for the requested
    /// components and at least [`MIN_SAMPLES`] rows valid for all of them.
    pub fn validate(&self, dataset: &Dataset, selection: &PcaSelection) -> bool {
        let features = selection.resolve(dataset);
        if features.len() < MIN_FEATURES || self.options.n_components > features.len() {
            return false;
        }
        matches!(count_valid_rows(dataset, &features), Ok(n) if n >= MIN_SAMPLES)
    }

    /// Runs the decomposition and projects the cleaned rows.
    #[tracing::instrument(level = "debug", skip(self, dataset, selection))]
    pub fn analyze(
        &self,
        dataset: &Dataset,
        selection: &PcaSelection,
    ) -> Result<PcaResult, ScatterError> {
        self.options.validate()?;
        let features = selection.resolve(dataset);
        let d = features.len();
        if d < MIN_FEATURES {
            return Err(ScatterError::InvalidOption {
                name: "features".into(),
                reason: format!("need at least {MIN_FEATURES} numeric feature columns, got {d}"),
            });
        }
        let k = self.options.n_components;
        if k > d {
            return Err(ScatterError::InvalidOption {
                name: "n_components".into(),
                reason: format!("must not exceed the {d} feature columns, got {k}"),
            });
        }

        let samples = select_columns(dataset, &features)?;
        let n = samples.len();
        tracing::debug!(
            n_features = d,
            sample_size = n,
            rows_dropped = samples.rows_dropped,
            standardize = self.options.standardize,
            "pca samples selected"
        );
        if n < MIN_SAMPLES {
            return Err(ScatterError::insufficient(&features, MIN_SAMPLES, n));
        }

        let means: Vec<f64> = samples
            .columns
            .iter()
            .map(|c| Statistics::mean(c.iter()))
            .collect();
        let scales: Vec<f64> = if self.options.standardize {
            samples
                .columns
                .iter()
                .map(|c| {
                    let s = Statistics::population_std_dev(c.iter());
                    if s > 0.0 {
                        s
                    } else {
                        1.0
                    }
                })
                .collect()
        } else {
            vec![1.0; d]
        };

        let centred: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                samples
                    .row(i)
                    .zip(means.iter().zip(scales.iter()))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect()
            })
            .collect();

        let components = symmetric_eigen(covariance(&centred, d));
        let total: f64 = components.iter().map(|(ev, _)| ev.max(0.0)).sum();
        if total <= 0.0 {
            tracing::warn!(n_features = d, "every pca feature is constant");
            return Err(ScatterError::degenerate(
                &features,
                n,
                "every feature column is constant",
            ));
        }

        let mut eigenvalues = Vec::with_capacity(k);
        let mut loadings = Vec::with_capacity(k);
        for (ev, vector) in components.into_iter().take(k) {
            eigenvalues.push(ev.max(0.0));
            loadings.push(orient(vector));
        }
        let explained_variance_ratio: Vec<f64> = eigenvalues.iter().map(|ev| ev / total).collect();
        let cumulative_variance_ratio: Vec<f64> = explained_variance_ratio
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect();

        let scores: Vec<Vec<f64>> = centred
            .iter()
            .map(|row| {
                loadings
                    .iter()
                    .map(|w| row.iter().zip(w.iter()).map(|(z, w)| z * w).sum::<f64>())
                    .collect()
            })
            .collect();

        tracing::debug!(explained = ?explained_variance_ratio, "pca completed");
        Ok(PcaResult {
            feature_columns: features.iter().map(|f| (*f).to_string()).collect(),
            target: selection.target.clone(),
            n_components: k,
            standardized: self.options.standardize,
            eigenvalues,
            explained_variance_ratio,
            cumulative_variance_ratio,
            loadings,
            scores,
            means,
            scales,
            sample_size: n,
            rows_dropped: samples.rows_dropped,
            kept_rows: samples.kept_rows,
        })
    }
}

impl Analyzer for PcaAnalyzer {
    type Selection = PcaSelection;
    type Output = PcaResult;

    fn name(&self) -> &'static str {
        "pca"
    }

    fn required_columns(&self) -> usize {
        MIN_FEATURES
    }

    fn validate(&self, dataset: &Dataset, selection: &PcaSelection) -> bool {
        PcaAnalyzer::validate(self, dataset, selection)
    }

    fn analyze(&self, dataset: &Dataset, selection: &PcaSelection) -> Result<PcaResult, ScatterError> {
        PcaAnalyzer::analyze(self, dataset, selection)
    }
}

// ── Decomposition ─────────────────────────────────────────────────────

/// Sample covariance (divisor `n - 1`) of centred rows.
fn covariance(centred: &[Vec<f64>], d: usize) -> Vec<Vec<f64>> {
    let mut cov = vec![vec![0.0; d]; d];
    for row in centred {
        for i in 0..d {
            for j in i..d {
                cov[i][j] += row[i] * row[j];
            }
        }
    }
    let dof = (centred.len() - 1) as f64;
    for i in 0..d {
        for j in i..d {
            cov[i][j] /= dof;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Eigenpairs of a symmetric matrix by cyclic Jacobi rotation, eigenvalues
/// descending, eigenvectors of unit length.
fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> Vec<(f64, Vec<f64>)> {
    let d = a.len();
    let mut v: Vec<Vec<f64>> = (0..d)
        .map(|i| (0..d).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    let norm: f64 = a.iter().flatten().map(|x| x * x).sum();

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..d)
            .flat_map(|p| (p + 1..d).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off <= f64::EPSILON * f64::EPSILON * norm {
            break;
        }
        for p in 0..d {
            for q in p + 1..d {
                rotate(&mut a, &mut v, p, q);
            }
        }
    }

    let mut pairs: Vec<(f64, Vec<f64>)> = (0..d)
        .map(|j| (a[j][j], v.iter().map(|row| row[j]).collect()))
        .collect();
    pairs.sort_by(|x, y| y.0.total_cmp(&x.0));
    pairs
}

/// Zeroes `a[p][q]` with one Jacobi rotation, accumulating it into `v`.
fn rotate(a: &mut [Vec<f64>], v: &mut [Vec<f64>], p: usize, q: usize) {
    let apq = a[p][q];
    if apq == 0.0 {
        return;
    }
    let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
    let c = 1.0 / t.hypot(1.0);
    let s = t * c;

    for row in a.iter_mut() {
        let (rp, rq) = (row[p], row[q]);
        row[p] = c * rp - s * rq;
        row[q] = s * rp + c * rq;
    }
    for k in 0..a.len() {
        let (pk, qk) = (a[p][k], a[q][k]);
        a[p][k] = c * pk - s * qk;
        a[q][k] = s * pk + c * qk;
    }
    a[p][q] = 0.0;
    a[q][p] = 0.0;
    for row in v.iter_mut() {
        let (rp, rq) = (row[p], row[q]);
        row[p] = c * rp - s * rq;
        row[q] = s * rp + c * rq;
    }
}

/// Flips `vector` so its entry of largest magnitude is positive.
fn orient(mut vector: Vec<f64>) -> Vec<f64> {
    let pivot = vector
        .iter()
        .copied()
        .fold(0.0_f64, |m, x| if x.abs() > m.abs() { x } else { m });
    if pivot < 0.0 {
        for x in &mut vector {
            *x = -*x;
        }
    }
    vector
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, ValidityBitmap};
    use crate::error::ErrorKind;

    fn dataset(columns: Vec<(&str, Vec<f64>)>) -> Dataset {
        Dataset::from_columns(columns.into_iter().map(|(n, v)| (n, Column::dense(v)))).unwrap()
    }

    fn raw() -> PcaAnalyzer {
        PcaAnalyzer::with_options(PcaOptions {
            standardize: false,
            ..PcaOptions::default()
        })
    }

    // ── Decomposition ─────────────────────────────────────────────

    #[test]
    fn jacobi_eigenpairs_satisfy_definition() {
        let a = vec![
            vec![4.0, 1.0, 0.0],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 2.0],
        ];
        let pairs = symmetric_eigen(a.clone());
        assert_eq!(pairs.len(), 3);
        assert!(pairs.windows(2).all(|w| w[0].0 >= w[1].0));
        let trace: f64 = pairs.iter().map(|(ev, _)| ev).sum();
        assert!((trace - 9.0).abs() < 1e-12);

        for (ev, vec) in &pairs {
            let len: f64 = vec.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((len - 1.0).abs() < 1e-12);
            for i in 0..3 {
                let av: f64 = (0..3).map(|j| a[i][j] * vec[j]).sum();
                assert!((av - ev * vec[i]).abs() < 1e-10, "row {i} of A·v for λ = {ev}");
            }
        }
        let dot: f64 = pairs[0].1.iter().zip(pairs[1].1.iter()).map(|(x, y)| x * y).sum();
        assert!(dot.abs() < 1e-12);
    }

    #[test]
    fn orientation_makes_dominant_entry_positive() {
        assert_eq!(orient(vec![0.6, -0.8]), vec![-0.6, 0.8]);
        assert_eq!(orient(vec![-0.6, 0.8]), vec![-0.6, 0.8]);
        assert_eq!(orient(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    // ── Projection ────────────────────────────────────────────────

    #[test]
    fn axis_aligned_variance() {
        let ds = dataset(vec![
            ("a", vec![3.0, -3.0, 0.0, 0.0]),
            ("b", vec![0.0, 0.0, 1.0, -1.0]),
        ]);
        let r = raw().analyze(&ds, &PcaSelection::new(["a", "b"])).unwrap();
        assert_eq!(r.eigenvalues[0], 6.0);
        assert!((r.eigenvalues[1] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.loadings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(r.scores[0], vec![3.0, 0.0]);
        assert_eq!(r.scores[3], vec![0.0, -1.0]);
        assert!((r.explained_variance_ratio[0] - 0.9).abs() < 1e-12);
        assert!((r.total_variance_explained() - 1.0).abs() < 1e-12);
        assert_eq!(r.scales, vec![1.0, 1.0]);
    }

    #[test]
    fn standardized_collinear_features_share_one_component() {
        let ds = dataset(vec![
            ("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("b", vec![10.0, 20.0, 30.0, 40.0, 50.0]),
        ]);
        let r = PcaAnalyzer::new()
            .analyze(&ds, &PcaSelection::new(["a", "b"]))
            .unwrap();
        assert!(r.standardized);
        assert_eq!(r.means, vec![3.0, 30.0]);
        assert!((r.scales[0] - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((r.scales[1] - 10.0 * 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((r.explained_variance_ratio[0] - 1.0).abs() < 1e-12);
        assert!(r.explained_variance_ratio[1].abs() < 1e-12);
        let h = 0.5_f64.sqrt();
        assert!((r.loadings[0][0] - h).abs() < 1e-12);
        assert!((r.loadings[0][1] - h).abs() < 1e-12);
    }

    #[test]
    fn scores_are_centred_with_eigenvalue_variance() {
        let ds = dataset(vec![
            ("a", vec![2.5, 0.5, 2.2, 1.9, 3.1, 2.3, 2.0, 1.0, 1.5, 1.1]),
            ("b", vec![2.4, 0.7, 2.9, 2.2, 3.0, 2.7, 1.6, 1.1, 1.6, 0.9]),
            ("c", vec![1.0, 0.2, 0.4, 0.9, 0.1, 0.7, 0.3, 0.8, 0.5, 0.6]),
        ]);
        let r = PcaAnalyzer::with_options(PcaOptions {
            n_components: 3,
            standardize: false,
        })
        .analyze(&ds, &PcaSelection::all_numeric())
        .unwrap();

        for c in 0..3 {
            let s = r.component_scores(c).unwrap();
            let mean = s.iter().sum::<f64>() / 10.0;
            let var = s.iter().map(|x| x * x).sum::<f64>() / 9.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - r.eigenvalues[c]).abs() < 1e-10);
        }
        assert!(r.component_scores(3).is_none());
        assert!((r.total_variance_explained() - 1.0).abs() < 1e-12);
        assert!(r.cumulative_variance_ratio.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn incomplete_rows_are_dropped_and_mapped_back() {
        let ds = Dataset::from_columns([
            ("a", Column::from_options(vec![Some(1.0), None, Some(3.0), Some(4.0), Some(0.0)])),
            ("b", Column::from_options(vec![Some(2.0), Some(1.0), Some(f64::NAN), Some(5.0), Some(1.0)])),
        ])
        .unwrap();
        let r = PcaAnalyzer::new()
            .analyze(&ds, &PcaSelection::new(["a", "b"]))
            .unwrap();
        assert_eq!(r.sample_size, 3);
        assert_eq!(r.rows_dropped, 2);
        assert_eq!(r.kept_rows, vec![0, 3, 4]);
        assert_eq!(r.scores.len(), 3);
    }

    #[test]
    fn automatic_features_skip_target_and_text() {
        let ds = Dataset::from_columns([
            ("a", Column::dense(vec![1.0, 2.0, 3.0, 5.0])),
            ("label", Column::dense(vec![0.0, 1.0, 0.0, 1.0])),
            ("b", Column::dense(vec![2.0, 1.0, 4.0, 3.0])),
            (
                "batch",
                Column::text(
                    vec!["p".into(), "q".into(), "r".into(), "s".into()],
                    ValidityBitmap::all_valid(4),
                ),
            ),
        ])
        .unwrap();
        let selection = PcaSelection::all_numeric().with_target("label");
        assert_eq!(selection.resolve(&ds), vec!["a", "b"]);
        let r = PcaAnalyzer::new().analyze(&ds, &selection).unwrap();
        assert_eq!(r.feature_columns, ["a", "b"]);
        assert_eq!(r.target.as_deref(), Some("label"));
    }

    // ── Errors ────────────────────────────────────────────────────

    #[test]
    fn too_few_features_or_too_many_components() {
        let ds = dataset(vec![("a", vec![1.0, 2.0, 3.0]), ("b", vec![3.0, 1.0, 2.0])]);
        let err = PcaAnalyzer::new()
            .analyze(&ds, &PcaSelection::new(["a"]))
            .unwrap_err();
        assert!(matches!(err, ScatterError::InvalidOption { ref name, .. } if name == "features"));

        let three = PcaAnalyzer::with_options(PcaOptions {
            n_components: 3,
            ..PcaOptions::default()
        });
        let err = three.analyze(&ds, &PcaSelection::all_numeric()).unwrap_err();
        assert!(matches!(err, ScatterError::InvalidOption { ref name, .. } if name == "n_components"));

        let zero = PcaAnalyzer::with_options(PcaOptions {
            n_components: 0,
            ..PcaOptions::default()
        });
        assert_eq!(
            zero.analyze(&ds, &PcaSelection::all_numeric()).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn feature_errors_are_typed() {
        let ds = Dataset::from_columns([
            ("a", Column::from_options(vec![Some(1.0), None, Some(3.0)])),
            ("b", Column::from_options(vec![None, Some(2.0), Some(1.0)])),
            (
                "t",
                Column::text(
                    vec!["x".into(), "y".into(), "z".into()],
                    ValidityBitmap::all_valid(3),
                ),
            ),
        ])
        .unwrap();
        let analyzer = PcaAnalyzer::new();
        let kind = |features: &[&str]| {
            analyzer
                .analyze(&ds, &PcaSelection::new(features.iter().copied()))
                .unwrap_err()
                .kind()
        };
        assert_eq!(kind(&["a", "b"]), ErrorKind::InsufficientData);
        assert_eq!(kind(&["a", "t"]), ErrorKind::Validation);
        assert_eq!(kind(&["a", "missing"]), ErrorKind::Validation);
        assert_eq!(kind(&["a", "a"]), ErrorKind::Validation);
    }

    #[test]
    fn constant_features_are_degenerate() {
        let ds = dataset(vec![("a", vec![2.0; 4]), ("b", vec![-1.0; 4])]);
        for analyzer in [PcaAnalyzer::new(), raw()] {
            let err = analyzer.analyze(&ds, &PcaSelection::all_numeric()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DegenerateInput);
        }
    }

    #[test]
    fn one_constant_feature_keeps_unit_scale() {
        let ds = dataset(vec![("a", vec![1.0, 2.0, 3.0]), ("b", vec![7.0; 3])]);
        let r = PcaAnalyzer::new()
            .analyze(&ds, &PcaSelection::all_numeric())
            .unwrap();
        assert_eq!(r.scales[1], 1.0);
        assert_eq!(r.explained_variance_ratio[0], 1.0);
        assert_eq!(r.loadings[0], vec![1.0, 0.0]);
    }

    // ── Analyzer trait ────────────────────────────────────────────

    #[test]
    fn analyzer_trait_dispatch() {
        let ds = dataset(vec![
            ("a", vec![1.0, 2.0, 4.0]),
            ("b", vec![0.5, 0.1, 0.9]),
        ]);
        let analyzer = PcaAnalyzer::new();
        let selection = PcaSelection::all_numeric();
        assert_eq!(Analyzer::name(&analyzer), "pca");
        assert_eq!(analyzer.required_columns(), 2);
        assert!(Analyzer::validate(&analyzer, &ds, &selection));
        assert!(!Analyzer::validate(&analyzer, &ds, &PcaSelection::new(["a"])));
        assert!(!Analyzer::validate(&analyzer, &ds, &PcaSelection::new(["a", "z"])));
        let r = Analyzer::analyze(&analyzer, &ds, &selection).unwrap();
        assert_eq!(r.n_features(), 2);

        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["n_components"], 2);
        assert_eq!(json["feature_columns"][1], "b");
    }
}
