//! Regular-grid surfaces from scattered `(x, y, z)` samples.
//!
//! [`SurfaceInterpolator`] cleans three columns, merges repeated `(x, y)`
//! locations, triangulates the samples and evaluates every node of an
//! axis-aligned grid spanning the sample bounding box. Nodes outside the convex
//! hull of the samples hold `None`; the engine never extrapolates.
//!
//! # Methods
//!
//! - [`InterpolationMethod::Linear`]: piecewise-planar over the Delaunay
//!   triangles. Needs 4 samples.
//! - [`InterpolationMethod::Cubic`]: cubic Bézier triangles built from
//!   per-vertex gradients estimated over Delaunay neighbours. Reproduces planes
//!   exactly. Needs [`SurfaceOptions::cubic_min_points`] samples; with fewer the
//!   build fails instead of falling back to linear.
//!
//! # Example
//!
//! ```
//! use u_scatter::dataset::{Column, Dataset};
//! use u_scatter::surface::{InterpolationMethod, SurfaceInterpolator};
//!
//! let ds = Dataset::from_columns([
//!     ("x", Column::dense(vec![0.0, 1.0, 0.0, 1.0])),
//!     ("y", Column::dense(vec![0.0, 0.0, 1.0, 1.0])),
//!     ("z", Column::dense(vec![0.0, 1.0, 1.0, 2.0])),
//! ]).unwrap();
//!
//! let grid = SurfaceInterpolator::new()
//!     .build(&ds, "x", "y", "z", 5, InterpolationMethod::Linear)
//!     .unwrap();
//! assert_eq!((grid.width(), grid.height()), (5, 5));
//! let z = grid.get(2, 2).unwrap();
//! assert!((z - 1.0).abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::dataset::Dataset;
use crate::error::ScatterError;
use crate::interfaces::Analyzer;
use crate::selection::{count_valid_rows, select_triple, TripleSamples};
use crate::triangulation::{convex_hull, Point, Triangulation};

/// Minimum number of distinct samples for any surface.
pub const MIN_POINTS: usize = 4;

/// Minimum nodes per grid axis.
pub const MIN_RESOLUTION: usize = 2;

// ── Method ────────────────────────────────────────────────────────────

/// Scattered-data interpolation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    #[default]
    Linear,
    Cubic,
}

impl InterpolationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpolationMethod {
    type Err = ScatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            _ => Err(ScatterError::InterpolationMethod {
                method: s.to_string(),
                reason: "expected 'linear' or 'cubic'".into(),
            }),
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────

/// Options for surface building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    /// Nodes per axis unless overridden per axis. Default: 100.
    pub resolution: usize,
    /// Nodes along x, overriding `resolution`.
    pub resolution_x: Option<usize>,
    /// Nodes along y, overriding `resolution`.
    pub resolution_y: Option<usize>,
    /// Default: linear.
    pub method: InterpolationMethod,
    /// Distinct samples required by cubic interpolation. Default: 10.
    pub cubic_min_points: usize,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            resolution: 100,
            resolution_x: None,
            resolution_y: None,
            method: InterpolationMethod::Linear,
            cubic_min_points: 10,
        }
    }
}

impl SurfaceOptions {
    /// Grid shape as `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (
            self.resolution_x.unwrap_or(self.resolution),
            self.resolution_y.unwrap_or(self.resolution),
        )
    }

    pub fn validate(&self) -> Result<(), ScatterError> {
        let (w, h) = self.shape();
        for (name, value) in [("resolution_x", w), ("resolution_y", h)] {
            if value < MIN_RESOLUTION {
                return Err(ScatterError::InvalidOption {
                    name: name.into(),
                    reason: format!("need at least {MIN_RESOLUTION} nodes, got {value}"),
                });
            }
        }
        if self.cubic_min_points <= MIN_POINTS {
            return Err(ScatterError::InvalidOption {
                name: "cubic_min_points".into(),
                reason: format!(
                    "must exceed the linear minimum of {MIN_POINTS}, got {}",
                    self.cubic_min_points
                ),
            });
        }
        Ok(())
    }

    fn min_points(&self, method: InterpolationMethod) -> usize {
        match method {
            InterpolationMethod::Linear => MIN_POINTS,
            InterpolationMethod::Cubic => self.cubic_min_points,
        }
    }
}

// ── Grid and statistics ───────────────────────────────────────────────

/// Interpolated surface on a regular grid.
///
/// `z[row][col]` is the value at `(x_coords[col], y_coords[row])`; `None`
/// marks nodes outside the convex hull of the samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<f64>,
    pub z: Vec<Vec<Option<f64>>>,
    pub method: InterpolationMethod,
    /// `(width, height)`.
    pub resolution: (usize, usize),
}

impl SurfaceGrid {
    pub fn width(&self) -> usize {
        self.x_coords.len()
    }

    pub fn height(&self) -> usize {
        self.y_coords.len()
    }

    /// Value at grid `row` (y index) and `col` (x index).
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.z.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Iterates over defined node values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.z.iter().flatten().filter_map(|v| *v)
    }

    pub fn data_cells(&self) -> usize {
        self.values().count()
    }

    /// Row-major values with NaN for missing nodes.
    pub fn to_row_major(&self) -> Vec<f64> {
        self.z
            .iter()
            .flatten()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }

    /// Statistics over the defined nodes.
    pub fn stats(&self) -> SurfaceStats {
        SurfaceStats::from_grid(self)
    }

    /// Largest central-difference gradient magnitude over interior nodes
    /// whose four axis neighbours are all defined.
    pub fn gradient_max(&self) -> Option<f64> {
        let (w, h) = (self.width(), self.height());
        let mut best: Option<f64> = None;
        for row in 1..h.saturating_sub(1) {
            for col in 1..w.saturating_sub(1) {
                if self.get(row, col).is_none() {
                    continue;
                }
                let (Some(left), Some(right), Some(down), Some(up)) = (
                    self.get(row, col - 1),
                    self.get(row, col + 1),
                    self.get(row - 1, col),
                    self.get(row + 1, col),
                ) else {
                    continue;
                };
                let dzdx = (right - left) / (self.x_coords[col + 1] - self.x_coords[col - 1]);
                let dzdy = (up - down) / (self.y_coords[row + 1] - self.y_coords[row - 1]);
                let magnitude = dzdx.hypot(dzdy);
                best = Some(best.map_or(magnitude, |b| b.max(magnitude)));
            }
        }
        best
    }
}

/// Summary of a [`SurfaceGrid`] over its defined nodes.
///
/// With no defined nodes, `min`, `max`, `mean` and `std` are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// `None` when no interior node has all four neighbours defined.
    pub gradient_max: Option<f64>,
    pub data_cells: usize,
    pub empty_cells: usize,
}

impl SurfaceStats {
    pub fn from_grid(grid: &SurfaceGrid) -> Self {
        let values: Vec<f64> = grid.values().collect();
        let total = grid.width() * grid.height();
        let (min, max, mean, std) = if values.is_empty() {
            (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
        } else {
            (
                Statistics::min(values.iter()),
                Statistics::max(values.iter()),
                Statistics::mean(values.iter()),
                Statistics::population_std_dev(values.iter()),
            )
        };
        Self {
            min,
            max,
            mean,
            std,
            gradient_max: grid.gradient_max(),
            data_cells: values.len(),
            empty_cells: total - values.len(),
        }
    }
}

/// Grid, statistics and sample bookkeeping from one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAnalysis {
    pub column_x: String,
    pub column_y: String,
    pub column_z: String,
    pub grid: SurfaceGrid,
    pub stats: SurfaceStats,
    /// Rows valid for all three columns.
    pub sample_size: usize,
    /// Distinct `(x, y)` locations after merging repeats.
    pub distinct_points: usize,
    /// Rows removed because any value was missing or non-finite.
    pub rows_dropped: usize,
    /// `(min, max)` of the cleaned z samples.
    pub z_range: (f64, f64),
}

// ── Interpolator ──────────────────────────────────────────────────────

/// Builds [`SurfaceGrid`]s from three numeric columns.
#[derive(Debug, Clone, Default)]
pub struct SurfaceInterpolator {
    options: SurfaceOptions,
}

impl SurfaceInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SurfaceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    /// Cheap pre-check: all three columns exist, are numeric, and at least
    /// [`MIN_POINTS`] rows are valid for all of them. Never fails.
    pub fn validate(&self, dataset: &Dataset, column_x: &str, column_y: &str, column_z: &str) -> bool {
        matches!(
            count_valid_rows(dataset, &[column_x, column_y, column_z]),
            Ok(n) if n >= MIN_POINTS
        )
    }

    /// Builds a `resolution × resolution` grid with `method`.
    ///
    /// The remaining options (`cubic_min_points`) come from the interpolator.
    pub fn build(
        &self,
        dataset: &Dataset,
        column_x: &str,
        column_y: &str,
        column_z: &str,
        resolution: usize,
        method: InterpolationMethod,
    ) -> Result<SurfaceGrid, ScatterError> {
        let options = SurfaceOptions {
            resolution,
            resolution_x: None,
            resolution_y: None,
            method,
            ..self.options
        };
        let columns = [column_x, column_y, column_z];
        Ok(build_surface(dataset, columns, &options)?.grid)
    }

    /// Builds with the configured options and returns grid plus statistics.
    #[tracing::instrument(level = "debug", skip(self, dataset))]
    pub fn analyze(
        &self,
        dataset: &Dataset,
        column_x: &str,
        column_y: &str,
        column_z: &str,
    ) -> Result<SurfaceAnalysis, ScatterError> {
        let columns = [column_x, column_y, column_z];
        let built = build_surface(dataset, columns, &self.options)?;
        let stats = built.grid.stats();
        tracing::debug!(
            data_cells = stats.data_cells,
            empty_cells = stats.empty_cells,
            "surface built"
        );
        Ok(SurfaceAnalysis {
            column_x: column_x.to_string(),
            column_y: column_y.to_string(),
            column_z: column_z.to_string(),
            grid: built.grid,
            stats,
            sample_size: built.sample_size,
            distinct_points: built.distinct_points,
            rows_dropped: built.rows_dropped,
            z_range: built.z_range,
        })
    }
}

/// Column triple for [`Analyzer`] dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSelection {
    pub column_x: String,
    pub column_y: String,
    pub column_z: String,
}

impl SurfaceSelection {
    pub fn new(
        column_x: impl Into<String>,
        column_y: impl Into<String>,
        column_z: impl Into<String>,
    ) -> Self {
        Self {
            column_x: column_x.into(),
            column_y: column_y.into(),
            column_z: column_z.into(),
        }
    }
}

impl Analyzer for SurfaceInterpolator {
    type Selection = SurfaceSelection;
    type Output = SurfaceAnalysis;

    fn name(&self) -> &'static str {
        "surface"
    }

    fn required_columns(&self) -> usize {
        3
    }

    fn validate(&self, dataset: &Dataset, s: &SurfaceSelection) -> bool {
        SurfaceInterpolator::validate(self, dataset, &s.column_x, &s.column_y, &s.column_z)
    }

    fn analyze(&self, dataset: &Dataset, s: &SurfaceSelection) -> Result<SurfaceAnalysis, ScatterError> {
        SurfaceInterpolator::analyze(self, dataset, &s.column_x, &s.column_y, &s.column_z)
    }
}

// ── Building ──────────────────────────────────────────────────────────

struct Built {
    grid: SurfaceGrid,
    sample_size: usize,
    distinct_points: usize,
    rows_dropped: usize,
    z_range: (f64, f64),
}

fn build_surface(
    dataset: &Dataset,
    columns: [&str; 3],
    options: &SurfaceOptions,
) -> Result<Built, ScatterError> {
    options.validate()?;
    let [cx, cy, cz] = columns;
    let samples = select_triple(dataset, cx, cy, cz)?;
    let n = samples.len();
    tracing::debug!(
        sample_size = n,
        rows_dropped = samples.rows_dropped,
        method = %options.method,
        "surface samples selected"
    );
    if n < MIN_POINTS {
        return Err(ScatterError::insufficient(&columns, MIN_POINTS, n));
    }

    let (points, values) = merge_duplicates(&samples);
    if points.len() < MIN_POINTS {
        return Err(ScatterError::insufficient(&columns, MIN_POINTS, points.len()));
    }
    if convex_hull(&points).len() < 3 {
        tracing::warn!(sample_size = n, "surface samples are collinear");
        return Err(ScatterError::degenerate(
            &columns,
            n,
            "(x, y) samples are collinear; no 2-D surface is defined",
        ));
    }

    let required = options.min_points(options.method);
    if points.len() < required {
        return Err(ScatterError::InterpolationMethod {
            method: options.method.to_string(),
            reason: format!(
                "needs at least {required} distinct samples, got {}",
                points.len()
            ),
        });
    }

    let tri = Triangulation::new(&points).ok_or_else(|| {
        ScatterError::degenerate(&columns, n, "samples could not be triangulated")
    })?;

    let interpolant = match options.method {
        InterpolationMethod::Linear => Interpolant::Linear,
        InterpolationMethod::Cubic => Interpolant::Cubic(vertex_gradients(&tri, &values)),
    };

    let (width, height) = options.shape();
    let x_coords = linspace(Statistics::min(samples.x.iter()), Statistics::max(samples.x.iter()), width);
    let y_coords = linspace(Statistics::min(samples.y.iter()), Statistics::max(samples.y.iter()), height);

    let z = y_coords
        .iter()
        .map(|&y| {
            x_coords
                .iter()
                .map(|&x| interpolant.evaluate(&tri, &values, Point::new(x, y)))
                .collect()
        })
        .collect();

    Ok(Built {
        grid: SurfaceGrid {
            x_coords,
            y_coords,
            z,
            method: options.method,
            resolution: (width, height),
        },
        sample_size: n,
        distinct_points: points.len(),
        rows_dropped: samples.rows_dropped,
        z_range: (Statistics::min(samples.z.iter()), Statistics::max(samples.z.iter())),
    })
}

/// `n` evenly spaced values from `lo` to `hi`, both ends exact.
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
        .collect()
}

/// Collapses repeated `(x, y)` locations into one point with the mean z.
/// Output is ordered by `(x, y)`; `-0.0` and `0.0` are the same location.
fn merge_duplicates(samples: &TripleSamples) -> (Vec<Point>, Vec<f64>) {
    let xs: Vec<f64> = samples.x.iter().map(|&v| unsigned_zero(v)).collect();
    let ys: Vec<f64> = samples.y.iter().map(|&v| unsigned_zero(v)).collect();
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]).then(ys[a].total_cmp(&ys[b])));

    let mut points: Vec<Point> = Vec::with_capacity(order.len());
    let mut values: Vec<f64> = Vec::with_capacity(order.len());
    let mut counts: Vec<usize> = Vec::with_capacity(order.len());
    for i in order {
        let p = Point::new(xs[i], ys[i]);
        match points.last() {
            Some(&last) if last == p => {
                if let (Some(v), Some(c)) = (values.last_mut(), counts.last_mut()) {
                    *v += samples.z[i];
                    *c += 1;
                }
            }
            _ => {
                points.push(p);
                values.push(samples.z[i]);
                counts.push(1);
            }
        }
    }
    for (v, &c) in values.iter_mut().zip(&counts) {
        *v /= c as f64;
    }
    (points, values)
}

#[inline]
fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

// ── Interpolants ──────────────────────────────────────────────────────

enum Interpolant {
    Linear,
    /// Per-vertex gradients in the triangulation's local frame.
    Cubic(Vec<[f64; 2]>),
}

impl Interpolant {
    fn evaluate(&self, tri: &Triangulation, values: &[f64], p: Point) -> Option<f64> {
        let loc = tri.locate(p)?;
        let v = tri.triangles()[loc.triangle];
        let [u, s, t] = loc.weights;
        match self {
            Self::Linear => Some(u * values[v[0]] + s * values[v[1]] + t * values[v[2]]),
            Self::Cubic(grads) => Some(bezier_patch(tri, values, grads, v, loc.weights)),
        }
    }
}

/// Least-squares gradient at each vertex from its Delaunay neighbours,
/// weighted by inverse squared distance.
fn vertex_gradients(tri: &Triangulation, values: &[f64]) -> Vec<[f64; 2]> {
    tri.neighbors()
        .iter()
        .enumerate()
        .map(|(i, nbrs)| {
            let pi = tri.local_point(i);
            let (mut axx, mut axy, mut ayy, mut bx, mut by) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for &j in nbrs {
                let pj = tri.local_point(j);
                let (dx, dy) = (pj.x - pi.x, pj.y - pi.y);
                let w = 1.0 / (dx * dx + dy * dy);
                let dz = values[j] - values[i];
                axx += w * dx * dx;
                axy += w * dx * dy;
                ayy += w * dy * dy;
                bx += w * dx * dz;
                by += w * dy * dz;
            }
            let det = axx * ayy - axy * axy;
            if det.abs() <= f64::EPSILON * (axx * ayy).abs() {
                return [0.0, 0.0];
            }
            [(ayy * bx - axy * by) / det, (axx * by - axy * bx) / det]
        })
        .collect()
}

/// Evaluates the cubic Bézier triangle over `v` at barycentric `w`.
fn bezier_patch(
    tri: &Triangulation,
    values: &[f64],
    grads: &[[f64; 2]],
    v: [usize; 3],
    w: [f64; 3],
) -> f64 {
    let p = v.map(|i| tri.local_point(i));
    let z = v.map(|i| values[i]);
    let g = v.map(|i| grads[i]);

    // control point one third of the way from vertex a towards vertex b
    let edge = |a: usize, b: usize| {
        z[a] + (g[a][0] * (p[b].x - p[a].x) + g[a][1] * (p[b].y - p[a].y)) / 3.0
    };
    let b210 = edge(0, 1);
    let b120 = edge(1, 0);
    let b021 = edge(1, 2);
    let b012 = edge(2, 1);
    let b102 = edge(2, 0);
    let b201 = edge(0, 2);
    let e = (b210 + b120 + b021 + b012 + b102 + b201) / 6.0;
    let c = (z[0] + z[1] + z[2]) / 3.0;
    let b111 = e + (e - c) / 2.0;

    let [u, s, t] = w;
    u * u * u * z[0]
        + s * s * s * z[1]
        + t * t * t * z[2]
        + 3.0 * u * u * s * b210
        + 3.0 * u * s * s * b120
        + 3.0 * s * s * t * b021
        + 3.0 * s * t * t * b012
        + 3.0 * u * t * t * b102
        + 3.0 * u * u * t * b201
        + 6.0 * u * s * t * b111
}

// ── Tests ─────────────────────────────────────────────────────────────
