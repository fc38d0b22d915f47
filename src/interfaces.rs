//! Role interfaces: data sources feed datasets in, analyzers turn them into
//! results, renderers turn results into something a user reads.
//!
//! Callers depend on these traits; the concrete variants live in
//! [`csv_source`](crate::csv_source), [`correlation`](crate::correlation),
//! [`surface`](crate::surface) and [`report`](crate::report).

use std::path::Path;

use crate::correlation::AnalysisResult;
use crate::dataset::Dataset;
use crate::error::ScatterError;
use crate::surface::SurfaceAnalysis;

/// Loads a [`Dataset`] from a file.
pub trait DataSource {
    /// Reads and parses `path`.
    fn load(&self, path: &Path) -> Result<Dataset, ScatterError>;

    /// Returns `true` if this source handles the file's extension.
    fn can_load(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.supported_extensions()
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Lower-case extensions without the leading dot.
    fn supported_extensions(&self) -> &[&'static str];
}

/// A statistical analysis over a column selection.
///
/// `validate` is advisory and never fails; `analyze` returns either a
/// complete result or a typed error.
pub trait Analyzer {
    /// Which columns the analysis reads.
    type Selection;
    /// Immutable result value.
    type Output;

    fn name(&self) -> &'static str;

    /// Number of distinct roles in [`Self::Selection`].
    fn required_columns(&self) -> usize;

    fn validate(&self, dataset: &Dataset, selection: &Self::Selection) -> bool;

    fn analyze(
        &self,
        dataset: &Dataset,
        selection: &Self::Selection,
    ) -> Result<Self::Output, ScatterError>;
}

/// Turns results into a textual artifact.
pub trait Renderer {
    fn name(&self) -> &'static str;

    fn render_analysis(&self, result: &AnalysisResult) -> Result<String, ScatterError>;

    fn render_surface(&self, surface: &SurfaceAnalysis) -> Result<String, ScatterError>;
}
