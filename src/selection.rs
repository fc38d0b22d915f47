//! Column selection and row cleaning.
//!
//! Selecting the same column for both axes is a named case here rather than
//! an accident of a generic projection: [`ColumnSelection::Identical`] reads
//! the column once and hands the same series to both axes, so a 1-D series
//! never turns into a 2-D one.
//!
//! Cleaning drops every row where any selected column is missing or
//! non-finite. The number of dropped rows is reported alongside the samples.

use crate::dataset::{Dataset, NumericColumn};
use crate::error::ScatterError;

/// How a pair of column names maps onto the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSelection<'a> {
    /// `column_x == column_y`: one column feeds both axes.
    Identical(&'a str),
    /// Two different columns.
    Distinct { x: &'a str, y: &'a str },
}

impl<'a> ColumnSelection<'a> {
    /// Classifies a requested `(x, y)` pair.
    pub fn pair(column_x: &'a str, column_y: &'a str) -> Self {
        if column_x == column_y {
            Self::Identical(column_x)
        } else {
            Self::Distinct {
                x: column_x,
                y: column_y,
            }
        }
    }

    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical(_))
    }

    /// Names as reported in errors: `[x, y]`, with the shared name twice.
    pub fn names(&self) -> [&'a str; 2] {
        match *self {
            Self::Identical(c) => [c, c],
            Self::Distinct { x, y } => [x, y],
        }
    }
}

/// Cleaned `(x, y)` samples for a pair selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSamples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// `true` when both axes come from the same column.
    pub identical: bool,
    /// Rows removed by cleaning.
    pub rows_dropped: usize,
}

impl PairedSamples {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Cleaned `(x, y, z)` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleSamples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub rows_dropped: usize,
}

impl TripleSamples {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Cleaned samples for an arbitrary column list, one `Vec` per column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSamples {
    pub columns: Vec<Vec<f64>>,
    /// Dataset row index of every kept sample.
    pub kept_rows: Vec<usize>,
    pub rows_dropped: usize,
}

impl ColumnSamples {
    /// Number of kept rows.
    pub fn len(&self) -> usize {
        self.kept_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept_rows.is_empty()
    }

    /// The kept values of one row, in column order.
    pub fn row(&self, idx: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().map(move |c| c[idx])
    }
}

/// Reads and cleans a column pair.
///
/// ```
/// use u_scatter::dataset::{Column, Dataset};
/// use u_scatter::selection::select_pair;
///
/// let ds = Dataset::from_columns([
///     ("a", Column::from_options(vec![Some(1.0), None, Some(3.0)])),
/// ]).unwrap();
/// let s = select_pair(&ds, "a", "a").unwrap();
/// assert!(s.identical);
/// assert_eq!(s.x, vec![1.0, 3.0]);
/// assert_eq!(s.x, s.y);
/// assert_eq!(s.rows_dropped, 1);
/// ```
pub fn select_pair(
    dataset: &Dataset,
    column_x: &str,
    column_y: &str,
) -> Result<PairedSamples, ScatterError> {
    match ColumnSelection::pair(column_x, column_y) {
        ColumnSelection::Identical(name) => {
            let mut cleaned = clean_rows(dataset, &[dataset.numeric(name)?]);
            let values = cleaned.columns.pop().unwrap_or_default();
            Ok(PairedSamples {
                x: values.clone(),
                y: values,
                identical: true,
                rows_dropped: cleaned.rows_dropped,
            })
        }
        ColumnSelection::Distinct { x, y } => {
            let views = [dataset.numeric(x)?, dataset.numeric(y)?];
            let mut cleaned = clean_rows(dataset, &views);
            let ys = cleaned.columns.pop().unwrap_or_default();
            let xs = cleaned.columns.pop().unwrap_or_default();
            Ok(PairedSamples {
                x: xs,
                y: ys,
                identical: false,
                rows_dropped: cleaned.rows_dropped,
            })
        }
    }
}

/// Reads and cleans three columns. Repeated names are read once.
pub fn select_triple(
    dataset: &Dataset,
    column_x: &str,
    column_y: &str,
    column_z: &str,
) -> Result<TripleSamples, ScatterError> {
    let requested = [column_x, column_y, column_z];
    let mut unique: Vec<&str> = Vec::with_capacity(3);
    for name in requested {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }

    let views = unique
        .iter()
        .map(|name| dataset.numeric(name))
        .collect::<Result<Vec<_>, _>>()?;
    let cleaned = clean_rows(dataset, &views);

    let pick = |name: &str| -> Vec<f64> {
        unique
            .iter()
            .position(|u| *u == name)
            .map(|i| cleaned.columns[i].clone())
            .unwrap_or_default()
    };

    Ok(TripleSamples {
        x: pick(column_x),
        y: pick(column_y),
        z: pick(column_z),
        rows_dropped: cleaned.rows_dropped,
    })
}

/// Reads and cleans `names` in order. A repeated name is a
/// [`ScatterError::DuplicateColumn`].
pub fn select_columns(dataset: &Dataset, names: &[&str]) -> Result<ColumnSamples, ScatterError> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(ScatterError::DuplicateColumn {
                name: (*name).to_string(),
            });
        }
    }
    let views = names
        .iter()
        .map(|name| dataset.numeric(name))
        .collect::<Result<Vec<_>, _>>()?;
    let cleaned = clean_rows(dataset, &views);
    Ok(ColumnSamples {
        columns: cleaned.columns,
        kept_rows: cleaned.kept_rows,
        rows_dropped: cleaned.rows_dropped,
    })
}

/// Counts rows usable for every named column, without copying values.
pub fn count_valid_rows(dataset: &Dataset, columns: &[&str]) -> Result<usize, ScatterError> {
    let views = columns
        .iter()
        .map(|name| dataset.numeric(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((0..dataset.row_count())
        .filter(|&row| views.iter().all(|v| v.get(row).is_some()))
        .count())
}

struct Cleaned {
    columns: Vec<Vec<f64>>,
    kept_rows: Vec<usize>,
    rows_dropped: usize,
}

fn clean_rows(dataset: &Dataset, views: &[NumericColumn<'_>]) -> Cleaned {
    let n_rows = dataset.row_count();
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(n_rows); views.len()];
    let mut row_values = Vec::with_capacity(views.len());
    let mut kept_rows = Vec::with_capacity(n_rows);
    let mut rows_dropped = 0;

    for row in 0..n_rows {
        row_values.clear();
        row_values.extend(views.iter().map_while(|v| v.get(row)));
        if row_values.len() == views.len() {
            for (col, &v) in columns.iter_mut().zip(row_values.iter()) {
                col.push(v);
            }
            kept_rows.push(row);
        } else {
            rows_dropped += 1;
        }
    }

    Cleaned {
        columns,
        kept_rows,
        rows_dropped,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, ValidityBitmap};

    fn sample() -> Dataset {
        Dataset::from_columns([
            (
                "temperature",
                Column::from_options(vec![Some(25.3), Some(26.1), None, Some(27.5), Some(23.9)]),
            ),
            (
                "pressure",
                Column::from_options(vec![Some(101.2), None, Some(100.9), Some(f64::NAN), Some(100.5)]),
            ),
            (
                "label",
                Column::text(
                    vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
                    ValidityBitmap::all_valid(5),
                ),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn pair_classification() {
        assert_eq!(ColumnSelection::pair("a", "a"), ColumnSelection::Identical("a"));
        assert!(!ColumnSelection::pair("a", "b").is_identical());
        assert_eq!(ColumnSelection::pair("a", "a").names(), ["a", "a"]);
    }

    #[test]
    fn identical_selection_yields_one_series_for_both_axes() {
        let ds = sample();
        let s = select_pair(&ds, "temperature", "temperature").unwrap();
        assert!(s.identical);
        assert_eq!(s.x, vec![25.3, 26.1, 27.5, 23.9]);
        assert_eq!(s.x, s.y);
        assert_eq!(s.rows_dropped, 1);
    }

    #[test]
    fn distinct_selection_drops_rows_missing_in_either_column() {
        let ds = sample();
        let s = select_pair(&ds, "temperature", "pressure").unwrap();
        assert!(!s.identical);
        // rows 1 (pressure missing), 2 (temperature missing), 3 (pressure NaN) dropped
        assert_eq!(s.x, vec![25.3, 23.9]);
        assert_eq!(s.y, vec![101.2, 100.5]);
        assert_eq!(s.rows_dropped, 3);
    }

    #[test]
    fn selection_errors_name_the_column() {
        let ds = sample();
        assert_eq!(
            select_pair(&ds, "temperature", "humidity").unwrap_err(),
            ScatterError::ColumnNotFound {
                name: "humidity".into()
            }
        );
        assert!(matches!(
            select_pair(&ds, "label", "label"),
            Err(ScatterError::NonNumericColumn { .. })
        ));
    }

    #[test]
    fn triple_with_repeated_name() {
        let ds = sample();
        let s = select_triple(&ds, "temperature", "pressure", "temperature").unwrap();
        assert_eq!(s.x, s.z);
        assert_eq!(s.len(), 2);
        assert_eq!(s.rows_dropped, 3);
    }

    #[test]
    fn count_valid_rows_matches_selection() {
        let ds = sample();
        assert_eq!(count_valid_rows(&ds, &["temperature"]).unwrap(), 4);
        assert_eq!(count_valid_rows(&ds, &["temperature", "pressure"]).unwrap(), 2);
        assert!(count_valid_rows(&ds, &["nope"]).is_err());
    }

    #[test]
    fn column_list_reports_kept_rows() {
        let ds = sample();
        let s = select_columns(&ds, &["pressure", "temperature"]).unwrap();
        assert_eq!(s.kept_rows, vec![0, 4]);
        assert_eq!(s.columns, vec![vec![101.2, 100.5], vec![25.3, 23.9]]);
        assert_eq!(s.row(1).collect::<Vec<_>>(), vec![100.5, 23.9]);
        assert_eq!(s.rows_dropped, 3);
    }

    #[test]
    fn column_list_rejects_repeats() {
        let ds = sample();
        let err = select_columns(&ds, &["temperature", "pressure", "temperature"]).unwrap_err();
        assert_eq!(
            err,
            ScatterError::DuplicateColumn {
                name: "temperature".into()
            }
        );
    }
}
