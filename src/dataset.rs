//! Column-major tabular dataset consumed read-only by the engine.
//!
//! A [`Dataset`] is an ordered set of uniquely-named, equal-length columns.
//! Missing values are tracked per column in a [`ValidityBitmap`]; the engine
//! treats a row as usable for a column subset only when every selected column
//! is valid *and* finite at that row.
//!
//! # Example
//!
//! ```
//! use u_scatter::dataset::{Column, Dataset};
//!
//! let mut ds = Dataset::new();
//! ds.add_column("temperature", Column::from_options(vec![Some(20.5), None, Some(19.8)]))
//!     .unwrap();
//! assert_eq!(ds.row_count(), 3);
//!
//! let temp = ds.numeric("temperature").unwrap();
//! assert_eq!(temp.get(0), Some(20.5));
//! assert_eq!(temp.get(1), None);
//! ```

use crate::error::ScatterError;

// ── ValidityBitmap ────────────────────────────────────────────────────

/// Bit-packed validity bitmap: bit set = value present, bit clear = missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityBitmap {
    bits: Vec<u64>,
    len: usize,
}

impl ValidityBitmap {
    /// Creates a bitmap where all `len` positions are valid.
    pub fn all_valid(len: usize) -> Self {
        let n_words = len.div_ceil(64);
        let mut bits = vec![u64::MAX; n_words];
        let trailing = len % 64;
        if trailing != 0 && n_words > 0 {
            bits[n_words - 1] = (1u64 << trailing) - 1;
        }
        Self { bits, len }
    }

    /// Creates an empty bitmap with no rows.
    pub fn empty() -> Self {
        Self {
            bits: Vec::new(),
            len: 0,
        }
    }

    /// Returns `true` if the value at `idx` is present.
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Marks position `idx` as missing.
    #[inline]
    pub fn set_invalid(&mut self, idx: usize) {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        self.bits[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Appends a new position.
    pub fn push(&mut self, valid: bool) {
        let idx = self.len;
        self.len += 1;
        if idx / 64 >= self.bits.len() {
            self.bits.push(0);
        }
        if valid {
            self.bits[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Counts missing positions.
    pub fn null_count(&self) -> usize {
        let valid: usize = self.bits.iter().map(|w| w.count_ones() as usize).sum();
        self.len - valid
    }
}

// ── DataType ──────────────────────────────────────────────────────────

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Continuous or integer values stored as `f64`.
    Numeric,
    /// True/false values.
    Boolean,
    /// Free-form strings.
    Text,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Text => write!(f, "Text"),
        }
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column. Missing positions hold a default value that is never read.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Dense `f64` values. Missing positions hold `0.0`.
    Numeric {
        values: Vec<f64>,
        validity: ValidityBitmap,
    },
    /// Boolean values. Missing positions hold `false`.
    Boolean {
        values: Vec<bool>,
        validity: ValidityBitmap,
    },
    /// Text values. Missing positions hold an empty string.
    Text {
        values: Vec<String>,
        validity: ValidityBitmap,
    },
}

impl Column {
    /// Creates a numeric column from values and an explicit bitmap.
    pub fn numeric(values: Vec<f64>, validity: ValidityBitmap) -> Self {
        Self::Numeric { values, validity }
    }

    /// Creates a numeric column where every position is present.
    pub fn dense(values: Vec<f64>) -> Self {
        let validity = ValidityBitmap::all_valid(values.len());
        Self::Numeric { values, validity }
    }

    /// Creates a numeric column with `None` as the missing marker.
    pub fn from_options(values: Vec<Option<f64>>) -> Self {
        let mut validity = ValidityBitmap::empty();
        let dense = values
            .into_iter()
            .map(|v| {
                validity.push(v.is_some());
                v.unwrap_or(0.0)
            })
            .collect();
        Self::Numeric {
            values: dense,
            validity,
        }
    }

    pub fn boolean(values: Vec<bool>, validity: ValidityBitmap) -> Self {
        Self::Boolean { values, validity }
    }

    pub fn text(values: Vec<String>, validity: ValidityBitmap) -> Self {
        Self::Text { values, validity }
    }

    /// Returns the storage type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::Boolean { .. } => DataType::Boolean,
            Self::Text { .. } => DataType::Text,
        }
    }

    /// Returns the validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        match self {
            Self::Numeric { validity, .. }
            | Self::Boolean { validity, .. }
            | Self::Text { validity, .. } => validity,
        }
    }

    pub fn len(&self) -> usize {
        self.validity().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of missing values.
    pub fn null_count(&self) -> usize {
        self.validity().null_count()
    }

    /// Returns the raw numeric values, or `None` for non-numeric columns.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Returns the text value at `idx` for a text column.
    pub fn text_at(&self, idx: usize) -> Option<&str> {
        match self {
            Self::Text { values, validity } if validity.is_valid(idx) => Some(&values[idx]),
            _ => None,
        }
    }
}

// ── NumericColumn ─────────────────────────────────────────────────────

/// Borrowed view of a numeric column.
#[derive(Debug, Clone, Copy)]
pub struct NumericColumn<'a> {
    name: &'a str,
    values: &'a [f64],
    validity: &'a ValidityBitmap,
}

impl<'a> NumericColumn<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the value at `row` if it is present and finite.
    #[inline]
    pub fn get(&self, row: usize) -> Option<f64> {
        let v = self.values[row];
        (self.validity.is_valid(row) && v.is_finite()).then_some(v)
    }

    /// Number of rows holding a present, finite value.
    pub fn usable_count(&self) -> usize {
        (0..self.values.len()).filter(|&i| self.get(i).is_some()).count()
    }
}

// ── Dataset ───────────────────────────────────────────────────────────

/// Ordered collection of uniquely-named, equal-length columns.
///
/// ```
/// use u_scatter::dataset::{Column, Dataset};
///
/// let mut ds = Dataset::new();
/// ds.add_column("x", Column::dense(vec![1.0, 2.0, 3.0])).unwrap();
/// assert!(ds.add_column("x", Column::dense(vec![4.0, 5.0, 6.0])).is_err());
/// assert!(ds.add_column("y", Column::dense(vec![4.0])).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from `(name, column)` pairs.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Column)>,
    ) -> Result<Self, ScatterError> {
        let mut ds = Self::new();
        for (name, column) in columns {
            ds.add_column(name, column)?;
        }
        Ok(ds)
    }

    /// Appends a named column.
    ///
    /// Fails if the name is already taken or if the length disagrees with
    /// the existing row count.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), ScatterError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(ScatterError::DuplicateColumn { name });
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        } else if column.len() != self.row_count {
            return Err(ScatterError::DimensionMismatch {
                expected: self.row_count,
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns the column with the given `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Returns a numeric view of `name`.
    ///
    /// Fails with [`ScatterError::ColumnNotFound`] or
    /// [`ScatterError::NonNumericColumn`].
    pub fn numeric(&self, name: &str) -> Result<NumericColumn<'_>, ScatterError> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ScatterError::ColumnNotFound {
                name: name.to_string(),
            })?;
        match &self.columns[idx] {
            Column::Numeric { values, validity } => Ok(NumericColumn {
                name: &self.names[idx],
                values,
                validity,
            }),
            other => Err(ScatterError::NonNumericColumn {
                column: name.to_string(),
                data_type: other.data_type().to_string(),
            }),
        }
    }

    /// Returns `(name, type)` for every column in order.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(name, col)| (name.as_str(), col.data_type()))
            .collect()
    }

    /// Iterates `(name, column)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(|s| s.as_str()).zip(self.columns.iter())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
