//! C FFI bindings for u-scatter.
//!
//! Exposes correlation analysis and surface building over a CSV-backed
//! dataset handle.
//!
//! # Design
//!
//! - **Opaque handle**: `*mut DatasetHandle`, created from CSV text
//! - **`#[repr(C)]`**: result structs
//! - **Integer status codes**: 0 = success, negative = error (one code per error kind)
//! - **Thread-local error message**: `scatter_last_error()`
//! - **`catch_unwind`**: every entry point that does work is wrapped
//!
//! # Safety
//!
//! Null pointer arguments return [`SCATTER_ERR_NULL_PTR`]. Arrays handed
//! out in result structs must be released with `scatter_free_f64_array`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic;
use std::ptr;

use crate::correlation::CorrelationAnalyzer;
use crate::csv_source::CsvParser;
use crate::dataset::Dataset;
use crate::error::{ErrorKind, ScatterError};
use crate::selection::count_valid_rows;
use crate::surface::{InterpolationMethod, SurfaceInterpolator};

// ── Error handling ────────────────────────────────────────────────────

pub const SCATTER_OK: i32 = 0;
pub const SCATTER_ERR_NULL_PTR: i32 = -1;
/// Missing or non-numeric column, bad option, invalid UTF-8.
pub const SCATTER_ERR_INVALID_INPUT: i32 = -2;
/// CSV could not be parsed.
pub const SCATTER_ERR_PARSE_FAILED: i32 = -3;
pub const SCATTER_ERR_INSUFFICIENT_DATA: i32 = -4;
pub const SCATTER_ERR_DEGENERATE_INPUT: i32 = -5;
pub const SCATTER_ERR_INTERPOLATION_METHOD: i32 = -6;
pub const SCATTER_ERR_PANIC: i32 = -99;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

/// Records `err` and returns its status code.
fn fail(err: &ScatterError) -> i32 {
    set_last_error(&err.to_string());
    match err.kind() {
        ErrorKind::Validation => SCATTER_ERR_INVALID_INPUT,
        ErrorKind::InsufficientData => SCATTER_ERR_INSUFFICIENT_DATA,
        ErrorKind::DegenerateInput => SCATTER_ERR_DEGENERATE_INPUT,
        ErrorKind::InterpolationMethod => SCATTER_ERR_INTERPOLATION_METHOD,
        ErrorKind::Load | ErrorKind::Logging | ErrorKind::Serialization => {
            SCATTER_ERR_PARSE_FAILED
        }
    }
}

/// Returns the last error message, or null if no error.
/// The returned string is valid until the next FFI call on this thread.
///
/// # Safety
/// The caller must not free the returned pointer.
#[no_mangle]
pub extern "C" fn scatter_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        let borrow = cell.borrow();
        match borrow.as_ref() {
            Some(cstr) => cstr.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Clears the last error message.
#[no_mangle]
pub extern "C" fn scatter_clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Reads a required string argument.
///
/// # Safety
/// `p` must be null or a valid null-terminated string.
unsafe fn str_arg<'a>(p: *const c_char, name: &str) -> Result<&'a str, i32> {
    if p.is_null() {
        set_last_error(&format!("null {name} pointer"));
        return Err(SCATTER_ERR_NULL_PTR);
    }
    unsafe { CStr::from_ptr(p) }.to_str().map_err(|e| {
        set_last_error(&format!("{name}: invalid UTF-8: {e}"));
        SCATTER_ERR_INVALID_INPUT
    })
}

// ── Dataset handle ────────────────────────────────────────────────────

/// Opaque handle holding a parsed dataset.
pub struct DatasetHandle {
    dataset: Dataset,
}

/// Parses CSV text (comma-delimited, header row) into a dataset handle.
/// Returns null on failure; see `scatter_last_error`.
///
/// # Safety
/// - `csv_data` must be a valid null-terminated UTF-8 string.
/// - The returned handle must be freed with `scatter_dataset_free`.
#[no_mangle]
pub unsafe extern "C" fn scatter_dataset_from_csv(csv_data: *const c_char) -> *mut DatasetHandle {
    let result = panic::catch_unwind(|| {
        let csv = match unsafe { str_arg(csv_data, "csv_data") } {
            Ok(s) => s,
            Err(_) => return ptr::null_mut(),
        };
        match CsvParser::new().parse_str(csv) {
            Ok(dataset) => Box::into_raw(Box::new(DatasetHandle { dataset })),
            Err(e) => {
                set_last_error(&format!("CSV parse error: {e}"));
                ptr::null_mut()
            }
        }
    });

    match result {
        Ok(ptr) => ptr,
        Err(_) => {
            set_last_error("panic in scatter_dataset_from_csv");
            ptr::null_mut()
        }
    }
}

/// Frees a dataset handle.
///
/// # Safety
/// `handle` must be a valid pointer from `scatter_dataset_from_csv`, or null.
#[no_mangle]
pub unsafe extern "C" fn scatter_dataset_free(handle: *mut DatasetHandle) {
    if !handle.is_null() {
        let _ = unsafe { Box::from_raw(handle) };
    }
}

/// Returns the number of rows, or -1 for a null handle.
///
/// # Safety
/// `handle` must be a valid dataset handle or null.
#[no_mangle]
pub unsafe extern "C" fn scatter_dataset_row_count(handle: *const DatasetHandle) -> i64 {
    if handle.is_null() {
        set_last_error("null handle");
        return -1;
    }
    let handle = unsafe { &*handle };
    handle.dataset.row_count() as i64
}

/// Returns the number of columns, or -1 for a null handle.
///
/// # Safety
/// `handle` must be a valid dataset handle or null.
#[no_mangle]
pub unsafe extern "C" fn scatter_dataset_col_count(handle: *const DatasetHandle) -> i64 {
    if handle.is_null() {
        set_last_error("null handle");
        return -1;
    }
    let handle = unsafe { &*handle };
    handle.dataset.column_count() as i64
}

// ── Correlation ───────────────────────────────────────────────────────

/// C-compatible correlation result. Undefined statistics are NaN.
#[repr(C)]
pub struct CAnalysisResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub rmse: f64,
    pub pearson_r: f64,
    pub p_value: f64,
    pub std_err: f64,
    pub mae: f64,
    pub mse: f64,
    /// Lower bound of the 95% slope confidence interval.
    pub slope_ci_low: f64,
    /// Upper bound of the 95% slope confidence interval.
    pub slope_ci_high: f64,
    pub sample_size: u64,
    pub rows_dropped: u64,
}

/// Advisory check. Returns 1 if the pair can be analyzed, 0 if not,
/// -1 on a null argument.
///
/// # Safety
/// `handle` must be a valid dataset handle; column names must be valid
/// null-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn scatter_validate_pair(
    handle: *const DatasetHandle,
    column_x: *const c_char,
    column_y: *const c_char,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if handle.is_null() {
            set_last_error("null handle");
            return SCATTER_ERR_NULL_PTR;
        }
        let handle = unsafe { &*handle };
        let (x, y) = match unsafe { (str_arg(column_x, "column_x"), str_arg(column_y, "column_y")) } {
            (Ok(x), Ok(y)) => (x, y),
            (Err(code), _) | (_, Err(code)) => return code,
        };
        i32::from(CorrelationAnalyzer::new().validate(&handle.dataset, x, y))
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in scatter_validate_pair");
            SCATTER_ERR_PANIC
        }
    }
}

/// Runs the correlation analysis for `(column_x, column_y)`.
///
/// # Safety
/// `handle` must be a valid dataset handle, column names valid
/// null-terminated strings, and `out` a valid `CAnalysisResult`.
#[no_mangle]
pub unsafe extern "C" fn scatter_analyze(
    handle: *const DatasetHandle,
    column_x: *const c_char,
    column_y: *const c_char,
    out: *mut CAnalysisResult,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if handle.is_null() || out.is_null() {
            set_last_error("null pointer");
            return SCATTER_ERR_NULL_PTR;
        }
        let handle = unsafe { &*handle };
        let (x, y) = match unsafe { (str_arg(column_x, "column_x"), str_arg(column_y, "column_y")) } {
            (Ok(x), Ok(y)) => (x, y),
            (Err(code), _) | (_, Err(code)) => return code,
        };

        let r = match CorrelationAnalyzer::new().analyze(&handle.dataset, x, y) {
            Ok(r) => r,
            Err(e) => return fail(&e),
        };

        unsafe {
            (*out) = CAnalysisResult {
                slope: r.slope,
                intercept: r.intercept,
                r_squared: r.r_squared,
                rmse: r.rmse,
                pearson_r: r.pearson_r,
                p_value: r.p_value,
                std_err: r.std_err,
                mae: r.mae,
                mse: r.mse,
                slope_ci_low: r.slope_ci.0,
                slope_ci_high: r.slope_ci.1,
                sample_size: r.sample_size as u64,
                rows_dropped: r.rows_dropped as u64,
            };
        }
        SCATTER_OK
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in scatter_analyze");
            SCATTER_ERR_PANIC
        }
    }
}

// ── Surface ───────────────────────────────────────────────────────────

/// Largest `resolution` accepted by `scatter_build_surface`.
pub const SCATTER_MAX_RESOLUTION: u32 = 16_384;

/// C-compatible surface result.
#[repr(C)]
pub struct CSurfaceResult {
    /// Nodes along x.
    pub width: u32,
    /// Nodes along y.
    pub height: u32,
    /// Row-major `height × width` values, NaN where there is no data.
    /// Caller must free with `scatter_free_f64_array`.
    pub z: *mut f64,
    /// Length of `z`.
    pub n_values: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Statistics over nodes with data.
    pub z_min: f64,
    pub z_max: f64,
    pub z_mean: f64,
    pub z_std: f64,
    /// NaN when no interior node has all four neighbours defined.
    pub gradient_max: f64,
    pub data_cells: u64,
    pub sample_size: u64,
}

/// Builds a `resolution × resolution` surface. `method` is `"linear"` or
/// `"cubic"`; null means linear. `resolution` above
/// [`SCATTER_MAX_RESOLUTION`] is rejected as invalid input.
///
/// # Safety
/// - `handle` must be a valid dataset handle; column names valid
///   null-terminated strings; `method` null or a valid string.
/// - `out` must point to a valid `CSurfaceResult`.
/// - The caller must free `out.z` with `scatter_free_f64_array`.
#[no_mangle]
pub unsafe extern "C" fn scatter_build_surface(
    handle: *const DatasetHandle,
    column_x: *const c_char,
    column_y: *const c_char,
    column_z: *const c_char,
    resolution: u32,
    method: *const c_char,
    out: *mut CSurfaceResult,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if handle.is_null() || out.is_null() {
            set_last_error("null pointer");
            return SCATTER_ERR_NULL_PTR;
        }
        if resolution > SCATTER_MAX_RESOLUTION {
            set_last_error(&format!(
                "resolution {resolution} exceeds {SCATTER_MAX_RESOLUTION}"
            ));
            return SCATTER_ERR_INVALID_INPUT;
        }
        let handle = unsafe { &*handle };
        let columns = unsafe {
            [
                str_arg(column_x, "column_x"),
                str_arg(column_y, "column_y"),
                str_arg(column_z, "column_z"),
            ]
        };
        let [x, y, z] = match columns {
            [Ok(x), Ok(y), Ok(z)] => [x, y, z],
            [Err(code), _, _] | [_, Err(code), _] | [_, _, Err(code)] => return code,
        };

        let method = if method.is_null() {
            InterpolationMethod::Linear
        } else {
            let name = match unsafe { str_arg(method, "method") } {
                Ok(s) => s,
                Err(code) => return code,
            };
            match name.parse::<InterpolationMethod>() {
                Ok(m) => m,
                Err(e) => return fail(&e),
            }
        };

        let interpolator = SurfaceInterpolator::new();
        let grid = match interpolator.build(&handle.dataset, x, y, z, resolution as usize, method) {
            Ok(g) => g,
            Err(e) => return fail(&e),
        };
        let stats = grid.stats();
        let sample_size = count_valid_rows(&handle.dataset, &[x, y, z]).unwrap_or(0);

        let values = grid.to_row_major().into_boxed_slice();
        let n_values = values.len();
        let z_ptr = Box::into_raw(values) as *mut f64;

        unsafe {
            (*out) = CSurfaceResult {
                width: grid.width() as u32,
                height: grid.height() as u32,
                z: z_ptr,
                n_values,
                x_min: grid.x_coords[0],
                x_max: grid.x_coords[grid.width() - 1],
                y_min: grid.y_coords[0],
                y_max: grid.y_coords[grid.height() - 1],
                z_min: stats.min,
                z_max: stats.max,
                z_mean: stats.mean,
                z_std: stats.std,
                gradient_max: stats.gradient_max.unwrap_or(f64::NAN),
                data_cells: stats.data_cells as u64,
                sample_size: sample_size as u64,
            };
        }
        SCATTER_OK
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in scatter_build_surface");
            SCATTER_ERR_PANIC
        }
    }
}

/// Frees an f64 array allocated by a u-scatter FFI function.
///
/// # Safety
/// `ptr` must have been allocated by a u-scatter FFI function with length
/// `count`, or be null.
#[no_mangle]
pub unsafe extern "C" fn scatter_free_f64_array(ptr: *mut f64, count: usize) {
    if !ptr.is_null() {
        let _ = unsafe { Vec::from_raw_parts(ptr, count, count) };
    }
}

// ── Version ───────────────────────────────────────────────────────────

/// Returns the version string of u-scatter.
///
/// # Safety
/// The returned string is a static string literal. Do not free it.
#[no_mangle]
pub extern "C" fn scatter_version() -> *const c_char {
    c"0.1.0".as_ptr()
}

// ── Tests ─────────────────────────────────────────────────────────────
