//! File → dataset → analyses → rendered output.

use std::fs;
use std::path::Path;

use u_scatter::correlation::PairSelection;
use u_scatter::csv_source::CsvSource;
use u_scatter::interfaces::{Analyzer, DataSource, Renderer};
use u_scatter::pca::{PcaAnalyzer, PcaSelection};
use u_scatter::report::{JsonRenderer, MetricsRenderer};
use u_scatter::surface::SurfaceSelection;
use u_scatter::{
    CorrelationAnalyzer, ErrorKind, InterpolationMethod, SurfaceInterpolator, SurfaceOptions,
};

fn plane(x: f64, y: f64) -> f64 {
    1.5 * x - 2.0 * y + 4.0
}

/// 30 scattered samples on a plane, two rows with missing values and a
/// text column.
fn process_csv(delimiter: char) -> String {
    let mut state: u64 = 0x5eed;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64 * 10.0
    };

    let d = delimiter;
    let mut csv = format!("batch{d}temperature{d}pressure{d}yield\n");
    for i in 0..30 {
        let (t, p) = (next(), next());
        csv.push_str(&format!("B{i:02}{d}{t}{d}{p}{d}{}\n", plane(t, p)));
    }
    csv.push_str(&format!("B30{d}NA{d}3.0{d}7.0\n"));
    csv.push_str(&format!("B31{d}2.0{d}4.0{d}\n"));
    csv
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run<A: Analyzer>(analyzer: &A, ds: &u_scatter::Dataset, sel: &A::Selection) -> A::Output {
    assert!(analyzer.validate(ds, sel), "{} rejected selection", analyzer.name());
    analyzer.analyze(ds, sel).unwrap()
}

#[test]
fn csv_file_to_correlation_readout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "process.csv", &process_csv(','));
    let ds = CsvSource::new().load(&path).unwrap();
    assert_eq!(ds.row_count(), 32);
    assert_eq!(ds.column_count(), 4);

    let analyzer = CorrelationAnalyzer::new();
    let result = run(&analyzer, &ds, &PairSelection::new("temperature", "yield"));
    assert_eq!(result.sample_size, 30);
    assert_eq!(result.rows_dropped, 2);
    assert!(result.slope > 0.0);
    assert!(result.r_squared > 0.0 && result.r_squared < 1.0);
    assert!((result.pearson_r * result.pearson_r - result.r_squared).abs() < 1e-9);

    let text = MetricsRenderer.render_analysis(&result).unwrap();
    assert!(text.starts_with("Linearity Metrics (yield vs temperature)"));
    assert!(text.contains("Data Points:  30"));

    let json: serde_json::Value =
        serde_json::from_str(&JsonRenderer::new().render_analysis(&result).unwrap()).unwrap();
    assert_eq!(json["column_x"], "temperature");
    assert_eq!(json["sample_size"], 30);

    let same = analyzer.analyze(&ds, "pressure", "pressure").unwrap();
    assert_eq!(same.slope, 1.0);
    assert_eq!(same.r_squared, 1.0);
    assert_eq!(same.rmse, 0.0);
    assert_eq!(same.sample_size, 32);
}

#[test]
fn csv_file_to_surface_readout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "process.csv", &process_csv(','));
    let ds = CsvSource::new().load(&path).unwrap();
    let selection = SurfaceSelection::new("temperature", "pressure", "yield");

    for method in [InterpolationMethod::Linear, InterpolationMethod::Cubic] {
        let interpolator = SurfaceInterpolator::with_options(SurfaceOptions {
            resolution: 25,
            method,
            ..SurfaceOptions::default()
        });
        let surface = run(&interpolator, &ds, &selection);
        assert_eq!(surface.sample_size, 30);
        assert_eq!(surface.distinct_points, 30);
        assert_eq!(surface.grid.method, method);
        assert_eq!(surface.stats.data_cells + surface.stats.empty_cells, 625);
        assert!(surface.stats.data_cells > 0);
        assert!(surface.stats.empty_cells > 0);

        for (row, &y) in surface.grid.y_coords.iter().enumerate() {
            for (col, &x) in surface.grid.x_coords.iter().enumerate() {
                if let Some(z) = surface.grid.get(row, col) {
                    assert!((z - plane(x, y)).abs() < 1e-6, "{method} at ({x}, {y})");
                }
            }
        }

        let text = MetricsRenderer.render_surface(&surface).unwrap();
        assert!(text.contains(&format!("Method:       {method}\n")));
        assert!(text.contains("Grid:         25 x 25\n"));
    }
}

#[test]
fn csv_file_to_latent_space() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "process.csv", &process_csv(','));
    let ds = CsvSource::new().load(&path).unwrap();

    // yield is a plane in (temperature, pressure), so two components carry everything
    let selection = PcaSelection::all_numeric();
    let result = run(&PcaAnalyzer::new(), &ds, &selection);
    assert_eq!(result.feature_columns, ["temperature", "pressure", "yield"]);
    assert_eq!(result.sample_size, 30);
    assert_eq!(result.kept_rows.len(), 30);
    assert!(!result.kept_rows.contains(&30));
    assert!((result.total_variance_explained() - 1.0).abs() < 1e-9);

    let with_target = PcaSelection::all_numeric().with_target("yield");
    let result = run(&PcaAnalyzer::new(), &ds, &with_target);
    assert_eq!(result.feature_columns, ["temperature", "pressure"]);
    assert_eq!(result.sample_size, 31);
}

#[test]
fn tsv_extension_switches_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "process.tsv", &process_csv('\t'));
    let ds = CsvSource::new().load(&path).unwrap();
    assert_eq!(ds.column_count(), 4);
    let result = CorrelationAnalyzer::new()
        .analyze(&ds, "pressure", "yield")
        .unwrap();
    assert!(result.slope < 0.0);
}

#[test]
fn load_and_analysis_errors_are_typed() {
    let dir = tempfile::tempdir().unwrap();

    let xlsx = write(dir.path(), "process.xlsx", "not a spreadsheet");
    let err = CsvSource::new().load(&xlsx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);

    let header_only = write(dir.path(), "empty.csv", "x,y,z\n");
    let err = CsvSource::new().load(&header_only).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);

    let path = write(dir.path(), "process.csv", &process_csv(','));
    let ds = CsvSource::new().load(&path).unwrap();

    let err = CorrelationAnalyzer::new()
        .analyze(&ds, "batch", "yield")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = SurfaceInterpolator::new()
        .analyze(&ds, "temperature", "humidity", "yield")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
