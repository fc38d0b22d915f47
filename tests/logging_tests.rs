//! Global subscriber installation. Lives in its own test binary so the
//! process-wide subscriber does not leak into other tests.

use std::fs;

use u_scatter::dataset::{Column, Dataset};
use u_scatter::logging::{init_logging, LogConfig};
use u_scatter::{CorrelationAnalyzer, ErrorKind};

#[test]
fn file_sink_receives_engine_events() {
    std::env::remove_var("RUST_LOG");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("u_scatter.log");

    let config = LogConfig {
        level: "debug".into(),
        file: Some(path.clone()),
        ..LogConfig::default()
    };
    let handle = init_logging(&config).unwrap();
    assert_eq!(handle.path(), Some(path.as_path()));

    let ds = Dataset::from_columns([
        ("x", Column::from_options(vec![Some(1.0), Some(2.0), None, Some(4.0)])),
        ("y", Column::dense(vec![1.5, 2.5, 3.5, 4.5])),
    ])
    .unwrap();
    CorrelationAnalyzer::new().analyze(&ds, "x", "y").unwrap();

    let err = init_logging(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Logging);

    handle.shutdown().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("u-scatter logging initialized"));
    assert!(content.contains("correlation samples selected"));
    assert!(content.contains("rows_dropped=1"));
}
