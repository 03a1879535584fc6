//! Loading configuration from disk.

use std::io::Write;
use std::time::Duration;

use cellpane::{Config, Error};
use tempfile::NamedTempFile;

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[input]
buffer_size = 64
escape_timeout_ms = 50

[terminal]
mouse = false

[workers]
poll_interval_secs = 10
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.input.effective_buffer_size(), 64);
    assert_eq!(config.input.escape_timeout(), Duration::from_millis(50));
    assert!(!config.terminal.mouse);
    assert!(config.terminal.alternate_screen);
    assert_eq!(config.workers.poll_interval(), Duration::from_secs(10));
}

#[test]
fn test_empty_file_is_default() {
    let file = NamedTempFile::new().unwrap();
    assert_eq!(Config::load(file.path()).unwrap(), Config::default());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    match Config::load(&path) {
        Err(Error::ConfigRead { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected ConfigRead, got {other:?}"),
    }
}

#[test]
fn test_bad_value_reports_path() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[input]\nbuffer_size = \"big\"").unwrap();
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}
