//! Catalog checks against files on disk

use std::io::Write;
use tempfile::NamedTempFile;
use triage_catalog::CatalogOrigin;
use triage_cli::commands::catalog::check_catalog;
use triage_cli::{CliError, Formatter, OutputFormat};

fn catalog_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const TWO_AREAS: &str = r#"
[[areas]]
name = "vcs"
keywords = ["git", "commit"]
path_globs = ["**/vcs/**"]
owners = ["dana"]

[[areas]]
name = "VCS"
keywords = ["merge"]
"#;

#[test]
fn test_lenient_check_reports_warnings() {
    let file = catalog_file(TWO_AREAS);
    let catalog = check_catalog(Some(file.path()), false).unwrap();
    assert_eq!(catalog.origin, CatalogOrigin::Configured);
    assert_eq!(catalog.areas.len(), 1);
    assert_eq!(catalog.warnings.len(), 1);

    let output = Formatter::new(OutputFormat::Table, false)
        .format_catalog(&catalog)
        .unwrap();
    assert!(output.contains("⚠ Duplicate area 'VCS'"));
}

#[test]
fn test_strict_check_fails_on_warnings() {
    let file = catalog_file(TWO_AREAS);
    let result = check_catalog(Some(file.path()), true);
    assert!(matches!(result, Err(CliError::InvalidInput(msg)) if msg.contains("Duplicate area")));
}

#[test]
fn test_malformed_catalog() {
    let file = catalog_file("[[areas]\nname = ");

    let lenient = check_catalog(Some(file.path()), false).unwrap();
    assert_eq!(lenient.origin, CatalogOrigin::Fallback);

    let strict = check_catalog(Some(file.path()), true);
    assert!(matches!(strict, Err(CliError::Catalog(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = check_catalog(Some(&dir.path().join("absent.toml")), false);
    assert!(matches!(result, Err(CliError::Io(_))));
}

#[test]
fn test_json_catalog_output() {
    let file = catalog_file(TWO_AREAS);
    let catalog = check_catalog(Some(file.path()), false).unwrap();
    let output = Formatter::new(OutputFormat::Json, false)
        .format_catalog(&catalog)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["origin"], "configured");
    assert_eq!(value["areas"][0]["pathGlobs"][0], "**/vcs/**");
    assert_eq!(value["areas"][0]["owners"][0], "dana");
}
