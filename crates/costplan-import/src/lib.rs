//! # costplan-import
//!
//! Loads projects from spreadsheets (xlsx, xls, ods) and JSON bundles.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let project = costplan_import::parse_file(Path::new("backlog.xlsx")).unwrap();
//! println!("{} items", project.items.len());
//! ```

pub mod cell;
pub mod xlsx;

use std::path::Path;

use costplan_core::{BundleError, Project, ProjectBundle};
use thiserror::Error;

pub use cell::SheetCell;
pub use xlsx::{import_bytes, import_path, WorkbookImport};

/// Import errors
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("Workbook contains no sheets")]
    NoBacklogSheet,

    #[error("Sheet '{0}' is empty")]
    EmptySheet(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Supported input formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Spreadsheet,
    Json,
}

/// Detect the input format from the file extension
pub fn detect_format(path: &Path) -> Result<FileFormat, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => Ok(FileFormat::Spreadsheet),
        "json" => Ok(FileFormat::Json),
        _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load a project from a spreadsheet or JSON bundle.
///
/// Spreadsheet projects are named after the file stem and carry default
/// settings.
pub fn parse_file(path: &Path) -> Result<Project, ImportError> {
    match detect_format(path)? {
        FileFormat::Json => Ok(ProjectBundle::read(path)?.into_project()),
        FileFormat::Spreadsheet => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Imported Project");
            Ok(xlsx::import_path(path)?.into_project(name))
        }
    }
}

/// Load a project from spreadsheet bytes
pub fn parse_workbook_bytes(bytes: &[u8], project_name: &str) -> Result<Project, ImportError> {
    Ok(xlsx::import_bytes(bytes)?.into_project(project_name))
}

/// Load a project from bundle JSON text
pub fn parse_bundle(json: &str) -> Result<Project, ImportError> {
    Ok(ProjectBundle::from_json(json)?.into_project())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_by_extension() {
        assert_eq!(detect_format(Path::new("a.xlsx")).unwrap(), FileFormat::Spreadsheet);
        assert_eq!(detect_format(Path::new("a.ODS")).unwrap(), FileFormat::Spreadsheet);
        assert_eq!(detect_format(Path::new("dir/a.json")).unwrap(), FileFormat::Json);
        assert!(matches!(
            detect_format(Path::new("a.csv")),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(detect_format(Path::new("noext")).is_err());
    }

    #[test]
    fn bundle_text() {
        let project = parse_bundle(r#"{"projectName": "X", "exportDate": "2026-01-01T00:00:00Z", "items": [{"id": "a"}]}"#).unwrap();
        assert_eq!(project.name(), "X");
        assert_eq!(project.items.len(), 1);
    }

    #[test]
    fn invalid_bundle_is_error() {
        assert!(matches!(parse_bundle("{"), Err(ImportError::Bundle(_))));
    }

    #[test]
    fn garbage_bytes_are_error() {
        assert!(parse_workbook_bytes(b"not a workbook", "x").is_err());
    }
}
