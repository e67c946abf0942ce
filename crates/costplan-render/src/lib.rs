//! # costplan-render
//!
//! Output backends for costplan projects.
//!
//! This crate provides:
//! - Excel export in the layout the importer reads back
//! - Plain-text summary, planning and top-item reports
//!
//! ## Example
//!
//! ```rust,no_run
//! use costplan_core::{Project, Renderer};
//! use costplan_render::{ExcelExporter, TextRenderer};
//!
//! let project = Project::new("Portal");
//! print!("{}", TextRenderer::new().render(&project).unwrap());
//!
//! let xlsx_bytes = ExcelExporter::new().currency("EUR").render(&project).unwrap();
//! std::fs::write("portal.xlsx", xlsx_bytes).unwrap();
//! ```

pub mod excel;
pub mod text;

pub use excel::ExcelExporter;
pub use text::{money, planning_text, summary_text, top_items_text, TextRenderer};
