//! Service modules for business logic

pub mod report_renderer;

pub use report_renderer::{report_filename, RenderedReport, ReportRenderer};
