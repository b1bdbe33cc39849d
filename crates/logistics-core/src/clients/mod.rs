//! Client modules for external services

pub mod pdf;

pub use pdf::{looks_like_pdf, PdfConverter, PdfService};
