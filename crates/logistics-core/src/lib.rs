//! Logistics Core Library
//!
//! Business logic of the freight forwarding tracker: the client registry,
//! the request ledger with per-client numbering, shipment tracking and the
//! printable request report.

pub mod clients;
pub mod config;
pub mod error;
pub mod ledger;
pub mod paths;
pub mod registry;
pub mod services;
pub mod storage;
pub mod tracker;
pub mod validation;

// Re-export main types for easy access
pub use config::LogisticsConfig;
pub use error::{LogisticsError, Result};

pub use clients::{PdfConverter, PdfService};
pub use ledger::{RequestFilter, RequestLedger};
pub use registry::{ClientFilter, ClientRegistry};
pub use services::{RenderedReport, ReportRenderer};
pub use storage::{Database, Pagination};
pub use tracker::{ShipmentFilter, ShipmentListItem, ShipmentTracker};
