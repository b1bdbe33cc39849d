//! Logistics server: the HTTP report endpoint and the operator CLI

pub mod admin;
pub mod cli;
pub mod http;

use logistics_core::{
    paths, ClientRegistry, Database, LogisticsConfig, PdfConverter, PdfService, ReportRenderer,
    RequestLedger, Result, ShipmentTracker,
};
use std::sync::Arc;

/// Services shared by the HTTP handlers and the CLI commands
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<LogisticsConfig>,
    pub registry: Arc<ClientRegistry>,
    pub ledger: Arc<RequestLedger>,
    pub tracker: Arc<ShipmentTracker>,
    pub renderer: Arc<ReportRenderer>,
    pub converter: Arc<dyn PdfConverter>,
}

impl AppContext {
    /// Wire every service to the database and the configured PDF service
    pub fn new(config: LogisticsConfig, db: Database) -> Result<Self> {
        let converter = Arc::new(PdfService::new(config.pdf_service.clone())?);
        Self::with_converter(config, db, converter)
    }

    pub fn with_converter(
        config: LogisticsConfig,
        db: Database,
        converter: Arc<dyn PdfConverter>,
    ) -> Result<Self> {
        let mut renderer = ReportRenderer::new(db.clone(), converter.clone())?;

        let template_override = paths::request_template_path();
        if template_override.is_file() {
            renderer = renderer.with_template_file(&template_override)?;
        }

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(ClientRegistry::new(db.clone())),
            ledger: Arc::new(RequestLedger::new(db.clone())),
            tracker: Arc::new(ShipmentTracker::new(db)),
            renderer: Arc::new(renderer),
            converter,
        })
    }
}
