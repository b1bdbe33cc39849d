//! Printable request report: HTML from a Handlebars template, then PDF

use crate::clients::{looks_like_pdf, PdfConverter};
use crate::error::{LogisticsError, Result};
use crate::ledger::load_request;
use crate::registry::load_client;
use crate::storage::Database;
use crate::tracker::load_shipment_for_request;
use chrono::{DateTime, NaiveDate, Utc};
use handlebars::Handlebars;
use logistics_types::{Client, ContactPerson, Request, RequestId, Shipment};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

const TEMPLATE_NAME: &str = "request_pdf";
const EMBEDDED_TEMPLATE: &str = include_str!("../../templates/request_pdf.hbs");

/// Placeholder for empty fields in the report
const EMPTY: &str = "—";

/// A rendered PDF and the file name it is offered under
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RenderedReport {
    /// `Content-Disposition` value offering the report as a download
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// `Заявка_<number>_<YYYYMMDD>.pdf`
pub fn report_filename(request: &Request) -> String {
    format!(
        "Заявка_{}_{}.pdf",
        request.request_number,
        request.request_date.format("%Y%m%d")
    )
}

pub struct ReportRenderer {
    db: Database,
    converter: Arc<dyn PdfConverter>,
    handlebars: Handlebars<'static>,
}

impl ReportRenderer {
    pub fn new(db: Database, converter: Arc<dyn PdfConverter>) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars
            .register_template_string(TEMPLATE_NAME, EMBEDDED_TEMPLATE)
            .map_err(|e| LogisticsError::Template(e.to_string()))?;

        Ok(Self {
            db,
            converter,
            handlebars,
        })
    }

    /// Replace the embedded template with one read from disk
    pub fn with_template_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            LogisticsError::Template(format!(
                "Failed to read template file {}: {}",
                path.display(),
                e
            ))
        })?;

        self.handlebars
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| LogisticsError::Template(format!("{}: {}", path.display(), e)))?;

        log::info!("Using request report template {}", path.display());
        Ok(self)
    }

    /// Report HTML of a request, without conversion
    pub fn render_request_html(&self, request_id: RequestId) -> Result<String> {
        Ok(self.render_html(request_id, Utc::now())?.1)
    }

    /// Report of a request as a PDF document
    pub async fn render_request_pdf(&self, request_id: RequestId) -> Result<RenderedReport> {
        let (request, html) = self.render_html(request_id, Utc::now())?;

        let bytes = self.converter.convert_html(&html).await.map_err(|e| {
            log::error!("PDF conversion failed for request {}: {}", request_id, e);
            match e {
                LogisticsError::Render(_) => e,
                other => LogisticsError::Render(other.to_string()),
            }
        })?;

        if !looks_like_pdf(&bytes) {
            log::error!("Converter returned a non-PDF body for request {}", request_id);
            return Err(LogisticsError::Render(
                "Converter output is not a PDF document".to_string(),
            ));
        }

        let report = RenderedReport {
            filename: report_filename(&request),
            bytes,
        };
        log::info!(
            "Rendered {} ({} bytes) for request {}",
            report.filename,
            report.bytes.len(),
            request_id
        );
        Ok(report)
    }

    fn render_html(&self, request_id: RequestId, now: DateTime<Utc>) -> Result<(Request, String)> {
        let (request, client, shipment) = {
            let conn = self.db.connection()?;
            let request = load_request(&conn, request_id)?;
            let client = load_client(&conn, request.client_id)?;
            let shipment = load_shipment_for_request(&conn, request_id)?;
            (request, client, shipment)
        };

        let context = ReportContext::new(&request, &client, shipment.as_ref(), now);
        let html = self
            .handlebars
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| LogisticsError::Template(e.to_string()))?;

        Ok((request, html))
    }
}

/// Template data. Every value is pre-formatted for print.
#[derive(Debug, Serialize)]
struct ReportContext {
    title: String,
    request: RequestView,
    client: ClientView,
    shipment: Option<ShipmentView>,
    current_time: String,
}

#[derive(Debug, Serialize)]
struct RequestView {
    number: i64,
    date: String,
    shipment_number: String,
    transport_type: String,
    transport_at_border: String,
    consignor: String,
    consignee: String,
    country_of_origin: String,
    gross_weight: String,
    volume: String,
    declared_value: String,
    currency: String,
    insurance_required: String,
    special_notes: String,
    manager: String,
}

#[derive(Debug, Serialize)]
struct ClientView {
    display_name: String,
    name: String,
    inn: String,
    kpp: String,
    ogrn: String,
    legal_address: String,
    phone: String,
    email: String,
    director: String,
    bank_name: String,
    bik: String,
    correspondent_account: String,
    payment_account: String,
    contacts: Vec<ContactView>,
}

#[derive(Debug, Serialize)]
struct ContactView {
    name: String,
    phone: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct ShipmentView {
    status: String,
    etd: String,
    eta: String,
    actual_departure: String,
    actual_arrival: String,
    delivery_date: String,
    document_type: String,
    document_number: String,
    carrier: String,
    tracking_number: String,
    customs_declaration: String,
    comments: String,
}

impl ReportContext {
    fn new(
        request: &Request,
        client: &Client,
        shipment: Option<&Shipment>,
        now: DateTime<Utc>,
    ) -> Self {
        let fields = &request.fields;
        // An empty consignee means the client receives the cargo itself
        let consignee = if fields.consignee.trim().is_empty() {
            client.fields.name.clone()
        } else {
            fields.consignee.clone()
        };

        Self {
            title: request.title(client.name()),
            request: RequestView {
                number: request.request_number,
                date: request.request_date.format("%d.%m.%Y").to_string(),
                shipment_number: fields
                    .shipment_number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| EMPTY.to_string()),
                transport_type: fields.transport_type.label().to_string(),
                transport_at_border: fields
                    .transport_at_border
                    .map(|t| t.label().to_string())
                    .unwrap_or_else(|| EMPTY.to_string()),
                consignor: text(&fields.consignor),
                consignee,
                country_of_origin: text(&fields.country_of_origin),
                gross_weight: decimal(fields.gross_weight),
                volume: decimal(fields.volume),
                declared_value: decimal(fields.declared_value),
                currency: fields.currency.label().to_string(),
                insurance_required: if fields.insurance_required { "Да" } else { "Нет" }
                    .to_string(),
                special_notes: text(&fields.special_notes),
                manager: text(&fields.manager),
            },
            client: ClientView::new(client),
            shipment: shipment.map(ShipmentView::new),
            current_time: now.format("%d.%m.%Y %H:%M").to_string(),
        }
    }
}

impl ClientView {
    fn new(client: &Client) -> Self {
        let fields = &client.fields;
        let contacts = [&fields.primary_contact, &fields.secondary_contact]
            .into_iter()
            .filter(|c| !c.is_empty())
            .map(ContactView::new)
            .collect();

        Self {
            display_name: client.to_string(),
            name: fields.name.clone(),
            inn: text(&fields.inn),
            kpp: text(&fields.kpp),
            ogrn: text(&fields.ogrn),
            legal_address: text(&fields.legal_address),
            phone: text(&fields.company_phone),
            email: text(&fields.company_email),
            director: text(&fields.director),
            bank_name: text(&fields.bank.bank_name),
            bik: text(&fields.bank.bik),
            correspondent_account: text(&fields.bank.correspondent_account),
            payment_account: text(&fields.bank.payment_account),
            contacts,
        }
    }
}

impl ContactView {
    fn new(contact: &ContactPerson) -> Self {
        Self {
            name: text(&contact.name),
            phone: text(&contact.phone),
            email: text(&contact.email),
        }
    }
}

impl ShipmentView {
    fn new(shipment: &Shipment) -> Self {
        let fields = &shipment.fields;
        Self {
            status: fields.status.label().to_string(),
            etd: date(fields.etd),
            eta: date(fields.eta),
            actual_departure: date(fields.actual_departure),
            actual_arrival: date(fields.actual_arrival),
            delivery_date: date(fields.delivery_date),
            document_type: fields
                .document_type
                .map(|d| d.label().to_string())
                .unwrap_or_else(|| EMPTY.to_string()),
            document_number: text(&fields.document_number),
            carrier: text(&fields.carrier),
            tracking_number: text(&fields.tracking_number),
            customs_declaration: text(&fields.customs_declaration),
            comments: text(&fields.comments),
        }
    }
}

fn text(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        EMPTY.to_string()
    } else {
        value.to_string()
    }
}

fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| EMPTY.to_string())
}

fn decimal(value: Option<Decimal>) -> String {
    value
        .map(|d| d.to_string())
        .unwrap_or_else(|| EMPTY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RequestLedger;
    use crate::registry::ClientRegistry;
    use crate::tracker::ShipmentTracker;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use logistics_types::{
        ClientFields, DocumentType, NewRequest, RequestFields, ShipmentFields, ShipmentStatus,
        TransportType,
    };
    use std::str::FromStr;

    /// Echoes the HTML back behind a PDF header
    struct EchoConverter;

    #[async_trait]
    impl PdfConverter for EchoConverter {
        async fn convert_html(&self, html: &str) -> Result<Vec<u8>> {
            Ok(format!("%PDF-1.4\n{}", html).into_bytes())
        }
    }

    struct BrokenConverter;

    #[async_trait]
    impl PdfConverter for BrokenConverter {
        async fn convert_html(&self, _html: &str) -> Result<Vec<u8>> {
            Err(LogisticsError::Render("chromium crashed".to_string()))
        }
    }

    struct HtmlConverter;

    #[async_trait]
    impl PdfConverter for HtmlConverter {
        async fn convert_html(&self, html: &str) -> Result<Vec<u8>> {
            Ok(html.as_bytes().to_vec())
        }
    }

    fn seed(db: &Database) -> Request {
        let registry = ClientRegistry::new(db.clone());
        let ledger = RequestLedger::new(db.clone());

        let mut client = ClientFields::named("ООО Ромашка");
        client.inn = "7701234567".to_string();
        client.primary_contact.name = "Иванов И.И.".to_string();
        let client = registry.create_client(client).unwrap();

        let mut fields = RequestFields::new(TransportType::Sea, "Acme <Shanghai>");
        fields.gross_weight = Some(Decimal::from_str("1250.50").unwrap());
        ledger
            .create_request(NewRequest::new(client.id, fields))
            .unwrap()
    }

    #[test]
    fn test_report_filename() {
        let db = Database::in_memory().unwrap();
        let mut request = seed(&db);
        request.request_number = 7;
        request.request_date = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();

        assert_eq!(report_filename(&request), "Заявка_7_20240305.pdf");

        let report = RenderedReport {
            filename: report_filename(&request),
            bytes: Vec::new(),
        };
        assert_eq!(
            report.content_disposition(),
            "attachment; filename=\"Заявка_7_20240305.pdf\""
        );
    }

    #[test]
    fn test_html_contains_request_and_client() {
        let db = Database::in_memory().unwrap();
        let request = seed(&db);
        let renderer = ReportRenderer::new(db, Arc::new(EchoConverter)).unwrap();

        let html = renderer.render_request_html(request.id).unwrap();
        assert!(html.contains("Заявка #1 - ООО Ромашка (Море)"));
        assert!(html.contains("ООО Ромашка (ИНН: 7701234567)"));
        assert!(html.contains("1250.50"));
        assert!(html.contains("Иванов И.И."));
        assert!(html.contains("Китай"));
        // consignee falls back to the client
        assert!(html.contains("Грузополучатель</td><td>ООО Ромашка</td>"));
        // values are HTML-escaped
        assert!(html.contains("Acme &lt;Shanghai&gt;"));
        assert!(html.contains("Поставка не оформлена"));
    }

    #[test]
    fn test_html_includes_shipment() {
        let db = Database::in_memory().unwrap();
        let request = seed(&db);
        ShipmentTracker::new(db.clone())
            .create_shipment(
                request.id,
                ShipmentFields {
                    status: ShipmentStatus::InTransit,
                    eta: NaiveDate::from_ymd_opt(2024, 5, 15),
                    document_type: Some(DocumentType::Bl),
                    tracking_number: "TRK-42".to_string(),
                    ..ShipmentFields::default()
                },
            )
            .unwrap();

        let renderer = ReportRenderer::new(db, Arc::new(EchoConverter)).unwrap();
        let html = renderer.render_request_html(request.id).unwrap();
        assert!(html.contains("В пути"));
        assert!(html.contains("15.05.2024"));
        assert!(html.contains("TRK-42"));
        assert!(!html.contains("Поставка не оформлена"));
    }

    #[tokio::test]
    async fn test_pdf_for_missing_request_is_not_found() {
        let db = Database::in_memory().unwrap();
        let renderer = ReportRenderer::new(db, Arc::new(EchoConverter)).unwrap();

        let err = renderer
            .render_request_pdf(RequestId::new(404))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_pdf_report() {
        let db = Database::in_memory().unwrap();
        let request = seed(&db);
        let renderer = ReportRenderer::new(db, Arc::new(EchoConverter)).unwrap();

        let report = renderer.render_request_pdf(request.id).await.unwrap();
        assert!(report.bytes.starts_with(b"%PDF-"));
        assert_eq!(report.filename, report_filename(&request));
    }

    #[tokio::test]
    async fn test_converter_failures_are_render_errors() {
        let db = Database::in_memory().unwrap();
        let request = seed(&db);

        let broken = ReportRenderer::new(db.clone(), Arc::new(BrokenConverter)).unwrap();
        let err = broken.render_request_pdf(request.id).await.unwrap_err();
        assert!(matches!(err, LogisticsError::Render(_)));

        let not_pdf = ReportRenderer::new(db, Arc::new(HtmlConverter)).unwrap();
        let err = not_pdf.render_request_pdf(request.id).await.unwrap_err();
        assert!(matches!(err, LogisticsError::Render(_)));
    }

    #[test]
    fn test_template_file_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request_pdf.hbs");
        std::fs::write(&path, "<p>№{{request.number}} {{client.name}}</p>").unwrap();

        let db = Database::in_memory().unwrap();
        let request = seed(&db);
        let renderer = ReportRenderer::new(db, Arc::new(EchoConverter))
            .unwrap()
            .with_template_file(&path)
            .unwrap();

        assert_eq!(
            renderer.render_request_html(request.id).unwrap(),
            "<p>№1 ООО Ромашка</p>"
        );
    }

    #[test]
    fn test_broken_template_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request_pdf.hbs");
        std::fs::write(&path, "{{#if}}").unwrap();

        let db = Database::in_memory().unwrap();
        let result = ReportRenderer::new(db, Arc::new(EchoConverter))
            .unwrap()
            .with_template_file(&path);
        assert!(matches!(result, Err(LogisticsError::Template(_))));

        let missing = ReportRenderer::new(Database::in_memory().unwrap(), Arc::new(EchoConverter))
            .unwrap()
            .with_template_file(dir.path().join("absent.hbs"));
        assert!(matches!(missing, Err(LogisticsError::Template(_))));
    }
}
