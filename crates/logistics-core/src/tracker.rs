//! Shipment tracker: transit status and transport documents of a request
//!
//! A request has at most one shipment. Status changes are not checked
//! against the usual progression; operators may set any status.

use crate::error::{LogisticsError, Result};
use crate::ledger::request_exists;
use crate::storage::{
    is_unique_violation, not_found, page_sql, shipment_from_row, Database, Pagination, SqlFilter,
    SHIPMENT_COLUMNS, SHIPMENT_COLUMN_COUNT,
};
use crate::validation::validate_shipment;
use chrono::Utc;
use logistics_types::{DocumentType, RequestId, Shipment, ShipmentFields, ShipmentId, ShipmentStatus};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

/// Filter options of the shipment list view
#[derive(Debug, Clone, Default)]
pub struct ShipmentFilter {
    pub status: Option<ShipmentStatus>,
    pub document_type: Option<DocumentType>,
    pub page: Option<Pagination>,
}

/// Row of the shipment list view: the shipment and its request's number
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentListItem {
    pub shipment: Shipment,
    pub request_number: i64,
}

pub struct ShipmentTracker {
    db: Database,
}

impl ShipmentTracker {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the shipment record of a request. Fails if the request already has one.
    pub fn create_shipment(&self, request_id: RequestId, fields: ShipmentFields) -> Result<Shipment> {
        validate_shipment(&fields)?;

        let conn = self.db.connection()?;
        if !request_exists(&conn, request_id)? {
            return Err(not_found("Request", request_id));
        }
        if load_shipment_for_request(&conn, request_id)?.is_some() {
            return Err(already_has_shipment(request_id));
        }

        let now = Utc::now();
        let inserted = conn.execute(
            "INSERT INTO shipments (
                request_id, status, etd, eta, actual_departure, actual_arrival, delivery_date,
                document_type, document_number, carrier, tracking_number, customs_declaration,
                comments, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                request_id.value(),
                fields.status.code(),
                fields.etd,
                fields.eta,
                fields.actual_departure,
                fields.actual_arrival,
                fields.delivery_date,
                fields.document_type.map(|d| d.code()),
                fields.document_number,
                fields.carrier,
                fields.tracking_number,
                fields.customs_declaration,
                fields.comments,
                now,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(already_has_shipment(request_id)),
            Err(e) => return Err(e.into()),
        }

        let id = ShipmentId::new(conn.last_insert_rowid());
        log::info!(
            "Created shipment {} for request {} with status {}",
            id,
            request_id,
            fields.status
        );
        load_shipment(&conn, id)
    }

    /// Replace every editable field, status included
    pub fn update_shipment(&self, id: ShipmentId, fields: ShipmentFields) -> Result<Shipment> {
        validate_shipment(&fields)?;

        let conn = self.db.connection()?;
        let previous = load_shipment(&conn, id)?;
        conn.execute(
            "UPDATE shipments SET
                status = ?2, etd = ?3, eta = ?4, actual_departure = ?5, actual_arrival = ?6,
                delivery_date = ?7, document_type = ?8, document_number = ?9, carrier = ?10,
                tracking_number = ?11, customs_declaration = ?12, comments = ?13, updated_at = ?14
            WHERE id = ?1",
            params![
                id.value(),
                fields.status.code(),
                fields.etd,
                fields.eta,
                fields.actual_departure,
                fields.actual_arrival,
                fields.delivery_date,
                fields.document_type.map(|d| d.code()),
                fields.document_number,
                fields.carrier,
                fields.tracking_number,
                fields.customs_declaration,
                fields.comments,
                Utc::now(),
            ],
        )?;

        if previous.status() != fields.status {
            log::info!(
                "Shipment {} status changed: {} -> {}",
                id,
                previous.status(),
                fields.status
            );
        }
        load_shipment(&conn, id)
    }

    /// Change only the status
    pub fn set_status(&self, id: ShipmentId, status: ShipmentStatus) -> Result<Shipment> {
        let mut fields = self.get_shipment(id)?.fields;
        fields.status = status;
        self.update_shipment(id, fields)
    }

    pub fn get_shipment(&self, id: ShipmentId) -> Result<Shipment> {
        let conn = self.db.connection()?;
        load_shipment(&conn, id)
    }

    /// Shipment of a request, `None` while the request has none
    pub fn get_shipment_for_request(&self, request_id: RequestId) -> Result<Option<Shipment>> {
        let conn = self.db.connection()?;
        if !request_exists(&conn, request_id)? {
            return Err(not_found("Request", request_id));
        }
        load_shipment_for_request(&conn, request_id)
    }

    /// Shipments ordered by creation time, newest first
    pub fn list_shipments(&self, filter: &ShipmentFilter) -> Result<Vec<ShipmentListItem>> {
        let mut conditions = SqlFilter::default();

        if let Some(status) = filter.status {
            conditions.push("s.status = ?", status.code());
        }
        if let Some(document_type) = filter.document_type {
            conditions.push("s.document_type = ?", document_type.code());
        }

        let sql = format!(
            "SELECT {}, r.request_number FROM shipments s
             JOIN requests r ON r.id = s.request_id{}
             ORDER BY s.created_at DESC, s.id DESC{}",
            SHIPMENT_COLUMNS,
            conditions.where_sql(),
            page_sql(filter.page)
        );

        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(conditions.params()), |row| {
                Ok(ShipmentListItem {
                    shipment: shipment_from_row(row)?,
                    request_number: row.get(SHIPMENT_COLUMN_COUNT)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    pub fn delete_shipment(&self, id: ShipmentId) -> Result<()> {
        let conn = self.db.connection()?;
        let changed = conn.execute("DELETE FROM shipments WHERE id = ?1", params![id.value()])?;

        if changed == 0 {
            return Err(not_found("Shipment", id));
        }

        log::warn!("Deleted shipment {}", id);
        Ok(())
    }
}

fn already_has_shipment(request_id: RequestId) -> LogisticsError {
    LogisticsError::AlreadyExists(format!("Request {} already has a shipment", request_id))
}

pub(crate) fn load_shipment(conn: &Connection, id: ShipmentId) -> Result<Shipment> {
    let sql = format!("SELECT {} FROM shipments s WHERE s.id = ?1", SHIPMENT_COLUMNS);
    conn.query_row(&sql, params![id.value()], shipment_from_row)
        .optional()?
        .ok_or_else(|| not_found("Shipment", id))
}

pub(crate) fn load_shipment_for_request(
    conn: &Connection,
    request_id: RequestId,
) -> Result<Option<Shipment>> {
    let sql = format!(
        "SELECT {} FROM shipments s WHERE s.request_id = ?1",
        SHIPMENT_COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![request_id.value()], shipment_from_row)
        .optional()?)
}
