//! Request ledger: transportation requests and their per-client numbering
//!
//! Every client has its own dense sequence of request numbers starting at 1.
//! The next number is one past the client's highest existing number. It is
//! read inside the same `BEGIN IMMEDIATE` transaction that inserts the
//! request, so two operators saving a request for the same client at once
//! still get distinct numbers.

use crate::error::{LogisticsError, Result};
use crate::registry::client_exists;
use crate::storage::{
    decimal_text, is_unique_violation, like_pattern, not_found, page_sql, request_from_row,
    Database, Pagination, SqlFilter, REQUEST_COLUMNS,
};
use crate::validation::{validate_request, Validator};
use chrono::{DateTime, Utc};
use logistics_types::{ClientId, NewRequest, Request, RequestFields, RequestId, TransportType};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};

/// Search and filter options of the request list view
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub client_id: Option<ClientId>,
    pub transport_type: Option<TransportType>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Matched against client name, consignor and shipment tracking number
    pub search: Option<String>,
    pub page: Option<Pagination>,
}

impl RequestFilter {
    pub fn for_client(client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }
}

pub struct RequestLedger {
    db: Database,
}

impl RequestLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validate, number and persist a new request
    ///
    /// A pre-assigned `request_number` is kept as long as it is free for the
    /// client; otherwise the next number of the client's sequence is used.
    pub fn create_request(&self, new_request: NewRequest) -> Result<Request> {
        validate_request(&new_request.fields)?;
        Validator::new()
            .positive("request number", new_request.request_number)
            .finish()?;

        let NewRequest {
            client_id,
            request_number,
            fields,
        } = new_request;

        let mut conn = self.db.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !client_exists(&tx, client_id)? {
            return Err(not_found("Client", client_id));
        }

        let number = match request_number {
            Some(number) => {
                if request_number_taken(&tx, client_id, number)? {
                    return Err(LogisticsError::AlreadyExists(format!(
                        "Request number {} is already used by client {}",
                        number, client_id
                    )));
                }
                number
            }
            None => next_request_number(&tx, client_id)?,
        };

        let now = Utc::now();
        let inserted = tx.execute(
            "INSERT INTO requests (
                client_id, request_number, request_date, shipment_number,
                transport_type, transport_at_border, consignor, consignee, country_of_origin,
                gross_weight, volume, declared_value, currency, insurance_required,
                special_notes, manager, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?3, ?3)",
            params![
                client_id.value(),
                number,
                now,
                fields.shipment_number,
                fields.transport_type.code(),
                fields.transport_at_border.map(|t| t.code()),
                fields.consignor.trim(),
                fields.consignee,
                fields.country_of_origin.trim(),
                decimal_text(fields.gross_weight),
                decimal_text(fields.volume),
                decimal_text(fields.declared_value),
                fields.currency.code(),
                fields.insurance_required,
                fields.special_notes,
                fields.manager,
            ],
        );

        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                return Err(LogisticsError::AlreadyExists(format!(
                    "Request number {} is already used by client {}",
                    number, client_id
                )));
            }
            return Err(e.into());
        }

        let id = RequestId::new(tx.last_insert_rowid());
        let request = load_request(&tx, id)?;
        tx.commit()?;

        log::info!(
            "Created request {} for client {} with number {}",
            id,
            client_id,
            number
        );
        Ok(request)
    }

    /// Replace the editable fields. The number and the client never change.
    pub fn update_request(&self, id: RequestId, fields: RequestFields) -> Result<Request> {
        validate_request(&fields)?;

        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE requests SET
                shipment_number = ?2, transport_type = ?3, transport_at_border = ?4,
                consignor = ?5, consignee = ?6, country_of_origin = ?7,
                gross_weight = ?8, volume = ?9, declared_value = ?10, currency = ?11,
                insurance_required = ?12, special_notes = ?13, manager = ?14, updated_at = ?15
            WHERE id = ?1",
            params![
                id.value(),
                fields.shipment_number,
                fields.transport_type.code(),
                fields.transport_at_border.map(|t| t.code()),
                fields.consignor.trim(),
                fields.consignee,
                fields.country_of_origin.trim(),
                decimal_text(fields.gross_weight),
                decimal_text(fields.volume),
                decimal_text(fields.declared_value),
                fields.currency.code(),
                fields.insurance_required,
                fields.special_notes,
                fields.manager,
                Utc::now(),
            ],
        )?;

        if changed == 0 {
            return Err(not_found("Request", id));
        }

        log::info!("Updated request {}", id);
        load_request(&conn, id)
    }

    pub fn get_request(&self, id: RequestId) -> Result<Request> {
        let conn = self.db.connection()?;
        load_request(&conn, id)
    }

    /// Requests ordered by request date, newest first
    pub fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        let mut conditions = SqlFilter::default();

        if let Some(client_id) = filter.client_id {
            conditions.push("r.client_id = ?", client_id.value());
        }
        if let Some(transport_type) = filter.transport_type {
            conditions.push("r.transport_type = ?", transport_type.code());
        }
        if let Some(from) = filter.date_from {
            conditions.push("r.request_date >= ?", from);
        }
        if let Some(to) = filter.date_to {
            conditions.push("r.request_date < ?", to);
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            conditions.push_repeated(
                "(c.name LIKE ? ESCAPE '\\' OR r.consignor LIKE ? ESCAPE '\\' \
                 OR IFNULL(s.tracking_number, '') LIKE ? ESCAPE '\\')",
                like_pattern(term),
            );
        }

        let sql = format!(
            "SELECT {} FROM requests r
             JOIN clients c ON c.id = r.client_id
             LEFT JOIN shipments s ON s.request_id = r.id{}
             ORDER BY r.request_date DESC, r.id DESC{}",
            REQUEST_COLUMNS,
            conditions.where_sql(),
            page_sql(filter.page)
        );

        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let requests = stmt
            .query_map(params_from_iter(conditions.params()), request_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(requests)
    }

    /// Reverse lookup: every request of one client
    pub fn requests_for_client(&self, client_id: ClientId) -> Result<Vec<Request>> {
        self.list_requests(&RequestFilter::for_client(client_id))
    }

    /// Delete a request together with its shipment
    pub fn delete_request(&self, id: RequestId) -> Result<()> {
        let conn = self.db.connection()?;
        let changed = conn.execute("DELETE FROM requests WHERE id = ?1", params![id.value()])?;

        if changed == 0 {
            return Err(not_found("Request", id));
        }

        log::warn!("Deleted request {}", id);
        Ok(())
    }
}

pub(crate) fn load_request(conn: &Connection, id: RequestId) -> Result<Request> {
    let sql = format!("SELECT {} FROM requests r WHERE r.id = ?1", REQUEST_COLUMNS);
    conn.query_row(&sql, params![id.value()], request_from_row)
        .optional()?
        .ok_or_else(|| not_found("Request", id))
}

pub(crate) fn request_exists(conn: &Connection, id: RequestId) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM requests WHERE id = ?1)",
        params![id.value()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn request_number_taken(conn: &Connection, client_id: ClientId, number: i64) -> Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM requests WHERE client_id = ?1 AND request_number = ?2)",
        params![client_id.value(), number],
        |row| row.get(0),
    )?;
    Ok(taken)
}

/// One past the highest number the client currently has, 1 for the first
fn next_request_number(conn: &Connection, client_id: ClientId) -> Result<i64> {
    let next: i64 = conn.query_row(
        "SELECT IFNULL(MAX(request_number), 0) + 1 FROM requests WHERE client_id = ?1",
        params![client_id.value()],
        |row| row.get(0),
    )?;
    Ok(next)
}
