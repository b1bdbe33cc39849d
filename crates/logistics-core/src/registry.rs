//! Client registry: customer companies and their legal, banking and contact details

use crate::error::Result;
use crate::storage::{
    client_from_row, like_pattern, not_found, page_sql, Database, Pagination, SqlFilter,
    CLIENT_COLUMNS,
};
use crate::validation::validate_client;
use chrono::{DateTime, Utc};
use logistics_types::{Client, ClientFields, ClientId};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

/// Search and filter options of the client list view
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Matched against name and INN
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub page: Option<Pagination>,
}

pub struct ClientRegistry {
    db: Database,
}

impl ClientRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create_client(&self, fields: ClientFields) -> Result<Client> {
        validate_client(&fields)?;

        let conn = self.db.connection()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO clients (
                name, inn, kpp, ogrn, legal_address, company_phone, company_email, director,
                bank_name, bik, correspondent_account, payment_account,
                contact_person1, contact_phone1, contact_email1,
                contact_person2, contact_phone2, contact_email2,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?20)",
            params![
                fields.name.trim(),
                fields.inn,
                fields.kpp,
                fields.ogrn,
                fields.legal_address,
                fields.company_phone,
                fields.company_email,
                fields.director,
                fields.bank.bank_name,
                fields.bank.bik,
                fields.bank.correspondent_account,
                fields.bank.payment_account,
                fields.primary_contact.name,
                fields.primary_contact.phone,
                fields.primary_contact.email,
                fields.secondary_contact.name,
                fields.secondary_contact.phone,
                fields.secondary_contact.email,
                fields.is_active,
                now,
            ],
        )?;

        let id = ClientId::new(conn.last_insert_rowid());
        log::info!("Created client {}: {}", id, fields.name.trim());
        load_client(&conn, id)
    }

    pub fn get_client(&self, id: ClientId) -> Result<Client> {
        let conn = self.db.connection()?;
        load_client(&conn, id)
    }

    /// Replace every editable field of the client
    pub fn update_client(&self, id: ClientId, fields: ClientFields) -> Result<Client> {
        validate_client(&fields)?;

        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE clients SET
                name = ?2, inn = ?3, kpp = ?4, ogrn = ?5, legal_address = ?6,
                company_phone = ?7, company_email = ?8, director = ?9,
                bank_name = ?10, bik = ?11, correspondent_account = ?12, payment_account = ?13,
                contact_person1 = ?14, contact_phone1 = ?15, contact_email1 = ?16,
                contact_person2 = ?17, contact_phone2 = ?18, contact_email2 = ?19,
                is_active = ?20, updated_at = ?21
            WHERE id = ?1",
            params![
                id.value(),
                fields.name.trim(),
                fields.inn,
                fields.kpp,
                fields.ogrn,
                fields.legal_address,
                fields.company_phone,
                fields.company_email,
                fields.director,
                fields.bank.bank_name,
                fields.bank.bik,
                fields.bank.correspondent_account,
                fields.bank.payment_account,
                fields.primary_contact.name,
                fields.primary_contact.phone,
                fields.primary_contact.email,
                fields.secondary_contact.name,
                fields.secondary_contact.phone,
                fields.secondary_contact.email,
                fields.is_active,
                Utc::now(),
            ],
        )?;

        if changed == 0 {
            return Err(not_found("Client", id));
        }

        log::info!("Updated client {}", id);
        load_client(&conn, id)
    }

    /// Soft delete: the client stays, with its requests, but is marked inactive
    pub fn deactivate_client(&self, id: ClientId) -> Result<Client> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE clients SET is_active = 0, updated_at = ?2 WHERE id = ?1",
            params![id.value(), Utc::now()],
        )?;

        if changed == 0 {
            return Err(not_found("Client", id));
        }

        log::info!("Deactivated client {}", id);
        load_client(&conn, id)
    }

    /// Hard delete. Requests and their shipments go with the client.
    pub fn delete_client(&self, id: ClientId) -> Result<()> {
        let conn = self.db.connection()?;
        let changed = conn.execute("DELETE FROM clients WHERE id = ?1", params![id.value()])?;

        if changed == 0 {
            return Err(not_found("Client", id));
        }

        log::warn!("Deleted client {} with all of its requests", id);
        Ok(())
    }

    /// Clients ordered by name
    pub fn list_clients(&self, filter: &ClientFilter) -> Result<Vec<Client>> {
        let mut conditions = SqlFilter::default();

        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            conditions.push_repeated(
                "(c.name LIKE ? ESCAPE '\\' OR c.inn LIKE ? ESCAPE '\\')",
                like_pattern(term),
            );
        }
        if let Some(active) = filter.is_active {
            conditions.push("c.is_active = ?", active);
        }
        if let Some(from) = filter.created_from {
            conditions.push("c.created_at >= ?", from);
        }
        if let Some(to) = filter.created_to {
            conditions.push("c.created_at < ?", to);
        }

        let sql = format!(
            "SELECT {} FROM clients c{} ORDER BY c.name ASC, c.id ASC{}",
            CLIENT_COLUMNS,
            conditions.where_sql(),
            page_sql(filter.page)
        );

        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let clients = stmt
            .query_map(params_from_iter(conditions.params()), client_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clients)
    }
}

pub(crate) fn load_client(conn: &Connection, id: ClientId) -> Result<Client> {
    let sql = format!("SELECT {} FROM clients c WHERE c.id = ?1", CLIENT_COLUMNS);
    conn.query_row(&sql, params![id.value()], client_from_row)
        .optional()?
        .ok_or_else(|| not_found("Client", id))
}

pub(crate) fn client_exists(conn: &Connection, id: ClientId) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1)",
        params![id.value()],
        |row| row.get(0),
    )?;
    Ok(exists)
}
