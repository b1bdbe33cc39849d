use rusqlite::Connection;

/// Tables, keys and indexes. Idempotent.
///
/// Clients own requests and requests own their shipment, both with
/// `ON DELETE CASCADE`. `UNIQUE (client_id, request_number)` keeps the
/// per-client numbering dense and collision free.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    inn TEXT NOT NULL DEFAULT '',
    kpp TEXT NOT NULL DEFAULT '',
    ogrn TEXT NOT NULL DEFAULT '',
    legal_address TEXT NOT NULL DEFAULT '',
    company_phone TEXT NOT NULL DEFAULT '',
    company_email TEXT NOT NULL DEFAULT '',
    director TEXT NOT NULL DEFAULT '',
    bank_name TEXT NOT NULL DEFAULT '',
    bik TEXT NOT NULL DEFAULT '',
    correspondent_account TEXT NOT NULL DEFAULT '',
    payment_account TEXT NOT NULL DEFAULT '',
    contact_person1 TEXT NOT NULL DEFAULT '',
    contact_phone1 TEXT NOT NULL DEFAULT '',
    contact_email1 TEXT NOT NULL DEFAULT '',
    contact_person2 TEXT NOT NULL DEFAULT '',
    contact_phone2 TEXT NOT NULL DEFAULT '',
    contact_email2 TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(name);
CREATE INDEX IF NOT EXISTS idx_clients_created_at ON clients(created_at);

CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
    request_number INTEGER NOT NULL,
    request_date TEXT NOT NULL,
    shipment_number INTEGER,
    transport_type TEXT NOT NULL,
    transport_at_border TEXT,
    consignor TEXT NOT NULL,
    consignee TEXT NOT NULL DEFAULT '',
    country_of_origin TEXT NOT NULL,
    gross_weight TEXT,
    volume TEXT,
    declared_value TEXT,
    currency TEXT NOT NULL DEFAULT 'RUB',
    insurance_required INTEGER NOT NULL DEFAULT 0,
    special_notes TEXT NOT NULL DEFAULT '',
    manager TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (client_id, request_number)
);
CREATE INDEX IF NOT EXISTS idx_requests_request_date ON requests(request_date);
CREATE INDEX IF NOT EXISTS idx_requests_transport_type ON requests(transport_type);

CREATE TABLE IF NOT EXISTS shipments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id INTEGER NOT NULL UNIQUE REFERENCES requests(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'draft',
    etd TEXT,
    eta TEXT,
    actual_departure TEXT,
    actual_arrival TEXT,
    delivery_date TEXT,
    document_type TEXT,
    document_number TEXT NOT NULL DEFAULT '',
    carrier TEXT NOT NULL DEFAULT '',
    tracking_number TEXT NOT NULL DEFAULT '',
    customs_declaration TEXT NOT NULL DEFAULT '',
    comments TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_shipments_status ON shipments(status);
CREATE INDEX IF NOT EXISTS idx_shipments_created_at ON shipments(created_at);
";

pub(super) fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
