//! Column lists and row mapping
//!
//! Queries alias tables as `clients c`, `requests r`, `shipments s` and map
//! rows by position, so the column lists and the mappers must stay in step.

use logistics_types::{
    BankDetails, Client, ClientFields, ClientId, ContactPerson, ParseChoiceError, Request,
    RequestFields, RequestId, Shipment, ShipmentFields, ShipmentId,
};
use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) const CLIENT_COLUMNS: &str = "c.id, c.name, c.inn, c.kpp, c.ogrn, c.legal_address, \
     c.company_phone, c.company_email, c.director, c.bank_name, c.bik, \
     c.correspondent_account, c.payment_account, c.contact_person1, c.contact_phone1, \
     c.contact_email1, c.contact_person2, c.contact_phone2, c.contact_email2, \
     c.is_active, c.created_at, c.updated_at";

pub(crate) const REQUEST_COLUMNS: &str = "r.id, r.client_id, r.request_number, r.request_date, \
     r.shipment_number, r.transport_type, r.transport_at_border, r.consignor, r.consignee, \
     r.country_of_origin, r.gross_weight, r.volume, r.declared_value, r.currency, \
     r.insurance_required, r.special_notes, r.manager, r.created_at, r.updated_at";

pub(crate) const SHIPMENT_COLUMNS: &str = "s.id, s.request_id, s.status, s.etd, s.eta, \
     s.actual_departure, s.actual_arrival, s.delivery_date, s.document_type, \
     s.document_number, s.carrier, s.tracking_number, s.customs_declaration, s.comments, \
     s.created_at, s.updated_at";

/// Number of columns in `SHIPMENT_COLUMNS`
pub(crate) const SHIPMENT_COLUMN_COUNT: usize = 16;

pub(crate) fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: ClientId::new(row.get(0)?),
        fields: ClientFields {
            name: row.get(1)?,
            inn: row.get(2)?,
            kpp: row.get(3)?,
            ogrn: row.get(4)?,
            legal_address: row.get(5)?,
            company_phone: row.get(6)?,
            company_email: row.get(7)?,
            director: row.get(8)?,
            bank: BankDetails {
                bank_name: row.get(9)?,
                bik: row.get(10)?,
                correspondent_account: row.get(11)?,
                payment_account: row.get(12)?,
            },
            primary_contact: ContactPerson {
                name: row.get(13)?,
                phone: row.get(14)?,
                email: row.get(15)?,
            },
            secondary_contact: ContactPerson {
                name: row.get(16)?,
                phone: row.get(17)?,
                email: row.get(18)?,
            },
            is_active: row.get(19)?,
        },
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

pub(crate) fn request_from_row(row: &Row<'_>) -> rusqlite::Result<Request> {
    Ok(Request {
        id: RequestId::new(row.get(0)?),
        client_id: ClientId::new(row.get(1)?),
        request_number: row.get(2)?,
        request_date: row.get(3)?,
        fields: RequestFields {
            shipment_number: row.get(4)?,
            transport_type: choice(row, 5)?,
            transport_at_border: optional_choice(row, 6)?,
            consignor: row.get(7)?,
            consignee: row.get(8)?,
            country_of_origin: row.get(9)?,
            gross_weight: decimal(row, 10)?,
            volume: decimal(row, 11)?,
            declared_value: decimal(row, 12)?,
            currency: choice(row, 13)?,
            insurance_required: row.get(14)?,
            special_notes: row.get(15)?,
            manager: row.get(16)?,
        },
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

pub(crate) fn shipment_from_row(row: &Row<'_>) -> rusqlite::Result<Shipment> {
    Ok(Shipment {
        id: ShipmentId::new(row.get(0)?),
        request_id: RequestId::new(row.get(1)?),
        fields: ShipmentFields {
            status: choice(row, 2)?,
            etd: row.get(3)?,
            eta: row.get(4)?,
            actual_departure: row.get(5)?,
            actual_arrival: row.get(6)?,
            delivery_date: row.get(7)?,
            document_type: optional_choice(row, 8)?,
            document_number: row.get(9)?,
            carrier: row.get(10)?,
            tracking_number: row.get(11)?,
            customs_declaration: row.get(12)?,
            comments: row.get(13)?,
        },
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn choice<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseChoiceError>,
{
    let code: String = row.get(idx)?;
    code.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_choice<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = ParseChoiceError>,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(code) if !code.is_empty() => code
            .parse()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        _ => Ok(None),
    }
}

/// Decimals are stored as text to keep their exact scale
fn decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => Decimal::from_str(&text)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

pub(crate) fn decimal_text(value: Option<Decimal>) -> Option<String> {
    value.map(|v| v.to_string())
}
