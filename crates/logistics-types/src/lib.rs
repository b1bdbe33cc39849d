//! Shared record types for the logistics tracker
//!
//! Clients own requests, requests own at most one shipment. Everything the
//! storage layer persists and the report renders is defined here.

pub mod choices;
pub mod records;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use choices::{Currency, DocumentType, ParseChoiceError, ShipmentStatus, TransportType};
pub use records::{
    BankDetails, Client, ClientFields, ContactPerson, NewRequest, Request, RequestFields, Shipment,
    ShipmentFields, DEFAULT_COUNTRY_OF_ORIGIN,
};

/// Strongly typed ClientId (storage row id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(i64);

impl ClientId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed RequestId (storage row id, not the per-client number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(i64);

impl RequestId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ShipmentId
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipmentId(i64);

impl ShipmentId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
