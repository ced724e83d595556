use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access class controlling which operations a session may perform.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Registered account. The password is stored as an Argon2 PHC string,
/// never in plaintext.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// One row of the stock ledger: product name, quantity on hand, and unit
/// price (MRP). `product_name` is unique within the ledger.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StockItem {
    pub product_name: String,
    pub qty: i64,
    pub mrp: i64,
}

/// One line of a completed sale, embedded in a [`Transaction`].
/// `qty_remaining` is the stock snapshot taken right after the decrement.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BillItem {
    pub medicine_name: String,
    pub qty_sold: i64,
    pub qty_remaining: i64,
    pub mrp: i64,
    pub bill_amount: i64,
}

/// Immutable record of a completed sale. Append-only: never mutated or
/// deleted once persisted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub patient_id: String,
    pub medicines: Vec<BillItem>,
    pub total_amount: i64,
    pub transaction_time: DateTime,
}

/// A requested sale line as submitted by the caller. The quantity is kept
/// raw (JSON number or numeric string are both accepted) and parsed by the
/// billing engine.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub medicine_name: String,
    pub qty_sold: serde_json::Value,
}
