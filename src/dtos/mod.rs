use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{BillItem, Role, StockItem, Transaction, User};

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Message body for simple operations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Stock
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct AddStockRequest {
    #[validate(length(min = 1, message = "product_name must not be empty"))]
    pub product_name: String,
    #[validate(range(min = 0, message = "qty must be non-negative"))]
    pub qty: i64,
    #[validate(range(min = 0, message = "mrp must be non-negative"))]
    pub mrp: i64,
}

impl From<AddStockRequest> for StockItem {
    fn from(req: AddStockRequest) -> Self {
        StockItem {
            product_name: req.product_name,
            qty: req.qty,
            mrp: req.mrp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MedicinesResponse {
    pub medicines: Vec<String>,
}

// ============================================================================
// Billing
// ============================================================================

/// Fields arrive optional so absence surfaces as the billing engine's 400
/// rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct BillingRequest {
    pub patient_id: Option<String>,
    pub medicines: Option<Vec<BillLineRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct BillLineRequest {
    pub medicine_name: Option<String>,
    pub qty_sold: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct BillingResponse {
    pub message: String,
    pub total_amount: i64,
    pub bill_items: Vec<BillItem>,
}

// ============================================================================
// Sales
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub patient_id: String,
    pub medicines: Vec<BillItem>,
    pub total_amount: i64,
    pub transaction_time: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            patient_id: transaction.patient_id,
            medicines: transaction.medicines,
            total_amount: transaction.total_amount,
            transaction_time: transaction.transaction_time.to_chrono().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SalesResponse {
    pub sales: Vec<TransactionResponse>,
    pub total_earnings: f64,
}
