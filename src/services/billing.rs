//! The billing engine.
//!
//! Validates a requested sale against the stock ledger, decrements stock,
//! and persists an immutable transaction record. Validation runs over every
//! line item before any stock is touched, so a failing bill leaves the
//! ledger exactly as it found it.

use mongodb::bson::DateTime;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BillItem, LineItem, Transaction};
use crate::services::stores::{StockLedger, TransactionStore};

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Missing required data: patient_id and medicines are required.")]
    MissingRequestData,

    #[error("Missing required data in medicines: medicine_name and qty_sold are required.")]
    MissingItemData,

    #[error("Invalid quantity sold for {0}. It must be a positive integer.")]
    InvalidQuantity(String),

    #[error("Medicine '{0}' not found in stock.")]
    UnknownMedicine(String),

    #[error("Not enough stock for {0}")]
    InsufficientStock(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct BillingEngine {
    stock: Arc<dyn StockLedger>,
    transactions: Arc<dyn TransactionStore>,
}

impl BillingEngine {
    pub fn new(stock: Arc<dyn StockLedger>, transactions: Arc<dyn TransactionStore>) -> Self {
        Self {
            stock,
            transactions,
        }
    }

    /// Bill `patient_id` for the given line items, in order.
    ///
    /// On success every item's stock has been decremented and the returned
    /// transaction is persisted, with `total_amount` equal to the sum of its
    /// bill amounts. On any error nothing is persisted and, unless a
    /// concurrent writer drained stock between validation and apply, no
    /// stock is mutated.
    pub async fn bill(
        &self,
        patient_id: &str,
        items: &[LineItem],
    ) -> Result<Transaction, BillingError> {
        if patient_id.trim().is_empty() || items.is_empty() {
            return Err(BillingError::MissingRequestData);
        }

        // Validation pass: parse quantities and resolve stock for every
        // item before mutating anything.
        let mut validated = Vec::with_capacity(items.len());
        for item in items {
            let qty = parse_qty(&item.qty_sold)
                .ok_or_else(|| BillingError::InvalidQuantity(item.medicine_name.clone()))?;
            let stock_item = self
                .stock
                .get(&item.medicine_name)
                .await?
                .ok_or_else(|| BillingError::UnknownMedicine(item.medicine_name.clone()))?;
            if stock_item.qty < qty {
                return Err(BillingError::InsufficientStock(item.medicine_name.clone()));
            }
            validated.push((item.medicine_name.clone(), qty, stock_item.mrp));
        }

        // Apply pass: guarded decrements, persisted immediately per item.
        let mut bill_items = Vec::with_capacity(validated.len());
        let mut total_amount = 0i64;
        for (medicine_name, qty_sold, mrp) in validated {
            let qty_remaining = self
                .stock
                .decrement(&medicine_name, qty_sold)
                .await?
                // Stock drained by a concurrent bill since the validation pass.
                .ok_or_else(|| BillingError::InsufficientStock(medicine_name.clone()))?;

            let bill_amount = mrp * qty_sold;
            total_amount += bill_amount;
            bill_items.push(BillItem {
                medicine_name,
                qty_sold,
                qty_remaining,
                mrp,
                bill_amount,
            });
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            medicines: bill_items,
            total_amount,
            transaction_time: DateTime::now(),
        };

        self.transactions.insert(transaction.clone()).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            patient_id = %transaction.patient_id,
            total_amount = transaction.total_amount,
            items = transaction.medicines.len(),
            "Bill generated"
        );

        Ok(transaction)
    }
}

/// Accepts a JSON number or a numeric string; anything else, or a
/// non-positive amount, is invalid.
fn parse_qty(raw: &serde_json::Value) -> Option<i64> {
    let qty = match raw {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (qty > 0).then_some(qty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockItem;
    use crate::services::memory::{MemoryStockLedger, MemoryTransactionStore};
    use serde_json::json;

    async fn engine_with(
        items: &[(&str, i64, i64)],
    ) -> (BillingEngine, Arc<MemoryStockLedger>, Arc<MemoryTransactionStore>) {
        let stock = Arc::new(MemoryStockLedger::default());
        for (name, qty, mrp) in items {
            stock
                .add(StockItem {
                    product_name: name.to_string(),
                    qty: *qty,
                    mrp: *mrp,
                })
                .await
                .unwrap();
        }
        let transactions = Arc::new(MemoryTransactionStore::default());
        let engine = BillingEngine::new(stock.clone(), transactions.clone());
        (engine, stock, transactions)
    }

    async fn persisted_count(transactions: &MemoryTransactionStore) -> usize {
        transactions
            .find_in_window(DateTime::MIN, DateTime::MAX)
            .await
            .unwrap()
            .len()
    }

    fn line(name: &str, qty: serde_json::Value) -> LineItem {
        LineItem {
            medicine_name: name.to_string(),
            qty_sold: qty,
        }
    }

    #[tokio::test]
    async fn bill_decrements_stock_and_totals() {
        let (engine, stock, transactions) = engine_with(&[("Paracetamol", 100, 10)]).await;

        let transaction = engine
            .bill("P1", &[line("Paracetamol", json!(5))])
            .await
            .unwrap();

        assert_eq!(transaction.total_amount, 50);
        assert_eq!(transaction.medicines.len(), 1);
        assert_eq!(transaction.medicines[0].qty_remaining, 95);
        assert_eq!(transaction.medicines[0].bill_amount, 50);

        let remaining = stock.get("Paracetamol").await.unwrap().unwrap();
        assert_eq!(remaining.qty, 95);
        assert_eq!(persisted_count(&transactions).await, 1);
    }

    #[tokio::test]
    async fn total_equals_sum_of_bill_amounts() {
        let (engine, _, _) = engine_with(&[("Aspirin", 50, 7), ("Ibuprofen", 30, 12)]).await;

        let transaction = engine
            .bill(
                "P2",
                &[line("Aspirin", json!(3)), line("Ibuprofen", json!(2))],
            )
            .await
            .unwrap();

        let summed: i64 = transaction.medicines.iter().map(|i| i.bill_amount).sum();
        assert_eq!(transaction.total_amount, summed);
        assert_eq!(transaction.total_amount, 3 * 7 + 2 * 12);
    }

    #[tokio::test]
    async fn quantity_as_numeric_string_is_accepted() {
        let (engine, stock, _) = engine_with(&[("Paracetamol", 100, 10)]).await;

        let transaction = engine
            .bill("P1", &[line("Paracetamol", json!("5"))])
            .await
            .unwrap();

        assert_eq!(transaction.total_amount, 50);
        assert_eq!(stock.get("Paracetamol").await.unwrap().unwrap().qty, 95);
    }

    #[tokio::test]
    async fn overdraw_leaves_stock_unchanged() {
        let (engine, stock, transactions) = engine_with(&[("Paracetamol", 4, 10)]).await;

        let err = engine
            .bill("P1", &[line("Paracetamol", json!(5))])
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::InsufficientStock(name) if name == "Paracetamol"));
        assert_eq!(stock.get("Paracetamol").await.unwrap().unwrap().qty, 4);
        assert_eq!(persisted_count(&transactions).await, 0);
    }

    #[tokio::test]
    async fn non_numeric_quantity_persists_nothing() {
        let (engine, stock, transactions) = engine_with(&[("Paracetamol", 100, 10)]).await;

        let err = engine
            .bill("P1", &[line("Paracetamol", json!("abc"))])
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::InvalidQuantity(_)));
        assert_eq!(stock.get("Paracetamol").await.unwrap().unwrap().qty, 100);
        assert_eq!(persisted_count(&transactions).await, 0);
    }

    #[tokio::test]
    async fn zero_and_negative_quantities_are_invalid() {
        let (engine, stock, _) = engine_with(&[("Paracetamol", 100, 10)]).await;

        for qty in [json!(0), json!(-5), json!("-5")] {
            let err = engine
                .bill("P1", &[line("Paracetamol", qty)])
                .await
                .unwrap_err();
            assert!(matches!(err, BillingError::InvalidQuantity(_)));
        }
        assert_eq!(stock.get("Paracetamol").await.unwrap().unwrap().qty, 100);
    }

    #[tokio::test]
    async fn unknown_second_item_leaves_first_untouched() {
        // Fail-fast policy: validation covers every item before any
        // decrement, so the first item's stock stays put.
        let (engine, stock, transactions) = engine_with(&[("Paracetamol", 100, 10)]).await;

        let err = engine
            .bill(
                "P1",
                &[
                    line("Paracetamol", json!(5)),
                    line("Oseltamivir", json!(1)),
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::UnknownMedicine(name) if name == "Oseltamivir"));
        assert_eq!(stock.get("Paracetamol").await.unwrap().unwrap().qty, 100);
        assert_eq!(persisted_count(&transactions).await, 0);
    }

    #[tokio::test]
    async fn empty_patient_or_items_rejected() {
        let (engine, _, _) = engine_with(&[("Paracetamol", 100, 10)]).await;

        let err = engine
            .bill("", &[line("Paracetamol", json!(5))])
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::MissingRequestData));

        let err = engine.bill("P1", &[]).await.unwrap_err();
        assert!(matches!(err, BillingError::MissingRequestData));
    }

    #[tokio::test]
    async fn repeated_bills_drain_stock_to_exhaustion() {
        let (engine, stock, transactions) = engine_with(&[("Paracetamol", 10, 10)]).await;

        for _ in 0..2 {
            engine
                .bill("P1", &[line("Paracetamol", json!(4))])
                .await
                .unwrap();
        }
        assert_eq!(stock.get("Paracetamol").await.unwrap().unwrap().qty, 2);

        let err = engine
            .bill("P1", &[line("Paracetamol", json!(4))])
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InsufficientStock(_)));
        assert_eq!(persisted_count(&transactions).await, 2);
    }
}
