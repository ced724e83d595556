//! Storage seams for the service.
//!
//! Components receive these handles at construction instead of reaching for
//! a shared connection, so the MongoDB repositories and the in-process
//! stores are interchangeable.

use anyhow::Result;
use mongodb::bson::DateTime;

use crate::models::{StockItem, Transaction, User};

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails on a duplicate username.
    async fn insert(&self, user: User) -> Result<()>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// The stock ledger: product name to quantity-on-hand and unit price.
#[async_trait::async_trait]
pub trait StockLedger: Send + Sync {
    async fn get(&self, product_name: &str) -> Result<Option<StockItem>>;

    /// Insert a new ledger row. Fails on a duplicate product name.
    async fn add(&self, item: StockItem) -> Result<()>;

    /// Atomically decrement `qty` by `amount`, guarded by `qty >= amount`.
    ///
    /// Returns the post-decrement quantity, or `None` when the guard fails
    /// (unknown product or insufficient stock). The guard lives in the store
    /// so stock can never be driven negative, whatever the callers race on.
    async fn decrement(&self, product_name: &str, amount: i64) -> Result<Option<i64>>;

    async fn list_all(&self) -> Result<Vec<StockItem>>;

    /// Distinct product names, for the public catalog.
    async fn distinct_names(&self) -> Result<Vec<String>>;
}

/// Append-only log of completed sales.
#[async_trait::async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, transaction: Transaction) -> Result<()>;

    /// Transactions with `transaction_time` in the half-open window
    /// `[start, end)`.
    async fn find_in_window(&self, start: DateTime, end: DateTime) -> Result<Vec<Transaction>>;
}
