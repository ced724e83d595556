//! In-process stores.
//!
//! Same contracts as the MongoDB repositories, held in process memory.
//! These back the test suite.

use anyhow::{bail, Result};
use dashmap::DashMap;
use mongodb::bson::DateTime;
use std::sync::Mutex;

use crate::models::{StockItem, Transaction, User};
use crate::services::stores::{StockLedger, TransactionStore, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<()> {
        match self.users.entry(user.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                bail!("duplicate username: {}", user.username)
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(user);
                Ok(())
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.get(username).map(|user| user.clone()))
    }
}

#[derive(Default)]
pub struct MemoryStockLedger {
    items: DashMap<String, StockItem>,
}

#[async_trait::async_trait]
impl StockLedger for MemoryStockLedger {
    async fn get(&self, product_name: &str) -> Result<Option<StockItem>> {
        Ok(self.items.get(product_name).map(|item| item.clone()))
    }

    async fn add(&self, item: StockItem) -> Result<()> {
        match self.items.entry(item.product_name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                bail!("duplicate product: {}", item.product_name)
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(item);
                Ok(())
            }
        }
    }

    async fn decrement(&self, product_name: &str, amount: i64) -> Result<Option<i64>> {
        // The entry guard serializes check and write, matching the
        // server-side filter of the MongoDB implementation.
        let Some(mut item) = self.items.get_mut(product_name) else {
            return Ok(None);
        };
        if item.qty < amount {
            return Ok(None);
        }
        item.qty -= amount;
        Ok(Some(item.qty))
    }

    async fn list_all(&self) -> Result<Vec<StockItem>> {
        Ok(self.items.iter().map(|item| item.clone()).collect())
    }

    async fn distinct_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.items.iter().map(|item| item.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    log: Mutex<Vec<Transaction>>,
}

#[async_trait::async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, transaction: Transaction) -> Result<()> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| anyhow::anyhow!("transaction log poisoned"))?;
        log.push(transaction);
        Ok(())
    }

    async fn find_in_window(&self, start: DateTime, end: DateTime) -> Result<Vec<Transaction>> {
        let log = self
            .log
            .lock()
            .map_err(|_| anyhow::anyhow!("transaction log poisoned"))?;
        Ok(log
            .iter()
            .filter(|t| t.transaction_time >= start && t.transaction_time < end)
            .cloned()
            .collect())
    }
}
