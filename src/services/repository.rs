//! MongoDB-backed stores.

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

use crate::models::{StockItem, Transaction, User};
use crate::services::stores::{StockLedger, TransactionStore, UserStore};

#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    /// Unique index on `username`; a duplicate registration that slips past
    /// the handler's existence check still fails here.
    pub async fn init_indexes(&self) -> Result<()> {
        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .name("unique_username_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.collection.create_indexes([username_index], None).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, user: User) -> Result<()> {
        self.collection.insert_one(user, None).await?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username }, None)
            .await?;
        Ok(user)
    }
}

#[derive(Clone)]
pub struct StockRepository {
    collection: Collection<StockItem>,
}

impl StockRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("stock"),
        }
    }

    pub async fn init_indexes(&self) -> Result<()> {
        let product_index = IndexModel::builder()
            .keys(doc! { "product_name": 1 })
            .options(
                IndexOptions::builder()
                    .name("unique_product_name_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.collection.create_indexes([product_index], None).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StockLedger for StockRepository {
    async fn get(&self, product_name: &str) -> Result<Option<StockItem>> {
        let item = self
            .collection
            .find_one(doc! { "product_name": product_name }, None)
            .await?;
        Ok(item)
    }

    async fn add(&self, item: StockItem) -> Result<()> {
        self.collection.insert_one(item, None).await?;
        Ok(())
    }

    async fn decrement(&self, product_name: &str, amount: i64) -> Result<Option<i64>> {
        // Server-side guard: the filter only matches while qty >= amount, so
        // the read-check-write race of a naive update cannot overdraw stock.
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "product_name": product_name, "qty": { "$gte": amount } },
                doc! { "$inc": { "qty": -amount } },
                options,
            )
            .await?;

        Ok(updated.map(|item| item.qty))
    }

    async fn list_all(&self) -> Result<Vec<StockItem>> {
        let cursor = self.collection.find(None, None).await?;
        let items: Vec<StockItem> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn distinct_names(&self) -> Result<Vec<String>> {
        let values = self.collection.distinct("product_name", None, None).await?;
        Ok(values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect())
    }
}

#[derive(Clone)]
pub struct TransactionRepository {
    collection: Collection<Transaction>,
}

impl TransactionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("transactions"),
        }
    }

    pub async fn init_indexes(&self) -> Result<()> {
        let time_index = IndexModel::builder()
            .keys(doc! { "transaction_time": 1 })
            .options(
                IndexOptions::builder()
                    .name("transaction_time_idx".to_string())
                    .build(),
            )
            .build();

        self.collection.create_indexes([time_index], None).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransactionStore for TransactionRepository {
    async fn insert(&self, transaction: Transaction) -> Result<()> {
        self.collection.insert_one(transaction, None).await?;
        Ok(())
    }

    async fn find_in_window(&self, start: DateTime, end: DateTime) -> Result<Vec<Transaction>> {
        let filter = doc! {
            "transaction_time": { "$gte": start, "$lt": end }
        };
        let cursor = self.collection.find(filter, None).await?;
        let transactions: Vec<Transaction> = cursor.try_collect().await?;
        Ok(transactions)
    }
}
