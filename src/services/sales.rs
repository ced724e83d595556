//! Sales reporting over the transaction log.

use chrono::{Days, NaiveDate, NaiveTime};
use mongodb::bson::DateTime;
use std::sync::Arc;
use thiserror::Error;

use crate::models::Transaction;
use crate::services::stores::TransactionStore;

#[derive(Debug, Error)]
pub enum SalesError {
    #[error("Start date and end date are required")]
    MissingDateRange,

    #[error("Dates must be in YYYY-MM-DD format")]
    InvalidDateFormat,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct SalesReport {
    pub sales: Vec<Transaction>,
    pub total_earnings: f64,
}

#[derive(Clone)]
pub struct SalesReporter {
    transactions: Arc<dyn TransactionStore>,
}

impl SalesReporter {
    pub fn new(transactions: Arc<dyn TransactionStore>) -> Self {
        Self { transactions }
    }

    /// Sum all transactions between `start_date` and `end_date` (both
    /// `YYYY-MM-DD`, both required, end day fully included).
    pub async fn report(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<SalesReport, SalesError> {
        let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
            return Err(SalesError::MissingDateRange);
        };

        let (start, end) = sales_window(start_date, end_date)?;
        let sales = self.transactions.find_in_window(start, end).await?;
        let total_earnings = sales.iter().map(|t| t.total_amount as f64).sum();

        Ok(SalesReport {
            sales,
            total_earnings,
        })
    }
}

/// Half-open UTC window `[start 00:00, end + 1 day 00:00)`: inclusive of the
/// start day, inclusive of the whole end calendar day.
pub fn sales_window(start_date: &str, end_date: &str) -> Result<(DateTime, DateTime), SalesError> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?
        .checked_add_days(Days::new(1))
        .ok_or(SalesError::InvalidDateFormat)?;

    Ok((midnight_utc(start), midnight_utc(end)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, SalesError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| SalesError::InvalidDateFormat)
}

fn midnight_utc(date: NaiveDate) -> DateTime {
    DateTime::from_chrono(date.and_time(NaiveTime::MIN).and_utc())
}
