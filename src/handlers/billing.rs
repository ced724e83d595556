//! Billing endpoint: structural checks here, domain validation in the engine.

use axum::{extract::State, Json};

use crate::dtos::{BillingRequest, BillingResponse};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{LineItem, Role};
use crate::services::billing::BillingError;
use crate::AppState;

/// POST /billing
pub async fn create_bill(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<BillingRequest>,
) -> Result<Json<BillingResponse>, AppError> {
    user.require_role(&[Role::Admin, Role::User])?;

    let patient_id = req.patient_id.unwrap_or_default();
    let lines = req.medicines.unwrap_or_default();
    if patient_id.trim().is_empty() || lines.is_empty() {
        return Err(BillingError::MissingRequestData.into());
    }

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let medicine_name = line.medicine_name.filter(|name| !name.trim().is_empty());
        let (Some(medicine_name), Some(qty_sold)) = (medicine_name, line.qty_sold) else {
            return Err(BillingError::MissingItemData.into());
        };
        items.push(LineItem {
            medicine_name,
            qty_sold,
        });
    }

    tracing::info!(
        username = %user.username,
        patient_id = %patient_id,
        items = items.len(),
        "Billing request"
    );

    let transaction = state.billing.bill(&patient_id, &items).await?;

    Ok(Json(BillingResponse {
        message: "Bill generated successfully!".to_string(),
        total_amount: transaction.total_amount,
        bill_items: transaction.medicines,
    }))
}
