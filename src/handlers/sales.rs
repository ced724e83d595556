//! Sales reporting, admin only.

use axum::extract::{Query, State};
use axum::Json;

use crate::dtos::{SalesQuery, SalesResponse, TransactionResponse};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::Role;
use crate::AppState;

/// GET /sales?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD
pub async fn sales_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesResponse>, AppError> {
    user.require_role(&[Role::Admin])?;

    let report = state
        .sales
        .report(query.start_date.as_deref(), query.end_date.as_deref())
        .await?;

    Ok(Json(SalesResponse {
        sales: report
            .sales
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
        total_earnings: report.total_earnings,
    }))
}
