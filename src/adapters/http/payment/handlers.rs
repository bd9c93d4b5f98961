//! HTTP handlers for payment endpoints.

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;

use crate::adapters::http::{ApiError, AppState};
use crate::application::handlers::{GetTransactionQuery, ProcessPaymentCommand};
use crate::domain::foundation::TransactionId;
use crate::domain::payment::PaymentRequest;

/// POST /api/payments
pub async fn process_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ProcessPaymentCommand {
        request,
        deadline: state.deadline(),
    };
    let response = state.process_payment.handle(cmd).await?;
    Ok(Json(response))
}

/// GET /api/payments/transactions/:id
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetTransactionQuery {
        transaction_id: TransactionId::new(id)?,
        deadline: state.deadline(),
    };
    let record = state.get_transaction.handle(query).await?;
    Ok(Json(record))
}
