//! HTTP handlers for paywall endpoints.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use super::dto::{CheckAccessRequest, EnforceRequest};
use crate::adapters::http::{ApiError, AppState};
use crate::application::handlers::{CheckAccessQuery, EnforcePaywallCommand};

/// POST /api/paywall/check
pub async fn check_access(
    State(state): State<AppState>,
    Json(request): Json<CheckAccessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (subject, content_id, plan_id) = request.parse()?;
    let query = CheckAccessQuery {
        subject,
        content_id,
        plan_id,
        deadline: state.deadline(),
    };
    let verdict = state.paywall.check_access(query).await?;
    Ok(Json(verdict))
}

/// POST /api/paywall/enforce
pub async fn enforce(
    State(state): State<AppState>,
    Json(request): Json<EnforceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (subject, content_id, action) = request.parse()?;
    let cmd = EnforcePaywallCommand {
        subject,
        content_id,
        action,
        deadline: state.deadline(),
    };
    let verdict = state.paywall.enforce(cmd).await?;
    Ok(Json(verdict))
}
