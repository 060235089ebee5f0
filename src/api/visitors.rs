//! Visitor check-in / check-out endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::visitor::{MessageResponse, RegisterVisitor, RegisteredVisitor, SelfExitRequest, Visitor},
};

/// Register an arriving visitor
#[utoipa::path(
    post,
    path = "/visitors",
    tag = "visitors",
    request_body = RegisterVisitor,
    responses(
        (status = 201, description = "Visitor registered", body = RegisteredVisitor),
        (status = 400, description = "Required fields missing or invalid", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to register visitor", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_visitor(
    State(state): State<crate::AppState>,
    payload: Result<Json<RegisterVisitor>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisteredVisitor>)> {
    let Json(request) = payload?;
    let registered = state.services.visitors.register(request).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// List visitors currently on the premises
#[utoipa::path(
    get,
    path = "/visitors",
    tag = "visitors",
    responses(
        (status = 200, description = "Active visitors, most recent first", body = Vec<Visitor>)
    )
)]
pub async fn list_active_visitors(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Visitor>>> {
    let visitors = state.services.visitors.list_active().await?;
    Ok(Json(visitors))
}

/// Mark a visitor as exited (admin)
#[utoipa::path(
    put,
    path = "/visitors/{id}/exit",
    tag = "visitors",
    params(("id" = String, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Visitor exited", body = MessageResponse),
        (status = 404, description = "No active visitor with this ID", body = crate::error::ErrorResponse)
    )
)]
pub async fn admin_exit_visitor(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.visitors.admin_exit(&id).await?;
    Ok(Json(MessageResponse::new("Visitor exited successfully")))
}

/// Self-checkout with mobile number and entry code
#[utoipa::path(
    post,
    path = "/visitors/exit",
    tag = "visitors",
    request_body = SelfExitRequest,
    responses(
        (status = 200, description = "Visitor exited", body = MessageResponse),
        (status = 400, description = "Mobile number or entry code missing", body = crate::error::ErrorResponse),
        (status = 404, description = "No active visitor matches", body = crate::error::ErrorResponse)
    )
)]
pub async fn self_exit_visitor(
    State(state): State<crate::AppState>,
    payload: Result<Json<SelfExitRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(request) = payload?;
    state.services.visitors.self_exit(request).await?;
    Ok(Json(MessageResponse::new("Visitor exited successfully")))
}
