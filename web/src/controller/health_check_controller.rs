use crate::controller::ApiResponse;
use axum::response::IntoResponse;
use axum::Json;

/// GET liveness of the API router
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::message("healthy"))
}
