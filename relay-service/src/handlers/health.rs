use crate::models::PingResponse;
use axum::Json;

/// Liveness probe used by the chat shell.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}
