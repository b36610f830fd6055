use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
    database: &'static str,
    classifier: &'static str,
    ocr: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db() {
        Some(db) => {
            if db.ping().await {
                "up"
            } else {
                "down"
            }
        }
        None => "not_configured",
    };

    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.uptime_seconds(),
        database,
        classifier: if state.llm().is_available() {
            "configured"
        } else {
            "not_configured"
        },
        ocr: if state.ocr().is_available() {
            "configured"
        } else {
            "not_configured"
        },
    })
}
