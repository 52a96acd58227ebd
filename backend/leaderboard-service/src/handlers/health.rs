use actix_web::{get, HttpResponse};

/// GET /health - liveness probe
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "leaderboard-service",
    }))
}
