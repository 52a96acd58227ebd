/// Prometheus metrics for the leaderboard service
use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, CounterVec, Encoder, Gauge, TextEncoder,
};

lazy_static! {
    /// Score delta updates (labels: outcome=created|updated|evicted|unchanged)
    pub static ref SCORE_UPDATES_TOTAL: CounterVec = register_counter_vec!(
        "leaderboard_score_updates_total",
        "Total number of score delta updates applied",
        &["outcome"]
    )
    .unwrap();

    /// Read queries (labels: endpoint=range|neighbors)
    pub static ref LEADERBOARD_QUERIES_TOTAL: CounterVec = register_counter_vec!(
        "leaderboard_queries_total",
        "Total number of leaderboard read queries",
        &["endpoint"]
    )
    .unwrap();

    /// Participants currently holding a positive score
    pub static ref RANKED_PARTICIPANTS: Gauge = register_gauge!(
        "leaderboard_ranked_participants",
        "Number of participants currently ranked"
    )
    .unwrap();
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
