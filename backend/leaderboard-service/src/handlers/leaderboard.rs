/// Leaderboard API Handlers
///
/// HTTP endpoints for rank-range and neighbor queries
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::metrics::LEADERBOARD_QUERIES_TOTAL;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NeighborsQuery {
    #[serde(default)]
    pub high: i64,
    #[serde(default)]
    pub low: i64,
}

/// GET /leaderboard?start&end
///
/// Rows ranked in `[start, end]`. Non-positive or omitted bounds make the
/// result empty; absence is not an error.
#[get("")]
pub async fn get_leaderboard(
    query: web::Query<RangeQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    LEADERBOARD_QUERIES_TOTAL.with_label_values(&["range"]).inc();
    let rows = state.engine.range(query.start, query.end).await;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /leaderboard/{customer_id}?high&low
///
/// The participant's row plus up to `high` higher-ranked and `low`
/// lower-ranked neighbors. Unknown participants yield an empty list.
#[get("/{customer_id}")]
pub async fn get_neighbors(
    path: web::Path<i64>,
    query: web::Query<NeighborsQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    LEADERBOARD_QUERIES_TOTAL
        .with_label_values(&["neighbors"])
        .inc();
    let customer_id = path.into_inner();
    let rows = state
        .engine
        .neighbors(customer_id, query.high, query.low)
        .await;
    Ok(HttpResponse::Ok().json(rows))
}
