/// Customer API Handlers
///
/// HTTP endpoints for score updates and test-data seeding
use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Score;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SeedQuery {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub inserted: u64,
}

/// POST /customer/{customer_id}/score/{delta}
///
/// Applies a score delta and responds with the participant's new score,
/// including non-positive results so clients can observe a drop off the
/// board.
#[post("/{customer_id}/score/{delta}")]
pub async fn update_score(
    path: web::Path<(i64, Score)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (customer_id, delta) = path.into_inner();
    let new_score = state.engine.apply_score_delta(customer_id, delta).await;
    Ok(HttpResponse::Ok().json(new_score))
}

/// POST /customer/add-test-data?count=N
///
/// Bulk-inserts random participants for load testing.
#[post("/add-test-data")]
pub async fn add_test_data(
    query: web::Query<SeedQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if query.count < 1 {
        return Err(AppError::Validation(
            "count must be a positive integer".to_string(),
        ));
    }

    let inserted = state.engine.seed_test_data(query.count as u64).await;
    Ok(HttpResponse::Ok().json(SeedResponse { inserted }))
}
