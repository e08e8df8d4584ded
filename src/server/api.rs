// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::commands::{budgets, categories};
use crate::db::load_window_records;
use crate::models::{Budget, Category};
use crate::summary::{compute_summary, validate_top_n, SummaryResponse, MAX_TOP_N, MIN_TOP_N};

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "UP" })
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    #[serde(rename = "topN")]
    top_n: Option<String>,
}

fn parse_top_n(raw: Option<&str>, default: i64) -> ApiResult<i64> {
    let top_n = match raw.map(str::trim) {
        None | Some("") => default,
        Some(s) => s.parse::<i64>().map_err(|_| {
            ApiError::BadRequest(format!(
                "topN must be between {} and {}",
                MIN_TOP_N, MAX_TOP_N
            ))
        })?,
    };
    validate_top_n(top_n)?;
    Ok(top_n)
}

async fn dashboard_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<SummaryResponse>> {
    let top_n = parse_top_n(params.top_n.as_deref(), state.default_top_n)?;
    let today = chrono::Local::now().date_naive();
    let records = {
        let conn = state.conn()?;
        load_window_records(&conn, today)?
    };
    debug!(%today, top_n, records = records.len(), "serving dashboard summary");
    Ok(Json(compute_summary(&records, today, top_n)?))
}

async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    let conn = state.conn()?;
    Ok(Json(categories::list_categories(&conn)?))
}

async fn list_budgets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Budget>>> {
    let conn = state.conn()?;
    Ok(Json(budgets::list_budgets(&conn)?))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/dashboard/summary", get(dashboard_summary))
        .route("/api/categories", get(list_categories))
        .route("/api/budgets", get(list_budgets))
        .fallback(not_found)
}
