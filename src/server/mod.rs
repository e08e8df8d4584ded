// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! JSON API over the same SQLite store the CLI uses.

pub mod api;
pub mod error;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::HeaderValue;
use axum::Router;
use rusqlite::Connection;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use error::ApiError;

pub struct AppState {
    conn: Mutex<Connection>,
    pub default_top_n: i64,
}

impl AppState {
    pub fn new(conn: Connection, default_top_n: i64) -> Arc<Self> {
        Arc::new(Self {
            conn: Mutex::new(conn),
            default_top_n,
        })
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.conn
            .lock()
            .map_err(|_| ApiError::Internal("database connection poisoned".into()))
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };
    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    api::routes()
        .layer(cors_layer(&config.cors_allow))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config, conn: Connection) -> anyhow::Result<()> {
    let state = AppState::new(conn, config.default_top_n);
    let router = app_router(state, &config);
    info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
