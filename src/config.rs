// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::summary::{validate_top_n, DEFAULT_TOP_N};

#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit database file; `None` means the platform data dir.
    pub db_path: Option<PathBuf>,
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub default_top_n: i64,
    pub log_json: bool,
    /// Problems found while reading the environment, logged once tracing is up.
    pub warnings: Vec<String>,
}

impl Config {
    /// Reads `TALLYBOOK_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let db_path = lookup("TALLYBOOK_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let listen = lookup("TALLYBOOK_LISTEN_ADDR").unwrap_or_else(|| "127.0.0.1:8080".into());
        let listen_addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("Invalid TALLYBOOK_LISTEN_ADDR '{}'", listen))?;
        let cors_allow = lookup("TALLYBOOK_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let default_top_n = match lookup("TALLYBOOK_DEFAULT_TOP_N") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(n) if validate_top_n(n).is_ok() => n,
                _ => {
                    warnings.push(format!(
                        "ignoring invalid TALLYBOOK_DEFAULT_TOP_N '{}', using {}",
                        raw, DEFAULT_TOP_N
                    ));
                    DEFAULT_TOP_N
                }
            },
            None => DEFAULT_TOP_N,
        };
        let log_json = lookup("TALLYBOOK_LOG_JSON")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(Self {
            db_path,
            listen_addr,
            cors_allow,
            default_top_n,
            log_json,
            warnings,
        })
    }

    /// The configured database file, or the default one in the platform data dir.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => crate::db::db_path(),
        }
    }
}
