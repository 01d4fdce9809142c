// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Layered settings: an optional `config.toml` in the platform config
//! directory, overridden by `FAMBUDG_*` environment variables
//! (`FAMBUDG_DATABASE__MAX_CONNECTIONS=4`, `FAMBUDG_LOG__LEVEL=debug`).

use crate::error::Result;
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Defaults to `fambudg.sqlite` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    #[serde(default = "default_pool_timeout_seconds")]
    pub pool_timeout_seconds: u64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_max_connections() -> usize {
    10
}

fn default_pool_timeout_seconds() -> u64 {
    30
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_max_connections(),
            pool_timeout_seconds: default_pool_timeout_seconds(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(dirs) = crate::db::project_dirs() {
            let file = dirs.config_dir().join("config.toml");
            builder = builder.add_source(File::from(file).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("FAMBUDG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    /// Settings pointing at an explicit database file, everything else default.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseSettings {
                path: Some(path.into()),
                ..DatabaseSettings::default()
            },
            log: LogSettings::default(),
        }
    }
}
