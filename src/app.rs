// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{self, Pool, PooledConnection};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::settings::Settings;
use std::path::Path;

/// Everything a command needs: the pool and the ledger built on it.
#[derive(Clone)]
pub struct App {
    pool: Pool,
    ledger: Ledger,
}

impl App {
    pub fn open(settings: &Settings) -> Result<Self> {
        let path = match &settings.database.path {
            Some(p) => p.clone(),
            None => db::db_path()?,
        };
        Self::open_at(&path, settings)
    }

    pub fn open_at(path: &Path, settings: &Settings) -> Result<Self> {
        let pool = Pool::open(path, &settings.database)?;
        Ok(Self {
            ledger: Ledger::new(pool.clone()),
            pool,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// A connection for plain reads and single-statement writes.
    pub fn conn(&self) -> Result<PooledConnection> {
        self.pool.get()
    }
}
