// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::settings::DatabaseSettings;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Fambudg", "fambudg"));

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
}

pub fn db_path() -> Result<PathBuf> {
    let proj = project_dirs().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine platform-specific data dir",
        )
    })?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("fambudg.sqlite"))
}

/// A fixed set of SQLite connections shared by every caller.
///
/// All connections are opened up front. `get` blocks until one is idle or the
/// configured timeout elapses; the guard it returns puts the connection back
/// when dropped, whatever happened while it was checked out.
#[derive(Clone)]
pub struct Pool {
    idle_tx: Sender<Connection>,
    idle_rx: Receiver<Connection>,
    timeout: Duration,
    size: usize,
}

impl Pool {
    pub fn open(path: &Path, settings: &DatabaseSettings) -> Result<Self> {
        let size = settings.max_connections.max(1);
        let busy = Duration::from_millis(settings.busy_timeout_ms);
        let (idle_tx, idle_rx) = bounded(size);

        for i in 0..size {
            let mut conn = Connection::open(path)?;
            configure(&conn, busy)?;
            if i == 0 {
                init_schema(&mut conn)?;
            }
            // Capacity equals `size`, so this never finds the channel full.
            let _ = idle_tx.try_send(conn);
        }
        info!(path = %path.display(), size, "database pool ready");

        Ok(Self {
            idle_tx,
            idle_rx,
            timeout: Duration::from_secs(settings.pool_timeout_seconds),
            size,
        })
    }

    pub fn get(&self) -> Result<PooledConnection> {
        let conn = self.idle_rx.recv_timeout(self.timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected => Error::PoolTimeout,
        })?;
        debug!(idle = self.idle_rx.len(), "connection checked out");
        Ok(PooledConnection {
            conn: Some(conn),
            home: self.idle_tx.clone(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }
}

pub struct PooledConnection {
    // Always `Some` until drop.
    conn: Option<Connection>,
    home: Sender<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("pooled connection used after release")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("pooled connection used after release")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let _ = self.home.try_send(conn);
        }
    }
}

/// Runs `f` inside one IMMEDIATE transaction: commit on `Ok`, rollback on
/// `Err` (the uncommitted transaction rolls back when dropped).
pub fn unit_of_work<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}

fn configure(conn: &Connection, busy: Duration) -> Result<()> {
    conn.busy_timeout(busy)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL CHECK(role IN ('admin','member','child')),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('checking','savings','credit','cash')),
        currency TEXT NOT NULL,
        balance INTEGER NOT NULL DEFAULT 0, -- minor units, maintained by the ledger only
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(user_id, name),
        FOREIGN KEY(user_id) REFERENCES users(id)
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id INTEGER,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL CHECK(kind IN ('expense','income')),
        icon TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(parent_id) REFERENCES categories(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        account_id INTEGER NOT NULL,
        category_id INTEGER,
        amount INTEGER NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('expense','income','transfer')),
        description TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL,
        is_shared INTEGER NOT NULL DEFAULT 0,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        recurring_rule TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        transfer_to_account_id INTEGER,
        template_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES users(id),
        FOREIGN KEY(account_id) REFERENCES accounts(id),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(transfer_to_account_id) REFERENCES accounts(id),
        FOREIGN KEY(template_id) REFERENCES transactions(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
    CREATE INDEX IF NOT EXISTS idx_transactions_template ON transactions(template_id);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_id INTEGER NOT NULL,
        amount INTEGER NOT NULL,
        month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
        year INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(category_id, month, year),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS saving_goals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        target_amount INTEGER NOT NULL,
        current_amount INTEGER NOT NULL DEFAULT 0,
        target_date TEXT,
        priority INTEGER NOT NULL DEFAULT 1,
        status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','completed','cancelled')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS bill_reminders(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        amount INTEGER NOT NULL CHECK(amount > 0),
        due_day INTEGER NOT NULL CHECK(due_day BETWEEN 1 AND 31),
        frequency TEXT NOT NULL CHECK(frequency IN ('monthly','quarterly','yearly')),
        category_id INTEGER,
        account_id INTEGER,
        is_active INTEGER NOT NULL DEFAULT 1,
        next_due_date TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_bill_reminders_due ON bill_reminders(next_due_date);

    CREATE TABLE IF NOT EXISTS allowances(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL UNIQUE,
        amount INTEGER NOT NULL,
        period_start TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
