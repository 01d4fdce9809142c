// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::{Account, AccountPatch, NewAccount};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, user_id, name, type, currency, balance, created_at";

fn map_row(r: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        r#type: r.get(3)?,
        currency: r.get(4)?,
        balance: r.get(5)?,
        created_at: r.get(6)?,
    })
}

fn check_currency(ccy: &str) -> Result<String> {
    let ccy = ccy.trim().to_uppercase();
    if ccy.len() != 3 || !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::validation(format!(
            "Currency must be a 3-letter code, got '{}'",
            ccy
        )));
    }
    Ok(ccy)
}

/// Inserts with a zero balance. Opening balances go through the ledger.
pub fn insert(conn: &Connection, user_id: i64, account: &NewAccount) -> Result<Account> {
    let name = account.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Account name must not be empty"));
    }
    let ccy = check_currency(&account.currency)?;
    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM accounts WHERE user_id=?1 AND name=?2",
            params![user_id, name],
            |r| r.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Err(Error::validation(format!("Account '{}' already exists", name)));
    }
    conn.execute(
        "INSERT INTO accounts(user_id, name, type, currency) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, name, account.r#type, ccy],
    )?;
    find_by_id(conn, conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Account> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM accounts WHERE id=?1"),
        params![id],
        map_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("account", id))
}

pub fn find_by_user(conn: &Connection, user_id: i64) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM accounts WHERE user_id=?1 ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn find_all(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM accounts ORDER BY user_id, name"
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Metadata only; the balance column is never written here.
pub fn update(conn: &Connection, id: i64, patch: &AccountPatch) -> Result<Account> {
    let current = find_by_id(conn, id)?;
    let name = match &patch.name {
        Some(n) if n.trim().is_empty() => {
            return Err(Error::validation("Account name must not be empty"));
        }
        Some(n) => n.trim().to_string(),
        None => current.name,
    };
    let ccy = match &patch.currency {
        Some(c) => check_currency(c)?,
        None => current.currency,
    };
    let typ = patch.r#type.unwrap_or(current.r#type);
    conn.execute(
        "UPDATE accounts SET name=?1, type=?2, currency=?3 WHERE id=?4",
        params![name, typ, ccy, id],
    )?;
    find_by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let refs: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE account_id=?1 OR transfer_to_account_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if refs > 0 {
        return Err(Error::validation(format!(
            "Account {} is referenced by {} transaction(s)",
            id, refs
        )));
    }
    let n = conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("account", id));
    }
    Ok(())
}

/// `balance = balance + delta` in one statement.
pub fn adjust_balance(conn: &Connection, id: i64, delta: i64) -> Result<()> {
    let n = conn.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id=?2",
        params![delta, id],
    )?;
    if n == 0 {
        return Err(Error::not_found("account", id));
    }
    Ok(())
}
