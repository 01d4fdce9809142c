// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::{Allowance, AllowancePatch};
use crate::utils::add_months;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

/// Sum of |amount| of the user's outflows in `[start, start + 1 month)`.
pub fn spent_in_period(conn: &Connection, user_id: i64, start: NaiveDate) -> Result<i64> {
    let end = add_months(start, 1)
        .ok_or_else(|| Error::validation(format!("Period start {} out of range", start)))?;
    Ok(conn.query_row(
        "SELECT COALESCE(SUM(-amount), 0) FROM transactions
          WHERE user_id=?1 AND amount<0 AND date>=?2 AND date<?3",
        params![user_id, start, end],
        |r| r.get(0),
    )?)
}

fn load(conn: &Connection, sql: &str, key: i64) -> Result<Option<Allowance>> {
    let row = conn
        .query_row(sql, params![key], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, NaiveDate>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, String>(5)?,
            ))
        })
        .optional()?;
    let Some((id, user_id, amount, period_start, created_at, updated_at)) = row else {
        return Ok(None);
    };
    let spent = spent_in_period(conn, user_id, period_start)?;
    Ok(Some(Allowance {
        id,
        user_id,
        amount,
        period_start,
        spent,
        remaining: amount - spent,
        created_at,
        updated_at,
    }))
}

const SELECT: &str = "SELECT id, user_id, amount, period_start, created_at, updated_at FROM allowances";

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Allowance> {
    load(conn, &format!("{SELECT} WHERE id=?1"), id)?
        .ok_or_else(|| Error::not_found("allowance", id))
}

pub fn find_by_user(conn: &Connection, user_id: i64) -> Result<Option<Allowance>> {
    load(conn, &format!("{SELECT} WHERE user_id=?1"), user_id)
}

pub fn find_all(conn: &Connection) -> Result<Vec<Allowance>> {
    let mut stmt = conn.prepare("SELECT id FROM allowances ORDER BY user_id")?;
    let ids = stmt
        .query_map([], |r| r.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    ids.into_iter().map(|id| find_by_id(conn, id)).collect()
}

/// One allowance per user: a second call replaces amount and period start.
pub fn upsert(conn: &Connection, user_id: i64, amount: i64, period_start: NaiveDate) -> Result<Allowance> {
    if amount <= 0 {
        return Err(Error::validation("Allowance amount must be positive"));
    }
    super::users::find_by_id(conn, user_id)?;
    conn.execute(
        "INSERT INTO allowances(user_id, amount, period_start) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE
            SET amount=excluded.amount, period_start=excluded.period_start, updated_at=datetime('now')",
        params![user_id, amount, period_start],
    )?;
    find_by_user(conn, user_id)?.ok_or_else(|| Error::not_found("allowance", user_id))
}

pub fn update(conn: &Connection, id: i64, patch: &AllowancePatch) -> Result<Allowance> {
    let cur = find_by_id(conn, id)?;
    let amount = patch.amount.unwrap_or(cur.amount);
    if amount <= 0 {
        return Err(Error::validation("Allowance amount must be positive"));
    }
    conn.execute(
        "UPDATE allowances SET amount=?1, period_start=?2, updated_at=datetime('now') WHERE id=?3",
        params![amount, patch.period_start.unwrap_or(cur.period_start), id],
    )?;
    find_by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM allowances WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("allowance", id));
    }
    Ok(())
}
