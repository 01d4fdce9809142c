// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::{Budget, BudgetSummary};
use crate::utils::month_bounds;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

const COLUMNS: &str = "id, category_id, amount, month, year, created_at";

fn map_row(r: &Row) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        category_id: r.get(1)?,
        amount: r.get(2)?,
        month: r.get(3)?,
        year: r.get(4)?,
        created_at: r.get(5)?,
    })
}

/// Insert or replace the amount for (category, month, year).
pub fn upsert(conn: &Connection, category_id: i64, amount: i64, year: i32, month: u32) -> Result<Budget> {
    if amount <= 0 {
        return Err(Error::validation("Budget amount must be positive"));
    }
    month_bounds(year, month)?;
    super::categories::find_by_id(conn, category_id)?;
    conn.execute(
        "INSERT INTO budgets(category_id, amount, month, year) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(category_id, month, year) DO UPDATE SET amount=excluded.amount",
        params![category_id, amount, month, year],
    )?;
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM budgets WHERE category_id=?1 AND month=?2 AND year=?3"),
        params![category_id, month, year],
        map_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("budget", category_id))
}

pub fn find(conn: &Connection, period: Option<(i32, u32)>) -> Result<Vec<Budget>> {
    let mut sql = format!("SELECT {COLUMNS} FROM budgets");
    let mut args: Vec<Value> = Vec::new();
    if let Some((y, m)) = period {
        sql.push_str(" WHERE year=? AND month=?");
        args.push(Value::Integer(y as i64));
        args.push(Value::Integer(m as i64));
    }
    sql.push_str(" ORDER BY year, month, category_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM budgets WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("budget", id));
    }
    Ok(())
}

/// Budget vs. actual spend per budgeted category for one month.
pub fn summary(conn: &Connection, year: i32, month: u32) -> Result<Vec<BudgetSummary>> {
    let (start, end) = month_bounds(year, month)?;
    let mut stmt = conn.prepare(
        "SELECT b.category_id, c.name, b.amount,
                COALESCE((SELECT SUM(-t.amount) FROM transactions t
                           WHERE t.category_id=b.category_id AND t.amount<0
                             AND t.date>=?3 AND t.date<?4), 0)
           FROM budgets b JOIN categories c ON c.id=b.category_id
          WHERE b.year=?1 AND b.month=?2
          ORDER BY c.name",
    )?;
    let rows = stmt.query_map(params![year, month, start, end], |r| {
        let budget_amount: i64 = r.get(2)?;
        let actual_amount: i64 = r.get(3)?;
        Ok(BudgetSummary {
            category_id: r.get(0)?,
            category_name: r.get(1)?,
            budget_amount,
            actual_amount,
            remaining: budget_amount - actual_amount,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
