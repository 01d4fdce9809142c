// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::{COLUMNS, map_row};
use crate::error::{Error, Result};
use crate::models::{
    CategorySpending, Dashboard, MemberSpending, MonthSummary, SearchFilters, SearchResult,
    Transaction, TrendPoint,
};
use crate::utils::month_bounds;
use chrono::{Datelike, Months, NaiveDate};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use rust_decimal::Decimal;

const SEARCH_LIMIT: i64 = 100;

/// `user_id = None` aggregates the whole family.
pub fn month_summary(
    conn: &Connection,
    user_id: Option<i64>,
    year: i32,
    month: u32,
) -> Result<MonthSummary> {
    let (start, end) = month_bounds(year, month)?;
    let (income, expense): (i64, i64) = conn.query_row(
        "SELECT COALESCE(SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END), 0)
           FROM transactions
          WHERE (?1 IS NULL OR user_id=?1) AND date>=?2 AND date<?3",
        params![user_id, start, end],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(MonthSummary {
        month,
        year,
        total_income: income,
        total_expense: expense,
        net: income - expense,
    })
}

pub fn recent(conn: &Connection, user_id: Option<i64>, limit: usize) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM transactions
          WHERE (?1 IS NULL OR user_id=?1)
          ORDER BY date DESC, id DESC LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![user_id, limit as i64], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Outflows per category with their share of the month's categorised spend.
pub fn spending_by_category(
    conn: &Connection,
    user_id: Option<i64>,
    year: i32,
    month: u32,
) -> Result<Vec<CategorySpending>> {
    let (start, end) = month_bounds(year, month)?;
    let mut stmt = conn.prepare(
        "SELECT t.category_id, c.name, SUM(-t.amount) AS total
           FROM transactions t JOIN categories c ON c.id=t.category_id
          WHERE t.amount<0 AND (?1 IS NULL OR t.user_id=?1) AND t.date>=?2 AND t.date<?3
          GROUP BY t.category_id, c.name
          ORDER BY total DESC, c.name",
    )?;
    let rows = stmt
        .query_map(params![user_id, start, end], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?, r.get::<_, i64>(2)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let grand: i64 = rows.iter().map(|(_, _, total)| total).sum();
    Ok(rows
        .into_iter()
        .map(|(category_id, category_name, total_amount)| {
            let percentage = if grand > 0 {
                (Decimal::from(total_amount) * Decimal::ONE_HUNDRED / Decimal::from(grand))
                    .round_dp(2)
            } else {
                Decimal::ZERO
            };
            CategorySpending {
                category_id,
                category_name,
                total_amount,
                percentage,
            }
        })
        .collect())
}

pub fn spending_by_member(conn: &Connection, year: i32, month: u32) -> Result<Vec<MemberSpending>> {
    let (start, end) = month_bounds(year, month)?;
    let mut stmt = conn.prepare(
        "SELECT u.id, u.name,
                COALESCE(SUM(CASE WHEN t.amount < 0 THEN -t.amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN t.amount > 0 THEN t.amount ELSE 0 END), 0)
           FROM users u
           LEFT JOIN transactions t ON t.user_id=u.id AND t.date>=?1 AND t.date<?2
          GROUP BY u.id, u.name
          ORDER BY u.name",
    )?;
    let rows = stmt.query_map(params![start, end], |r| {
        let total_expense: i64 = r.get(2)?;
        let total_income: i64 = r.get(3)?;
        Ok(MemberSpending {
            user_id: r.get(0)?,
            user_name: r.get(1)?,
            total_expense,
            total_income,
            net: total_income - total_expense,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// The `months` calendar months ending with the one containing `today`,
/// oldest first. Months without activity are reported as zeros.
pub fn trends(
    conn: &Connection,
    user_id: Option<i64>,
    months: u32,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    if months == 0 {
        return Err(Error::validation("Trend window must cover at least one month"));
    }
    let this_month = today.with_day(1).unwrap_or(today);
    let mut out = Vec::with_capacity(months as usize);
    for back in (0..months).rev() {
        let first = this_month
            .checked_sub_months(Months::new(back))
            .ok_or_else(|| Error::validation("Trend window reaches before the calendar"))?;
        let s = month_summary(conn, user_id, first.year(), first.month())?;
        out.push(TrendPoint {
            month: s.month,
            year: s.year,
            total_income: s.total_income,
            total_expense: s.total_expense,
            net: s.net,
        });
    }
    Ok(out)
}

pub fn dashboard(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<Dashboard> {
    Ok(Dashboard {
        accounts: super::accounts::find_by_user(conn, user_id)?,
        month_summary: month_summary(conn, Some(user_id), today.year(), today.month())?,
        recent_transactions: recent(conn, Some(user_id), 10)?,
    })
}

pub fn search(conn: &Connection, f: &SearchFilters) -> Result<SearchResult> {
    let mut sql = format!("SELECT {COLUMNS} FROM transactions WHERE 1=1");
    let mut args: Vec<Value> = Vec::new();

    if let Some(u) = f.user_id {
        sql.push_str(" AND user_id=?");
        args.push(Value::Integer(u));
    }
    if let Some(d) = f.description.as_deref().filter(|d| !d.is_empty()) {
        // SQLite LIKE is case-insensitive for ASCII.
        sql.push_str(" AND description LIKE ? ESCAPE '\\'");
        let escaped = d.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        args.push(Value::Text(format!("%{}%", escaped)));
    }
    if let Some(min) = f.min_amount {
        sql.push_str(" AND ABS(amount)>=?");
        args.push(Value::Integer(min));
    }
    if let Some(max) = f.max_amount {
        sql.push_str(" AND ABS(amount)<=?");
        args.push(Value::Integer(max));
    }
    if let Some(d) = f.start_date {
        sql.push_str(" AND date>=?");
        args.push(Value::Text(d.to_string()));
    }
    if let Some(d) = f.end_date {
        sql.push_str(" AND date<=?");
        args.push(Value::Text(d.to_string()));
    }
    if let Some(c) = f.category_id {
        sql.push_str(" AND category_id=?");
        args.push(Value::Integer(c));
    }
    if let Some(a) = f.account_id {
        sql.push_str(" AND account_id=?");
        args.push(Value::Integer(a));
    }
    if !f.tags.is_empty() {
        let marks = vec!["?"; f.tags.len()].join(",");
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM json_each(transactions.tags) WHERE json_each.value IN ({marks}))"
        ));
        args.extend(f.tags.iter().map(|t| Value::Text(t.clone())));
    }
    sql.push_str(" ORDER BY date DESC, id DESC LIMIT ?");
    args.push(Value::Integer(SEARCH_LIMIT));

    let mut stmt = conn.prepare(&sql)?;
    let transactions = stmt
        .query_map(params_from_iter(args), map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(SearchResult {
        total_count: transactions.len(),
        transactions,
    })
}
