// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}

/// `YYYY-MM` -> (year, month)
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid month '{}', expected YYYY-MM", s)))?;
    Ok((d.year(), d.month()))
}

/// Decimal major units ("12.34", "-5") to minor units.
pub fn parse_amount(s: &str) -> Result<i64> {
    let d = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_| Error::validation(format!("Invalid amount '{}'", s)))?;
    if d.scale() > 2 {
        return Err(Error::validation(format!(
            "Amount '{}' has more than two decimal places",
            s
        )));
    }
    (d * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| Error::validation(format!("Amount '{}' is out of range", s)))
}

pub fn fmt_amount(minor: i64) -> String {
    Decimal::new(minor, 2).to_string()
}

pub fn fmt_money(minor: i64, ccy: &str) -> String {
    format!("{} {}", ccy, fmt_amount(minor))
}

/// Adds calendar months, clamping to the last day of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Half-open `[first day, first day of next month)`.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::validation(format!("Invalid month {}-{:02}", year, month)))?;
    let end = add_months(start, 1)
        .ok_or_else(|| Error::validation(format!("Month {}-{:02} out of range", year, month)))?;
    Ok((start, end))
}

/// `date` with its day replaced, clamped to the month's length.
pub fn with_day_clamped(date: NaiveDate, day: u32) -> NaiveDate {
    let mut d = day.clamp(1, 31);
    loop {
        if let Some(v) = date.with_day(d) {
            return v;
        }
        d -= 1;
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Accepts a numeric id or the account name as owned by `user_id`.
pub fn id_for_account(conn: &Connection, user_id: i64, key: &str) -> Result<i64> {
    if let Ok(id) = key.parse::<i64>() {
        return Ok(id);
    }
    conn.query_row(
        "SELECT id FROM accounts WHERE user_id=?1 AND name=?2",
        params![user_id, key],
        |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| Error::validation(format!("Account '{}' not found", key)))
}

pub fn id_for_category(conn: &Connection, key: &str) -> Result<i64> {
    if let Ok(id) = key.parse::<i64>() {
        return Ok(id);
    }
    conn.query_row(
        "SELECT id FROM categories WHERE name=?1",
        params![key],
        |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| Error::validation(format!("Category '{}' not found", key)))
}

pub fn parse_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
