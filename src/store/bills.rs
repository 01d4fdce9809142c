// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::{BillFrequency, BillReminder, BillReminderPatch, NewBillReminder};
use crate::utils::{add_months, parse_date, with_day_clamped};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, name, amount, due_day, frequency, category_id, account_id, \
     is_active, next_due_date, created_at, updated_at";

fn map_row(r: &Row) -> rusqlite::Result<BillReminder> {
    Ok(BillReminder {
        id: r.get(0)?,
        name: r.get(1)?,
        amount: r.get(2)?,
        due_day: r.get(3)?,
        frequency: r.get(4)?,
        category_id: r.get(5)?,
        account_id: r.get(6)?,
        is_active: r.get(7)?,
        next_due_date: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

impl BillFrequency {
    pub fn months(&self) -> u32 {
        match self {
            BillFrequency::Monthly => 1,
            BillFrequency::Quarterly => 3,
            BillFrequency::Yearly => 12,
        }
    }

    /// One period after `due`, clamped to the end of the target month.
    pub fn advance(&self, due: NaiveDate) -> Result<NaiveDate> {
        add_months(due, self.months())
            .ok_or_else(|| Error::validation(format!("Due date {} out of range", due)))
    }
}

fn check(name: &str, amount: i64, due_day: u32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Bill name must not be empty"));
    }
    if amount <= 0 {
        return Err(Error::validation("Bill amount must be positive"));
    }
    if !(1..=31).contains(&due_day) {
        return Err(Error::validation(format!(
            "Bill due day must be 1..=31, got {}",
            due_day
        )));
    }
    Ok(())
}

pub fn insert(conn: &Connection, bill: &NewBillReminder) -> Result<BillReminder> {
    check(&bill.name, bill.amount, bill.due_day)?;
    let next_due = parse_date(&bill.next_due_date)?;
    conn.execute(
        "INSERT INTO bill_reminders(name, amount, due_day, frequency, category_id, account_id, next_due_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            bill.name.trim(),
            bill.amount,
            bill.due_day,
            bill.frequency,
            bill.category_id,
            bill.account_id,
            next_due
        ],
    )?;
    find_by_id(conn, conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<BillReminder> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM bill_reminders WHERE id=?1"),
        params![id],
        map_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("bill reminder", id))
}

pub fn find_all(conn: &Connection) -> Result<Vec<BillReminder>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM bill_reminders ORDER BY next_due_date, id"
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Active bills due on or before `today + days`, overdue ones included.
pub fn find_upcoming(conn: &Connection, today: NaiveDate, days: u32) -> Result<Vec<BillReminder>> {
    let horizon = today + chrono::Duration::days(days as i64);
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM bill_reminders
          WHERE is_active=1 AND next_due_date<=?1
          ORDER BY next_due_date, id"
    ))?;
    let rows = stmt.query_map(params![horizon], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update(conn: &Connection, id: i64, patch: &BillReminderPatch) -> Result<BillReminder> {
    let cur = find_by_id(conn, id)?;
    let name = patch.name.clone().unwrap_or(cur.name);
    let amount = patch.amount.unwrap_or(cur.amount);
    let due_day = patch.due_day.unwrap_or(cur.due_day);
    check(&name, amount, due_day)?;
    conn.execute(
        "UPDATE bill_reminders
            SET name=?1, amount=?2, due_day=?3, frequency=?4, category_id=?5, account_id=?6,
                is_active=?7, updated_at=datetime('now')
          WHERE id=?8",
        params![
            name.trim(),
            amount,
            due_day,
            patch.frequency.unwrap_or(cur.frequency),
            patch.category_id.or(cur.category_id),
            patch.account_id.or(cur.account_id),
            patch.is_active.unwrap_or(cur.is_active),
            id
        ],
    )?;
    find_by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM bill_reminders WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("bill reminder", id));
    }
    Ok(())
}

/// Moves the bill one period on, re-pinned to its `due_day` so a bill due
/// on the 31st returns to the 31st after a short month.
pub fn advance_next_due_date(conn: &Connection, bill: &BillReminder) -> Result<NaiveDate> {
    let next = with_day_clamped(bill.frequency.advance(bill.next_due_date)?, bill.due_day);
    let n = conn.execute(
        "UPDATE bill_reminders SET next_due_date=?1, updated_at=datetime('now') WHERE id=?2",
        params![next, bill.id],
    )?;
    if n == 0 {
        return Err(Error::not_found("bill reminder", bill.id));
    }
    Ok(next)
}
