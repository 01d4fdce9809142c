// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::text_decode_error;
use crate::error::{Error, Result};
use crate::models::{RecurringRule, Transaction, TransactionFilters, TxKind};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

pub(crate) const COLUMNS: &str = "id, user_id, account_id, category_id, amount, kind, description, date, \
     is_shared, is_recurring, recurring_rule, tags, transfer_to_account_id, template_id, \
     created_at, updated_at";

/// A validated row ready to insert. Built by the ledger, never by callers.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub user_id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: i64,
    pub kind: TxKind,
    pub description: String,
    pub date: NaiveDate,
    pub is_shared: bool,
    pub is_recurring: bool,
    pub recurring_rule: Option<RecurringRule>,
    pub tags: Vec<String>,
    pub transfer_to_account_id: Option<i64>,
    pub template_id: Option<i64>,
}

pub(crate) fn map_row(r: &Row) -> rusqlite::Result<Transaction> {
    let rule: Option<String> = r.get(10)?;
    let recurring_rule = match rule {
        Some(s) => Some(serde_json::from_str(&s).map_err(|e| text_decode_error(10, e))?),
        None => None,
    };
    let tags: String = r.get(11)?;
    let tags = serde_json::from_str(&tags).map_err(|e| text_decode_error(11, e))?;
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        account_id: r.get(2)?,
        category_id: r.get(3)?,
        amount: r.get(4)?,
        kind: r.get(5)?,
        description: r.get(6)?,
        date: r.get(7)?,
        is_shared: r.get(8)?,
        is_recurring: r.get(9)?,
        recurring_rule,
        tags,
        transfer_to_account_id: r.get(12)?,
        template_id: r.get(13)?,
        created_at: r.get(14)?,
        updated_at: r.get(15)?,
    })
}

pub fn insert(conn: &Connection, d: &TransactionDraft) -> Result<Transaction> {
    let rule = d
        .recurring_rule
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let tags = serde_json::to_string(&d.tags)?;
    conn.execute(
        "INSERT INTO transactions(user_id, account_id, category_id, amount, kind, description, date,
                                  is_shared, is_recurring, recurring_rule, tags,
                                  transfer_to_account_id, template_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            d.user_id,
            d.account_id,
            d.category_id,
            d.amount,
            d.kind,
            d.description,
            d.date,
            d.is_shared,
            d.is_recurring,
            rule,
            tags,
            d.transfer_to_account_id,
            d.template_id,
        ],
    )?;
    find_by_id(conn, conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Transaction> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM transactions WHERE id=?1"),
        params![id],
        map_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("transaction", id))
}

/// Newest first.
pub fn find_by_user(
    conn: &Connection,
    user_id: i64,
    f: &TransactionFilters,
) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {COLUMNS} FROM transactions WHERE user_id=?");
    let mut args: Vec<Value> = vec![Value::Integer(user_id)];

    if let Some(a) = f.account_id {
        sql.push_str(" AND (account_id=? OR transfer_to_account_id=?)");
        args.push(Value::Integer(a));
        args.push(Value::Integer(a));
    }
    if let Some(c) = f.category_id {
        sql.push_str(" AND category_id=?");
        args.push(Value::Integer(c));
    }
    if let Some(k) = f.kind {
        sql.push_str(" AND kind=?");
        args.push(Value::Text(k.as_str().to_string()));
    }
    if let Some(d) = f.start_date {
        sql.push_str(" AND date>=?");
        args.push(Value::Text(d.to_string()));
    }
    if let Some(d) = f.end_date {
        sql.push_str(" AND date<=?");
        args.push(Value::Text(d.to_string()));
    }
    if let Some(s) = f.is_shared {
        sql.push_str(" AND is_shared=?");
        args.push(Value::Integer(s as i64));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = f.limit {
        sql.push_str(" LIMIT ?");
        args.push(Value::Integer(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Writes the mutable columns of `t` back. Balances are the caller's concern.
pub fn update(conn: &Connection, t: &Transaction) -> Result<Transaction> {
    let tags = serde_json::to_string(&t.tags)?;
    let n = conn.execute(
        "UPDATE transactions
            SET account_id=?1, category_id=?2, amount=?3, description=?4, date=?5,
                is_shared=?6, tags=?7, updated_at=datetime('now')
          WHERE id=?8",
        params![
            t.account_id,
            t.category_id,
            t.amount,
            t.description,
            t.date,
            t.is_shared,
            tags,
            t.id
        ],
    )?;
    if n == 0 {
        return Err(Error::not_found("transaction", t.id));
    }
    find_by_id(conn, t.id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("transaction", id));
    }
    Ok(())
}

pub fn find_recurring_templates(conn: &Connection, user_id: i64) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM transactions
          WHERE user_id=?1 AND is_recurring=1 AND recurring_rule IS NOT NULL
          ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![user_id], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Most recent occurrence already materialised from `template`.
///
/// Rows carrying the template's back-reference win. Otherwise the newest
/// non-recurring row with no back-reference and the same account, category
/// and description is taken as the prior copy.
pub fn find_latest_occurrence(
    conn: &Connection,
    template: &Transaction,
) -> Result<Option<Transaction>> {
    let linked = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM transactions
                  WHERE template_id=?1
                  ORDER BY date DESC, id DESC LIMIT 1"
            ),
            params![template.id],
            map_row,
        )
        .optional()?;
    if linked.is_some() {
        return Ok(linked);
    }
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM transactions
                  WHERE user_id=?1 AND account_id=?2 AND category_id IS ?3 AND description=?4
                    AND is_recurring=0 AND template_id IS NULL AND id<>?5
                  ORDER BY date DESC, id DESC LIMIT 1"
            ),
            params![
                template.user_id,
                template.account_id,
                template.category_id,
                template.description,
                template.id
            ],
            map_row,
        )
        .optional()?)
}

/// Sum of `amount` where the account is primary, minus the sum where it is
/// the transfer destination.
pub fn ledger_sum(conn: &Connection, account_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COALESCE((SELECT SUM(amount) FROM transactions WHERE account_id=?1), 0)
              - COALESCE((SELECT SUM(amount) FROM transactions WHERE transfer_to_account_id=?1), 0)",
        params![account_id],
        |r| r.get(0),
    )?)
}
