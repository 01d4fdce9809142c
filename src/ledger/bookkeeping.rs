// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction writes paired with their balance effects.
//!
//! A transaction contributes `amount` to its primary account and `-amount`
//! to its transfer destination, if any. Every function here runs on a
//! connection that is already inside a unit of work, so a failure in any
//! step discards all of them.

use crate::error::{Error, Result};
use crate::models::{
    Account, BillReminder, NewAccount, NewTransaction, PayBillRequest, Transaction,
    TransactionPatch, TransferRequest, TxKind,
};
use crate::store::transactions::TransactionDraft;
use crate::store::{accounts, bills, categories, transactions, users};
use crate::utils::parse_date;
use rusqlite::Connection;

pub(crate) const OPENING_BALANCE: &str = "Opening balance";

/// Checks references and the transfer rules, producing an insertable draft.
pub(crate) fn validate(conn: &Connection, user_id: i64, req: &NewTransaction) -> Result<TransactionDraft> {
    let date = parse_date(&req.date)?;
    if req.amount == 0 {
        return Err(Error::validation("Amount must be non-zero"));
    }
    users::find_by_id(conn, user_id)?;
    accounts::find_by_id(conn, req.account_id)?;
    if let Some(c) = req.category_id {
        categories::find_by_id(conn, c)?;
    }

    match (req.kind, req.transfer_to_account_id) {
        (TxKind::Transfer, None) => {
            return Err(Error::validation("Transfer requires a destination account"));
        }
        (TxKind::Transfer, Some(dest)) if dest == req.account_id => {
            return Err(Error::validation(
                "Transfer destination must differ from the source account",
            ));
        }
        (TxKind::Transfer, Some(dest)) => {
            accounts::find_by_id(conn, dest)?;
        }
        (_, Some(_)) => {
            return Err(Error::validation(format!(
                "Only transfers may set a destination account, not {}",
                req.kind
            )));
        }
        (_, None) => {}
    }

    match (&req.recurring_rule, req.is_recurring) {
        (Some(rule), true) => rule.validate()?,
        (None, true) => return Err(Error::validation("Recurring transaction needs a rule")),
        (Some(_), false) => {
            return Err(Error::validation("Recurring rule given for a one-off transaction"));
        }
        (None, false) => {}
    }

    Ok(TransactionDraft {
        user_id,
        account_id: req.account_id,
        category_id: req.category_id,
        amount: req.amount,
        kind: req.kind,
        description: req.description.trim().to_string(),
        date,
        is_shared: req.is_shared,
        is_recurring: req.is_recurring,
        recurring_rule: req.recurring_rule.clone(),
        tags: req.tags.clone(),
        transfer_to_account_id: req.transfer_to_account_id,
        template_id: None,
    })
}

/// Inserts the row and applies both balance legs.
pub(crate) fn record(conn: &Connection, draft: &TransactionDraft) -> Result<Transaction> {
    let tx = transactions::insert(conn, draft)?;
    accounts::adjust_balance(conn, tx.account_id, tx.amount)?;
    if tx.kind == TxKind::Transfer {
        if let Some(dest) = tx.transfer_to_account_id {
            accounts::adjust_balance(conn, dest, -tx.amount)?;
        }
    }
    Ok(tx)
}

pub(crate) fn create(conn: &Connection, user_id: i64, req: &NewTransaction) -> Result<Transaction> {
    let draft = validate(conn, user_id, req)?;
    record(conn, &draft)
}

pub(crate) fn update(conn: &Connection, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
    let original = transactions::find_by_id(conn, id)?;
    let amount = patch.amount.unwrap_or(original.amount);
    let account_id = patch.account_id.unwrap_or(original.account_id);
    let moves_money = amount != original.amount || account_id != original.account_id;

    if moves_money && original.kind == TxKind::Transfer {
        return Err(Error::validation(
            "Amount and account of a transfer cannot be edited; delete and re-create it",
        ));
    }
    if amount == 0 {
        return Err(Error::validation("Amount must be non-zero"));
    }
    if account_id != original.account_id {
        accounts::find_by_id(conn, account_id)?;
    }
    if let Some(c) = patch.category_id {
        categories::find_by_id(conn, c)?;
    }

    let mut next = original.clone();
    next.account_id = account_id;
    next.amount = amount;
    if let Some(c) = patch.category_id {
        next.category_id = Some(c);
    }
    if let Some(d) = &patch.description {
        next.description = d.trim().to_string();
    }
    if let Some(d) = &patch.date {
        next.date = parse_date(d)?;
    }
    if let Some(s) = patch.is_shared {
        next.is_shared = s;
    }
    if let Some(t) = &patch.tags {
        next.tags = t.clone();
    }

    let saved = transactions::update(conn, &next)?;
    if moves_money {
        accounts::adjust_balance(conn, original.account_id, -original.amount)?;
        accounts::adjust_balance(conn, saved.account_id, saved.amount)?;
    }
    Ok(saved)
}

pub(crate) fn delete(conn: &Connection, id: i64) -> Result<()> {
    let tx = transactions::find_by_id(conn, id)?;
    accounts::adjust_balance(conn, tx.account_id, -tx.amount)?;
    if tx.kind == TxKind::Transfer {
        if let Some(dest) = tx.transfer_to_account_id {
            accounts::adjust_balance(conn, dest, tx.amount)?;
        }
    }
    transactions::delete(conn, id)
}

/// One transfer row: `-amount` on the source, `+amount` on the destination.
pub(crate) fn transfer(conn: &Connection, user_id: i64, req: &TransferRequest) -> Result<Transaction> {
    if req.from_account_id == req.to_account_id {
        return Err(Error::validation("Cannot transfer to the same account"));
    }
    if req.amount <= 0 {
        return Err(Error::validation("Transfer amount must be positive"));
    }
    let mut new = NewTransaction::new(req.from_account_id, -req.amount, TxKind::Transfer, &req.date);
    new.description = req.description.clone();
    new.is_shared = true;
    new.transfer_to_account_id = Some(req.to_account_id);
    create(conn, user_id, &new)
}

pub(crate) fn pay_bill(
    conn: &Connection,
    user_id: i64,
    bill_id: i64,
    req: &PayBillRequest,
) -> Result<(Transaction, BillReminder)> {
    let bill = bills::find_by_id(conn, bill_id)?;
    if !bill.is_active {
        return Err(Error::validation(format!("Bill '{}' is not active", bill.name)));
    }
    let mut new = NewTransaction::new(req.account_id, -bill.amount, TxKind::Expense, &req.date);
    new.description = format!("Bill payment: {}", bill.name);
    new.category_id = bill.category_id;
    let tx = create(conn, user_id, &new)?;
    bills::advance_next_due_date(conn, &bill)?;
    Ok((tx, bills::find_by_id(conn, bill.id)?))
}

/// Account row plus an "Opening balance" entry when the balance is non-zero.
pub(crate) fn open_account(conn: &Connection, user_id: i64, new: &NewAccount) -> Result<Account> {
    users::find_by_id(conn, user_id)?;
    let account = accounts::insert(conn, user_id, new)?;
    if new.opening_balance != 0 {
        let kind = if new.opening_balance > 0 {
            TxKind::Income
        } else {
            TxKind::Expense
        };
        let today = chrono::Local::now().date_naive().to_string();
        let mut entry = NewTransaction::new(account.id, new.opening_balance, kind, today);
        entry.description = OPENING_BALANCE.to_string();
        create(conn, user_id, &entry)?;
    }
    accounts::find_by_id(conn, account.id)
}
