// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance-preserving operations on transactions, transfers and bills.
//!
//! Each public method checks a connection out of the pool and runs as one
//! unit of work. The recurring generator lives in [`recurring`].

pub(crate) mod bookkeeping;
pub mod recurring;

use crate::db::{self, Pool};
use crate::error::Result;
use crate::models::{
    Account, BillReminder, NewAccount, NewTransaction, PayBillRequest, Transaction,
    TransactionFilters, TransactionPatch, TransferRequest,
};
use crate::store::transactions;
use tracing::{info, instrument};

pub use recurring::next_occurrence;

#[derive(Clone)]
pub struct Ledger {
    pool: Pool,
}

impl Ledger {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    #[instrument(skip(self, req), fields(account_id = req.account_id, amount = req.amount, kind = %req.kind))]
    pub fn create_transaction(&self, user_id: i64, req: &NewTransaction) -> Result<Transaction> {
        let mut conn = self.pool.get()?;
        let tx = db::unit_of_work(&mut conn, |uow| bookkeeping::create(uow, user_id, req))?;
        info!(id = tx.id, "transaction created");
        Ok(tx)
    }

    #[instrument(skip(self, patch))]
    pub fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        let mut conn = self.pool.get()?;
        let tx = db::unit_of_work(&mut conn, |uow| bookkeeping::update(uow, id, patch))?;
        info!(amount = tx.amount, account_id = tx.account_id, "transaction updated");
        Ok(tx)
    }

    #[instrument(skip(self))]
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let mut conn = self.pool.get()?;
        db::unit_of_work(&mut conn, |uow| bookkeeping::delete(uow, id))?;
        info!("transaction deleted");
        Ok(())
    }

    #[instrument(skip(self, req), fields(from = req.from_account_id, to = req.to_account_id, amount = req.amount))]
    pub fn create_transfer(&self, user_id: i64, req: &TransferRequest) -> Result<Transaction> {
        let mut conn = self.pool.get()?;
        let tx = db::unit_of_work(&mut conn, |uow| bookkeeping::transfer(uow, user_id, req))?;
        info!(id = tx.id, "transfer recorded");
        Ok(tx)
    }

    /// Records the payment and moves the bill to its next due date.
    #[instrument(skip(self, req), fields(account_id = req.account_id))]
    pub fn pay_bill(
        &self,
        user_id: i64,
        bill_id: i64,
        req: &PayBillRequest,
    ) -> Result<(Transaction, BillReminder)> {
        let mut conn = self.pool.get()?;
        let (tx, bill) =
            db::unit_of_work(&mut conn, |uow| bookkeeping::pay_bill(uow, user_id, bill_id, req))?;
        info!(id = tx.id, next_due = %bill.next_due_date, "bill paid");
        Ok((tx, bill))
    }

    #[instrument(skip(self, new), fields(name = %new.name, opening = new.opening_balance))]
    pub fn open_account(&self, user_id: i64, new: &NewAccount) -> Result<Account> {
        let mut conn = self.pool.get()?;
        let account = db::unit_of_work(&mut conn, |uow| bookkeeping::open_account(uow, user_id, new))?;
        info!(id = account.id, "account opened");
        Ok(account)
    }

    pub fn get_transaction(&self, id: i64) -> Result<Transaction> {
        let conn = self.pool.get()?;
        transactions::find_by_id(&conn, id)
    }

    pub fn list_transactions(
        &self,
        user_id: i64,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>> {
        let conn = self.pool.get()?;
        transactions::find_by_user(&conn, user_id, filters)
    }
}
