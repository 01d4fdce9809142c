// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of lowercase words stored as TEXT.
macro_rules! text_enum {
    ($name:ident, $what:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(Error::validation(format!(
                        "unknown {} '{}'",
                        $what, other
                    ))),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum!(Role, "role" {
    Admin => "admin",
    Member => "member",
    Child => "child",
});

text_enum!(AccountType, "account type" {
    Checking => "checking",
    Savings => "savings",
    Credit => "credit",
    Cash => "cash",
});

text_enum!(CategoryKind, "category kind" {
    Expense => "expense",
    Income => "income",
});

text_enum!(TxKind, "transaction kind" {
    Expense => "expense",
    Income => "income",
    Transfer => "transfer",
});

text_enum!(Frequency, "frequency" {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

text_enum!(BillFrequency, "bill frequency" {
    Monthly => "monthly",
    Quarterly => "quarterly",
    Yearly => "yearly",
});

text_enum!(GoalStatus, "goal status" {
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub r#type: AccountType,
    pub currency: String,
    /// Minor units. Derived from the transactions that reference this account.
    pub balance: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub r#type: AccountType,
    pub currency: String,
    /// Recorded as an "Opening balance" transaction when non-zero.
    #[serde(default)]
    pub opening_balance: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub r#type: Option<AccountType>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub parent_id: Option<i64>,
    pub name: String,
    pub kind: CategoryKind,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
}

/// Attached to a transaction with `is_recurring = true`, making it a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub frequency: Frequency,
    /// Day of month that monthly occurrences are pinned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    /// 0 = Sunday. Informational only; weekly occurrences step exactly 7 days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
}

impl RecurringRule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            day: None,
            day_of_week: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(day) = self.day {
            if !(1..=31).contains(&day) {
                return Err(Error::validation(format!(
                    "recurring day-of-month must be 1..=31, got {}",
                    day
                )));
            }
        }
        if let Some(dow) = self.day_of_week {
            if dow > 6 {
                return Err(Error::validation(format!(
                    "recurring day-of-week must be 0..=6, got {}",
                    dow
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    /// Signed minor units: positive = inflow, negative = outflow.
    pub amount: i64,
    pub kind: TxKind,
    pub description: String,
    pub date: NaiveDate,
    pub is_shared: bool,
    pub is_recurring: bool,
    pub recurring_rule: Option<RecurringRule>,
    pub tags: Vec<String>,
    pub transfer_to_account_id: Option<i64>,
    /// Set on occurrences materialised from a recurring template.
    pub template_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn is_template(&self) -> bool {
        self.is_recurring && self.recurring_rule.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: i64,
    pub kind: TxKind,
    #[serde(default)]
    pub description: String,
    /// YYYY-MM-DD
    pub date: String,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurring_rule: Option<RecurringRule>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub transfer_to_account_id: Option<i64>,
}

impl NewTransaction {
    pub fn new(account_id: i64, amount: i64, kind: TxKind, date: impl Into<String>) -> Self {
        Self {
            account_id,
            category_id: None,
            amount,
            kind,
            description: String::new(),
            date: date.into(),
            is_shared: false,
            is_recurring: false,
            recurring_rule: None,
            tags: Vec::new(),
            transfer_to_account_id: None,
        }
    }
}

/// Partial update: only `Some` fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub amount: Option<i64>,
    pub description: Option<String>,
    /// YYYY-MM-DD
    pub date: Option<String>,
    pub is_shared: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilters {
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub kind: Option<TxKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_shared: Option<bool>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Positive minor units moved from `from` to `to`.
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    /// YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayBillRequest {
    pub account_id: i64,
    /// YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReport {
    pub generated: usize,
    pub templates_considered: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillReminder {
    pub id: i64,
    pub name: String,
    /// Positive expense magnitude.
    pub amount: i64,
    pub due_day: u32,
    pub frequency: BillFrequency,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub is_active: bool,
    pub next_due_date: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBillReminder {
    pub name: String,
    pub amount: i64,
    pub due_day: u32,
    pub frequency: BillFrequency,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    /// YYYY-MM-DD
    pub next_due_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillReminderPatch {
    pub name: Option<String>,
    pub amount: Option<i64>,
    pub due_day: Option<u32>,
    pub frequency: Option<BillFrequency>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub amount: i64,
    pub month: u32,
    pub year: i32,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub category_id: i64,
    pub category_name: String,
    pub budget_amount: i64,
    /// Spend as a positive number.
    pub actual_amount: i64,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingGoal {
    pub id: i64,
    pub name: String,
    pub target_amount: i64,
    pub current_amount: i64,
    pub target_date: Option<NaiveDate>,
    pub priority: i64,
    pub status: GoalStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSavingGoal {
    pub name: String,
    pub target_amount: i64,
    pub target_date: Option<NaiveDate>,
    pub priority: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavingGoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<i64>,
    pub target_date: Option<NaiveDate>,
    pub priority: Option<i64>,
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allowance {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub period_start: NaiveDate,
    /// Computed from transactions in [period_start, period_start + 1 month).
    pub spent: i64,
    pub remaining: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowancePatch {
    pub amount: Option<i64>,
    pub period_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: u32,
    pub year: i32,
    pub total_income: i64,
    pub total_expense: i64,
    pub net: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category_id: i64,
    pub category_name: String,
    pub total_amount: i64,
    /// Share of the month's categorised spending, two decimal places.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSpending {
    pub user_id: i64,
    pub user_name: String,
    pub total_expense: i64,
    pub total_income: i64,
    pub net: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: u32,
    pub year: i32,
    pub total_income: i64,
    pub total_expense: i64,
    pub net: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub accounts: Vec<Account>,
    pub month_summary: MonthSummary,
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// `None` searches every member's transactions.
    pub user_id: Option<i64>,
    pub description: Option<String>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
}
