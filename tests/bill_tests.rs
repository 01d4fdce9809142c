// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fambudg::app::App;
use fambudg::error::Error;
use fambudg::models::{
    AccountType, BillFrequency, BillReminderPatch, CategoryKind, NewAccount, NewBillReminder,
    NewCategory, NewUser, PayBillRequest, Role, TxKind, User,
};
use fambudg::settings::Settings;
use fambudg::store::{accounts, bills, categories, users};
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn setup() -> (TempDir, App, User, i64) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bills.sqlite");
    let app = App::open_at(&path, &Settings::with_database(&path)).unwrap();
    let user = users::insert(
        &app.conn().unwrap(),
        &NewUser {
            name: "Jordan".into(),
            email: "jordan@example.com".into(),
            role: Role::Admin,
        },
    )
    .unwrap();
    let acct = app
        .ledger()
        .open_account(
            user.id,
            &NewAccount {
                name: "Checking".into(),
                r#type: AccountType::Checking,
                currency: "USD".into(),
                opening_balance: 0,
            },
        )
        .unwrap();
    (dir, app, user, acct.id)
}

fn bill(app: &App, frequency: BillFrequency, due: &str, category_id: Option<i64>) -> i64 {
    bills::insert(
        &app.conn().unwrap(),
        &NewBillReminder {
            name: "Rent".into(),
            amount: 85_000,
            due_day: 1,
            frequency,
            category_id,
            account_id: None,
            next_due_date: due.into(),
        },
    )
    .unwrap()
    .id
}

fn pay(app: &App, user: &User, id: i64, account_id: i64) -> Result<(i64, NaiveDate), Error> {
    app.ledger()
        .pay_bill(
            user.id,
            id,
            &PayBillRequest {
                account_id,
                date: "2026-03-01".into(),
            },
        )
        .map(|(tx, b)| (tx.amount, b.next_due_date))
}

#[test]
fn paying_a_monthly_bill_records_expense_and_advances() {
    let (_dir, app, user, acct) = setup();
    let cat = categories::insert(
        &app.conn().unwrap(),
        &NewCategory {
            parent_id: None,
            name: "Housing".into(),
            kind: CategoryKind::Expense,
            icon: None,
            sort_order: 0,
        },
    )
    .unwrap();
    let id = bill(&app, BillFrequency::Monthly, "2026-03-01", Some(cat.id));

    let (tx, updated) = app
        .ledger()
        .pay_bill(
            user.id,
            id,
            &PayBillRequest {
                account_id: acct,
                date: "2026-03-01".into(),
            },
        )
        .unwrap();
    assert_eq!(tx.amount, -85_000);
    assert_eq!(tx.kind, TxKind::Expense);
    assert_eq!(tx.description, "Bill payment: Rent");
    assert_eq!(tx.category_id, Some(cat.id));
    assert_eq!(updated.next_due_date, d(2026, 4, 1));
    assert_eq!(accounts::find_by_id(&app.conn().unwrap(), acct).unwrap().balance, -85_000);
}

#[test]
fn quarterly_and_yearly_bills_advance_by_their_period() {
    let (_dir, app, user, acct) = setup();
    let q = bill(&app, BillFrequency::Quarterly, "2026-03-01", None);
    let y = bill(&app, BillFrequency::Yearly, "2026-03-01", None);
    assert_eq!(pay(&app, &user, q, acct).unwrap().1, d(2026, 6, 1));
    assert_eq!(pay(&app, &user, y, acct).unwrap().1, d(2027, 3, 1));
}

#[test]
fn month_end_due_date_clamps() {
    assert_eq!(BillFrequency::Monthly.advance(d(2026, 1, 31)).unwrap(), d(2026, 2, 28));
    assert_eq!(BillFrequency::Quarterly.advance(d(2026, 11, 30)).unwrap(), d(2027, 2, 28));
}

#[test]
fn inactive_bill_cannot_be_paid() {
    let (_dir, app, user, acct) = setup();
    let id = bill(&app, BillFrequency::Monthly, "2026-03-01", None);
    bills::update(
        &app.conn().unwrap(),
        id,
        &BillReminderPatch {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    let err = pay(&app, &user, id, acct).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let conn = app.conn().unwrap();
    assert_eq!(accounts::find_by_id(&conn, acct).unwrap().balance, 0);
    assert_eq!(bills::find_by_id(&conn, id).unwrap().next_due_date, d(2026, 3, 1));
}

#[test]
fn failed_payment_leaves_due_date_alone() {
    let (_dir, app, user, _acct) = setup();
    let id = bill(&app, BillFrequency::Monthly, "2026-03-01", None);
    let err = pay(&app, &user, id, 777).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        bills::find_by_id(&app.conn().unwrap(), id).unwrap().next_due_date,
        d(2026, 3, 1)
    );
}

#[test]
fn upcoming_includes_overdue_and_skips_inactive() {
    let (_dir, app, _user, _acct) = setup();
    let overdue = bill(&app, BillFrequency::Monthly, "2026-02-20", None);
    let soon = bill(&app, BillFrequency::Monthly, "2026-03-05", None);
    let later = bill(&app, BillFrequency::Monthly, "2026-04-01", None);
    let paused = bill(&app, BillFrequency::Monthly, "2026-03-02", None);
    let conn = app.conn().unwrap();
    bills::update(
        &conn,
        paused,
        &BillReminderPatch {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();

    let ids: Vec<i64> = bills::find_upcoming(&conn, d(2026, 3, 1), 7)
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(ids, vec![overdue, soon]);
    assert!(!ids.contains(&later));
}

#[test]
fn invalid_bills_are_rejected() {
    let (_dir, app, _user, _acct) = setup();
    let conn = app.conn().unwrap();
    let mut new = NewBillReminder {
        name: "Water".into(),
        amount: 0,
        due_day: 10,
        frequency: BillFrequency::Monthly,
        category_id: None,
        account_id: None,
        next_due_date: "2026-03-10".into(),
    };
    assert!(matches!(bills::insert(&conn, &new), Err(Error::Validation(_))));
    new.amount = 1_000;
    new.due_day = 32;
    assert!(matches!(bills::insert(&conn, &new), Err(Error::Validation(_))));
}

#[test]
fn due_day_survives_short_months() {
    let (_dir, app, user, acct) = setup();
    let id = bills::insert(
        &app.conn().unwrap(),
        &NewBillReminder {
            name: "Storage unit".into(),
            amount: 6_000,
            due_day: 31,
            frequency: BillFrequency::Monthly,
            category_id: None,
            account_id: None,
            next_due_date: "2026-01-31".into(),
        },
    )
    .unwrap()
    .id;

    let dues: Vec<NaiveDate> = (0..3).map(|_| pay(&app, &user, id, acct).unwrap().1).collect();
    assert_eq!(dues, vec![d(2026, 2, 28), d(2026, 3, 31), d(2026, 4, 30)]);
    assert_eq!(accounts::find_by_id(&app.conn().unwrap(), acct).unwrap().balance, -18_000);
}

#[test]
fn quarterly_bill_returns_to_its_due_day() {
    let (_dir, app, user, acct) = setup();
    let id = bills::insert(
        &app.conn().unwrap(),
        &NewBillReminder {
            name: "Water".into(),
            amount: 9_000,
            due_day: 30,
            frequency: BillFrequency::Quarterly,
            category_id: None,
            account_id: None,
            next_due_date: "2025-11-30".into(),
        },
    )
    .unwrap()
    .id;

    assert_eq!(pay(&app, &user, id, acct).unwrap().1, d(2026, 2, 28));
    assert_eq!(pay(&app, &user, id, acct).unwrap().1, d(2026, 5, 30));
}
