// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fambudg::app::App;
use fambudg::error::Error;
use fambudg::models::{
    AccountType, NewAccount, NewTransaction, NewUser, Role, TransactionPatch, TransferRequest,
    TxKind, User,
};
use fambudg::settings::Settings;
use fambudg::store::{accounts, transactions, users};
use tempfile::TempDir;

fn setup() -> (TempDir, App, User) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.sqlite");
    let app = App::open_at(&path, &Settings::with_database(&path)).unwrap();
    let user = users::insert(
        &app.conn().unwrap(),
        &NewUser {
            name: "Alex".into(),
            email: "alex@example.com".into(),
            role: Role::Admin,
        },
    )
    .unwrap();
    (dir, app, user)
}

fn account(app: &App, user: &User, name: &str) -> i64 {
    app.ledger()
        .open_account(
            user.id,
            &NewAccount {
                name: name.into(),
                r#type: AccountType::Checking,
                currency: "USD".into(),
                opening_balance: 0,
            },
        )
        .unwrap()
        .id
}

fn balance(app: &App, id: i64) -> i64 {
    accounts::find_by_id(&app.conn().unwrap(), id).unwrap().balance
}

fn assert_invariant(app: &App, ids: &[i64]) {
    let conn = app.conn().unwrap();
    for &id in ids {
        let stored = accounts::find_by_id(&conn, id).unwrap().balance;
        assert_eq!(stored, transactions::ledger_sum(&conn, id).unwrap(), "account {}", id);
    }
}

#[test]
fn expense_income_then_delete_expense() {
    let (_dir, app, user) = setup();
    let x = account(&app, &user, "X");
    assert_eq!(balance(&app, x), 0);

    let expense = app
        .ledger()
        .create_transaction(user.id, &NewTransaction::new(x, -5000, TxKind::Expense, "2026-01-05"))
        .unwrap();
    assert_eq!(balance(&app, x), -5000);

    app.ledger()
        .create_transaction(user.id, &NewTransaction::new(x, 20000, TxKind::Income, "2026-01-06"))
        .unwrap();
    assert_eq!(balance(&app, x), 15000);

    app.ledger().delete_transaction(expense.id).unwrap();
    assert_eq!(balance(&app, x), 20000);
    assert_invariant(&app, &[x]);
}

#[test]
fn delete_restores_pre_create_balance() {
    let (_dir, app, user) = setup();
    let a = account(&app, &user, "A");
    app.ledger()
        .create_transaction(user.id, &NewTransaction::new(a, 700, TxKind::Income, "2026-02-01"))
        .unwrap();
    let before = balance(&app, a);
    let t = app
        .ledger()
        .create_transaction(user.id, &NewTransaction::new(a, -1234, TxKind::Expense, "2026-02-02"))
        .unwrap();
    app.ledger().delete_transaction(t.id).unwrap();
    assert_eq!(balance(&app, a), before);
    assert!(app.ledger().get_transaction(t.id).unwrap_err().is_not_found());
}

#[test]
fn update_moves_amount_between_accounts() {
    let (_dir, app, user) = setup();
    let a = account(&app, &user, "A");
    let b = account(&app, &user, "B");
    let t = app
        .ledger()
        .create_transaction(user.id, &NewTransaction::new(a, -300, TxKind::Expense, "2026-03-01"))
        .unwrap();

    let updated = app
        .ledger()
        .update_transaction(
            t.id,
            &TransactionPatch {
                account_id: Some(b),
                amount: Some(-900),
                description: Some("moved".into()),
                ..TransactionPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.account_id, b);
    assert_eq!(updated.description, "moved");
    assert_eq!(balance(&app, a), 0);
    assert_eq!(balance(&app, b), -900);
    assert_invariant(&app, &[a, b]);
}

#[test]
fn update_without_money_fields_keeps_balance() {
    let (_dir, app, user) = setup();
    let a = account(&app, &user, "A");
    let t = app
        .ledger()
        .create_transaction(user.id, &NewTransaction::new(a, -300, TxKind::Expense, "2026-03-01"))
        .unwrap();
    let updated = app
        .ledger()
        .update_transaction(
            t.id,
            &TransactionPatch {
                date: Some("2026-03-09".into()),
                tags: Some(vec!["food".into()]),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.date.to_string(), "2026-03-09");
    assert_eq!(updated.tags, vec!["food".to_string()]);
    assert_eq!(balance(&app, a), -300);
}

#[test]
fn transfer_amount_edit_is_rejected() {
    let (_dir, app, user) = setup();
    let a = account(&app, &user, "A");
    let b = account(&app, &user, "B");
    let t = app
        .ledger()
        .create_transfer(
            user.id,
            &TransferRequest {
                from_account_id: a,
                to_account_id: b,
                amount: 1000,
                description: "savings".into(),
                date: "2026-04-01".into(),
            },
        )
        .unwrap();

    let err = app
        .ledger()
        .update_transaction(
            t.id,
            &TransactionPatch {
                amount: Some(-2000),
                ..TransactionPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(balance(&app, a), -1000);
    assert_eq!(balance(&app, b), 1000);

    // Non-money fields remain editable.
    app.ledger()
        .update_transaction(
            t.id,
            &TransactionPatch {
                description: Some("rainy day".into()),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
    assert_invariant(&app, &[a, b]);
}

#[test]
fn transfer_kind_requires_distinct_destination() {
    let (_dir, app, user) = setup();
    let a = account(&app, &user, "A");
    let b = account(&app, &user, "B");

    let missing = NewTransaction::new(a, -100, TxKind::Transfer, "2026-01-01");
    assert!(matches!(
        app.ledger().create_transaction(user.id, &missing),
        Err(Error::Validation(_))
    ));

    let mut same = NewTransaction::new(a, -100, TxKind::Transfer, "2026-01-01");
    same.transfer_to_account_id = Some(a);
    assert!(matches!(
        app.ledger().create_transaction(user.id, &same),
        Err(Error::Validation(_))
    ));

    let mut stray = NewTransaction::new(a, -100, TxKind::Expense, "2026-01-01");
    stray.transfer_to_account_id = Some(b);
    assert!(matches!(
        app.ledger().create_transaction(user.id, &stray),
        Err(Error::Validation(_))
    ));

    assert_eq!(balance(&app, a), 0);
    assert_eq!(balance(&app, b), 0);
}

#[test]
fn bad_input_writes_nothing() {
    let (_dir, app, user) = setup();
    let a = account(&app, &user, "A");

    let bad_date = NewTransaction::new(a, -100, TxKind::Expense, "2026-13-01");
    assert!(matches!(
        app.ledger().create_transaction(user.id, &bad_date),
        Err(Error::Validation(_))
    ));

    let missing_account = NewTransaction::new(9999, -100, TxKind::Expense, "2026-01-01");
    assert!(
        app.ledger()
            .create_transaction(user.id, &missing_account)
            .unwrap_err()
            .is_not_found()
    );

    let rows = app
        .ledger()
        .list_transactions(user.id, &Default::default())
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(balance(&app, a), 0);
}

#[test]
fn opening_balance_is_a_ledger_entry() {
    let (_dir, app, user) = setup();
    let acct = app
        .ledger()
        .open_account(
            user.id,
            &NewAccount {
                name: "Wallet".into(),
                r#type: AccountType::Cash,
                currency: "eur".into(),
                opening_balance: 4200,
            },
        )
        .unwrap();
    assert_eq!(acct.balance, 4200);
    assert_eq!(acct.currency, "EUR");
    assert_invariant(&app, &[acct.id]);

    let err = accounts::delete(&app.conn().unwrap(), acct.id).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn mixed_sequence_keeps_invariant() {
    let (_dir, app, user) = setup();
    let a = account(&app, &user, "A");
    let b = account(&app, &user, "B");
    let c = account(&app, &user, "C");
    let l = app.ledger();

    let t1 = l
        .create_transaction(user.id, &NewTransaction::new(a, 50_000, TxKind::Income, "2026-01-01"))
        .unwrap();
    let t2 = l
        .create_transfer(
            user.id,
            &TransferRequest {
                from_account_id: a,
                to_account_id: b,
                amount: 12_500,
                description: String::new(),
                date: "2026-01-02".into(),
            },
        )
        .unwrap();
    let t3 = l
        .create_transaction(user.id, &NewTransaction::new(b, -2_000, TxKind::Expense, "2026-01-03"))
        .unwrap();
    l.update_transaction(
        t3.id,
        &TransactionPatch {
            account_id: Some(c),
            ..TransactionPatch::default()
        },
    )
    .unwrap();
    l.update_transaction(
        t1.id,
        &TransactionPatch {
            amount: Some(45_000),
            ..TransactionPatch::default()
        },
    )
    .unwrap();
    l.delete_transaction(t2.id).unwrap();

    assert_eq!(balance(&app, a), 45_000);
    assert_eq!(balance(&app, b), 0);
    assert_eq!(balance(&app, c), -2_000);
    assert_invariant(&app, &[a, b, c]);
}
