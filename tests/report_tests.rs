// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fambudg::app::App;
use fambudg::models::{
    AccountType, CategoryKind, NewAccount, NewCategory, NewTransaction, NewUser, Role,
    SearchFilters, TxKind,
};
use fambudg::settings::Settings;
use fambudg::store::{categories, reports, users};
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;

struct Family {
    app: App,
    parent: i64,
    child: i64,
    checking: i64,
    groceries: i64,
    fuel: i64,
    _dir: TempDir,
}

fn setup() -> Family {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.sqlite");
    let app = App::open_at(&path, &Settings::with_database(&path)).unwrap();
    let (parent, child, groceries, fuel) = {
        let conn = app.conn().unwrap();
        let member = |name: &str, email: &str, role| {
            users::insert(
                &conn,
                &NewUser {
                    name: name.into(),
                    email: email.into(),
                    role,
                },
            )
            .unwrap()
            .id
        };
        let category = |name: &str| {
            categories::insert(
                &conn,
                &NewCategory {
                    parent_id: None,
                    name: name.into(),
                    kind: CategoryKind::Expense,
                    icon: None,
                    sort_order: 0,
                },
            )
            .unwrap()
            .id
        };
        (
            member("Avery", "avery@example.com", Role::Admin),
            member("Blake", "blake@example.com", Role::Child),
            category("Groceries"),
            category("Fuel"),
        )
    };
    let checking = app
        .ledger()
        .open_account(
            parent,
            &NewAccount {
                name: "Checking".into(),
                r#type: AccountType::Checking,
                currency: "USD".into(),
                opening_balance: 0,
            },
        )
        .unwrap()
        .id;
    Family {
        app,
        parent,
        child,
        checking,
        groceries,
        fuel,
        _dir: dir,
    }
}

fn add(f: &Family, user: i64, amount: i64, category: Option<i64>, date: &str, desc: &str, tags: &[&str]) {
    let kind = if amount < 0 { TxKind::Expense } else { TxKind::Income };
    let mut req = NewTransaction::new(f.checking, amount, kind, date);
    req.category_id = category;
    req.description = desc.into();
    req.tags = tags.iter().map(|t| t.to_string()).collect();
    f.app.ledger().create_transaction(user, &req).unwrap();
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn month_summary_splits_income_and_expense() {
    let f = setup();
    add(&f, f.parent, 300_000, None, "2026-07-01", "Salary", &[]);
    add(&f, f.parent, -4_550, Some(f.groceries), "2026-07-03", "Market", &[]);
    add(&f, f.child, -1_000, Some(f.fuel), "2026-07-31", "Scooter fuel", &[]);
    add(&f, f.parent, -9_999, Some(f.fuel), "2026-08-01", "Next month", &[]);

    let conn = f.app.conn().unwrap();
    let family = reports::month_summary(&conn, None, 2026, 7).unwrap();
    assert_eq!(family.total_income, 300_000);
    assert_eq!(family.total_expense, 5_550);
    assert_eq!(family.net, 294_450);

    let child = reports::month_summary(&conn, Some(f.child), 2026, 7).unwrap();
    assert_eq!(child.total_income, 0);
    assert_eq!(child.total_expense, 1_000);
}

#[test]
fn category_percentages_round_to_two_places() {
    let f = setup();
    add(&f, f.parent, -1_000, Some(f.groceries), "2026-07-02", "a", &[]);
    add(&f, f.parent, -1_000, Some(f.groceries), "2026-07-03", "b", &[]);
    add(&f, f.parent, -1_000, Some(f.fuel), "2026-07-04", "c", &[]);
    // Uncategorised spend is left out of the breakdown.
    add(&f, f.parent, -5_000, None, "2026-07-05", "d", &[]);

    let rows = reports::spending_by_category(&f.app.conn().unwrap(), None, 2026, 7).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category_name, "Groceries");
    assert_eq!(rows[0].total_amount, 2_000);
    assert_eq!(rows[0].percentage, Decimal::from_str("66.67").unwrap());
    assert_eq!(rows[1].percentage, Decimal::from_str("33.33").unwrap());
}

#[test]
fn member_breakdown_lists_everyone() {
    let f = setup();
    add(&f, f.parent, 10_000, None, "2026-07-01", "Pay", &[]);
    add(&f, f.parent, -2_500, None, "2026-07-02", "Lunch", &[]);

    let rows = reports::spending_by_member(&f.app.conn().unwrap(), 2026, 7).unwrap();
    assert_eq!(rows.len(), 2);
    let parent = rows.iter().find(|r| r.user_id == f.parent).unwrap();
    assert_eq!(parent.total_income, 10_000);
    assert_eq!(parent.total_expense, 2_500);
    assert_eq!(parent.net, 7_500);
    let child = rows.iter().find(|r| r.user_id == f.child).unwrap();
    assert_eq!(child.net, 0);
}

#[test]
fn trends_fill_quiet_months_with_zero() {
    let f = setup();
    add(&f, f.parent, -1_000, None, "2026-05-10", "May", &[]);
    add(&f, f.parent, 4_000, None, "2026-07-10", "July", &[]);

    let points = reports::trends(&f.app.conn().unwrap(), None, 3, d(2026, 7, 20)).unwrap();
    let months: Vec<(i32, u32)> = points.iter().map(|p| (p.year, p.month)).collect();
    assert_eq!(months, vec![(2026, 5), (2026, 6), (2026, 7)]);
    assert_eq!(points[0].total_expense, 1_000);
    assert_eq!(points[1].net, 0);
    assert_eq!(points[2].total_income, 4_000);

    let across_year = reports::trends(&f.app.conn().unwrap(), None, 2, d(2026, 1, 5)).unwrap();
    assert_eq!((across_year[0].year, across_year[0].month), (2025, 12));
    assert!(reports::trends(&f.app.conn().unwrap(), None, 0, d(2026, 1, 5)).is_err());
}

#[test]
fn dashboard_shows_accounts_month_and_recent() {
    let f = setup();
    for day in 1..=12 {
        add(&f, f.parent, -100, None, &format!("2026-07-{:02}", day), "Coffee", &[]);
    }
    let dash = reports::dashboard(&f.app.conn().unwrap(), f.parent, d(2026, 7, 15)).unwrap();
    assert_eq!(dash.accounts.len(), 1);
    assert_eq!(dash.accounts[0].balance, -1_200);
    assert_eq!(dash.month_summary.total_expense, 1_200);
    assert_eq!(dash.recent_transactions.len(), 10);
    assert_eq!(dash.recent_transactions[0].date, d(2026, 7, 12));
}

#[test]
fn search_combines_text_amount_and_tags() {
    let f = setup();
    add(&f, f.parent, -2_000, Some(f.groceries), "2026-07-01", "Farmers MARKET", &["food"]);
    add(&f, f.parent, -20_000, Some(f.groceries), "2026-07-02", "Supermarket", &["food", "bulk"]);
    add(&f, f.parent, -3_000, Some(f.fuel), "2026-07-03", "Gas station", &["car"]);
    add(&f, f.parent, -500, None, "2026-07-04", "100% juice", &[]);

    let conn = f.app.conn().unwrap();
    let by_text = reports::search(
        &conn,
        &SearchFilters {
            description: Some("market".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_text.total_count, 2);

    let bounded = reports::search(
        &conn,
        &SearchFilters {
            description: Some("market".into()),
            max_amount: Some(5_000),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(bounded.transactions.len(), 1);
    assert_eq!(bounded.transactions[0].description, "Farmers MARKET");

    let tagged = reports::search(
        &conn,
        &SearchFilters {
            tags: vec!["bulk".into(), "car".into()],
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(tagged.total_count, 2);

    let literal = reports::search(
        &conn,
        &SearchFilters {
            description: Some("100%".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(literal.total_count, 1);
}

#[test]
fn search_caps_results() {
    let f = setup();
    for i in 0..105 {
        add(&f, f.parent, -(i + 1), None, "2026-07-01", "Snack", &[]);
    }
    let found = reports::search(
        &f.app.conn().unwrap(),
        &SearchFilters {
            user_id: Some(f.parent),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(found.total_count, 100);
}
