// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fambudg::app::App;
use fambudg::commands::importer;
use fambudg::models::{
    AccountType, CategoryKind, NewAccount, NewCategory, NewUser, Role, TxKind, User,
};
use fambudg::settings::Settings;
use fambudg::store::{accounts, categories, users};
use fambudg::{cli, commands};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn setup() -> (TempDir, App, User) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("import.sqlite");
    let app = App::open_at(&path, &Settings::with_database(&path)).unwrap();
    let user = {
        let conn = app.conn().unwrap();
        categories::insert(
            &conn,
            &NewCategory {
                parent_id: None,
                name: "Groceries".into(),
                kind: CategoryKind::Expense,
                icon: None,
                sort_order: 0,
            },
        )
        .unwrap();
        users::insert(
            &conn,
            &NewUser {
                name: "Drew".into(),
                email: "drew@example.com".into(),
                role: Role::Admin,
            },
        )
        .unwrap()
    };
    for name in ["A1", "Savings"] {
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
            .unwrap();
    }
    (dir, app, user)
}

fn balance_of(app: &App, user: &User, name: &str) -> i64 {
    accounts::find_by_user(&app.conn().unwrap(), user.id)
        .unwrap()
        .into_iter()
        .find(|a| a.name == name)
        .unwrap()
        .balance
}

#[test]
fn importer_trims_cli_path_argument() {
    let (_dir, app, user) = setup();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,amount,type,description,category,account,is_shared,tags,transfer_to\n\
         2026-02-03,-500,expense,Shop,,A1,,,"
    )
    .unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let padded = format!("  {}  ", path);
    let matches =
        cli::build_cli().get_matches_from(["fambudg", "import", "transactions", "--path", &padded]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&app, &user, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }
    assert_eq!(balance_of(&app, &user, "A1"), -500);
}

#[test]
fn rows_go_through_the_ledger_and_resolve_names() {
    let (_dir, app, user) = setup();
    let csv = "date,amount,type,description,category,account,is_shared,tags,transfer_to\n\
               2026-02-01,250000,income,Salary,,A1,false,,\n\
               2026-02-02,-4550,expense,Market,Groceries,A1,,\"food,weekly\",\n\
               2026-02-03,-10000,transfer,Save,,A1,true,,Savings\n";
    let summary = importer::import_transactions(&app, &user, csv.as_bytes()).unwrap();
    assert_eq!(summary.imported, 3);
    assert!(summary.errors.is_empty());

    assert_eq!(balance_of(&app, &user, "A1"), 250_000 - 4_550 - 10_000);
    assert_eq!(balance_of(&app, &user, "Savings"), 10_000);

    let rows = app.ledger().list_transactions(user.id, &Default::default()).unwrap();
    let market = rows.iter().find(|t| t.description == "Market").unwrap();
    assert_eq!(market.tags, vec!["food", "weekly"]);
    assert!(market.category_id.is_some());
    assert!(market.is_shared);
    let salary = rows.iter().find(|t| t.description == "Salary").unwrap();
    assert!(!salary.is_shared);
    let save = rows.iter().find(|t| t.kind == TxKind::Transfer).unwrap();
    assert!(save.transfer_to_account_id.is_some());
}

#[test]
fn bad_rows_are_reported_and_skipped() {
    let (_dir, app, user) = setup();
    let csv = "date,amount,type,description,category,account,is_shared,tags,transfer_to\n\
               2026-02-01,-100,expense,ok,,A1,,,\n\
               2026-02-31,-100,expense,bad date,,A1,,,\n\
               2026-02-02,12.5,expense,bad amount,,A1,,,\n\
               2026-02-02,-100,expense,no account,,Nope,,,\n\
               2026-02-02,-100\n\
               2026-02-03,-200,expense,ok too,Groceries,A1,,,\n";
    let summary = importer::import_transactions(&app, &user, csv.as_bytes()).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors.len(), 4);
    assert!(summary.errors[0].starts_with("row 3:"));
    assert!(summary.errors[1].starts_with("row 4:"));
    assert!(summary.errors[2].starts_with("row 5:"));
    assert!(summary.errors[3].starts_with("row 6:"));
    assert_eq!(balance_of(&app, &user, "A1"), -300);
}

#[test]
fn export_then_import_replays_the_ledger() {
    let (_dir, app, user) = setup();
    let csv = "date,amount,type,description,category,account,is_shared,tags,transfer_to\n\
               2026-02-01,-700,expense,Bus,,A1,,,\n\
               2026-02-05,-300,transfer,Move,,A1,,,Savings\n";
    importer::import_transactions(&app, &user, csv.as_bytes()).unwrap();

    let mut data = app.ledger().list_transactions(user.id, &Default::default()).unwrap();
    data.reverse();
    let mut out = Vec::new();
    commands::exporter::write_csv(&mut out, &data).unwrap();

    let summary = importer::import_transactions(&app, &user, out.as_slice()).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(balance_of(&app, &user, "A1"), -2_000);
    assert_eq!(balance_of(&app, &user, "Savings"), 600);
}
