// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fambudg::app::App;
use fambudg::error::Error;
use fambudg::models::{GoalStatus, NewSavingGoal, SavingGoalPatch};
use fambudg::settings::Settings;
use fambudg::store::goals;
use tempfile::TempDir;

fn setup() -> (TempDir, App) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goals.sqlite");
    let app = App::open_at(&path, &Settings::with_database(&path)).unwrap();
    (dir, app)
}

fn goal(name: &str, target: i64, priority: i64) -> NewSavingGoal {
    NewSavingGoal {
        name: name.into(),
        target_amount: target,
        target_date: None,
        priority,
    }
}

#[test]
fn contributions_complete_the_goal() {
    let (_dir, app) = setup();
    let conn = app.conn().unwrap();
    let g = goals::insert(&conn, &goal("Holiday", 100_000, 1)).unwrap();
    assert_eq!(g.status, GoalStatus::Active);

    let g = goals::contribute(&conn, g.id, 60_000).unwrap();
    assert_eq!(g.current_amount, 60_000);
    assert_eq!(g.status, GoalStatus::Active);

    let g = goals::contribute(&conn, g.id, 40_000).unwrap();
    assert_eq!(g.current_amount, 100_000);
    assert_eq!(g.status, GoalStatus::Completed);

    let err = goals::contribute(&conn, g.id, 1).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn non_positive_contribution_is_rejected() {
    let (_dir, app) = setup();
    let conn = app.conn().unwrap();
    let g = goals::insert(&conn, &goal("Bike", 30_000, 2)).unwrap();
    assert!(matches!(goals::contribute(&conn, g.id, 0), Err(Error::Validation(_))));
    assert_eq!(goals::find_by_id(&conn, g.id).unwrap().current_amount, 0);
}

#[test]
fn goals_list_by_priority() {
    let (_dir, app) = setup();
    let conn = app.conn().unwrap();
    goals::insert(&conn, &goal("Car", 500_000, 3)).unwrap();
    goals::insert(&conn, &goal("Emergency fund", 300_000, 1)).unwrap();
    let names: Vec<String> = goals::find_all(&conn).unwrap().into_iter().map(|g| g.name).collect();
    assert_eq!(names, vec!["Emergency fund", "Car"]);
}

#[test]
fn cancelled_goal_accepts_no_contributions() {
    let (_dir, app) = setup();
    let conn = app.conn().unwrap();
    let g = goals::insert(&conn, &goal("Piano", 200_000, 1)).unwrap();
    let g = goals::update(
        &conn,
        g.id,
        &SavingGoalPatch {
            status: Some(GoalStatus::Cancelled),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(g.status, GoalStatus::Cancelled);
    assert!(goals::contribute(&conn, g.id, 100).is_err());
    goals::delete(&conn, g.id).unwrap();
    assert!(goals::find_by_id(&conn, g.id).unwrap_err().is_not_found());
}
