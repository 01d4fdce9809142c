// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fambudg::{app::App, cli, commands, settings::Settings};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = Settings::load()?;
    // Logs go to stderr so --json output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::open(&settings)?;
    let acting = matches.get_one::<String>("as").map(String::as_str);

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = match &settings.database.path {
                Some(p) => p.clone(),
                None => fambudg::db::db_path()?,
            };
            println!("Database initialized at {}", path.display());
        }
        Some(("user", sub)) => commands::users::handle(&app, acting, sub)?,
        Some((name, sub)) => {
            let user = commands::acting_user(&app, acting)?;
            match name {
                "account" => commands::accounts::handle(&app, &user, sub)?,
                "category" => commands::categories::handle(&app, &user, sub)?,
                "budget" => commands::budgets::handle(&app, &user, sub)?,
                "goal" => commands::goals::handle(&app, &user, sub)?,
                "tx" => commands::transactions::handle(&app, &user, sub)?,
                "transfer" => commands::transfers::handle(&app, &user, sub)?,
                "bill" => commands::bills::handle(&app, &user, sub)?,
                "allowance" => commands::allowances::handle(&app, &user, sub)?,
                "report" => commands::reports::handle(&app, &user, sub)?,
                "import" => commands::importer::handle(&app, &user, sub)?,
                "export" => commands::exporter::handle(&app, &user, sub)?,
                _ => {}
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
