// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn amount(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .allow_hyphen_values(true)
        .help(help)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn family_flag() -> Arg {
    Arg::new("family")
        .long("family")
        .action(ArgAction::SetTrue)
        .help("Aggregate over every family member")
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Family members and roles")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("role")
                        .long("role")
                        .default_value("member")
                        .help("admin | member | child"),
                ),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(
            Command::new("role")
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("role").long("role").required(true)),
        )
        .subcommand(Command::new("rm").arg(Arg::new("email").long("email").required(true)))
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Accounts")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("checking | savings | credit | cash"),
                )
                .arg(Arg::new("currency").long("currency").default_value("USD"))
                .arg(amount("opening", "Opening balance, e.g. 1250.00")),
        )
        .subcommand(json_flags(
            Command::new("list").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("List every member's accounts"),
            ),
        ))
        .subcommand(
            Command::new("update")
                .arg(Arg::new("account").required(true).help("Account id or name"))
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("currency").long("currency")),
        )
        .subcommand(Command::new("rm").arg(Arg::new("account").required(true)))
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("kind").long("kind").default_value("expense"))
                .arg(Arg::new("parent").long("parent"))
                .arg(Arg::new("icon").long("icon"))
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_parser(value_parser!(i64))
                        .default_value("0"),
                ),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(
            Command::new("update")
                .arg(Arg::new("category").required(true))
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("sort").long("sort").value_parser(value_parser!(i64))),
        )
        .subcommand(Command::new("rm").arg(Arg::new("category").required(true)))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("date").long("date").required(true))
                .arg(Arg::new("account").long("account").required(true))
                .arg(amount("amount", "Signed amount: negative = outflow").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("expense")
                        .help("expense | income | transfer"),
                )
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description").default_value(""))
                .arg(Arg::new("to").long("to").help("Transfer destination account"))
                .arg(Arg::new("shared").long("shared").action(ArgAction::SetTrue))
                .arg(Arg::new("tags").long("tags").help("Comma-separated"))
                .arg(
                    Arg::new("recurring")
                        .long("recurring")
                        .help("daily | weekly | monthly | yearly"),
                )
                .arg(
                    Arg::new("day")
                        .long("day")
                        .requires("recurring")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("weekday")
                        .long("weekday")
                        .requires("recurring")
                        .value_parser(value_parser!(u32))
                        .help("0 = Sunday"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list")
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("kind").long("kind"))
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to"))
                .arg(Arg::new("month").long("month").conflicts_with_all(["from", "to"]))
                .arg(
                    Arg::new("shared")
                        .long("shared")
                        .value_parser(value_parser!(bool)),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(json_flags(Command::new("show").arg(id_arg())))
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("category").long("category"))
                .arg(amount("amount", "New signed amount"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date"))
                .arg(
                    Arg::new("shared")
                        .long("shared")
                        .value_parser(value_parser!(bool)),
                )
                .arg(Arg::new("tags").long("tags")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(json_flags(
            Command::new("generate")
                .about("Materialise recurring occurrences up to a date")
                .arg(Arg::new("until").long("until").required(true)),
        ))
}

fn transfer_cmd() -> Command {
    json_flags(
        Command::new("transfer")
            .about("Move money between two accounts")
            .arg(Arg::new("from").long("from").required(true))
            .arg(Arg::new("to").long("to").required(true))
            .arg(amount("amount", "Positive amount").required(true))
            .arg(Arg::new("date").long("date").required(true))
            .arg(Arg::new("description").long("description").default_value("")),
    )
}

fn bill_cmd() -> Command {
    Command::new("bill")
        .about("Bill reminders")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(amount("amount", "Positive amount").required(true))
                .arg(
                    Arg::new("due-day")
                        .long("due-day")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("frequency")
                        .long("frequency")
                        .default_value("monthly")
                        .help("monthly | quarterly | yearly"),
                )
                .arg(Arg::new("next-due").long("next-due").required(true))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("account").long("account")),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(json_flags(
            Command::new("upcoming")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .value_parser(value_parser!(u32))
                        .default_value("7"),
                )
                .arg(Arg::new("today").long("today")),
        ))
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(amount("amount", "Positive amount"))
                .arg(
                    Arg::new("due-day")
                        .long("due-day")
                        .value_parser(value_parser!(u32)),
                )
                .arg(Arg::new("frequency").long("frequency"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("account").long("account"))
                .arg(
                    Arg::new("active")
                        .long("active")
                        .value_parser(value_parser!(bool)),
                ),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(json_flags(
            Command::new("pay")
                .arg(id_arg())
                .arg(Arg::new("account").long("account").required(true))
                .arg(Arg::new("date").long("date").required(true)),
        ))
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly category budgets")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .arg(Arg::new("month").long("month").required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(amount("amount", "Positive amount").required(true)),
        )
        .subcommand(json_flags(
            Command::new("list").arg(Arg::new("month").long("month")),
        ))
        .subcommand(json_flags(
            Command::new("summary").arg(Arg::new("month").long("month").required(true)),
        ))
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Saving goals")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(amount("target", "Target amount").required(true))
                .arg(Arg::new("date").long("date"))
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .value_parser(value_parser!(i64))
                        .default_value("1"),
                ),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(
            Command::new("contribute")
                .arg(id_arg())
                .arg(amount("amount", "Positive amount").required(true)),
        )
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(amount("target", "Target amount"))
                .arg(Arg::new("date").long("date"))
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("status").long("status")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn allowance_cmd() -> Command {
    Command::new("allowance")
        .about("Allowances for children")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .arg(Arg::new("user").long("user").required(true).help("Member email"))
                .arg(amount("amount", "Positive amount").required(true))
                .arg(Arg::new("start").long("start").required(true)),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(json_flags(
            Command::new("status").arg(Arg::new("user").long("user")),
        ))
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(amount("amount", "Positive amount"))
                .arg(Arg::new("start").long("start")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Reports")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("monthly")
                .arg(Arg::new("month").long("month").required(true))
                .arg(family_flag()),
        ))
        .subcommand(json_flags(
            Command::new("by-category")
                .arg(Arg::new("month").long("month").required(true))
                .arg(family_flag()),
        ))
        .subcommand(json_flags(
            Command::new("by-member").arg(Arg::new("month").long("month").required(true)),
        ))
        .subcommand(json_flags(
            Command::new("trends")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(u32))
                        .default_value("6"),
                )
                .arg(Arg::new("today").long("today"))
                .arg(family_flag()),
        ))
        .subcommand(json_flags(
            Command::new("dashboard").arg(Arg::new("today").long("today")),
        ))
        .subcommand(json_flags(
            Command::new("search")
                .arg(Arg::new("q").long("q").help("Description contains"))
                .arg(amount("min", "Minimum absolute amount"))
                .arg(amount("max", "Maximum absolute amount"))
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("tags").long("tags"))
                .arg(family_flag()),
        ))
}

fn date_range(cmd: Command) -> Command {
    cmd.arg(Arg::new("from").long("from"))
        .arg(Arg::new("to").long("to"))
}

pub fn build_cli() -> Command {
    Command::new("fambudg")
        .about("Family budgeting ledger")
        .version(clap::crate_version!())
        .arg(
            Arg::new("as")
                .long("as")
                .global(true)
                .help("Act as the member with this email (default: first admin)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(user_cmd())
        .subcommand(account_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(transfer_cmd())
        .subcommand(bill_cmd())
        .subcommand(budget_cmd())
        .subcommand(goal_cmd())
        .subcommand(allowance_cmd())
        .subcommand(report_cmd())
        .subcommand(
            Command::new("import")
                .about("Import data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(date_range(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )),
        )
}
