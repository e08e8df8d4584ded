// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
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

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .version(clap::crate_version!())
        .about("Personal finance tracker: categories, transactions, budgets and a 12-month dashboard")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("SQLite database file (overrides TALLYBOOK_DB_PATH)"),
        )
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Category name"))
                        .arg(req("description", "Short description"))
                        .arg(
                            opt("kind", "EXPENSE, INCOME or SAVING")
                                .default_value("EXPENSE"),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(req("id", "Category id").value_parser(value_parser!(i64)))
                        .arg(req("name", "Category name"))
                        .arg(req("description", "Short description"))
                        .arg(opt("kind", "EXPENSE, INCOME or SAVING (unchanged if omitted)")),
                )
                .subcommand(Command::new("rm").arg(req("name", "Category name"))),
        )
        .subcommand(
            Command::new("subcategory")
                .about("Manage sub-categories")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Sub-category name"))
                        .arg(req("category", "Parent category name")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(req("id", "Sub-category id").value_parser(value_parser!(i64)))
                        .arg(req("name", "Sub-category name"))
                        .arg(req("category", "Parent category name")),
                )
                .subcommand(json_args(
                    Command::new("list").arg(opt("category", "Only this parent category")),
                ))
                .subcommand(
                    Command::new("rm")
                        .arg(req("id", "Sub-category id").value_parser(value_parser!(i64))),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .arg(req("date", "YYYY-MM-DD"))
                        .arg(req("amount", "Positive amount, e.g. 12.50"))
                        .arg(req("description", "What it was for"))
                        .arg(opt("kind", "EXPENSE or INCOME").default_value("EXPENSE"))
                        .arg(req("category", "Category name"))
                        .arg(req("subcategory", "Sub-category name")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(req("id", "Transaction id").value_parser(value_parser!(i64)))
                        .arg(req("date", "YYYY-MM-DD"))
                        .arg(req("amount", "Positive amount, e.g. 12.50"))
                        .arg(req("description", "What it was for"))
                        .arg(opt("kind", "EXPENSE or INCOME; must match the stored type"))
                        .arg(req("category", "Category name"))
                        .arg(req("subcategory", "Sub-category name")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(opt("kind", "EXPENSE or INCOME"))
                        .arg(opt("from", "Start date YYYY-MM-DD"))
                        .arg(opt("to", "End date YYYY-MM-DD"))
                        .arg(opt("category", "Category name"))
                        .arg(opt("subcategory", "Sub-category name"))
                        .arg(opt("min", "Minimum amount"))
                        .arg(opt("max", "Maximum amount"))
                        .arg(
                            opt("sort", "date, amount, category or subcategory")
                                .default_value("date"),
                        )
                        .arg(
                            Arg::new("asc")
                                .long("asc")
                                .action(ArgAction::SetTrue)
                                .help("Ascending order"),
                        )
                        .arg(
                            opt("page", "Zero-based page")
                                .value_parser(value_parser!(usize))
                                .default_value("0"),
                        )
                        .arg(
                            opt("size", "Page size (1-200)")
                                .value_parser(value_parser!(usize))
                                .default_value("10"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("show")
                        .arg(req("id", "Transaction id").value_parser(value_parser!(i64))),
                ))
                .subcommand(
                    Command::new("rm")
                        .arg(req("id", "Transaction id").value_parser(value_parser!(i64))),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Manage budgets")
                .subcommand(
                    Command::new("set")
                        .arg(req("name", "Budget name"))
                        .arg(req("amount", "Amount, at least 0.01"))
                        .arg(
                            opt("period", "DAILY, WEEKLY, MONTHLY or YEARLY")
                                .default_value("MONTHLY"),
                        )
                        .arg(
                            Arg::new("default")
                                .long("default")
                                .action(ArgAction::SetTrue)
                                .help("Mark as the default budget"),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("rm").arg(req("name", "Budget name"))),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Rolling 12-month summary")
                .subcommand(json_args(
                    Command::new("summary")
                        .arg(
                            Arg::new("top-n")
                                .long("top-n")
                                .value_parser(value_parser!(i64))
                                .help("Number of yearly category trends (1-10)"),
                        )
                        .arg(opt("today", "Reference date YYYY-MM-DD (defaults to today)")),
                )),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the JSON API")
                .arg(opt("listen", "Listen address (overrides TALLYBOOK_LISTEN_ADDR)")),
        )
}
