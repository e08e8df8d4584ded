// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use tracing::warn;

use tallybook::{cli, commands, config::Config, db, logging, server};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut config = Config::from_env()?;
    if let Some(path) = matches.get_one::<std::path::PathBuf>("db") {
        config.db_path = Some(path.clone());
    }
    let serving = matches!(matches.subcommand(), Some(("serve", _)));
    logging::init_tracing(
        if serving { "info" } else { "warn" },
        config.log_json || serving,
    );
    for message in &config.warnings {
        warn!("{}", message);
    }

    let db_path = config.database_path()?;
    let conn = db::open_or_init(&db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db_path.display());
        }
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("subcategory", sub)) => commands::subcategories::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, sub)?,
        Some(("dashboard", sub)) => {
            commands::dashboard::handle(&conn, sub, config.default_top_n)?
        }
        Some(("serve", sub)) => {
            if let Some(addr) = sub.get_one::<String>("listen") {
                config.listen_addr = addr
                    .parse()
                    .with_context(|| format!("Invalid listen address '{}'", addr))?;
            }
            let rt = tokio::runtime::Runtime::new().context("Start async runtime")?;
            rt.block_on(server::serve(config, conn))?;
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
