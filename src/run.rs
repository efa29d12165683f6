use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::chat::{self, Session};
use crate::clock::Clock;
use crate::db::Database;

/// Interactive chat-style session on stdin/stdout. Stands in for the
/// chat transport during local use; one process serves one user.
pub(crate) fn as_repl(db: &mut Database) -> Result<()> {
    let clock = Clock::system();
    let mut session = Session {
        user_id: local_user_id(),
        db,
        clock: &clock,
    };

    match chat::handle_command("/start", &mut session) {
        Ok(reply) => println!("{reply}"),
        Err(e) => tracing::error!("start command failed: {e:#}"),
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        match chat::handle_command(line, &mut session) {
            Ok(reply) => println!("{reply}"),
            Err(e) => {
                // Storage failures are not fatal; keep serving commands.
                tracing::error!("command failed: {e:#}");
                println!("Something went wrong. Your data was not changed.");
            }
        }
    }
    Ok(())
}

/// Run a single command from the argv tail and print its reply.
pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" => {
            println!("spendbot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => {
            let clock = Clock::system();
            let mut session = Session {
                user_id: local_user_id(),
                db,
                clock: &clock,
            };
            let input = args[1..].join(" ");
            let reply = chat::handle_command(&input, &mut session)?;
            println!("{reply}");
            Ok(())
        }
    }
}

fn print_usage() {
    println!("SpendBot — chat-command personal finance tracker");
    println!();
    println!("Usage: spendbot [command...]");
    println!();
    println!("  (none)                Start an interactive session");
    println!("  <chat command>        Run a single command and exit, e.g.:");
    println!("                          spendbot summary");
    println!("                          spendbot in 50k eat morning coffee");
    println!("  --help, -h            Show this help");
    println!("  --version, -V         Show version");
    println!();
    println!("The acting user id is read from SPENDBOT_USER (default 1).");
}

/// The chat transport would supply the user id; local sessions read it
/// from the environment.
fn local_user_id() -> i64 {
    std::env::var("SPENDBOT_USER")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}
