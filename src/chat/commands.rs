use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::amount;
use crate::clock::Clock;
use crate::db::Database;
use crate::models::{category, Budget, Kind, Transaction};

use super::format::{format_short_date, format_vnd, progress_bar};

const DEFAULT_HISTORY_LIMIT: u32 = 15;
const MAX_HISTORY_LIMIT: u32 = 50;
const CLEAR_PASSWORD: &str = "deleteall";

/// One user's view of the tracker: who is asking, plus the shared
/// storage and time source. The transport supplies the user id; locally
/// it comes from the environment.
pub(crate) struct Session<'a> {
    pub(crate) user_id: i64,
    pub(crate) db: &'a mut Database,
    pub(crate) clock: &'a Clock,
}

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut Session<'_>) -> Result<String>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("start", "Welcome message", cmd_start, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "in",
        "Record income (e.g. /in 5m wrk May salary)",
        cmd_income,
        r
    );
    register_command!(
        "out",
        "Record an expense (e.g. /out 50 eat morning coffee)",
        cmd_expense,
        r
    );
    register_command!(
        "summary",
        "Monthly summary (e.g. /summary or /summary 2024-01)",
        cmd_summary,
        r
    );
    register_command!(
        "budget",
        "Set a monthly budget (e.g. /budget eat 1m)",
        cmd_budget,
        r
    );
    register_command!("status", "Budget status for this month", cmd_status, r);
    register_command!(
        "history",
        "Recent transactions (e.g. /history 20)",
        cmd_history,
        r
    );
    register_command!("delete", "Delete the last transaction", cmd_delete, r);
    register_command!(
        "clear",
        "Wipe all your data (/clear deleteall)",
        cmd_clear,
        r
    );
    register_command!(
        "categories",
        "List income/expense categories",
        cmd_categories,
        r
    );

    r
});

/// Entry point for the chat layer: map one line of user text to a reply.
/// User mistakes (bad amount, bad category, missing arguments) come back
/// as reply text; only storage failures are `Err`.
pub(crate) fn handle_command(input: &str, session: &mut Session<'_>) -> Result<String> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("").to_lowercase();
    let args = parts.next().unwrap_or("").trim();

    tracing::debug!(user_id = session.user_id, command = %cmd_name, "dispatching command");

    if let Some(cmd) = COMMANDS.get(cmd_name.as_str()) {
        (cmd.run)(args, session)
    } else {
        let suggestion = find_closest(&cmd_name);
        Ok(format!(
            "Unknown command: /{cmd_name}. Did you mean /{suggestion}?"
        ))
    }
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_start(_args: &str, _session: &mut Session<'_>) -> Result<String> {
    Ok("Welcome to SpendBot!\n\
        Record income with /in and expenses with /out, set monthly budgets\n\
        with /budget, and check /summary, /status, and /history.\n\
        Type /help for the full command list."
        .to_string())
}

fn cmd_help(_args: &str, _session: &mut Session<'_>) -> Result<String> {
    let mut names: Vec<&&str> = COMMANDS.keys().collect();
    names.sort();

    let mut reply = String::from("Commands:\n");
    for name in names {
        if let Some(cmd) = COMMANDS.get(*name) {
            reply.push_str(&format!("  /{name:<10} {}\n", cmd.description));
        }
    }
    reply.push_str(
        "\nAmounts: a bare number means thousands (50 = 50,000 VND),\n\
         'k' means thousands (50k), 'm' means millions (5m).\n\
         Examples:\n\
         \x20 /in 5m wrk May salary\n\
         \x20 /out 50 eat morning coffee\n\
         \x20 /budget eat 1m",
    );
    Ok(reply)
}

fn cmd_income(args: &str, session: &mut Session<'_>) -> Result<String> {
    record_transaction(Kind::Income, args, session)
}

fn cmd_expense(args: &str, session: &mut Session<'_>) -> Result<String> {
    record_transaction(Kind::Expense, args, session)
}

fn record_transaction(kind: Kind, args: &str, session: &mut Session<'_>) -> Result<String> {
    let mut parts = args.split_whitespace();
    let (Some(amount_text), Some(code)) = (parts.next(), parts.next()) else {
        let verb = match kind {
            Kind::Income => "in",
            Kind::Expense => "out",
        };
        return Ok(format!(
            "Usage: /{verb} <amount> <category> [description]\n\
             Example: /{verb} 50k eat morning coffee"
        ));
    };
    let description: String = parts.collect::<Vec<_>>().join(" ");

    let amount = match amount::parse_amount(amount_text) {
        Ok(a) => a,
        Err(e) => return Ok(e.to_string()),
    };
    if amount <= Decimal::ZERO {
        return Ok("Amount must be greater than zero.".to_string());
    }

    let code = code.to_lowercase();
    if !category::is_valid(kind, &code) {
        return Ok(invalid_category_reply(kind));
    }

    let txn = Transaction::new(
        session.user_id,
        kind,
        amount,
        code.clone(),
        description.clone(),
        session.clock.timestamp(),
    );
    session.db.insert_transaction(&txn)?;

    Ok(format!(
        "Recorded {}: {}\nCategory: {}\nDescription: {}",
        kind.as_str(),
        format_vnd(amount),
        category::label(kind, &code),
        if description.is_empty() {
            "(none)"
        } else {
            description.as_str()
        },
    ))
}

fn invalid_category_reply(kind: Kind) -> String {
    let mut reply = format!("Invalid {} category. Choose one of:\n", kind.as_str());
    for (code, label) in category::catalog(kind) {
        reply.push_str(&format!("  {code} - {label}\n"));
    }
    reply.trim_end().to_string()
}

fn cmd_summary(args: &str, session: &mut Session<'_>) -> Result<String> {
    let month = match args.split_whitespace().next() {
        Some(arg) => match parse_month(arg) {
            Some(m) => m,
            None => return Ok(format!("Invalid month: '{arg}'. Use YYYY-MM, e.g. 2024-01.")),
        },
        None => session.clock.month(),
    };

    let (income, expenses) = session.db.monthly_summary(session.user_id, &month)?;
    if income.is_empty() && expenses.is_empty() {
        return Ok(format!("No transactions recorded for {month}."));
    }

    let mut reply = format!("Summary for {month}:\n");

    let mut total_income = Decimal::ZERO;
    if !income.is_empty() {
        reply.push_str("\nIncome:\n");
        for (code, total) in &income {
            reply.push_str(&format!(
                "  {:<14} {}\n",
                category::label(Kind::Income, code),
                format_vnd(*total),
            ));
            total_income += *total;
        }
        reply.push_str(&format!("Total income: {}\n", format_vnd(total_income)));
    }

    let mut total_expenses = Decimal::ZERO;
    if !expenses.is_empty() {
        reply.push_str("\nExpenses:\n");
        for (code, total) in &expenses {
            reply.push_str(&format!(
                "  {:<14} {}\n",
                category::label(Kind::Expense, code),
                format_vnd(*total),
            ));
            total_expenses += *total;
        }
        reply.push_str(&format!("Total expenses: {}\n", format_vnd(total_expenses)));
    }

    reply.push_str(&format!(
        "\nBalance: {}",
        format_vnd(total_income - total_expenses)
    ));
    Ok(reply)
}

/// Strict "YYYY-MM" validation; rejects unpadded or out-of-range months.
fn parse_month(arg: &str) -> Option<String> {
    NaiveDate::parse_from_str(&format!("{arg}-01"), "%Y-%m-%d").ok()?;
    (arg.len() == 7).then(|| arg.to_string())
}

fn cmd_budget(args: &str, session: &mut Session<'_>) -> Result<String> {
    let mut parts = args.split_whitespace();
    let (Some(code), Some(amount_text), None) = (parts.next(), parts.next(), parts.next()) else {
        return Ok("Usage: /budget <category> <amount>\nExample: /budget eat 1m".to_string());
    };

    let code = code.to_lowercase();
    if !category::is_valid(Kind::Expense, &code) {
        return Ok(invalid_category_reply(Kind::Expense));
    }

    let amount = match amount::parse_amount(amount_text) {
        Ok(a) => a,
        Err(e) => return Ok(e.to_string()),
    };
    if amount < Decimal::ZERO {
        return Ok("Budget amount cannot be negative.".to_string());
    }

    let month = session.clock.month();
    let budget = Budget::new(session.user_id, code.clone(), amount, month.clone());
    session.db.upsert_budget(&budget)?;

    Ok(format!(
        "Budget set: {} for {} in {month}",
        format_vnd(amount),
        category::label(Kind::Expense, &code),
    ))
}

fn cmd_status(_args: &str, session: &mut Session<'_>) -> Result<String> {
    let month = session.clock.month();
    let statuses = session.db.budget_status(session.user_id, &month)?;
    if statuses.is_empty() {
        return Ok(
            "No budgets set for this month. Use /budget <category> <amount> to set one."
                .to_string(),
        );
    }

    let mut reply = format!("Budget status for {month}:\n");
    for status in &statuses {
        reply.push_str(&format!(
            "\n{} {}\n  Budget: {}\n  Spent: {} ({:.1}%)\n  Remaining: {}\n",
            progress_bar(status.percentage / 100.0, 10),
            category::label(Kind::Expense, &status.category),
            format_vnd(status.budget),
            format_vnd(status.spent),
            status.percentage,
            format_vnd(status.remaining),
        ));
    }
    Ok(reply.trim_end().to_string())
}

fn cmd_history(args: &str, session: &mut Session<'_>) -> Result<String> {
    let limit = match args.split_whitespace().next() {
        Some(arg) => match arg.parse::<u32>() {
            Ok(n) if n > 0 => n.min(MAX_HISTORY_LIMIT),
            _ => return Ok("Usage: /history [count]".to_string()),
        },
        None => DEFAULT_HISTORY_LIMIT,
    };

    let transactions = session.db.recent_transactions(session.user_id, limit)?;
    if transactions.is_empty() {
        return Ok("No transactions recorded yet.".to_string());
    }

    let mut reply = String::from("Recent transactions:\n");
    for txn in &transactions {
        let sign = if txn.is_income() { "+" } else { "-" };
        reply.push_str(&format!(
            "\n{sign}{} - {} ({})\n",
            format_vnd(txn.amount),
            category::label(txn.kind, &txn.category),
            format_short_date(&txn.date),
        ));
        if !txn.description.is_empty() {
            reply.push_str(&format!("    {}\n", txn.description));
        }
    }
    Ok(reply.trim_end().to_string())
}

fn cmd_delete(_args: &str, session: &mut Session<'_>) -> Result<String> {
    match session.db.delete_last_transaction(session.user_id)? {
        Some(txn) => Ok(format!(
            "Deleted {}: {}\nCategory: {}\nDescription: {}",
            txn.kind.as_str(),
            format_vnd(txn.amount),
            category::label(txn.kind, &txn.category),
            if txn.description.is_empty() {
                "(none)"
            } else {
                txn.description.as_str()
            },
        )),
        None => Ok("No transactions to delete.".to_string()),
    }
}

fn cmd_clear(args: &str, session: &mut Session<'_>) -> Result<String> {
    let mut parts = args.split_whitespace();
    let (Some(password), None) = (parts.next(), parts.next()) else {
        return Ok(format!(
            "This wipes every transaction and budget you have recorded. It cannot be undone.\n\
             To confirm, run: /clear {CLEAR_PASSWORD}"
        ));
    };
    if password != CLEAR_PASSWORD {
        return Ok("Wrong password. Data left untouched.".to_string());
    }

    let (transactions, budgets) = session.db.clear_all_data(session.user_id)?;
    if transactions == 0 && budgets == 0 {
        return Ok("Your account is already empty.".to_string());
    }
    Ok(format!(
        "All data deleted: {transactions} transaction(s), {budgets} budget(s). You can start fresh."
    ))
}

fn cmd_categories(_args: &str, _session: &mut Session<'_>) -> Result<String> {
    let mut reply = String::from("Income categories:\n");
    for (code, label) in category::INCOME_CATEGORIES {
        reply.push_str(&format!("  {code} - {label}\n"));
    }
    reply.push_str("\nExpense categories:\n");
    for (code, label) in category::EXPENSE_CATEGORIES {
        reply.push_str(&format!("  {code} - {label}\n"));
    }
    Ok(reply.trim_end().to_string())
}
