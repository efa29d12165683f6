#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn txn(
    user_id: i64,
    kind: Kind,
    amount: Decimal,
    category: &str,
    description: &str,
    date: &str,
) -> Transaction {
    Transaction::new(
        user_id,
        kind,
        amount,
        category.into(),
        description.into(),
        date.into(),
    )
}

/// January for user 1: one salary, two meals, one shopping trip.
/// February for user 1: one meal.
fn setup_test_data(db: &Database) {
    let txns = [
        txn(1, Kind::Income, dec!(5000000), "wrk", "salary", "2024-01-05 09:00:00"),
        txn(1, Kind::Expense, dec!(50000), "eat", "morning coffee", "2024-01-10 08:30:00"),
        txn(1, Kind::Expense, dec!(120000), "eat", "dinner", "2024-01-12 19:45:00"),
        txn(1, Kind::Expense, dec!(300000), "shp", "", "2024-01-20 14:00:00"),
        txn(1, Kind::Expense, dec!(80000), "eat", "lunch", "2024-02-02 12:15:00"),
    ];
    for t in &txns {
        db.insert_transaction(t).unwrap();
    }
}

// ── Transaction round trip ────────────────────────────────────

#[test]
fn test_insert_and_read_back() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_transaction(&txn(
            1,
            Kind::Expense,
            dec!(50000),
            "eat",
            "morning coffee",
            "2024-01-10 08:30:00",
        ))
        .unwrap();
    assert!(id > 0);

    let fetched = db.recent_transactions(1, 10).unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, Some(id));
    assert_eq!(fetched[0].kind, Kind::Expense);
    assert_eq!(fetched[0].amount, dec!(50000));
    assert_eq!(fetched[0].category, "eat");
    assert_eq!(fetched[0].description, "morning coffee");
    assert_eq!(fetched[0].date, "2024-01-10 08:30:00");
}

#[test]
fn test_empty_description_round_trip() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&txn(1, Kind::Income, dec!(200000), "ano", "", "2024-01-10 08:30:00"))
        .unwrap();

    let fetched = db.recent_transactions(1, 10).unwrap();
    assert_eq!(fetched[0].description, "");
}

// ── Recent transactions ───────────────────────────────────────

#[test]
fn test_recent_transactions_newest_first() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let fetched = db.recent_transactions(1, 10).unwrap();
    assert_eq!(fetched.len(), 5);
    assert_eq!(fetched[0].date, "2024-02-02 12:15:00");
    for window in fetched.windows(2) {
        assert!(window[0].date >= window[1].date);
    }
}

#[test]
fn test_recent_transactions_limit() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let fetched = db.recent_transactions(1, 2).unwrap();
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].date, "2024-02-02 12:15:00");
    assert_eq!(fetched[1].date, "2024-01-20 14:00:00");
}

#[test]
fn test_recent_transactions_tie_broken_by_id() {
    let db = Database::open_in_memory().unwrap();
    let first = db
        .insert_transaction(&txn(1, Kind::Expense, dec!(10000), "eat", "", "2024-01-10 08:30:00"))
        .unwrap();
    let second = db
        .insert_transaction(&txn(1, Kind::Expense, dec!(20000), "shp", "", "2024-01-10 08:30:00"))
        .unwrap();

    let fetched = db.recent_transactions(1, 10).unwrap();
    assert_eq!(fetched[0].id, Some(second));
    assert_eq!(fetched[1].id, Some(first));
}

#[test]
fn test_recent_transactions_scoped_to_user() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    assert!(db.recent_transactions(2, 10).unwrap().is_empty());
}

// ── Delete last ───────────────────────────────────────────────

#[test]
fn test_delete_last_transaction() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(10000), "eat", "first", "2024-01-10 08:00:00"))
        .unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(20000), "shp", "second", "2024-01-11 09:00:00"))
        .unwrap();

    let deleted = db.delete_last_transaction(1).unwrap().unwrap();
    assert_eq!(deleted.amount, dec!(20000));
    assert_eq!(deleted.category, "shp");
    assert_eq!(deleted.description, "second");
    assert_eq!(deleted.date, "2024-01-11 09:00:00");

    let deleted = db.delete_last_transaction(1).unwrap().unwrap();
    assert_eq!(deleted.description, "first");

    assert!(db.delete_last_transaction(1).unwrap().is_none());
}

#[test]
fn test_delete_last_tie_broken_by_id() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(10000), "eat", "", "2024-01-10 08:30:00"))
        .unwrap();
    let second = db
        .insert_transaction(&txn(1, Kind::Expense, dec!(20000), "shp", "", "2024-01-10 08:30:00"))
        .unwrap();

    let deleted = db.delete_last_transaction(1).unwrap().unwrap();
    assert_eq!(deleted.id, Some(second));
}

#[test]
fn test_delete_last_on_empty_data() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(db.delete_last_transaction(1).unwrap().is_none());
}

#[test]
fn test_delete_last_ignores_other_users() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_transaction(&txn(2, Kind::Expense, dec!(10000), "eat", "", "2024-01-10 08:30:00"))
        .unwrap();

    assert!(db.delete_last_transaction(1).unwrap().is_none());
    assert_eq!(db.recent_transactions(2, 10).unwrap().len(), 1);
}

// ── Clear all data ────────────────────────────────────────────

#[test]
fn test_clear_all_data() {
    let mut db = Database::open_in_memory().unwrap();
    for i in 0..3 {
        db.insert_transaction(&txn(
            1,
            Kind::Expense,
            dec!(10000),
            "eat",
            "",
            &format!("2024-01-1{i} 08:00:00"),
        ))
        .unwrap();
    }
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1000000), "2024-01".into()))
        .unwrap();
    db.upsert_budget(&Budget::new(1, "shp".into(), dec!(500000), "2024-01".into()))
        .unwrap();

    // Another user's rows must survive the wipe
    db.insert_transaction(&txn(2, Kind::Income, dec!(200000), "ano", "", "2024-01-05 10:00:00"))
        .unwrap();
    db.upsert_budget(&Budget::new(2, "eat".into(), dec!(700000), "2024-01".into()))
        .unwrap();

    let (transactions, budgets) = db.clear_all_data(1).unwrap();
    assert_eq!(transactions, 3);
    assert_eq!(budgets, 2);

    assert!(db.recent_transactions(1, 10).unwrap().is_empty());
    assert!(db.get_budgets(1, "2024-01").unwrap().is_empty());
    assert_eq!(db.recent_transactions(2, 10).unwrap().len(), 1);
    assert_eq!(db.get_budgets(2, "2024-01").unwrap().len(), 1);
}

#[test]
fn test_clear_all_data_empty() {
    let mut db = Database::open_in_memory().unwrap();
    assert_eq!(db.clear_all_data(1).unwrap(), (0, 0));
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_upsert_budget_replaces() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1000000), "2024-01".into()))
        .unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(2000000), "2024-01".into()))
        .unwrap();

    let budgets = db.get_budgets(1, "2024-01").unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount, dec!(2000000));
}

#[test]
fn test_budget_months_independent() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1000000), "2024-01".into()))
        .unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1500000), "2024-02".into()))
        .unwrap();

    assert_eq!(db.get_budgets(1, "2024-01").unwrap()[0].amount, dec!(1000000));
    assert_eq!(db.get_budgets(1, "2024-02").unwrap()[0].amount, dec!(1500000));
    assert!(db.get_budgets(1, "2024-03").unwrap().is_empty());
}

#[test]
fn test_budgets_scoped_to_user() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1000000), "2024-01".into()))
        .unwrap();

    assert!(db.get_budgets(2, "2024-01").unwrap().is_empty());
}

// ── Monthly summary ───────────────────────────────────────────

#[test]
fn test_monthly_summary() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let (income, expenses) = db.monthly_summary(1, "2024-01").unwrap();
    assert_eq!(income, vec![("wrk".to_string(), dec!(5000000))]);
    // Largest spend first
    assert_eq!(
        expenses,
        vec![
            ("shp".to_string(), dec!(300000)),
            ("eat".to_string(), dec!(170000)),
        ]
    );
}

#[test]
fn test_monthly_summary_scoped_to_month() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let (income, expenses) = db.monthly_summary(1, "2024-02").unwrap();
    assert!(income.is_empty());
    assert_eq!(expenses, vec![("eat".to_string(), dec!(80000))]);

    let (income, expenses) = db.monthly_summary(1, "2023-12").unwrap();
    assert!(income.is_empty());
    assert!(expenses.is_empty());
}

#[test]
fn test_monthly_summary_empty() {
    let db = Database::open_in_memory().unwrap();
    let (income, expenses) = db.monthly_summary(1, "2024-01").unwrap();
    assert!(income.is_empty());
    assert!(expenses.is_empty());
}

#[test]
fn test_monthly_spending_expenses_only() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let spending = db.monthly_spending(1, "2024-01").unwrap();
    assert!(spending.iter().all(|(category, _)| category != "wrk"));
    assert_eq!(spending.len(), 2);
}

// ── Budget status ─────────────────────────────────────────────

#[test]
fn test_budget_status_math() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1000000), "2024-01".into()))
        .unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(800000), "eat", "", "2024-01-10 08:30:00"))
        .unwrap();

    let statuses = db.budget_status(1, "2024-01").unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].category, "eat");
    assert_eq!(statuses[0].budget, dec!(1000000));
    assert_eq!(statuses[0].spent, dec!(800000));
    assert_eq!(statuses[0].remaining, dec!(200000));
    assert_eq!(statuses[0].percentage, 80.0);
}

#[test]
fn test_budget_status_zero_budget() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(0), "2024-01".into()))
        .unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(50000), "eat", "", "2024-01-10 08:30:00"))
        .unwrap();

    let statuses = db.budget_status(1, "2024-01").unwrap();
    assert_eq!(statuses[0].percentage, 0.0);
    assert_eq!(statuses[0].remaining, dec!(-50000));
}

#[test]
fn test_budget_status_no_spend() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "ent".into(), dec!(400000), "2024-01".into()))
        .unwrap();

    let statuses = db.budget_status(1, "2024-01").unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].spent, Decimal::ZERO);
    assert_eq!(statuses[0].remaining, dec!(400000));
    assert_eq!(statuses[0].percentage, 0.0);
}

#[test]
fn test_budget_status_excludes_unbudgeted_spend() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1000000), "2024-01".into()))
        .unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(300000), "shp", "", "2024-01-20 14:00:00"))
        .unwrap();

    let statuses = db.budget_status(1, "2024-01").unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].category, "eat");
}

#[test]
fn test_budget_status_overspent() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(100000), "2024-01".into()))
        .unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(150000), "eat", "", "2024-01-10 08:30:00"))
        .unwrap();

    let statuses = db.budget_status(1, "2024-01").unwrap();
    assert_eq!(statuses[0].remaining, dec!(-50000));
    assert_eq!(statuses[0].percentage, 150.0);
}

#[test]
fn test_budget_status_scoped_to_month() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&Budget::new(1, "eat".into(), dec!(1000000), "2024-01".into()))
        .unwrap();
    db.insert_transaction(&txn(1, Kind::Expense, dec!(80000), "eat", "", "2024-02-02 12:15:00"))
        .unwrap();

    let statuses = db.budget_status(1, "2024-01").unwrap();
    assert_eq!(statuses[0].spent, Decimal::ZERO);
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_schema_version_set() {
    let db = Database::open_in_memory().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_double_migrate_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_kind_rejected_by_schema() {
    let db = Database::open_in_memory().unwrap();
    let result = db.conn.execute(
        "INSERT INTO transactions (user_id, type, amount, category, description, date)
         VALUES (1, 'transfer', 1000, 'eat', '', '2024-01-10 08:30:00')",
        [],
    );
    assert!(result.is_err());
}

// ── On-disk open ──────────────────────────────────────────────

#[test]
fn test_open_on_disk_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendbot.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_transaction(&txn(1, Kind::Expense, dec!(50000), "eat", "", "2024-01-10 08:30:00"))
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.recent_transactions(1, 10).unwrap().len(), 1);
}
