mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::path::Path;

use crate::models::*;

/// Per-category sums for one month: income first, expenses second.
/// Categories with no transactions in the period are omitted.
pub(crate) type MonthlySummary = (Vec<(String, Decimal)>, Vec<(String, Decimal)>);

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (user_id, type, amount, category, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn.user_id,
                txn.kind.as_str(),
                txn.amount.to_f64().unwrap_or_default(),
                txn.category,
                txn.description,
                txn.date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Up to `limit` transactions for the user, most recent first.
    /// Timestamp ties are broken by id descending so ordering stays
    /// deterministic.
    pub(crate) fn recent_transactions(&self, user_id: i64, limit: u32) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, type, amount, category, description, date
             FROM transactions
             WHERE user_id = ?1
             ORDER BY date DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit], |row| {
            let kind: String = row.get(2)?;
            let amount: f64 = row.get(3)?;
            Ok(Transaction {
                id: Some(row.get(0)?),
                user_id: row.get(1)?,
                kind: Kind::parse(&kind),
                amount: Decimal::from_f64(amount).unwrap_or_default(),
                category: row.get(4)?,
                description: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                date: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Remove the user's most recent transaction and return it, or `None`
    /// when the user has no transactions. Select and delete run in one
    /// transaction.
    pub(crate) fn delete_last_transaction(&mut self, user_id: i64) -> Result<Option<Transaction>> {
        let tx = self.conn.transaction()?;
        let result = tx.query_row(
            "SELECT id, user_id, type, amount, category, description, date
             FROM transactions
             WHERE user_id = ?1
             ORDER BY date DESC, id DESC
             LIMIT 1",
            params![user_id],
            |row| {
                let kind: String = row.get(2)?;
                let amount: f64 = row.get(3)?;
                Ok(Transaction {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    kind: Kind::parse(&kind),
                    amount: Decimal::from_f64(amount).unwrap_or_default(),
                    category: row.get(4)?,
                    description: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    date: row.get(6)?,
                })
            },
        );
        let txn = match result {
            Ok(t) => t,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        tx.execute("DELETE FROM transactions WHERE id = ?1", params![txn.id])?;
        tx.commit()?;
        Ok(Some(txn))
    }

    /// Delete every transaction and budget owned by the user, atomically.
    /// Returns the deleted (transaction, budget) row counts. Irreversible.
    pub(crate) fn clear_all_data(&mut self, user_id: i64) -> Result<(usize, usize)> {
        let tx = self.conn.transaction()?;
        let transactions =
            tx.execute("DELETE FROM transactions WHERE user_id = ?1", params![user_id])?;
        let budgets = tx.execute("DELETE FROM budgets WHERE user_id = ?1", params![user_id])?;
        tx.commit()?;
        Ok((transactions, budgets))
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn upsert_budget(&self, budget: &Budget) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO budgets (user_id, category, amount, month)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, category, month) DO UPDATE SET amount = ?3",
            params![
                budget.user_id,
                budget.category,
                budget.amount.to_f64().unwrap_or_default(),
                budget.month,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_budgets(&self, user_id: i64, month: &str) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, category, amount, month
             FROM budgets
             WHERE user_id = ?1 AND month = ?2
             ORDER BY category",
        )?;
        let rows = stmt.query_map(params![user_id, month], |row| {
            let amount: f64 = row.get(3)?;
            Ok(Budget {
                id: Some(row.get(0)?),
                user_id: row.get(1)?,
                category: row.get(2)?,
                amount: Decimal::from_f64(amount).unwrap_or_default(),
                month: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Aggregation ───────────────────────────────────────────

    fn sums_by_category(
        &self,
        user_id: i64,
        kind: Kind,
        month: &str,
    ) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, SUM(amount)
             FROM transactions
             WHERE user_id = ?1 AND type = ?2 AND date LIKE ?3
             GROUP BY category
             ORDER BY SUM(amount) DESC, category",
        )?;
        let rows = stmt.query_map(
            params![user_id, kind.as_str(), format!("{month}%")],
            |row| {
                let total: f64 = row.get(1)?;
                Ok((
                    row.get::<_, String>(0)?,
                    Decimal::from_f64(total).unwrap_or_default(),
                ))
            },
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Per-category income and expense sums for the given month.
    pub(crate) fn monthly_summary(&self, user_id: i64, month: &str) -> Result<MonthlySummary> {
        Ok((
            self.sums_by_category(user_id, Kind::Income, month)?,
            self.sums_by_category(user_id, Kind::Expense, month)?,
        ))
    }

    /// The expense half of the summary; feeds budget status.
    pub(crate) fn monthly_spending(
        &self,
        user_id: i64,
        month: &str,
    ) -> Result<Vec<(String, Decimal)>> {
        self.sums_by_category(user_id, Kind::Expense, month)
    }

    /// Budget-vs-spend for every budget the user has set in the given
    /// month. Budget-driven: categories with spend but no budget are
    /// excluded, categories with a budget but no spend appear with
    /// spent = 0.
    pub(crate) fn budget_status(&self, user_id: i64, month: &str) -> Result<Vec<BudgetStatus>> {
        let budgets = self.get_budgets(user_id, month)?;
        let spending = self.monthly_spending(user_id, month)?;

        Ok(budgets
            .into_iter()
            .map(|b| {
                let spent = spending
                    .iter()
                    .find(|(category, _)| *category == b.category)
                    .map(|(_, total)| *total)
                    .unwrap_or(Decimal::ZERO);
                let remaining = b.amount - spent;
                let percentage = if b.amount > Decimal::ZERO {
                    (spent / b.amount * Decimal::from(100))
                        .to_f64()
                        .unwrap_or(0.0)
                } else {
                    0.0
                };
                BudgetStatus {
                    category: b.category,
                    budget: b.amount,
                    spent,
                    remaining,
                    percentage,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests;
