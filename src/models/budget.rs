use rust_decimal::Decimal;

/// A per-user, per-category spending ceiling for one month.
#[derive(Debug, Clone)]
pub struct Budget {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    pub amount: Decimal,
    /// Format: "YYYY-MM"
    pub month: String,
}

impl Budget {
    pub fn new(user_id: i64, category: String, amount: Decimal, month: String) -> Self {
        Self {
            id: None,
            user_id,
            category,
            amount,
            month,
        }
    }
}

/// Budget ceiling joined against actual spend in the same month.
/// Derived at query time, never stored.
#[derive(Debug, Clone)]
pub struct BudgetStatus {
    pub category: String,
    pub budget: Decimal,
    pub spent: Decimal,
    /// May go negative when the budget is overspent.
    pub remaining: Decimal,
    /// 0.0 when the budget ceiling is zero.
    pub percentage: f64,
}
