use rust_decimal::Decimal;

/// Whether a transaction is money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    /// Stable string form, persisted in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }

    /// The schema constrains `type` to the two known values; anything
    /// else maps to expense.
    pub fn parse(s: &str) -> Kind {
        match s {
            "income" => Kind::Income,
            _ => Kind::Expense,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub user_id: i64,
    pub kind: Kind,
    pub amount: Decimal,
    pub category: String,
    /// Free text, may be empty.
    pub description: String,
    /// Format: "YYYY-MM-DD HH:MM:SS", UTC+7 wall clock.
    pub date: String,
}

impl Transaction {
    pub fn new(
        user_id: i64,
        kind: Kind,
        amount: Decimal,
        category: String,
        description: String,
        date: String,
    ) -> Self {
        Self {
            id: None,
            user_id,
            kind,
            amount,
            category,
            description,
            date,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == Kind::Income
    }
}
