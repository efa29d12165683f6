use crate::models::Kind;

/// Fixed category catalogs, code → display label. Codes are persisted as
/// data and must not be renamed without a migration; labels are only ever
/// shown to the user.
pub const INCOME_CATEGORIES: &[(&str, &str)] = &[("wrk", "Work"), ("ano", "Other")];

pub const EXPENSE_CATEGORIES: &[(&str, &str)] = &[
    ("shp", "Shopping"),
    ("eat", "Food & Dining"),
    ("ser", "Services"),
    ("ent", "Entertainment"),
    ("inv", "Investment"),
    ("wrk", "Work"),
    ("ano", "Other"),
];

/// The catalog applicable to the given kind.
pub fn catalog(kind: Kind) -> &'static [(&'static str, &'static str)] {
    match kind {
        Kind::Income => INCOME_CATEGORIES,
        Kind::Expense => EXPENSE_CATEGORIES,
    }
}

pub fn is_valid(kind: Kind, code: &str) -> bool {
    catalog(kind).iter().any(|(c, _)| *c == code)
}

/// Display label for a code, falling back to the raw code for anything
/// that predates a catalog change.
pub fn label(kind: Kind, code: &str) -> &str {
    catalog(kind)
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, l)| *l)
        .unwrap_or(code)
}
