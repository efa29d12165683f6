use rust_decimal::Decimal;
use std::str::FromStr;

/// The amount text failed to parse as a number. The `Display` form is the
/// user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidAmount {
    input: String,
}

impl std::fmt::Display for InvalidAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid amount: '{}'", self.input)
    }
}

impl std::error::Error for InvalidAmount {}

/// Parse a user-supplied amount token into VND.
///
/// A trailing `m` means millions, a trailing `k` means thousands, and a
/// bare number is shorthand for thousands ("50" == "50k" == 50,000 VND).
/// Case-insensitive. Zero and negative values parse successfully here;
/// the dispatcher decides whether they are acceptable.
pub(crate) fn parse_amount(text: &str) -> Result<Decimal, InvalidAmount> {
    let normalized = text.trim().to_lowercase();
    let (number_part, multiplier) = if let Some(rest) = normalized.strip_suffix('m') {
        (rest, Decimal::from(1_000_000))
    } else if let Some(rest) = normalized.strip_suffix('k') {
        (rest, Decimal::from(1_000))
    } else {
        (normalized.as_str(), Decimal::from(1_000))
    };

    let value = Decimal::from_str(number_part).map_err(|_| InvalidAmount {
        input: text.trim().to_string(),
    })?;
    Ok(value * multiplier)
}
