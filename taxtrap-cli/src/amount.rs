//! Dollar amounts the way people type them into a shell or a spreadsheet.
//!
//! `$`, thousands separators and surrounding whitespace are ignored, and a
//! figure wrapped in parentheses is negative, as in accounting exports:
//! `"(1,200.50)"` is `-1200.50`. Sign checks belong to
//! [`ScenarioInput::validate`](taxtrap_core::ScenarioInput::validate), so
//! negatives parse here and are rejected there.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("invalid amount '{input}': {source}")]
    Malformed {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("invalid amount '{input}': unbalanced parentheses")]
    UnbalancedParens { input: String },
}

/// Blank input is zero.
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    parse_optional_amount(raw).map(Option::unwrap_or_default)
}

/// Blank input is `None`; anything else must be a number.
pub fn parse_optional_amount(raw: &str) -> Result<Option<Decimal>, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (negated, figure) = match (trimmed.strip_prefix('('), trimmed.strip_suffix(')')) {
        (Some(_), Some(_)) => (true, &trimmed[1..trimmed.len() - 1]),
        (None, None) => (false, trimmed),
        _ => {
            debug!(input = raw, "unbalanced parentheses in amount");
            return Err(AmountError::UnbalancedParens {
                input: raw.to_string(),
            });
        }
    };

    let digits: String = figure
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    let value: Decimal = digits.parse().map_err(|source| {
        debug!(input = raw, "rejected amount");
        AmountError::Malformed {
            input: raw.to_string(),
            source,
        }
    })?;

    Ok(Some(if negated { -value } else { value }))
}
