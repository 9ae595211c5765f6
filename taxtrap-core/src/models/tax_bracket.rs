use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tier of a progressive schedule.
///
/// Income in `(min_income, max_income]` is taxed at `tax_rate`. The top tier
/// has no `max_income` and extends indefinitely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Builds a contiguous schedule from the upper bound of every tier but the
    /// last, paired with one rate per tier.
    ///
    /// `rates` must be exactly one longer than `upper_bounds`.
    pub fn schedule(
        upper_bounds: &[Decimal],
        rates: &[Decimal],
    ) -> Vec<TaxBracket> {
        debug_assert_eq!(rates.len(), upper_bounds.len() + 1);

        let mut lower = Decimal::ZERO;
        let mut brackets = Vec::with_capacity(rates.len());
        for (idx, rate) in rates.iter().enumerate() {
            let upper = upper_bounds.get(idx).copied();
            brackets.push(TaxBracket::new(lower, upper, *rate));
            if let Some(upper) = upper {
                lower = upper;
            }
        }
        brackets
    }
}
