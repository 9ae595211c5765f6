//! Progressive bracket evaluation.
//!
//! Every bracket walk and every threshold-ladder lookup in the crate goes
//! through this module.
//!
//! A tier covers `(min_income, max_income]`: income sitting exactly on a
//! boundary belongs to the lower tier, so crossing a threshold always means
//! being strictly above it.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxtrap_core::TaxBracket;
//! use taxtrap_core::calculations::BracketEngine;
//!
//! let brackets = TaxBracket::schedule(
//!     &[dec!(11000), dec!(44725)],
//!     &[dec!(0.10), dec!(0.12), dec!(0.22)],
//! );
//!
//! let result = BracketEngine::new(&brackets).compute(dec!(30000)).unwrap();
//!
//! assert_eq!(result.tax_owed, dec!(3380.00));
//! assert_eq!(result.marginal_rate, dec!(0.12));
//! assert_eq!(result.amount_to_next_tier, dec!(14725));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaxBracket;
use crate::calculations::common::{max, min, round_half_up};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("no tax brackets provided")]
    NoBrackets,

    #[error("income must not be negative, got {0}")]
    NegativeIncome(Decimal),
}

/// Outcome of walking a schedule for one income amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveTax {
    /// Tax accumulated across every tier below and including the containing one.
    pub tax_owed: Decimal,
    /// Rate of the tier containing the income.
    pub marginal_rate: Decimal,
    /// Income that can be added before reaching the next tier; zero in the top tier.
    pub amount_to_next_tier: Decimal,
    /// Index of the containing tier.
    pub tier_index: usize,
}

/// Evaluator over an ordered, contiguous schedule.
#[derive(Debug, Clone, Copy)]
pub struct BracketEngine<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> BracketEngine<'a> {
    /// Brackets must be sorted by `min_income` ascending and contiguous, with
    /// an open-ended top tier.
    pub fn new(brackets: &'a [TaxBracket]) -> Self {
        Self { brackets }
    }

    /// Index of the tier containing `income`.
    ///
    /// Zero income sits in the first tier. Income above the last explicit
    /// bound sits in the top tier.
    pub fn tier_of(
        &self,
        income: Decimal,
    ) -> usize {
        match self.brackets.split_first() {
            Some((_, rest)) => thresholds_exceeded(income, rest.iter().map(|b| b.min_income)),
            None => 0,
        }
    }

    /// Computes tax owed, marginal rate and room to the next tier.
    ///
    /// # Errors
    ///
    /// Returns [`BracketError`] if the schedule is empty or `income` is
    /// negative.
    pub fn compute(
        &self,
        income: Decimal,
    ) -> Result<ProgressiveTax, BracketError> {
        if self.brackets.is_empty() {
            return Err(BracketError::NoBrackets);
        }
        if income < Decimal::ZERO {
            return Err(BracketError::NegativeIncome(income));
        }

        let tier_index = self.tier_of(income);

        let tax_owed: Decimal = self.brackets[..=tier_index]
            .iter()
            .map(|bracket| {
                let upper = bracket.max_income.map_or(income, |cap| min(cap, income));
                max(upper - bracket.min_income, Decimal::ZERO) * bracket.tax_rate
            })
            .sum();

        let amount_to_next_tier = self
            .brackets
            .get(tier_index + 1)
            .map_or(Decimal::ZERO, |next| max(next.min_income - income, Decimal::ZERO));

        Ok(ProgressiveTax {
            tax_owed: round_half_up(tax_owed),
            marginal_rate: self.brackets[tier_index].tax_rate,
            amount_to_next_tier,
            tier_index,
        })
    }

    /// Rate of the tier after `tier_index`, if there is one.
    pub fn next_rate(
        &self,
        tier_index: usize,
    ) -> Option<Decimal> {
        self.brackets.get(tier_index + 1).map(|b| b.tax_rate)
    }
}

/// Shorthand for `BracketEngine::new(brackets).compute(income)`.
pub fn compute_progressive_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Result<ProgressiveTax, BracketError> {
    BracketEngine::new(brackets).compute(income)
}

/// Number of ascending thresholds that `value` is strictly greater than.
///
/// Used for step ladders (IRMAA tiers, ACA bands) where a value exactly on a
/// threshold has not crossed it.
pub fn thresholds_exceeded(
    value: Decimal,
    ascending: impl IntoIterator<Item = Decimal>,
) -> usize {
    ascending
        .into_iter()
        .take_while(|threshold| value > *threshold)
        .count()
}
