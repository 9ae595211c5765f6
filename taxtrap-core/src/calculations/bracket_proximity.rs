//! Distance from the next ordinary income tax bracket.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::TaxBracket;
use crate::calculations::brackets::BracketEngine;
use crate::calculations::common::{format_currency, format_rate, max, round_half_up};
use crate::calculations::{BracketError, CalculatorError, CalculatorResult, TrapCalculator};
use crate::models::{ScenarioInput, TaxYearTable, TrapType};

pub const DEFAULT_PROXIMITY_WINDOW: Decimal = dec!(5000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketProximityResult {
    pub taxable_income: Decimal,
    pub tax_owed: Decimal,
    pub marginal_rate: Decimal,
    pub next_rate: Option<Decimal>,
    pub amount_to_next_tier: Decimal,
    /// Additional income considered.
    pub window: Decimal,
    /// Tax on the next `window` dollars beyond what the current rate would charge.
    pub extra_tax: Decimal,
}

impl BracketProximityResult {
    pub fn title(&self) -> String {
        match self.next_rate {
            Some(next) => format!(
                "Within {} of the {} bracket",
                format_currency(self.amount_to_next_tier),
                format_rate(next)
            ),
            None => format!("In the top {} bracket", format_rate(self.marginal_rate)),
        }
    }

    pub fn description(&self) -> String {
        format!(
            "Taxable income of {} is {} below the next bracket. The next {} of income would cost {} more than at your current {} rate.",
            format_currency(self.taxable_income),
            format_currency(self.amount_to_next_tier),
            format_currency(self.window),
            format_currency(self.extra_tax),
            format_rate(self.marginal_rate),
        )
    }
}

/// Prices the next `window` dollars of taxable income against the current
/// marginal rate.
///
/// # Errors
///
/// Returns [`BracketError`] if `brackets` is empty or the income is negative.
pub fn calculate_bracket_proximity(
    taxable_income: Decimal,
    brackets: &[TaxBracket],
    window: Decimal,
) -> Result<BracketProximityResult, BracketError> {
    let engine = BracketEngine::new(brackets);
    let tax = engine.compute(taxable_income)?;
    let next_rate = engine.next_rate(tax.tier_index);

    // Priced across every tier the window reaches.
    let extended = engine.compute(taxable_income + window)?;
    let extra_tax = max(
        round_half_up(extended.tax_owed - tax.tax_owed - window * tax.marginal_rate),
        Decimal::ZERO,
    );

    Ok(BracketProximityResult {
        taxable_income,
        tax_owed: tax.tax_owed,
        marginal_rate: tax.marginal_rate,
        next_rate,
        amount_to_next_tier: tax.amount_to_next_tier,
        window,
        extra_tax,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct BracketProximityCalculator {
    window: Decimal,
}

impl BracketProximityCalculator {
    pub fn new(window: Decimal) -> Self {
        Self { window }
    }
}

impl Default for BracketProximityCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_PROXIMITY_WINDOW)
    }
}

impl TrapCalculator for BracketProximityCalculator {
    fn trap_type(&self) -> TrapType {
        TrapType::Default
    }

    fn name(&self) -> &'static str {
        "bracket_proximity"
    }

    fn compute(
        &self,
        input: &ScenarioInput,
        table: &TaxYearTable,
    ) -> Result<CalculatorResult, CalculatorError> {
        let taxable_income = input
            .taxable_income
            .unwrap_or_else(|| max(input.agi - table.standard_deduction, Decimal::ZERO));
        let result =
            calculate_bracket_proximity(taxable_income, &table.ordinary_brackets, self.window)?;
        Ok(CalculatorResult::BracketProximity(result))
    }
}
