//! Long-term capital gains rate breakpoints.
//!
//! Gains are stacked on top of ordinary income: the rate a gain pays depends
//! on where it falls once everything else is counted. Realizing a gain that
//! straddles a breakpoint only costs the higher rate on the part above it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::brackets::BracketEngine;
use crate::calculations::common::{format_currency, format_rate, max, round_half_up};
use crate::calculations::{BracketError, CalculatorError, CalculatorResult, TrapCalculator};
use crate::models::{CapitalGainsBreakpoints, ScenarioInput, TaxYearTable, TrapType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsResult {
    pub agi: Decimal,
    pub capital_gains: Decimal,
    /// AGI without the gains, floored at zero.
    pub base_income: Decimal,
    /// Rate zone of `base_income`.
    pub current_rate: Decimal,
    /// Rate zone of the full AGI.
    pub potential_rate: Decimal,
    /// Lowest breakpoint lying between `base_income` and `agi`.
    pub crossed_threshold: Option<Decimal>,
    /// Extra tax on the gains above the crossed breakpoint(s).
    pub tax_increase: Decimal,
}

impl CapitalGainsResult {
    pub fn rate_increase(&self) -> Decimal {
        self.potential_rate - self.current_rate
    }

    pub fn title(&self) -> String {
        format!(
            "Capital gains pushed into the {} rate",
            format_rate(self.potential_rate)
        )
    }

    pub fn description(&self) -> String {
        match self.crossed_threshold {
            Some(threshold) => format!(
                "Stacking {} of long-term gains on {} of other income crosses the {} breakpoint. {} of the gains are taxed at {} instead of {}, costing {} more.",
                format_currency(self.capital_gains),
                format_currency(self.base_income),
                format_currency(threshold),
                format_currency(self.agi - threshold),
                format_rate(self.potential_rate),
                format_rate(self.current_rate),
                format_currency(self.tax_increase),
            ),
            None => format!(
                "All {} of long-term gains stay in the {} zone.",
                format_currency(self.capital_gains),
                format_rate(self.current_rate)
            ),
        }
    }
}

/// Compares the rate zone of ordinary income alone with that of the full
/// AGI and prices the difference.
///
/// # Errors
///
/// Returns [`BracketError::NegativeIncome`] if `agi` is negative.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxtrap_core::CapitalGainsBreakpoints;
/// use taxtrap_core::calculations::calculate_capital_gains;
///
/// let breakpoints = CapitalGainsBreakpoints {
///     zero_rate_max: dec!(89250),
///     fifteen_rate_max: dec!(553850),
/// };
///
/// let result = calculate_capital_gains(dec!(600000), dec!(50000), &breakpoints).unwrap();
///
/// assert_eq!(result.rate_increase(), dec!(0.05));
/// assert_eq!(result.tax_increase, dec!(2307.50));
/// ```
pub fn calculate_capital_gains(
    agi: Decimal,
    capital_gains: Decimal,
    breakpoints: &CapitalGainsBreakpoints,
) -> Result<CapitalGainsResult, BracketError> {
    let brackets = breakpoints.brackets();
    let engine = BracketEngine::new(&brackets);

    let base_income = max(agi - capital_gains, Decimal::ZERO);
    let stacked_gains = agi - base_income;

    let current = engine.compute(base_income)?;
    let potential = engine.compute(agi)?;

    let (crossed_threshold, tax_increase) = if potential.marginal_rate > current.marginal_rate {
        let crossed = breakpoints
            .thresholds()
            .into_iter()
            .find(|threshold| base_income <= *threshold && agi > *threshold);
        // Tax actually owed on the stacked gains less what they would owe had
        // they all stayed in the base income's zone.
        let at_current_rate = stacked_gains * current.marginal_rate;
        let increase = max(
            round_half_up(potential.tax_owed - current.tax_owed - at_current_rate),
            Decimal::ZERO,
        );
        (crossed, increase)
    } else {
        (None, Decimal::ZERO)
    };

    Ok(CapitalGainsResult {
        agi,
        capital_gains,
        base_income,
        current_rate: current.marginal_rate,
        potential_rate: potential.marginal_rate,
        crossed_threshold,
        tax_increase,
    })
}

/// Runs when the scenario realizes long-term gains.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalGainsCalculator;

impl TrapCalculator for CapitalGainsCalculator {
    fn trap_type(&self) -> TrapType {
        TrapType::CapitalGains
    }

    fn name(&self) -> &'static str {
        "capital_gains"
    }

    fn applies_to(
        &self,
        input: &ScenarioInput,
    ) -> bool {
        input.capital_gains_long > Decimal::ZERO
    }

    fn compute(
        &self,
        input: &ScenarioInput,
        table: &TaxYearTable,
    ) -> Result<CalculatorResult, CalculatorError> {
        let result =
            calculate_capital_gains(input.agi, input.capital_gains_long, &table.capital_gains)?;
        Ok(CalculatorResult::CapitalGains(result))
    }
}
