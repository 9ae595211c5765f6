//! Taxability of Social Security benefits.
//!
//! Combined income (AGI plus half the benefits) is compared with two
//! thresholds. Below the base amount nothing is taxable; between the two
//! thresholds the excess is taxable up to half the benefits; above the second
//! threshold 85% of the further excess is added. Taxable benefits never
//! exceed 85% of the benefits received.
//!
//! Two simplifications apply:
//! - tax-exempt interest is left out of combined income
//! - the tax cost uses [`ASSUMED_MARGINAL_RATE`] rather than a bracket walk

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{format_currency, format_rate, min, round_half_up};
use crate::calculations::{CalculatorError, CalculatorResult, TrapCalculator};
use crate::models::{ScenarioInput, SocialSecurityThresholds, TaxYearTable, TrapType};

/// Flat marginal rate applied to taxable benefits.
pub const ASSUMED_MARGINAL_RATE: Decimal = dec!(0.22);

/// Share of benefits counted toward combined income.
pub const COMBINED_INCOME_BENEFIT_SHARE: Decimal = dec!(0.5);

/// Ceiling on taxable benefits between the two thresholds.
pub const INTERMEDIATE_INCLUSION_LIMIT: Decimal = dec!(0.5);

/// Ceiling on taxable benefits overall, and the inclusion rate above the
/// second threshold.
pub const MAXIMUM_INCLUSION_RATE: Decimal = dec!(0.85);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialSecurityZone {
    /// Combined income at or below the base amount.
    BelowBase,
    /// Between the base amount and the second threshold (inclusive).
    Intermediate,
    /// Above the second threshold.
    AboveSecond,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityResult {
    pub agi: Decimal,
    pub benefits: Decimal,
    pub combined_income: Decimal,
    pub zone: SocialSecurityZone,
    /// Threshold whose crossing put the scenario in `zone`.
    pub crossed_threshold: Option<Decimal>,
    pub taxable_amount: Decimal,
    /// Whether the 85% ceiling limited `taxable_amount`.
    pub capped: bool,
    /// Approximate tax on `taxable_amount` at [`ASSUMED_MARGINAL_RATE`].
    pub tax_impact: Decimal,
}

impl SocialSecurityResult {
    pub fn title(&self) -> String {
        match self.zone {
            SocialSecurityZone::BelowBase => "Social Security benefits not taxable".to_string(),
            SocialSecurityZone::Intermediate => {
                "Up to 50% of Social Security benefits taxable".to_string()
            }
            SocialSecurityZone::AboveSecond => {
                "Up to 85% of Social Security benefits taxable".to_string()
            }
        }
    }

    pub fn description(&self) -> String {
        let threshold = self
            .crossed_threshold
            .map(|t| format!(" exceeds the {} threshold", format_currency(t)))
            .unwrap_or_default();
        let ceiling = if self.capped {
            " (85% ceiling applied)"
        } else {
            ""
        };
        format!(
            "Combined income of {}{}; {} of {} in benefits becomes taxable{}. At an assumed {} marginal rate that is about {} of tax.",
            format_currency(self.combined_income),
            threshold,
            format_currency(self.taxable_amount),
            format_currency(self.benefits),
            ceiling,
            format_rate(ASSUMED_MARGINAL_RATE),
            format_currency(self.tax_impact),
        )
    }
}

/// Computes the taxable share of `benefits`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxtrap_core::SocialSecurityThresholds;
/// use taxtrap_core::calculations::calculate_social_security;
///
/// let single = SocialSecurityThresholds {
///     base_amount: dec!(25000),
///     second_threshold: dec!(34000),
/// };
///
/// let result = calculate_social_security(dec!(40000), dec!(20000), &single);
///
/// assert_eq!(result.combined_income, dec!(50000));
/// assert_eq!(result.taxable_amount, dec!(17000));
/// assert!(result.capped);
/// ```
pub fn calculate_social_security(
    agi: Decimal,
    benefits: Decimal,
    thresholds: &SocialSecurityThresholds,
) -> SocialSecurityResult {
    let combined_income = agi + benefits * COMBINED_INCOME_BENEFIT_SHARE;
    let intermediate_limit = benefits * INTERMEDIATE_INCLUSION_LIMIT;
    let ceiling = benefits * MAXIMUM_INCLUSION_RATE;
    let base = thresholds.base_amount;
    let second = thresholds.second_threshold;

    let (zone, crossed_threshold, uncapped) = if combined_income <= base {
        (SocialSecurityZone::BelowBase, None, Decimal::ZERO)
    } else if combined_income <= second {
        (
            SocialSecurityZone::Intermediate,
            Some(base),
            min(combined_income - base, intermediate_limit),
        )
    } else {
        // What the intermediate zone contributes when combined income sits
        // exactly on the second threshold.
        let intermediate_amount = min(second - base, intermediate_limit);
        (
            SocialSecurityZone::AboveSecond,
            Some(second),
            intermediate_amount + MAXIMUM_INCLUSION_RATE * (combined_income - second),
        )
    };

    let capped = uncapped > ceiling;
    let taxable_amount = min(uncapped, ceiling);

    SocialSecurityResult {
        agi,
        benefits,
        combined_income,
        zone,
        crossed_threshold,
        taxable_amount,
        capped,
        tax_impact: round_half_up(taxable_amount * ASSUMED_MARGINAL_RATE),
    }
}

/// Runs when the scenario includes Social Security benefits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocialSecurityCalculator;

impl TrapCalculator for SocialSecurityCalculator {
    fn trap_type(&self) -> TrapType {
        TrapType::SocialSecurity
    }

    fn name(&self) -> &'static str {
        "social_security"
    }

    fn applies_to(
        &self,
        input: &ScenarioInput,
    ) -> bool {
        input
            .social_security_amount
            .is_some_and(|benefits| benefits > Decimal::ZERO)
    }

    fn compute(
        &self,
        input: &ScenarioInput,
        table: &TaxYearTable,
    ) -> Result<CalculatorResult, CalculatorError> {
        let benefits = input
            .social_security_amount
            .ok_or(CalculatorError::MissingField("social_security_amount"))?;
        Ok(CalculatorResult::SocialSecurity(calculate_social_security(
            input.agi,
            benefits,
            &table.social_security,
        )))
    }
}
