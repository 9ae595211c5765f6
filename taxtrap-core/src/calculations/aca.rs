//! ACA premium tax credit and the 400% FPL subsidy cliff.
//!
//! The expected contribution toward a benchmark plan is a share of income
//! that depends on where household income sits relative to the federal
//! poverty level. [`PREMIUM_CAP_BANDS`] pairs the enhanced contribution caps
//! with the original ones; above 400% FPL the original rules give no credit
//! at all and the household pays the full [`UNSUBSIDIZED_BENCHMARK_PREMIUM`].
//!
//! Both the flat benchmark premium and the single cap rate per band are
//! approximations of the sliding scales in the statute.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::brackets::thresholds_exceeded;
use crate::calculations::common::{format_currency, format_rate, max, min, round_half_up};
use crate::calculations::{CalculatorError, CalculatorResult, TrapCalculator};
use crate::models::{PovertyGuidelines, ScenarioInput, TaxYearTable, TrapType};

/// Annual unsubsidized benchmark silver premium assumed for every household.
pub const UNSUBSIDIZED_BENCHMARK_PREMIUM: Decimal = dec!(12000);

/// FPL percentage above which the original rules provide no credit.
pub const SUBSIDY_CLIFF_FPL_PERCENTAGE: Decimal = dec!(400);

/// Expected contribution, as a share of income, for one FPL band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumCapBand {
    /// Inclusive upper bound of the band; `None` for the open top band.
    pub max_fpl_percentage: Option<Decimal>,
    /// Cap under the enhanced credit.
    pub enhanced_cap_rate: Decimal,
    /// Cap under the original credit; `None` means no credit is available.
    pub original_cap_rate: Option<Decimal>,
}

pub const PREMIUM_CAP_BANDS: [PremiumCapBand; 6] = [
    PremiumCapBand {
        max_fpl_percentage: Some(dec!(150)),
        enhanced_cap_rate: dec!(0.00),
        original_cap_rate: Some(dec!(0.0207)),
    },
    PremiumCapBand {
        max_fpl_percentage: Some(dec!(200)),
        enhanced_cap_rate: dec!(0.02),
        original_cap_rate: Some(dec!(0.0414)),
    },
    PremiumCapBand {
        max_fpl_percentage: Some(dec!(250)),
        enhanced_cap_rate: dec!(0.04),
        original_cap_rate: Some(dec!(0.0652)),
    },
    PremiumCapBand {
        max_fpl_percentage: Some(dec!(300)),
        enhanced_cap_rate: dec!(0.06),
        original_cap_rate: Some(dec!(0.0829)),
    },
    PremiumCapBand {
        max_fpl_percentage: Some(SUBSIDY_CLIFF_FPL_PERCENTAGE),
        enhanced_cap_rate: dec!(0.085),
        original_cap_rate: Some(dec!(0.095)),
    },
    PremiumCapBand {
        max_fpl_percentage: None,
        enhanced_cap_rate: dec!(0.085),
        original_cap_rate: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcaSubsidyResult {
    pub magi: Decimal,
    pub household_size: u32,
    pub household_fpl: Decimal,
    /// MAGI as a percentage of `household_fpl`, rounded to two places.
    pub fpl_percentage: Decimal,
    pub old_cap_rate: Decimal,
    /// `None` above the cliff, where no cap applies.
    pub new_cap_rate: Option<Decimal>,
    /// Annual premium under the enhanced caps.
    pub old_premium: Decimal,
    /// Annual premium under the original caps.
    pub new_premium: Decimal,
    pub subsidy_loss: Decimal,
    /// `None` when the baseline premium is zero and a percentage is meaningless.
    pub premium_increase_pct: Option<Decimal>,
    pub above_cliff: bool,
}

impl AcaSubsidyResult {
    pub fn title(&self) -> String {
        match self.new_cap_rate {
            None => format!(
                "ACA subsidy cliff: income at {}% of FPL",
                self.fpl_percentage.normalize()
            ),
            Some(new_rate) => format!(
                "ACA premium cap rises from {} to {} of income",
                format_rate(self.old_cap_rate),
                format_rate(new_rate)
            ),
        }
    }

    pub fn description(&self) -> String {
        let increase = match self.premium_increase_pct {
            Some(pct) => format!(" (+{}%)", pct.normalize()),
            None => " (baseline premium is $0, so no percentage applies)".to_string(),
        };
        format!(
            "Household of {} at {}% of the federal poverty level ({}). Benchmark premium rises from {} to {} a year{}, a loss of {} in subsidy.",
            self.household_size,
            self.fpl_percentage.normalize(),
            format_currency(self.household_fpl),
            format_currency(self.old_premium),
            format_currency(self.new_premium),
            increase,
            format_currency(self.subsidy_loss),
        )
    }
}

/// Compares the benchmark premium under the enhanced and original credit.
///
/// Premiums are capped at [`UNSUBSIDIZED_BENCHMARK_PREMIUM`]: no household
/// pays more than the full benchmark.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxtrap_core::PovertyGuidelines;
/// use taxtrap_core::calculations::calculate_aca_subsidy;
/// use taxtrap_core::calculations::aca::UNSUBSIDIZED_BENCHMARK_PREMIUM;
///
/// let fpl = PovertyGuidelines { base: dec!(15060), per_additional_person: dec!(5380) };
///
/// let result = calculate_aca_subsidy(dec!(60390.60), 1, &fpl);
///
/// assert_eq!(result.fpl_percentage, dec!(401));
/// assert!(result.above_cliff);
/// assert_eq!(result.new_premium, UNSUBSIDIZED_BENCHMARK_PREMIUM);
/// ```
pub fn calculate_aca_subsidy(
    magi: Decimal,
    household_size: u32,
    guidelines: &PovertyGuidelines,
) -> AcaSubsidyResult {
    let household_fpl = guidelines.for_household(household_size);
    let fpl_percentage = magi
        .checked_div(household_fpl)
        .map_or(Decimal::ZERO, |ratio| ratio * dec!(100));

    let band_bounds = PREMIUM_CAP_BANDS
        .iter()
        .filter_map(|band| band.max_fpl_percentage);
    let band = PREMIUM_CAP_BANDS[thresholds_exceeded(fpl_percentage, band_bounds)];

    let premium_at = |rate: Decimal| min(round_half_up(magi * rate), UNSUBSIDIZED_BENCHMARK_PREMIUM);
    let old_premium = premium_at(band.enhanced_cap_rate);
    let new_premium = band
        .original_cap_rate
        .map_or(UNSUBSIDIZED_BENCHMARK_PREMIUM, premium_at);

    let subsidy_loss = max(new_premium - old_premium, Decimal::ZERO);
    let premium_increase_pct = if old_premium.is_zero() {
        None
    } else {
        Some(round_half_up(subsidy_loss / old_premium * dec!(100)))
    };

    AcaSubsidyResult {
        magi,
        household_size,
        household_fpl,
        fpl_percentage: round_half_up(fpl_percentage),
        old_cap_rate: band.enhanced_cap_rate,
        new_cap_rate: band.original_cap_rate,
        old_premium,
        new_premium,
        subsidy_loss,
        premium_increase_pct,
        above_cliff: band.original_cap_rate.is_none(),
    }
}

/// Runs for marketplace enrollees; needs the household size.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcaSubsidyCalculator;

impl TrapCalculator for AcaSubsidyCalculator {
    fn trap_type(&self) -> TrapType {
        TrapType::Aca
    }

    fn name(&self) -> &'static str {
        "aca_subsidy"
    }

    fn applies_to(
        &self,
        input: &ScenarioInput,
    ) -> bool {
        input.aca_enrollment
    }

    fn compute(
        &self,
        input: &ScenarioInput,
        table: &TaxYearTable,
    ) -> Result<CalculatorResult, CalculatorError> {
        let household_size = input
            .household_size
            .ok_or(CalculatorError::MissingField("household_size"))?;
        let guidelines = table.poverty_guidelines()?;
        Ok(CalculatorResult::Aca(calculate_aca_subsidy(
            input.magi,
            household_size,
            guidelines,
        )))
    }
}
