//! Medicare Income-Related Monthly Adjustment Amount.
//!
//! MAGI is placed on a five-step ladder; each step adds a fixed monthly
//! surcharge to the Part B and Part D premiums. Joint returns use their own
//! ladder. A MAGI exactly equal to a threshold does not reach that step.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::brackets::thresholds_exceeded;
use crate::calculations::common::{format_currency, round_half_up};
use crate::calculations::{CalculatorError, CalculatorResult, TrapCalculator};
use crate::models::{IrmaaSchedule, IrmaaSurcharge, ScenarioInput, TaxYearTable, TrapType};

const MONTHS_PER_YEAR: Decimal = dec!(12);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrmaaResult {
    pub magi: Decimal,
    /// Number of thresholds MAGI strictly exceeds: 0 when no surcharge
    /// applies, otherwise 1 through 5. This is 1-based over the surcharge
    /// steps, so `tier` n is index n - 1 of [`IrmaaSchedule::surcharges`],
    /// and warning titles quote it as is (single 2023 MAGI 250,000 is
    /// "tier 4", the 183,000 to 500,000 step).
    pub tier: usize,
    /// Monthly Part B surcharge.
    pub part_b_surcharge: Decimal,
    /// Monthly Part D surcharge.
    pub part_d_surcharge: Decimal,
    /// Monthly total per beneficiary; not annualized.
    pub total_surcharge: Decimal,
    /// Threshold MAGI had to exceed to reach `tier`.
    pub crossed_threshold: Option<Decimal>,
    /// Threshold of the following tier, if any.
    pub next_threshold: Option<Decimal>,
}

impl IrmaaResult {
    pub fn annual_surcharge(&self) -> Decimal {
        round_half_up(self.total_surcharge * MONTHS_PER_YEAR)
    }

    pub fn title(&self) -> String {
        format!("Medicare IRMAA tier {} surcharge", self.tier)
    }

    pub fn description(&self) -> String {
        let mut text = match self.crossed_threshold {
            Some(threshold) => format!(
                "MAGI of {} exceeds the {} IRMAA threshold by {}, adding {}/month to Part B and {}/month to Part D ({}/month, {}/year per beneficiary).",
                format_currency(self.magi),
                format_currency(threshold),
                format_currency(self.magi - threshold),
                format_currency(self.part_b_surcharge),
                format_currency(self.part_d_surcharge),
                format_currency(self.total_surcharge),
                format_currency(self.annual_surcharge()),
            ),
            None => format!(
                "MAGI of {} is below the first IRMAA threshold.",
                format_currency(self.magi)
            ),
        };
        if let Some(next) = self.next_threshold {
            text.push_str(&format!(
                " The next tier starts above {}.",
                format_currency(next)
            ));
        }
        text
    }
}

/// Places `magi` on the IRMAA ladder.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxtrap_core::{BuiltinTables, FilingStatus, TaxTableRepository};
/// use taxtrap_core::calculations::calculate_irmaa;
///
/// let table = BuiltinTables::global().lookup(2023, FilingStatus::Single).unwrap();
/// let result = calculate_irmaa(dec!(130000), table.irmaa_schedule().unwrap());
///
/// assert_eq!(result.tier, 2);
/// assert_eq!(result.total_surcharge, dec!(196.30));
/// ```
pub fn calculate_irmaa(
    magi: Decimal,
    schedule: &IrmaaSchedule,
) -> IrmaaResult {
    let tier = thresholds_exceeded(magi, schedule.thresholds);
    let surcharge = match tier {
        0 => IrmaaSurcharge::NONE,
        n => schedule.surcharges[n - 1],
    };

    IrmaaResult {
        magi,
        tier,
        part_b_surcharge: surcharge.part_b,
        part_d_surcharge: surcharge.part_d,
        total_surcharge: surcharge.total(),
        crossed_threshold: tier.checked_sub(1).map(|idx| schedule.thresholds[idx]),
        next_threshold: schedule.thresholds.get(tier).copied(),
    }
}

/// Runs for Medicare enrollees only.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrmaaCalculator;

impl TrapCalculator for IrmaaCalculator {
    fn trap_type(&self) -> TrapType {
        TrapType::Irmaa
    }

    fn name(&self) -> &'static str {
        "irmaa"
    }

    fn applies_to(
        &self,
        input: &ScenarioInput,
    ) -> bool {
        input.medicare_enrollment
    }

    fn compute(
        &self,
        input: &ScenarioInput,
        table: &TaxYearTable,
    ) -> Result<CalculatorResult, CalculatorError> {
        let schedule = table.irmaa_schedule()?;
        Ok(CalculatorResult::Irmaa(calculate_irmaa(input.magi, schedule)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, proptest};

    use super::*;
    use crate::models::FilingStatus;
    use crate::tables::{BuiltinTables, TaxTableRepository};

    fn schedule(
        year: i32,
        status: FilingStatus,
    ) -> &'static IrmaaSchedule {
        BuiltinTables::global()
            .lookup(year, status)
            .unwrap()
            .irmaa_schedule()
            .unwrap()
    }

    #[test]
    fn single_2023_at_250k_lands_in_183k_to_500k_step() {
        let result = calculate_irmaa(dec!(250000), schedule(2023, FilingStatus::Single));

        assert_eq!(result.tier, 4);
        assert_eq!(result.part_b_surcharge, dec!(362.60));
        assert_eq!(result.part_d_surcharge, dec!(70.00));
        assert_eq!(result.total_surcharge, dec!(432.60));
        assert_eq!(result.annual_surcharge(), dec!(5191.20));
        assert_eq!(result.crossed_threshold, Some(dec!(183000)));
        assert_eq!(result.next_threshold, Some(dec!(500000)));
    }

    #[test]
    fn title_quotes_one_based_tier() {
        let ladder = schedule(2023, FilingStatus::Single);
        let result = calculate_irmaa(dec!(250000), ladder);

        assert_eq!(result.title(), "Medicare IRMAA tier 4 surcharge");
        assert_eq!(
            ladder.surcharges[result.tier - 1].total(),
            result.total_surcharge
        );
    }

    #[test]
    fn magi_equal_to_threshold_does_not_trigger_tier() {
        let ladder = schedule(2023, FilingStatus::Single);

        for (idx, threshold) in ladder.thresholds.iter().enumerate() {
            let at = calculate_irmaa(*threshold, ladder);
            let above = calculate_irmaa(*threshold + dec!(0.01), ladder);

            assert_eq!(at.tier, idx);
            assert_eq!(above.tier, idx + 1);
        }
    }

    #[test]
    fn below_first_threshold_has_no_surcharge() {
        let result = calculate_irmaa(dec!(90000), schedule(2024, FilingStatus::Single));

        assert_eq!(result.tier, 0);
        assert_eq!(result.total_surcharge, dec!(0));
        assert_eq!(result.annual_surcharge(), dec!(0));
        assert_eq!(result.crossed_threshold, None);
        assert_eq!(result.next_threshold, Some(dec!(103000)));
    }

    #[test]
    fn joint_return_uses_joint_ladder() {
        let single = calculate_irmaa(dec!(200000), schedule(2023, FilingStatus::Single));
        let joint = calculate_irmaa(
            dec!(200000),
            schedule(2023, FilingStatus::MarriedFilingJointly),
        );

        assert_eq!(single.tier, 4);
        assert_eq!(joint.tier, 1);
    }

    #[test]
    fn separate_and_head_of_household_share_individual_ladder() {
        let single = schedule(2025, FilingStatus::Single);

        assert_eq!(schedule(2025, FilingStatus::MarriedFilingSeparately), single);
        assert_eq!(schedule(2025, FilingStatus::HeadOfHousehold), single);
    }

    #[test]
    fn top_tier_has_no_next_threshold() {
        let result = calculate_irmaa(dec!(800000), schedule(2025, FilingStatus::Single));

        assert_eq!(result.tier, 5);
        assert_eq!(result.total_surcharge, dec!(529.70));
        assert_eq!(result.next_threshold, None);
    }

    #[test]
    fn calculator_only_applies_to_medicare_enrollees() {
        let mut input = ScenarioInput::new(2023, FilingStatus::Single, dec!(1), dec!(1));

        assert!(!IrmaaCalculator.applies_to(&input));
        input.medicare_enrollment = true;
        assert!(IrmaaCalculator.applies_to(&input));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_tier_is_monotone_in_magi(a in 0u32..1_000_000, b in 0u32..1_000_000, joint in proptest::bool::ANY) {
            let status = if joint { FilingStatus::MarriedFilingJointly } else { FilingStatus::Single };
            let ladder = schedule(2024, status);
            let (low, high) = if a <= b { (a, b) } else { (b, a) };

            let low_tier = calculate_irmaa(Decimal::from(low), ladder).tier;
            let high_tier = calculate_irmaa(Decimal::from(high), ladder).tier;

            prop_assert!(low_tier <= high_tier);
        }
    }
}
