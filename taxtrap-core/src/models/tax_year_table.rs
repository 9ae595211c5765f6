use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::{FilingStatus, TaxBracket};
use crate::tables::TableError;

/// Number of surcharge tiers on the Medicare IRMAA ladder.
pub const IRMAA_TIER_COUNT: usize = 5;

/// Taxable-income breakpoints separating the 0%, 15% and 20% long-term
/// capital-gains rate zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsBreakpoints {
    /// Top of the 0% zone.
    pub zero_rate_max: Decimal,
    /// Top of the 15% zone; income above it is in the 20% zone.
    pub fifteen_rate_max: Decimal,
}

impl CapitalGainsBreakpoints {
    pub const RATES: [Decimal; 3] = [dec!(0.00), dec!(0.15), dec!(0.20)];

    /// The breakpoints as a progressive schedule so rate lookups go through
    /// the bracket engine.
    pub fn brackets(&self) -> Vec<TaxBracket> {
        TaxBracket::schedule(&[self.zero_rate_max, self.fifteen_rate_max], &Self::RATES)
    }

    pub fn thresholds(&self) -> [Decimal; 2] {
        [self.zero_rate_max, self.fifteen_rate_max]
    }
}

/// Monthly Part B and Part D surcharge for one IRMAA tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrmaaSurcharge {
    pub part_b: Decimal,
    pub part_d: Decimal,
}

impl IrmaaSurcharge {
    pub const NONE: IrmaaSurcharge = IrmaaSurcharge {
        part_b: Decimal::ZERO,
        part_d: Decimal::ZERO,
    };

    pub fn total(&self) -> Decimal {
        self.part_b + self.part_d
    }
}

/// The five-step IRMAA ladder for one filing status.
///
/// `surcharges[i]` applies once MAGI is strictly greater than `thresholds[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrmaaSchedule {
    pub thresholds: [Decimal; IRMAA_TIER_COUNT],
    pub surcharges: [IrmaaSurcharge; IRMAA_TIER_COUNT],
}

/// Combined-income thresholds for Social Security benefit taxation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityThresholds {
    pub base_amount: Decimal,
    pub second_threshold: Decimal,
}

/// Federal poverty guidelines used for ACA subsidy bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PovertyGuidelines {
    /// Guideline for a household of one.
    pub base: Decimal,
    /// Added for each additional household member.
    pub per_additional_person: Decimal,
}

impl PovertyGuidelines {
    pub fn for_household(
        &self,
        household_size: u32,
    ) -> Decimal {
        let extra = household_size.saturating_sub(1);
        self.base + self.per_additional_person * Decimal::from(extra)
    }
}

/// Every published constant for one `(tax_year, filing_status)` pair.
///
/// Sections that may lag behind the rest of the year's publication are
/// optional; asking for a missing one yields
/// [`TableError::ProvisionUnavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearTable {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub ordinary_brackets: Vec<TaxBracket>,
    pub capital_gains: CapitalGainsBreakpoints,
    pub standard_deduction: Decimal,
    pub irmaa: Option<IrmaaSchedule>,
    pub social_security: SocialSecurityThresholds,
    pub poverty_guidelines: Option<PovertyGuidelines>,
}

impl TaxYearTable {
    pub fn irmaa_schedule(&self) -> Result<&IrmaaSchedule, TableError> {
        self.irmaa
            .as_ref()
            .ok_or(TableError::ProvisionUnavailable {
                year: self.tax_year,
                provision: "Medicare IRMAA",
            })
    }

    pub fn poverty_guidelines(&self) -> Result<&PovertyGuidelines, TableError> {
        self.poverty_guidelines
            .as_ref()
            .ok_or(TableError::ProvisionUnavailable {
                year: self.tax_year,
                provision: "ACA poverty guidelines",
            })
    }

    /// Checks the structural invariants of the table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidTable`] if:
    /// - ordinary brackets are empty, do not start at zero, are not
    ///   contiguous, or the last bracket is capped
    /// - an ordinary rate lies outside `(0, 1]`
    /// - any ladder of thresholds is not strictly increasing
    /// - the standard deduction is negative
    pub fn validate(&self) -> Result<(), TableError> {
        let invalid = |reason: String| TableError::InvalidTable {
            year: self.tax_year,
            filing_status: self.filing_status,
            reason,
        };

        let first = self
            .ordinary_brackets
            .first()
            .ok_or_else(|| invalid("no ordinary brackets".to_string()))?;
        if first.min_income != Decimal::ZERO {
            return Err(invalid(format!(
                "first bracket starts at {} instead of 0",
                first.min_income
            )));
        }
        for pair in self.ordinary_brackets.windows(2) {
            if pair[0].max_income != Some(pair[1].min_income) {
                return Err(invalid(format!(
                    "bracket ending at {:?} is not followed by one starting there (got {})",
                    pair[0].max_income, pair[1].min_income
                )));
            }
            if pair[1].min_income <= pair[0].min_income {
                return Err(invalid(format!(
                    "bracket thresholds not increasing at {}",
                    pair[1].min_income
                )));
            }
        }
        if let Some(last) = self.ordinary_brackets.last() {
            if last.max_income.is_some() {
                return Err(invalid("top bracket must be open-ended".to_string()));
            }
        }
        if let Some(bad) = self
            .ordinary_brackets
            .iter()
            .find(|b| b.tax_rate <= Decimal::ZERO || b.tax_rate > Decimal::ONE)
        {
            return Err(invalid(format!("rate {} outside (0, 1]", bad.tax_rate)));
        }

        if !strictly_increasing(&self.capital_gains.thresholds()) {
            return Err(invalid("capital gains breakpoints not increasing".to_string()));
        }
        if let Some(irmaa) = &self.irmaa {
            if !strictly_increasing(&irmaa.thresholds) {
                return Err(invalid("IRMAA thresholds not increasing".to_string()));
            }
        }
        // Married filing separately has both thresholds at zero.
        if self.social_security.second_threshold < self.social_security.base_amount {
            return Err(invalid(
                "Social Security second threshold below base amount".to_string(),
            ));
        }
        if self.standard_deduction < Decimal::ZERO {
            return Err(invalid(format!(
                "negative standard deduction {}",
                self.standard_deduction
            )));
        }

        Ok(())
    }
}

fn strictly_increasing(values: &[Decimal]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_table() -> TaxYearTable {
        TaxYearTable {
            tax_year: 2023,
            filing_status: FilingStatus::Single,
            ordinary_brackets: TaxBracket::schedule(
                &[dec!(11000), dec!(44725)],
                &[dec!(0.10), dec!(0.12), dec!(0.22)],
            ),
            capital_gains: CapitalGainsBreakpoints {
                zero_rate_max: dec!(44625),
                fifteen_rate_max: dec!(492300),
            },
            standard_deduction: dec!(13850),
            irmaa: None,
            social_security: SocialSecurityThresholds {
                base_amount: dec!(25000),
                second_threshold: dec!(34000),
            },
            poverty_guidelines: None,
        }
    }

    #[test]
    fn validate_accepts_well_formed_table() {
        assert_eq!(sample_table().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_gap_between_brackets() {
        let mut table = sample_table();
        table.ordinary_brackets[1].min_income = dec!(12000);

        assert!(matches!(
            table.validate(),
            Err(TableError::InvalidTable { .. })
        ));
    }

    #[test]
    fn validate_rejects_capped_top_bracket() {
        let mut table = sample_table();
        table.ordinary_brackets[2].max_income = Some(dec!(100000));

        assert!(table.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_ordinary_rate() {
        let mut table = sample_table();
        table.ordinary_brackets[0].tax_rate = dec!(0);

        assert!(table.validate().is_err());
    }

    #[test]
    fn validate_rejects_descending_capital_gains_breakpoints() {
        let mut table = sample_table();
        table.capital_gains.fifteen_rate_max = dec!(40000);

        assert!(table.validate().is_err());
    }

    #[test]
    fn missing_irmaa_section_is_provision_unavailable() {
        let table = sample_table();

        assert_eq!(
            table.irmaa_schedule(),
            Err(TableError::ProvisionUnavailable {
                year: 2023,
                provision: "Medicare IRMAA",
            })
        );
    }

    #[test]
    fn household_guideline_adds_increment_per_extra_member() {
        let guidelines = PovertyGuidelines {
            base: dec!(14580),
            per_additional_person: dec!(5140),
        };

        assert_eq!(guidelines.for_household(1), dec!(14580));
        assert_eq!(guidelines.for_household(4), dec!(30000));
    }

    #[test]
    fn capital_gains_brackets_cover_three_zones() {
        let brackets = sample_table().capital_gains.brackets();

        assert_eq!(brackets.len(), 3);
        assert_eq!(brackets[2].min_income, dec!(492300));
        assert_eq!(brackets[2].tax_rate, dec!(0.20));
    }
}
