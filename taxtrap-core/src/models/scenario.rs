use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::FilingStatus;

/// Rejections raised at the boundary, before any calculator runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("household size must be at least 1")]
    InvalidHouseholdSize,
}

/// One what-if scenario to analyse.
///
/// A plain value: build a new one to recompute rather than mutating an
/// analysed instance. Optional fields gate the provisions that need them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    /// Modified adjusted gross income (IRMAA and ACA basis).
    pub magi: Decimal,
    /// Adjusted gross income (capital gains and Social Security basis).
    pub agi: Decimal,
    pub total_income: Decimal,
    /// Falls back to AGI less the standard deduction when absent.
    pub taxable_income: Option<Decimal>,
    pub capital_gains_long: Decimal,
    pub capital_gains_short: Decimal,
    pub social_security_amount: Option<Decimal>,
    pub household_size: Option<u32>,
    pub medicare_enrollment: bool,
    pub aca_enrollment: bool,
}

impl ScenarioInput {
    /// Creates a scenario with only the required income figures; every
    /// optional field is empty and both enrollment flags are off.
    pub fn new(
        tax_year: i32,
        filing_status: FilingStatus,
        magi: Decimal,
        agi: Decimal,
    ) -> Self {
        Self {
            tax_year,
            filing_status,
            magi,
            agi,
            total_income: agi,
            taxable_income: None,
            capital_gains_long: Decimal::ZERO,
            capital_gains_short: Decimal::ZERO,
            social_security_amount: None,
            household_size: None,
            medicare_enrollment: false,
            aca_enrollment: false,
        }
    }

    /// Rejects negative amounts and an empty household.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScenarioError`] found, checking amounts in field
    /// order.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let amounts = [
            ("magi", Some(self.magi)),
            ("agi", Some(self.agi)),
            ("total_income", Some(self.total_income)),
            ("taxable_income", self.taxable_income),
            ("capital_gains_long", Some(self.capital_gains_long)),
            ("capital_gains_short", Some(self.capital_gains_short)),
            ("social_security_amount", self.social_security_amount),
        ];
        for (field, value) in amounts {
            if let Some(value) = value {
                if value < Decimal::ZERO {
                    return Err(ScenarioError::NegativeAmount { field, value });
                }
            }
        }

        if self.household_size == Some(0) {
            return Err(ScenarioError::InvalidHouseholdSize);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn scenario() -> ScenarioInput {
        ScenarioInput::new(2024, FilingStatus::Single, dec!(90000), dec!(85000))
    }

    #[test]
    fn new_defaults_total_income_to_agi() {
        let input = scenario();

        assert_eq!(input.total_income, dec!(85000));
        assert!(input.taxable_income.is_none());
        assert!(!input.medicare_enrollment);
    }

    #[test]
    fn validate_accepts_zero_income() {
        let input = ScenarioInput::new(2024, FilingStatus::Single, dec!(0), dec!(0));

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_magi() {
        let mut input = scenario();
        input.magi = dec!(-1);

        assert_eq!(
            input.validate(),
            Err(ScenarioError::NegativeAmount {
                field: "magi",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_optional_benefit() {
        let mut input = scenario();
        input.social_security_amount = Some(dec!(-500));

        assert!(matches!(
            input.validate(),
            Err(ScenarioError::NegativeAmount {
                field: "social_security_amount",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_empty_household() {
        let mut input = scenario();
        input.household_size = Some(0);

        assert_eq!(input.validate(), Err(ScenarioError::InvalidHouseholdSize));
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "taxYear": 2023,
            "filingStatus": "MFJ",
            "magi": "600000",
            "agi": "600000",
            "totalIncome": "600000",
            "taxableIncome": null,
            "capitalGainsLong": "50000",
            "capitalGainsShort": "0",
            "socialSecurityAmount": null,
            "householdSize": 2,
            "medicareEnrollment": false,
            "acaEnrollment": false
        }"#;

        let input: ScenarioInput = serde_json::from_str(json).unwrap();

        assert_eq!(input.filing_status, FilingStatus::MarriedFilingJointly);
        assert_eq!(input.capital_gains_long, dec!(50000));
        assert_eq!(input.household_size, Some(2));
    }

    #[test]
    fn unknown_filing_status_never_becomes_a_scenario() {
        let json = r#"{
            "taxYear": 2023,
            "filingStatus": "JOINT",
            "magi": "1000",
            "agi": "1000",
            "totalIncome": "1000",
            "taxableIncome": null,
            "capitalGainsLong": "0",
            "capitalGainsShort": "0",
            "socialSecurityAmount": null,
            "householdSize": null,
            "medicareEnrollment": false,
            "acaEnrollment": false
        }"#;

        let err = serde_json::from_str::<ScenarioInput>(json).unwrap_err();

        assert!(err.to_string().contains("unknown variant `JOINT`"));
    }
}
