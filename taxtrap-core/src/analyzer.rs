//! Scenario analysis pipeline.
//!
//! One pass per scenario:
//!
//! 1. validate the input (fatal on failure)
//! 2. look up the year's table
//! 3. run every applicable calculator independently
//! 4. drop results with no cost and classify the rest by materiality
//! 5. rank by severity, then by descending impact
//! 6. total the impact
//!
//! A calculator that fails (missing field, unpublished provision, missing
//! table) contributes no warning; the failure is logged and listed in
//! [`AnalysisReport::skipped`].

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::bracket_proximity::DEFAULT_PROXIMITY_WINDOW;
use crate::calculations::common::round_half_up;
use crate::calculations::{
    AcaSubsidyCalculator, BracketProximityCalculator, CalculatorResult, CapitalGainsCalculator,
    IrmaaCalculator, SocialSecurityCalculator, TrapCalculator,
};
use crate::models::{ScenarioError, ScenarioInput, Severity, TrapType, Warning};
use crate::tables::{BuiltinTables, TaxTableRepository};

/// IRMAA tiers at or above this one are critical.
const CRITICAL_IRMAA_TIER: usize = 3;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("invalid scenario: {0}")]
    InvalidInput(#[from] ScenarioError),

    #[error("invalid analyzer configuration: {0}")]
    InvalidConfig(String),
}

/// Materiality thresholds, in annual dollars, per trap type.
///
/// A nonzero impact below its threshold is reported as `info`; at or above it
/// the trap type's own severity rule applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub irmaa_materiality: Decimal,
    pub capital_gains_materiality: Decimal,
    pub social_security_materiality: Decimal,
    pub aca_materiality: Decimal,
    /// Extra taxable income the bracket proximity check looks ahead by.
    pub bracket_proximity_window: Decimal,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            irmaa_materiality: dec!(600),
            capital_gains_materiality: dec!(100),
            social_security_materiality: dec!(250),
            aca_materiality: dec!(500),
            bracket_proximity_window: DEFAULT_PROXIMITY_WINDOW,
        }
    }
}

impl AnalyzerConfig {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] naming the first negative
    /// threshold.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let fields = [
            ("irmaa_materiality", self.irmaa_materiality),
            ("capital_gains_materiality", self.capital_gains_materiality),
            ("social_security_materiality", self.social_security_materiality),
            ("aca_materiality", self.aca_materiality),
            ("bracket_proximity_window", self.bracket_proximity_window),
        ];
        match fields.iter().find(|(_, value)| *value < Decimal::ZERO) {
            Some((name, value)) => Err(AnalysisError::InvalidConfig(format!(
                "{name} must not be negative, got {value}"
            ))),
            None => Ok(()),
        }
    }

    pub fn materiality(
        &self,
        trap_type: TrapType,
    ) -> Decimal {
        match trap_type {
            TrapType::Irmaa => self.irmaa_materiality,
            TrapType::CapitalGains => self.capital_gains_materiality,
            TrapType::SocialSecurity => self.social_security_materiality,
            TrapType::Aca => self.aca_materiality,
            TrapType::Default => Decimal::ZERO,
        }
    }
}

/// A calculator that applied to the scenario but could not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCalculation {
    pub trap_type: TrapType,
    pub calculator: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Ranked critical first, then by descending impact. At most one per trap type.
    pub warnings: Vec<Warning>,
    /// Sum of every warning's financial impact.
    pub total_impact: Decimal,
    pub skipped: Vec<SkippedCalculation>,
}

impl AnalysisReport {
    pub fn highest_severity(&self) -> Option<Severity> {
        self.warnings.iter().map(|w| w.severity).max()
    }
}

/// Runs a list of calculators against one repository of tables.
pub struct TrapAnalyzer<'a> {
    tables: &'a dyn TaxTableRepository,
    config: AnalyzerConfig,
    calculators: Vec<Box<dyn TrapCalculator>>,
}

impl<'a> TrapAnalyzer<'a> {
    /// Creates an analyzer with the built-in provisions.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        tables: &'a dyn TaxTableRepository,
        config: AnalyzerConfig,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        let calculators: Vec<Box<dyn TrapCalculator>> = vec![
            Box::new(IrmaaCalculator),
            Box::new(CapitalGainsCalculator),
            Box::new(SocialSecurityCalculator),
            Box::new(AcaSubsidyCalculator),
            Box::new(BracketProximityCalculator::new(
                config.bracket_proximity_window,
            )),
        ];
        Ok(Self {
            tables,
            config,
            calculators,
        })
    }

    /// Adds another provision to the pipeline.
    pub fn with_calculator(
        mut self,
        calculator: Box<dyn TrapCalculator>,
    ) -> Self {
        self.calculators.push(calculator);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyses one scenario.
    ///
    /// # Errors
    ///
    /// Only boundary validation is fatal: [`AnalysisError::InvalidInput`].
    /// Every other failure degrades to a [`SkippedCalculation`].
    pub fn analyze(
        &self,
        input: &ScenarioInput,
    ) -> Result<AnalysisReport, AnalysisError> {
        input.validate()?;

        let applicable: Vec<&dyn TrapCalculator> = self
            .calculators
            .iter()
            .map(|calculator| &**calculator)
            .filter(|calculator| calculator.applies_to(input))
            .collect();

        let mut results = Vec::with_capacity(applicable.len());
        let mut skipped = Vec::new();

        match self.tables.lookup(input.tax_year, input.filing_status) {
            Ok(table) => {
                for calculator in applicable {
                    match calculator.compute(input, table) {
                        Ok(result) => {
                            debug!(
                                calculator = calculator.name(),
                                impact = %result.financial_impact(),
                                "calculator finished"
                            );
                            results.push(result);
                        }
                        Err(error) => {
                            warn!(calculator = calculator.name(), %error, "calculator skipped");
                            skipped.push(SkippedCalculation {
                                trap_type: calculator.trap_type(),
                                calculator: calculator.name().to_string(),
                                reason: error.to_string(),
                            });
                        }
                    }
                }
            }
            Err(error) => {
                warn!(
                    year = input.tax_year,
                    filing_status = %input.filing_status,
                    nearest_supported_year = ?self.tables.nearest_supported_year(input.tax_year),
                    %error,
                    "no tax table, skipping every calculator"
                );
                skipped.extend(applicable.into_iter().map(|calculator| SkippedCalculation {
                    trap_type: calculator.trap_type(),
                    calculator: calculator.name().to_string(),
                    reason: error.to_string(),
                }));
            }
        }

        let mut warnings: Vec<Warning> = results
            .iter()
            .filter_map(|result| self.classify(result))
            .collect();
        rank(&mut warnings);

        let mut total_impact: Decimal = warnings.iter().map(|w| w.financial_impact).sum();
        total_impact.rescale(2);

        info!(
            year = input.tax_year,
            filing_status = %input.filing_status,
            warnings = warnings.len(),
            skipped = skipped.len(),
            %total_impact,
            "scenario analysed"
        );

        Ok(AnalysisReport {
            warnings,
            total_impact,
            skipped,
        })
    }

    /// Turns a raw result into a warning, or `None` when it costs nothing.
    fn classify(
        &self,
        result: &CalculatorResult,
    ) -> Option<Warning> {
        let mut financial_impact = round_half_up(result.financial_impact());
        if financial_impact <= Decimal::ZERO {
            return None;
        }
        financial_impact.rescale(2);

        let trap_type = result.trap_type();
        let severity = if financial_impact < self.config.materiality(trap_type) {
            Severity::Info
        } else {
            match result {
                CalculatorResult::Irmaa(r) if r.tier >= CRITICAL_IRMAA_TIER => Severity::Critical,
                CalculatorResult::Irmaa(_) => Severity::Warning,
                CalculatorResult::CapitalGains(_) => Severity::Critical,
                CalculatorResult::SocialSecurity(_) => Severity::Warning,
                CalculatorResult::Aca(r) if r.above_cliff => Severity::Critical,
                CalculatorResult::Aca(_) => Severity::Warning,
                CalculatorResult::BracketProximity(_) => Severity::Info,
            }
        };

        Some(Warning {
            trap_type,
            severity,
            title: result.title(),
            description: result.description(),
            financial_impact,
        })
    }
}

/// Sorts critical first, then by descending impact, then by trap type, and
/// keeps only the first warning of each trap type.
fn rank(warnings: &mut Vec<Warning>) {
    warnings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.financial_impact.cmp(&a.financial_impact))
            .then_with(|| a.trap_type.cmp(&b.trap_type))
    });
    let mut seen = HashSet::new();
    warnings.retain(|w| seen.insert(w.trap_type));
}

/// Analyses a scenario against the published tables with default thresholds.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] when the scenario fails validation.
pub fn analyze_scenario(input: &ScenarioInput) -> Result<AnalysisReport, AnalysisError> {
    TrapAnalyzer::new(BuiltinTables::global(), AnalyzerConfig::default())?.analyze(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert_eq, proptest};

    use super::*;
    use crate::calculations::CalculatorError;
    use crate::models::{FilingStatus, TaxYearTable};

    fn retiree_2023() -> ScenarioInput {
        let mut input =
            ScenarioInput::new(2023, FilingStatus::Single, dec!(250000), dec!(250000));
        input.medicare_enrollment = true;
        input.taxable_income = Some(dec!(150000));
        input
    }

    fn warning(
        trap_type: TrapType,
        severity: Severity,
        impact: Decimal,
    ) -> Warning {
        Warning {
            trap_type,
            severity,
            title: String::new(),
            description: String::new(),
            financial_impact: impact,
        }
    }

    struct FailingCalculator;

    impl TrapCalculator for FailingCalculator {
        fn trap_type(&self) -> TrapType {
            TrapType::Default
        }

        fn name(&self) -> &'static str {
            "failing"
        }

        fn compute(
            &self,
            _input: &ScenarioInput,
            _table: &TaxYearTable,
        ) -> Result<CalculatorResult, CalculatorError> {
            Err(CalculatorError::MissingField("something"))
        }
    }

    // =========================================================================
    // analyze tests
    // =========================================================================

    #[test]
    fn irmaa_surcharge_for_single_filer_is_critical() {
        let report = analyze_scenario(&retiree_2023()).unwrap();

        assert_eq!(report.warnings.len(), 1);
        let irmaa = &report.warnings[0];
        assert_eq!(irmaa.trap_type, TrapType::Irmaa);
        assert_eq!(irmaa.severity, Severity::Critical);
        assert_eq!(irmaa.financial_impact, dec!(5191.20));
        assert_eq!(report.total_impact, dec!(5191.20));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn non_enrollee_gets_no_irmaa_warning() {
        let mut input = retiree_2023();
        input.medicare_enrollment = false;

        let report = analyze_scenario(&input).unwrap();

        assert!(report.warnings.iter().all(|w| w.trap_type != TrapType::Irmaa));
    }

    #[test]
    fn low_irmaa_tier_is_a_warning() {
        let mut input = retiree_2023();
        input.magi = dec!(100000);

        let report = analyze_scenario(&input).unwrap();

        // (65.90 + 12.20) * 12
        assert_eq!(report.warnings[0].severity, Severity::Warning);
        assert_eq!(report.warnings[0].financial_impact, dec!(937.20));
    }

    #[test]
    fn warnings_are_ranked_by_severity_then_impact() {
        let mut input = retiree_2023();
        input.magi = dec!(100000);
        input.agi = dec!(55000);
        input.taxable_income = None;
        input.social_security_amount = Some(dec!(20000));
        input.capital_gains_long = dec!(10000);

        let report = analyze_scenario(&input).unwrap();

        let order: Vec<_> = report
            .warnings
            .iter()
            .map(|w| (w.trap_type, w.severity))
            .collect();
        // SS 3740 and IRMAA 937.20 are warnings; taxable 41150 sits 3575
        // below the 22% bracket, which is info.
        assert_eq!(
            order,
            vec![
                (TrapType::SocialSecurity, Severity::Warning),
                (TrapType::Irmaa, Severity::Warning),
                (TrapType::Default, Severity::Info),
            ]
        );
        let sum: Decimal = report.warnings.iter().map(|w| w.financial_impact).sum();
        assert_eq!(report.total_impact, sum);
    }

    #[test]
    fn capital_gains_jump_is_critical() {
        let mut input =
            ScenarioInput::new(2023, FilingStatus::MarriedFilingJointly, dec!(600000), dec!(600000));
        input.capital_gains_long = dec!(50000);
        input.taxable_income = Some(dec!(572300));

        let report = analyze_scenario(&input).unwrap();

        let gains = &report.warnings[0];
        assert_eq!(gains.trap_type, TrapType::CapitalGains);
        assert_eq!(gains.severity, Severity::Critical);
        assert_eq!(gains.financial_impact, dec!(2307.50));
    }

    #[test]
    fn capital_gains_within_one_band_raise_no_warning() {
        let mut input =
            ScenarioInput::new(2025, FilingStatus::MarriedFilingJointly, dec!(600000), dec!(600000));
        input.capital_gains_long = dec!(50000);

        let report = analyze_scenario(&input).unwrap();

        assert!(
            report
                .warnings
                .iter()
                .all(|w| w.trap_type != TrapType::CapitalGains)
        );
    }

    #[test]
    fn sub_material_impact_is_info() {
        let mut input =
            ScenarioInput::new(2023, FilingStatus::MarriedFilingJointly, dec!(90000), dec!(90000));
        input.capital_gains_long = dec!(5000);
        input.taxable_income = Some(dec!(62300));

        let report = analyze_scenario(&input).unwrap();

        let gains = report
            .warnings
            .iter()
            .find(|w| w.trap_type == TrapType::CapitalGains)
            .unwrap();
        // (90000 - 89250) * 15%
        assert_eq!(gains.financial_impact, dec!(112.50));
        assert_eq!(gains.severity, Severity::Critical);

        input.agi = dec!(89800);
        input.magi = dec!(89800);

        let report = analyze_scenario(&input).unwrap();
        let gains = report
            .warnings
            .iter()
            .find(|w| w.trap_type == TrapType::CapitalGains)
            .unwrap();
        assert_eq!(gains.financial_impact, dec!(82.50));
        assert_eq!(gains.severity, Severity::Info);
    }

    #[test]
    fn aca_cliff_is_critical() {
        let mut input =
            ScenarioInput::new(2024, FilingStatus::Single, dec!(60390.60), dec!(60390.60));
        input.aca_enrollment = true;
        input.household_size = Some(1);

        let report = analyze_scenario(&input).unwrap();

        let aca = &report.warnings[0];
        assert_eq!(aca.trap_type, TrapType::Aca);
        assert_eq!(aca.severity, Severity::Critical);
        assert_eq!(aca.financial_impact, dec!(6866.80));
    }

    #[test]
    fn missing_household_size_skips_only_aca() {
        let mut input = retiree_2023();
        input.aca_enrollment = true;

        let report = analyze_scenario(&input).unwrap();

        assert_eq!(report.warnings[0].trap_type, TrapType::Irmaa);
        assert_eq!(
            report.skipped,
            vec![SkippedCalculation {
                trap_type: TrapType::Aca,
                calculator: "aca_subsidy".to_string(),
                reason: "required scenario field 'household_size' is missing".to_string(),
            }]
        );
    }

    #[test]
    fn unpublished_provision_skips_only_that_calculator() {
        let mut input =
            ScenarioInput::new(2026, FilingStatus::Single, dec!(250000), dec!(250000));
        input.medicare_enrollment = true;
        input.aca_enrollment = true;
        input.household_size = Some(2);

        let report = analyze_scenario(&input).unwrap();

        assert_eq!(report.warnings[0].trap_type, TrapType::Irmaa);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].trap_type, TrapType::Aca);
    }

    #[test]
    fn unsupported_year_skips_every_applicable_calculator() {
        let mut input = retiree_2023();
        input.tax_year = 2019;

        let report = analyze_scenario(&input).unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(report.total_impact, dec!(0));
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.trap_type).collect();
        assert_eq!(skipped, vec![TrapType::Irmaa, TrapType::Default]);
        assert!(report.skipped[0].reason.contains("2019"));
    }

    #[test]
    fn empty_report_total_serializes_with_cents() {
        let mut input = retiree_2023();
        input.tax_year = 2019;

        let report = analyze_scenario(&input).unwrap();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["totalImpact"], "0.00");
    }

    #[test]
    fn invalid_input_fails_the_whole_call() {
        let mut input = retiree_2023();
        input.agi = dec!(-5);

        let result = analyze_scenario(&input);

        assert_eq!(
            result,
            Err(AnalysisError::InvalidInput(ScenarioError::NegativeAmount {
                field: "agi",
                value: dec!(-5),
            }))
        );
    }

    #[test]
    fn failing_extra_calculator_does_not_abort_batch() {
        let analyzer = TrapAnalyzer::new(BuiltinTables::global(), AnalyzerConfig::default())
            .unwrap()
            .with_calculator(Box::new(FailingCalculator));

        let report = analyzer.analyze(&retiree_2023()).unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.skipped[0].calculator, "failing");
    }

    #[test]
    fn negative_config_is_rejected() {
        let config = AnalyzerConfig {
            aca_materiality: dec!(-1),
            ..AnalyzerConfig::default()
        };

        let result = TrapAnalyzer::new(BuiltinTables::global(), config).map(|_| ());

        assert_eq!(
            result,
            Err(AnalysisError::InvalidConfig(
                "aca_materiality must not be negative, got -1".to_string()
            ))
        );
    }

    // =========================================================================
    // rank tests
    // =========================================================================

    #[test]
    fn rank_keeps_highest_ranked_warning_per_trap_type() {
        let mut warnings = vec![
            warning(TrapType::Aca, Severity::Warning, dec!(800)),
            warning(TrapType::Irmaa, Severity::Info, dec!(50)),
            warning(TrapType::Aca, Severity::Critical, dec!(100)),
            warning(TrapType::Irmaa, Severity::Warning, dec!(900)),
        ];

        rank(&mut warnings);

        let ranked: Vec<_> = warnings
            .iter()
            .map(|w| (w.trap_type, w.severity, w.financial_impact))
            .collect();
        assert_eq!(
            ranked,
            vec![
                (TrapType::Aca, Severity::Critical, dec!(100)),
                (TrapType::Irmaa, Severity::Warning, dec!(900)),
            ]
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_analysis_is_idempotent(
            magi in 0u32..900_000,
            benefits in 0u32..60_000,
            gains in 0u32..200_000,
            household in 1u32..6,
            status_idx in 0usize..5,
            year_idx in 0usize..4,
        ) {
            let year = [2023, 2024, 2025, 2026][year_idx];
            let mut input = ScenarioInput::new(
                year,
                FilingStatus::ALL[status_idx],
                Decimal::from(magi),
                Decimal::from(magi),
            );
            input.capital_gains_long = Decimal::from(gains);
            input.social_security_amount = Some(Decimal::from(benefits));
            input.household_size = Some(household);
            input.medicare_enrollment = true;
            input.aca_enrollment = true;

            let first = analyze_scenario(&input).unwrap();
            let second = analyze_scenario(&input).unwrap();

            prop_assert_eq!(first, second);
        }
    }
}
