//! Threshold calculators.
//!
//! Each provision is a pure function of a [`ScenarioInput`] and the
//! matching [`TaxYearTable`], wrapped in a stateless [`TrapCalculator`] so
//! the analyzer can run them as one homogeneous list.

pub mod aca;
pub mod bracket_proximity;
pub mod brackets;
pub mod capital_gains;
pub mod common;
pub mod irmaa;
pub mod social_security;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{ScenarioInput, TaxYearTable, TrapType};
use crate::tables::TableError;

pub use aca::{AcaSubsidyCalculator, AcaSubsidyResult, calculate_aca_subsidy};
pub use bracket_proximity::{
    BracketProximityCalculator, BracketProximityResult, calculate_bracket_proximity,
};
pub use brackets::{
    BracketEngine, BracketError, ProgressiveTax, compute_progressive_tax, thresholds_exceeded,
};
pub use capital_gains::{CapitalGainsCalculator, CapitalGainsResult, calculate_capital_gains};
pub use irmaa::{IrmaaCalculator, IrmaaResult, calculate_irmaa};
pub use social_security::{
    SocialSecurityCalculator, SocialSecurityResult, SocialSecurityZone,
    calculate_social_security,
};

/// Why a single calculator produced no result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculatorError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error("required scenario field '{0}' is missing")]
    MissingField(&'static str),
}

/// Raw output of one calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculatorResult {
    Irmaa(IrmaaResult),
    CapitalGains(CapitalGainsResult),
    SocialSecurity(SocialSecurityResult),
    Aca(AcaSubsidyResult),
    BracketProximity(BracketProximityResult),
}

impl CalculatorResult {
    pub fn trap_type(&self) -> TrapType {
        match self {
            Self::Irmaa(_) => TrapType::Irmaa,
            Self::CapitalGains(_) => TrapType::CapitalGains,
            Self::SocialSecurity(_) => TrapType::SocialSecurity,
            Self::Aca(_) => TrapType::Aca,
            Self::BracketProximity(_) => TrapType::Default,
        }
    }

    /// Annual dollar cost of the trap, never negative.
    pub fn financial_impact(&self) -> Decimal {
        match self {
            Self::Irmaa(r) => r.annual_surcharge(),
            Self::CapitalGains(r) => r.tax_increase,
            Self::SocialSecurity(r) => r.tax_impact,
            Self::Aca(r) => r.subsidy_loss,
            Self::BracketProximity(r) => r.extra_tax,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Irmaa(r) => r.title(),
            Self::CapitalGains(r) => r.title(),
            Self::SocialSecurity(r) => r.title(),
            Self::Aca(r) => r.title(),
            Self::BracketProximity(r) => r.title(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Irmaa(r) => r.description(),
            Self::CapitalGains(r) => r.description(),
            Self::SocialSecurity(r) => r.description(),
            Self::Aca(r) => r.description(),
            Self::BracketProximity(r) => r.description(),
        }
    }
}

/// A single provision the analyzer can evaluate.
pub trait TrapCalculator: Send + Sync {
    fn trap_type(&self) -> TrapType;

    /// Short identifier used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Whether the provision is relevant to the scenario at all. Provisions
    /// that do not apply are not run and not reported as skipped.
    fn applies_to(
        &self,
        _input: &ScenarioInput,
    ) -> bool {
        true
    }

    fn compute(
        &self,
        input: &ScenarioInput,
        table: &TaxYearTable,
    ) -> Result<CalculatorResult, CalculatorError>;
}
