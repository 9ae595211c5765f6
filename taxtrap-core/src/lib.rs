//! Tax threshold and trap analysis engine.
//!
//! Evaluates how a taxpayer's income interacts with progressive brackets and
//! benefit-cliff thresholds (Medicare IRMAA surcharges, capital-gains rate
//! breakpoints, Social Security benefit taxability, ACA subsidy cliffs) and
//! turns the results into ranked, quantified warnings.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxtrap_core::{FilingStatus, ScenarioInput, Severity, TrapType, analyze_scenario};
//!
//! let mut input = ScenarioInput::new(2023, FilingStatus::Single, dec!(250000), dec!(250000));
//! input.medicare_enrollment = true;
//!
//! let report = analyze_scenario(&input).unwrap();
//!
//! let irmaa = &report.warnings[0];
//! assert_eq!(irmaa.trap_type, TrapType::Irmaa);
//! assert_eq!(irmaa.severity, Severity::Critical);
//! ```

pub mod analyzer;
pub mod calculations;
pub mod models;
pub mod tables;

pub use analyzer::{
    AnalysisError, AnalysisReport, AnalyzerConfig, SkippedCalculation, TrapAnalyzer,
    analyze_scenario,
};
pub use calculations::{CalculatorError, CalculatorResult, TrapCalculator};
pub use models::*;
pub use tables::{BuiltinTables, TableError, TaxTableRepository};
