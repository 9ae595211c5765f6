//! Text and JSON rendering of analysis results.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use taxtrap_core::calculations::common::format_currency;
use taxtrap_core::{AnalysisError, AnalysisReport, BuiltinTables, FilingStatus, ScenarioInput};

use crate::config::OutputFormat;

/// One analysed scenario. `row` is the 1-based CSV row for batch runs.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub row: Option<usize>,
    pub scenario: ScenarioInput,
    pub result: Result<AnalysisReport, AnalysisError>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeJson<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    row: Option<usize>,
    scenario: &'a ScenarioInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a ScenarioOutcome> for OutcomeJson<'a> {
    fn from(outcome: &'a ScenarioOutcome) -> Self {
        Self {
            row: outcome.row,
            scenario: &outcome.scenario,
            report: outcome.result.as_ref().ok(),
            error: outcome.result.as_ref().err().map(ToString::to_string),
        }
    }
}

pub fn render_outcome(
    outcome: &ScenarioOutcome,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&OutcomeJson::from(outcome)),
        OutputFormat::Text => Ok(render_outcome_text(outcome)),
    }
}

/// Renders batch outcomes; JSON output is always an array.
pub fn render_batch(
    outcomes: &[ScenarioOutcome],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<OutcomeJson<'_>> = outcomes.iter().map(OutcomeJson::from).collect();
            serde_json::to_string_pretty(&rows)
        }
        OutputFormat::Text => Ok(outcomes
            .iter()
            .map(render_outcome_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn render_outcome_text(outcome: &ScenarioOutcome) -> String {
    let s = &outcome.scenario;
    let mut out = String::new();

    if let Some(row) = outcome.row {
        let _ = write!(out, "Row {row}: ");
    }
    let _ = writeln!(
        out,
        "{} {}, MAGI {}, AGI {}",
        s.tax_year,
        s.filing_status.name(),
        format_currency(s.magi),
        format_currency(s.agi),
    );

    let report = match &outcome.result {
        Ok(report) => report,
        Err(error) => {
            let _ = writeln!(out, "  error: {error}");
            return out;
        }
    };

    if report.warnings.is_empty() {
        let _ = writeln!(out, "  No threshold traps found.");
    }
    for warning in &report.warnings {
        let _ = writeln!(
            out,
            "  {:<8}  {:<15}  {:>12}  {}",
            warning.severity.as_str().to_uppercase(),
            warning.trap_type.as_str(),
            format_currency(warning.financial_impact),
            warning.title,
        );
        let _ = writeln!(out, "{:indent$}{}", "", warning.description, indent = 43);
    }
    let _ = writeln!(
        out,
        "  Total annual impact: {}",
        format_currency(report.total_impact)
    );
    for skipped in &report.skipped {
        let _ = writeln!(out, "  skipped {}: {}", skipped.calculator, skipped.reason);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: i32,
    pub filing_statuses: Vec<FilingStatus>,
    pub irmaa: bool,
    pub aca_poverty_guidelines: bool,
}

/// Supported years with the provisions each one publishes, oldest first.
pub fn year_summaries(tables: &BuiltinTables) -> Vec<YearSummary> {
    let mut years: BTreeMap<i32, YearSummary> = BTreeMap::new();
    for table in tables.iter() {
        let summary = years.entry(table.tax_year).or_insert_with(|| YearSummary {
            year: table.tax_year,
            filing_statuses: Vec::new(),
            irmaa: true,
            aca_poverty_guidelines: true,
        });
        summary.filing_statuses.push(table.filing_status);
        summary.irmaa &= table.irmaa_schedule().is_ok();
        summary.aca_poverty_guidelines &= table.poverty_guidelines().is_ok();
    }
    years.into_values().collect()
}

pub fn render_years(
    tables: &BuiltinTables,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    let summaries = year_summaries(tables);
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&summaries),
        OutputFormat::Text => {
            let mut out = String::new();
            for summary in &summaries {
                let mut missing = Vec::new();
                if !summary.irmaa {
                    missing.push("Medicare IRMAA");
                }
                if !summary.aca_poverty_guidelines {
                    missing.push("ACA poverty guidelines");
                }
                let _ = write!(out, "{}", summary.year);
                if !missing.is_empty() {
                    let _ = write!(out, "  (not published: {})", missing.join(", "));
                }
                out.push('\n');
            }
            Ok(out)
        }
    }
}
