use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use taxtrap_core::{BuiltinTables, FilingStatus, ScenarioInput, TrapAnalyzer};
use tracing::{debug, info};

use crate::config::{AppConfig, OutputFormat};
use crate::csv_loader;
use crate::render::{self, ScenarioOutcome};
use crate::amount::parse_amount;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Tax threshold and trap analyzer.
///
/// Flags income levels that cross Medicare IRMAA tiers, capital-gains rate
/// breakpoints, Social Security taxability thresholds and the ACA subsidy
/// cliff, and prices each one in annual dollars.
#[derive(Debug, Parser)]
#[command(name = "taxtrap", version)]
pub struct Cli {
    /// Path to a `taxtrap.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format. Overrides `format` in the config file.
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse a single scenario given on the command line.
    Analyze(AnalyzeArgs),

    /// Analyse every row of a scenario CSV file.
    Batch {
        /// CSV file with one scenario per row.
        path: PathBuf,
    },

    /// List supported tax years.
    Years,
}

/// Amounts accept `$`, thousands separators and accounting parentheses,
/// e.g. `--magi '$250,000'`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(long)]
    pub year: i32,

    /// One of S, MFJ, MFS, HOH, QSS.
    #[arg(long)]
    pub filing_status: FilingStatus,

    /// Modified adjusted gross income.
    #[arg(long, value_parser = parse_amount)]
    pub magi: Decimal,

    /// Adjusted gross income. Defaults to MAGI.
    #[arg(long, value_parser = parse_amount)]
    pub agi: Option<Decimal>,

    /// Defaults to AGI.
    #[arg(long, value_parser = parse_amount)]
    pub total_income: Option<Decimal>,

    /// Defaults to AGI less the standard deduction.
    #[arg(long, value_parser = parse_amount)]
    pub taxable_income: Option<Decimal>,

    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub capital_gains_long: Decimal,

    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub capital_gains_short: Decimal,

    /// Annual Social Security benefits.
    #[arg(long, value_parser = parse_amount)]
    pub social_security: Option<Decimal>,

    #[arg(long)]
    pub household_size: Option<u32>,

    /// Enrolled in Medicare (enables the IRMAA check).
    #[arg(long)]
    pub medicare: bool,

    /// Enrolled in a marketplace plan (enables the ACA check).
    #[arg(long)]
    pub aca: bool,
}

impl AnalyzeArgs {
    pub fn to_scenario(&self) -> ScenarioInput {
        let agi = self.agi.unwrap_or(self.magi);
        let mut scenario = ScenarioInput::new(self.year, self.filing_status, self.magi, agi);
        scenario.total_income = self.total_income.unwrap_or(agi);
        scenario.taxable_income = self.taxable_income;
        scenario.capital_gains_long = self.capital_gains_long;
        scenario.capital_gains_short = self.capital_gains_short;
        scenario.social_security_amount = self.social_security;
        scenario.household_size = self.household_size;
        scenario.medicare_enrollment = self.medicare;
        scenario.aca_enrollment = self.aca;
        scenario
    }
}

// ─── execution ───────────────────────────────────────────────────────────────

/// Runs a parsed command and returns what should be printed to stdout.
///
/// # Errors
///
/// Invalid configuration, an unreadable or malformed CSV file, or an invalid
/// single scenario. Invalid rows in a batch are reported inline instead.
pub fn run(
    cli: &Cli,
    config: &AppConfig,
) -> anyhow::Result<String> {
    let format = cli.format.or(config.format).unwrap_or_default();
    let tables = BuiltinTables::global();

    match &cli.command {
        Command::Analyze(args) => {
            let analyzer = TrapAnalyzer::new(tables, config.analyzer_config())?;
            let scenario = args.to_scenario();
            debug!(?scenario, "analysing scenario");
            let report = analyzer.analyze(&scenario)?;
            let outcome = ScenarioOutcome {
                row: None,
                scenario,
                result: Ok(report),
            };
            Ok(render::render_outcome(&outcome, format)?)
        }
        Command::Batch { path } => {
            let analyzer = TrapAnalyzer::new(tables, config.analyzer_config())?;
            let scenarios = csv_loader::load_from_file(path)
                .with_context(|| format!("loading scenarios from {}", path.display()))?;
            info!("loaded {} scenarios from {}", scenarios.len(), path.display());

            let outcomes: Vec<ScenarioOutcome> = scenarios
                .into_iter()
                .enumerate()
                .map(|(idx, scenario)| ScenarioOutcome {
                    row: Some(idx + 1),
                    result: analyzer.analyze(&scenario),
                    scenario,
                })
                .collect();
            Ok(render::render_batch(&outcomes, format)?)
        }
        Command::Years => Ok(render::render_years(tables, format)?),
    }
}
