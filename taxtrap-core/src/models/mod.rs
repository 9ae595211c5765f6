mod filing_status;
mod scenario;
mod tax_bracket;
mod tax_year_table;
mod warning;

pub use filing_status::{FilingStatus, ParseFilingStatusError};
pub use scenario::{ScenarioError, ScenarioInput};
pub use tax_bracket::TaxBracket;
pub use tax_year_table::{
    CapitalGainsBreakpoints, IRMAA_TIER_COUNT, IrmaaSchedule, IrmaaSurcharge, PovertyGuidelines,
    SocialSecurityThresholds, TaxYearTable,
};
pub use warning::{Severity, TrapType, Warning};
