use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tag the caller uses to resolve an educational deep-link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapType {
    Irmaa,
    CapitalGains,
    SocialSecurity,
    Aca,
    Default,
}

impl TrapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Irmaa => "irmaa",
            Self::CapitalGains => "capital_gains",
            Self::SocialSecurity => "social_security",
            Self::Aca => "aca",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for TrapType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-facing, quantified trap notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub trap_type: TrapType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Annual dollar cost, never negative.
    pub financial_impact: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn severity_orders_critical_highest() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn warning_serializes_with_ui_field_names() {
        let warning = Warning {
            trap_type: TrapType::CapitalGains,
            severity: Severity::Critical,
            title: "t".to_string(),
            description: "d".to_string(),
            financial_impact: dec!(12.50),
        };

        let value = serde_json::to_value(&warning).unwrap();

        assert_eq!(value["trapType"], "capital_gains");
        assert_eq!(value["severity"], "critical");
        assert_eq!(value["financialImpact"], "12.50");
    }
}
