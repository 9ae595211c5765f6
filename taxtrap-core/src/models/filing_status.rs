use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a filing-status code is not one of the recognised values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognised filing status '{0}' (expected one of S, MFJ, MFS, HOH, QSS)")]
pub struct ParseFilingStatusError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilingStatus {
    #[serde(rename = "S")]
    Single,
    #[serde(rename = "MFJ")]
    MarriedFilingJointly,
    #[serde(rename = "MFS")]
    MarriedFilingSeparately,
    #[serde(rename = "HOH")]
    HeadOfHousehold,
    #[serde(rename = "QSS")]
    QualifyingSurvivingSpouse,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 5] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
        Self::QualifyingSurvivingSpouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingSurvivingSpouse => "QSS",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
            Self::QualifyingSurvivingSpouse => "Qualifying Surviving Spouse",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "S" => Some(Self::Single),
            "MFJ" => Some(Self::MarriedFilingJointly),
            "MFS" => Some(Self::MarriedFilingSeparately),
            "HOH" => Some(Self::HeadOfHousehold),
            "QSS" => Some(Self::QualifyingSurvivingSpouse),
            _ => None,
        }
    }

    /// Whether Medicare income-related adjustments use the joint-return ladder.
    ///
    /// Only a joint return does; a qualifying surviving spouse files as an
    /// individual for IRMAA purposes.
    pub fn uses_joint_irmaa_ladder(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = ParseFilingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseFilingStatusError(s.to_string()))
    }
}
