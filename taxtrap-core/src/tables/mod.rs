//! Versioned, immutable tax tables keyed by `(tax_year, filing_status)`.
//!
//! Tables are baked into the binary and built once on first use. A year
//! that has no published table is reported as
//! [`TableError::UnsupportedYear`]; callers decide whether to fall back with
//! [`TaxTableRepository::nearest_supported_year`] or surface the gap.

mod published;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::models::{FilingStatus, TaxYearTable};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no tax table published for {year} ({filing_status})")]
    UnsupportedYear {
        year: i32,
        filing_status: FilingStatus,
    },

    #[error("{provision} figures are not published for {year}")]
    ProvisionUnavailable {
        year: i32,
        provision: &'static str,
    },

    #[error("invalid tax table for {year} ({filing_status}): {reason}")]
    InvalidTable {
        year: i32,
        filing_status: FilingStatus,
        reason: String,
    },

    #[error("duplicate tax table for {year} ({filing_status})")]
    DuplicateTable {
        year: i32,
        filing_status: FilingStatus,
    },
}

/// Read-only keyed lookup of published tables.
pub trait TaxTableRepository: Send + Sync {
    /// Returns the table for the exact year and filing status.
    ///
    /// # Errors
    ///
    /// [`TableError::UnsupportedYear`] when nothing is published for the pair.
    /// Implementations never substitute another year.
    fn lookup(
        &self,
        year: i32,
        filing_status: FilingStatus,
    ) -> Result<&TaxYearTable, TableError>;

    /// Every year with at least one published table, ascending.
    fn supported_years(&self) -> Vec<i32>;

    /// The supported year closest to `year`, preferring the earlier year on
    /// a tie. `None` only when the repository is empty.
    fn nearest_supported_year(
        &self,
        year: i32,
    ) -> Option<i32> {
        self.supported_years()
            .into_iter()
            .min_by_key(|candidate| ((candidate - year).abs(), *candidate))
    }
}

/// In-memory repository of validated tables.
#[derive(Debug, Clone, Default)]
pub struct BuiltinTables {
    tables: BTreeMap<(i32, FilingStatus), TaxYearTable>,
}

static PUBLISHED: OnceLock<BuiltinTables> = OnceLock::new();

impl BuiltinTables {
    /// The process-wide published tables, built on first access.
    pub fn global() -> &'static BuiltinTables {
        PUBLISHED.get_or_init(|| Self {
            tables: published::tables()
                .into_iter()
                .map(|table| ((table.tax_year, table.filing_status), table))
                .collect(),
        })
    }

    /// Builds a repository from caller-supplied tables, validating each one.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or
    /// [`TableError::DuplicateTable`] if two tables share a key.
    pub fn from_tables(tables: impl IntoIterator<Item = TaxYearTable>) -> Result<Self, TableError> {
        let mut map = BTreeMap::new();
        for table in tables {
            table.validate()?;
            let key = (table.tax_year, table.filing_status);
            if map.insert(key, table).is_some() {
                return Err(TableError::DuplicateTable {
                    year: key.0,
                    filing_status: key.1,
                });
            }
        }
        Ok(Self { tables: map })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxYearTable> {
        self.tables.values()
    }
}

impl TaxTableRepository for BuiltinTables {
    fn lookup(
        &self,
        year: i32,
        filing_status: FilingStatus,
    ) -> Result<&TaxYearTable, TableError> {
        self.tables
            .get(&(year, filing_status))
            .ok_or(TableError::UnsupportedYear {
                year,
                filing_status,
            })
    }

    fn supported_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.tables.keys().map(|(year, _)| *year).collect();
        years.dedup();
        years
    }
}
