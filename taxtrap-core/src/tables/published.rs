//! Published figures for each supported tax year.
//!
//! Sources: IRS revenue procedures (ordinary brackets, standard deduction,
//! capital-gains breakpoints), CMS Part B/Part D IRMAA notices, HHS poverty
//! guidelines for the 48 contiguous states. Social Security thresholds are
//! statutory and unindexed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    CapitalGainsBreakpoints, FilingStatus, IRMAA_TIER_COUNT, IrmaaSchedule, IrmaaSurcharge,
    PovertyGuidelines, SocialSecurityThresholds, TaxBracket, TaxYearTable,
};

const ORDINARY_RATES: [Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

const SS_INDIVIDUAL: SocialSecurityThresholds = SocialSecurityThresholds {
    base_amount: dec!(25000),
    second_threshold: dec!(34000),
};

const SS_JOINT: SocialSecurityThresholds = SocialSecurityThresholds {
    base_amount: dec!(32000),
    second_threshold: dec!(44000),
};

/// Applies to a separate return when the spouses lived together.
const SS_SEPARATE: SocialSecurityThresholds = SocialSecurityThresholds {
    base_amount: dec!(0),
    second_threshold: dec!(0),
};

struct StatusFigures {
    status: FilingStatus,
    bracket_tops: [Decimal; 6],
    standard_deduction: Decimal,
    capital_gains: (Decimal, Decimal),
}

struct IrmaaFigures {
    individual: [Decimal; IRMAA_TIER_COUNT],
    joint: [Decimal; IRMAA_TIER_COUNT],
    part_b: [Decimal; IRMAA_TIER_COUNT],
    part_d: [Decimal; IRMAA_TIER_COUNT],
}

struct YearFigures {
    year: i32,
    statuses: [StatusFigures; 4],
    irmaa: Option<IrmaaFigures>,
    poverty_guidelines: Option<PovertyGuidelines>,
}

pub(super) fn tables() -> Vec<TaxYearTable> {
    [year_2023(), year_2024(), year_2025(), year_2026()]
        .into_iter()
        .flat_map(expand)
        .collect()
}

/// Expands one year's figures into a table per filing status. Qualifying
/// surviving spouses share the joint brackets but the individual Social
/// Security and IRMAA thresholds.
fn expand(figures: YearFigures) -> Vec<TaxYearTable> {
    let mut tables = Vec::with_capacity(FilingStatus::ALL.len());

    for status_figures in &figures.statuses {
        tables.push(build(&figures, status_figures, status_figures.status));
        if status_figures.status == FilingStatus::MarriedFilingJointly {
            tables.push(build(
                &figures,
                status_figures,
                FilingStatus::QualifyingSurvivingSpouse,
            ));
        }
    }

    tables
}

fn build(
    year: &YearFigures,
    figures: &StatusFigures,
    status: FilingStatus,
) -> TaxYearTable {
    let social_security = match status {
        FilingStatus::MarriedFilingJointly => SS_JOINT,
        FilingStatus::MarriedFilingSeparately => SS_SEPARATE,
        _ => SS_INDIVIDUAL,
    };

    let irmaa = year.irmaa.as_ref().map(|irmaa| {
        let thresholds = if status.uses_joint_irmaa_ladder() {
            irmaa.joint
        } else {
            irmaa.individual
        };
        let surcharges = std::array::from_fn(|tier| IrmaaSurcharge {
            part_b: irmaa.part_b[tier],
            part_d: irmaa.part_d[tier],
        });
        IrmaaSchedule {
            thresholds,
            surcharges,
        }
    });

    TaxYearTable {
        tax_year: year.year,
        filing_status: status,
        ordinary_brackets: TaxBracket::schedule(&figures.bracket_tops, &ORDINARY_RATES),
        capital_gains: CapitalGainsBreakpoints {
            zero_rate_max: figures.capital_gains.0,
            fifteen_rate_max: figures.capital_gains.1,
        },
        standard_deduction: figures.standard_deduction,
        irmaa,
        social_security,
        poverty_guidelines: year.poverty_guidelines,
    }
}

fn year_2023() -> YearFigures {
    YearFigures {
        year: 2023,
        statuses: [
            StatusFigures {
                status: FilingStatus::Single,
                bracket_tops: [
                    dec!(11000),
                    dec!(44725),
                    dec!(95375),
                    dec!(182100),
                    dec!(231250),
                    dec!(578125),
                ],
                standard_deduction: dec!(13850),
                capital_gains: (dec!(44625), dec!(492300)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingJointly,
                bracket_tops: [
                    dec!(22000),
                    dec!(89450),
                    dec!(190750),
                    dec!(364200),
                    dec!(462500),
                    dec!(693750),
                ],
                standard_deduction: dec!(27700),
                capital_gains: (dec!(89250), dec!(553850)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingSeparately,
                bracket_tops: [
                    dec!(11000),
                    dec!(44725),
                    dec!(95375),
                    dec!(182100),
                    dec!(231250),
                    dec!(346875),
                ],
                standard_deduction: dec!(13850),
                capital_gains: (dec!(44625), dec!(276900)),
            },
            StatusFigures {
                status: FilingStatus::HeadOfHousehold,
                bracket_tops: [
                    dec!(15700),
                    dec!(59850),
                    dec!(95350),
                    dec!(182100),
                    dec!(231250),
                    dec!(578100),
                ],
                standard_deduction: dec!(20800),
                capital_gains: (dec!(59750), dec!(523050)),
            },
        ],
        irmaa: Some(IrmaaFigures {
            individual: [
                dec!(97000),
                dec!(123000),
                dec!(153000),
                dec!(183000),
                dec!(500000),
            ],
            joint: [
                dec!(194000),
                dec!(246000),
                dec!(306000),
                dec!(366000),
                dec!(750000),
            ],
            part_b: [
                dec!(65.90),
                dec!(164.80),
                dec!(263.70),
                dec!(362.60),
                dec!(395.60),
            ],
            part_d: [
                dec!(12.20),
                dec!(31.50),
                dec!(50.70),
                dec!(70.00),
                dec!(76.40),
            ],
        }),
        poverty_guidelines: Some(PovertyGuidelines {
            base: dec!(14580),
            per_additional_person: dec!(5140),
        }),
    }
}

fn year_2024() -> YearFigures {
    YearFigures {
        year: 2024,
        statuses: [
            StatusFigures {
                status: FilingStatus::Single,
                bracket_tops: [
                    dec!(11600),
                    dec!(47150),
                    dec!(100525),
                    dec!(191950),
                    dec!(243725),
                    dec!(609350),
                ],
                standard_deduction: dec!(14600),
                capital_gains: (dec!(47025), dec!(518900)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingJointly,
                bracket_tops: [
                    dec!(23200),
                    dec!(94300),
                    dec!(201050),
                    dec!(383900),
                    dec!(487450),
                    dec!(731200),
                ],
                standard_deduction: dec!(29200),
                capital_gains: (dec!(94050), dec!(583750)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingSeparately,
                bracket_tops: [
                    dec!(11600),
                    dec!(47150),
                    dec!(100525),
                    dec!(191950),
                    dec!(243725),
                    dec!(365600),
                ],
                standard_deduction: dec!(14600),
                capital_gains: (dec!(47025), dec!(291850)),
            },
            StatusFigures {
                status: FilingStatus::HeadOfHousehold,
                bracket_tops: [
                    dec!(16550),
                    dec!(63100),
                    dec!(100500),
                    dec!(191950),
                    dec!(243700),
                    dec!(609350),
                ],
                standard_deduction: dec!(21900),
                capital_gains: (dec!(63000), dec!(551350)),
            },
        ],
        irmaa: Some(IrmaaFigures {
            individual: [
                dec!(103000),
                dec!(129000),
                dec!(161000),
                dec!(193000),
                dec!(500000),
            ],
            joint: [
                dec!(206000),
                dec!(258000),
                dec!(322000),
                dec!(386000),
                dec!(750000),
            ],
            part_b: [
                dec!(69.90),
                dec!(174.70),
                dec!(279.50),
                dec!(384.30),
                dec!(419.30),
            ],
            part_d: [
                dec!(12.90),
                dec!(33.30),
                dec!(53.80),
                dec!(74.20),
                dec!(81.00),
            ],
        }),
        poverty_guidelines: Some(PovertyGuidelines {
            base: dec!(15060),
            per_additional_person: dec!(5380),
        }),
    }
}

fn year_2025() -> YearFigures {
    YearFigures {
        year: 2025,
        statuses: [
            StatusFigures {
                status: FilingStatus::Single,
                bracket_tops: [
                    dec!(11925),
                    dec!(48475),
                    dec!(103350),
                    dec!(197300),
                    dec!(250525),
                    dec!(626350),
                ],
                standard_deduction: dec!(15750),
                capital_gains: (dec!(48350), dec!(533400)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingJointly,
                bracket_tops: [
                    dec!(23850),
                    dec!(96950),
                    dec!(206700),
                    dec!(394600),
                    dec!(501050),
                    dec!(751600),
                ],
                standard_deduction: dec!(31500),
                capital_gains: (dec!(96700), dec!(600050)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingSeparately,
                bracket_tops: [
                    dec!(11925),
                    dec!(48475),
                    dec!(103350),
                    dec!(197300),
                    dec!(250525),
                    dec!(375800),
                ],
                standard_deduction: dec!(15750),
                capital_gains: (dec!(48350), dec!(300000)),
            },
            StatusFigures {
                status: FilingStatus::HeadOfHousehold,
                bracket_tops: [
                    dec!(17000),
                    dec!(64850),
                    dec!(103350),
                    dec!(197300),
                    dec!(250500),
                    dec!(626350),
                ],
                standard_deduction: dec!(23625),
                capital_gains: (dec!(64750), dec!(566700)),
            },
        ],
        irmaa: Some(IrmaaFigures {
            individual: [
                dec!(106000),
                dec!(133000),
                dec!(167000),
                dec!(200000),
                dec!(500000),
            ],
            joint: [
                dec!(212000),
                dec!(266000),
                dec!(334000),
                dec!(400000),
                dec!(750000),
            ],
            part_b: [
                dec!(74.00),
                dec!(185.00),
                dec!(295.90),
                dec!(406.90),
                dec!(443.90),
            ],
            part_d: [
                dec!(13.70),
                dec!(35.30),
                dec!(57.00),
                dec!(78.60),
                dec!(85.80),
            ],
        }),
        poverty_guidelines: Some(PovertyGuidelines {
            base: dec!(15650),
            per_additional_person: dec!(5500),
        }),
    }
}

/// Poverty guidelines for 2026 are not loaded yet, so ACA analysis for 2026
/// reports the provision as unavailable.
fn year_2026() -> YearFigures {
    YearFigures {
        year: 2026,
        statuses: [
            StatusFigures {
                status: FilingStatus::Single,
                bracket_tops: [
                    dec!(12400),
                    dec!(50400),
                    dec!(105700),
                    dec!(201775),
                    dec!(256225),
                    dec!(640600),
                ],
                standard_deduction: dec!(16100),
                capital_gains: (dec!(49450), dec!(545500)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingJointly,
                bracket_tops: [
                    dec!(24800),
                    dec!(100800),
                    dec!(211400),
                    dec!(403550),
                    dec!(512450),
                    dec!(768700),
                ],
                standard_deduction: dec!(32200),
                capital_gains: (dec!(98900), dec!(613700)),
            },
            StatusFigures {
                status: FilingStatus::MarriedFilingSeparately,
                bracket_tops: [
                    dec!(12400),
                    dec!(50400),
                    dec!(105700),
                    dec!(201775),
                    dec!(256225),
                    dec!(384350),
                ],
                standard_deduction: dec!(16100),
                capital_gains: (dec!(49450), dec!(306850)),
            },
            StatusFigures {
                status: FilingStatus::HeadOfHousehold,
                bracket_tops: [
                    dec!(17700),
                    dec!(67450),
                    dec!(105700),
                    dec!(201750),
                    dec!(256200),
                    dec!(640600),
                ],
                standard_deduction: dec!(24150),
                capital_gains: (dec!(66200), dec!(579600)),
            },
        ],
        irmaa: Some(IrmaaFigures {
            individual: [
                dec!(109000),
                dec!(137000),
                dec!(171000),
                dec!(205000),
                dec!(500000),
            ],
            joint: [
                dec!(218000),
                dec!(274000),
                dec!(342000),
                dec!(410000),
                dec!(750000),
            ],
            part_b: [
                dec!(81.20),
                dec!(202.90),
                dec!(324.60),
                dec!(446.30),
                dec!(487.00),
            ],
            part_d: [
                dec!(14.50),
                dec!(37.50),
                dec!(60.40),
                dec!(83.30),
                dec!(91.00),
            ],
        }),
        poverty_guidelines: None,
    }
}
