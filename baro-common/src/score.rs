//! Transparency grade computation
//!
//! Pure classification functions mapping publication signals to the A-E
//! grade ladder. Scores are computed per calendar year by the ingestion
//! pipeline and stored in the `bareme` table; this module also recomputes
//! the derived global grade when the stored value is absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Number of data fields a procurement publication must populate
/// (decree 2022-767 essential data schema)
pub const REQUIRED_FIELD_COUNT: u8 = 10;

/// Transparency grade, best (A) to worst (E)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    /// Numeric rank: A=1 ... E=5
    pub fn rank(self) -> i64 {
        match self {
            Grade::A => 1,
            Grade::B => 2,
            Grade::C => 3,
            Grade::D => 4,
            Grade::E => 5,
        }
    }

    /// Grade for a numeric rank, clamped to [1, 5]
    pub fn from_rank(rank: i64) -> Grade {
        match rank {
            i64::MIN..=1 => Grade::A,
            2 => Grade::B,
            3 => Grade::C,
            4 => Grade::D,
            _ => Grade::E,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(Grade::A),
            "B" | "b" => Ok(Grade::B),
            "C" | "c" => Ok(Grade::C),
            "D" | "d" => Ok(Grade::D),
            "E" | "e" => Ok(Grade::E),
            other => Err(Error::InvalidInput(format!("Unknown grade: {}", other))),
        }
    }
}

/// Raw procurement publication signals for one community-year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcurementSignals {
    /// Sub-40k EUR contracts are published
    pub publishes_under_40k: bool,
    /// Supra-40k EUR contracts are published
    pub publishes_over_40k: bool,
    /// How many of the 10 required data fields are populated
    pub fields_populated: u8,
    /// Publication happened within the regulatory delay
    pub delay_respected: bool,
}

/// Grade the procurement axis from its publication signals.
///
/// Ladder: E = nothing published, D = only one size band published,
/// C = both bands with partial data, B = both bands with all fields but
/// late, A = full compliance with timely publication.
pub fn procurement_grade(signals: ProcurementSignals) -> Grade {
    match (signals.publishes_under_40k, signals.publishes_over_40k) {
        (false, false) => Grade::E,
        // Partial coverage of the size bands caps the grade at D,
        // whichever band is missing
        (true, false) | (false, true) => Grade::D,
        (true, true) => {
            if signals.fields_populated < REQUIRED_FIELD_COUNT {
                Grade::C
            } else if !signals.delay_respected {
                Grade::B
            } else {
                Grade::A
            }
        }
    }
}

/// Grade the procurement axis from nullable database columns.
///
/// Returns None ("not communicated") when the signals needed to decide
/// are missing. A community known to publish nothing grades E even with
/// the other signals absent.
pub fn procurement_grade_opt(
    publishes_under_40k: Option<bool>,
    publishes_over_40k: Option<bool>,
    fields_populated: Option<u8>,
    delay_respected: Option<bool>,
) -> Option<Grade> {
    let under = publishes_under_40k?;
    let over = publishes_over_40k?;
    if !under || !over {
        // D or E, decided by band coverage alone
        return Some(procurement_grade(ProcurementSignals {
            publishes_under_40k: under,
            publishes_over_40k: over,
            fields_populated: 0,
            delay_respected: false,
        }));
    }
    let fields = fields_populated?;
    if fields < REQUIRED_FIELD_COUNT {
        return Some(Grade::C);
    }
    // Full data: the delay signal separates A from B
    let delay = delay_respected?;
    Some(if delay { Grade::A } else { Grade::B })
}

/// Grade the subsidy axis from a publication rate
/// (sum of itemized subsidies / total budget).
///
/// Rates above 105% indicate a data-quality failure and map to the
/// worst grade rather than the best (anti-gaming rule).
pub fn subsidy_grade_from_rate(rate: f64) -> Option<Grade> {
    if !rate.is_finite() {
        return None;
    }
    Some(if (0.95..=1.05).contains(&rate) {
        Grade::A
    } else if (0.75..0.95).contains(&rate) {
        Grade::B
    } else if (0.50..0.75).contains(&rate) {
        Grade::C
    } else if (0.25..0.50).contains(&rate) {
        Grade::D
    } else {
        // below 25%, or above 105%
        Grade::E
    })
}

/// Grade the subsidy axis from raw amounts.
///
/// Returns None when the budget is missing, zero, or nonsensical, since
/// no publication rate can be formed.
pub fn subsidy_grade(subventions_detaillees: Option<f64>, budget_total: Option<f64>) -> Option<Grade> {
    let detaillees = subventions_detaillees?;
    let budget = budget_total?;
    if !budget.is_finite() || budget <= 0.0 || !detaillees.is_finite() {
        return None;
    }
    subsidy_grade_from_rate(detaillees / budget)
}

/// Combine the two axis grades into the global grade: ceiling of the
/// mean rank, so ties round toward the worse grade.
pub fn global_grade(mp: Grade, subventions: Grade) -> Grade {
    Grade::from_rank((mp.rank() + subventions.rank() + 1) / 2)
}

/// Global grade from nullable axis grades; None if either axis is
/// "not communicated" (never fabricate a grade from half the data).
pub fn global_grade_opt(mp: Option<Grade>, subventions: Option<Grade>) -> Option<Grade> {
    Some(global_grade(mp?, subventions?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_rank_round_trip() {
        for g in [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E] {
            assert_eq!(Grade::from_rank(g.rank()), g);
        }
    }

    #[test]
    fn test_grade_from_rank_clamps() {
        assert_eq!(Grade::from_rank(0), Grade::A);
        assert_eq!(Grade::from_rank(-3), Grade::A);
        assert_eq!(Grade::from_rank(9), Grade::E);
    }

    #[test]
    fn test_grade_parse() {
        assert_eq!("A".parse::<Grade>().unwrap(), Grade::A);
        assert_eq!("e".parse::<Grade>().unwrap(), Grade::E);
        assert!("F".parse::<Grade>().is_err());
        assert!("".parse::<Grade>().is_err());
    }

    #[test]
    fn test_subsidy_buckets() {
        assert_eq!(subsidy_grade_from_rate(1.00), Some(Grade::A));
        assert_eq!(subsidy_grade_from_rate(0.95), Some(Grade::A)); // lower bound inclusive
        assert_eq!(subsidy_grade_from_rate(1.05), Some(Grade::A)); // upper bound inclusive
        assert_eq!(subsidy_grade_from_rate(0.80), Some(Grade::B));
        assert_eq!(subsidy_grade_from_rate(0.75), Some(Grade::B));
        assert_eq!(subsidy_grade_from_rate(0.60), Some(Grade::C));
        assert_eq!(subsidy_grade_from_rate(0.50), Some(Grade::C));
        assert_eq!(subsidy_grade_from_rate(0.30), Some(Grade::D));
        assert_eq!(subsidy_grade_from_rate(0.25), Some(Grade::D));
        assert_eq!(subsidy_grade_from_rate(0.10), Some(Grade::E));
        assert_eq!(subsidy_grade_from_rate(0.0), Some(Grade::E));
    }

    #[test]
    fn test_subsidy_over_publication_is_worst_grade() {
        // Above 105% is a data-quality failure, not extra credit
        assert_eq!(subsidy_grade_from_rate(1.06), Some(Grade::E));
        assert_eq!(subsidy_grade_from_rate(2.0), Some(Grade::E));
    }

    #[test]
    fn test_subsidy_band_edges_exclusive_above() {
        // Upper bounds of B/C/D are exclusive
        assert_eq!(subsidy_grade_from_rate(0.9499), Some(Grade::B));
        assert_eq!(subsidy_grade_from_rate(0.7499), Some(Grade::C));
        assert_eq!(subsidy_grade_from_rate(0.4999), Some(Grade::D));
    }

    #[test]
    fn test_subsidy_missing_budget_is_unknown() {
        assert_eq!(subsidy_grade(Some(1000.0), None), None);
        assert_eq!(subsidy_grade(None, Some(1000.0)), None);
        assert_eq!(subsidy_grade(Some(1000.0), Some(0.0)), None);
        assert_eq!(subsidy_grade(Some(1000.0), Some(-5.0)), None);
    }

    #[test]
    fn test_subsidy_from_amounts() {
        assert_eq!(subsidy_grade(Some(980.0), Some(1000.0)), Some(Grade::A));
        assert_eq!(subsidy_grade(Some(100.0), Some(1000.0)), Some(Grade::E));
    }

    #[test]
    fn test_procurement_ladder() {
        let full = ProcurementSignals {
            publishes_under_40k: true,
            publishes_over_40k: true,
            fields_populated: 10,
            delay_respected: true,
        };
        assert_eq!(procurement_grade(full), Grade::A);
        assert_eq!(
            procurement_grade(ProcurementSignals { delay_respected: false, ..full }),
            Grade::B
        );
        assert_eq!(
            procurement_grade(ProcurementSignals { fields_populated: 7, ..full }),
            Grade::C
        );
        assert_eq!(
            procurement_grade(ProcurementSignals { publishes_under_40k: false, ..full }),
            Grade::D
        );
        assert_eq!(
            procurement_grade(ProcurementSignals {
                publishes_under_40k: false,
                publishes_over_40k: false,
                ..full
            }),
            Grade::E
        );
    }

    #[test]
    fn test_procurement_partial_data_ignores_delay() {
        // With partial data the grade is C whether or not the delay held
        let partial = ProcurementSignals {
            publishes_under_40k: true,
            publishes_over_40k: true,
            fields_populated: 9,
            delay_respected: true,
        };
        assert_eq!(procurement_grade(partial), Grade::C);
    }

    #[test]
    fn test_procurement_opt_missing_signals() {
        assert_eq!(procurement_grade_opt(None, Some(true), Some(10), Some(true)), None);
        // Nothing published grades E without the other signals
        assert_eq!(procurement_grade_opt(Some(false), Some(false), None, None), Some(Grade::E));
        // Only large contracts published grades D without field data
        assert_eq!(procurement_grade_opt(Some(false), Some(true), None, None), Some(Grade::D));
        // Both bands published but fields unknown: cannot place A/B/C
        assert_eq!(procurement_grade_opt(Some(true), Some(true), None, Some(true)), None);
        // Full fields but delay unknown: cannot separate A from B
        assert_eq!(procurement_grade_opt(Some(true), Some(true), Some(10), None), None);
        assert_eq!(
            procurement_grade_opt(Some(true), Some(true), Some(6), None),
            Some(Grade::C)
        );
    }

    #[test]
    fn test_global_grade_ceiling_mean() {
        // mean of A(1) and C(3) is 2 -> B
        assert_eq!(global_grade(Grade::A, Grade::C), Grade::B);
        // mean of A(1) and E(5) is 3 -> C
        assert_eq!(global_grade(Grade::A, Grade::E), Grade::C);
        // mean of B(2) and C(3) is 2.5, rounds toward the worse grade -> C
        assert_eq!(global_grade(Grade::B, Grade::C), Grade::C);
        assert_eq!(global_grade(Grade::A, Grade::A), Grade::A);
        assert_eq!(global_grade(Grade::E, Grade::E), Grade::E);
        // symmetric
        assert_eq!(global_grade(Grade::D, Grade::A), global_grade(Grade::A, Grade::D));
    }

    #[test]
    fn test_global_grade_opt_propagates_unknown() {
        assert_eq!(global_grade_opt(Some(Grade::A), None), None);
        assert_eq!(global_grade_opt(None, Some(Grade::B)), None);
        assert_eq!(global_grade_opt(Some(Grade::A), Some(Grade::C)), Some(Grade::B));
    }
}
