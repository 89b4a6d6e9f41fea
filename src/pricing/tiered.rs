//! Tiered (volume) rate calculation
//!
//! AWS bills logs ingestion, custom metrics and S3 storage in slices:
//! first N units at rate A, next M units at rate B, the remainder at rate C.
//! A flat single-rate approximation overstates high-volume usage, so every
//! volume-priced service goes through `TierSchedule::apply`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One slice of a tier schedule. `up_to: None` marks the unbounded final tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRate {
    pub from: f64,
    pub up_to: Option<f64>,
    pub rate: f64,
}

impl TierRate {
    pub fn new(from: f64, up_to: Option<f64>, rate: f64) -> Self {
        Self { from, up_to, rate }
    }

    /// Units this tier can absorb (infinite for the final tier)
    fn capacity(&self) -> f64 {
        match self.up_to {
            Some(up_to) => (up_to - self.from).max(0.0),
            None => f64::INFINITY,
        }
    }
}

/// Why a list of tiers is not a valid schedule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TierScheduleError {
    #[error("tier schedule is empty")]
    Empty,

    #[error("first tier starts at {0} instead of 0")]
    NotStartingAtZero(f64),

    #[error("tier {index} starts at {found} but previous tier ends at {expected}")]
    Gap { index: usize, expected: f64, found: f64 },

    #[error("tier {0} ends at or before where it starts")]
    NonIncreasingBound(usize),

    #[error("final tier must be unbounded")]
    BoundedFinalTier,

    #[error("tier {0} is unbounded but is not the final tier")]
    UnboundedInnerTier(usize),

    #[error("tier {0} has a negative rate")]
    NegativeRate(usize),
}

/// Sorted, contiguous, non-overlapping tiers ending in an unbounded tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSchedule {
    tiers: Vec<TierRate>,
}

/// Usage billed within a single tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSlice {
    pub from: f64,
    pub up_to: Option<f64>,
    pub units: f64,
    pub rate: f64,
    pub cost: f64,
}

/// Result of running usage through a schedule
#[derive(Debug, Clone, PartialEq)]
pub struct TieredCharge {
    pub total: f64,
    pub slices: Vec<TierSlice>,
}

impl TieredCharge {
    /// "10000 @ 0.30 + 5000 @ 0.10" style rendering of the slices used
    pub fn describe(&self) -> String {
        if self.slices.is_empty() {
            return "0".to_string();
        }
        self.slices
            .iter()
            .map(|s| format!("{} @ {}", s.units, s.rate))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl TierSchedule {
    /// Build a schedule, checking contiguity, the unbounded final tier and rates
    pub fn new(tiers: Vec<TierRate>) -> Result<Self, TierScheduleError> {
        let first = tiers.first().ok_or(TierScheduleError::Empty)?;
        if first.from != 0.0 {
            return Err(TierScheduleError::NotStartingAtZero(first.from));
        }

        let last_index = tiers.len() - 1;
        for (index, tier) in tiers.iter().enumerate() {
            if tier.rate < 0.0 || tier.rate.is_nan() {
                return Err(TierScheduleError::NegativeRate(index));
            }
            if index > 0 {
                // Previous tier is bounded here, otherwise we'd have returned already
                let expected = tiers[index - 1].up_to.unwrap_or(f64::INFINITY);
                if tier.from != expected {
                    return Err(TierScheduleError::Gap {
                        index,
                        expected,
                        found: tier.from,
                    });
                }
            }
            if let Some(up_to) = tier.up_to {
                if up_to.is_nan() || up_to <= tier.from {
                    return Err(TierScheduleError::NonIncreasingBound(index));
                }
            }
            match (tier.up_to, index == last_index) {
                (None, false) => return Err(TierScheduleError::UnboundedInnerTier(index)),
                (Some(_), true) => return Err(TierScheduleError::BoundedFinalTier),
                _ => {}
            }
        }

        Ok(Self { tiers })
    }

    /// A schedule with one unbounded tier
    pub fn flat(rate: f64) -> Self {
        Self {
            tiers: vec![TierRate::new(0.0, None, rate.max(0.0))],
        }
    }

    pub fn tiers(&self) -> &[TierRate] {
        &self.tiers
    }

    /// Rate of the first tier, reported as the unit price of tiered services
    pub fn first_rate(&self) -> f64 {
        self.tiers.first().map(|t| t.rate).unwrap_or(0.0)
    }

    /// Walk the tiers in order, consuming usage until it is exhausted.
    ///
    /// Negative or NaN usage is billed as zero.
    pub fn apply(&self, usage: f64) -> TieredCharge {
        let mut remaining = if usage.is_finite() && usage > 0.0 {
            usage
        } else {
            0.0
        };
        let mut total = 0.0;
        let mut slices = Vec::new();

        for tier in &self.tiers {
            if remaining <= 0.0 {
                break;
            }
            let units = remaining.min(tier.capacity());
            let cost = units * tier.rate;
            total += cost;
            remaining -= units;
            slices.push(TierSlice {
                from: tier.from,
                up_to: tier.up_to,
                units,
                rate: tier.rate,
                cost,
            });
        }

        TieredCharge { total, slices }
    }
}

/// Total cost of `usage` against `schedule`
pub fn calculate_tiered_cost(usage: f64, schedule: &TierSchedule) -> f64 {
    schedule.apply(usage).total
}
