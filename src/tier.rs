//! Tier policy
//!
//! Pure mapping from points to [`Tier`] and from tier to commission rate.
//! Thresholds and rates come from [`TierConfig`] so they can be tuned
//! without touching the transfer algorithm.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::TierConfig;
use crate::core_types::Tier;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TierConfigError {
    #[error("mid_threshold ({mid}) must be below top_threshold ({top})")]
    ThresholdOrder { mid: u64, top: u64 },

    #[error("{tier} commission rate {rate} must be in [0, 1)")]
    RateOutOfRange { tier: Tier, rate: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    mid_threshold: u64,
    top_threshold: u64,
    base_rate: Decimal,
    mid_rate: Decimal,
    top_rate: Decimal,
}

impl TierPolicy {
    pub fn new(config: &TierConfig) -> Result<Self, TierConfigError> {
        if config.mid_threshold >= config.top_threshold {
            return Err(TierConfigError::ThresholdOrder {
                mid: config.mid_threshold,
                top: config.top_threshold,
            });
        }

        for (tier, rate) in [
            (Tier::Base, config.base_rate),
            (Tier::Mid, config.mid_rate),
            (Tier::Top, config.top_rate),
        ] {
            if rate.is_sign_negative() || rate >= Decimal::ONE {
                return Err(TierConfigError::RateOutOfRange { tier, rate });
            }
        }

        Ok(Self {
            mid_threshold: config.mid_threshold,
            top_threshold: config.top_threshold,
            base_rate: config.base_rate,
            mid_rate: config.mid_rate,
            top_rate: config.top_rate,
        })
    }

    /// Total over all inputs; negative points clamp to `Base`.
    pub fn tier_for_points(&self, points: i64) -> Tier {
        if points < 0 {
            return Tier::Base;
        }
        let points = points as u64;
        if points >= self.top_threshold {
            Tier::Top
        } else if points >= self.mid_threshold {
            Tier::Mid
        } else {
            Tier::Base
        }
    }

    #[inline]
    pub fn commission_rate(&self, tier: Tier) -> Decimal {
        match tier {
            Tier::Base => self.base_rate,
            Tier::Mid => self.mid_rate,
            Tier::Top => self.top_rate,
        }
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        let cfg = TierConfig::default();
        Self {
            mid_threshold: cfg.mid_threshold,
            top_threshold: cfg.top_threshold,
            base_rate: cfg.base_rate,
            mid_rate: cfg.mid_rate,
            top_rate: cfg.top_rate,
        }
    }
}
