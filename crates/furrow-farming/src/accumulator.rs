//! Pool-wide reward accumulator.
//!
//! [`FarmingState`] tracks the total participating weight and a running
//! reward-per-weight sum (sigma). As blocks pass, each block's emission is
//! divided by the total weight and added to sigma:
//!
//! ```text
//! sigma += emission_per_block * dh / weight_total
//! ```
//!
//! Sigma is kept in fixed point with a 2^96 scale (the value is placed three
//! words up before dividing) so small per-block increments against a large
//! total weight are not truncated to zero. A participant who joined when
//! sigma was `s0` is owed `(sigma - s0) * weight`, with the three fractional
//! words dropped.
//!
//! All arithmetic is integer-only. Rounding always favours the pool; the
//! last participant to leave collects whatever residue is left.

use serde::Serialize;
use tracing::debug;

use furrow_core::constants::{NORMALIZATION_WORDS, SIGMA_WORDS};
use furrow_core::error::FarmingError;
use furrow_core::types::{Amount, Height, Sigma, Weight};
use furrow_core::wide::WideUint;

use crate::schedule::EmissionSchedule;

/// Encoded size of [`FarmingState`] in bytes.
pub const FARMING_STATE_SIZE: usize = 8 + 8 + 8 + SIGMA_WORDS * 4 + 8;

/// State of one farming pool.
///
/// Created all-zero when the pool is initialised and only mutated through
/// [`advance`](Self::advance), [`remove_weight`](Self::remove_weight) and
/// [`add_weight`](Self::add_weight).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize,
    bincode::Encode, bincode::Decode,
)]
pub struct FarmingState {
    /// Sum of the weights of all participating positions.
    pub weight_total: u64,
    /// Active blocks that have accrued emission, capped at the schedule duration.
    pub h_total: Height,
    /// Height the pool was last advanced to.
    pub h_last: Height,
    /// Reward per unit weight since inception, 2^96 fixed point.
    pub sigma: Sigma,
    /// Rewards already paid out to positions.
    pub total_distributed: Amount,
}

impl FarmingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the pool up to `height`.
    ///
    /// Returns the emission that accrued, which is zero when no blocks
    /// passed, nobody participates, or the emission window is closed. In
    /// every case `h_last` moves to `height`, so blocks are never counted
    /// twice and blocks without participants are never credited later.
    ///
    /// # Errors
    ///
    /// - [`FarmingError::HeightRegression`] if `height` is below `h_last`
    /// - [`FarmingError::ArithmeticOverflow`] if sigma would exceed 160 bits
    pub fn advance(
        &mut self,
        height: Height,
        schedule: &EmissionSchedule,
    ) -> Result<Amount, FarmingError> {
        let dh = height
            .checked_sub(self.h_last)
            .ok_or(FarmingError::HeightRegression {
                last: self.h_last,
                got: height,
            })?;
        if dh == 0 {
            return Ok(0);
        }
        self.h_last = height;

        if self.weight_total == 0 || self.h_total >= schedule.duration() {
            return Ok(0);
        }

        // Emission never accrues past the end of the window.
        let dh = dh.min(schedule.duration() - self.h_total);

        // sigma += emission_per_block * dh / weight_total, scaled by 2^96.
        let emission = schedule
            .emission_per_block()
            .checked_mul(dh)
            .ok_or(FarmingError::ArithmeticOverflow)?;
        let scaled = Sigma::with_u64_at(emission, NORMALIZATION_WORDS)
            .ok_or(FarmingError::ArithmeticOverflow)?;
        let (delta, _) = scaled
            .div_rem(&WideUint::<2>::from_u64(self.weight_total))
            .ok_or(FarmingError::ArithmeticOverflow)?;
        let sigma = self
            .sigma
            .checked_add(&delta)
            .ok_or(FarmingError::ArithmeticOverflow)?;

        self.sigma = sigma;
        self.h_total += dh;

        debug!(
            height,
            dh,
            emission,
            weight_total = self.weight_total,
            "farming: pool advanced"
        );
        Ok(emission)
    }

    /// Emission released so far, per the schedule.
    pub fn emission_so_far(&self, schedule: &EmissionSchedule) -> Amount {
        schedule.emission_so_far(self.h_total)
    }

    /// Emission released but not yet paid to anyone.
    pub fn undistributed(&self, schedule: &EmissionSchedule) -> Result<Amount, FarmingError> {
        let emitted = self.emission_so_far(schedule);
        emitted
            .checked_sub(self.total_distributed)
            .ok_or(FarmingError::DistributionExceedsEmission {
                distributed: self.total_distributed,
                emitted,
            })
    }

    /// Remove `weight`, which joined when sigma was `sigma_last`, and pay out its share.
    ///
    /// The pool must already be advanced to the current height. A zero
    /// weight never accrued and leaves the pool untouched. When the removed
    /// weight was the last in the pool, the whole undistributed emission is
    /// paid so no rounding dust is stranded.
    ///
    /// # Errors
    ///
    /// - [`FarmingError::DistributionExceedsEmission`] if more was paid than emitted
    /// - [`FarmingError::WeightUnderflow`] if `weight` exceeds the pool total
    /// - [`FarmingError::SigmaRegression`] if `sigma_last` is ahead of the pool
    pub fn remove_weight(
        &mut self,
        weight: Weight,
        sigma_last: &Sigma,
        schedule: &EmissionSchedule,
    ) -> Result<Amount, FarmingError> {
        if weight == 0 {
            return Ok(0);
        }

        let available = self.undistributed(schedule)?;
        let weight_total = self
            .weight_total
            .checked_sub(weight as u64)
            .ok_or(FarmingError::WeightUnderflow {
                total: self.weight_total,
                weight,
            })?;

        let owed = if weight_total == 0 {
            available
        } else {
            let d_sigma = self
                .sigma
                .checked_sub(sigma_last)
                .ok_or(FarmingError::SigmaRegression)?;
            let product: WideUint<{ SIGMA_WORDS + 1 }> = d_sigma
                .widening_mul(&WideUint::<1>::from_u32(weight))
                .ok_or(FarmingError::ArithmeticOverflow)?;
            // Drop the fractional words; the integral part is the next two.
            available.min(product.u64_at(NORMALIZATION_WORDS))
        };

        self.weight_total = weight_total;
        // owed <= available, so this stays within the emission so far.
        self.total_distributed += owed;

        debug!(
            weight,
            owed,
            weight_total,
            "farming: weight removed"
        );
        Ok(owed)
    }

    /// Add `weight` to the pool.
    pub fn add_weight(&mut self, weight: Weight) -> Result<(), FarmingError> {
        self.weight_total = self
            .weight_total
            .checked_add(weight as u64)
            .ok_or(FarmingError::ArithmeticOverflow)?;
        Ok(())
    }
}
