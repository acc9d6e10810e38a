//! Linear emission schedule of the farming pool.
//!
//! A fixed total is released evenly over a fixed number of active blocks.
//! The per-block amount is `total / duration` (truncated); the truncation
//! residue is paid out at the very end, when [`EmissionSchedule::emission_so_far`]
//! switches to the exact total.

use furrow_core::constants::{FARMING_DURATION, FARMING_EMISSION, GROTH_PER_COIN};
use furrow_core::types::{Amount, Height};

/// Total emission released linearly over `duration` active blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmissionSchedule {
    total: Amount,
    duration: Height,
    per_block: Amount,
}

impl EmissionSchedule {
    /// The compiled-in farming schedule: one million coins over 131_400 blocks.
    pub const FARMING: Self = Self::new(FARMING_EMISSION, FARMING_DURATION);

    /// # Panics
    ///
    /// Panics if `duration` is zero (at compile time when used in a const).
    pub const fn new(total: Amount, duration: Height) -> Self {
        assert!(duration > 0, "emission duration must be nonzero");
        Self {
            total,
            duration,
            per_block: total / duration,
        }
    }

    pub const fn total(&self) -> Amount {
        self.total
    }

    pub const fn duration(&self) -> Height {
        self.duration
    }

    pub const fn emission_per_block(&self) -> Amount {
        self.per_block
    }

    /// Emission lost to truncating the per-block amount, paid at the end.
    pub const fn round_off(&self) -> Amount {
        self.total - self.per_block * self.duration
    }

    /// Cumulative emission after `active_height` active blocks.
    ///
    /// At or past the end of the window this is the exact total, which
    /// compensates for the per-block truncation.
    pub const fn emission_so_far(&self, active_height: Height) -> Amount {
        if active_height >= self.duration {
            return self.total;
        }
        active_height * self.per_block
    }
}

impl Default for EmissionSchedule {
    fn default() -> Self {
        Self::FARMING
    }
}

const _: () = assert!(
    EmissionSchedule::FARMING.round_off() < GROTH_PER_COIN,
    "farming round-off must stay below one coin"
);

const _: () = assert!(
    EmissionSchedule::FARMING.emission_per_block() <= u32::MAX as Amount,
    "per-block emission must fit in 32 bits"
);
