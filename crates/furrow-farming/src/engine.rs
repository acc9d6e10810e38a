//! Farming engine: the distribution protocol over a weight curve and an
//! emission schedule.
//!
//! A position participates with `weight(principal)`. Every update first
//! advances the pool to the current height, then settles the position
//! (removing its weight and crediting what it is owed), applies the
//! requested principal and reward movements, and finally re-joins the pool
//! at the current sigma.

use serde::Serialize;
use tracing::debug;

use furrow_core::error::FarmingError;
use furrow_core::traits::WeightCurve;
use furrow_core::types::{Amount, Height, Weight};

use crate::accumulator::FarmingState;
use crate::lut::LutCurve;
use crate::position::{PositionChange, UserPos};
use crate::schedule::EmissionSchedule;

/// Result of one position update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PositionUpdate {
    /// The position to store, or `None` if it should be removed.
    pub position: Option<UserPos>,
    /// Reward credited to the position by settlement.
    pub accrued: Amount,
    /// The change that was applied.
    pub change: PositionChange,
}

/// The farming distribution protocol.
///
/// Stateless apart from its parameters: pool and position state is passed
/// in by the caller, who owns persistence.
#[derive(Debug, Clone)]
pub struct FarmingEngine<C = LutCurve> {
    curve: C,
    schedule: EmissionSchedule,
}

impl FarmingEngine<LutCurve> {
    /// The engine with the compiled-in curve and schedule.
    pub fn new() -> Self {
        Self::with_params(LutCurve::FARMING, EmissionSchedule::FARMING)
    }
}

impl Default for FarmingEngine<LutCurve> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: WeightCurve> FarmingEngine<C> {
    pub fn with_params(curve: C, schedule: EmissionSchedule) -> Self {
        Self { curve, schedule }
    }

    pub fn curve(&self) -> &C {
        &self.curve
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    /// Weight a deposit of `amount` participates with.
    pub fn weight(&self, amount: Amount) -> Weight {
        self.curve.weight(amount)
    }

    /// Bring the pool up to `height`. See [`FarmingState::advance`].
    pub fn advance(&self, state: &mut FarmingState, height: Height) -> Result<Amount, FarmingError> {
        state.advance(height, &self.schedule)
    }

    /// Emission released so far for this pool.
    pub fn emission_so_far(&self, state: &FarmingState) -> Amount {
        state.emission_so_far(&self.schedule)
    }

    /// Take the position out of the pool and return what it is owed.
    ///
    /// The pool must already be advanced. The position itself is not
    /// touched; the caller credits the result and re-joins.
    pub fn settle(&self, state: &mut FarmingState, pos: &UserPos) -> Result<Amount, FarmingError> {
        let weight = self.weight(pos.principal);
        state.remove_weight(weight, &pos.sigma_last, &self.schedule)
    }

    /// Put the position back into the pool at the current sigma.
    pub fn join(&self, state: &mut FarmingState, pos: &mut UserPos) -> Result<(), FarmingError> {
        pos.sigma_last = state.sigma;
        let weight = self.weight(pos.principal);
        if weight > 0 {
            state.add_weight(weight)?;
        }
        Ok(())
    }

    /// Apply `change` to the position at `height`.
    ///
    /// `existing` is the stored position, if any. On success `state` holds
    /// the new pool state and the returned update says what to store. On
    /// error `state` is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Any [`FarmingError`] from advancing or settling, plus
    /// [`FarmingError::InsufficientPrincipal`] and
    /// [`FarmingError::InsufficientRewardBalance`] when a withdrawal exceeds
    /// what the position holds.
    pub fn update_position(
        &self,
        state: &mut FarmingState,
        existing: Option<UserPos>,
        change: &PositionChange,
        height: Height,
    ) -> Result<PositionUpdate, FarmingError> {
        let mut pool = *state;
        self.advance(&mut pool, height)?;

        let mut pos = existing.unwrap_or_default();
        let accrued = self.settle(&mut pool, &pos)?;
        pos.reward_balance = pos
            .reward_balance
            .checked_add(accrued)
            .ok_or(FarmingError::ArithmeticOverflow)?;

        if change.principal > 0 {
            pos.principal = if change.lock {
                pos.principal
                    .checked_add(change.principal)
                    .ok_or(FarmingError::ArithmeticOverflow)?
            } else {
                pos.principal
                    .checked_sub(change.principal)
                    .ok_or(FarmingError::InsufficientPrincipal {
                        have: pos.principal,
                        need: change.principal,
                    })?
            };
        }

        if change.reward_withdraw > 0 {
            pos.reward_balance = pos
                .reward_balance
                .checked_sub(change.reward_withdraw)
                .ok_or(FarmingError::InsufficientRewardBalance {
                    have: pos.reward_balance,
                    need: change.reward_withdraw,
                })?;
        }

        let position = if pos.is_empty() {
            None
        } else {
            self.join(&mut pool, &mut pos)?;
            Some(pos)
        };

        *state = pool;

        debug!(
            height,
            accrued,
            principal = pos.principal,
            reward_balance = pos.reward_balance,
            weight_total = state.weight_total,
            "farming: position settled"
        );

        Ok(PositionUpdate {
            position,
            accrued,
            change: *change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use furrow_core::constants::WEIGHT_LUT_X;
    use furrow_core::types::Sigma;

    /// Weight equals the deposit, for exact arithmetic in tests.
    struct Linear;

    impl WeightCurve for Linear {
        fn weight(&self, amount: Amount) -> Weight {
            amount as Weight
        }
    }

    /// 100 per block over 10 blocks.
    fn engine() -> FarmingEngine<Linear> {
        FarmingEngine::with_params(Linear, EmissionSchedule::new(1_000, 10))
    }

    fn deposit(
        e: &FarmingEngine<Linear>,
        s: &mut FarmingState,
        amount: Amount,
        height: Height,
    ) -> UserPos {
        e.update_position(s, None, &PositionChange::deposit(amount), height)
            .unwrap()
            .position
            .unwrap()
    }

    #[test]
    fn deposit_joins_pool() {
        let e = engine();
        let mut s = FarmingState::new();
        let pos = deposit(&e, &mut s, 5, 0);
        assert_eq!(pos.principal, 5);
        assert_eq!(pos.reward_balance, 0);
        assert_eq!(s.weight_total, 5);
        assert_eq!(pos.sigma_last, s.sigma);
    }

    #[test]
    fn sole_participant_takes_everything() {
        let e = FarmingEngine::with_params(Linear, EmissionSchedule::new(100_000_000, 131_400));
        let mut s = FarmingState::new();
        let pos = deposit(&e, &mut s, 1_000, 0);

        let upd = e
            .update_position(&mut s, Some(pos), &PositionChange::default(), 100)
            .unwrap();
        assert_eq!(upd.accrued, 76_100);
        assert_eq!(upd.position.unwrap().reward_balance, 76_100);
        assert_eq!(s.total_distributed, 76_100);
        // Still in the pool with the same weight.
        assert_eq!(s.weight_total, 1_000);
    }

    #[test]
    fn proportional_split() {
        let e = engine();
        let mut s = FarmingState::new();
        let a = deposit(&e, &mut s, 1, 0);
        let b = deposit(&e, &mut s, 3, 0);

        let a = e
            .update_position(&mut s, Some(a), &PositionChange::withdraw(1), 4)
            .unwrap();
        assert_eq!(a.accrued, 100);
        let b = e
            .update_position(&mut s, Some(b), &PositionChange::withdraw(3), 4)
            .unwrap();
        assert_eq!(b.accrued, 300);
        assert_eq!(s.weight_total, 0);
        assert_eq!(s.total_distributed, 400);
    }

    #[test]
    fn withdraw_then_claim_removes_position() {
        let e = engine();
        let mut s = FarmingState::new();
        let pos = deposit(&e, &mut s, 10, 0);

        let upd = e
            .update_position(&mut s, Some(pos), &PositionChange::withdraw(10), 2)
            .unwrap();
        let pos = upd.position.unwrap();
        assert_eq!(pos.principal, 0);
        assert_eq!(pos.reward_balance, 200);
        assert_eq!(s.weight_total, 0);

        let upd = e
            .update_position(&mut s, Some(pos), &PositionChange::claim(200), 5)
            .unwrap();
        assert_eq!(upd.accrued, 0);
        assert!(upd.position.is_none());
    }

    #[test]
    fn withdraw_and_claim_in_one_update() {
        let e = engine();
        let mut s = FarmingState::new();
        let pos = deposit(&e, &mut s, 10, 0);
        let change = PositionChange::withdraw(10).with_claim(300);
        let upd = e.update_position(&mut s, Some(pos), &change, 3).unwrap();
        assert_eq!(upd.accrued, 300);
        assert!(upd.position.is_none());
        assert_eq!(upd.change, change);
    }

    #[test]
    fn over_withdraw_principal_is_error_and_state_untouched() {
        let e = engine();
        let mut s = FarmingState::new();
        let pos = deposit(&e, &mut s, 10, 0);
        let before = s;

        let err = e
            .update_position(&mut s, Some(pos), &PositionChange::withdraw(11), 5)
            .unwrap_err();
        assert_eq!(err, FarmingError::InsufficientPrincipal { have: 10, need: 11 });
        assert_eq!(s, before);
    }

    #[test]
    fn over_claim_is_error() {
        let e = engine();
        let mut s = FarmingState::new();
        let pos = deposit(&e, &mut s, 10, 0);
        let err = e
            .update_position(&mut s, Some(pos), &PositionChange::claim(101), 1)
            .unwrap_err();
        assert_eq!(
            err,
            FarmingError::InsufficientRewardBalance { have: 100, need: 101 }
        );
        assert_eq!(s.h_last, 0);
    }

    #[test]
    fn height_regression_is_error() {
        let e = engine();
        let mut s = FarmingState::new();
        deposit(&e, &mut s, 10, 5);
        assert_eq!(
            e.update_position(&mut s, None, &PositionChange::deposit(1), 4)
                .unwrap_err(),
            FarmingError::HeightRegression { last: 5, got: 4 }
        );
    }

    #[test]
    fn empty_update_on_missing_position_is_noop() {
        let e = engine();
        let mut s = FarmingState::new();
        let upd = e
            .update_position(&mut s, None, &PositionChange::default(), 3)
            .unwrap();
        assert!(upd.position.is_none());
        assert_eq!(upd.accrued, 0);
        assert_eq!(s.weight_total, 0);
        assert!(s.sigma.is_zero());
    }

    #[test]
    fn repeated_settle_at_same_height_accrues_once() {
        let e = engine();
        let mut s = FarmingState::new();
        let pos = deposit(&e, &mut s, 4, 0);
        let first = e
            .update_position(&mut s, Some(pos), &PositionChange::default(), 6)
            .unwrap();
        let second = e
            .update_position(&mut s, first.position, &PositionChange::default(), 6)
            .unwrap();
        assert_eq!(first.accrued, 600);
        assert_eq!(second.accrued, 0);
        assert_eq!(second.position.unwrap().reward_balance, 600);
    }

    #[test]
    fn below_minimum_deposit_does_not_participate() {
        let e = FarmingEngine::new();
        let mut s = FarmingState::new();
        let small = WEIGHT_LUT_X[0] - 1;
        let upd = e
            .update_position(&mut s, None, &PositionChange::deposit(small), 0)
            .unwrap();
        let pos = upd.position.unwrap();
        assert_eq!(pos.principal, small);
        assert_eq!(s.weight_total, 0);

        // Nothing accrues to a weightless position.
        let upd = e
            .update_position(&mut s, Some(pos), &PositionChange::default(), 1_000)
            .unwrap();
        assert_eq!(upd.accrued, 0);
        assert_eq!(s.h_total, 0);
    }

    #[test]
    fn farming_curve_weights_deposit() {
        let e = FarmingEngine::new();
        let mut s = FarmingState::new();
        e.update_position(&mut s, None, &PositionChange::deposit(WEIGHT_LUT_X[0]), 0)
            .unwrap();
        assert_eq!(s.weight_total, 439);
    }

    #[test]
    fn settle_with_stale_sigma_snapshot_is_error() {
        let e = engine();
        let mut s = FarmingState::new();
        deposit(&e, &mut s, 1, 0);
        let forged = UserPos {
            sigma_last: Sigma::from_u64(u64::MAX),
            principal: 1,
            reward_balance: 0,
        };
        deposit(&e, &mut s, 1, 0);
        assert_eq!(
            e.update_position(&mut s, Some(forged), &PositionChange::default(), 0)
                .unwrap_err(),
            FarmingError::SigmaRegression
        );
    }
}
