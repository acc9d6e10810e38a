//! # furrow-farming: Farming reward accrual engine.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! This crate distributes a fixed emission over a fixed block window to a
//! changing pool of participants:
//! - **Weight curve**: a deposit maps to a weight through an 18-point
//!   piecewise-linear lookup table, so large deposits earn sub-linearly.
//! - **Emission schedule**: `total / duration` is released per active block,
//!   with the truncation residue released at the end of the window.
//! - **Accumulator**: a 160-bit fixed-point reward-per-weight sum that each
//!   position snapshots when it joins, giving its exact pro-rata share later.
//! - **Engine**: the position update protocol (settle, move principal,
//!   withdraw reward, re-join).

pub mod accumulator;
pub mod engine;
pub mod lut;
pub mod position;
pub mod schedule;

pub use accumulator::{FarmingState, FARMING_STATE_SIZE};
pub use engine::{FarmingEngine, PositionUpdate};
pub use lut::{farming_weight, lut_calculate, LutCurve};
pub use position::{PositionChange, UserPos, USER_POS_SIZE};
pub use schedule::EmissionSchedule;
