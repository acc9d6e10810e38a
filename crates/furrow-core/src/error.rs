//! Error types for the Furrow protocol.
use thiserror::Error;

/// Arithmetic contract violations and balance checks in the farming protocol.
///
/// Every variant aborts the invocation that raised it; no state is committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FarmingError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("height went backwards: last {last}, got {got}")] HeightRegression { last: u64, got: u64 },
    #[error("weight underflow: total {total}, removing {weight}")] WeightUnderflow { total: u64, weight: u32 },
    #[error("distributed {distributed} exceeds emission so far {emitted}")] DistributionExceedsEmission { distributed: u64, emitted: u64 },
    #[error("position sigma is ahead of the pool sigma")] SigmaRegression,
    #[error("insufficient principal: have {have}, need {need}")] InsufficientPrincipal { have: u64, need: u64 },
    #[error("insufficient reward balance: have {have}, need {need}")] InsufficientRewardBalance { have: u64, need: u64 },
}

/// Fixed-layout record encoding and decoding failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("unknown method: {0}")] UnknownMethod(u32),
    #[error("invalid length for {kind}: expected {expected}, got {got}")] InvalidLength { kind: &'static str, expected: usize, got: usize },
    #[error("encode: {0}")] Encode(String),
    #[error("decode: {0}")] Decode(String),
}

/// Contract lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("contract not initialized")] NotInitialized,
    #[error("contract already initialized")] AlreadyInitialized,
    #[error("farming pool state missing")] MissingPoolState,
}

#[derive(Error, Debug)]
pub enum FurrowError {
    #[error(transparent)] Farming(#[from] FarmingError),
    #[error(transparent)] Record(#[from] RecordError),
    #[error(transparent)] Contract(#[from] ContractError),
    #[error("storage: {0}")] Storage(String),
}
