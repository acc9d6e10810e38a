//! Protocol constants. All monetary values in groth (1 coin = 10^8 groth).

use crate::types::{Amount, AssetId, Height, Weight};

pub const GROTH_PER_COIN: Amount = 100_000_000;

/// The native asset. Principal deposits are made in it.
pub const NATIVE_ASSET_ID: AssetId = 0;

// --- Farming emission ---

/// Total reward emitted to farmers over the whole farming window.
pub const FARMING_EMISSION: Amount = GROTH_PER_COIN * 1_000_000;

/// Length of the farming window in blocks (three months of one-minute blocks).
pub const FARMING_DURATION: Height = 1440 * 365 / 4;

// --- Fixed-point accumulator layout ---

/// Words in the reward-per-weight accumulator (160 bits).
pub const SIGMA_WORDS: usize = 5;

/// Low-order words of sigma that hold the fractional part (2^96 scale).
pub const NORMALIZATION_WORDS: usize = 3;

// --- Weight curve ---

/// Deposit thresholds of the farming weight curve.
///
/// Strictly increasing. Deposits below the first entry carry zero weight.
pub const WEIGHT_LUT_X: [Amount; 18] = [
    1_600_000_000,
    3_125_854_492,
    6_177_516_910,
    12_280_655_489,
    24_486_187_635,
    48_894_272_061,
    97_698_522_904,
    195_259_364_190,
    390_190_498_244,
    779_291_316_610,
    1_554_453_103_198,
    3_092_664_773_460,
    6_121_018_999_289,
    11_988_455_311_833,
    22_989_898_397_853,
    42_242_423_798_389,
    71_121_211_899_194,
    100_000_000_000_000,
];

/// Weights at each threshold of [`WEIGHT_LUT_X`]. Strictly increasing.
pub const WEIGHT_LUT_Y: [Weight; 18] = [
    439, 702, 1_131, 1_830, 2_966, 4_813, 7_814, 12_689, 20_601, 33_434, 54_213, 87_747, 141_506,
    226_534, 357_335, 547_046, 787_769, 1_000_000,
];

/// Largest weight any single position can carry.
pub const MAX_WEIGHT: Weight = WEIGHT_LUT_Y[WEIGHT_LUT_Y.len() - 1];

// --- Store layout ---

/// Key tag of the contract-wide state record.
pub const TAG_CONTRACT_STATE: u8 = 0;

/// Key tag reserved for vesting grants (handled outside this workspace).
pub const TAG_PREALLOCATED: u8 = 1;

/// Key tag of the farming pool record and of farming positions.
pub const TAG_FARMING: u8 = 2;

// --- Method identifiers ---

/// Vesting grant query/claim. Served by the vesting module, not here.
pub const METHOD_GET_PREALLOCATED: u32 = 3;

/// Farming position update.
pub const METHOD_UPDATE_FARMING: u32 = 4;
