//! Lookup-table interpolation for the farming weight curve.
//!
//! All computation uses integer arithmetic only. The curve is a table of
//! strictly increasing `(threshold, weight)` points; between two points the
//! weight is linearly interpolated and truncated, beyond the last point it
//! saturates at the last weight.
//!
//! The farming table has 18 points from 16 coins (weight 439) to one million
//! coins (weight 1_000_000). Deposits below 16 coins carry zero weight and do
//! not take part in the pool.

use furrow_core::constants::{WEIGHT_LUT_X, WEIGHT_LUT_Y};
use furrow_core::traits::WeightCurve;
use furrow_core::types::{Amount, Weight};

/// Interpolate `x` on the table `(xs, ys)`.
///
/// Returns `ys[0]` at or below `xs[0]`, `ys[last]` at or above `xs[last]`,
/// and otherwise `ys[i] + (ys[i+1] - ys[i]) * (x - xs[i]) / (xs[i+1] - xs[i])`
/// truncated, where `xs[i] <= x < xs[i+1]`.
///
/// Both tables must be non-empty, of equal length and increasing; this is
/// an input invariant and is not re-checked per call.
///
/// # Panics
///
/// Panics if `xs` is empty or `ys` is shorter than `xs`.
pub fn lut_calculate<X, Y>(xs: &[X], ys: &[Y], x: X) -> Y
where
    X: Copy + Ord + Into<u64>,
    Y: Copy + Ord + Into<u64> + TryFrom<u64>,
{
    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }

    // xs[0] < x < xs[last], so 1 <= i + 1 <= last.
    let i = xs.partition_point(|&t| t <= x) - 1;

    let xv: u64 = x.into();
    let x0: u64 = xs[i].into();
    let x1: u64 = xs[i + 1].into();
    let y0: u64 = ys[i].into();
    let y1: u64 = ys[i + 1].into();

    // Both factors are below 2^64, so the product fits in u128.
    let dy = y1.saturating_sub(y0) as u128;
    let dx = (xv - x0) as u128;
    let span = (x1 - x0) as u128;
    let value = y0 + (dy * dx / span) as u64;

    // value <= y1, which is a valid Y.
    Y::try_from(value).unwrap_or(ys[i + 1])
}

/// A weight curve backed by a static lookup table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LutCurve {
    thresholds: &'static [Amount],
    weights: &'static [Weight],
}

impl LutCurve {
    /// The compiled-in farming curve.
    pub const FARMING: Self = Self {
        thresholds: &WEIGHT_LUT_X,
        weights: &WEIGHT_LUT_Y,
    };

    /// Build a curve from custom tables.
    ///
    /// Returns `None` unless both tables are non-empty, of equal length and
    /// strictly increasing.
    pub fn new(thresholds: &'static [Amount], weights: &'static [Weight]) -> Option<Self> {
        if thresholds.is_empty() || thresholds.len() != weights.len() {
            return None;
        }
        let increasing = thresholds.windows(2).all(|w| w[0] < w[1])
            && weights.windows(2).all(|w| w[0] < w[1]);
        increasing.then_some(Self {
            thresholds,
            weights,
        })
    }

    pub fn thresholds(&self) -> &'static [Amount] {
        self.thresholds
    }

    pub fn weights(&self) -> &'static [Weight] {
        self.weights
    }

    /// Smallest deposit that carries a nonzero weight.
    pub fn min_deposit(&self) -> Amount {
        self.thresholds[0]
    }
}

impl Default for LutCurve {
    fn default() -> Self {
        Self::FARMING
    }
}

impl WeightCurve for LutCurve {
    fn weight(&self, amount: Amount) -> Weight {
        // Minimum deposit required to participate.
        if amount < self.thresholds[0] {
            return 0;
        }
        lut_calculate(self.thresholds, self.weights, amount)
    }
}

/// Weight of a deposit on the compiled-in farming curve.
pub fn farming_weight(amount: Amount) -> Weight {
    LutCurve::FARMING.weight(amount)
}
