//! Fixed-width unsigned integers built from 32-bit words.
//!
//! [`WideUint<N>`] holds `N` little-endian words: word 0 is the least
//! significant. All arithmetic is exact and integer-only, so every node
//! computes byte-identical results regardless of platform.
//!
//! Two flavours of each fallible operation exist:
//! - `checked_*` / `Option` returning methods, used by consensus code that
//!   must turn a broken invariant into an error;
//! - `+=` / `-=` operators, which panic on true overflow exactly like the
//!   native integer operators do in debug builds.
//!
//! The farming accumulator uses `WideUint<5>` (160 bits) as a fixed-point
//! number whose low 3 words are the fractional part.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{AddAssign, SubAssign};

use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};
use serde::{Serialize, Serializer};

/// Bits per word.
pub const WORD_BITS: u32 = 32;

/// An `N`-word unsigned integer (`32 * N` bits).
///
/// # Examples
///
/// ```
/// use furrow_core::wide::WideUint;
///
/// // 1 << 96, i.e. the value 1 placed at word offset 3.
/// let one_shifted = WideUint::<5>::with_u64_at(1, 3).unwrap();
/// let (q, r) = one_shifted.div_rem(&WideUint::<2>::from_u64(4)).unwrap();
/// assert!(r.is_zero());
/// assert_eq!(q.u32_at(2), 0x4000_0000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WideUint<const N: usize>(pub [u32; N]);

impl<const N: usize> WideUint<N> {
    /// The value zero.
    pub const ZERO: Self = Self([0; N]);

    /// Total width in bits.
    pub const BITS: u32 = WORD_BITS * N as u32;

    /// Build from little-endian words.
    pub const fn from_words(words: [u32; N]) -> Self {
        Self(words)
    }

    /// The little-endian words.
    pub const fn words(&self) -> &[u32; N] {
        &self.0
    }

    pub fn from_u32(value: u32) -> Self {
        const { assert!(N >= 1, "WideUint needs at least one word") };
        let mut out = Self::ZERO;
        out.0[0] = value;
        out
    }

    pub fn from_u64(value: u64) -> Self {
        const { assert!(N >= 2, "a u64 needs at least two words") };
        let mut out = Self::ZERO;
        out.0[0] = value as u32;
        out.0[1] = (value >> WORD_BITS) as u32;
        out
    }

    /// Place `value` so that its lowest word lands at `word_offset`, zero elsewhere.
    ///
    /// Equivalent to `value << (32 * word_offset)`. Returns `None` if a
    /// nonzero part of `value` would fall past the last word.
    pub fn with_u64_at(value: u64, word_offset: usize) -> Option<Self> {
        let mut out = Self::ZERO;
        let parts = [value as u32, (value >> WORD_BITS) as u32];
        for (i, part) in parts.into_iter().enumerate() {
            match word_offset.checked_add(i) {
                Some(idx) if idx < N => out.0[idx] = part,
                _ if part == 0 => {}
                _ => return None,
            }
        }
        Some(out)
    }

    /// Read the two words starting at `word_offset` as a `u64`.
    ///
    /// Words below the offset are discarded and words above the pair are
    /// truncated away. Words past the end read as zero.
    pub fn u64_at(&self, word_offset: usize) -> u64 {
        let lo = self.u32_at(word_offset) as u64;
        let hi = word_offset
            .checked_add(1)
            .map_or(0, |idx| self.u32_at(idx)) as u64;
        (hi << WORD_BITS) | lo
    }

    /// Read the word at `word_offset`, zero past the end.
    pub fn u32_at(&self, word_offset: usize) -> u32 {
        self.0.get(word_offset).copied().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// The value as a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.iter().skip(2).any(|&w| w != 0) {
            return None;
        }
        Some(self.u64_at(0))
    }

    /// Convert to another width. Returns `None` if nonzero words would be dropped.
    pub fn resize<const K: usize>(&self) -> Option<WideUint<K>> {
        if self.0.iter().skip(K).any(|&w| w != 0) {
            return None;
        }
        let mut out = WideUint::<K>::ZERO;
        for (dst, src) in out.0.iter_mut().zip(self.0.iter()) {
            *dst = *src;
        }
        Some(out)
    }

    /// Add with wraparound, reporting whether a carry left the top word.
    pub fn overflowing_add(&self, rhs: &Self) -> (Self, bool) {
        let mut out = [0u32; N];
        let mut carry = false;
        for (i, slot) in out.iter_mut().enumerate() {
            let (s1, c1) = self.0[i].overflowing_add(rhs.0[i]);
            let (s2, c2) = s1.overflowing_add(carry as u32);
            *slot = s2;
            carry = c1 || c2;
        }
        (Self(out), carry)
    }

    /// Subtract with wraparound, reporting whether a borrow was needed.
    pub fn overflowing_sub(&self, rhs: &Self) -> (Self, bool) {
        let mut out = [0u32; N];
        let mut borrow = false;
        for (i, slot) in out.iter_mut().enumerate() {
            let (d1, b1) = self.0[i].overflowing_sub(rhs.0[i]);
            let (d2, b2) = d1.overflowing_sub(borrow as u32);
            *slot = d2;
            borrow = b1 || b2;
        }
        (Self(out), borrow)
    }

    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        match self.overflowing_add(rhs) {
            (sum, false) => Some(sum),
            (_, true) => None,
        }
    }

    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        match self.overflowing_sub(rhs) {
            (diff, false) => Some(diff),
            (_, true) => None,
        }
    }

    /// Exact product of an `N`-word and an `M`-word value into `R` words.
    ///
    /// `R >= N + M` can hold every product. A narrower `R` is allowed and
    /// yields `None` when the actual product does not fit.
    pub fn widening_mul<const M: usize, const R: usize>(
        &self,
        rhs: &WideUint<M>,
    ) -> Option<WideUint<R>> {
        let mut out = [0u32; R];

        for (i, &a) in self.0.iter().enumerate() {
            if a == 0 {
                continue;
            }
            let mut carry: u64 = 0;
            for (j, &b) in rhs.0.iter().enumerate() {
                let k = i + j;
                let acc = out.get(k).copied().unwrap_or(0) as u64;
                // (2^32-1)^2 + 2 * (2^32-1) == 2^64 - 1: never overflows.
                let cur = a as u64 * b as u64 + acc + carry;
                match out.get_mut(k) {
                    Some(slot) => *slot = cur as u32,
                    None if cur as u32 == 0 => {}
                    None => return None,
                }
                carry = cur >> WORD_BITS;
            }

            let mut k = i + M;
            while carry != 0 {
                let slot = out.get_mut(k)?;
                let cur = *slot as u64 + carry;
                *slot = cur as u32;
                carry = cur >> WORD_BITS;
                k += 1;
            }
        }

        Some(WideUint(out))
    }

    /// Divide by an `M`-word divisor, returning `(quotient, remainder)`.
    ///
    /// The quotient keeps the dividend's width and the remainder the
    /// divisor's. Returns `None` for a zero divisor, or when the divisor is
    /// wider than `N` words and does not fit in them.
    pub fn div_rem<const M: usize>(&self, divisor: &WideUint<M>) -> Option<(Self, WideUint<M>)> {
        if divisor.is_zero() {
            return None;
        }
        let d: WideUint<N> = divisor.resize()?;

        let (quotient, remainder) = match d.to_u64() {
            Some(small) => {
                let (q, r) = self.div_rem_u64(small);
                (q, Self::from_u64_lossy(r))
            }
            None => self.div_rem_shift(&d),
        };

        // remainder < divisor, so it always fits back into M words.
        Some((quotient, remainder.resize()?))
    }

    /// Word-by-word long division for divisors up to 64 bits.
    fn div_rem_u64(&self, divisor: u64) -> (Self, u64) {
        let d = divisor as u128;
        let mut quotient = [0u32; N];
        let mut rem: u128 = 0;
        for i in (0..N).rev() {
            // rem < d < 2^64, so cur < 2^96 and each digit fits in a word.
            let cur = (rem << WORD_BITS) | self.0[i] as u128;
            quotient[i] = (cur / d) as u32;
            rem = cur % d;
        }
        (Self(quotient), rem as u64)
    }

    /// Bitwise shift-subtract division, used for divisors wider than 64 bits.
    fn div_rem_shift(&self, divisor: &Self) -> (Self, Self) {
        let mut quotient = Self::ZERO;
        let mut rem = Self::ZERO;
        for bit in (0..Self::BITS).rev() {
            let carried = rem.shl1();
            rem.0[0] |= self.bit(bit) as u32;
            // A carried-out bit means the true remainder exceeds every
            // N-word divisor; the wrapping subtraction is then still exact.
            if carried || rem >= *divisor {
                rem = rem.overflowing_sub(divisor).0;
                quotient.set_bit(bit);
            }
        }
        (quotient, rem)
    }

    fn from_u64_lossy(value: u64) -> Self {
        let mut out = Self::ZERO;
        if let Some(w) = out.0.get_mut(0) {
            *w = value as u32;
        }
        if let Some(w) = out.0.get_mut(1) {
            *w = (value >> WORD_BITS) as u32;
        }
        out
    }

    /// Shift left by one bit in place, returning the bit shifted out of the top.
    fn shl1(&mut self) -> bool {
        let mut carry = 0u32;
        for w in self.0.iter_mut() {
            let next = *w >> (WORD_BITS - 1);
            *w = (*w << 1) | carry;
            carry = next;
        }
        carry != 0
    }

    fn bit(&self, index: u32) -> bool {
        let word = (index / WORD_BITS) as usize;
        (self.0[word] >> (index % WORD_BITS)) & 1 == 1
    }

    fn set_bit(&mut self, index: u32) {
        let word = (index / WORD_BITS) as usize;
        self.0[word] |= 1 << (index % WORD_BITS);
    }
}

impl<const N: usize> Default for WideUint<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> Ord for WideUint<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl<const N: usize> PartialOrd for WideUint<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> AddAssign for WideUint<N> {
    fn add_assign(&mut self, rhs: Self) {
        let (sum, overflow) = self.overflowing_add(&rhs);
        assert!(!overflow, "WideUint<{N}> addition overflow");
        *self = sum;
    }
}

impl<const N: usize> SubAssign for WideUint<N> {
    fn sub_assign(&mut self, rhs: Self) {
        let (diff, underflow) = self.overflowing_sub(&rhs);
        assert!(!underflow, "WideUint<{N}> subtraction underflow");
        *self = diff;
    }
}

impl<const N: usize> From<u32> for WideUint<N> {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl<const N: usize> fmt::LowerHex for WideUint<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        let mut words = self.0.iter().rev().skip_while(|&&w| w == 0);
        match words.next() {
            None => f.write_str("0"),
            Some(top) => {
                write!(f, "{top:x}")?;
                for w in words {
                    write!(f, "{w:08x}")?;
                }
                Ok(())
            }
        }
    }
}

impl<const N: usize> fmt::Display for WideUint<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:#x}")
    }
}

impl<const N: usize> Serialize for WideUint<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// Encoded as N little-endian words with no length prefix, so a record that
// embeds a WideUint keeps a fixed size.
impl<const N: usize> Encode for WideUint<N> {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        for w in &self.0 {
            w.encode(encoder)?;
        }
        Ok(())
    }
}

impl<Context, const N: usize> Decode<Context> for WideUint<N> {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let mut words = [0u32; N];
        for w in words.iter_mut() {
            *w = <u32 as Decode<Context>>::decode(decoder)?;
        }
        Ok(Self(words))
    }
}

impl<'de, Context, const N: usize> BorrowDecode<'de, Context> for WideUint<N> {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        <Self as Decode<Context>>::decode(decoder)
    }
}
