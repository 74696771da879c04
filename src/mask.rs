//! Per-lane predicate masks.

use crate::backend::{Kernel, KernelOf, Lanes};
use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// Per-lane predicate for a `Batch<T, N>`.
///
/// Held in the kernel's native mask register with every lane all-bits-set
/// or all-bits-clear, so masks combine with `& | ^ !` without renormalising.
pub struct Mask<T: Lanes<N>, const N: usize> {
    bits: <KernelOf<T, N> as Kernel<T, N>>::Mask,
}

impl<T: Lanes<N>, const N: usize> Clone for Mask<T, N> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Lanes<N>, const N: usize> Copy for Mask<T, N> {}

impl<T: Lanes<N>, const N: usize> Mask<T, N> {
    #[inline(always)]
    pub(crate) fn from_bits(bits: <KernelOf<T, N> as Kernel<T, N>>::Mask) -> Self {
        Self { bits }
    }

    #[inline(always)]
    pub(crate) fn bits(self) -> <KernelOf<T, N> as Kernel<T, N>>::Mask {
        self.bits
    }

    /// Every lane set to `value`.
    #[inline(always)]
    pub fn splat(value: bool) -> Self {
        Self::from_bits(KernelOf::<T, N>::mask_splat(value))
    }

    /// Mask from booleans in lane order.
    #[inline(always)]
    pub fn from_array(lanes: [bool; N]) -> Self {
        Self::from_bits(KernelOf::<T, N>::mask_from_array(lanes))
    }

    /// Lanes as booleans.
    #[inline(always)]
    pub fn to_array(self) -> [bool; N] {
        KernelOf::<T, N>::mask_to_array(self.bits)
    }

    /// Lane `index`. Panics if `index >= N`.
    #[inline(always)]
    pub fn test(self, index: usize) -> bool {
        self.to_array()[index]
    }

    /// True if at least one lane is set.
    #[inline(always)]
    pub fn any(self) -> bool {
        KernelOf::<T, N>::mask_any(self.bits)
    }

    /// True if every lane is set.
    #[inline(always)]
    pub fn all(self) -> bool {
        KernelOf::<T, N>::mask_all(self.bits)
    }

    /// True if no lane is set.
    #[inline(always)]
    pub fn none(self) -> bool {
        !self.any()
    }
}

impl<T: Lanes<N>, const N: usize> BitAnd for Mask<T, N> {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self::from_bits(KernelOf::<T, N>::mask_and(self.bits, rhs.bits))
    }
}

impl<T: Lanes<N>, const N: usize> BitOr for Mask<T, N> {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(KernelOf::<T, N>::mask_or(self.bits, rhs.bits))
    }
}

impl<T: Lanes<N>, const N: usize> BitXor for Mask<T, N> {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        Self::from_bits(KernelOf::<T, N>::mask_xor(self.bits, rhs.bits))
    }
}

impl<T: Lanes<N>, const N: usize> Not for Mask<T, N> {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self::from_bits(KernelOf::<T, N>::mask_not(self.bits))
    }
}

impl<T: Lanes<N>, const N: usize> BitAndAssign for Mask<T, N> {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl<T: Lanes<N>, const N: usize> BitOrAssign for Mask<T, N> {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl<T: Lanes<N>, const N: usize> BitXorAssign for Mask<T, N> {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl<T: Lanes<N>, const N: usize> PartialEq for Mask<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl<T: Lanes<N>, const N: usize> Eq for Mask<T, N> {}

impl<T: Lanes<N>, const N: usize> Default for Mask<T, N> {
    fn default() -> Self {
        Self::splat(false)
    }
}

impl<T: Lanes<N>, const N: usize> From<[bool; N]> for Mask<T, N> {
    fn from(lanes: [bool; N]) -> Self {
        Self::from_array(lanes)
    }
}

impl<T: Lanes<N>, const N: usize> fmt::Debug for Mask<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Mask").field(&self.to_array()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type M2 = Mask<i64, 2>;
    type M8 = Mask<i32, 8>;

    #[test]
    fn reductions() {
        assert!(M2::splat(true).all());
        assert!(M2::splat(false).none());
        let mixed = M2::from_array([false, true]);
        assert!(mixed.any());
        assert!(!mixed.all());
        assert!(!mixed.test(0));
        assert!(mixed.test(1));
    }

    #[test]
    fn combinators_stay_normalised() {
        let a = M8::from_array([true, true, false, false, true, false, true, false]);
        let b = M8::from_array([true, false, true, false, true, true, false, false]);
        assert_eq!((a & b).to_array(), [true, false, false, false, true, false, false, false]);
        assert_eq!((a | b).to_array(), [true, true, true, false, true, true, true, false]);
        assert_eq!((a ^ b) | (a & b), a | b);
        assert_eq!(!!a, a);
        assert!((a ^ a).none());
    }

    #[test]
    fn debug_lists_lanes() {
        assert_eq!(format!("{:?}", M2::from_array([true, false])), "Mask([true, false])");
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        M2::splat(true).test(2);
    }
}
