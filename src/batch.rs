//! SIMD batch value type and its operators.

use crate::backend::{Kernel, KernelOf, Lanes};
use crate::convert::Convert;
use crate::mask::Mask;
use core::fmt;
use core::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

type Reg<T, const N: usize> = <KernelOf<T, N> as Kernel<T, N>>::Reg;

/// `N` lanes of `T` in one native register.
///
/// The register type and every operation come from `<T as Lanes<N>>::Kernel`,
/// so a `Batch` is exactly as large as the register and all dispatch is
/// static.
///
/// Comparisons are methods returning a [`Mask`]; `==` compares whole
/// batches (true when every lane is equal).
pub struct Batch<T: Lanes<N>, const N: usize> {
    reg: Reg<T, N>,
}

impl<T: Lanes<N>, const N: usize> Clone for Batch<T, N> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Lanes<N>, const N: usize> Copy for Batch<T, N> {}

impl<T: Lanes<N>, const N: usize> Batch<T, N> {
    /// Number of lanes.
    pub const LANES: usize = N;

    /// Alignment required by [`load_aligned`](Self::load_aligned) and
    /// [`store_aligned`](Self::store_aligned): the register width in bytes.
    pub const ALIGNMENT: usize = N * core::mem::size_of::<T>();

    #[inline(always)]
    fn from_reg(reg: Reg<T, N>) -> Self {
        Self { reg }
    }

    // =========================================================================
    // Construction / Lane Access
    // =========================================================================

    /// Every lane equal to `value`.
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Self::from_reg(KernelOf::<T, N>::splat(value))
    }

    /// Lanes in index order.
    #[inline(always)]
    pub fn from_array(lanes: [T; N]) -> Self {
        Self::from_reg(KernelOf::<T, N>::from_array(lanes))
    }

    /// Lanes in index order.
    #[inline(always)]
    pub fn to_array(self) -> [T; N] {
        KernelOf::<T, N>::to_array(self.reg)
    }

    /// Lane `index`.
    ///
    /// # Panics
    ///
    /// If `index >= N`.
    #[inline(always)]
    pub fn extract(self, index: usize) -> T {
        KernelOf::<T, N>::extract(self.reg, index)
    }

    // =========================================================================
    // Memory
    // =========================================================================

    /// Load `N` elements of `S` from `src`, converting each to `T`.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reading `N` elements of `S` and aligned to
    /// [`Self::ALIGNMENT`] bytes.
    #[inline(always)]
    pub unsafe fn load_aligned<S>(src: *const S) -> Self
    where
        KernelOf<T, N>: Convert<S, T, N>,
    {
        // SAFETY: forwarded caller contract.
        Self::from_reg(unsafe { <KernelOf<T, N> as Convert<S, T, N>>::load_aligned(src) })
    }

    /// Load `N` elements of `S` from any address.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reading `N` elements of `S`.
    #[inline(always)]
    pub unsafe fn load_unaligned<S>(src: *const S) -> Self
    where
        KernelOf<T, N>: Convert<S, T, N>,
    {
        // SAFETY: forwarded caller contract.
        Self::from_reg(unsafe { <KernelOf<T, N> as Convert<S, T, N>>::load_unaligned(src) })
    }

    /// Convert each lane to `S` and store `N` elements at `dst`.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writing `N` elements of `S` and aligned to
    /// [`Self::ALIGNMENT`] bytes.
    #[inline(always)]
    pub unsafe fn store_aligned<S>(self, dst: *mut S)
    where
        KernelOf<T, N>: Convert<S, T, N>,
    {
        // SAFETY: forwarded caller contract.
        unsafe { <KernelOf<T, N> as Convert<S, T, N>>::store_aligned(self.reg, dst) }
    }

    /// Convert each lane to `S` and store `N` elements at any address.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writing `N` elements of `S`.
    #[inline(always)]
    pub unsafe fn store_unaligned<S>(self, dst: *mut S)
    where
        KernelOf<T, N>: Convert<S, T, N>,
    {
        // SAFETY: forwarded caller contract.
        unsafe { <KernelOf<T, N> as Convert<S, T, N>>::store_unaligned(self.reg, dst) }
    }

    /// Load the first `N` elements of `src`.
    ///
    /// # Panics
    ///
    /// If `src` holds fewer than `N` elements.
    #[inline]
    pub fn from_slice<S>(src: &[S]) -> Self
    where
        KernelOf<T, N>: Convert<S, T, N>,
    {
        assert!(src.len() >= N, "slice too short: need {} elements, got {}", N, src.len());
        // SAFETY: length checked above; the unaligned path has no alignment
        // requirement.
        unsafe { Self::load_unaligned(src.as_ptr()) }
    }

    /// Store into the first `N` elements of `dst`.
    ///
    /// # Panics
    ///
    /// If `dst` holds fewer than `N` elements.
    #[inline]
    pub fn write_to_slice<S>(self, dst: &mut [S])
    where
        KernelOf<T, N>: Convert<S, T, N>,
    {
        assert!(dst.len() >= N, "slice too short: need {} elements, got {}", N, dst.len());
        // SAFETY: length checked above.
        unsafe { self.store_unaligned(dst.as_mut_ptr()) }
    }

    // =========================================================================
    // Comparisons
    // =========================================================================

    /// Lane-wise `==`.
    #[inline(always)]
    pub fn cmp_eq(self, rhs: Self) -> Mask<T, N> {
        Mask::from_bits(KernelOf::<T, N>::cmp_eq(self.reg, rhs.reg))
    }

    /// Lane-wise `!=`.
    #[inline(always)]
    pub fn cmp_ne(self, rhs: Self) -> Mask<T, N> {
        Mask::from_bits(KernelOf::<T, N>::cmp_ne(self.reg, rhs.reg))
    }

    /// Lane-wise `<`.
    #[inline(always)]
    pub fn cmp_lt(self, rhs: Self) -> Mask<T, N> {
        Mask::from_bits(KernelOf::<T, N>::cmp_lt(self.reg, rhs.reg))
    }

    /// Lane-wise `<=`.
    #[inline(always)]
    pub fn cmp_le(self, rhs: Self) -> Mask<T, N> {
        Mask::from_bits(KernelOf::<T, N>::cmp_le(self.reg, rhs.reg))
    }

    /// Lane-wise `>`.
    #[inline(always)]
    pub fn cmp_gt(self, rhs: Self) -> Mask<T, N> {
        Mask::from_bits(KernelOf::<T, N>::cmp_gt(self.reg, rhs.reg))
    }

    /// Lane-wise `>=`.
    #[inline(always)]
    pub fn cmp_ge(self, rhs: Self) -> Mask<T, N> {
        Mask::from_bits(KernelOf::<T, N>::cmp_ge(self.reg, rhs.reg))
    }

    // =========================================================================
    // Named Operations
    // =========================================================================

    /// Branch-free blend: lane `i` is `if_true[i]` where `mask[i]` is set,
    /// else `if_false[i]`.
    #[inline(always)]
    pub fn select(mask: Mask<T, N>, if_true: Self, if_false: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::select(mask.bits(), if_true.reg, if_false.reg))
    }

    /// Lane minimum. Equal lanes come from `self`.
    #[inline(always)]
    pub fn min(self, rhs: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::min(self.reg, rhs.reg))
    }

    /// Lane maximum. Equal lanes come from `self`.
    #[inline(always)]
    pub fn max(self, rhs: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::max(self.reg, rhs.reg))
    }

    /// Wrapping absolute value (`MIN` stays `MIN`).
    #[inline(always)]
    pub fn abs(self) -> Self {
        Self::from_reg(KernelOf::<T, N>::abs(self.reg))
    }

    /// `self * y + z`
    #[inline(always)]
    pub fn mul_add(self, y: Self, z: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::mul_add(self.reg, y.reg, z.reg))
    }

    /// `self * y - z`
    #[inline(always)]
    pub fn mul_sub(self, y: Self, z: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::mul_sub(self.reg, y.reg, z.reg))
    }

    /// `-(self * y) + z`
    #[inline(always)]
    pub fn neg_mul_add(self, y: Self, z: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::neg_mul_add(self.reg, y.reg, z.reg))
    }

    /// `-(self * y) - z`
    #[inline(always)]
    pub fn neg_mul_sub(self, y: Self, z: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::neg_mul_sub(self.reg, y.reg, z.reg))
    }

    /// `self & !rhs`
    #[inline(always)]
    pub fn and_not(self, rhs: Self) -> Self {
        Self::from_reg(KernelOf::<T, N>::and_not(self.reg, rhs.reg))
    }

    /// Wrapping sum of all lanes.
    #[inline(always)]
    pub fn reduce_add(self) -> T {
        KernelOf::<T, N>::reduce_add(self.reg)
    }

    /// Lane `i` of the result is `rows[i].reduce_add()`.
    #[inline(always)]
    pub fn reduce_add_rows(rows: [Self; N]) -> Self {
        Self::from_reg(KernelOf::<T, N>::reduce_add_rows(rows.map(|row| row.reg)))
    }
}

// ============================================================================
// Operators
// ============================================================================

macro_rules! impl_binary_op {
    ($($op:ident::$method:ident, $assign:ident::$assign_method:ident => $kernel:ident;)*) => {$(
        impl<T: Lanes<N>, const N: usize> $op for Batch<T, N> {
            type Output = Self;
            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self::from_reg(KernelOf::<T, N>::$kernel(self.reg, rhs.reg))
            }
        }

        impl<T: Lanes<N>, const N: usize> $assign for Batch<T, N> {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = $op::$method(*self, rhs);
            }
        }
    )*};
}

impl_binary_op! {
    Add::add, AddAssign::add_assign => add;
    Sub::sub, SubAssign::sub_assign => sub;
    Mul::mul, MulAssign::mul_assign => mul;
    Div::div, DivAssign::div_assign => div;
    Rem::rem, RemAssign::rem_assign => rem;
    BitAnd::bitand, BitAndAssign::bitand_assign => bitand;
    BitOr::bitor, BitOrAssign::bitor_assign => bitor;
    BitXor::bitxor, BitXorAssign::bitxor_assign => bitxor;
    Shl::shl, ShlAssign::shl_assign => shl_lanes;
    Shr::shr, ShrAssign::shr_assign => shr_lanes;
}

impl<T: Lanes<N>, const N: usize> Shl<u32> for Batch<T, N> {
    type Output = Self;
    /// Amounts of `T::BITS` or more give zero lanes.
    #[inline(always)]
    fn shl(self, amount: u32) -> Self {
        Self::from_reg(KernelOf::<T, N>::shl(self.reg, amount))
    }
}

impl<T: Lanes<N>, const N: usize> Shr<u32> for Batch<T, N> {
    type Output = Self;
    /// Arithmetic shift; amounts of `T::BITS` or more give zero lanes.
    #[inline(always)]
    fn shr(self, amount: u32) -> Self {
        Self::from_reg(KernelOf::<T, N>::shr(self.reg, amount))
    }
}

impl<T: Lanes<N>, const N: usize> ShlAssign<u32> for Batch<T, N> {
    #[inline(always)]
    fn shl_assign(&mut self, amount: u32) {
        *self = *self << amount;
    }
}

impl<T: Lanes<N>, const N: usize> ShrAssign<u32> for Batch<T, N> {
    #[inline(always)]
    fn shr_assign(&mut self, amount: u32) {
        *self = *self >> amount;
    }
}

impl<T: Lanes<N>, const N: usize> Neg for Batch<T, N> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_reg(KernelOf::<T, N>::neg(self.reg))
    }
}

impl<T: Lanes<N>, const N: usize> Not for Batch<T, N> {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self::from_reg(KernelOf::<T, N>::not(self.reg))
    }
}

// ============================================================================
// Std Traits
// ============================================================================

impl<T: Lanes<N>, const N: usize> PartialEq for Batch<T, N> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp_eq(*other).all()
    }
}

impl<T: Lanes<N>, const N: usize> Eq for Batch<T, N> {}

impl<T: Lanes<N>, const N: usize> Default for Batch<T, N> {
    #[inline]
    fn default() -> Self {
        Self::splat(T::ZERO)
    }
}

impl<T: Lanes<N>, const N: usize> From<[T; N]> for Batch<T, N> {
    #[inline]
    fn from(lanes: [T; N]) -> Self {
        Self::from_array(lanes)
    }
}

impl<T: Lanes<N>, const N: usize> From<Batch<T, N>> for [T; N] {
    #[inline]
    fn from(batch: Batch<T, N>) -> Self {
        batch.to_array()
    }
}

impl<T: Lanes<N>, const N: usize> fmt::Debug for Batch<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Batch").field(&self.to_array()).finish()
    }
}
