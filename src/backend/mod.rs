//! Kernel trait and per-architecture implementations.
//!
//! A kernel is a zero-sized type implementing [`Kernel<T, N>`]: a stateless
//! table of functions over one native register type. Batches never hold a
//! kernel value; they name it through [`Lanes::Kernel`] and call its
//! associated functions, so every operator resolves at compile time.
//!
//! # Selection
//!
//! | (T, N) | aarch64 + neon | x86_64 | other |
//! |---|---|---|---|
//! | (i64, 2) | [`arm::I64x2`] | [`x86::I64x2`] | [`scalar::Portable`] |
//! | (i64, 4), (i32, 4), (i32, 8) | [`scalar::Portable`] | [`scalar::Portable`] | [`scalar::Portable`] |
//!
//! The portable kernel is compiled on every target: native kernels delegate
//! to it for operations their instruction set lacks.

use crate::element::Element;
use core::fmt::Debug;

pub mod scalar;

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
pub mod arm;

#[cfg(target_arch = "x86_64")]
pub mod x86;

pub use scalar::Portable;

/// Kernel selected for `Batch<i64, 2>` on this target.
#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
pub type NativeI64x2 = arm::I64x2;

/// Kernel selected for `Batch<i64, 2>` on this target.
#[cfg(target_arch = "x86_64")]
pub type NativeI64x2 = x86::I64x2;

/// Kernel selected for `Batch<i64, 2>` on this target.
#[cfg(not(any(
    all(target_arch = "aarch64", target_feature = "neon"),
    target_arch = "x86_64"
)))]
pub type NativeI64x2 = scalar::Portable;

/// The kernel `(T, N)` resolves to.
pub(crate) type KernelOf<T, const N: usize> = <T as Lanes<N>>::Kernel;

/// Binds an element type and lane count to the kernel implementing them.
pub trait Lanes<const N: usize>: Element {
    /// The kernel compiled for `(Self, N)` on this target.
    type Kernel: Kernel<Self, N>;
}

impl Lanes<2> for i64 {
    type Kernel = NativeI64x2;
}

impl Lanes<4> for i64 {
    type Kernel = Portable;
}

impl Lanes<4> for i32 {
    type Kernel = Portable;
}

impl Lanes<8> for i32 {
    type Kernel = Portable;
}

/// Stateless operation table for `N` lanes of `T`.
///
/// Integer arithmetic wraps, like the underlying vector instructions.
/// Masks hold all-bits-set (true) or all-bits-clear (false) per lane.
pub trait Kernel<T: Element, const N: usize>:
    'static + Copy + Clone + Send + Sync + Debug + Default
{
    /// Native register holding `N` lanes.
    type Reg: Copy + Send + Sync;
    /// Native register holding `N` mask lanes.
    type Mask: Copy + Send + Sync;
    /// Short name used in capability reports.
    const NAME: &'static str;

    // =========================================================================
    // Construction / Lane Access
    // =========================================================================

    /// Broadcast `value` to every lane.
    fn splat(value: T) -> Self::Reg;

    /// Build a register from lanes in index order.
    fn from_array(lanes: [T; N]) -> Self::Reg;

    /// Spill a register to lanes in index order.
    fn to_array(reg: Self::Reg) -> [T; N];

    /// Read lane `index`. Panics if `index >= N`.
    #[inline(always)]
    fn extract(reg: Self::Reg, index: usize) -> T {
        Self::to_array(reg)[index]
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    /// Wrapping negation.
    fn neg(a: Self::Reg) -> Self::Reg;
    /// Wrapping addition.
    fn add(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// Wrapping subtraction.
    fn sub(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// Wrapping multiplication.
    fn mul(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// Truncating division. Panics on a zero divisor lane.
    fn div(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// Remainder with the sign of the dividend. Panics on a zero divisor lane.
    fn rem(a: Self::Reg, b: Self::Reg) -> Self::Reg;

    /// Wrapping absolute value.
    #[inline(always)]
    fn abs(a: Self::Reg) -> Self::Reg {
        Self::select(Self::cmp_lt(a, Self::splat(T::ZERO)), Self::neg(a), a)
    }

    /// Lane minimum; the left lane wins ties.
    #[inline(always)]
    fn min(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        Self::select(Self::cmp_lt(b, a), b, a)
    }

    /// Lane maximum; the left lane wins ties.
    #[inline(always)]
    fn max(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        Self::select(Self::cmp_gt(b, a), b, a)
    }

    /// `x * y + z`
    #[inline(always)]
    fn mul_add(x: Self::Reg, y: Self::Reg, z: Self::Reg) -> Self::Reg {
        Self::add(Self::mul(x, y), z)
    }

    /// `x * y - z`
    #[inline(always)]
    fn mul_sub(x: Self::Reg, y: Self::Reg, z: Self::Reg) -> Self::Reg {
        Self::sub(Self::mul(x, y), z)
    }

    /// `-(x * y) + z`
    #[inline(always)]
    fn neg_mul_add(x: Self::Reg, y: Self::Reg, z: Self::Reg) -> Self::Reg {
        Self::add(Self::neg(Self::mul(x, y)), z)
    }

    /// `-(x * y) - z`
    #[inline(always)]
    fn neg_mul_sub(x: Self::Reg, y: Self::Reg, z: Self::Reg) -> Self::Reg {
        Self::sub(Self::neg(Self::mul(x, y)), z)
    }

    /// Wrapping sum of all lanes.
    fn reduce_add(a: Self::Reg) -> T;

    /// Lane `i` of the result is the sum of `rows[i]`.
    #[inline(always)]
    fn reduce_add_rows(rows: [Self::Reg; N]) -> Self::Reg {
        Self::from_array(core::array::from_fn(|i| Self::reduce_add(rows[i])))
    }

    // =========================================================================
    // Comparisons (return native mask)
    // =========================================================================

    /// Lane equality.
    fn cmp_eq(a: Self::Reg, b: Self::Reg) -> Self::Mask;

    /// Lane inequality.
    #[inline(always)]
    fn cmp_ne(a: Self::Reg, b: Self::Reg) -> Self::Mask {
        Self::mask_not(Self::cmp_eq(a, b))
    }

    /// Signed less than.
    fn cmp_lt(a: Self::Reg, b: Self::Reg) -> Self::Mask;

    /// Signed less than or equal.
    fn cmp_le(a: Self::Reg, b: Self::Reg) -> Self::Mask;

    /// Signed greater than.
    #[inline(always)]
    fn cmp_gt(a: Self::Reg, b: Self::Reg) -> Self::Mask {
        Self::cmp_lt(b, a)
    }

    /// Signed greater than or equal.
    #[inline(always)]
    fn cmp_ge(a: Self::Reg, b: Self::Reg) -> Self::Mask {
        Self::cmp_le(b, a)
    }

    // =========================================================================
    // Bitwise
    // =========================================================================

    /// `a & b`
    fn bitand(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// `a | b`
    fn bitor(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// `a ^ b`
    fn bitxor(a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// `!a`
    fn not(a: Self::Reg) -> Self::Reg;

    /// `a & !b`
    #[inline(always)]
    fn and_not(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        Self::bitand(a, Self::not(b))
    }

    // =========================================================================
    // Shifts
    // =========================================================================

    /// Shift every lane left by `amount`; `amount >= T::BITS` gives zero.
    fn shl(a: Self::Reg, amount: u32) -> Self::Reg;

    /// Arithmetic shift right by `amount`; `amount >= T::BITS` gives zero.
    fn shr(a: Self::Reg, amount: u32) -> Self::Reg;

    /// Shift lane `i` left by lane `i` of `amounts`. Negative or too large
    /// amounts give a zero lane.
    fn shl_lanes(a: Self::Reg, amounts: Self::Reg) -> Self::Reg;

    /// Arithmetic shift of lane `i` right by lane `i` of `amounts`. Negative
    /// or too large amounts give a zero lane.
    fn shr_lanes(a: Self::Reg, amounts: Self::Reg) -> Self::Reg;

    // =========================================================================
    // Selection / Masks
    // =========================================================================

    /// Branch-free blend: `mask ? if_true : if_false` per lane.
    fn select(mask: Self::Mask, if_true: Self::Reg, if_false: Self::Reg) -> Self::Reg;

    /// Mask from booleans in lane order.
    fn mask_from_array(lanes: [bool; N]) -> Self::Mask;

    /// Mask lanes as booleans.
    fn mask_to_array(mask: Self::Mask) -> [bool; N];

    /// Mask with every lane set to `value`.
    #[inline(always)]
    fn mask_splat(value: bool) -> Self::Mask {
        Self::mask_from_array([value; N])
    }

    /// Lane-wise AND of two masks.
    fn mask_and(a: Self::Mask, b: Self::Mask) -> Self::Mask;
    /// Lane-wise OR of two masks.
    fn mask_or(a: Self::Mask, b: Self::Mask) -> Self::Mask;
    /// Lane-wise XOR of two masks.
    fn mask_xor(a: Self::Mask, b: Self::Mask) -> Self::Mask;
    /// Lane-wise NOT of a mask.
    fn mask_not(a: Self::Mask) -> Self::Mask;

    /// Any lane true?
    #[inline(always)]
    fn mask_any(mask: Self::Mask) -> bool {
        Self::mask_to_array(mask).iter().any(|&lane| lane)
    }

    /// All lanes true?
    #[inline(always)]
    fn mask_all(mask: Self::Mask) -> bool {
        Self::mask_to_array(mask).iter().all(|&lane| lane)
    }
}
