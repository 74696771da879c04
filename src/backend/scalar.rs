//! Portable kernel: plain lane loops over `[T; N]`.
//!
//! Compiled on every target. It is the kernel for every (T, N) without a
//! native implementation and the fallback native kernels delegate to for
//! instructions their ISA lacks (64-bit multiply, integer divide, ...).
//! Its results define the expected semantics of every other kernel.

use super::Kernel;
use crate::convert::{load_lanes, store_lanes, CastFrom, Convert};
use core::array;

/// Lane-loop kernel for any lane count.
#[derive(Copy, Clone, Debug, Default)]
pub struct Portable;

#[inline(always)]
fn zip<T: Copy, const N: usize>(a: [T; N], b: [T; N], f: impl Fn(T, T) -> T) -> [T; N] {
    array::from_fn(|i| f(a[i], b[i]))
}

// Integer arithmetic uses wrapping to match SIMD semantics
macro_rules! impl_portable {
    ($($t:ty),*) => {$(
        impl<const N: usize> Kernel<$t, N> for Portable {
            type Reg = [$t; N];
            type Mask = [$t; N];
            const NAME: &'static str = "portable";

            #[inline(always)]
            fn splat(value: $t) -> [$t; N] {
                [value; N]
            }

            #[inline(always)]
            fn from_array(lanes: [$t; N]) -> [$t; N] {
                lanes
            }

            #[inline(always)]
            fn to_array(reg: [$t; N]) -> [$t; N] {
                reg
            }

            #[inline(always)]
            fn neg(a: [$t; N]) -> [$t; N] {
                a.map(<$t>::wrapping_neg)
            }

            #[inline(always)]
            fn add(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, <$t>::wrapping_add)
            }

            #[inline(always)]
            fn sub(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, <$t>::wrapping_sub)
            }

            #[inline(always)]
            fn mul(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, <$t>::wrapping_mul)
            }

            #[inline(always)]
            fn div(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, <$t>::wrapping_div)
            }

            #[inline(always)]
            fn rem(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, <$t>::wrapping_rem)
            }

            #[inline(always)]
            fn abs(a: [$t; N]) -> [$t; N] {
                a.map(<$t>::wrapping_abs)
            }

            #[inline(always)]
            fn min(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| if y < x { y } else { x })
            }

            #[inline(always)]
            fn max(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| if y > x { y } else { x })
            }

            #[inline(always)]
            fn reduce_add(a: [$t; N]) -> $t {
                a.into_iter().fold(0, <$t>::wrapping_add)
            }

            #[inline(always)]
            fn cmp_eq(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| -((x == y) as $t))
            }

            #[inline(always)]
            fn cmp_lt(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| -((x < y) as $t))
            }

            #[inline(always)]
            fn cmp_le(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| -((x <= y) as $t))
            }

            #[inline(always)]
            fn bitand(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| x & y)
            }

            #[inline(always)]
            fn bitor(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| x | y)
            }

            #[inline(always)]
            fn bitxor(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| x ^ y)
            }

            #[inline(always)]
            fn not(a: [$t; N]) -> [$t; N] {
                a.map(|x| !x)
            }

            #[inline(always)]
            fn shl(a: [$t; N], amount: u32) -> [$t; N] {
                if amount >= <$t>::BITS {
                    return [0; N];
                }
                a.map(|x| x << amount)
            }

            #[inline(always)]
            fn shr(a: [$t; N], amount: u32) -> [$t; N] {
                if amount >= <$t>::BITS {
                    return [0; N];
                }
                a.map(|x| x >> amount)
            }

            #[inline(always)]
            fn shl_lanes(a: [$t; N], amounts: [$t; N]) -> [$t; N] {
                zip(a, amounts, |x, n| {
                    if (0..<$t>::BITS as $t).contains(&n) { x << n } else { 0 }
                })
            }

            #[inline(always)]
            fn shr_lanes(a: [$t; N], amounts: [$t; N]) -> [$t; N] {
                zip(a, amounts, |x, n| {
                    if (0..<$t>::BITS as $t).contains(&n) { x >> n } else { 0 }
                })
            }

            #[inline(always)]
            fn select(mask: [$t; N], if_true: [$t; N], if_false: [$t; N]) -> [$t; N] {
                array::from_fn(|i| (if_true[i] & mask[i]) | (if_false[i] & !mask[i]))
            }

            #[inline(always)]
            fn mask_from_array(lanes: [bool; N]) -> [$t; N] {
                lanes.map(|lane| -(lane as $t))
            }

            #[inline(always)]
            fn mask_to_array(mask: [$t; N]) -> [bool; N] {
                mask.map(|lane| lane != 0)
            }

            #[inline(always)]
            fn mask_and(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| x & y)
            }

            #[inline(always)]
            fn mask_or(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| x | y)
            }

            #[inline(always)]
            fn mask_xor(a: [$t; N], b: [$t; N]) -> [$t; N] {
                zip(a, b, |x, y| x ^ y)
            }

            #[inline(always)]
            fn mask_not(a: [$t; N]) -> [$t; N] {
                a.map(|x| !x)
            }
        }

        impl<S, const N: usize> Convert<S, $t, N> for Portable
        where
            S: Copy + CastFrom<$t>,
            $t: CastFrom<S>,
        {
            #[inline(always)]
            unsafe fn load_aligned(src: *const S) -> [$t; N] {
                // SAFETY: forwarded caller contract.
                unsafe { load_lanes(src) }
            }

            #[inline(always)]
            unsafe fn load_unaligned(src: *const S) -> [$t; N] {
                // SAFETY: forwarded caller contract.
                unsafe { load_lanes(src) }
            }

            #[inline(always)]
            unsafe fn store_aligned(reg: [$t; N], dst: *mut S) {
                // SAFETY: forwarded caller contract.
                unsafe { store_lanes(reg, dst) }
            }

            #[inline(always)]
            unsafe fn store_unaligned(reg: [$t; N], dst: *mut S) {
                // SAFETY: forwarded caller contract.
                unsafe { store_lanes(reg, dst) }
            }
        }
    )*};
}

impl_portable!(i32, i64);

#[cfg(test)]
mod tests {
    use super::*;

    type P2 = Portable;

    fn k2(a: [i64; 2]) -> [i64; 2] {
        <P2 as Kernel<i64, 2>>::from_array(a)
    }

    #[test]
    fn arithmetic_wraps() {
        let max = k2([i64::MAX, i64::MIN]);
        let one = <P2 as Kernel<i64, 2>>::splat(1);
        assert_eq!(<P2 as Kernel<i64, 2>>::add(max, one), [i64::MIN, i64::MIN + 1]);
        assert_eq!(<P2 as Kernel<i64, 2>>::neg(max), [-i64::MAX, i64::MIN]);
        assert_eq!(<P2 as Kernel<i64, 2>>::abs(max), [i64::MAX, i64::MIN]);
    }

    #[test]
    fn min_over_minus_one_wraps_instead_of_panicking() {
        let q = <P2 as Kernel<i64, 2>>::div(k2([i64::MIN, 9]), k2([-1, 2]));
        assert_eq!(q, [i64::MIN, 4]);
        let r = <P2 as Kernel<i64, 2>>::rem(k2([i64::MIN, -9]), k2([-1, 2]));
        assert_eq!(r, [0, -1]);
    }

    #[test]
    #[should_panic]
    fn division_by_zero_lane_panics() {
        let _ = <P2 as Kernel<i64, 2>>::div(k2([1, 1]), k2([1, 0]));
    }

    #[test]
    fn masks_are_all_bits() {
        let m = <P2 as Kernel<i64, 2>>::cmp_lt(k2([1, 5]), k2([2, 5]));
        assert_eq!(m, [-1, 0]);
        assert_eq!(<P2 as Kernel<i64, 2>>::mask_to_array(m), [true, false]);
        assert_eq!(<P2 as Kernel<i64, 2>>::cmp_ne(k2([1, 5]), k2([2, 5])), [-1, 0]);
    }

    #[test]
    fn shifts_clear_out_of_range_lanes() {
        let a = k2([-8, 3]);
        assert_eq!(<P2 as Kernel<i64, 2>>::shr(a, 1), [-4, 1]);
        assert_eq!(<P2 as Kernel<i64, 2>>::shl(a, 64), [0, 0]);
        assert_eq!(<P2 as Kernel<i64, 2>>::shr(a, 64), [0, 0]);
        assert_eq!(<P2 as Kernel<i64, 2>>::shl_lanes(a, k2([1, -1])), [-16, 0]);
        assert_eq!(<P2 as Kernel<i64, 2>>::shr_lanes(a, k2([64, 1])), [0, 1]);
    }

    #[test]
    fn any_lane_count() {
        let a: [i32; 8] = <Portable as Kernel<i32, 8>>::from_array([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(<Portable as Kernel<i32, 8>>::reduce_add(a), 36);
        let rows = [[1i64, 2, 3, 4], [5, 5, 5, 5], [0; 4], [-1, 1, -1, 1]];
        assert_eq!(<Portable as Kernel<i64, 4>>::reduce_add_rows(rows), [10, 20, 0, 0]);
    }
}
