//! x86_64 kernel for `Batch<i64, 2>` (one `__m128i`).
//!
//! SSE2 is the x86_64 baseline and always available. Later extensions are
//! used only when the crate is compiled with them enabled
//! (`-C target-feature=+sse4.2,+avx2` or `-C target-cpu=native`):
//!
//! | Operation | SSE2 | With extension |
//! |---|---|---|
//! | `cmp_eq` | 32-bit compare + half swap | SSE4.1 `_mm_cmpeq_epi64` |
//! | `cmp_lt`/`cmp_gt`/... | portable lanes | SSE4.2 `_mm_cmpgt_epi64` |
//! | `select` | and/andnot/or | SSE4.1 `_mm_blendv_epi8` |
//! | widening loads | unpack chains | SSE4.1 `_mm_cvtep*_epi64` |
//! | `shl_lanes` | portable lanes | AVX2 `_mm_sllv_epi64` |
//!
//! There is no 64-bit multiply, divide or i64<->f64 conversion below
//! AVX-512, so those go through the portable kernel.

use super::{Kernel, Portable};
use crate::convert::{load_lanes, store_lanes, Convert};
use crate::shift::dispatch_imm64;
use core::arch::x86_64::*;

/// SSE kernel for two i64 lanes.
#[derive(Copy, Clone, Debug, Default)]
pub struct I64x2;

type Lanes2 = [i64; 2];

#[inline(always)]
fn via_portable(a: __m128i, b: __m128i, op: fn(Lanes2, Lanes2) -> Lanes2) -> __m128i {
    I64x2::from_array(op(I64x2::to_array(a), I64x2::to_array(b)))
}

// ============================================================================
// Shift Immediates
// ============================================================================

#[inline(always)]
fn sll<const IMM: i32>(a: __m128i) -> __m128i {
    unsafe { _mm_slli_epi64::<IMM>(a) }
}

/// Arithmetic right shift built from the logical one:
/// `((a ^ sign) >>> n) ^ sign`.
#[inline(always)]
fn sra<const IMM: i32>(a: __m128i) -> __m128i {
    unsafe {
        let sign = sign_mask(a);
        _mm_xor_si128(_mm_srli_epi64::<IMM>(_mm_xor_si128(a, sign)), sign)
    }
}

/// All-ones in each 64-bit lane whose value is negative.
#[inline(always)]
fn sign_mask(a: __m128i) -> __m128i {
    // Copy each lane's high dword over both halves, then smear its sign bit.
    unsafe { _mm_srai_epi32::<31>(_mm_shuffle_epi32::<0xF5>(a)) }
}

// ============================================================================
// Feature-Gated Primitives
// ============================================================================

#[cfg(target_feature = "sse4.1")]
#[inline(always)]
fn eq_epi64(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmpeq_epi64(a, b) }
}

#[cfg(not(target_feature = "sse4.1"))]
#[inline(always)]
fn eq_epi64(a: __m128i, b: __m128i) -> __m128i {
    // A 64-bit lane is equal when both of its dwords are.
    unsafe {
        let halves = _mm_cmpeq_epi32(a, b);
        _mm_and_si128(halves, _mm_shuffle_epi32::<0xB1>(halves))
    }
}

#[cfg(target_feature = "sse4.2")]
#[inline(always)]
fn gt_epi64(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmpgt_epi64(a, b) }
}

#[cfg(not(target_feature = "sse4.2"))]
#[inline(always)]
fn gt_epi64(a: __m128i, b: __m128i) -> __m128i {
    let (x, y) = (I64x2::to_array(a), I64x2::to_array(b));
    I64x2::mask_from_array([x[0] > y[0], x[1] > y[1]])
}

#[cfg(target_feature = "sse4.1")]
#[inline(always)]
fn blend(mask: __m128i, if_true: __m128i, if_false: __m128i) -> __m128i {
    unsafe { _mm_blendv_epi8(if_false, if_true, mask) }
}

#[cfg(not(target_feature = "sse4.1"))]
#[inline(always)]
fn blend(mask: __m128i, if_true: __m128i, if_false: __m128i) -> __m128i {
    unsafe { _mm_or_si128(_mm_and_si128(mask, if_true), _mm_andnot_si128(mask, if_false)) }
}

#[cfg(target_feature = "avx2")]
#[inline(always)]
fn sllv(a: __m128i, amounts: __m128i) -> __m128i {
    // Counts are read as unsigned, so negative and >= 64 both produce zero.
    unsafe { _mm_sllv_epi64(a, amounts) }
}

#[cfg(not(target_feature = "avx2"))]
#[inline(always)]
fn sllv(a: __m128i, amounts: __m128i) -> __m128i {
    via_portable(a, amounts, <Portable as Kernel<i64, 2>>::shl_lanes)
}

/// Sign-extend the low two dwords to qwords.
#[cfg(target_feature = "sse4.1")]
#[inline(always)]
fn widen_i32(v: __m128i) -> __m128i {
    unsafe { _mm_cvtepi32_epi64(v) }
}

/// Sign-extend the low two dwords to qwords.
#[cfg(not(target_feature = "sse4.1"))]
#[inline(always)]
fn widen_i32(v: __m128i) -> __m128i {
    unsafe { _mm_unpacklo_epi32(v, _mm_srai_epi32::<31>(v)) }
}

/// Sign-extend the low two bytes to qwords.
#[cfg(target_feature = "sse4.1")]
#[inline(always)]
fn widen_i8(v: __m128i) -> __m128i {
    unsafe { _mm_cvtepi8_epi64(v) }
}

/// Sign-extend the low two bytes to qwords: i8 -> i16 -> i32 -> i64.
#[cfg(not(target_feature = "sse4.1"))]
#[inline(always)]
fn widen_i8(v: __m128i) -> __m128i {
    unsafe {
        let w16 = _mm_srai_epi16::<8>(_mm_unpacklo_epi8(v, v));
        let w32 = _mm_srai_epi32::<16>(_mm_unpacklo_epi16(w16, w16));
        widen_i32(w32)
    }
}

/// Zero-extend the low two bytes to qwords.
#[cfg(target_feature = "sse4.1")]
#[inline(always)]
fn widen_u8(v: __m128i) -> __m128i {
    unsafe { _mm_cvtepu8_epi64(v) }
}

/// Zero-extend the low two bytes to qwords: u8 -> u16 -> u32 -> u64.
#[cfg(not(target_feature = "sse4.1"))]
#[inline(always)]
fn widen_u8(v: __m128i) -> __m128i {
    unsafe {
        let zero = _mm_setzero_si128();
        _mm_unpacklo_epi32(_mm_unpacklo_epi16(_mm_unpacklo_epi8(v, zero), zero), zero)
    }
}

// ============================================================================
// Kernel Implementation
// ============================================================================

impl Kernel<i64, 2> for I64x2 {
    type Reg = __m128i;
    type Mask = __m128i;
    const NAME: &'static str = "x86_64-sse";

    #[inline(always)]
    fn splat(value: i64) -> __m128i {
        unsafe { _mm_set1_epi64x(value) }
    }

    #[inline(always)]
    fn from_array(lanes: Lanes2) -> __m128i {
        // _mm_set_epi64x args are in reverse order: e1, e0
        unsafe { _mm_set_epi64x(lanes[1], lanes[0]) }
    }

    #[inline(always)]
    fn to_array(reg: __m128i) -> Lanes2 {
        let mut out = [0i64; 2];
        unsafe { _mm_storeu_si128(out.as_mut_ptr().cast(), reg) };
        out
    }

    #[inline(always)]
    fn extract(reg: __m128i, index: usize) -> i64 {
        match index {
            0 => unsafe { _mm_cvtsi128_si64(reg) },
            1 => unsafe { _mm_cvtsi128_si64(_mm_unpackhi_epi64(reg, reg)) },
            _ => Self::to_array(reg)[index],
        }
    }

    #[inline(always)]
    fn neg(a: __m128i) -> __m128i {
        // No packed negate: 0 - a.
        unsafe { _mm_sub_epi64(_mm_setzero_si128(), a) }
    }

    #[inline(always)]
    fn add(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_add_epi64(a, b) }
    }

    #[inline(always)]
    fn sub(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_sub_epi64(a, b) }
    }

    #[inline(always)]
    fn mul(a: __m128i, b: __m128i) -> __m128i {
        via_portable(a, b, <Portable as Kernel<i64, 2>>::mul)
    }

    #[inline(always)]
    fn div(a: __m128i, b: __m128i) -> __m128i {
        via_portable(a, b, <Portable as Kernel<i64, 2>>::div)
    }

    #[inline(always)]
    fn rem(a: __m128i, b: __m128i) -> __m128i {
        via_portable(a, b, <Portable as Kernel<i64, 2>>::rem)
    }

    #[inline(always)]
    fn reduce_add(a: __m128i) -> i64 {
        unsafe { _mm_cvtsi128_si64(_mm_add_epi64(a, _mm_unpackhi_epi64(a, a))) }
    }

    #[inline(always)]
    fn reduce_add_rows(rows: [__m128i; 2]) -> __m128i {
        unsafe {
            let lo = _mm_unpacklo_epi64(rows[0], rows[1]);
            let hi = _mm_unpackhi_epi64(rows[0], rows[1]);
            _mm_add_epi64(lo, hi)
        }
    }

    #[inline(always)]
    fn cmp_eq(a: __m128i, b: __m128i) -> __m128i {
        eq_epi64(a, b)
    }

    #[inline(always)]
    fn cmp_lt(a: __m128i, b: __m128i) -> __m128i {
        gt_epi64(b, a)
    }

    #[inline(always)]
    fn cmp_le(a: __m128i, b: __m128i) -> __m128i {
        Self::mask_not(gt_epi64(a, b))
    }

    #[inline(always)]
    fn cmp_gt(a: __m128i, b: __m128i) -> __m128i {
        gt_epi64(a, b)
    }

    #[inline(always)]
    fn cmp_ge(a: __m128i, b: __m128i) -> __m128i {
        Self::mask_not(gt_epi64(b, a))
    }

    #[inline(always)]
    fn bitand(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_and_si128(a, b) }
    }

    #[inline(always)]
    fn bitor(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_or_si128(a, b) }
    }

    #[inline(always)]
    fn bitxor(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(a, b) }
    }

    #[inline(always)]
    fn not(a: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(a, _mm_set1_epi32(-1)) }
    }

    #[inline(always)]
    fn and_not(a: __m128i, b: __m128i) -> __m128i {
        // andnot complements its first operand.
        unsafe { _mm_andnot_si128(b, a) }
    }

    #[inline(always)]
    fn shl(a: __m128i, amount: u32) -> __m128i {
        dispatch_imm64!(sll, a, amount, Self::splat(0))
    }

    #[inline(always)]
    fn shr(a: __m128i, amount: u32) -> __m128i {
        dispatch_imm64!(sra, a, amount, Self::splat(0))
    }

    #[inline(always)]
    fn shl_lanes(a: __m128i, amounts: __m128i) -> __m128i {
        sllv(a, amounts)
    }

    #[inline(always)]
    fn shr_lanes(a: __m128i, amounts: __m128i) -> __m128i {
        via_portable(a, amounts, <Portable as Kernel<i64, 2>>::shr_lanes)
    }

    #[inline(always)]
    fn select(mask: __m128i, if_true: __m128i, if_false: __m128i) -> __m128i {
        blend(mask, if_true, if_false)
    }

    #[inline(always)]
    fn mask_from_array(lanes: [bool; 2]) -> __m128i {
        unsafe { _mm_set_epi64x(-(lanes[1] as i64), -(lanes[0] as i64)) }
    }

    #[inline(always)]
    fn mask_to_array(mask: __m128i) -> [bool; 2] {
        let bits = unsafe { _mm_movemask_pd(_mm_castsi128_pd(mask)) };
        [bits & 1 != 0, bits & 2 != 0]
    }

    #[inline(always)]
    fn mask_and(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_and_si128(a, b) }
    }

    #[inline(always)]
    fn mask_or(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_or_si128(a, b) }
    }

    #[inline(always)]
    fn mask_xor(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(a, b) }
    }

    #[inline(always)]
    fn mask_not(a: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(a, _mm_set1_epi32(-1)) }
    }

    #[inline(always)]
    fn mask_any(mask: __m128i) -> bool {
        unsafe { _mm_movemask_pd(_mm_castsi128_pd(mask)) != 0 }
    }

    #[inline(always)]
    fn mask_all(mask: __m128i) -> bool {
        unsafe { _mm_movemask_pd(_mm_castsi128_pd(mask)) == 0b11 }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl Convert<i64, i64, 2> for I64x2 {
    #[inline(always)]
    unsafe fn load_aligned(src: *const i64) -> __m128i {
        // SAFETY: caller guarantees 16 readable bytes aligned to 16.
        unsafe { _mm_load_si128(src.cast()) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(src: *const i64) -> __m128i {
        // SAFETY: caller guarantees 16 readable bytes.
        unsafe { _mm_loadu_si128(src.cast()) }
    }

    #[inline(always)]
    unsafe fn store_aligned(reg: __m128i, dst: *mut i64) {
        // SAFETY: caller guarantees 16 writable bytes aligned to 16.
        unsafe { _mm_store_si128(dst.cast(), reg) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: __m128i, dst: *mut i64) {
        // SAFETY: caller guarantees 16 writable bytes.
        unsafe { _mm_storeu_si128(dst.cast(), reg) }
    }
}

impl Convert<i32, i64, 2> for I64x2 {
    #[inline(always)]
    unsafe fn load_aligned(src: *const i32) -> __m128i {
        // SAFETY: forwarded caller contract.
        unsafe { Self::load_unaligned(src) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(src: *const i32) -> __m128i {
        // SAFETY: movq reads exactly 8 bytes with no alignment requirement.
        widen_i32(unsafe { _mm_loadl_epi64(src.cast()) })
    }

    #[inline(always)]
    unsafe fn store_aligned(reg: __m128i, dst: *mut i32) {
        // SAFETY: forwarded caller contract.
        unsafe { Self::store_unaligned(reg, dst) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: __m128i, dst: *mut i32) {
        // Gather the low dword of each lane, then write 8 bytes.
        // SAFETY: caller guarantees 8 writable bytes; movq is unaligned.
        unsafe { _mm_storel_epi64(dst.cast(), _mm_shuffle_epi32::<0x88>(reg)) }
    }
}

macro_rules! impl_byte_convert {
    ($($src:ty => $pair:ty, $widen:ident;)*) => {$(
        impl Convert<$src, i64, 2> for I64x2 {
            #[inline(always)]
            unsafe fn load_aligned(src: *const $src) -> __m128i {
                // SAFETY: forwarded caller contract.
                unsafe { Self::load_unaligned(src) }
            }

            #[inline(always)]
            unsafe fn load_unaligned(src: *const $src) -> __m128i {
                // Read exactly the two bytes we own; the widening step only
                // looks at the low bytes of the register.
                // SAFETY: caller guarantees 2 readable bytes.
                let pair = unsafe { src.cast::<$pair>().read_unaligned() };
                $widen(unsafe { _mm_cvtsi32_si128(pair as i32) })
            }

            #[inline(always)]
            unsafe fn store_aligned(reg: __m128i, dst: *mut $src) {
                // SAFETY: forwarded caller contract.
                unsafe { Self::store_unaligned(reg, dst) }
            }

            #[inline(always)]
            unsafe fn store_unaligned(reg: __m128i, dst: *mut $src) {
                // SAFETY: forwarded caller contract.
                unsafe { store_lanes(Self::to_array(reg), dst) }
            }
        }
    )*};
}

impl_byte_convert! {
    i8 => i16, widen_i8;
    u8 => u16, widen_u8;
}

macro_rules! impl_float_convert {
    ($($src:ty),*) => {$(
        impl Convert<$src, i64, 2> for I64x2 {
            #[inline(always)]
            unsafe fn load_aligned(src: *const $src) -> __m128i {
                // SAFETY: forwarded caller contract.
                unsafe { Self::load_unaligned(src) }
            }

            #[inline(always)]
            unsafe fn load_unaligned(src: *const $src) -> __m128i {
                // SAFETY: forwarded caller contract.
                Self::from_array(unsafe { load_lanes(src) })
            }

            #[inline(always)]
            unsafe fn store_aligned(reg: __m128i, dst: *mut $src) {
                // SAFETY: forwarded caller contract.
                unsafe { Self::store_unaligned(reg, dst) }
            }

            #[inline(always)]
            unsafe fn store_unaligned(reg: __m128i, dst: *mut $src) {
                // SAFETY: forwarded caller contract.
                unsafe { store_lanes(Self::to_array(reg), dst) }
            }
        }
    )*};
}

impl_float_convert!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(lanes: Lanes2) -> __m128i {
        I64x2::from_array(lanes)
    }

    #[test]
    fn sign_mask_tracks_the_high_dword() {
        let m = sign_mask(reg([-1, 1 << 40]));
        assert_eq!(I64x2::to_array(m), [-1, 0]);
        let m = sign_mask(reg([i64::MIN, 0xFFFF_FFFF]));
        assert_eq!(I64x2::to_array(m), [-1, 0]);
    }

    #[test]
    fn eq_needs_both_dwords() {
        let a = reg([0x1_0000_0000, 7]);
        let b = reg([0x2_0000_0000, 7]);
        assert_eq!(I64x2::mask_to_array(eq_epi64(a, b)), [false, true]);
    }

    #[test]
    fn arithmetic_shift_from_logical() {
        let a = reg([-1024, 1024]);
        assert_eq!(I64x2::to_array(sra::<3>(a)), [-128, 128]);
        assert_eq!(I64x2::to_array(sra::<63>(a)), [-1, 0]);
    }

    #[test]
    fn widening_steps_extend_sign() {
        assert_eq!(I64x2::to_array(widen_i32(reg([(-5i64 as u32 as i64) | (9 << 32), 0]))), [-5, 9]);
        let bytes = unsafe { _mm_cvtsi32_si128(0x7F80) };
        assert_eq!(I64x2::to_array(widen_i8(bytes)), [-128, 127]);
        assert_eq!(I64x2::to_array(widen_u8(bytes)), [128, 127]);
    }

    #[test]
    fn byte_loads_read_two_bytes_only() {
        let buf = [0xFEu8, 0x02];
        let v = unsafe { <I64x2 as Convert<u8, i64, 2>>::load_unaligned(buf.as_ptr()) };
        assert_eq!(I64x2::to_array(v), [254, 2]);
        let signed = [-2i8, 2];
        let v = unsafe { <I64x2 as Convert<i8, i64, 2>>::load_unaligned(signed.as_ptr()) };
        assert_eq!(I64x2::to_array(v), [-2, 2]);
    }
}
