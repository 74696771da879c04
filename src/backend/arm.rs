//! AArch64 NEON kernel for `Batch<i64, 2>` (one `int64x2_t`).
//!
//! NEON has native 64-bit add/sub/neg/abs, compares, bitwise ops, per-lane
//! shifts, horizontal add and i64<->f64 conversion. It has no 64-bit
//! multiply or integer divide; those go through the portable kernel unless
//! the `fast-integer-division` feature opts into an f64 round-trip divide.

use super::{Kernel, Portable};
use crate::convert::Convert;
use crate::shift::dispatch_imm64;
use core::arch::aarch64::*;

/// NEON kernel for two i64 lanes.
#[derive(Copy, Clone, Debug, Default)]
pub struct I64x2;

type Lanes2 = [i64; 2];

#[inline(always)]
fn via_portable(a: int64x2_t, b: int64x2_t, op: fn(Lanes2, Lanes2) -> Lanes2) -> int64x2_t {
    I64x2::from_array(op(I64x2::to_array(a), I64x2::to_array(b)))
}

#[inline(always)]
fn shl_imm<const IMM: i32>(a: int64x2_t) -> int64x2_t {
    unsafe { vshlq_n_s64::<IMM>(a) }
}

#[inline(always)]
fn shr_imm<const IMM: i32>(a: int64x2_t) -> int64x2_t {
    unsafe { vshrq_n_s64::<IMM>(a) }
}

/// Lanes whose shift amount lies in `0..64`. Negative amounts compare as
/// huge unsigned values and fall outside.
#[inline(always)]
fn shift_in_range(amounts: int64x2_t) -> int64x2_t {
    unsafe {
        let in_range = vcltq_u64(vreinterpretq_u64_s64(amounts), vdupq_n_u64(64));
        vreinterpretq_s64_u64(in_range)
    }
}

impl Kernel<i64, 2> for I64x2 {
    type Reg = int64x2_t;
    type Mask = uint64x2_t;
    const NAME: &'static str = "neon";

    #[inline(always)]
    fn splat(value: i64) -> int64x2_t {
        unsafe { vdupq_n_s64(value) }
    }

    #[inline(always)]
    fn from_array(lanes: Lanes2) -> int64x2_t {
        unsafe { vld1q_s64(lanes.as_ptr()) }
    }

    #[inline(always)]
    fn to_array(reg: int64x2_t) -> Lanes2 {
        let mut out = [0i64; 2];
        unsafe { vst1q_s64(out.as_mut_ptr(), reg) };
        out
    }

    #[inline(always)]
    fn extract(reg: int64x2_t, index: usize) -> i64 {
        match index {
            0 => unsafe { vgetq_lane_s64::<0>(reg) },
            1 => unsafe { vgetq_lane_s64::<1>(reg) },
            _ => Self::to_array(reg)[index],
        }
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    #[inline(always)]
    fn neg(a: int64x2_t) -> int64x2_t {
        unsafe { vnegq_s64(a) }
    }

    #[inline(always)]
    fn add(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        unsafe { vaddq_s64(a, b) }
    }

    #[inline(always)]
    fn sub(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        unsafe { vsubq_s64(a, b) }
    }

    #[inline(always)]
    fn mul(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        via_portable(a, b, <Portable as Kernel<i64, 2>>::mul)
    }

    #[cfg(not(feature = "fast-integer-division"))]
    #[inline(always)]
    fn div(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        via_portable(a, b, <Portable as Kernel<i64, 2>>::div)
    }

    /// Divide through f64. Exact while both operands fit in 53 bits; a zero
    /// divisor saturates instead of panicking.
    #[cfg(feature = "fast-integer-division")]
    #[inline(always)]
    fn div(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        unsafe { vcvtq_s64_f64(vdivq_f64(vcvtq_f64_s64(a), vcvtq_f64_s64(b))) }
    }

    #[inline(always)]
    fn rem(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        via_portable(a, b, <Portable as Kernel<i64, 2>>::rem)
    }

    #[inline(always)]
    fn abs(a: int64x2_t) -> int64x2_t {
        unsafe { vabsq_s64(a) }
    }

    #[inline(always)]
    fn reduce_add(a: int64x2_t) -> i64 {
        unsafe { vaddvq_s64(a) }
    }

    #[inline(always)]
    fn reduce_add_rows(rows: [int64x2_t; 2]) -> int64x2_t {
        // Pairwise add: [r0[0] + r0[1], r1[0] + r1[1]]
        unsafe { vpaddq_s64(rows[0], rows[1]) }
    }

    // =========================================================================
    // Comparisons
    // =========================================================================

    #[inline(always)]
    fn cmp_eq(a: int64x2_t, b: int64x2_t) -> uint64x2_t {
        unsafe { vceqq_s64(a, b) }
    }

    #[inline(always)]
    fn cmp_lt(a: int64x2_t, b: int64x2_t) -> uint64x2_t {
        unsafe { vcltq_s64(a, b) }
    }

    #[inline(always)]
    fn cmp_le(a: int64x2_t, b: int64x2_t) -> uint64x2_t {
        unsafe { vcleq_s64(a, b) }
    }

    #[inline(always)]
    fn cmp_gt(a: int64x2_t, b: int64x2_t) -> uint64x2_t {
        unsafe { vcgtq_s64(a, b) }
    }

    #[inline(always)]
    fn cmp_ge(a: int64x2_t, b: int64x2_t) -> uint64x2_t {
        unsafe { vcgeq_s64(a, b) }
    }

    // =========================================================================
    // Bitwise
    // =========================================================================

    #[inline(always)]
    fn bitand(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        unsafe { vandq_s64(a, b) }
    }

    #[inline(always)]
    fn bitor(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        unsafe { vorrq_s64(a, b) }
    }

    #[inline(always)]
    fn bitxor(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        unsafe { veorq_s64(a, b) }
    }

    #[inline(always)]
    fn not(a: int64x2_t) -> int64x2_t {
        // No 64-bit vmvn; the bit pattern is the same at any width.
        unsafe { vreinterpretq_s64_s32(vmvnq_s32(vreinterpretq_s32_s64(a))) }
    }

    #[inline(always)]
    fn and_not(a: int64x2_t, b: int64x2_t) -> int64x2_t {
        unsafe { vbicq_s64(a, b) }
    }

    // =========================================================================
    // Shifts
    // =========================================================================

    #[inline(always)]
    fn shl(a: int64x2_t, amount: u32) -> int64x2_t {
        dispatch_imm64!(shl_imm, a, amount, Self::splat(0))
    }

    #[inline(always)]
    fn shr(a: int64x2_t, amount: u32) -> int64x2_t {
        dispatch_imm64!(shr_imm, a, amount, Self::splat(0))
    }

    #[inline(always)]
    fn shl_lanes(a: int64x2_t, amounts: int64x2_t) -> int64x2_t {
        unsafe { vandq_s64(vshlq_s64(a, amounts), shift_in_range(amounts)) }
    }

    #[inline(always)]
    fn shr_lanes(a: int64x2_t, amounts: int64x2_t) -> int64x2_t {
        // vshl with a negative count shifts right arithmetically.
        unsafe { vandq_s64(vshlq_s64(a, vnegq_s64(amounts)), shift_in_range(amounts)) }
    }

    // =========================================================================
    // Selection / Masks
    // =========================================================================

    #[inline(always)]
    fn select(mask: uint64x2_t, if_true: int64x2_t, if_false: int64x2_t) -> int64x2_t {
        unsafe { vbslq_s64(mask, if_true, if_false) }
    }

    #[inline(always)]
    fn mask_from_array(lanes: [bool; 2]) -> uint64x2_t {
        let bits = lanes.map(|lane| if lane { u64::MAX } else { 0 });
        unsafe { vld1q_u64(bits.as_ptr()) }
    }

    #[inline(always)]
    fn mask_to_array(mask: uint64x2_t) -> [bool; 2] {
        let mut bits = [0u64; 2];
        unsafe { vst1q_u64(bits.as_mut_ptr(), mask) };
        bits.map(|lane| lane != 0)
    }

    #[inline(always)]
    fn mask_and(a: uint64x2_t, b: uint64x2_t) -> uint64x2_t {
        unsafe { vandq_u64(a, b) }
    }

    #[inline(always)]
    fn mask_or(a: uint64x2_t, b: uint64x2_t) -> uint64x2_t {
        unsafe { vorrq_u64(a, b) }
    }

    #[inline(always)]
    fn mask_xor(a: uint64x2_t, b: uint64x2_t) -> uint64x2_t {
        unsafe { veorq_u64(a, b) }
    }

    #[inline(always)]
    fn mask_not(a: uint64x2_t) -> uint64x2_t {
        unsafe { vreinterpretq_u64_u32(vmvnq_u32(vreinterpretq_u32_u64(a))) }
    }

    #[inline(always)]
    fn mask_any(mask: uint64x2_t) -> bool {
        unsafe { vmaxvq_u32(vreinterpretq_u32_u64(mask)) != 0 }
    }

    #[inline(always)]
    fn mask_all(mask: uint64x2_t) -> bool {
        unsafe { vminvq_u32(vreinterpretq_u32_u64(mask)) != 0 }
    }
}

// ============================================================================
// Conversions
// ============================================================================
//
// vld1/vst1 accept any alignment, so the aligned entry points forward to
// the unaligned ones.

macro_rules! forward_aligned {
    ($src:ty) => {
        #[inline(always)]
        unsafe fn load_aligned(src: *const $src) -> int64x2_t {
            // SAFETY: forwarded caller contract.
            unsafe { Self::load_unaligned(src) }
        }

        #[inline(always)]
        unsafe fn store_aligned(reg: int64x2_t, dst: *mut $src) {
            // SAFETY: forwarded caller contract.
            unsafe { Self::store_unaligned(reg, dst) }
        }
    };
}

impl Convert<i64, i64, 2> for I64x2 {
    forward_aligned!(i64);

    #[inline(always)]
    unsafe fn load_unaligned(src: *const i64) -> int64x2_t {
        // SAFETY: caller guarantees 2 readable lanes.
        unsafe { vld1q_s64(src) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: int64x2_t, dst: *mut i64) {
        // SAFETY: caller guarantees 2 writable lanes.
        unsafe { vst1q_s64(dst, reg) }
    }
}

impl Convert<f64, i64, 2> for I64x2 {
    forward_aligned!(f64);

    #[inline(always)]
    unsafe fn load_unaligned(src: *const f64) -> int64x2_t {
        // fcvtzs truncates toward zero, saturates and maps NaN to 0.
        // SAFETY: caller guarantees 2 readable lanes.
        unsafe { vcvtq_s64_f64(vld1q_f64(src)) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: int64x2_t, dst: *mut f64) {
        // SAFETY: caller guarantees 2 writable lanes.
        unsafe { vst1q_f64(dst, vcvtq_f64_s64(reg)) }
    }
}

impl Convert<f32, i64, 2> for I64x2 {
    forward_aligned!(f32);

    #[inline(always)]
    unsafe fn load_unaligned(src: *const f32) -> int64x2_t {
        // f32 -> f64 is exact, so this truncates the stored value.
        // SAFETY: vld1_f32 reads exactly 2 lanes.
        unsafe { vcvtq_s64_f64(vcvt_f64_f32(vld1_f32(src))) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: int64x2_t, dst: *mut f32) {
        // SAFETY: vst1_f32 writes exactly 2 lanes.
        unsafe { vst1_f32(dst, vcvt_f32_f64(vcvtq_f64_s64(reg))) }
    }
}

impl Convert<i32, i64, 2> for I64x2 {
    forward_aligned!(i32);

    #[inline(always)]
    unsafe fn load_unaligned(src: *const i32) -> int64x2_t {
        // SAFETY: vld1_s32 reads exactly 2 lanes.
        unsafe { vmovl_s32(vld1_s32(src)) }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: int64x2_t, dst: *mut i32) {
        // SAFETY: vst1_s32 writes exactly 2 lanes.
        unsafe { vst1_s32(dst, vmovn_s64(reg)) }
    }
}

// Byte lanes go through a 16-bit scalar so exactly two bytes are touched;
// a d-register vld1_s8 would read eight.

impl Convert<i8, i64, 2> for I64x2 {
    forward_aligned!(i8);

    #[inline(always)]
    unsafe fn load_unaligned(src: *const i8) -> int64x2_t {
        unsafe {
            // SAFETY: caller guarantees 2 readable bytes.
            let pair = src.cast::<i16>().read_unaligned();
            let bytes = vreinterpret_s8_s16(vdup_n_s16(pair));
            let w16 = vget_low_s16(vmovl_s8(bytes));
            let w32 = vget_low_s32(vmovl_s16(w16));
            vmovl_s32(w32)
        }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: int64x2_t, dst: *mut i8) {
        unsafe {
            let n32 = vmovn_s64(reg);
            let n16 = vmovn_s32(vcombine_s32(n32, n32));
            let n8 = vmovn_s16(vcombine_s16(n16, n16));
            let pair = vget_lane_s16::<0>(vreinterpret_s16_s8(n8));
            // SAFETY: caller guarantees 2 writable bytes.
            dst.cast::<i16>().write_unaligned(pair);
        }
    }
}

impl Convert<u8, i64, 2> for I64x2 {
    forward_aligned!(u8);

    #[inline(always)]
    unsafe fn load_unaligned(src: *const u8) -> int64x2_t {
        unsafe {
            // SAFETY: caller guarantees 2 readable bytes.
            let pair = src.cast::<u16>().read_unaligned();
            let bytes = vreinterpret_u8_u16(vdup_n_u16(pair));
            let w16 = vget_low_u16(vmovl_u8(bytes));
            let w32 = vget_low_u32(vmovl_u16(w16));
            vreinterpretq_s64_u64(vmovl_u32(w32))
        }
    }

    #[inline(always)]
    unsafe fn store_unaligned(reg: int64x2_t, dst: *mut u8) {
        unsafe {
            let n32 = vmovn_u64(vreinterpretq_u64_s64(reg));
            let n16 = vmovn_u32(vcombine_u32(n32, n32));
            let n8 = vmovn_u16(vcombine_u16(n16, n16));
            let pair = vget_lane_u16::<0>(vreinterpret_u16_u8(n8));
            // SAFETY: caller guarantees 2 writable bytes.
            dst.cast::<u16>().write_unaligned(pair);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(lanes: Lanes2) -> int64x2_t {
        I64x2::from_array(lanes)
    }

    #[test]
    fn per_lane_shift_clears_out_of_range() {
        let a = reg([-8, 8]);
        assert_eq!(I64x2::to_array(I64x2::shl_lanes(a, reg([2, 64]))), [-32, 0]);
        assert_eq!(I64x2::to_array(I64x2::shr_lanes(a, reg([1, -1]))), [-4, 0]);
    }

    #[test]
    fn pairwise_row_sums() {
        let rows = [reg([1, 2]), reg([30, 40])];
        assert_eq!(I64x2::to_array(I64x2::reduce_add_rows(rows)), [3, 70]);
    }

    #[test]
    fn byte_round_trip_touches_two_bytes() {
        let mut buf = [0x5Au8; 4];
        unsafe { <I64x2 as Convert<u8, i64, 2>>::store_unaligned(reg([300, 7]), buf.as_mut_ptr()) };
        assert_eq!(buf, [44, 7, 0x5A, 0x5A]);
        let v = unsafe { <I64x2 as Convert<u8, i64, 2>>::load_unaligned(buf.as_ptr()) };
        assert_eq!(I64x2::to_array(v), [44, 7]);

        let signed = [-3i8, 127];
        let v = unsafe { <I64x2 as Convert<i8, i64, 2>>::load_unaligned(signed.as_ptr()) };
        assert_eq!(I64x2::to_array(v), [-3, 127]);
    }

    #[cfg(feature = "fast-integer-division")]
    #[test]
    fn float_division_truncates() {
        assert_eq!(I64x2::to_array(I64x2::div(reg([-7, 1 << 40]), reg([2, 3]))), [-3, (1 << 40) / 3]);
    }
}
