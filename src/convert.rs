//! Type-converting load/store.
//!
//! The conversion matrix is closed: a batch of `T` can be loaded from, or
//! stored to, memory holding any of `f32`, `f64`, `i8`, `u8`, `i32`, `i64`.
//! Each kernel implements [`Convert<S, T, N>`] once per source type `S`, and
//! that impl is the single place deciding between a native conversion
//! sequence and the portable lane loop ([`load_lanes`] / [`store_lanes`]).
//!
//! Lane casts follow Rust `as`: float to integer truncates toward zero and
//! saturates (NaN becomes 0), integer widening is exact, integer narrowing
//! keeps the low bits.

use crate::backend::Kernel;
use crate::element::Element;

/// Per-lane numeric cast used by the portable conversion path.
pub trait CastFrom<S>: Sized {
    /// Convert one lane.
    fn cast_from(src: S) -> Self;
}

macro_rules! impl_cast_from {
    ($($dst:ty),*) => {
        $( impl_cast_from!(@to $dst; f32 f64 i8 u8 i32 i64); )*
    };
    (@to $dst:ty; $($src:ty)*) => {
        $(
            impl CastFrom<$src> for $dst {
                #[inline(always)]
                fn cast_from(src: $src) -> Self {
                    src as $dst
                }
            }
        )*
    };
}

impl_cast_from!(f32, f64, i8, u8, i32, i64);

/// Load/store of `N` lanes of `T` from/to memory holding `S`.
///
/// Aligned variants require `dst`/`src` to be aligned to `N * size_of::<T>()`
/// bytes. Every variant reads or writes exactly `N` elements of `S`.
pub trait Convert<S, T: Element, const N: usize>: Kernel<T, N> {
    /// Load `N` elements of `S` and convert them to lanes of `T`.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reading `N` elements of `S` and aligned to
    /// `N * size_of::<T>()` bytes.
    unsafe fn load_aligned(src: *const S) -> Self::Reg;

    /// Load `N` elements of `S` from any address.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reading `N` elements of `S`.
    unsafe fn load_unaligned(src: *const S) -> Self::Reg;

    /// Convert lanes to `S` and store `N` elements.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writing `N` elements of `S` and aligned to
    /// `N * size_of::<T>()` bytes.
    unsafe fn store_aligned(reg: Self::Reg, dst: *mut S);

    /// Convert lanes to `S` and store `N` elements at any address.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writing `N` elements of `S`.
    unsafe fn store_unaligned(reg: Self::Reg, dst: *mut S);
}

/// Portable load: read `N` elements of `S` and cast each one.
///
/// # Safety
///
/// `src` must be valid for reading `N` elements of `S`.
#[inline(always)]
pub unsafe fn load_lanes<S: Copy, T: CastFrom<S>, const N: usize>(src: *const S) -> [T; N] {
    // SAFETY: caller guarantees N readable elements; read_unaligned has no
    // alignment requirement.
    core::array::from_fn(|i| T::cast_from(unsafe { src.add(i).read_unaligned() }))
}

/// Portable store: cast each lane and write `N` elements of `S`.
///
/// # Safety
///
/// `dst` must be valid for writing `N` elements of `S`.
#[inline(always)]
pub unsafe fn store_lanes<S: CastFrom<T>, T: Copy, const N: usize>(lanes: [T; N], dst: *mut S) {
    for (i, lane) in lanes.into_iter().enumerate() {
        // SAFETY: caller guarantees N writable elements.
        unsafe { dst.add(i).write_unaligned(S::cast_from(lane)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_to_int_truncates_toward_zero() {
        assert_eq!(i64::cast_from(2.9f64), 2);
        assert_eq!(i64::cast_from(-2.9f64), -2);
        assert_eq!(i64::cast_from(-0.5f32), 0);
    }

    #[test]
    fn float_to_int_saturates_and_maps_nan_to_zero() {
        assert_eq!(i64::cast_from(f64::INFINITY), i64::MAX);
        assert_eq!(i64::cast_from(-1e300f64), i64::MIN);
        assert_eq!(i64::cast_from(f64::NAN), 0);
    }

    #[test]
    fn narrowing_keeps_low_bits() {
        assert_eq!(i8::cast_from(300i64), 44);
        assert_eq!(u8::cast_from(-1i64), 255);
        assert_eq!(i32::cast_from(0x1_0000_0005i64), 5);
    }

    #[test]
    fn lane_loops_touch_exactly_n_elements() {
        let src = [1u8, 2, 3, 0xAA];
        let lanes: [i64; 3] = unsafe { load_lanes(src.as_ptr()) };
        assert_eq!(lanes, [1, 2, 3]);

        let mut dst = [0x55i8; 4];
        unsafe { store_lanes([-1i64, 128, 7], dst.as_mut_ptr()) };
        assert_eq!(dst, [-1, -128, 7, 0x55]);
    }
}
