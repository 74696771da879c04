//! Lane element types.

use core::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// A scalar type that can occupy a batch lane.
///
/// Sealed: kernels rely on two's-complement integer semantics for masks
/// (all-bits-set is `-1`) and for wrapping arithmetic.
pub trait Element:
    Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static + sealed::Sealed
{
    /// Bit width of one lane.
    const BITS: u32;
    /// Additive identity.
    const ZERO: Self;
    /// All bits set; the "true" lane of a mask.
    const ALL_ONES: Self;
}

impl Element for i32 {
    const BITS: u32 = i32::BITS;
    const ZERO: Self = 0;
    const ALL_ONES: Self = -1;
}

impl Element for i64 {
    const BITS: u32 = i64::BITS;
    const ZERO: Self = 0;
    const ALL_ONES: Self = -1;
}
