//! # simd-batch
//!
//! Fixed-width SIMD batches whose kernels are chosen at compile time.
//!
//! ## Design Philosophy
//!
//! **The element type and lane count select the kernel.**
//!
//! - `Batch<i64, 2>`: one 128-bit register (NEON `int64x2_t`, SSE `__m128i`)
//! - `Batch<i64, 4>`, `Batch<i32, 4>`, `Batch<i32, 8>`: portable lane loops
//!
//! Every operator resolves statically through `<T as Lanes<N>>::Kernel`.
//! There is no runtime dispatch: the target features the crate is compiled
//! with decide which instructions are emitted, and [`capability::NATIVE`]
//! records that decision.
//!
//! ```
//! use simd_batch::Batch;
//!
//! let a = Batch::<i64, 2>::from_array([3, 4]);
//! let b = Batch::<i64, 2>::from_array([10, -1]);
//! assert_eq!((a + b).to_array(), [13, 3]);
//! assert!(a.cmp_lt(b).to_array()[0]);
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod shift;

pub mod backend;
pub mod batch;
pub mod capability;
pub mod convert;
pub mod element;
pub mod mask;

pub use backend::{Kernel, Lanes};
pub use batch::Batch;
pub use capability::{Capabilities, KernelReport, NATIVE};
pub use convert::{CastFrom, Convert};
pub use element::Element;
pub use mask::Mask;
