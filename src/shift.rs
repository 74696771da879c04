//! Runtime shift amounts for immediate-only shift instructions.
//!
//! NEON `vshlq_n_s64`/`vshrq_n_s64` and SSE2 `_mm_slli_epi64`/`_mm_srli_epi64`
//! encode the shift count in the instruction, so Rust exposes them with a
//! const generic. [`dispatch_imm64!`] expands a runtime amount into a `match`
//! with one arm per legal immediate, each arm instantiating the instruction
//! for that constant:
//!
//! ```text
//! match amount {
//!     0 => value,
//!     1 => op::<1>(value),
//!     ...
//!     63 => op::<63>(value),
//!     _ => zero,
//! }
//! ```
//!
//! Amount 0 returns the input untouched and amounts of 64 or more return
//! `zero`, matching the out-of-range convention of the portable kernel.

/// Dispatch a runtime `u32` shift amount onto `$op::<IMM>` for a 64-bit lane
/// register.
///
/// `$op` must be a function generic over `const IMM: i32` taking and
/// returning the register type. It is only instantiated for `1..=63`.
#[allow(unused_macros)]
macro_rules! dispatch_imm64 {
    ($op:ident, $value:expr, $amount:expr, $zero:expr) => {
        $crate::shift::dispatch_imm64!(@arms $op, $value, $amount, $zero;
            1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16
            17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32
            33 34 35 36 37 38 39 40 41 42 43 44 45 46 47 48
            49 50 51 52 53 54 55 56 57 58 59 60 61 62 63)
    };
    (@arms $op:ident, $value:expr, $amount:expr, $zero:expr; $($imm:literal)*) => {{
        let value = $value;
        let amount: u32 = $amount;
        match amount {
            0 => value,
            $($imm => $op::<$imm>(value),)*
            _ => $zero,
        }
    }};
}

#[allow(unused_imports)]
pub(crate) use dispatch_imm64;

#[cfg(test)]
mod tests {
    fn tagged<const IMM: i32>(value: i64) -> i64 {
        value * 100 + IMM as i64
    }

    fn dispatch(amount: u32) -> i64 {
        dispatch_imm64!(tagged, 7, amount, -1)
    }

    #[test]
    fn every_immediate_has_an_arm() {
        assert_eq!(dispatch(0), 7);
        for amount in 1..64u32 {
            assert_eq!(dispatch(amount), 700 + amount as i64);
        }
    }

    #[test]
    fn out_of_range_takes_the_zero_arm() {
        assert_eq!(dispatch(64), -1);
        assert_eq!(dispatch(u32::MAX), -1);
    }
}
