//! Compile-time capability flags and kernel reports.
//!
//! [`NATIVE`] is computed from `cfg!` at build time; [`KernelReport`] names
//! the kernel each `Batch<T, N>` instantiation resolved to.

use crate::backend::{Kernel, KernelOf, Lanes};
use crate::batch::Batch;
use bitflags::bitflags;
use core::fmt;
use log::{debug, info};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Native instruction families the crate was compiled with.
    ///
    /// Every flag comes from `cfg!(target_feature = ...)` or a cargo feature;
    /// nothing is probed at run time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Capabilities: u32 {
        /// AArch64 Advanced SIMD.
        const NEON = 1 << 0;
        /// Vector i64 <-> f64 conversion (AArch64 `scvtf`/`fcvtzs`).
        const CVT_F64_I64 = 1 << 1;
        /// x86_64 baseline vectors.
        const SSE2 = 1 << 2;
        /// `pcmpeqq`, `pblendvb`, `pmovsx`/`pmovzx` widening.
        const SSE4_1 = 1 << 3;
        /// `pcmpgtq` signed 64-bit compare.
        const SSE4_2 = 1 << 4;
        /// Per-lane variable shifts (`vpsllvq`).
        const AVX2 = 1 << 5;
        /// Integer division through f64 (cargo feature `fast-integer-division`).
        const FAST_INT_DIV = 1 << 6;
    }
}

const fn compiled() -> Capabilities {
    let mut caps = Capabilities::empty();
    if cfg!(all(target_arch = "aarch64", target_feature = "neon")) {
        caps = caps.union(Capabilities::NEON).union(Capabilities::CVT_F64_I64);
        if cfg!(feature = "fast-integer-division") {
            caps = caps.union(Capabilities::FAST_INT_DIV);
        }
    }
    if cfg!(target_arch = "x86_64") {
        caps = caps.union(Capabilities::SSE2);
        if cfg!(target_feature = "sse4.1") {
            caps = caps.union(Capabilities::SSE4_1);
        }
        if cfg!(target_feature = "sse4.2") {
            caps = caps.union(Capabilities::SSE4_2);
        }
        if cfg!(target_feature = "avx2") {
            caps = caps.union(Capabilities::AVX2);
        }
    }
    caps
}

/// Capabilities of this build.
pub const NATIVE: Capabilities = compiled();

const TARGET_ARCH: &str = if cfg!(target_arch = "x86_64") {
    "x86_64"
} else if cfg!(target_arch = "aarch64") {
    "aarch64"
} else {
    "other"
};

/// Kernel chosen for one `Batch<T, N>` instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KernelEntry {
    /// Instantiation name, e.g. `i64x2`.
    pub batch: &'static str,
    /// Kernel name.
    pub kernel: &'static str,
    /// Lane count.
    pub lanes: usize,
    /// Required alignment of aligned loads and stores, in bytes.
    pub alignment: usize,
}

impl KernelEntry {
    fn of<T: Lanes<N>, const N: usize>(batch: &'static str) -> Self {
        Self {
            batch,
            kernel: <KernelOf<T, N> as Kernel<T, N>>::NAME,
            lanes: N,
            alignment: Batch::<T, N>::ALIGNMENT,
        }
    }
}

/// What this build compiled: target, kernels per instantiation, flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelReport {
    /// `target_arch` of the build.
    pub arch: &'static str,
    /// One entry per supported instantiation.
    pub kernels: [KernelEntry; 4],
    /// Same as [`NATIVE`].
    pub capabilities: Capabilities,
}

impl KernelReport {
    /// Report for the current build.
    pub fn current() -> Self {
        Self {
            arch: TARGET_ARCH,
            kernels: [
                KernelEntry::of::<i64, 2>("i64x2"),
                KernelEntry::of::<i64, 4>("i64x4"),
                KernelEntry::of::<i32, 4>("i32x4"),
                KernelEntry::of::<i32, 8>("i32x8"),
            ],
            capabilities: NATIVE,
        }
    }

    /// Log the selected kernels at `info` and each flag at `debug`.
    pub fn log(&self) {
        info!(
            "simd kernels for {}: {}",
            self.arch,
            KernelList(&self.kernels)
        );
        for (name, flag) in Capabilities::all().iter_names() {
            debug!(
                "capability {:<12} {}",
                name,
                if self.capabilities.contains(flag) { "on" } else { "off" }
            );
        }
    }
}

struct KernelList<'a>(&'a [KernelEntry]);

impl fmt::Display for KernelList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", entry.batch, entry.kernel)?;
        }
        Ok(())
    }
}

impl fmt::Display for KernelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "target: {}", self.arch)?;
        for entry in &self.kernels {
            writeln!(
                f,
                "  {:<6} kernel={:<12} lanes={} align={}",
                entry.batch, entry.kernel, entry.lanes, entry.alignment
            )?;
        }
        f.write_str("capabilities: ")?;
        if self.capabilities.is_empty() {
            f.write_str("none")
        } else {
            bitflags::parser::to_writer(&self.capabilities, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_matches_target() {
        #[cfg(target_arch = "x86_64")]
        assert!(NATIVE.contains(Capabilities::SSE2));
        #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
        assert!(NATIVE.contains(Capabilities::NEON | Capabilities::CVT_F64_I64));

        assert!(!NATIVE.contains(Capabilities::NEON | Capabilities::SSE2));
        assert_eq!(
            NATIVE.contains(Capabilities::SSE4_2),
            cfg!(all(target_arch = "x86_64", target_feature = "sse4.2"))
        );
    }

    #[test]
    fn fast_division_needs_the_feature_and_neon() {
        let expected = cfg!(all(
            feature = "fast-integer-division",
            target_arch = "aarch64",
            target_feature = "neon"
        ));
        assert_eq!(NATIVE.contains(Capabilities::FAST_INT_DIV), expected);
    }

    #[test]
    fn report_lists_every_instantiation() {
        let report = KernelReport::current();
        let names: Vec<_> = report.kernels.iter().map(|e| e.batch).collect();
        assert_eq!(names, ["i64x2", "i64x4", "i32x4", "i32x8"]);
        assert_eq!(report.kernels[0].alignment, 16);
        assert_eq!(report.kernels[3].lanes, 8);
        assert!(report.kernels[1..].iter().all(|e| e.kernel == "portable"));
        #[cfg(target_arch = "x86_64")]
        assert_eq!(report.kernels[0].kernel, "x86_64-sse");
    }

    #[test]
    fn display_names_flags() {
        let text = KernelReport::current().to_string();
        assert!(text.contains("i64x2"));
        #[cfg(target_arch = "x86_64")]
        assert!(text.contains("SSE2"));
    }

    #[test]
    fn flags_round_trip_through_json() {
        let caps = Capabilities::SSE2 | Capabilities::AVX2;
        let json = serde_json::to_string(&caps).unwrap();
        let back: Capabilities = serde_json::from_str(&json).unwrap();
        assert_eq!(back, caps);
        assert_eq!(Capabilities::from_name("SSE4_1"), Some(Capabilities::SSE4_1));
        assert_eq!(Capabilities::from_name("sse4_1"), None);
    }

    #[test_log::test]
    fn log_does_not_panic() {
        KernelReport::current().log();
    }
}
