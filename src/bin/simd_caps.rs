//! Report the SIMD kernels and capability flags this build compiled.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin simd_caps
//! cargo run --release --bin simd_caps -- --json
//! RUSTFLAGS="-C target-cpu=native" cargo run --bin simd_caps -- --require SSE4_2 --require AVX2
//! ```
//!
//! `--require FLAG` exits with an error unless `FLAG` (a [`Capabilities`]
//! name such as `NEON` or `avx2`) is compiled in. Before printing, the three
//! reference scenarios run against the selected `i64x2` kernel and any
//! mismatch is an error.

use anyhow::{bail, Context};
use log::{debug, info};
use simd_batch::{Batch, Capabilities, KernelReport};

#[derive(Debug, Default)]
struct Options {
    json: bool,
    required: Capabilities,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--require" => {
                let name = args.next().context("--require needs a capability name")?;
                let flag = Capabilities::from_name(&name.to_ascii_uppercase())
                    .with_context(|| format!("unknown capability '{}'", name))?;
                options.required |= flag;
            }
            other => bail!("unexpected argument '{}'", other),
        }
    }
    Ok(options)
}

/// Scenario checks on `Batch<i64, 2>`.
fn smoke_test() -> anyhow::Result<()> {
    type B = Batch<i64, 2>;

    let sum = B::from_array([3, 4]) + B::from_array([10, -1]);
    if sum.to_array() != [13, 3] {
        bail!("addition: expected [13, 3], got {:?}", sum);
    }

    let sevens = B::splat(7);
    if !sevens.cmp_eq(sevens).all() {
        bail!("cmp_eq of equal batches is not all true");
    }
    let min = B::from_array([7, -2]).min(B::from_array([1, 5]));
    if min.to_array() != [1, -2] {
        bail!("min: expected [1, -2], got {:?}", min);
    }

    let mut narrow = [0i32; 2];
    B::from_array([5, -3]).write_to_slice(&mut narrow);
    let back = B::from_slice(&narrow);
    if narrow != [5, -3] || back.to_array() != [5, -3] {
        bail!("i32 round trip: stored {:?}, loaded {:?}", narrow, back);
    }

    debug!("scenario checks passed");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let options = parse_args(std::env::args().skip(1))?;
    let report = KernelReport::current();
    report.log();

    smoke_test().context("selected kernel failed its scenario checks")?;

    let missing = options.required - report.capabilities;
    if !missing.is_empty() {
        let mut names = String::new();
        bitflags::parser::to_writer(&missing, &mut names)
            .context("failed to format missing capabilities")?;
        bail!("required capabilities not compiled in: {}", names);
    }

    if options.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
        println!("{}", json);
    } else {
        println!("{}", report);
    }

    info!("simd_caps done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_case_insensitively() {
        let options = parse_args(args(&["--json", "--require", "sse2", "--require", "NEON"])).unwrap();
        assert!(options.json);
        assert_eq!(options.required, Capabilities::SSE2 | Capabilities::NEON);
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_args(args(&["--require", "mmx"])).is_err());
        assert!(parse_args(args(&["--require"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }

    #[test]
    fn scenarios_pass_on_this_build() {
        smoke_test().unwrap();
    }
}
