//! Type-converting loads and stores, alignment, and memory bounds.

use simd_batch::Batch;

type B2 = Batch<i64, 2>;

#[repr(align(16))]
struct Aligned16<T>(T);

#[test]
fn scenario_i32_round_trip() {
    let mut buf = [0i32; 2];
    unsafe { B2::from_array([5, -3]).store_unaligned(buf.as_mut_ptr()) };
    assert_eq!(buf, [5, -3]);
    let back = unsafe { B2::load_unaligned(buf.as_ptr()) };
    assert_eq!(back.to_array(), [5, -3]);
}

#[test]
fn test_lossless_round_trips() {
    let b = B2::from_array([-100, 100]);

    let mut as_i64 = [0i64; 2];
    b.write_to_slice(&mut as_i64);
    assert_eq!(B2::from_slice(&as_i64), b);

    let mut as_f64 = [0f64; 2];
    b.write_to_slice(&mut as_f64);
    assert_eq!(as_f64, [-100.0, 100.0]);
    assert_eq!(B2::from_slice(&as_f64), b);

    let mut as_f32 = [0f32; 2];
    b.write_to_slice(&mut as_f32);
    assert_eq!(as_f32, [-100.0, 100.0]);
    assert_eq!(B2::from_slice(&as_f32), b);

    let mut as_i8 = [0i8; 2];
    b.write_to_slice(&mut as_i8);
    assert_eq!(as_i8, [-100, 100]);
    assert_eq!(B2::from_slice(&as_i8), b);

    let u = B2::from_array([0, 255]);
    let mut as_u8 = [0u8; 2];
    u.write_to_slice(&mut as_u8);
    assert_eq!(as_u8, [0, 255]);
    assert_eq!(B2::from_slice(&as_u8), u);
}

#[test]
fn test_float_loads_truncate_and_saturate() {
    let b = B2::from_slice(&[2.9f64, -2.9]);
    assert_eq!(b.to_array(), [2, -2]);
    let b = B2::from_slice(&[f64::NAN, 1e300]);
    assert_eq!(b.to_array(), [0, i64::MAX]);
    let b = B2::from_slice(&[-0.75f32, f32::NEG_INFINITY]);
    assert_eq!(b.to_array(), [0, i64::MIN]);
}

#[test]
fn test_narrowing_stores_keep_low_bits() {
    let b = B2::from_array([300, -129]);
    let mut bytes = [0u8; 2];
    b.write_to_slice(&mut bytes);
    assert_eq!(bytes, [44, 127]);

    let mut words = [0i32; 2];
    B2::from_array([0x1_0000_0007, -1]).write_to_slice(&mut words);
    assert_eq!(words, [7, -1]);
}

#[test]
fn test_byte_loads_extend_by_signedness() {
    assert_eq!(B2::from_slice(&[0xFFu8, 0x80]).to_array(), [255, 128]);
    assert_eq!(B2::from_slice(&[-1i8, i8::MIN]).to_array(), [-1, -128]);
}

#[test]
fn test_aligned_matches_unaligned() {
    let src = Aligned16([11i64, -22]);
    let mut dst = Aligned16([0i64; 2]);
    unsafe {
        let a = B2::load_aligned(src.0.as_ptr());
        let u = B2::load_unaligned(src.0.as_ptr());
        assert_eq!(a, u);
        a.store_aligned(dst.0.as_mut_ptr());
    }
    assert_eq!(dst.0, [11, -22]);

    let wide = Aligned16([1.5f64, -1.5]);
    let b = unsafe { B2::load_aligned(wide.0.as_ptr()) };
    assert_eq!(b.to_array(), [1, -1]);
}

/// `store_aligned` then `load_aligned` through a 16-byte aligned buffer of `S`.
macro_rules! assert_aligned_round_trip {
    ($ty:ty, $lanes:expr) => {{
        let batch = B2::from_array($lanes);
        let mut buffer = Aligned16([<$ty>::default(); 2]);
        let back = unsafe {
            batch.store_aligned(buffer.0.as_mut_ptr());
            B2::load_aligned(buffer.0.as_ptr())
        };
        assert_eq!(back, batch, "aligned round trip through {}", stringify!($ty));
    }};
}

#[test]
fn test_aligned_round_trip_every_source_type() {
    assert_aligned_round_trip!(i64, [i64::MIN, i64::MAX]);
    assert_aligned_round_trip!(f64, [-7, 1 << 52]);
    assert_aligned_round_trip!(f32, [-7, 9]);
    assert_aligned_round_trip!(i32, [-7, 9]);
    assert_aligned_round_trip!(i8, [-7, 9]);
    assert_aligned_round_trip!(u8, [0, 200]);
}

#[test]
fn test_unaligned_address() {
    // Offset by one lane so the pointer is 8 mod 16.
    let buf = Aligned16([0i64, 41, 42, 0]);
    let b = unsafe { B2::load_unaligned(buf.0.as_ptr().add(1)) };
    assert_eq!(b.to_array(), [41, 42]);
}

#[test]
fn test_portable_widths_convert() {
    let b = Batch::<i32, 8>::from_slice(&[1.9f32, -1.9, 3.0, 4.0, 5.0, 6.0, 7.0, 8.5]);
    assert_eq!(b.to_array(), [1, -1, 3, 4, 5, 6, 7, 8]);
    let mut out = [0i64; 8];
    b.write_to_slice(&mut out);
    assert_eq!(out, [1, -1, 3, 4, 5, 6, 7, 8]);
}

/// Store `value` into the front of a guard-filled buffer and check that only
/// the first two elements changed.
macro_rules! assert_store_bounds {
    ($ty:ty, $guard:expr) => {{
        const GUARD: $ty = $guard;
        let mut buffer = [GUARD; 6];
        let batch = B2::from_array([1, 2]);
        unsafe { batch.store_unaligned(buffer.as_mut_ptr()) };
        assert_eq!(buffer[0], 1 as $ty);
        assert_eq!(buffer[1], 2 as $ty);
        for (i, v) in buffer.iter().enumerate().skip(2) {
            assert_eq!(
                *v,
                GUARD,
                "guard element {} overwritten storing {}",
                i,
                stringify!($ty)
            );
        }
    }};
}

#[test]
fn test_stores_stay_in_bounds() {
    assert_store_bounds!(u8, 0xAA);
    assert_store_bounds!(i8, 0x55);
    assert_store_bounds!(i32, 0x0BAD_F00D);
    assert_store_bounds!(i64, 0x0BAD_F00D_0BAD_F00D);
    assert_store_bounds!(f32, 1234.5);
    assert_store_bounds!(f64, -9876.5);
}

#[test]
fn test_loads_ignore_trailing_memory() {
    let bytes = [3u8, 4, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
    assert_eq!(B2::from_slice(&bytes).to_array(), [3, 4]);
    let words = [9i32, -9, i32::MAX, i32::MAX];
    assert_eq!(B2::from_slice(&words).to_array(), [9, -9]);
}
