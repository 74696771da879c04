//! Shift operators: immediate dispatch bounds and per-lane shifts.

use simd_batch::Batch;

type B2 = Batch<i64, 2>;

#[test]
fn test_shift_by_zero_is_identity() {
    let a = B2::from_array([-5, 0x0F0F]);
    assert_eq!(a << 0, a);
    assert_eq!(a >> 0, a);
}

#[test]
fn test_every_in_range_amount_matches_scalar() {
    let a = B2::from_array([0x0123_4567_89AB_CDEF, -0x0123_4567_89AB_CDEF]);
    let [x, y] = a.to_array();
    for n in 0..64u32 {
        assert_eq!((a << n).to_array(), [x << n, y << n], "shl {}", n);
        assert_eq!((a >> n).to_array(), [x >> n, y >> n], "shr {}", n);
    }
}

#[test]
fn test_out_of_range_amount_clears_lanes() {
    let a = B2::from_array([-1, i64::MAX]);
    for n in [64u32, 65, 100, u32::MAX] {
        assert_eq!(a << n, B2::splat(0), "shl {}", n);
        assert_eq!(a >> n, B2::splat(0), "shr {}", n);
    }
}

#[test]
fn test_shift_to_sign_position() {
    let a = B2::from_array([3, 2]);
    assert_eq!((a << 63).to_array(), [i64::MIN, 0]);
}

#[test]
fn test_right_shift_is_arithmetic() {
    let a = B2::from_array([i64::MIN, -2]);
    assert_eq!((a >> 63).to_array(), [-1, -1]);
    assert_eq!((a >> 1).to_array(), [i64::MIN / 2, -1]);
}

#[test]
fn test_per_lane_shifts() {
    let a = B2::from_array([-16, 16]);
    assert_eq!((a << B2::from_array([1, 3])).to_array(), [-32, 128]);
    assert_eq!((a >> B2::from_array([2, 4])).to_array(), [-4, 1]);
    assert_eq!((a << B2::from_array([0, 63])).to_array(), [-16, 0]);
}

#[test]
fn test_per_lane_out_of_range_clears() {
    let a = B2::from_array([-16, 16]);
    let bad = B2::from_array([-1, 64]);
    assert_eq!(a << bad, B2::splat(0));
    assert_eq!(a >> bad, B2::splat(0));
    let mixed = B2::from_array([i64::MIN, 1]);
    assert_eq!((a << mixed).to_array(), [0, 32]);
}

#[test]
fn test_portable_shifts_use_lane_width() {
    let a = Batch::<i32, 4>::from_array([1, -1, i32::MIN, 7]);
    assert_eq!((a << 31).to_array(), [i32::MIN, i32::MIN, 0, i32::MIN]);
    assert_eq!(a << 32, Batch::splat(0));
    assert_eq!((a >> 31).to_array(), [0, -1, -1, 0]);
    let amounts = Batch::<i32, 4>::from_array([1, 31, 32, -3]);
    assert_eq!((a >> amounts).to_array(), [0, -1, 0, 0]);
}
