use quickcheck_macros::quickcheck;

use super::{Rational, rescale, rescale_opt, rescale_packet};
use crate::packet::Packet;

fn tb(num: u16, den: u16) -> Rational {
    Rational::new(num as i32 % 1000 + 1, den as i32 + 1)
}

#[test]
fn test_rescale_same_time_base() {
    let tb = Rational::new(1, 25);
    assert_eq!(rescale(0, tb, tb), 0);
    assert_eq!(rescale(-7, tb, tb), -7);
    assert_eq!(rescale(i64::MAX, tb, tb), i64::MAX);
}

#[test]
fn test_rescale_frames_to_mpegts_clock() {
    let enc = Rational::new(1, 25);
    let ts = Rational::new(1, 90_000);
    assert_eq!(rescale(1, enc, ts), 3600);
    assert_eq!(rescale(10, enc, ts), 36_000);
    assert_eq!(rescale(36_000, ts, enc), 10);
}

#[test]
fn test_rescale_rounds_half_away_from_zero() {
    let from = Rational::new(1, 2);
    let to = Rational::new(1, 1);
    // 1/2 s -> 0.5 ticks -> 1, -1/2 s -> -0.5 ticks -> -1
    assert_eq!(rescale(1, from, to), 1);
    assert_eq!(rescale(-1, from, to), -1);
    // 3/2 s -> 1.5 ticks -> 2
    assert_eq!(rescale(3, from, to), 2);
    assert_eq!(rescale(-3, from, to), -2);

    let from = Rational::new(1, 3);
    // 1/3 s -> 0.33 -> 0, 2/3 s -> 0.67 -> 1
    assert_eq!(rescale(1, from, to), 0);
    assert_eq!(rescale(2, from, to), 1);
    assert_eq!(rescale(-2, from, to), -1);
}

#[test]
fn test_rescale_saturates() {
    let from = Rational::new(1, 1);
    let to = Rational::new(1, 90_000);
    assert_eq!(rescale(i64::MAX, from, to), i64::MAX);
    assert_eq!(rescale(i64::MIN, from, to), i64::MIN);
}

#[test]
fn test_rescale_unknown_stays_unknown() {
    assert_eq!(
        rescale_opt(None, Rational::new(1, 25), Rational::new(1, 1000)),
        None
    );
    assert_eq!(
        rescale_opt(Some(2), Rational::new(1, 25), Rational::new(1, 1000)),
        Some(80)
    );
}

#[test]
fn test_rescale_packet_fields() {
    let mut packet = Packet::new(0, vec![1u8, 2, 3]);
    packet.set_pts(Some(4));
    packet.set_dts(None);
    packet.set_duration(1);

    rescale_packet(&mut packet, Rational::new(1, 25), Rational::new(1, 90_000));

    assert_eq!(packet.pts(), Some(14_400));
    assert_eq!(packet.dts(), None);
    assert_eq!(packet.duration(), 3600);
}

#[test]
fn test_rescale_packet_keeps_unknown_duration() {
    let mut packet = Packet::new(0, Vec::<u8>::new());
    packet.set_pts(Some(1));
    packet.set_duration(0);

    rescale_packet(&mut packet, Rational::new(1, 25), Rational::new(1, 1000));

    assert_eq!(packet.pts(), Some(40));
    assert_eq!(packet.duration(), 0);
}

#[test]
fn test_rational_display() {
    assert_eq!(Rational::new(1, 25).to_string(), "1/25");
    assert_eq!(Rational::new(25, 1).invert(), Rational::new(1, 25));
}

#[quickcheck]
fn prop_rescale_identity(value: i64, num: u16, den: u16) -> bool {
    let tb = tb(num, den);
    rescale(value, tb, tb) == value
}

#[quickcheck]
fn prop_rescale_composes_through_finer_base(value: i32, a: (u16, u16), b: (u16, u16), c: (u16, u16)) -> bool {
    let (a, b, c) = (tb(a.0, a.1), tb(b.0, b.1), tb(c.0, c.1));
    // Only meaningful when the intermediate base is at least as fine as the destination.
    if b.numerator() as i64 * c.denominator() as i64 > c.numerator() as i64 * b.denominator() as i64 {
        return true;
    }
    let value = value as i64;
    let composed = rescale(rescale(value, a, b), b, c);
    let direct = rescale(value, a, c);
    (composed - direct).abs() <= 1
}

#[quickcheck]
fn prop_rescale_composition_error_is_bounded(value: i32, a: (u16, u16), b: (u16, u16), c: (u16, u16)) -> bool {
    let (a, b, c) = (tb(a.0, a.1), tb(b.0, b.1), tb(c.0, c.1));
    let value = value as i64;
    let diff = (rescale(rescale(value, a, b), b, c) - rescale(value, a, c)).abs() as i128;

    // |diff| * c <= b / 2 + c
    let lhs = 2 * diff * c.numerator() as i128 * b.denominator() as i128;
    let rhs = b.numerator() as i128 * c.denominator() as i128
        + 2 * c.numerator() as i128 * b.denominator() as i128;
    lhs <= rhs
}
