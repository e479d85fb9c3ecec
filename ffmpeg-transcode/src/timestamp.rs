use std::fmt::{Display, Formatter};

use crate::packet::Packet;

/// A rational number of seconds, used for stream time bases and frame rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i32,
    den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    pub fn numerator(&self) -> i32 {
        self.num
    }

    pub fn denominator(&self) -> i32 {
        self.den
    }

    /// Both terms positive, as a usable frame rate or time base must be.
    pub fn is_valid(&self) -> bool {
        self.num > 0 && self.den > 0
    }

    /// Swaps numerator and denominator, e.g. a frame rate of 25/1 becomes a time base of 1/25.
    pub fn invert(&self) -> Self {
        Self::new(self.den, self.num)
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num, den)
    }
}

/// Rescales `value` from time base `from` to time base `to`.
///
/// The result is rounded to the nearest tick of `to`, halfway cases away from zero, and
/// saturates at the `i64` range. An invalid destination leaves the value untouched.
pub fn rescale(value: i64, from: Rational, to: Rational) -> i64 {
    if from == to {
        return value;
    }

    let num = value as i128 * from.num as i128 * to.den as i128;
    let den = from.den as i128 * to.num as i128;
    if den == 0 {
        return value;
    }

    div_round_near_inf(num, den).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Same as [`rescale`], leaving unknown timestamps unknown.
pub fn rescale_opt(value: Option<i64>, from: Rational, to: Rational) -> Option<i64> {
    value.map(|v| rescale(v, from, to))
}

/// Rescales every time field of `packet` (pts, dts and a positive duration).
pub fn rescale_packet(packet: &mut Packet, from: Rational, to: Rational) {
    if from == to {
        return;
    }
    packet.set_pts(rescale_opt(packet.pts(), from, to));
    packet.set_dts(rescale_opt(packet.dts(), from, to));
    if packet.duration() > 0 {
        packet.set_duration(rescale(packet.duration(), from, to));
    }
}

fn div_round_near_inf(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let half = den / 2;
    if num >= 0 {
        (num + half) / den
    } else {
        -((-num + half) / den)
    }
}

#[cfg(test)]
#[path = "timestamp_test.rs"]
mod timestamp_test;
