use std::fmt;

use ffmpeg_next::{Rescale, Rounding};

/// libav's "no timestamp" marker (`AV_NOPTS_VALUE`).
pub const NO_TIMESTAMP: i64 = i64::MIN;

/// A rational time unit: one tick lasts `num / den` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBase {
    pub num: i32,
    pub den: i32,
}

impl TimeBase {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    pub fn is_valid(&self) -> bool {
        self.num > 0 && self.den > 0
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<TimeBase> for ffmpeg_next::Rational {
    fn from(tb: TimeBase) -> Self {
        ffmpeg_next::Rational::new(tb.num, tb.den)
    }
}

impl From<ffmpeg_next::Rational> for TimeBase {
    fn from(r: ffmpeg_next::Rational) -> Self {
        TimeBase::new(r.numerator(), r.denominator())
    }
}

/// Converts `ts` from `from` ticks to `to` ticks with libavutil's
/// `av_rescale_q_rnd`, rounding halfway cases away from zero.
///
/// The mapping is non-decreasing for valid time bases, so ordered input
/// stays ordered. A degenerate base or a result outside the `i64` range
/// yields [`NO_TIMESTAMP`].
pub fn rescale(ts: i64, from: TimeBase, to: TimeBase) -> i64 {
    ts.rescale_with(from, to, Rounding::NearestInfinity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::SOURCE_TIME_BASE;
    use rstest::rstest;

    const MPEG_TB: TimeBase = TimeBase::new(1, 90_000);

    #[rstest]
    #[case::zero(0, 0)]
    #[case::one_frame_at_30fps(33_000, 2_970)]
    #[case::two_frames_at_30fps(66_000, 5_940)]
    #[case::one_second(1_000_000, 90_000)]
    #[case::negative(-33_000, -2_970)]
    fn test_micros_to_mpeg_ticks(#[case] micros: i64, #[case] expected: i64) {
        assert_eq!(rescale(micros, SOURCE_TIME_BASE, MPEG_TB), expected);
    }

    #[rstest]
    // 1 µs = 0.09 ticks
    #[case::rounds_down(1, 0)]
    // 5 µs = 0.45 ticks
    #[case::below_half(5, 0)]
    // 50 µs = 4.5 ticks
    #[case::half_rounds_up(50, 5)]
    #[case::negative_half_rounds_away(-50, -5)]
    // 17 µs = 1.53 ticks
    #[case::above_half(17, 2)]
    fn test_rounds_to_nearest_ties_away(#[case] micros: i64, #[case] expected: i64) {
        assert_eq!(rescale(micros, SOURCE_TIME_BASE, MPEG_TB), expected);
    }

    #[test]
    fn test_same_base_is_identity() {
        assert_eq!(rescale(123_456, MPEG_TB, MPEG_TB), 123_456);
    }

    #[test]
    fn test_upscale_to_finer_base() {
        assert_eq!(rescale(3, MPEG_TB, SOURCE_TIME_BASE), 33);
    }

    #[test]
    fn test_degenerate_base_yields_no_timestamp() {
        assert_eq!(
            rescale(10, SOURCE_TIME_BASE, TimeBase::new(0, 1)),
            NO_TIMESTAMP
        );
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let ten_days_us = 10 * 24 * 3600 * 1_000_000_i64;
        assert_eq!(
            rescale(ten_days_us, SOURCE_TIME_BASE, MPEG_TB),
            10 * 24 * 3600 * 90_000
        );
    }

    #[test]
    fn test_overflow_yields_no_timestamp() {
        let result = rescale(i64::MAX, TimeBase::new(1, 1), SOURCE_TIME_BASE);
        assert_eq!(result, NO_TIMESTAMP);
    }

    #[rstest]
    #[case::mpeg(MPEG_TB)]
    #[case::mp4_default(TimeBase::new(1, 15_360))]
    #[case::ntsc_frames(TimeBase::new(1001, 30_000))]
    #[case::millis(TimeBase::new(1, 1000))]
    fn test_rescale_preserves_ordering(#[case] to: TimeBase) {
        let mut previous = rescale(-20_000, SOURCE_TIME_BASE, to);
        for ts in (-20_000..200_000).step_by(7) {
            let current = rescale(ts, SOURCE_TIME_BASE, to);
            assert!(
                current >= previous,
                "rescale({ts}) = {current} went below {previous} for {to}"
            );
            previous = current;
        }
    }

    #[test]
    fn test_rational_conversion() {
        let rational: ffmpeg_next::Rational = MPEG_TB.into();
        assert_eq!(rational.numerator(), 1);
        assert_eq!(rational.denominator(), 90_000);
        assert_eq!(TimeBase::from(rational), MPEG_TB);
    }

    #[test]
    fn test_display() {
        assert_eq!(MPEG_TB.to_string(), "1/90000");
    }

    #[test]
    fn test_validity() {
        assert!(MPEG_TB.is_valid());
        assert!(!TimeBase::new(0, 1).is_valid());
        assert!(!TimeBase::new(1, 0).is_valid());
    }
}
