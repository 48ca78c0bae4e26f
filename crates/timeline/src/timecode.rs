//! Timecode normalization.
//!
//! FCPXML expresses durations either as rational fractions (`"1001/24000s"`)
//! or as decimal seconds (`"2.5s"`), both optionally suffixed with `s`.
//! Both forms normalize to the same `(seconds, frame)` pair.

/// A normalized timecode: absolute seconds plus an integer frame number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timecode {
    /// Absolute time in seconds.
    pub seconds: f64,
    /// Frame number.
    pub frame: i64,
}

impl Timecode {
    /// The zero timecode.
    pub const ZERO: Timecode = Timecode {
        seconds: 0.0,
        frame: 0,
    };
}

/// A timecode string that could not be parsed as a number.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid timecode: {text:?}")]
pub struct TimecodeError {
    pub text: String,
}

/// Normalize an FCPXML timecode string against the given working frame rate.
///
/// - Rational form `n/d`: `seconds = n / d` and `frame = trunc(n)`. The
///   numerator's integer part is used as the frame number directly.
/// - Decimal form: `seconds = v` and `frame = trunc(v * working_fps)`.
/// - Empty input normalizes to [`Timecode::ZERO`].
pub fn parse_timecode(text: &str, working_fps: f64) -> Result<Timecode, TimecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Timecode::ZERO);
    }

    let text = text.strip_suffix('s').unwrap_or(text);

    if let Some((num, den)) = text.split_once('/') {
        let numerator = parse_component(num, text)?;
        let denominator = parse_component(den, text)?;
        if denominator == 0.0 {
            return Err(TimecodeError {
                text: text.to_string(),
            });
        }
        return Ok(Timecode {
            seconds: numerator / denominator,
            frame: numerator as i64,
        });
    }

    let seconds = parse_component(text, text)?;
    Ok(Timecode {
        seconds,
        frame: (seconds * working_fps) as i64,
    })
}

fn parse_component(component: &str, full: &str) -> Result<f64, TimecodeError> {
    component
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TimecodeError {
            text: full.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decimal_timecode() {
        let tc = parse_timecode("2.5", 30.0).unwrap();
        assert!((tc.seconds - 2.5).abs() < 1e-9);
        assert_eq!(tc.frame, 75);
    }

    #[test]
    fn test_decimal_timecode_with_suffix() {
        let tc = parse_timecode("1.0s", 30.0).unwrap();
        assert!((tc.seconds - 1.0).abs() < 1e-9);
        assert_eq!(tc.frame, 30);
    }

    #[test]
    fn test_rational_timecode() {
        let tc = parse_timecode("1001/24000s", 30.0).unwrap();
        assert!((tc.seconds - 1001.0 / 24000.0).abs() < 1e-12);
        assert_eq!(tc.frame, 1001);
    }

    #[test]
    fn test_rational_frame_is_numerator_not_rate_scaled() {
        // "2/1s" is two seconds, but the frame number comes from the
        // numerator (2), not seconds * fps (60).
        let tc = parse_timecode("2/1s", 30.0).unwrap();
        assert!((tc.seconds - 2.0).abs() < 1e-9);
        assert_eq!(tc.frame, 2);
    }

    #[test]
    fn test_empty_timecode_is_zero() {
        let tc = parse_timecode("", 30.0).unwrap();
        assert_eq!(tc, Timecode::ZERO);
        let tc = parse_timecode("   ", 30.0).unwrap();
        assert_eq!(tc, Timecode::ZERO);
    }

    #[test]
    fn test_malformed_timecode_is_error() {
        assert!(parse_timecode("abc", 30.0).is_err());
        assert!(parse_timecode("1/x", 30.0).is_err());
        assert!(parse_timecode("1/0", 30.0).is_err());
    }

    #[test]
    fn test_decimal_uses_working_rate() {
        let tc = parse_timecode("1.0", 24.0).unwrap();
        assert_eq!(tc.frame, 24);
    }

    proptest! {
        #[test]
        fn prop_rational_roundtrip(n in 0u32..1_000_000, d in 1u32..100_000) {
            let tc = parse_timecode(&format!("{n}/{d}s"), 30.0).unwrap();
            prop_assert!((tc.seconds - n as f64 / d as f64).abs() < 1e-9);
            prop_assert_eq!(tc.frame, n as i64);
        }

        #[test]
        fn prop_decimal_seconds_preserved(v in 0.0f64..100_000.0) {
            let tc = parse_timecode(&format!("{v}"), 30.0).unwrap();
            prop_assert!((tc.seconds - v).abs() < 1e-9);
        }
    }
}
