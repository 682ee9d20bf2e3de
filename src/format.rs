/// Render a duration in seconds the way every screen shows it.
///
/// Under a minute: `"5.0 s"`. From a minute up: `"m:ss.s"`, e.g. `"2:05.3"`.
/// The value is rounded to tenths before it is split into minutes, so
/// `59.97` becomes `"1:00.0"` rather than `"60.0 s"`.
pub fn format_duration(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let tenths = (seconds * 10.0).round() as u64;

    if tenths < 600 {
        format!("{}.{} s", tenths / 10, tenths % 10)
    } else {
        let minutes = tenths / 600;
        let rem = tenths % 600;
        format!("{}:{:02}.{}", minutes, rem / 10, rem % 10)
    }
}

/// Live timer display from a millisecond sample
pub fn format_millis(elapsed_ms: u64) -> String {
    format_duration(elapsed_ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_short_durations_in_seconds() {
        assert_eq!(format_duration(5.0), "5.0 s");
        assert_eq!(format_duration(0.0), "0.0 s");
        assert_eq!(format_duration(59.9), "59.9 s");
        assert_eq!(format_duration(12.34), "12.3 s");
    }

    #[test]
    fn formats_minutes_with_padded_seconds() {
        assert_eq!(format_duration(65.3), "1:05.3");
        assert_eq!(format_duration(125.3), "2:05.3");
        assert_eq!(format_duration(600.0), "10:00.0");
        assert_eq!(format_duration(60.0), "1:00.0");
        assert_eq!(format_duration(3599.9), "59:59.9");
    }

    #[test]
    fn rounding_carries_into_minutes() {
        assert_eq!(format_duration(59.97), "1:00.0");
        assert_eq!(format_duration(119.96), "2:00.0");
    }

    #[test]
    fn negative_and_non_finite_render_as_zero() {
        assert_eq!(format_duration(-3.0), "0.0 s");
        assert_eq!(format_duration(f64::NAN), "0.0 s");
    }

    #[test]
    fn millis_are_shown_in_tenths() {
        assert_eq!(format_millis(0), "0.0 s");
        assert_eq!(format_millis(1_250), "1.3 s");
        assert_eq!(format_millis(75_400), "1:15.4");
    }
}
