//! Common utilities shared across domain models

/// Formats a position in seconds as `mm:ss`
///
/// Minutes are not wrapped into hours. Negative or non-finite input
/// renders as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total_seconds = seconds as u64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_time(0.0), "00:00");
    }

    #[test]
    fn test_format_truncates_fraction() {
        assert_eq!(format_time(59.99), "00:59");
        assert_eq!(format_time(61.5), "01:01");
    }

    #[test]
    fn test_format_does_not_wrap_hours() {
        assert_eq!(format_time(3725.0), "62:05");
    }

    #[test]
    fn test_format_invalid_input() {
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
        assert_eq!(format_time(-3.0), "00:00");
    }
}
