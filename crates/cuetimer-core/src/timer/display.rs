use super::engine::{TimerPhase, TimerSnapshot};

/// Format seconds as `MM:SS`.
///
/// Both fields are zero-padded to two digits. Minutes are not capped, so
/// durations past 99:59 widen to `100:00` and beyond instead of wrapping.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Human status line shown under the clock.
pub fn status_label(snapshot: &TimerSnapshot) -> &'static str {
    if snapshot.remaining_secs == 0 {
        "Time's Up!"
    } else if snapshot.phase == TimerPhase::Running {
        "Running..."
    } else {
        "Paused"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(300), "05:00");
        assert_eq!(format_clock(5999), "99:59");
        assert_eq!(format_clock(6000), "100:00");
    }
}
