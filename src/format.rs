use std::time::Duration;

/// Render a playback position as `m:ss`, the way the player clock shows it.
///
/// Minutes are not wrapped into hours and sub-second remainders are
/// truncated, so `90.7` renders as `1:30`.
pub fn format_time(seconds: f64) -> String {
    let seconds = clamp(seconds);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// Render a position as an SRT timestamp (`HH:MM:SS,mmm`), rounded to the
/// nearest millisecond.
pub fn format_timestamp(seconds: f64) -> String {
    let millis = (clamp(seconds) * 1000.0).round() as u64;
    format_duration(Duration::from_millis(millis))
}

fn format_duration(timestamp: Duration) -> String {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.as_millis() % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

// The player only ever reports finite, non-negative positions.
fn clamp(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
