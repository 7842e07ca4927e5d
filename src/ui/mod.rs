use std::time::Duration;

pub mod cover;
pub mod loading;
pub mod notifications;
pub mod render;
pub mod theme;

/// Formats seconds as `m:ss`. Minutes are not wrapped into hours.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = (secs % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, seconds)
}

pub fn format_duration(d: Duration) -> String {
    format_time(d.as_secs_f64())
}

/// Share of `duration` already played, in percent.
pub fn progress_percent(position: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (position.as_secs_f64() / duration.as_secs_f64() * 100.0).clamp(0.0, 100.0)
}
