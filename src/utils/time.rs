//! Time parsing and formatting utilities

use crate::domain::errors::DomainError;

/// Parse a user-supplied time: seconds (`130.5`), `MM:SS.ms` or `HH:MM:SS.ms`
pub fn parse_time(time_str: &str) -> Result<f64, DomainError> {
    let time_str = time_str.trim();
    let invalid = || DomainError::BadArgs(format!(
        "Invalid time format: {}. Expected seconds, MM:SS.ms or HH:MM:SS.ms",
        time_str
    ));

    if let Ok(seconds) = time_str.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        return Ok(seconds);
    }

    let parts: Vec<&str> = time_str.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0u32, m.parse::<u32>().map_err(|_| invalid())?, *s),
        [h, m, s] => (
            h.parse::<u32>().map_err(|_| invalid())?,
            m.parse::<u32>().map_err(|_| invalid())?,
            *s,
        ),
        _ => return Err(invalid()),
    };
    let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;

    if parts.len() == 3 && minutes >= 60 {
        return Err(invalid());
    }
    if !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Format seconds as `HH:MM:SS.mmm`
pub fn format_seconds(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
