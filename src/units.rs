// Display formatting for byte counts and durations

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format bytes with the largest fitting binary unit, rounded to 2 decimals
/// (trailing zeros dropped: 1024 -> "1 KB", 1536 -> "1.5 KB")
pub fn format_byte_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Format seconds as HH:MM:SS. Fractions are truncated, negative and NaN input render as
/// zero, and the hours field grows past two digits.
pub fn format_duration(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
