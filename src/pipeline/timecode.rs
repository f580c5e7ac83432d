/// Formats a second offset the way video sites expect: `mm:ss`, or
/// `hh:mm:ss` once there is a nonzero hour. Fields are two-digit zero-padded;
/// the hour field widens past two digits as needed.
pub fn format_display_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
