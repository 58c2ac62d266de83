/// Render milliseconds as `HH:MM:SS`. Hours do not wrap at 24.
pub fn format_elapsed(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let mins = (ms / 60_000) % 60;
    let secs = (ms / 1000) % 60;

    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}
