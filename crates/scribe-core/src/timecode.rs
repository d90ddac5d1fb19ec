//! Transcript timestamp formatting.
//!
//! Transcripts are plain text, one line per segment:
//!
//! ```text
//! [00:00:00 --> 00:00:02]  first words
//! [00:00:02 --> 00:00:05]  more words
//! ```

/// Format a second offset as `HH:MM:SS`. Negative inputs clamp to zero.
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Render one transcript line for a timed segment.
#[must_use]
pub fn format_segment_line(start: f64, end: f64, text: &str) -> String {
    format!(
        "[{} --> {}]  {}",
        format_timestamp(start),
        format_timestamp(end),
        text.trim()
    )
}
