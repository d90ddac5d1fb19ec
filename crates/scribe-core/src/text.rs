//! Transport-safe message sanitation.
//!
//! Failure messages end up in SQLite, JSON responses, and log lines. Engine
//! errors can carry anything — multi-line backtraces, NUL bytes from native
//! code, unbounded length — so the write boundary normalizes them here.

/// Byte budget for persisted error messages.
pub const MAX_MESSAGE_BYTES: usize = 500;

/// Truncate a string to at most `max_bytes` bytes at a char boundary.
///
/// `&s[..n]` panics when `n` falls inside a multi-byte character; this walks
/// back to the nearest boundary instead.
#[must_use]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Normalize an arbitrary message for storage and transport.
///
/// Control characters (including newlines and NUL) become single spaces,
/// runs of whitespace collapse, and the result is truncated to
/// [`MAX_MESSAGE_BYTES`] with a `…` marker. An empty or all-control input
/// yields a placeholder rather than an empty string.
#[must_use]
pub fn sanitize_message(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_MESSAGE_BYTES));
    let mut last_was_space = true;
    for ch in raw.chars() {
        let mapped = if ch.is_control() { ' ' } else { ch };
        if mapped == ' ' {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(mapped);
            last_was_space = false;
        }
    }
    let trimmed = out.trim_end();

    if trimmed.is_empty() {
        return "(no detail)".to_string();
    }
    if trimmed.len() <= MAX_MESSAGE_BYTES {
        return trimmed.to_string();
    }
    let budget = MAX_MESSAGE_BYTES.saturating_sub('…'.len_utf8());
    format!("{}…", truncate_str(trimmed, budget).trim_end())
}
