//! Log input sanitization

/// Replace control characters with `_` so the text stays on one log line.
///
/// Carriage returns, newlines and tabs are the characters that matter for log
/// injection; the remaining C0/C1 control characters are replaced as well.
pub fn sanitize_log_input(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect()
}
