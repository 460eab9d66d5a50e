//! Escaping payload text for a double-quoted evaluator string literal.

/// Escape `text` so that `"<escaped>"` reads back as `text`.
///
/// Backslash, double quote, newline, carriage return and tab are escaped;
/// every other character passes through. The substitution is a single pass,
/// so a backslash introduced for one character is never escaped again.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
