//! Log sanitization utilities
//!
//! Keeps response bodies (which may carry certificate material or rendered
//! server configuration) and API tokens out of debug/error logs.

/// Maximum number of bytes of a body included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Characters of a token kept visible by [`redact_token`].
const TOKEN_VISIBLE_PREFIX: usize = 4;

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask an API token, keeping only a short prefix for correlation.
pub fn redact_token(token: &str) -> String {
    if token.chars().count() <= TOKEN_VISIBLE_PREFIX * 2 {
        return "****".to_string();
    }
    let prefix: String = token.chars().take(TOKEN_VISIBLE_PREFIX).collect();
    format!("{prefix}****")
}
