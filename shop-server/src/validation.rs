//! Input validation and sanitization helpers
//!
//! Centralized text length constants, validation functions, and the
//! HTML/script sanitizer applied to catalog text. Catalog names and
//! descriptions are echoed verbatim into order snapshots that downstream
//! clients render, so they are scrubbed before persistence.

use shared::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: shop, product, option category, option, tag, user
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, remarks
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, nickname
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that a string (possibly empty) is within the length limit.
pub fn validate_text_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

// ── Sanitization ────────────────────────────────────────────────────

/// Strip markup from catalog text before persistence.
///
/// Removes `<script>`/`<style>` blocks including their content, drops all
/// remaining tags, and escapes stray angle brackets. Plain text passes
/// through unchanged.
pub fn sanitize_text(input: &str) -> String {
    let without_blocks = strip_block(&strip_block(input, "script"), "style");

    let mut out = String::with_capacity(without_blocks.len());
    let mut chars = without_blocks.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '<' {
            // A tag only if the next char can start one; otherwise escape
            match chars.peek() {
                Some(&n) if n.is_ascii_alphabetic() || n == '/' || n == '!' => {
                    for t in chars.by_ref() {
                        if t == '>' {
                            break;
                        }
                    }
                }
                _ => out.push_str("&lt;"),
            }
        } else if c == '>' {
            out.push_str("&gt;");
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

/// Remove `<tag ...>...</tag>` blocks, case-insensitively, content included.
///
/// Matching is done with ASCII-case-insensitive windows over the original
/// bytes; tag names are ASCII, and non-ASCII text must keep its exact byte
/// offsets.
fn strip_block(input: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(start) = find_ascii_ci(input, pos, &open) {
        out.push_str(&input[pos..start]);
        match find_ascii_ci(input, start, &close) {
            Some(end) => pos = end + close.len(),
            None => return out, // unterminated block: drop the rest
        }
    }
    out.push_str(&input[pos..]);
    out
}

/// Byte offset of the first ASCII-case-insensitive match of `needle` in
/// `haystack` at or after `from`. Offsets refer to `haystack` itself.
fn find_ascii_ci(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    let bytes = &haystack.as_bytes()[from..];
    let needle = needle.as_bytes();
    bytes
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_empty() {
        assert!(validate_required_text("", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Milk Tea", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn required_text_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn optional_text_allows_none() {
        assert!(validate_optional_text(&None, "description", MAX_NOTE_LEN).is_ok());
        let long = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_optional_text(&long, "description", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn sanitize_passes_plain_text() {
        assert_eq!(sanitize_text("Milk Tea"), "Milk Tea");
        assert_eq!(sanitize_text("50% sugar, no ice"), "50% sugar, no ice");
    }

    #[test]
    fn sanitize_strips_script_blocks() {
        assert_eq!(
            sanitize_text("Tea<script>alert('x')</script> House"),
            "Tea House"
        );
        assert_eq!(sanitize_text("<SCRIPT>evil()</SCRIPT>safe"), "safe");
        // unterminated block drops the remainder
        assert_eq!(sanitize_text("ok<script>alert(1)"), "ok");
    }

    #[test]
    fn sanitize_strips_tags_keeps_content() {
        assert_eq!(sanitize_text("<b>Bold</b> Tea"), "Bold Tea");
        assert_eq!(sanitize_text("a<img src=x onerror=evil()>b"), "ab");
    }

    #[test]
    fn sanitize_escapes_stray_angle_brackets() {
        assert_eq!(sanitize_text("1 < 2"), "1 &lt; 2");
        assert_eq!(sanitize_text("a > b"), "a &gt; b");
    }

    #[test]
    fn sanitize_handles_non_ascii_before_blocks() {
        // lowercase form of these chars has a different byte length, so
        // offsets must come from the original string
        assert_eq!(sanitize_text("ẞẞ<script>alert(1)</script>"), "ẞẞ");
        assert_eq!(sanitize_text("İİ<script>alert(1)</script>ok"), "İİok");
        assert_eq!(sanitize_text("日本茶<b>こうちゃ</b>"), "日本茶こうちゃ");
    }
}
