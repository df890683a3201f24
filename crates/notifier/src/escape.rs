//! Markup neutralisation for user-controlled text.
//!
//! Slack treats `<`, `>` and `&` as control characters, so every interpolated
//! string goes through [`escape_html`] before it reaches a message. Quotes are
//! left alone, and an `&` that already starts a valid entity reference is kept
//! as-is so text escaped upstream is not escaped twice.

/// Escape `&`, `<` and `>` as HTML entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, ch) in input.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if starts_entity(&input[i + 1..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            c => out.push(c),
        }
    }
    out
}

/// Decode raw bytes as UTF-8, silently dropping invalid sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// `rest` is the text right after an `&`.
fn starts_entity(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let body = &rest[..end];

    if let Some(numeric) = body.strip_prefix('#') {
        return match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => {
                !hex.is_empty() && hex.len() <= 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
            }
            None => {
                !numeric.is_empty()
                    && numeric.len() <= 7
                    && numeric.chars().all(|c| c.is_ascii_digit())
            }
        };
    }

    let mut chars = body.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            body.len() <= 32 && chars.all(|c| c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_tags() {
        assert_eq!(escape_html("<b>hi</b>"), "&lt;b&gt;hi&lt;/b&gt;");
    }

    #[test]
    fn test_leaves_quotes_literal() {
        assert_eq!(escape_html(r#"say "hi" it's"#), r#"say "hi" it's"#);
    }

    #[test]
    fn test_bare_ampersand_escaped() {
        assert_eq!(escape_html("R&D"), "R&amp;D");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("trailing &"), "trailing &amp;");
    }

    #[test]
    fn test_existing_entities_not_double_escaped() {
        assert_eq!(escape_html("Tom &amp; Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_html("&#169; &#xA9;"), "&#169; &#xA9;");
        assert_eq!(escape_html("&not an entity;"), "&amp;not an entity;");
    }

    #[test]
    fn test_slack_link_syntax_neutralised() {
        assert_eq!(
            escape_html("<https://evil.example|click>"),
            "&lt;https://evil.example|click&gt;"
        );
    }

    #[test]
    fn test_decode_lossy_drops_invalid_bytes() {
        let bytes = b"caf\xc3\xa9 \xff\xfeok";
        assert_eq!(decode_lossy(bytes), "café ok");
    }
}
