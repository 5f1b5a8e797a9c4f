//! Identifier validation and encoding for anchor names and link fragments.

/// Whether `id` can be used verbatim as an anchor name: an ASCII letter followed by
/// ASCII letters, digits, `-`, `_`, `.` or `:`.
pub fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(is_id_char),
        _ => false,
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

/// Turns arbitrary text into a valid identifier.
///
/// Whitespace becomes `_`, other invalid characters become `.XX` per UTF-8 byte, and an
/// `a` is prepended when the result would not start with a letter. Returns `None` for
/// blank input. Valid identifiers are returned unchanged.
pub fn encode_id(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_valid_id(trimmed) {
        return Some(trimmed.to_string());
    }

    let mut out = String::with_capacity(trimmed.len() + 1);
    for c in trimmed.chars() {
        if c.is_whitespace() {
            out.push('_');
        } else if is_id_char(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!(".{byte:02X}"));
            }
        }
    }
    if !out.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.insert(0, 'a');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(is_valid_id("section-1.2"));
        assert!(is_valid_id("a:b_c"));
        assert!(!is_valid_id("1abc"));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id(""));
    }

    #[test]
    fn encoding() {
        assert_eq!(encode_id("Getting Started").as_deref(), Some("Getting_Started"));
        assert_eq!(encode_id("  valid  ").as_deref(), Some("valid"));
        assert_eq!(encode_id("1. Intro").as_deref(), Some("a1._Intro"));
        assert_eq!(encode_id("a&b").as_deref(), Some("a.26b"));
        assert_eq!(encode_id("é").as_deref(), Some("a.C3.A9"));
        assert_eq!(encode_id("   "), None);
    }

    #[test]
    fn encoded_ids_are_valid() {
        for text in ["x y", "#frag", "?", "Ünïcode title", "_under"] {
            let id = encode_id(text).unwrap();
            assert!(is_valid_id(&id), "{id} should be valid");
        }
    }
}
