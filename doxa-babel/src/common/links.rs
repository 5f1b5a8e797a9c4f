//! Link classification and normalization.
//!
//! Three kinds of link targets are distinguished:
//! - external: carries a URL scheme (`https://…`, `mailto:…`)
//! - internal: a fragment within the current document (`#section`)
//! - local: a relative reference to another document (`guide.html#install`)

use crate::common::ids::{encode_id, is_valid_id};
use crate::diagnostics::Diagnostics;
use url::Url;

/// Diagnostic key used when a link fragment had to be rewritten.
pub const INVALID_FRAGMENT: &str = "invalid-link-fragment";

pub fn is_external_link(link: &str) -> bool {
    match Url::parse(link) {
        // Single letter schemes are Windows drive letters, not URLs.
        Ok(url) => url.scheme().len() > 1,
        Err(_) => false,
    }
}

pub fn is_internal_link(link: &str) -> bool {
    link.starts_with('#')
}

pub fn is_local_link(link: &str) -> bool {
    if is_external_link(link) || is_internal_link(link) {
        return false;
    }
    let path = link.split('#').next().unwrap_or(link);
    path.contains('/') || path.contains('.')
}

/// Normalizes a link target written in a source document.
///
/// Scheme-less targets that do not look like document paths are treated as internal
/// and get a `#` prefix. Fragments that are not valid identifiers are encoded, and the
/// rewrite is reported to `diagnostics`.
pub fn normalize_link(target: &str, diagnostics: &mut Diagnostics) -> String {
    let target = target.trim();
    if target.is_empty() || is_external_link(target) {
        return target.to_string();
    }

    if let Some(fragment) = target.strip_prefix('#') {
        return format!("#{}", checked_fragment(target, fragment, diagnostics));
    }

    if is_local_link(target) {
        return match target.split_once('#') {
            Some((path, fragment)) => {
                format!("{path}#{}", checked_fragment(target, fragment, diagnostics))
            }
            None => target.to_string(),
        };
    }

    format!("#{}", checked_fragment(target, target, diagnostics))
}

fn checked_fragment(link: &str, fragment: &str, diagnostics: &mut Diagnostics) -> String {
    if is_valid_id(fragment) {
        return fragment.to_string();
    }
    match encode_id(fragment) {
        Some(encoded) => {
            diagnostics.warn(
                INVALID_FRAGMENT,
                format!("Modified invalid link '{link}' to fragment '{encoded}'"),
            );
            encoded
        }
        None => fragment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(is_external_link("https://example.org/x"));
        assert!(is_external_link("mailto:dev@example.org"));
        assert!(!is_external_link("C:\\docs\\file.apt"));
        assert!(!is_external_link("guide.html"));
        assert!(is_internal_link("#top"));
        assert!(is_local_link("guide.html#install"));
        assert!(is_local_link("../index"));
        assert!(!is_local_link("Overview"));
    }

    #[test]
    fn normalization() {
        let mut diagnostics = Diagnostics::new(false);
        assert_eq!(normalize_link("Overview", &mut diagnostics), "#Overview");
        assert_eq!(normalize_link("#top", &mut diagnostics), "#top");
        assert_eq!(
            normalize_link("https://example.org", &mut diagnostics),
            "https://example.org"
        );
        assert_eq!(
            normalize_link("guide.html#install", &mut diagnostics),
            "guide.html#install"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn invalid_fragments_are_encoded_and_reported() {
        let mut diagnostics = Diagnostics::new(false);
        assert_eq!(
            normalize_link("Getting Started", &mut diagnostics),
            "#Getting_Started"
        );
        assert_eq!(
            normalize_link("guide.html#1 install", &mut diagnostics),
            "guide.html#a1_install"
        );
        assert_eq!(diagnostics.messages(INVALID_FRAGMENT).len(), 2);
    }
}
