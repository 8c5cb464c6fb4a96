use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

// DNS hostname: one or more dot-terminated labels followed by a final label,
// each label 1-63 lowercase alphanumerics/hyphens with no edge hyphens.
static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9][a-z0-9-]{0,61}[a-z0-9]")
        .expect("hostname pattern is valid")
});

/// Extract all domain-like tokens from free text.
///
/// Input is lowercased before matching, so extraction is case-insensitive.
/// Tokens are returned deduplicated, in order of first appearance.
pub fn extract(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for m in HOSTNAME.find_iter(&lowered) {
        let token = m.as_str();
        if seen.insert(token.to_string()) {
            tokens.push(token.to_string());
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_hostnames_from_prose() {
        let tokens = extract("Main site is https://app.example.com/login, api at api.example.com.");
        assert_eq!(tokens, vec!["app.example.com", "api.example.com"]);
    }

    #[test]
    fn test_case_normalized() {
        let tokens = extract("WWW.Example.COM");
        assert_eq!(tokens, vec!["www.example.com"]);
    }

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let tokens = extract("b.example.com a.example.com b.example.com");
        assert_eq!(tokens, vec!["b.example.com", "a.example.com"]);
    }

    #[test]
    fn test_hyphenated_labels() {
        let tokens = extract("visit my-app.example-site.com today");
        assert_eq!(tokens, vec!["my-app.example-site.com"]);
    }

    #[test]
    fn test_no_match_in_plain_words() {
        assert!(extract("No targets here, just words").is_empty());
    }

    #[test]
    fn test_mobile_package_ids_match() {
        // Android package identifiers share the hostname shape.
        let tokens = extract("com.example.app on the Play Store");
        assert_eq!(tokens, vec!["com.example.app"]);
    }

    #[test]
    fn test_extraction_idempotence() {
        let tokens = extract("assets: foo.example.com, *.bar-baz.example.org, cdn.example.net");
        let rejoined = tokens.join(" ");
        assert_eq!(extract(&rejoined), tokens);
    }
}
