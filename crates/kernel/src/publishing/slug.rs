//! URL slug generation and checking.

use std::sync::LazyLock;

use regex::Regex;

/// Slug pattern: lowercase ASCII letters, digits and CJK ideographs in
/// hyphen-separated runs.
#[allow(clippy::expect_used)]
static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9\x{4E00}-\x{9FFF}]+(-[a-z0-9\x{4E00}-\x{9FFF}]+)*$")
        .expect("valid regex literal")
});

/// CJK unified ideographs block.
fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Convert a title into a URL-safe slug.
///
/// Lowercases, drops everything except ASCII letters/digits, CJK ideographs,
/// whitespace and hyphens, turns whitespace runs into hyphens, collapses
/// repeated hyphens and trims hyphens from both ends. Titles with nothing
/// usable left produce an empty string, which the publishing validator
/// reports as a missing slug.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();

    let mut result = String::with_capacity(lowered.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in lowered.trim().chars() {
        if c.is_ascii_alphanumeric() || is_cjk(c) {
            result.push(c);
            prev_was_hyphen = false;
        } else if c == '-' || c.is_whitespace() {
            if !prev_was_hyphen {
                result.push('-');
            }
            prev_was_hyphen = true;
        }
    }

    // Trim trailing hyphen
    while result.ends_with('-') {
        result.pop();
    }

    result
}

/// Check a slug against the slug pattern.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn basic_titles() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(generate_slug("Already-hyphenated--twice"), "already-hyphenated-twice");
        assert_eq!(generate_slug("HSK 3: Complements!"), "hsk-3-complements");
    }

    #[test]
    fn keeps_cjk_and_drops_punctuation() {
        let slug = generate_slug("使用 是 (shì)");
        assert_eq!(slug, "使用-是-sh");
        assert!(!slug.contains('('));
        assert!(!slug.contains(')'));
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn stripped_characters_do_not_leave_double_hyphens() {
        assert_eq!(generate_slug("a - (b) - c"), "a-b-c");
        assert_eq!(generate_slug("-- a --"), "a");
    }

    #[test]
    fn empty_and_unusable_titles() {
        assert_eq!(generate_slug(""), "");
        assert_eq!(generate_slug("   "), "");
        assert_eq!(generate_slug("!!! ??? ()"), "");
        assert_eq!(generate_slug("こんにちは"), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "Hello World",
            "使用 是 (shì)",
            "  --Mixed  CASE--  ",
            "Ünïcödé accents",
            "tab\tand\nnewline",
            "",
            "a-b-c",
        ];
        for sample in samples {
            let once = generate_slug(sample);
            assert_eq!(generate_slug(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn generated_slugs_match_pattern() {
        for sample in ["Hello World", "使用 是 (shì)", "Chest pain 胸痛 triage"] {
            assert!(is_valid_slug(&generate_slug(sample)));
        }
    }

    #[test]
    fn pattern_rejects_bad_slugs() {
        assert!(is_valid_slug("a-b"));
        assert!(is_valid_slug("胸痛"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("A-b"));
        assert!(!is_valid_slug("a--b"));
        assert!(!is_valid_slug("-a"));
        assert!(!is_valid_slug("a-"));
        assert!(!is_valid_slug("a b"));
        assert!(!is_valid_slug("a_b"));
    }
}
