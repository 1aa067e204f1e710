use regex::Regex;

/// Canonical form of a message body used by every text feature.
///
/// Grammar of the rewrites, applied in order:
/// 1. markup tag: `<` then any run of non-`>` characters then `>`, replaced by a space
/// 2. whitespace run (Unicode whitespace or U+FEFF, length >= 1), replaced by one space, then trimmed
/// 3. lower-casing
/// 4. `!!+` becomes `!`, `??+` becomes `?`
pub struct TextNormalizer {
    tag_regex: Regex,
    whitespace_regex: Regex,
    exclamation_regex: Regex,
    question_regex: Regex,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            tag_regex: Regex::new(r"<[^>]*>").unwrap(),
            whitespace_regex: Regex::new(r"[\s\x{FEFF}]+").unwrap(),
            exclamation_regex: Regex::new(r"!{2,}").unwrap(),
            question_regex: Regex::new(r"\?{2,}").unwrap(),
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let stripped = self.tag_regex.replace_all(text, " ");
        let collapsed = self.whitespace_regex.replace_all(&stripped, " ");
        let lowered = collapsed.trim_matches(is_space).to_lowercase();

        // Punctuation survives normalization, only runs are squeezed
        let squeezed = self.exclamation_regex.replace_all(&lowered, "!");
        self.question_regex.replace_all(&squeezed, "?").into_owned()
    }
}

// A byte order mark counts as whitespace, as it does for browser text
fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_strips_markup() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("<p>Hello<br/>World</p>"),
            "hello world"
        );
        assert_eq!(
            normalizer.normalize(r#"<a href="http://x.io">Click</a> here"#),
            "click here"
        );
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("  Dear\t\tcustomer,\r\n\r\n  thanks  "),
            "dear customer, thanks"
        );
    }

    #[test]
    fn test_byte_order_mark_is_whitespace() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("\u{FEFF}Hello\u{FEFF}\u{FEFF}World\u{FEFF}"),
            "hello world"
        );
        assert_eq!(normalizer.normalize("\u{FEFF}"), "");
    }

    #[test]
    fn test_squeezes_repeated_punctuation() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("Act NOW!!!"), "act now!");
        assert_eq!(normalizer.normalize("Really???"), "really?");
        assert_eq!(normalizer.normalize("What?!?!"), "what?!?!");
        assert_eq!(normalizer.normalize("Hi!"), "hi!");
    }

    #[test]
    fn test_unclosed_tag_is_kept() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("a < b"), "a < b");
    }
}
