/// Counts how many distinct keywords occur as substrings of `text`.
///
/// `text` is expected to be normalized (lower-case). Keywords are compared
/// lower-cased, each contributes at most once however often it repeats, and
/// empty entries never match.
pub fn count_keyword_matches(text: &str, keywords: &[String]) -> u32 {
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .filter(|keyword| text.contains(keyword.to_lowercase().as_str()))
        .count() as u32
}

/// The keywords that matched, in list order. Used for explanations only.
pub fn matched_keywords<'a>(text: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .filter(|keyword| text.contains(keyword.to_lowercase().as_str()))
        .map(|keyword| keyword.as_str())
        .collect()
}
