/// Share of upper-case ASCII letters among all ASCII letters of the raw text.
/// Must see the text before lower-casing. Zero when there are no letters.
pub fn all_caps_ratio(raw: &str) -> f64 {
    let mut letters = 0usize;
    let mut upper = 0usize;

    for c in raw.chars().filter(|c| c.is_ascii_alphabetic()) {
        letters += 1;
        if c.is_ascii_uppercase() {
            upper += 1;
        }
    }

    if letters == 0 {
        return 0.0;
    }
    upper as f64 / letters as f64
}

/// Exclamation marks left after normalization squeezed the runs.
pub fn exclamation_count(normalized: &str) -> u32 {
    normalized.chars().filter(|&c| c == '!').count() as u32
}

/// Raw length in UTF-16 code units, saturated at `cap` and scaled to [0, 1].
/// Characters outside the BMP count twice, as in browser string lengths.
pub fn normalized_length(raw: &str, cap: usize) -> f64 {
    if cap == 0 {
        return 0.0;
    }
    raw.encode_utf16().count().min(cap) as f64 / cap as f64
}
