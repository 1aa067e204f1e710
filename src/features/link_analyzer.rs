use regex::Regex;
use url::Url;

/// Finds link-shaped tokens in normalized text.
///
/// A link is, case-insensitively, the leftmost-first match, alternatives tried in order:
/// - `http://` or `https://` followed by a run of characters other than whitespace, `'` and `"`
/// - `www.` followed by the same run
/// - a bare domain: a run of `[a-z0-9.-]`, a dot, two or more letters, an optional `/`,
///   then the same run as above (e.g. `secure-login.com/verify`)
///
/// The bare-domain form deliberately also catches file names such as `report.pdf`;
/// the URL weight is calibrated against that behaviour.
pub struct LinkAnalyzer {
    url_regex: Regex,
    ip_regex: Regex,
}

impl Default for LinkAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkAnalyzer {
    pub fn new() -> Self {
        Self {
            url_regex: Regex::new(
                r#"(?i)https?://[^\s'"]+|www\.[^\s'"]+|[a-z0-9.-]+\.[a-z]{2,}/?[^\s'"]*"#,
            )
            .unwrap(),
            // Dotted quad right after `//`, or at the start / after whitespace with an optional port
            ip_regex: Regex::new(
                r"//[0-9]{1,3}(?:\.[0-9]{1,3}){3}|(?:^|\s)[0-9]{1,3}(?:\.[0-9]{1,3}){3}(?::[0-9]+)?",
            )
            .unwrap(),
        }
    }

    /// All links in order of first occurrence. Repeats are kept.
    pub fn extract_urls(&self, text: &str) -> Vec<String> {
        self.url_regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn contains_ip_domain(&self, url: &str) -> bool {
        self.ip_regex.is_match(url)
    }

    /// Host part of an extracted link, for reporting. Scheme-less links are read as http.
    pub fn extract_domain(&self, url: &str) -> Option<String> {
        let lower = url.to_lowercase();
        let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
            url.to_string()
        } else {
            format!("http://{}", url)
        };

        Url::parse(&candidate)
            .ok()?
            .host_str()
            .map(|h| h.to_lowercase())
    }
}
