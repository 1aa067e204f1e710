pub mod emphasis;
pub mod keyword_matcher;
pub mod link_analyzer;

use crate::config::ScorerConfig;
use crate::normalization::TextNormalizer;
use link_analyzer::LinkAnalyzer;
use serde::{Deserialize, Serialize};

/// Signals measured on one message. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub keyword_matches: u32,
    pub credential_matches: u32,
    pub url_count: u32,
    pub ip_in_url: bool,
    pub exclaim_count: u32,
    pub all_caps_ratio: f64,
    pub normalized_length: f64,
}

/// Links found in a message together with their hosts, for explanations.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedLink {
    pub url: String,
    pub domain: Option<String>,
    pub ip_literal: bool,
}

pub struct FeatureEngine {
    normalizer: TextNormalizer,
    link_analyzer: LinkAnalyzer,
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureEngine {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            link_analyzer: LinkAnalyzer::new(),
        }
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    pub fn extract(&self, raw: &str, config: &ScorerConfig) -> FeatureVector {
        let normalized = self.normalizer.normalize(raw);
        let urls = self.link_analyzer.extract_urls(&normalized);

        FeatureVector {
            keyword_matches: keyword_matcher::count_keyword_matches(
                &normalized,
                &config.suspicious_keywords,
            ),
            credential_matches: keyword_matcher::count_keyword_matches(
                &normalized,
                &config.credential_keywords,
            ),
            url_count: urls.len() as u32,
            ip_in_url: urls
                .iter()
                .any(|u| self.link_analyzer.contains_ip_domain(u)),
            exclaim_count: emphasis::exclamation_count(&normalized),
            // Case only exists in the raw text
            all_caps_ratio: emphasis::all_caps_ratio(raw),
            normalized_length: emphasis::normalized_length(raw, config.weights.length_cap),
        }
    }

    pub fn extract_links(&self, raw: &str) -> Vec<ExtractedLink> {
        let normalized = self.normalizer.normalize(raw);
        self.link_analyzer
            .extract_urls(&normalized)
            .into_iter()
            .map(|url| ExtractedLink {
                domain: self.link_analyzer.extract_domain(&url),
                ip_literal: self.link_analyzer.contains_ip_domain(&url),
                url,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHISHING_SAMPLE: &str = "URGENT: verify your password now at http://192.168.1.5/login!!! Your account will be suspended.";

    #[test]
    fn test_phishing_sample_features() {
        let engine = FeatureEngine::new();
        let features = engine.extract(PHISHING_SAMPLE, &ScorerConfig::default());

        // verify, account, login, password, urgent, suspend
        assert_eq!(features.keyword_matches, 6);
        assert_eq!(features.credential_matches, 1);
        assert_eq!(features.url_count, 1);
        assert!(features.ip_in_url);
        assert_eq!(features.exclaim_count, 1);
        assert!((features.all_caps_ratio - 7.0 / 64.0).abs() < 1e-12);
        assert!((features.normalized_length - 0.095).abs() < 1e-12);
    }

    #[test]
    fn test_benign_sample_features() {
        let engine = FeatureEngine::new();
        let features = engine.extract(
            "Hi team, lunch moved to 1pm tomorrow.",
            &ScorerConfig::default(),
        );

        assert_eq!(features.keyword_matches, 0);
        assert_eq!(features.credential_matches, 0);
        assert_eq!(features.url_count, 0);
        assert!(!features.ip_in_url);
        assert_eq!(features.exclaim_count, 0);
    }

    #[test]
    fn test_markup_does_not_count_as_links() {
        let engine = FeatureEngine::new();
        let features = engine.extract(
            "<div class=\"x\"><b>Hello</b></div>",
            &ScorerConfig::default(),
        );
        assert_eq!(features.url_count, 0);
    }

    #[test]
    fn test_empty_keyword_lists_zero_out() {
        let engine = FeatureEngine::new();
        let config = ScorerConfig {
            suspicious_keywords: Vec::new(),
            credential_keywords: Vec::new(),
            ..Default::default()
        };
        let features = engine.extract(PHISHING_SAMPLE, &config);
        assert_eq!(features.keyword_matches, 0);
        assert_eq!(features.credential_matches, 0);
    }

    #[test]
    fn test_extract_links() {
        let engine = FeatureEngine::new();
        let links = engine.extract_links(PHISHING_SAMPLE);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "http://192.168.1.5/login!");
        assert_eq!(links[0].domain.as_deref(), Some("192.168.1.5"));
        assert!(links[0].ip_literal);
    }
}
