use serde::{Deserialize, Serialize};

/// Scorer configuration. Every field falls back to its default when absent
/// from the YAML file, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub threshold: f64,
    pub suspicious_keywords: Vec<String>,
    pub credential_keywords: Vec<String>,
    pub weights: ScoringWeights,
}

/// Weights of the linear model. The defaults are the calibrated constants;
/// overriding them changes every score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub keyword: f64,
    pub credential: f64,
    pub url: f64,
    pub ip_in_url: f64,
    pub exclamation: f64,
    pub all_caps: f64,
    pub length: f64,
    /// Subtracted from the logit before the sigmoid.
    pub offset: f64,
    /// Character count at which the length feature saturates.
    pub length_cap: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword: 0.9,
            credential: 1.2,
            url: 0.8,
            ip_in_url: 1.5,
            exclamation: 0.2,
            all_caps: 0.9,
            length: 0.05,
            offset: 1.5,
            length_cap: 1000,
        }
    }
}

pub const DEFAULT_THRESHOLD: f64 = 0.5;

pub fn default_suspicious_keywords() -> Vec<String> {
    [
        "verify",
        "account",
        "login",
        "password",
        "secure",
        "update",
        "confirm",
        "urgent",
        "immediately",
        "click",
        "link",
        "bank",
        "paypal",
        "amazon",
        "invoice",
        "billing",
        "suspend",
        "reactivate",
        "winner",
        "congratulations",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_credential_keywords() -> Vec<String> {
    ["password", "pin", "ssn", "security code", "cvv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            suspicious_keywords: default_suspicious_keywords(),
            credential_keywords: default_credential_keywords(),
            weights: ScoringWeights::default(),
        }
    }
}

impl ScorerConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScorerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScorerConfig::default();
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.suspicious_keywords.len(), 20);
        assert_eq!(config.credential_keywords.len(), 5);
        assert!(config
            .credential_keywords
            .contains(&"security code".to_string()));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
threshold: 0.7
credential_keywords:
  - "password"
  - "iban"
weights:
  url: 1.0
"#;
        let config: ScorerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.credential_keywords, vec!["password", "iban"]);
        assert_eq!(config.suspicious_keywords, default_suspicious_keywords());
        assert_eq!(config.weights.url, 1.0);
        assert_eq!(config.weights.ip_in_url, 1.5);
        assert_eq!(config.weights.length_cap, 1000);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "phish-scorer-config-{}.yaml",
            std::process::id()
        ));
        let path = path.to_string_lossy().to_string();

        let mut config = ScorerConfig::default();
        config.threshold = 0.42;
        config.to_file(&path).unwrap();

        let loaded = ScorerConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(ScorerConfig::from_file("/nonexistent/phish-scorer.yaml").is_err());
    }
}
