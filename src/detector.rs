use crate::config::{ScorerConfig, ScoringWeights};
use crate::features::{FeatureEngine, FeatureVector};
use crate::predictor::{coerce_probability, ExternalPredictor};
use crate::scoring;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Phishing,
    Legitimate,
}

/// Which path produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    InvalidInput,
    External,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub label: Label,
    /// Within [1e-6, 1 - 1e-6] on the heuristic path, [0, 1] on the external
    /// path, and exactly 0.0 for missing input.
    pub probability: f64,
    /// Present only when the heuristic decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_details: Option<FeatureVector>,
    pub source: VerdictSource,
}

impl Verdict {
    fn decide(
        probability: f64,
        threshold: f64,
        feature_details: Option<FeatureVector>,
        source: VerdictSource,
    ) -> Self {
        let label = if probability >= threshold {
            Label::Phishing
        } else {
            Label::Legitimate
        };

        Self {
            label,
            probability,
            feature_details,
            source,
        }
    }

    /// Fixed answer for missing or empty text. Not a probability estimate.
    pub fn invalid_input() -> Self {
        Self {
            label: Label::Legitimate,
            probability: 0.0,
            feature_details: None,
            source: VerdictSource::InvalidInput,
        }
    }

    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }

    /// Logit terms behind a heuristic verdict; empty for other sources.
    pub fn contributions(&self, weights: &ScoringWeights) -> Vec<(&'static str, f64)> {
        self.feature_details
            .as_ref()
            .map(|features| scoring::contributions(features, weights))
            .unwrap_or_default()
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectOptions {
    pub threshold: Option<f64>,
    pub use_external_model: bool,
}

impl DetectOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_external_model(mut self) -> Self {
        self.use_external_model = true;
        self
    }
}

/// Scores free text for phishing.
///
/// Each instance owns its configuration, so detectors with different
/// thresholds or keyword lists can coexist. Setters take `&self` and are
/// safe to call while other tasks are inside [`PhishingDetector::detect`];
/// a call in flight keeps the threshold it started with.
pub struct PhishingDetector {
    config: RwLock<ScorerConfig>,
    external: RwLock<Option<Arc<dyn ExternalPredictor>>>,
    features: FeatureEngine,
}

impl Default for PhishingDetector {
    fn default() -> Self {
        Self::new(ScorerConfig::default())
    }
}

impl PhishingDetector {
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            config: RwLock::new(config),
            external: RwLock::new(None),
            features: FeatureEngine::new(),
        }
    }

    // Configuration is plain data, so a poisoned lock still holds a usable value
    fn read_config(&self) -> RwLockReadGuard<'_, ScorerConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, ScorerConfig> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn config(&self) -> ScorerConfig {
        self.read_config().clone()
    }

    pub fn threshold(&self) -> f64 {
        self.read_config().threshold
    }

    /// Any value is accepted; outside [0, 1] one label simply becomes unreachable.
    pub fn set_threshold(&self, threshold: f64) {
        log::info!("Default threshold set to {}", threshold);
        self.write_config().threshold = threshold;
    }

    pub fn set_suspicious_keywords(&self, keywords: Vec<String>) {
        log::info!("Loaded {} suspicious keywords", keywords.len());
        self.write_config().suspicious_keywords = keywords;
    }

    pub fn set_credential_keywords(&self, keywords: Vec<String>) {
        log::info!("Loaded {} credential keywords", keywords.len());
        self.write_config().credential_keywords = keywords;
    }

    pub fn set_weights(&self, weights: ScoringWeights) {
        log::info!("Scoring weights replaced");
        self.write_config().weights = weights;
    }

    pub fn set_external_predictor(&self, predictor: Arc<dyn ExternalPredictor>) {
        log::info!("External predictor '{}' attached", predictor.name());
        *self.external.write().unwrap_or_else(|e| e.into_inner()) = Some(predictor);
    }

    pub fn clear_external_predictor(&self) {
        *self.external.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn has_external_predictor(&self) -> bool {
        self.external_predictor().is_some()
    }

    fn external_predictor(&self) -> Option<Arc<dyn ExternalPredictor>> {
        self.external
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Classifies `text`. `None` or empty text yields [`Verdict::invalid_input`].
    ///
    /// With `use_external_model` and a predictor attached, the predictor's
    /// answer wins; if it fails, the heuristic result is returned exactly as
    /// if the predictor had not been asked. Never fails.
    pub async fn detect(&self, text: Option<&str>, options: &DetectOptions) -> Verdict {
        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ => {
                log::debug!("No text to score, returning fixed legitimate verdict");
                return Verdict::invalid_input();
            }
        };

        let threshold = options.threshold.unwrap_or_else(|| self.threshold());

        if options.use_external_model {
            if let Some(predictor) = self.external_predictor() {
                match predictor.predict(text).await {
                    Ok(raw) => {
                        let probability = coerce_probability(raw);
                        log::debug!(
                            "External predictor '{}' returned {} (coerced {})",
                            predictor.name(),
                            raw,
                            probability
                        );
                        return Verdict::decide(
                            probability,
                            threshold,
                            None,
                            VerdictSource::External,
                        );
                    }
                    Err(e) => {
                        log::warn!(
                            "External predictor '{}' failed, falling back to heuristic: {:#}",
                            predictor.name(),
                            e
                        );
                    }
                }
            } else {
                log::debug!("External model requested but no predictor is attached");
            }
        }

        self.detect_heuristic(text, threshold)
    }

    /// Heuristic path only. Never suspends.
    pub fn detect_heuristic(&self, text: &str, threshold: f64) -> Verdict {
        let config = self.read_config();
        let features = self.features.extract(text, &config);
        let probability = scoring::score(&features, &config.weights);

        log::debug!(
            "Heuristic score {:.6} (threshold {}) from {:?}",
            probability,
            threshold,
            features
        );

        Verdict::decide(
            probability,
            threshold,
            Some(features),
            VerdictSource::Heuristic,
        )
    }

    pub fn feature_engine(&self) -> &FeatureEngine {
        &self.features
    }
}
