use crate::config::ScoringWeights;
use crate::features::FeatureVector;

pub const MIN_PROBABILITY: f64 = 1e-6;
pub const MAX_PROBABILITY: f64 = 1.0 - 1e-6;

/// Weighted sum of the features, before the calibration offset.
pub fn aggregate(features: &FeatureVector, weights: &ScoringWeights) -> f64 {
    contributions(features, weights)
        .iter()
        .map(|(_, value)| value)
        .sum()
}

/// Per-feature terms of the logit, in a fixed order.
pub fn contributions(features: &FeatureVector, weights: &ScoringWeights) -> Vec<(&'static str, f64)> {
    vec![
        (
            "keywords",
            weights.keyword * (1.0 + features.keyword_matches as f64).ln(),
        ),
        (
            "credentials",
            weights.credential * features.credential_matches as f64,
        ),
        ("urls", weights.url * features.url_count as f64),
        (
            "ip_in_url",
            if features.ip_in_url {
                weights.ip_in_url
            } else {
                0.0
            },
        ),
        (
            "exclamations",
            weights.exclamation * (1.0 + features.exclaim_count as f64).ln(),
        ),
        ("all_caps", weights.all_caps * features.all_caps_ratio),
        ("length", weights.length * features.normalized_length),
    ]
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Maps a logit to a probability kept strictly away from 0 and 1.
pub fn to_probability(logit: f64, weights: &ScoringWeights) -> f64 {
    sigmoid(logit - weights.offset).clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

pub fn score(features: &FeatureVector, weights: &ScoringWeights) -> f64 {
    to_probability(aggregate(features, weights), weights)
}
