pub mod config;
pub mod detector;
pub mod features;
pub mod message;
pub mod normalization;
pub mod predictor;
pub mod scoring;

pub use config::{ScorerConfig, ScoringWeights};
pub use detector::{DetectOptions, Label, PhishingDetector, Verdict, VerdictSource};
pub use features::{FeatureEngine, FeatureVector};
pub use predictor::{CommandPredictor, ExternalPredictor, TimeoutPredictor};
