// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the frame classifier
//!
//! Defaults reproduce the reference AlexNet setup: 1000 ImageNet classes,
//! resize to 256 / crop to 227, ImageNet normalization, a 10000-frame window
//! for the accumulated traces and a 0.10 confidence threshold.

pub mod weights;

pub use weights::WeightSource;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use crate::classifier::errors::{ClassifierError, Result};

/// Output dimensionality of the ImageNet-1k network
pub const NUM_CLASSES: usize = 1000;

/// Window length for the accumulated probability sums
pub const BUFF_SIZE: usize = 10_000;

/// Top probability must exceed this for a label to be reported
pub const CONFIDENCE_THRESHOLD: f32 = 0.10;

/// Characters dropped from the front of a label (synset id plus separator)
pub const LABEL_PREFIX_LEN: usize = 10;

/// Placeholder returned when no class is confident enough
pub const NO_LABEL: &str = "-";

pub const RESIZE_SHORTER: u32 = 256;
pub const CROP_SIZE: u32 = 227;

/// ImageNet normalization mean values
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet normalization std values
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Binds a layer identifier to the graph output that carries its activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationTap {
    /// Layer identifier used to query the activation (e.g. "conv2")
    pub layer: String,
    /// Name of the ONNX graph output exposing the layer
    pub output: String,
    /// Flatten to one dimension when stored in the derived feature slots
    #[serde(default)]
    pub flatten: bool,
}

impl ActivationTap {
    pub fn new(layer: impl Into<String>, output: impl Into<String>, flatten: bool) -> Self {
        Self {
            layer: layer.into(),
            output: output.into(),
            flatten,
        }
    }
}

/// Default taps, in derived-slot order: conv2 (features[3]), pool5
/// (features[12]) and fc7 (classifier[2]).
pub fn default_taps() -> Vec<ActivationTap> {
    vec![
        ActivationTap::new("conv2", "conv2", true),
        ActivationTap::new("pool5", "pool5", true),
        ActivationTap::new("fc7", "fc7", false),
    ]
}

/// Frame classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Where the pretrained network comes from
    pub weights: WeightSource,
    /// Optional hex SHA-256 of the weight file
    pub weights_sha256: Option<String>,
    /// Label file, one label per line, ordered by class index
    pub labels_path: PathBuf,
    pub num_classes: usize,
    pub history_window: usize,
    pub confidence_threshold: f32,
    pub label_prefix_len: usize,
    pub resize_shorter: u32,
    pub crop_size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    /// Intermediate activations captured on every forward pass
    pub taps: Vec<ActivationTap>,
    /// Graph output holding the logits; first non-tap output when unset
    pub logits_output: Option<String>,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            weights: WeightSource::default(),
            weights_sha256: None,
            labels_path: PathBuf::from("../alexnet/synset_words.txt"),
            num_classes: NUM_CLASSES,
            history_window: BUFF_SIZE,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            label_prefix_len: LABEL_PREFIX_LEN,
            resize_shorter: RESIZE_SHORTER,
            crop_size: CROP_SIZE,
            mean: MEAN,
            std: STD,
            taps: default_taps(),
            logits_output: None,
            intra_threads: 4,
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| {
            ClassifierError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Defaults overlaid with `FRAME_CLASSIFIER_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `FRAME_CLASSIFIER_*` environment variables on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = env::var("FRAME_CLASSIFIER_MODEL_PATH") {
            self.weights = WeightSource::File {
                path: PathBuf::from(path),
            };
        }
        if let Ok(repo) = env::var("FRAME_CLASSIFIER_MODEL_REPO") {
            self.weights = WeightSource::Hub {
                repo,
                file: env::var("FRAME_CLASSIFIER_MODEL_FILE")
                    .unwrap_or_else(|_| weights::DEFAULT_HUB_FILE.to_string()),
                revision: env::var("FRAME_CLASSIFIER_MODEL_REVISION").ok(),
            };
        }
        if let Ok(digest) = env::var("FRAME_CLASSIFIER_MODEL_SHA256") {
            self.weights_sha256 = Some(digest);
        }
        if let Ok(path) = env::var("FRAME_CLASSIFIER_LABELS_PATH") {
            self.labels_path = PathBuf::from(path);
        }
        self.confidence_threshold = env::var("FRAME_CLASSIFIER_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.confidence_threshold);
        self.history_window = env::var("FRAME_CLASSIFIER_HISTORY_WINDOW")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.history_window);
        self.intra_threads = env::var("FRAME_CLASSIFIER_THREADS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.intra_threads);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.num_classes == 0 {
            return Err("num_classes must be greater than 0".to_string());
        }
        if self.history_window == 0 {
            return Err("history_window must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if self.resize_shorter == 0 || self.crop_size == 0 {
            return Err("resize_shorter and crop_size must be non-zero".to_string());
        }
        if self.crop_size > self.resize_shorter {
            return Err(format!(
                "crop_size {} exceeds resize_shorter {}",
                self.crop_size, self.resize_shorter
            ));
        }
        if self.std.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("std values must be positive".to_string());
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err("mean values must be finite".to_string());
        }
        if self.intra_threads == 0 {
            return Err("intra_threads must be greater than 0".to_string());
        }

        let mut layers = HashSet::new();
        for tap in &self.taps {
            if tap.layer.is_empty() || tap.output.is_empty() {
                return Err("activation taps need a layer and an output name".to_string());
            }
            if !layers.insert(tap.layer.as_str()) {
                return Err(format!("duplicate activation tap '{}'", tap.layer));
            }
        }
        if let Some(logits) = &self.logits_output {
            if self.taps.iter().any(|t| &t.output == logits) {
                return Err(format!("logits output '{}' is also a tap output", logits));
            }
        }

        if let Some(digest) = &self.weights_sha256 {
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err("weights_sha256 must be 64 hex characters".to_string());
            }
        }

        Ok(())
    }
}
