// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Frame classifier
//!
//! Turns one frame into one label string and keeps rolling per-class
//! probability traces for an external consumer (e.g. a visualization loop).
//!
//! `classify` takes `&mut self`: one caller at a time. Sharing a classifier
//! between threads needs an external lock.

use ndarray::Array4;
use std::time::Instant;
use tracing::{debug, info};

use super::errors::{ClassifierError, Result};
use super::features::FrameFeatures;
use super::history::ClassHistory;
use super::labels::LabelTable;
use super::network::{Network, OnnxNetwork};
use super::postprocess::{argmax, softmax, Prediction};
use crate::config::{weights, ActivationTap, ClassifierConfig, NO_LABEL};
use crate::vision::{Frame, Preprocessor};

pub struct Classifier<N: Network = OnnxNetwork> {
    network: N,
    preprocessor: Preprocessor,
    labels: LabelTable,
    history: ClassHistory,
    features: Option<FrameFeatures>,
    last_prediction: Option<Prediction>,
    taps: Vec<ActivationTap>,
    config: ClassifierConfig,
}

impl<N: Network> std::fmt::Debug for Classifier<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("labels", &self.labels.len())
            .field("frames", &self.history.frames())
            .field("last_prediction", &self.last_prediction)
            .finish_non_exhaustive()
    }
}

impl Classifier<OnnxNetwork> {
    /// Load weights and labels and register the activation taps
    ///
    /// # Errors
    /// Returns error if:
    /// - The configuration is invalid
    /// - The weights cannot be resolved, fail the checksum or fail to load
    /// - The label file is missing or does not match the class count
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate().map_err(ClassifierError::Config)?;

        let weights_path = config.weights.resolve()?;
        if let Some(expected) = &config.weights_sha256 {
            weights::verify_sha256(&weights_path, expected)?;
        }

        let network = OnnxNetwork::load(
            &weights_path,
            config.taps.clone(),
            config.logits_output.clone(),
            config.intra_threads,
        )?;

        let labels = LabelTable::from_file(&config.labels_path, config.label_prefix_len)?;

        let classifier = Self::with_network(network, labels, config)?;
        info!("Successfully loaded classifier");
        Ok(classifier)
    }
}

impl<N: Network> Classifier<N> {
    /// Build around an already constructed network
    pub fn with_network(network: N, labels: LabelTable, config: ClassifierConfig) -> Result<Self> {
        config.validate().map_err(ClassifierError::Config)?;

        if labels.len() != config.num_classes {
            return Err(ClassifierError::LabelCountMismatch {
                expected: config.num_classes,
                actual: labels.len(),
            });
        }

        debug!(
            "Classifier ready: {} classes, window {}, taps {:?}",
            config.num_classes,
            config.history_window,
            config.taps.iter().map(|t| t.layer.as_str()).collect::<Vec<_>>()
        );

        Ok(Self {
            network,
            preprocessor: Preprocessor::from_config(&config),
            labels,
            history: ClassHistory::new(config.num_classes, config.history_window),
            features: None,
            last_prediction: None,
            taps: config.taps.clone(),
            config,
        })
    }

    /// Convert a frame into the batched, normalized network input
    pub fn preprocess(&self, frame: impl Into<Frame>) -> Result<Array4<f32>> {
        let image = frame.into().into_image()?;
        Ok(self.preprocessor.process(&image))
    }

    /// Classify one frame and record its probabilities
    ///
    /// Every class trace grows by one entry and the last-frame features are
    /// replaced. On error nothing is recorded.
    pub fn classify(&mut self, frame: impl Into<Frame>) -> Result<String> {
        let start = Instant::now();
        let input = self.preprocess(frame)?;

        let pass = self.network.forward(&input)?;
        if pass.logits.len() != self.config.num_classes {
            return Err(ClassifierError::LogitsMismatch {
                expected: self.config.num_classes,
                actual: pass.logits.len(),
            });
        }

        let probabilities = softmax(&pass.logits);
        let prediction = argmax(&probabilities).ok_or(ClassifierError::LogitsMismatch {
            expected: self.config.num_classes,
            actual: 0,
        })?;
        let label = self.label_for(&prediction);

        let features = FrameFeatures::build(&self.taps, pass.activations, &probabilities)?;

        let values: Vec<f32> = probabilities.to_vec();
        self.history.record(&values)?;
        self.features = Some(features);
        self.last_prediction = Some(prediction);

        debug!(
            "Frame {}: class {} p={:.4} -> '{}' ({} ms)",
            self.history.frames(),
            prediction.class_index,
            prediction.probability,
            label,
            start.elapsed().as_millis()
        );

        Ok(label)
    }

    /// Label reported for a prediction: the class name when the probability
    /// is strictly above the threshold, `"-"` otherwise
    pub fn label_for(&self, prediction: &Prediction) -> String {
        if !prediction.is_confident(self.config.confidence_threshold) {
            return NO_LABEL.to_string();
        }
        self.labels
            .display_name(prediction.class_index)
            .unwrap_or_else(|| NO_LABEL.to_string())
    }

    pub fn history(&self) -> &ClassHistory {
        &self.history
    }

    /// Features of the most recent frame
    pub fn features(&self) -> Option<&FrameFeatures> {
        self.features.as_ref()
    }

    pub fn last_prediction(&self) -> Option<Prediction> {
        self.last_prediction
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn frames_processed(&self) -> usize {
        self.history.frames()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn network(&self) -> &N {
        &self.network
    }
}
