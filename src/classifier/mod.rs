// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AlexNet frame classification
//!
//! - `model`: the `Classifier` (preprocess, forward, label, record)
//! - `network`: forward-pass backends (ONNX Runtime)
//! - `history`: rolling per-class probability traces
//! - `features`: activations captured from the last frame

pub mod errors;
pub mod features;
pub mod history;
pub mod labels;
pub mod model;
pub mod network;
pub mod postprocess;

pub use errors::{ClassifierError, FrameError, Result};
pub use features::FrameFeatures;
pub use history::ClassHistory;
pub use labels::{strip_label, LabelTable};
pub use model::Classifier;
pub use network::{ForwardPass, Network, OnnxNetwork};
pub use postprocess::{argmax, softmax, Prediction};
