// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod classifier;
pub mod cli;
pub mod config;
pub mod vision;

pub use classifier::{
    Classifier, ClassifierError, ClassHistory, FrameError, FrameFeatures, LabelTable, Network,
    OnnxNetwork, Prediction,
};
pub use config::{ActivationTap, ClassifierConfig, WeightSource};
pub use vision::{Frame, PixelArray, Preprocessor};
