// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Logit post-processing: softmax, arg-max and the label decision

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Top class of one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class index (0-based)
    pub class_index: usize,
    /// Softmax probability of that class
    pub probability: f32,
}

impl Prediction {
    pub fn new(class_index: usize, probability: f32) -> Self {
        Self {
            class_index,
            probability,
        }
    }

    /// Strictly above `threshold`
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.probability > threshold
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Array1<f32> {
    let max_val = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp_vals: Array1<f32> = logits.iter().map(|&x| (x - max_val).exp()).collect();
    let sum_exp: f32 = exp_vals.sum();
    exp_vals.mapv(|v| v / sum_exp)
}

/// Index and value of the maximum; the first index wins ties
pub fn argmax(values: &Array1<f32>) -> Option<Prediction> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<Prediction>, (i, &val)| match best {
            Some(b) if b.probability >= val => Some(b),
            _ => Some(Prediction::new(i, val)),
        })
}
