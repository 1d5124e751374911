// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Features captured from the most recent frame
//!
//! Named activations are stored as the network produced them. The derived
//! slots hold one array per activation tap, in tap order (flattened when the
//! tap asks for it), followed by the probability vector in the last slot.
//! With the default taps: 0 = conv2, 1 = pool5, 2 = fc7, 3 = probabilities.

use ndarray::{Array1, ArrayD};
use std::collections::HashMap;

use super::errors::{ClassifierError, Result};
use crate::config::ActivationTap;

#[derive(Debug, Clone, PartialEq)]
pub struct FrameFeatures {
    activations: HashMap<String, ArrayD<f32>>,
    derived: Vec<ArrayD<f32>>,
}

impl FrameFeatures {
    /// Assemble features from captured activations and the probability vector
    ///
    /// Fails if a tap has no matching activation.
    pub fn build(
        taps: &[ActivationTap],
        mut activations: HashMap<String, ArrayD<f32>>,
        probabilities: &Array1<f32>,
    ) -> Result<Self> {
        let mut derived = Vec::with_capacity(taps.len() + 1);

        for tap in taps {
            let activation =
                activations
                    .get(&tap.layer)
                    .ok_or_else(|| ClassifierError::MissingActivation {
                        layer: tap.layer.clone(),
                        output: tap.output.clone(),
                    })?;

            derived.push(if tap.flatten {
                flatten(activation)
            } else {
                activation.clone()
            });
        }
        derived.push(probabilities.clone().into_dyn());

        activations.retain(|name, _| taps.iter().any(|t| &t.layer == name));

        Ok(Self {
            activations,
            derived,
        })
    }

    /// Activation captured for a layer identifier
    pub fn activation(&self, layer: &str) -> Option<&ArrayD<f32>> {
        self.activations.get(layer)
    }

    pub fn activations(&self) -> &HashMap<String, ArrayD<f32>> {
        &self.activations
    }

    /// Positional derived array
    pub fn derived(&self, slot: usize) -> Option<&ArrayD<f32>> {
        self.derived.get(slot)
    }

    pub fn derived_len(&self) -> usize {
        self.derived.len()
    }

    /// Probability vector of the frame (last derived slot)
    pub fn probabilities(&self) -> &ArrayD<f32> {
        &self.derived[self.derived.len() - 1]
    }
}

fn flatten(array: &ArrayD<f32>) -> ArrayD<f32> {
    Array1::from_iter(array.iter().copied()).into_dyn()
}
