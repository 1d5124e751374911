// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Network backends
//!
//! A forward pass returns the logits together with every tapped activation,
//! keyed by layer identifier. The ONNX backend reads activations from extra
//! graph outputs, so the exported model must list the tapped layers among
//! its outputs (e.g. `conv2`, `pool5`, `fc7` next to the logits).

use anyhow::Context;
use ndarray::{Array4, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::errors::{ClassifierError, Result};
use crate::config::ActivationTap;

/// Output of one forward pass
#[derive(Debug, Clone, Default)]
pub struct ForwardPass {
    /// Raw class scores, one per class
    pub logits: Vec<f32>,
    /// Captured activations by layer identifier
    pub activations: HashMap<String, ArrayD<f32>>,
}

/// Inference-only network
///
/// Implementations must not update parameters or keep state that changes
/// the output for a given input.
pub trait Network {
    /// Evaluate one batched `[1, 3, H, W]` input
    fn forward(&mut self, input: &Array4<f32>) -> Result<ForwardPass>;
}

impl<N: Network + ?Sized> Network for Box<N> {
    fn forward(&mut self, input: &Array4<f32>) -> Result<ForwardPass> {
        (**self).forward(input)
    }
}

/// ONNX Runtime network on the CPU execution provider
pub struct OnnxNetwork {
    session: Session,
    input_name: String,
    logits_output: String,
    taps: Vec<ActivationTap>,
}

impl std::fmt::Debug for OnnxNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxNetwork")
            .field("input_name", &self.input_name)
            .field("logits_output", &self.logits_output)
            .field("taps", &self.taps)
            .finish_non_exhaustive()
    }
}

impl OnnxNetwork {
    /// Load an ONNX graph and bind the activation taps to its outputs
    ///
    /// # Errors
    /// Returns error if:
    /// - The model file does not exist
    /// - ONNX Runtime fails to build the session
    /// - A tap output or the logits output is missing from the graph
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        taps: Vec<ActivationTap>,
        logits_output: Option<String>,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(ClassifierError::WeightsNotFound(model_path.to_path_buf()));
        }

        info!("Loading classification network from {}", model_path.display());

        let session = build_session(model_path, intra_threads)
            .map_err(|e| ClassifierError::Model(format!("{:#}", e)))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ClassifierError::Model("Network has no inputs".to_string()))?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        debug!("Network outputs: {:?}", output_names);

        for tap in &taps {
            if !output_names.contains(&tap.output) {
                return Err(ClassifierError::MissingActivation {
                    layer: tap.layer.clone(),
                    output: tap.output.clone(),
                });
            }
        }

        let logits_output = match logits_output {
            Some(name) if output_names.contains(&name) => name,
            Some(name) => {
                return Err(ClassifierError::Model(format!(
                    "Logits output '{}' not found in {:?}",
                    name, output_names
                )))
            }
            None => output_names
                .iter()
                .find(|name| !taps.iter().any(|t| &t.output == *name))
                .cloned()
                .ok_or_else(|| {
                    ClassifierError::Model("Network has no logits output".to_string())
                })?,
        };

        info!(
            "✅ Network loaded (input: {}, logits: {}, taps: {})",
            input_name,
            logits_output,
            taps.len()
        );

        Ok(Self {
            session,
            input_name,
            logits_output,
            taps,
        })
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn logits_output(&self) -> &str {
        &self.logits_output
    }
}

fn build_session(model_path: &Path, intra_threads: usize) -> anyhow::Result<Session> {
    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load ONNX model from {}",
            model_path.display()
        ))?;
    Ok(session)
}

impl Network for OnnxNetwork {
    fn forward(&mut self, input: &Array4<f32>) -> Result<ForwardPass> {
        let input_value = Value::from_array(input.to_owned())
            .map_err(|e| ClassifierError::Model(format!("Failed to create input tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(|e| ClassifierError::Model(format!("Forward pass failed: {}", e)))?;

        // None when the graph did not produce `name`
        let extract = |name: &str| -> Option<Result<ArrayD<f32>>> {
            let value = outputs.get(name)?;
            Some(
                value
                    .try_extract_array::<f32>()
                    .map(|array| array.to_owned())
                    .map_err(|e| {
                        ClassifierError::Model(format!("Failed to extract '{}': {}", name, e))
                    }),
            )
        };

        let logits: Vec<f32> = extract(&self.logits_output)
            .ok_or_else(|| {
                ClassifierError::Model(format!(
                    "Output '{}' missing from forward pass",
                    self.logits_output
                ))
            })??
            .iter()
            .copied()
            .collect();

        let mut activations = HashMap::with_capacity(self.taps.len());
        for tap in &self.taps {
            let activation = tap_activation(tap, extract(&tap.output))?;
            activations.insert(tap.layer.clone(), activation);
        }

        debug!("Forward pass produced {} logits", logits.len());

        Ok(ForwardPass {
            logits,
            activations,
        })
    }
}

/// Only an absent output is a missing activation; extraction failures pass through
fn tap_activation(
    tap: &ActivationTap,
    extracted: Option<Result<ArrayD<f32>>>,
) -> Result<ArrayD<f32>> {
    extracted.unwrap_or_else(|| {
        Err(ClassifierError::MissingActivation {
            layer: tap.layer.clone(),
            output: tap.output.clone(),
        })
    })
}
