// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-class probability traces
//!
//! Two traces per class:
//! - probabilities: one entry per processed frame, never truncated
//! - accumulated: seeded with 0.0, then one entry per frame holding the sum
//!   of the last `window` probabilities
//!
//! The window sum is maintained incrementally; each frame costs O(classes).

use super::errors::{ClassifierError, Result};

#[derive(Debug, Clone)]
pub struct ClassHistory {
    window: usize,
    probabilities: Vec<Vec<f64>>,
    accumulated: Vec<Vec<f64>>,
    window_sums: Vec<f64>,
    frames: usize,
}

impl ClassHistory {
    pub fn new(num_classes: usize, window: usize) -> Self {
        Self {
            window,
            probabilities: vec![Vec::new(); num_classes],
            accumulated: vec![vec![0.0]; num_classes],
            window_sums: vec![0.0; num_classes],
            frames: 0,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.probabilities.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of frames recorded so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Append one frame's probability vector
    pub fn record(&mut self, probabilities: &[f32]) -> Result<()> {
        if probabilities.len() != self.num_classes() {
            return Err(ClassifierError::LogitsMismatch {
                expected: self.num_classes(),
                actual: probabilities.len(),
            });
        }

        for (class, &p) in probabilities.iter().enumerate() {
            let p = p as f64;
            let trace = &mut self.probabilities[class];
            trace.push(p);

            let mut sum = self.window_sums[class] + p;
            if trace.len() > self.window {
                sum -= trace[trace.len() - 1 - self.window];
            }
            self.window_sums[class] = sum;
            self.accumulated[class].push(sum);
        }

        self.frames += 1;
        Ok(())
    }

    /// Probability trace for one class
    pub fn probabilities(&self, class: usize) -> Option<&[f64]> {
        self.probabilities.get(class).map(Vec::as_slice)
    }

    /// Accumulated trace for one class (length = frames + 1)
    pub fn accumulated(&self, class: usize) -> Option<&[f64]> {
        self.accumulated.get(class).map(Vec::as_slice)
    }

    /// Current window sum for every class
    pub fn latest_accumulated(&self) -> Vec<f64> {
        self.accumulated
            .iter()
            .map(|trace| trace.last().copied().unwrap_or_default())
            .collect()
    }

    /// Most recent probability for every class, `None` before the first frame
    pub fn latest_probabilities(&self) -> Option<Vec<f64>> {
        if self.frames == 0 {
            return None;
        }
        Some(
            self.probabilities
                .iter()
                .map(|trace| trace.last().copied().unwrap_or_default())
                .collect(),
        )
    }
}
