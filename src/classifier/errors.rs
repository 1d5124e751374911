// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for frame classification
//!
//! Construction errors (weights, labels, config) are fatal for the
//! classifier. Frame errors are per-call and leave classifier state untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning caller input into an image
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame data is empty")]
    EmptyData,

    #[error("Frame has zero size: {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("Unsupported channel count: {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(u8),

    #[error("Pixel buffer length {actual} does not match {width}x{height}x{channels} = {expected}")]
    ShapeMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Encoded frame is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode frame: {0}")]
    DecodeFailed(String),
}

/// Errors that can occur while building or running the classifier
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Weight file missing on disk
    #[error("Model weights not found: {0}")]
    WeightsNotFound(PathBuf),

    /// Weight file could not be fetched from the model hub
    #[error("Failed to fetch {file} from {repo}: {reason}")]
    WeightsDownloadFailed {
        repo: String,
        file: String,
        reason: String,
    },

    /// Weight file content does not match the configured digest
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// ONNX Runtime failed to load or run the network
    #[error("Model error: {0}")]
    Model(String),

    /// A registered activation tap produced no tensor
    #[error("Activation '{layer}' missing from forward pass (graph output '{output}')")]
    MissingActivation { layer: String, output: String },

    #[error("Label file not found: {0}")]
    LabelsNotFound(PathBuf),

    #[error("Label table has {actual} entries, network has {expected} classes")]
    LabelCountMismatch { expected: usize, actual: usize },

    #[error("Network produced {actual} logits, expected {expected}")]
    LogitsMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Frame conversion failed: {0}")]
    Frame(#[from] FrameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
