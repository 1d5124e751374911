// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Frame handling for the classifier
//!
//! This module provides:
//! - the `Frame` input contract (decoded image, raw pixels, encoded bytes)
//! - the fixed resize / crop / normalize pipeline feeding the network

pub mod frame;
pub mod preprocessing;

pub use frame::{decode_frame_bytes, detect_format, Frame, PixelArray};
pub use preprocessing::{center_crop, resize_shorter_side, shorter_side_dimensions, Preprocessor};
