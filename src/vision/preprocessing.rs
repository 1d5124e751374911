// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the classification network
//!
//! Steps:
//! 1. Resize so the shorter side equals `resize_shorter` (aspect preserved)
//! 2. Center crop to `crop_size` x `crop_size`
//! 3. Convert to RGB, scale to [0, 1]
//! 4. Normalize per channel: (pixel/255 - mean) / std
//! 5. Emit NCHW tensor [1, 3, crop, crop]

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;

use crate::config::{ClassifierConfig, CROP_SIZE, MEAN, RESIZE_SHORTER, STD};

/// Fixed preprocessing pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    resize_shorter: u32,
    crop_size: u32,
    mean: [f32; 3],
    std: [f32; 3],
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(RESIZE_SHORTER, CROP_SIZE, MEAN, STD)
    }
}

impl Preprocessor {
    pub fn new(resize_shorter: u32, crop_size: u32, mean: [f32; 3], std: [f32; 3]) -> Self {
        Self {
            resize_shorter,
            crop_size,
            mean,
            std,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            config.resize_shorter,
            config.crop_size,
            config.mean,
            config.std,
        )
    }

    pub fn crop_size(&self) -> u32 {
        self.crop_size
    }

    /// Run the full pipeline on a decoded image
    pub fn process(&self, image: &DynamicImage) -> Array4<f32> {
        let resized = resize_shorter_side(image, self.resize_shorter);
        let cropped = center_crop(&resized, self.crop_size);
        let rgb = cropped.to_rgb8();

        let size = self.crop_size as usize;
        let mut tensor = Array4::zeros((1, 3, size, size));

        for (x, y, pixel) in rgb.enumerate_pixels() {
            for c in 0..3 {
                let normalized = (pixel[c] as f32 / 255.0 - self.mean[c]) / self.std[c];
                tensor[[0, c, y as usize, x as usize]] = normalized;
            }
        }

        tensor
    }
}

/// Output dimensions when the shorter side is scaled to `target`
///
/// The longer side is truncated, not rounded.
pub fn shorter_side_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    if width <= height {
        let long = (target as u64 * height as u64 / width.max(1) as u64) as u32;
        (target, long.max(1))
    } else {
        let long = (target as u64 * width as u64 / height.max(1) as u64) as u32;
        (long.max(1), target)
    }
}

/// Resize so the shorter side equals `target`, bilinear
pub fn resize_shorter_side(image: &DynamicImage, target: u32) -> DynamicImage {
    let (w, h) = image.dimensions();
    let (new_w, new_h) = shorter_side_dimensions(w, h, target);
    if (new_w, new_h) == (w, h) {
        return image.clone();
    }
    image.resize_exact(new_w, new_h, FilterType::Triangle)
}

/// Crop the centered `size` x `size` window
///
/// Offsets round half to even; images smaller than the crop are padded with
/// black around the original.
pub fn center_crop(image: &DynamicImage, size: u32) -> DynamicImage {
    let (w, h) = image.dimensions();

    if w >= size && h >= size {
        let left = ((w - size) as f32 / 2.0).round_ties_even() as u32;
        let top = ((h - size) as f32 / 2.0).round_ties_even() as u32;
        return image.crop_imm(left, top, size, size);
    }

    let mut canvas = RgbImage::new(size, size);
    let left = ((size as i64 - w as i64) as f32 / 2.0).round_ties_even() as i64;
    let top = ((size as i64 - h as i64) as f32 / 2.0).round_ties_even() as i64;
    image::imageops::overlay(&mut canvas, &image.to_rgb8(), left, top);
    DynamicImage::ImageRgb8(canvas)
}
