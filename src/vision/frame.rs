// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Frame input contract for the classifier
//!
//! A frame is either a decoded image, a raw row-major pixel array (as handed
//! over by a capture loop) or an encoded image buffer.

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, RgbImage, RgbaImage};

use crate::classifier::errors::FrameError;

/// Maximum encoded frame size (10MB)
const MAX_ENCODED_SIZE: usize = 10 * 1024 * 1024;

/// Raw 8-bit pixels, row-major, interleaved channels
///
/// `channels` is 1 (grayscale), 3 (RGB) or 4 (RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelArray {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl PixelArray {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// RGB array filled with a single color
    pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self::new(width, height, 3, data)
    }

    /// Interpret the buffer as an image
    pub fn to_image(&self) -> Result<DynamicImage, FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::ZeroSize {
                width: self.width,
                height: self.height,
            });
        }
        if !matches!(self.channels, 1 | 3 | 4) {
            return Err(FrameError::UnsupportedChannels(self.channels));
        }

        let expected = self.width as usize * self.height as usize * self.channels as usize;
        if self.data.len() != expected {
            return Err(FrameError::ShapeMismatch {
                width: self.width,
                height: self.height,
                channels: self.channels,
                expected,
                actual: self.data.len(),
            });
        }

        let (w, h, data) = (self.width, self.height, self.data.clone());
        let image = match self.channels {
            1 => ImageBuffer::from_raw(w, h, data).map(|b: GrayImage| DynamicImage::ImageLuma8(b)),
            3 => ImageBuffer::from_raw(w, h, data).map(|b: RgbImage| DynamicImage::ImageRgb8(b)),
            _ => ImageBuffer::from_raw(w, h, data).map(|b: RgbaImage| DynamicImage::ImageRgba8(b)),
        };

        image.ok_or(FrameError::ShapeMismatch {
            width: self.width,
            height: self.height,
            channels: self.channels,
            expected,
            actual: self.data.len(),
        })
    }
}

/// Anything the classifier accepts as one frame
#[derive(Debug, Clone)]
pub enum Frame {
    /// Already decoded image
    Image(DynamicImage),
    /// Raw pixel buffer
    Pixels(PixelArray),
    /// Encoded image file contents (PNG, JPEG, ...)
    Encoded(Vec<u8>),
}

impl Frame {
    /// Convert to a decoded image
    pub fn into_image(self) -> Result<DynamicImage, FrameError> {
        match self {
            Frame::Image(image) => {
                if image.width() == 0 || image.height() == 0 {
                    return Err(FrameError::ZeroSize {
                        width: image.width(),
                        height: image.height(),
                    });
                }
                Ok(image)
            }
            Frame::Pixels(pixels) => pixels.to_image(),
            Frame::Encoded(bytes) => decode_frame_bytes(&bytes),
        }
    }
}

impl From<DynamicImage> for Frame {
    fn from(image: DynamicImage) -> Self {
        Frame::Image(image)
    }
}

impl From<&DynamicImage> for Frame {
    fn from(image: &DynamicImage) -> Self {
        Frame::Image(image.clone())
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Frame::Image(DynamicImage::ImageRgb8(image))
    }
}

impl From<PixelArray> for Frame {
    fn from(pixels: PixelArray) -> Self {
        Frame::Pixels(pixels)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Frame::Encoded(bytes)
    }
}

/// Decode encoded image bytes
pub fn decode_frame_bytes(bytes: &[u8]) -> Result<DynamicImage, FrameError> {
    if bytes.is_empty() {
        return Err(FrameError::EmptyData);
    }
    if bytes.len() > MAX_ENCODED_SIZE {
        return Err(FrameError::TooLarge(bytes.len(), MAX_ENCODED_SIZE));
    }

    let format = detect_format(bytes)?;

    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| FrameError::DecodeFailed(e.to_string()))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, FrameError> {
    if bytes.len() < 4 {
        return Err(FrameError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF87a / GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        _ => Err(FrameError::UnsupportedFormat),
    }
}
