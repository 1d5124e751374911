// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Resize, crop and normalization of incoming frames

use frame_classifier::config::{MEAN, STD};
use frame_classifier::vision::{center_crop, resize_shorter_side, shorter_side_dimensions};
use frame_classifier::{Frame, PixelArray, Preprocessor};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

#[test]
fn test_output_shape_for_common_sizes() {
    let pre = Preprocessor::default();
    for (w, h) in [(300, 300), (640, 480), (480, 640), (1920, 1080), (227, 227), (64, 32)] {
        let tensor = pre.process(&DynamicImage::new_rgb8(w, h));
        assert_eq!(tensor.shape(), &[1, 3, 227, 227], "{}x{}", w, h);
    }
}

#[test]
fn test_shorter_side_truncates_long_side() {
    assert_eq!(shorter_side_dimensions(1920, 1080, 256), (455, 256));
    assert_eq!(shorter_side_dimensions(333, 500, 256), (256, 384));

    let resized = resize_shorter_side(&DynamicImage::new_rgb8(640, 480), 256);
    assert_eq!(resized.dimensions(), (341, 256));
}

#[test]
fn test_center_crop_takes_middle() {
    // Left half black, right half white: the crop keeps both halves
    let image = RgbImage::from_fn(300, 256, |x, _| {
        if x < 150 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let cropped = center_crop(&DynamicImage::ImageRgb8(image), 227).to_rgb8();

    assert_eq!(cropped.dimensions(), (227, 227));
    assert_eq!(cropped.get_pixel(0, 100)[0], 0);
    assert_eq!(cropped.get_pixel(226, 100)[0], 255);
}

#[test]
fn test_solid_color_normalization() {
    let rgb = [128u8, 64, 200];
    let pre = Preprocessor::default();
    let image = PixelArray::solid_rgb(300, 300, rgb).to_image().unwrap();
    let tensor = pre.process(&image);

    for c in 0..3 {
        let expected = (rgb[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        for &(y, x) in &[(0usize, 0usize), (113, 113), (226, 226)] {
            let actual = tensor[[0, c, y, x]];
            assert!(
                (actual - expected).abs() < 0.02,
                "channel {} at ({}, {}): {} vs {}",
                c,
                y,
                x,
                actual,
                expected
            );
        }
    }
}

#[test]
fn test_grayscale_and_rgba_inputs() {
    let pre = Preprocessor::default();

    let gray = PixelArray::new(50, 40, 1, vec![100; 2000]);
    let rgba = PixelArray::new(50, 40, 4, [100, 100, 100, 255].repeat(2000));

    let a = pre.process(&Frame::from(gray).into_image().unwrap());
    let b = pre.process(&Frame::from(rgba).into_image().unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_custom_sizes() {
    let pre = Preprocessor::new(128, 112, MEAN, STD);
    assert_eq!(pre.crop_size(), 112);
    let tensor = pre.process(&DynamicImage::new_rgb8(400, 200));
    assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
}
