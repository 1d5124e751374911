// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end classification behaviour with stand-in networks
//!
//! The ignored smoke test at the bottom needs the exported AlexNet graph and
//! `synset_words.txt` (see FRAME_CLASSIFIER_MODEL_PATH / _LABELS_PATH).

use super::support::{config, labels, ConstantNetwork, InputDrivenNetwork};
use frame_classifier::classifier::{ClassifierError, FrameError, Network};
use frame_classifier::{Classifier, ClassifierConfig, Frame, PixelArray};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

const CLASSES: usize = 12;

fn classifier() -> Classifier<InputDrivenNetwork> {
    Classifier::with_network(InputDrivenNetwork::new(CLASSES), labels(CLASSES), config(CLASSES))
        .unwrap()
}

fn gradient_frame(width: u32, height: u32, seed: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x as u8).wrapping_add(seed),
            (y as u8).wrapping_mul(3),
            seed.wrapping_mul(7),
        ])
    })
}

#[test]
fn test_label_is_display_name_or_placeholder() {
    let mut classifier = classifier();

    for seed in 0..5u8 {
        let label = classifier.classify(gradient_frame(320, 240, seed * 40)).unwrap();
        let prediction = classifier.last_prediction().unwrap();

        if prediction.probability > 0.10 {
            assert_eq!(label, format!("class{}", prediction.class_index));
        } else {
            assert_eq!(label, "-");
        }
    }
}

#[test]
fn test_probabilities_form_a_distribution() {
    let mut classifier = classifier();
    classifier.classify(gradient_frame(256, 256, 9)).unwrap();

    let features = classifier.features().unwrap();
    let probs = features.probabilities();
    assert_eq!(probs.len(), CLASSES);
    assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    assert!((probs.sum() - 1.0).abs() < 1e-5);

    let top = classifier.last_prediction().unwrap();
    assert!(probs.iter().all(|&p| p <= top.probability));
}

#[test]
fn test_history_grows_by_one_per_frame() {
    let mut classifier = classifier();

    for k in 1..=6 {
        classifier.classify(gradient_frame(300, 200, k as u8)).unwrap();
        assert_eq!(classifier.frames_processed(), k);
        for class in 0..CLASSES {
            assert_eq!(classifier.history().probabilities(class).unwrap().len(), k);
            assert_eq!(classifier.history().accumulated(class).unwrap().len(), k + 1);
        }
    }
}

#[test]
fn test_uniform_output_sits_on_threshold() {
    // Ten equal logits give exactly 0.1 per class, which is not above 0.10
    let network = ConstantNetwork {
        logits: vec![0.0; 10],
    };
    let mut classifier = Classifier::with_network(network, labels(10), config(10)).unwrap();

    assert_eq!(classifier.classify(gradient_frame(64, 64, 1)).unwrap(), "-");
    let prediction = classifier.last_prediction().unwrap();
    assert_eq!(prediction.class_index, 0);
    assert_eq!(prediction.probability, 0.1);
}

#[test]
fn test_lower_threshold_reveals_label() {
    let network = ConstantNetwork {
        logits: vec![0.0; 10],
    };
    let config = ClassifierConfig {
        confidence_threshold: 0.05,
        ..config(10)
    };
    let mut classifier = Classifier::with_network(network, labels(10), config).unwrap();
    assert_eq!(classifier.classify(gradient_frame(64, 64, 1)).unwrap(), "class0");
}

#[test]
fn test_same_frame_same_result() {
    let frame = gradient_frame(400, 300, 77);
    let mut first = classifier();
    let mut second = classifier();

    let a = first.classify(frame.clone()).unwrap();
    let b = second.classify(frame.clone()).unwrap();
    let c = first.classify(frame).unwrap();

    assert_eq!(a, b);
    assert_eq!(a, c);
    for class in 0..CLASSES {
        let trace = first.history().probabilities(class).unwrap();
        assert_eq!(trace[0], trace[1]);
        assert_eq!(trace[0], second.history().probabilities(class).unwrap()[0]);
    }
}

#[test]
fn test_invalid_frame_leaves_state_untouched() {
    let mut classifier = classifier();
    classifier.classify(gradient_frame(256, 256, 3)).unwrap();
    let before = classifier.features().cloned();
    let prediction = classifier.last_prediction();

    let bad = PixelArray::new(10, 10, 3, vec![0; 17]);
    let err = classifier.classify(bad).unwrap_err();
    assert!(matches!(
        err,
        ClassifierError::Frame(FrameError::ShapeMismatch { expected: 300, .. })
    ));

    let err = classifier.classify(Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, ClassifierError::Frame(FrameError::EmptyData)));

    assert_eq!(classifier.frames_processed(), 1);
    assert_eq!(classifier.history().accumulated(0).unwrap().len(), 2);
    assert_eq!(classifier.features().cloned(), before);
    assert_eq!(classifier.last_prediction(), prediction);
    assert_eq!(classifier.network().calls, 1);
}

#[test]
fn test_wrong_logit_count_is_an_error() {
    let network = ConstantNetwork {
        logits: vec![0.0; 9],
    };
    let mut classifier = Classifier::with_network(network, labels(10), config(10)).unwrap();
    let err = classifier.classify(gradient_frame(64, 64, 1)).unwrap_err();
    assert!(matches!(
        err,
        ClassifierError::LogitsMismatch {
            expected: 10,
            actual: 9
        }
    ));
    assert_eq!(classifier.frames_processed(), 0);
    assert!(classifier.features().is_none());
}

#[test]
fn test_features_follow_tap_layout() {
    let mut classifier = classifier();
    classifier.classify(gradient_frame(256, 256, 5)).unwrap();

    let features = classifier.features().unwrap();
    assert_eq!(features.derived_len(), 4);
    assert_eq!(features.derived(0).unwrap().shape(), &[36]);
    assert_eq!(features.derived(1).unwrap().shape(), &[16]);
    assert_eq!(features.derived(2).unwrap().shape(), &[1, 16]);
    assert_eq!(features.derived(3).unwrap().shape(), &[CLASSES]);
    assert_eq!(features.activation("pool5").unwrap().shape(), &[1, 4, 2, 2]);
}

#[test]
fn test_frame_representations_agree() {
    let image = gradient_frame(200, 150, 11);
    let pixels = PixelArray::new(200, 150, 3, image.as_raw().clone());

    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut encoded, ImageFormat::Png)
        .unwrap();

    let classifier = classifier();
    let from_image = classifier.preprocess(image).unwrap();
    let from_pixels = classifier.preprocess(pixels).unwrap();
    let from_bytes = classifier.preprocess(Frame::Encoded(encoded.into_inner())).unwrap();

    assert_eq!(from_image, from_pixels);
    assert_eq!(from_image, from_bytes);
    assert_eq!(from_image.shape(), &[1, 3, 227, 227]);
}

#[test]
fn test_boxed_network() {
    let network: Box<dyn Network> = Box::new(InputDrivenNetwork::new(CLASSES));
    let mut classifier = Classifier::with_network(network, labels(CLASSES), config(CLASSES)).unwrap();
    classifier.classify(gradient_frame(128, 128, 2)).unwrap();
    assert_eq!(classifier.frames_processed(), 1);
}

#[test]
fn test_missing_weights_fail_construction() {
    let config = ClassifierConfig {
        weights: frame_classifier::WeightSource::File {
            path: "/nonexistent/alexnet.onnx".into(),
        },
        ..Default::default()
    };
    let err = Classifier::new(config).unwrap_err();
    assert!(matches!(err, ClassifierError::WeightsNotFound(_)));
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_solid_color_frame_is_not_confident() {
    let mut classifier = match Classifier::new(ClassifierConfig::from_env()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Skipping: {}", e);
            return;
        }
    };

    let frame = PixelArray::solid_rgb(300, 300, [128, 64, 200]);
    let label = classifier.classify(frame).unwrap();
    assert_eq!(label, "-");
    assert_eq!(classifier.history().num_classes(), 1000);

    let features = classifier.features().unwrap();
    assert_eq!(features.derived_len(), 4);
    assert!((features.probabilities().sum() - 1.0).abs() < 1e-4);
}
