// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Label file loading and display names

use super::support::{config, synset_lines, ConstantNetwork};
use frame_classifier::classifier::{strip_label, ClassifierError};
use frame_classifier::{Classifier, LabelTable};
use std::io::Write;
use tempfile::NamedTempFile;

fn label_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_synset_display_names() {
    assert_eq!(strip_label("n01440764 tench, Tinca tinca", 10), "tench");
    assert_eq!(
        strip_label("n02085620 Chihuahua", 10),
        "Chihuahua"
    );
    assert_eq!(
        strip_label("n03888257 parachute, chute", 10),
        "parachute"
    );
    assert_eq!(strip_label("short", 10), "");
}

#[test]
fn test_load_from_file() {
    let file = label_file(&synset_lines(4));
    let table = LabelTable::from_file(file.path(), 10).unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.entry(2), Some("n00000002 class2, alias2"));
    assert_eq!(table.display_name(3).as_deref(), Some("class3"));
    assert_eq!(table.display_name(4), None);
}

#[test]
fn test_missing_label_file() {
    let err = LabelTable::from_file("/nonexistent/synset_words.txt", 10).unwrap_err();
    assert!(matches!(err, ClassifierError::LabelsNotFound(_)));
}

#[test]
fn test_label_count_checked_at_construction() {
    let file = label_file(&synset_lines(9));
    let table = LabelTable::from_file(file.path(), 10).unwrap();
    let network = ConstantNetwork {
        logits: vec![0.0; 10],
    };

    let err = Classifier::with_network(network, table, config(10)).unwrap_err();
    assert!(matches!(
        err,
        ClassifierError::LabelCountMismatch {
            expected: 10,
            actual: 9
        }
    ));
}

#[test]
fn test_trailing_blank_lines_ignored() {
    let file = label_file(&format!("{}\n\n", synset_lines(3)));
    let table = LabelTable::from_file(file.path(), 10).unwrap();
    assert_eq!(table.len(), 3);
}

#[test]
fn test_confident_label_uses_display_name() {
    let mut logits = vec![0.0; 5];
    logits[3] = 6.0;
    let network = ConstantNetwork { logits };
    let table = LabelTable::parse(&synset_lines(5), 10);
    let mut classifier = Classifier::with_network(network, table, config(5)).unwrap();

    let label = classifier
        .classify(image::RgbImage::new(30, 30))
        .unwrap();
    assert_eq!(label, "class3");
}
