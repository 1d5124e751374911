// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::config::{ClassifierConfig, WeightSource};

/// Configuration sources shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// ONNX weight file (overrides the configured source)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Label file, one label per line
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Confidence threshold; top probabilities at or below it print "-"
    #[arg(long)]
    pub threshold: Option<f32>,
}

impl ConfigArgs {
    /// File (or defaults), then `FRAME_CLASSIFIER_*` variables, then flags
    pub fn resolve(&self) -> Result<ClassifierConfig> {
        self.apply(self.base_config()?.with_env_overrides())
    }

    /// Configuration file contents, or defaults without `--config`
    pub fn base_config(&self) -> Result<ClassifierConfig> {
        match &self.config {
            Some(path) => ClassifierConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(ClassifierConfig::default()),
        }
    }

    /// Overlay command-line flags and validate
    pub fn apply(&self, mut config: ClassifierConfig) -> Result<ClassifierConfig> {
        if let Some(path) = &self.model {
            config.weights = WeightSource::File { path: path.clone() };
        }
        if let Some(path) = &self.labels {
            config.labels_path = path.clone();
        }
        if let Some(threshold) = self.threshold {
            config.confidence_threshold = threshold;
        }

        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }
}

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit one JSON object per frame
    #[arg(long)]
    pub json: bool,

    /// Keep going when a frame fails to load or classify
    #[arg(long)]
    pub keep_going: bool,

    /// Image files, classified in the given order
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

/// One output line
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub path: PathBuf,
    pub label: String,
    pub class_index: Option<usize>,
    pub probability: Option<f32>,
    pub window_sum: Option<f64>,
}

pub fn classify_frames(args: ClassifyArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let mut classifier = Classifier::new(config).context("Failed to load classifier")?;

    for path in &args.images {
        let outcome = image::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))
            .and_then(|img| classifier.classify(img).map_err(anyhow::Error::from));

        let label = match outcome {
            Ok(label) => label,
            Err(e) if args.keep_going => {
                warn!("Skipping {}: {:#}", path.display(), e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let prediction = classifier.last_prediction();
        let report = FrameReport {
            frame: classifier.frames_processed(),
            path: path.clone(),
            label,
            class_index: prediction.map(|p| p.class_index),
            probability: prediction.map(|p| p.probability),
            window_sum: prediction.and_then(|p| {
                classifier
                    .history()
                    .accumulated(p.class_index)
                    .and_then(|trace| trace.last().copied())
            }),
        };

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "{:>5}  {:<30} p={:.4}  {}",
                report.frame,
                report.label,
                report.probability.unwrap_or_default(),
                report.path.display()
            );
        }
    }

    info!("Classified {} frame(s)", classifier.frames_processed());
    Ok(())
}

pub fn show_config(args: ConfigArgs) -> Result<()> {
    let config = args.resolve()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
