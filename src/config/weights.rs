// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pretrained weight resolution
//!
//! Weights are an ONNX export of the network that exposes the tapped layers
//! as extra graph outputs. They are read from disk or fetched once into the
//! local Hugging Face cache.

use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classifier::errors::{ClassifierError, Result};

/// File name looked up in a hub repository when none is configured
pub const DEFAULT_HUB_FILE: &str = "alexnet.onnx";

/// Location of the pretrained network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightSource {
    /// ONNX file on local disk
    File { path: PathBuf },
    /// File inside a Hugging Face model repository
    Hub {
        repo: String,
        file: String,
        #[serde(default)]
        revision: Option<String>,
    },
}

impl Default for WeightSource {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from("../alexnet/alexnet.onnx"),
        }
    }
}

impl WeightSource {
    /// Resolve to a local file path, downloading hub weights if needed
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::File { path } => {
                if !path.exists() {
                    return Err(ClassifierError::WeightsNotFound(path.clone()));
                }
                Ok(path.clone())
            }
            Self::Hub {
                repo,
                file,
                revision,
            } => {
                let download_err = |reason: String| ClassifierError::WeightsDownloadFailed {
                    repo: repo.clone(),
                    file: file.clone(),
                    reason,
                };

                let api = Api::new().map_err(|e| download_err(e.to_string()))?;
                let handle = match revision {
                    Some(rev) => api.repo(Repo::with_revision(
                        repo.clone(),
                        RepoType::Model,
                        rev.clone(),
                    )),
                    None => api.model(repo.clone()),
                };

                info!("Fetching {} from {}", file, repo);
                let path = handle.get(file).map_err(|e| download_err(e.to_string()))?;
                debug!("Hub weights cached at {}", path.display());
                Ok(path)
            }
        }
    }
}

/// Hex-encoded SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Fail unless the file hashes to `expected` (case-insensitive hex)
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(ClassifierError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_lowercase(),
            actual,
        });
    }
    debug!("Checksum verified for {}", path.display());
    Ok(())
}
