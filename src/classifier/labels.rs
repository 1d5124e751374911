// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class label table
//!
//! One label per line, line number = class index. Lines are expected in the
//! WordNet synset layout `n01440764 tench, Tinca tinca`: display names take
//! the text before the first comma and drop a fixed-length prefix.

use std::path::Path;
use tracing::{info, warn};

use super::errors::{ClassifierError, Result};
use crate::config::LABEL_PREFIX_LEN;

/// Immutable ordered list of class names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    entries: Vec<String>,
    prefix_len: usize,
}

impl LabelTable {
    /// Build from in-memory entries
    pub fn new(entries: Vec<String>, prefix_len: usize) -> Self {
        Self {
            entries,
            prefix_len,
        }
    }

    /// Parse label file contents; blank lines are skipped
    ///
    /// Only trailing whitespace (including `\r`) is removed, so the prefix is
    /// always measured from the first column.
    pub fn parse(text: &str, prefix_len: usize) -> Self {
        let mut skipped = 0usize;
        let entries = text
            .lines()
            .map(str::trim_end)
            .filter(|line| {
                let keep = !line.is_empty();
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .map(str::to_string)
            .collect();

        if skipped > 0 {
            warn!("Skipped {} blank line(s) in label table", skipped);
        }

        Self::new(entries, prefix_len)
    }

    /// Load from a file
    pub fn from_file<P: AsRef<Path>>(path: P, prefix_len: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::LabelsNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        let table = Self::parse(&text, prefix_len);
        info!("Loaded {} labels from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw line for a class index
    pub fn entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Human-readable name: text before the first comma, minus the prefix
    pub fn display_name(&self, index: usize) -> Option<String> {
        self.entry(index)
            .map(|entry| strip_label(entry, self.prefix_len))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new(Vec::new(), LABEL_PREFIX_LEN)
    }
}

/// First comma-separated field with `prefix_len` characters dropped
///
/// Shorter fields yield an empty string.
pub fn strip_label(entry: &str, prefix_len: usize) -> String {
    let head = entry.split(',').next().unwrap_or_default();
    head.chars().skip(prefix_len).collect()
}
