// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! initial_capacity = 512
//! max_buffer_size = 65536
//! dedup_vtables = true
//! force_defaults = false
//! max_frame_size = 65536
//! ```

use crate::wire::MAX_BUFFER_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Encoder/decoder tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Initial encoder buffer size in bytes.
    pub initial_capacity: usize,

    /// Encoder growth limit; going past it fails with `AllocationFailure`.
    pub max_buffer_size: usize,

    /// Share byte-identical vtables within one encoding session.
    pub dedup_vtables: bool,

    /// Write scalar fields even when they equal their default.
    pub force_defaults: bool,

    /// Largest size-prefixed frame the stream framer accepts, prefix included.
    pub max_frame_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 512,
            max_buffer_size: 64 * 1024,
            dedup_vtables: true,
            force_defaults: false,
            max_frame_size: 64 * 1024,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::Invalid(
                "initial_capacity must be non-zero".into(),
            ));
        }
        if self.max_buffer_size == 0 || self.max_buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_buffer_size must be in 1..={}",
                MAX_BUFFER_SIZE
            )));
        }
        if self.initial_capacity > self.max_buffer_size {
            return Err(ConfigError::Invalid(format!(
                "initial_capacity ({}) exceeds max_buffer_size ({})",
                self.initial_capacity, self.max_buffer_size
            )));
        }
        if self.max_frame_size < 8 {
            return Err(ConfigError::Invalid(
                "max_frame_size must hold at least the size prefix and root offset".into(),
            ));
        }
        Ok(())
    }
}
