// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the loader engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, EsmError>;

/// Errors that can occur in the loader engine
#[derive(Debug, Error)]
pub enum EsmError {
    /// Caller contract violation (e.g. a non-object host module)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unrecognized or malformed activation option
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Path does not exist
    #[error("No such file: {0}")]
    NotFound(PathBuf),

    /// Module resolution failure
    #[error("Cannot resolve module '{request}': {reason}")]
    Resolution {
        /// Module specifier that failed to resolve
        request: String,
        /// Reason for failure
        reason: String,
    },

    /// Hook installation failure reported by the host
    #[error("Hook installation failed: {0}")]
    Hook(String),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EsmError {
    /// Create an InvalidArgument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an InvalidOption error
    pub fn invalid_option(msg: impl Into<String>) -> Self {
        Self::InvalidOption(msg.into())
    }

    /// Create a Resolution error
    pub fn resolution(request: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            request: request.into(),
            reason: reason.into(),
        }
    }
}
