// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Activation fingerprints
//!
//! A fingerprint is the canonical serialization of "this exact activation
//! request": the requester's module name plus its normalized options, or just
//! the options when they come from a persisted package configuration. Two
//! structurally equal requests must serialize identically, whatever key order
//! the caller wrote the options in; normalization into the typed `Options`
//! already erases input key order, and serialization field order is fixed by
//! the struct declaration.

use serde::Serialize;
use std::fmt;

use crate::error::Result;
use crate::options::Options;
use crate::value::ObjectRef;

/// Deterministic identity of an activation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of a fresh activation request: requester name + options
    pub fn of_request(name: &str, options: &Options) -> Result<Self> {
        #[derive(Serialize)]
        struct Request<'a> {
            name: &'a str,
            options: &'a Options,
        }

        Ok(Self(serde_json::to_string(&Request { name, options })?))
    }

    /// Fingerprint of a persisted package-level configuration
    pub fn of_options(options: &Options) -> Result<Self> {
        Ok(Self(serde_json::to_string(options)?))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a host module: its `id` property, falling back to `filename`
pub fn module_name(host: &ObjectRef) -> String {
    for key in ["id", "filename"] {
        if let Some(value) = host.get(key)
            && let Some(name) = value.as_str()
        {
            return name.to_string();
        }
    }
    String::new()
}
