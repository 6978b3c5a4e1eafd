// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Self-reference detection
//!
//! Activation configuration may embed, anywhere in its structure, a value
//! that resolves back to this loader itself (a user listing the loader among
//! its own preload modules or hook options). Acting on such a value would
//! re-register the loader through its own configuration, so the detector
//! walks the whole value graph looking for one.

use std::collections::HashSet;
use std::path::Path;

use crate::resolve::Resolver;
use crate::value::Value;

/// Detector for configuration values that point back at the loader
pub struct SelfReference<'a> {
    resolver: &'a dyn Resolver,
    /// Canonical path of the loader's own entry file
    own_path: &'a Path,
    /// Module that bare requests are resolved relative to
    root_module: &'a Path,
}

impl<'a> SelfReference<'a> {
    /// Create a detector
    pub fn new(resolver: &'a dyn Resolver, own_path: &'a Path, root_module: &'a Path) -> Self {
        Self {
            resolver,
            own_path,
            root_module,
        }
    }

    /// Whether any value reachable from `value` identifies the loader itself
    pub fn check(&self, value: &Value) -> bool {
        self.check_inner(value, &mut HashSet::new())
    }

    fn check_inner(&self, value: &Value, visited: &mut HashSet<usize>) -> bool {
        match value {
            Value::Str(s) => self.check_str(s),
            Value::Object(obj) => {
                // Shared references can form cycles; revisiting a node can
                // only repeat work already done.
                if !visited.insert(obj.id()) {
                    return false;
                }
                obj.entries()
                    .iter()
                    .any(|(_, nested)| self.check_inner(nested, visited))
            }
            Value::Array(arr) => {
                if !visited.insert(arr.id()) {
                    return false;
                }
                arr.elements()
                    .iter()
                    .any(|nested| self.check_inner(nested, visited))
            }
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) => false,
        }
    }

    fn check_str(&self, s: &str) -> bool {
        if looks_like_path(s) {
            // Resolution failures mean "not a self-reference", never an error.
            return self
                .resolver
                .resolve_canonical_path(Path::new(s))
                .is_ok_and(|resolved| resolved == self.own_path);
        }

        // A leading dash marks a flag-like string, not a module name.
        if s.starts_with('-') {
            return false;
        }

        self.resolver
            .resolve_module_request(s, self.root_module)
            .is_ok_and(|resolved| resolved == self.own_path)
    }
}

/// Heuristic for strings that name a filesystem location rather than a module
pub fn looks_like_path(s: &str) -> bool {
    Path::new(s).is_absolute()
        || s.starts_with("./")
        || s.starts_with("../")
        || s.starts_with(".\\")
        || s.starts_with("..\\")
        || s.starts_with(std::path::MAIN_SEPARATOR)
}
