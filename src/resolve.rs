// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Path and module resolution collaborators
//!
//! The loader engine never resolves anything itself; it consumes these two
//! operations from the embedding runtime. `FsResolver` is a filesystem-backed
//! implementation of the Node.js-style algorithm for hosts that do not bring
//! their own.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{EsmError, Result};

/// Resolution operations provided by the embedding runtime
pub trait Resolver {
    /// Resolve a path to its canonical form, following symlinks
    ///
    /// Fails with `NotFound` if the path does not exist.
    fn resolve_canonical_path(&self, path: &Path) -> Result<PathBuf>;

    /// Resolve a module request relative to `from` using the host algorithm
    ///
    /// Fails with `Resolution` on an unresolvable request.
    fn resolve_module_request(&self, request: &str, from: &Path) -> Result<PathBuf>;
}

/// File extensions tried during resolution, in priority order
const EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".json"];

/// Filesystem-backed resolver implementing the Node.js lookup algorithm
#[derive(Debug, Default)]
pub struct FsResolver;

impl FsResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// Try a path as-is, then with each known extension
    fn resolve_file(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }

        for ext in EXTENSIONS {
            let mut with_ext = path.as_os_str().to_os_string();
            with_ext.push(ext);
            let with_ext = PathBuf::from(with_ext);
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }

        if path.is_dir() {
            return self.resolve_directory(path);
        }

        None
    }

    /// Resolve a directory through package.json "main" or an index file
    fn resolve_directory(&self, dir: &Path) -> Option<PathBuf> {
        let manifest = dir.join("package.json");
        if manifest.is_file()
            && let Ok(content) = std::fs::read_to_string(&manifest)
            && let Ok(pkg) = serde_json::from_str::<PackageJson>(&content)
            && let Some(main) = pkg.main
        {
            let main_path = dir.join(main);
            if let Some(resolved) = self.resolve_file(&main_path) {
                return Some(resolved);
            }
        }

        for ext in EXTENSIONS {
            let index = dir.join(format!("index{ext}"));
            if index.is_file() {
                return Some(index);
            }
        }

        None
    }

    /// Walk the node_modules chain upward from `from`
    fn resolve_node_modules(&self, request: &str, from: &Path) -> Option<PathBuf> {
        let start = if from.is_dir() { from } else { from.parent()? };

        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join("node_modules").join(request);
            if let Some(resolved) = self.resolve_file(&candidate) {
                return Some(resolved);
            }
            current = dir.parent();
        }

        None
    }
}

impl Resolver for FsResolver {
    fn resolve_canonical_path(&self, path: &Path) -> Result<PathBuf> {
        std::fs::canonicalize(path).map_err(|_| EsmError::NotFound(path.to_path_buf()))
    }

    fn resolve_module_request(&self, request: &str, from: &Path) -> Result<PathBuf> {
        let resolved = if request.starts_with("./")
            || request.starts_with("../")
            || Path::new(request).is_absolute()
        {
            let base = if from.is_dir() {
                from.to_path_buf()
            } else {
                from.parent().unwrap_or(Path::new(".")).to_path_buf()
            };
            self.resolve_file(&base.join(request))
        } else {
            self.resolve_node_modules(request, from)
        };

        match resolved {
            Some(path) => self.resolve_canonical_path(&path),
            None => Err(EsmError::resolution(request, "not found")),
        }
    }
}

/// Minimal package.json shape for entry-point resolution
#[derive(Debug, Deserialize)]
struct PackageJson {
    main: Option<String>,
}
