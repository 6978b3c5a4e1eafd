// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host environment flags
//!
//! The embedder determines these from its CLI flags and environment before
//! constructing the loader; parsing them is out of scope here. The flags
//! drive the bootstrap decision table and the sentinel handling in
//! `yarn_pnp` mode.

/// Environment flags for the current process
#[derive(Debug, Clone, Default)]
pub struct EnvFlags {
    /// Syntax-check-only invocation (`--check`)
    pub check: bool,
    /// Inline script evaluation (`--eval`)
    pub eval: bool,
    /// Interactive REPL session
    pub repl: bool,
    /// Regular CLI script invocation
    pub cli: bool,
    /// Loader pulled in by the host's own internals
    pub internal: bool,
    /// Loader was loaded indirectly next to the main module
    pub sideloaded: bool,
    /// Loader arrived via a preload flag (`--require`-style)
    pub preloaded: bool,
    /// Running under a package-manager virtual filesystem
    pub yarn_pnp: bool,
    /// Pending preload requests, in flag order
    pub preload_modules: Vec<String>,
}
