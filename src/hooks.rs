// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Hook installation collaborators
//!
//! The loader never rewrites host internals itself. Each hookable host
//! capability is a method on these traits; the orchestrator decides when a
//! hook is installed, the embedder decides how. Installers must be
//! idempotent, though the orchestrator additionally tracks installation per
//! target identity and will not call an installer twice for the same target.

use crate::error::Result;
use crate::value::{ObjectRef, Value};

/// Hook installers provided by the embedding runtime
pub trait HookSuite {
    /// Hook the module system representative (compile/load interception)
    fn install_module_hook(&mut self, target: &ObjectRef) -> Result<()>;

    /// Hook process-level integration (exit reporting, uncaught rethrow)
    fn install_process_hook(&mut self) -> Result<()>;

    /// Hook the VM surface (REPL / eval compilation)
    fn install_vm_hook(&mut self) -> Result<()>;

    /// Hook main-module startup
    fn install_main_hook(&mut self, target: &ObjectRef) -> Result<()>;

    /// Hook the global object (host-internal invocations only)
    fn install_global_hook(&mut self) -> Result<()>;

    /// Produce the hook-augmented require entry point for a host module
    fn require_entry(&mut self, host: &ObjectRef) -> Result<Value>;
}

/// Preload registration provided by the embedding runtime
pub trait PreloadRegistrar {
    /// Perform the actual requires for a batch of preload requests
    fn register_preload_modules(&mut self, requests: &[String]) -> Result<()>;

    /// Rebind the active path-resolution function to the host's resolver
    fn rebind_resolver(&mut self) -> Result<()>;
}
