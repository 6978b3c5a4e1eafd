// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-esm
//!
//! Activation-cache and hook-orchestration engine for transparent
//! CommonJS/ESM interop in a JavaScript host runtime.
//!
//! The engine decides *when, and exactly once*, to turn loader hooks on. It
//! does not perform ESM/CJS translation itself; the host provides the hook
//! installers, resolution algorithm, and preload registration through the
//! collaborator traits in [`hooks`] and [`resolve`], and the engine supplies
//! the bookkeeping:
//!
//! - a deterministic **fingerprint** per activation request, so repeated
//!   activations with different configurations do not corrupt each other
//! - an init-once, re-entrancy-safe **activation cache** over fingerprints
//! - **self-reference detection**, so a configuration that lists the loader
//!   itself cannot re-register it through its own activation
//! - **preload partitioning** around the package-manager virtual loader,
//!   with the resolver rebind at the correct position
//! - a **degrading file reader** that falls back from a fast read primitive
//!   to a fully general one, permanently, on first failure
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use spacey_esm::{EnvFlags, Loader, LoaderConfig, Value};
//!
//! let mut loader = Loader::new(config, resolver, hooks, registrar, module_system);
//! loader.bootstrap()?;
//!
//! // Later, per explicit activation request:
//! let require = loader.activate(&host, Some(&options))?;
//! ```
//!
//! The engine is synchronous and single-threaded by design; re-entrancy
//! during hook installation, not parallelism, is the concurrency hazard it
//! defends against.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod env;
pub mod error;
pub mod fs_reader;
pub mod hooks;
pub mod loader;
pub mod options;
pub mod resolve;
pub mod value;

// Re-exports
pub use env::EnvFlags;
pub use error::{EsmError, Result};
pub use fs_reader::{Encoding, FileReader, NativeRead, ReadPrimitives};
pub use hooks::{HookSuite, PreloadRegistrar};
pub use loader::{ActivationCache, Fingerprint, Loader, LoaderConfig, SelfReference};
pub use options::{CjsOptions, Mode, Options};
pub use resolve::{FsResolver, Resolver};
pub use value::{ArrayRef, ObjectRef, Value};

/// Version of the loader engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
