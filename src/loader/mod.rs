// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Hook orchestration
//!
//! The `Loader` owns all process-lifetime activation state: the activation
//! cache, the installed-host set, the package configuration registry, and the
//! resolution cache scanned by sentinel eviction. `bootstrap` runs once when
//! the loader first comes up and installs hooks per the environment decision
//! table; `activate` serves every subsequent explicit activation request.

mod cache;
mod fingerprint;
mod preload;
mod self_ref;

pub use cache::ActivationCache;
pub use fingerprint::{Fingerprint, module_name};
pub use preload::{PNP_FILENAME, apply_preloads, is_sentinel};
pub use self_ref::{SelfReference, looks_like_path};

use dashmap::DashMap;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::env::EnvFlags;
use crate::error::{EsmError, Result};
use crate::hooks::{HookSuite, PreloadRegistrar};
use crate::options::Options;
use crate::resolve::Resolver;
use crate::value::{ObjectRef, Value};

/// Static configuration for a loader instance
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Canonical path of the loader's own entry file
    pub own_path: PathBuf,
    /// Module that bare configuration requests resolve relative to
    pub root_module: PathBuf,
    /// Host environment flags
    pub env: EnvFlags,
}

/// Package-level configuration persisted across activations
///
/// Keyed by the directory of the host's `filename` so modules of the same
/// package share a configuration, falling back to the host's name or
/// identity when it has no filename.
#[derive(Debug, Default)]
struct PackageRegistry {
    entries: HashMap<String, Options>,
}

impl PackageRegistry {
    fn key_for(host: &ObjectRef) -> String {
        if let Some(filename) = host.get("filename")
            && let Some(filename) = filename.as_str()
            && let Some(dir) = Path::new(filename).parent()
        {
            return dir.to_string_lossy().into_owned();
        }

        let name = fingerprint::module_name(host);
        if name.is_empty() {
            format!("<module {:#x}>", host.id())
        } else {
            name
        }
    }

    fn options_for(&self, host: &ObjectRef) -> Option<&Options> {
        self.entries.get(&Self::key_for(host))
    }

    fn persist(&mut self, host: &ObjectRef, options: Options) {
        self.entries.insert(Self::key_for(host), options);
    }
}

/// The activation engine
pub struct Loader {
    config: LoaderConfig,
    resolver: Box<dyn Resolver>,
    hooks: Box<dyn HookSuite>,
    registrar: Box<dyn PreloadRegistrar>,
    /// Module-system representative the module hook installs onto
    module_system: ObjectRef,
    cache: ActivationCache,
    packages: PackageRegistry,
    /// Hosts whose process hook has been installed, by identity
    installed: HashSet<usize>,
    /// Module-hook targets, by identity
    module_hooked: HashSet<usize>,
    /// Host resolution cache, keyed by resolved filename
    resolution_cache: DashMap<String, Value>,
    /// Loader states built so far (uncached activations rebuild every call)
    state_builds: Cell<u64>,
}

impl Loader {
    /// Create a loader over the given collaborators
    pub fn new(
        config: LoaderConfig,
        resolver: Box<dyn Resolver>,
        hooks: Box<dyn HookSuite>,
        registrar: Box<dyn PreloadRegistrar>,
        module_system: ObjectRef,
    ) -> Self {
        Self {
            config,
            resolver,
            hooks,
            registrar,
            module_system,
            cache: ActivationCache::new(),
            packages: PackageRegistry::default(),
            installed: HashSet::new(),
            module_hooked: HashSet::new(),
            resolution_cache: DashMap::new(),
            state_builds: Cell::new(0),
        }
    }

    /// First-initialization hook installation, per the environment flags
    ///
    /// Called once when the loader itself is first loaded into the process.
    /// Subsequent explicit requests go through [`Loader::activate`].
    pub fn bootstrap(&mut self) -> Result<()> {
        let env = self.config.env.clone();

        if env.check {
            self.hooks.install_vm_hook()?;
        } else if env.eval || env.repl {
            self.install_module_hook()?;
            self.hooks.install_process_hook()?;
            self.hooks.install_vm_hook()?;
        } else if env.cli || env.internal || env.sideloaded {
            self.install_module_hook()?;
            let target = self.module_system.clone();
            self.hooks.install_main_hook(&target)?;
            self.hooks.install_process_hook()?;
        }

        if env.internal {
            self.hooks.install_global_hook()?;
        }

        if env.preloaded {
            // Anything required before the loader was resolved under the
            // wrong hooks; only the loader's own entry survives.
            let own_path = self.config.own_path.clone();
            self.resolution_cache
                .retain(|key, _| Path::new(key) == own_path);

            let detector = SelfReference::new(
                self.resolver.as_ref(),
                &self.config.own_path,
                &self.config.root_module,
            );
            preload::apply_preloads(&env.preload_modules, &detector, self.registrar.as_mut())?;
        }

        Ok(())
    }

    /// Activate loader hooks for a host module
    ///
    /// Returns the hook-augmented require entry point. Validation failures
    /// (`InvalidArgument`, `InvalidOption`) surface before any process-wide
    /// state is touched; a rejected call leaves no partial activation behind.
    pub fn activate(&mut self, host: &Value, options: Option<&Value>) -> Result<Value> {
        let host_obj = host
            .as_object()
            .ok_or_else(|| EsmError::invalid_argument("module must be an object"))?
            .clone();

        let normalized = options.map(Options::normalize).transpose()?;

        let fingerprint = match &normalized {
            Some(options) => Some(Fingerprint::of_request(
                &fingerprint::module_name(&host_obj),
                options,
            )?),
            None => self
                .packages
                .options_for(&host_obj)
                .map(Fingerprint::of_options)
                .transpose()?,
        };

        let builds = &self.state_builds;
        self.cache.ensure_initialized(fingerprint.as_ref(), || {
            builds.set(builds.get() + 1);
        });

        if let Some(options) = normalized {
            self.packages.persist(&host_obj, options);
        }

        self.install_module_hook()?;

        if self.installed.insert(host_obj.id()) {
            self.hooks.install_process_hook()?;
        }

        if self.config.env.yarn_pnp {
            self.evict_sentinel_resolution();

            let sentinel = self
                .config
                .env
                .preload_modules
                .iter()
                .find(|request| preload::is_sentinel(request))
                .cloned();
            if let Some(request) = sentinel {
                self.registrar
                    .register_preload_modules(std::slice::from_ref(&request))?;
                self.registrar.rebind_resolver()?;
            }
        }

        self.hooks.require_entry(&host_obj)
    }

    /// Whether a configuration value resolves back to this loader
    pub fn is_self_reference(&self, value: &Value) -> bool {
        SelfReference::new(
            self.resolver.as_ref(),
            &self.config.own_path,
            &self.config.root_module,
        )
        .check(value)
    }

    /// Install the module hook once per module-system representative
    fn install_module_hook(&mut self) -> Result<()> {
        if self.module_hooked.insert(self.module_system.id()) {
            let target = self.module_system.clone();
            self.hooks.install_module_hook(&target)?;
        }
        Ok(())
    }

    /// Remove the at-most-one resolution-cache entry left by the sentinel
    fn evict_sentinel_resolution(&self) {
        let stale = self
            .resolution_cache
            .iter()
            .map(|entry| entry.key().clone())
            .find(|key| preload::is_sentinel(key));
        if let Some(key) = stale {
            debug!("evicting sentinel resolution entry {key}");
            self.resolution_cache.remove(&key);
        }
    }

    /// The host resolution cache, keyed by resolved filename
    ///
    /// Populated by the embedder as modules load; the loader only evicts.
    pub fn resolution_cache(&self) -> &DashMap<String, Value> {
        &self.resolution_cache
    }

    /// The activation cache
    pub fn activation_cache(&self) -> &ActivationCache {
        &self.cache
    }

    /// Number of hosts whose process hook has been installed
    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    /// Number of loader states built (cached and uncached alike)
    pub fn state_builds(&self) -> u64 {
        self.state_builds.get()
    }
}
