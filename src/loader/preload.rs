// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Preload directive partitioning
//!
//! Preload requests run in flag order, but one entry is special: the package
//! manager's virtual loader (`.pnp.js`). Everything before and including it
//! must be required under the resolver that was active when the flags were
//! parsed; everything after it must see the resolver the virtual loader just
//! installed. The partitioner therefore splits registration into two calls
//! with the resolver rebind strictly between them. Entries naming this
//! loader itself are dropped outright; the loader is already active.

use tracing::debug;

use crate::error::Result;
use crate::hooks::PreloadRegistrar;
use crate::loader::self_ref::SelfReference;
use crate::value::Value;

/// Filename of the package-manager virtual loader
pub const PNP_FILENAME: &str = ".pnp.js";

/// Whether a request names the package-manager virtual loader
pub fn is_sentinel(request: &str) -> bool {
    let suffix = format!("{}{}", std::path::MAIN_SEPARATOR, PNP_FILENAME);
    request.ends_with(&suffix)
}

/// Register preload requests, split around the sentinel entry
pub fn apply_preloads(
    requests: &[String],
    detector: &SelfReference<'_>,
    registrar: &mut dyn PreloadRegistrar,
) -> Result<()> {
    let mut retained: Vec<String> = Vec::with_capacity(requests.len());
    let mut sentinel: Option<usize> = None;

    for request in requests {
        if detector.check(&Value::str(request.clone())) {
            debug!("dropping self-referencing preload {request}");
            continue;
        }
        // First sentinel encountered is authoritative.
        if sentinel.is_none() && is_sentinel(request) {
            sentinel = Some(retained.len());
        }
        retained.push(request.clone());
    }

    if retained.is_empty() {
        return Ok(());
    }

    match sentinel {
        Some(pos) => {
            registrar.register_preload_modules(&retained[..=pos])?;
            registrar.rebind_resolver()?;
            registrar.register_preload_modules(&retained[pos + 1..])?;
        }
        None => registrar.register_preload_modules(&retained)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::FsResolver;
    use std::fs;
    use std::path::PathBuf;

    /// Records registration batches, with a marker for the resolver rebind
    #[derive(Default)]
    struct RecordingRegistrar {
        events: Vec<Event>,
    }

    #[derive(Debug, PartialEq)]
    enum Event {
        Register(Vec<String>),
        Rebind,
    }

    impl PreloadRegistrar for RecordingRegistrar {
        fn register_preload_modules(&mut self, requests: &[String]) -> Result<()> {
            self.events.push(Event::Register(requests.to_vec()));
            Ok(())
        }

        fn rebind_resolver(&mut self) -> Result<()> {
            self.events.push(Event::Rebind);
            Ok(())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        own_path: PathBuf,
        root_module: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let own_path = dir.path().join("esm.js");
        fs::write(&own_path, "").unwrap();
        let own_path = own_path.canonicalize().unwrap();
        let root_module = dir.path().join("main.js");
        fs::write(&root_module, "").unwrap();
        Fixture {
            _dir: dir,
            own_path,
            root_module,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_around_sentinel_with_rebind_between() {
        let fx = fixture();
        let resolver = FsResolver::new();
        let detector = SelfReference::new(&resolver, &fx.own_path, &fx.root_module);
        let mut registrar = RecordingRegistrar::default();

        apply_preloads(
            &strings(&["x.js", "a/.pnp.js", "y.js"]),
            &detector,
            &mut registrar,
        )
        .unwrap();

        assert_eq!(
            registrar.events,
            vec![
                Event::Register(strings(&["x.js", "a/.pnp.js"])),
                Event::Rebind,
                Event::Register(strings(&["y.js"])),
            ]
        );
    }

    #[test]
    fn test_no_sentinel_single_registration() {
        let fx = fixture();
        let resolver = FsResolver::new();
        let detector = SelfReference::new(&resolver, &fx.own_path, &fx.root_module);
        let mut registrar = RecordingRegistrar::default();

        apply_preloads(&strings(&["x.js", "y.js"]), &detector, &mut registrar).unwrap();

        assert_eq!(
            registrar.events,
            vec![Event::Register(strings(&["x.js", "y.js"]))]
        );
    }

    #[test]
    fn test_empty_input_issues_no_calls() {
        let fx = fixture();
        let resolver = FsResolver::new();
        let detector = SelfReference::new(&resolver, &fx.own_path, &fx.root_module);
        let mut registrar = RecordingRegistrar::default();

        apply_preloads(&[], &detector, &mut registrar).unwrap();
        assert!(registrar.events.is_empty());
    }

    #[test]
    fn test_self_reference_dropped_from_every_batch() {
        let fx = fixture();
        let resolver = FsResolver::new();
        let detector = SelfReference::new(&resolver, &fx.own_path, &fx.root_module);
        let mut registrar = RecordingRegistrar::default();

        let own = fx.own_path.to_string_lossy().to_string();
        apply_preloads(
            &[own.clone(), "x.js".to_string(), "a/.pnp.js".to_string(), own],
            &detector,
            &mut registrar,
        )
        .unwrap();

        assert_eq!(
            registrar.events,
            vec![
                Event::Register(strings(&["x.js", "a/.pnp.js"])),
                Event::Rebind,
                Event::Register(vec![]),
            ]
        );
    }

    #[test]
    fn test_only_self_references_means_no_calls() {
        let fx = fixture();
        let resolver = FsResolver::new();
        let detector = SelfReference::new(&resolver, &fx.own_path, &fx.root_module);
        let mut registrar = RecordingRegistrar::default();

        let own = fx.own_path.to_string_lossy().to_string();
        apply_preloads(&[own], &detector, &mut registrar).unwrap();
        assert!(registrar.events.is_empty());
    }

    #[test]
    fn test_first_sentinel_wins() {
        let fx = fixture();
        let resolver = FsResolver::new();
        let detector = SelfReference::new(&resolver, &fx.own_path, &fx.root_module);
        let mut registrar = RecordingRegistrar::default();

        apply_preloads(
            &strings(&["a/.pnp.js", "x.js", "b/.pnp.js"]),
            &detector,
            &mut registrar,
        )
        .unwrap();

        assert_eq!(
            registrar.events,
            vec![
                Event::Register(strings(&["a/.pnp.js"])),
                Event::Rebind,
                Event::Register(strings(&["x.js", "b/.pnp.js"])),
            ]
        );
    }

    #[test]
    fn test_is_sentinel_requires_separator() {
        assert!(is_sentinel("a/.pnp.js"));
        assert!(is_sentinel("/project/.pnp.js"));
        assert!(!is_sentinel(".pnp.js"));
        assert!(!is_sentinel("not-pnp.js"));
    }
}
