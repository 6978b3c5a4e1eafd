// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Activation option normalization
//!
//! Raw options arrive as an untyped value graph from the host. Normalization
//! fills defaults, validates every key and value type, and produces a typed
//! `Options` whose serialized form is canonical: field order is fixed by the
//! struct declaration, so structurally equal inputs serialize identically
//! regardless of the key order the caller used.

use serde::Serialize;

use crate::error::{EsmError, Result};
use crate::value::Value;

/// Interop mode for ESM semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Apply ESM semantics only to files signaled as modules
    Auto,
    /// Apply ESM semantics to all files
    All,
    /// Require explicit module signaling, no interop affordances
    Strict,
}

/// CommonJS interop toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CjsOptions {
    /// Share the CJS module cache
    pub cache: bool,
    /// Recognize CJS file extensions
    pub extensions: bool,
    /// Provide default-export interop for CJS consumers
    pub interop: bool,
    /// Synthesize named exports from CJS exports
    pub named_exports: bool,
    /// Respect CJS path semantics
    pub paths: bool,
    /// Allow top-level return
    pub top_level_return: bool,
    /// Expose CJS variables (`require`, `module`, `exports`)
    pub vars: bool,
}

impl CjsOptions {
    fn uniform(enabled: bool) -> Self {
        Self {
            cache: enabled,
            extensions: enabled,
            interop: enabled,
            named_exports: enabled,
            paths: enabled,
            top_level_return: enabled,
            vars: enabled,
        }
    }
}

impl Default for CjsOptions {
    fn default() -> Self {
        Self::uniform(true)
    }
}

/// Normalized activation options
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Use the on-disk compile cache
    pub cache: bool,
    /// CommonJS interop toggles
    pub cjs: CjsOptions,
    /// Emit loader diagnostics
    pub debug: bool,
    /// Re-apply hooks even when already present
    pub force: bool,
    /// package.json fields consulted for a package entry point
    pub main_fields: Vec<String>,
    /// Interop mode
    pub mode: Mode,
    /// Emit inline source maps
    pub source_map: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache: true,
            cjs: CjsOptions::default(),
            debug: false,
            force: false,
            main_fields: vec!["main".to_string()],
            mode: Mode::Auto,
            source_map: false,
        }
    }
}

impl Options {
    /// Normalize a raw options value
    ///
    /// Unknown keys and wrong value types fail with `InvalidOption` before
    /// any of the options take effect.
    pub fn normalize(raw: &Value) -> Result<Options> {
        let obj = match raw {
            Value::Object(obj) => obj,
            _ => return Err(EsmError::invalid_option("options must be an object")),
        };

        let mut options = Options::default();

        for (key, value) in obj.entries() {
            match key.as_str() {
                "cache" => options.cache = expect_bool(&key, &value)?,
                "cjs" => options.cjs = normalize_cjs(&value)?,
                "debug" => options.debug = expect_bool(&key, &value)?,
                "force" => options.force = expect_bool(&key, &value)?,
                "mainFields" => options.main_fields = expect_string_list(&key, &value)?,
                "mode" => options.mode = parse_mode(&value)?,
                "sourceMap" => options.source_map = expect_bool(&key, &value)?,
                _ => {
                    return Err(EsmError::invalid_option(format!(
                        "unknown option '{key}'"
                    )));
                }
            }
        }

        Ok(options)
    }
}

fn normalize_cjs(value: &Value) -> Result<CjsOptions> {
    match value {
        Value::Bool(enabled) => Ok(CjsOptions::uniform(*enabled)),
        Value::Object(obj) => {
            let mut cjs = CjsOptions::default();
            for (key, value) in obj.entries() {
                let flag = expect_bool(&format!("cjs.{key}"), &value)?;
                match key.as_str() {
                    "cache" => cjs.cache = flag,
                    "extensions" => cjs.extensions = flag,
                    "interop" => cjs.interop = flag,
                    "namedExports" => cjs.named_exports = flag,
                    "paths" => cjs.paths = flag,
                    "topLevelReturn" => cjs.top_level_return = flag,
                    "vars" => cjs.vars = flag,
                    _ => {
                        return Err(EsmError::invalid_option(format!(
                            "unknown option 'cjs.{key}'"
                        )));
                    }
                }
            }
            Ok(cjs)
        }
        _ => Err(EsmError::invalid_option(
            "'cjs' must be a boolean or an object of booleans",
        )),
    }
}

fn parse_mode(value: &Value) -> Result<Mode> {
    match value.as_str() {
        Some("auto") => Ok(Mode::Auto),
        Some("all") => Ok(Mode::All),
        Some("strict") => Ok(Mode::Strict),
        Some(other) => Err(EsmError::invalid_option(format!(
            "unknown mode '{other}'"
        ))),
        None => Err(EsmError::invalid_option("'mode' must be a string")),
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| EsmError::invalid_option(format!("'{key}' must be a boolean")))
}

fn expect_string_list(key: &str, value: &Value) -> Result<Vec<String>> {
    let elements = match value {
        Value::Array(arr) => arr.elements(),
        _ => {
            return Err(EsmError::invalid_option(format!(
                "'{key}' must be an array of strings"
            )));
        }
    };

    elements
        .iter()
        .map(|element| {
            element
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| EsmError::invalid_option(format!("'{key}' must be an array of strings")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectRef;

    fn raw(entries: &[(&str, Value)]) -> Value {
        let obj = ObjectRef::new();
        for (key, value) in entries {
            obj.set(*key, value.clone());
        }
        Value::Object(obj)
    }

    #[test]
    fn test_defaults() {
        let options = Options::normalize(&raw(&[])).unwrap();
        assert_eq!(options, Options::default());
        assert!(options.cache);
        assert_eq!(options.mode, Mode::Auto);
        assert_eq!(options.main_fields, vec!["main"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Options::normalize(&raw(&[("bogus", Value::Bool(true))])).unwrap_err();
        assert!(matches!(err, EsmError::InvalidOption(_)));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = Options::normalize(&raw(&[("cache", Value::str("yes"))])).unwrap_err();
        assert!(matches!(err, EsmError::InvalidOption(_)));
    }

    #[test]
    fn test_cjs_boolean_shorthand() {
        let options = Options::normalize(&raw(&[("cjs", Value::Bool(false))])).unwrap();
        assert_eq!(options.cjs, CjsOptions::uniform(false));
    }

    #[test]
    fn test_cjs_object_form() {
        let cjs = ObjectRef::new();
        cjs.set("vars", Value::Bool(false));
        let options = Options::normalize(&raw(&[("cjs", Value::Object(cjs))])).unwrap();
        assert!(!options.cjs.vars);
        assert!(options.cjs.cache);
    }

    #[test]
    fn test_cjs_unknown_flag_rejected() {
        let cjs = ObjectRef::new();
        cjs.set("turbo", Value::Bool(true));
        let err = Options::normalize(&raw(&[("cjs", Value::Object(cjs))])).unwrap_err();
        assert!(matches!(err, EsmError::InvalidOption(_)));
    }

    #[test]
    fn test_mode_parsing() {
        let options = Options::normalize(&raw(&[("mode", Value::str("strict"))])).unwrap();
        assert_eq!(options.mode, Mode::Strict);

        let err = Options::normalize(&raw(&[("mode", Value::str("turbo"))])).unwrap_err();
        assert!(matches!(err, EsmError::InvalidOption(_)));
    }

    #[test]
    fn test_main_fields() {
        let fields = Value::array(vec![Value::str("module"), Value::str("main")]);
        let options = Options::normalize(&raw(&[("mainFields", fields)])).unwrap();
        assert_eq!(options.main_fields, vec!["module", "main"]);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = Options::normalize(&Value::str("auto")).unwrap_err();
        assert!(matches!(err, EsmError::InvalidOption(_)));
    }
}
