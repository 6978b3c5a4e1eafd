// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Dynamic host values
//!
//! Host modules and activation options arrive from the embedding runtime as
//! untyped value graphs. `Value` mirrors the host's value universe: primitives,
//! insertion-ordered objects, and arrays. Objects and arrays are shared
//! references with pointer identity, so the same node can appear in several
//! places (including cyclically) and hook bookkeeping can key off identity
//! rather than content.

use std::cell::RefCell;
use std::rc::Rc;

/// A value from the embedding runtime
#[derive(Debug, Clone)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// The null value
    Null,
    /// A boolean
    Bool(bool),
    /// A number
    Number(f64),
    /// A string
    Str(String),
    /// An array (shared reference)
    Array(ArrayRef),
    /// An object with insertion-ordered properties (shared reference)
    Object(ObjectRef),
}

impl Value {
    /// Create a string value
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Create an empty object value
    pub fn object() -> Self {
        Value::Object(ObjectRef::new())
    }

    /// Create an array value from elements
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(elements))
    }

    /// Whether this value is object-like (an object, not an array)
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// View as an object reference
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// View as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// View as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Shared reference to an object with insertion-ordered properties
#[derive(Debug, Clone, Default)]
pub struct ObjectRef(Rc<RefCell<Vec<(String, Value)>>>);

impl ObjectRef {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer identity of this object
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Get a property value by key
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Set a property, replacing an existing key in place
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let mut props = self.0.borrow_mut();
        if let Some(slot) = props.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            props.push((key, value));
        }
    }

    /// Snapshot of the properties in insertion order
    ///
    /// Clones the entries so callers can recurse into nested objects without
    /// holding a borrow on this one.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0.borrow().clone()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the object has no properties
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Shared reference to an array of values
#[derive(Debug, Clone, Default)]
pub struct ArrayRef(Rc<RefCell<Vec<Value>>>);

impl ArrayRef {
    /// Create an array from elements
    pub fn new(elements: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(elements)))
    }

    /// Pointer identity of this array
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Snapshot of the elements
    pub fn elements(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Push an element
    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_insertion_order() {
        let obj = ObjectRef::new();
        obj.set("b", Value::Number(1.0));
        obj.set("a", Value::Number(2.0));
        obj.set("b", Value::Number(3.0));

        let keys: Vec<String> = obj.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(matches!(obj.get("b"), Some(Value::Number(n)) if n == 3.0));
    }

    #[test]
    fn test_identity_is_per_allocation() {
        let a = ObjectRef::new();
        let b = ObjectRef::new();
        let a2 = a.clone();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a2.id());
    }

    #[test]
    fn test_cyclic_object_is_representable() {
        let outer = ObjectRef::new();
        let inner = ObjectRef::new();
        inner.set("back", Value::Object(outer.clone()));
        outer.set("inner", Value::Object(inner));
        assert_eq!(outer.len(), 1);
    }
}
