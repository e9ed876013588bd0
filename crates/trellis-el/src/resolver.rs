//! Resolver Seam
//!
//! The seam expressions call through. The production implementation is
//! `ScopedResolver`; `MapResolver` is a flat stand-in for tests and
//! embedders that manage their own variables.

use crate::{ElError, ElResult, ObjectRef, Value};

/// Variable and property resolution
///
/// With a `base` object the call targets that object's own property bag and
/// the resolver does not intervene; with no base the name is a free
/// variable. A defined miss is `ElError::NotFound`, never a fault.
pub trait Resolver {
    /// Resolve `name` against `base`, or as a free variable if `base` is none
    fn get_value(&self, base: Option<&Value>, name: &str) -> ElResult<Value>;

    /// Assign `name` on `base`, or as a top-level variable if `base` is none
    fn set_value(&self, base: Option<&Value>, name: &str, value: Value) -> ElResult<()>;
}

/// Resolve a property against a base value
///
/// Shared by resolver implementations: objects expose their bag, anything
/// else cannot carry properties.
pub(crate) fn property(base: &Value, name: &str) -> ElResult<Value> {
    match base {
        Value::Object(object) => object.get(name).ok_or_else(|| ElError::NotFound {
            name: name.to_string(),
        }),
        other => Err(ElError::Fault(format!(
            "cannot read property '{name}' of non-object {other:?}"
        ))),
    }
}

pub(crate) fn set_property(base: &Value, name: &str, value: Value) -> ElResult<()> {
    match base {
        Value::Object(object) => {
            object.set(name, value);
            Ok(())
        }
        other => Err(ElError::Fault(format!(
            "cannot set property '{name}' of non-object {other:?}"
        ))),
    }
}

/// Flat single-namespace resolver backed by one property bag
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    root: ObjectRef,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a top-level variable
    pub fn insert(&self, name: &str, value: Value) {
        self.root.set(name, value);
    }
}

impl Resolver for MapResolver {
    fn get_value(&self, base: Option<&Value>, name: &str) -> ElResult<Value> {
        match base {
            Some(base) => property(base, name),
            None => self.root.get(name).ok_or_else(|| ElError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn set_value(&self, base: Option<&Value>, name: &str, value: Value) -> ElResult<()> {
        match base {
            Some(base) => set_property(base, name, value),
            None => {
                self.root.set(name, value);
                Ok(())
            }
        }
    }
}
