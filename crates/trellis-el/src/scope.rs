//! Scoped Attribute Stores
//!
//! Request, session and application attribute maps. Session and application
//! maps are shared across concurrent requests, so every map is a handle to
//! a mutex-guarded table; cloning clones the handle, not the contents.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::Value;

/// Lifetime class of a cached bean instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Request,
    Session,
    Application,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "request"),
            Self::Session => write!(f, "session"),
            Self::Application => write!(f, "application"),
        }
    }
}

/// Named attribute store for one scope instance
#[derive(Clone, Default)]
pub struct ScopeMap {
    attributes: Arc<Mutex<HashMap<String, Value>>>,
}

impl ScopeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attributes.lock().unwrap().get(name).cloned()
    }

    /// Store an attribute value
    pub fn put(&self, name: &str, value: Value) {
        self.attributes.lock().unwrap().insert(name.to_string(), value);
    }

    /// Remove an attribute
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.attributes.lock().unwrap().remove(name)
    }

    /// Check if an attribute exists
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.lock().unwrap().contains_key(name)
    }

    /// Get an attribute, inserting it from `create` on a miss
    ///
    /// The lock is held across the miss-check and the insert, so `create`
    /// runs at most once per name per scope lifetime even under racing
    /// requests on a shared session or application map.
    pub fn get_or_insert_with(&self, name: &str, create: impl FnOnce() -> Value) -> Value {
        let mut attributes = self.attributes.lock().unwrap();
        attributes
            .entry(name.to_string())
            .or_insert_with(create)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.attributes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ScopeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeMap({} attributes)", self.len())
    }
}
