//! Bean Bindings
//!
//! Configuration-time registries: a class registry (class name to factory)
//! and a bean map (bean name to scope plus factory). Both are populated at
//! application start and immutable afterwards; instantiated beans are
//! cached in the scope attribute stores, never here.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{ElError, ElResult, Scope, Value};

/// Constructs bean instances
pub trait BeanFactory: Send + Sync {
    fn create(&self) -> Value;
}

impl<F> BeanFactory for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn create(&self) -> Value {
        self()
    }
}

/// Class-name to factory registry, populated at configuration time
#[derive(Default)]
pub struct ClassRegistry {
    factories: HashMap<String, Arc<dyn BeanFactory>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a class name
    pub fn register(&mut self, class: impl Into<String>, factory: Arc<dyn BeanFactory>) {
        self.factories.insert(class.into(), factory);
    }

    /// Look up a factory by class name
    pub fn factory(&self, class: &str) -> Option<Arc<dyn BeanFactory>> {
        self.factories.get(class).cloned()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One bean configuration entry
#[derive(Clone)]
pub struct BeanBinding {
    pub scope: Scope,
    factory: Arc<dyn BeanFactory>,
}

impl BeanBinding {
    /// Construct a new bean instance
    pub fn instantiate(&self) -> Value {
        self.factory.create()
    }
}

impl fmt::Debug for BeanBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanBinding").field("scope", &self.scope).finish()
    }
}

/// Bean-name to binding map, populated at configuration time
#[derive(Debug, Default)]
pub struct BeanMap {
    bindings: HashMap<String, BeanBinding>,
}

impl BeanMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a bean name to a declared scope and a registered class
    ///
    /// The factory is resolved out of the class registry here, so a
    /// misconfigured class name surfaces at startup rather than during a
    /// request.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        scope: Scope,
        class: &str,
        registry: &ClassRegistry,
    ) -> ElResult<()> {
        let factory = registry.factory(class).ok_or_else(|| {
            ElError::Fault(format!("bean class '{class}' is not registered"))
        })?;
        self.bindings.insert(name.into(), BeanBinding { scope, factory });
        Ok(())
    }

    /// Look up a binding by bean name
    pub fn binding(&self, name: &str) -> Option<&BeanBinding> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_registered_class() {
        let mut registry = ClassRegistry::new();
        registry.register("UserBean", Arc::new(Value::object));

        let mut beans = BeanMap::new();
        beans.bind("user", Scope::Session, "UserBean", &registry).unwrap();

        let binding = beans.binding("user").unwrap();
        assert_eq!(binding.scope, Scope::Session);
        assert!(binding.instantiate().as_object().is_some());
    }

    #[test]
    fn test_bind_unknown_class_is_fault() {
        let registry = ClassRegistry::new();
        let mut beans = BeanMap::new();

        assert!(beans.bind("user", Scope::Request, "Ghost", &registry).is_err());
        assert!(beans.binding("user").is_none());
    }
}
