//! Scoped Resolver
//!
//! The production resolver: pseudo-scopes first, then the request and
//! session attribute stores, then lazy managed-bean creation out of the
//! bean map. Instances are cached into the store matching their declared
//! scope, so a factory runs at most once per scope lifetime per name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::resolver::{property, set_property};
use crate::{BeanMap, ElError, ElResult, ObjectRef, Resolver, Scope, ScopeMap, Value};

/// Implicit object exposing request parameters
pub const PARAM_SCOPE: &str = "param";
/// Implicit object exposing request headers
pub const HEADER_SCOPE: &str = "header";
/// Implicit object exposing application init parameters
pub const INIT_PARAM_SCOPE: &str = "initParam";

/// Resolver over the well-known pseudo-scopes, the scoped attribute stores
/// and the configured bean map
#[derive(Debug, Clone)]
pub struct ScopedResolver {
    params: ObjectRef,
    headers: ObjectRef,
    init_params: ObjectRef,
    request: ScopeMap,
    session: Option<ScopeMap>,
    application: ScopeMap,
    beans: Arc<BeanMap>,
}

impl ScopedResolver {
    pub fn new(
        request: ScopeMap,
        session: Option<ScopeMap>,
        application: ScopeMap,
        beans: Arc<BeanMap>,
    ) -> Self {
        Self {
            params: ObjectRef::new(),
            headers: ObjectRef::new(),
            init_params: ObjectRef::new(),
            request,
            session,
            application,
            beans,
        }
    }

    /// Snapshot the request parameters into the `param` pseudo-scope
    pub fn with_params(mut self, params: &HashMap<String, String>) -> Self {
        self.params = snapshot(params);
        self
    }

    /// Snapshot the request headers into the `header` pseudo-scope
    pub fn with_headers(mut self, headers: &HashMap<String, String>) -> Self {
        self.headers = snapshot(headers);
        self
    }

    /// Snapshot the init parameters into the `initParam` pseudo-scope
    pub fn with_init_params(mut self, init_params: &HashMap<String, String>) -> Self {
        self.init_params = snapshot(init_params);
        self
    }

    /// The per-request attribute store
    pub fn request_scope(&self) -> &ScopeMap {
        &self.request
    }

    fn resolve_variable(&self, name: &str) -> ElResult<Value> {
        // 1. Well-known pseudo-scopes, by name equality
        match name {
            PARAM_SCOPE => return Ok(Value::Object(self.params.clone())),
            HEADER_SCOPE => return Ok(Value::Object(self.headers.clone())),
            INIT_PARAM_SCOPE => return Ok(Value::Object(self.init_params.clone())),
            _ => {}
        }

        // 2. Request, then session attributes (no session is just a miss)
        if let Some(value) = self.request.get(name) {
            return Ok(value);
        }
        if let Some(session) = &self.session {
            if let Some(value) = session.get(name) {
                return Ok(value);
            }
        }

        // 3. Lazy managed-bean creation
        let Some(binding) = self.beans.binding(name) else {
            return Err(ElError::NotFound { name: name.to_string() });
        };

        let store = match binding.scope {
            Scope::Request => &self.request,
            Scope::Session => self.session.as_ref().ok_or_else(|| {
                ElError::Fault(format!(
                    "bean '{name}' is session-scoped but no session exists"
                ))
            })?,
            Scope::Application => &self.application,
        };

        let value = store.get_or_insert_with(name, || {
            tracing::debug!("creating managed bean '{}' in {} scope", name, binding.scope);
            binding.instantiate()
        });
        Ok(value)
    }
}

impl Resolver for ScopedResolver {
    fn get_value(&self, base: Option<&Value>, name: &str) -> ElResult<Value> {
        match base {
            Some(base) => property(base, name),
            None => self.resolve_variable(name),
        }
    }

    fn set_value(&self, base: Option<&Value>, name: &str, value: Value) -> ElResult<()> {
        match base {
            // With a base the object's own setter applies; the resolver
            // does not intervene.
            Some(base) => set_property(base, name, value),
            // Top-level writes land in the request store, bypassing bean
            // creation.
            None => {
                self.request.put(name, value);
                Ok(())
            }
        }
    }
}

fn snapshot(entries: &HashMap<String, String>) -> ObjectRef {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resolver_with_beans(session: Option<ScopeMap>, beans: BeanMap) -> ScopedResolver {
        ScopedResolver::new(ScopeMap::new(), session, ScopeMap::new(), Arc::new(beans))
    }

    #[test]
    fn test_pseudo_scope_wins() {
        let mut params = HashMap::new();
        params.insert("q".to_string(), "search".to_string());

        let resolver = resolver_with_beans(None, BeanMap::new()).with_params(&params);
        let object = resolver.get_value(None, PARAM_SCOPE).unwrap();
        let q = resolver.get_value(Some(&object), "q").unwrap();

        assert_eq!(q, Value::from("search"));
    }

    #[test]
    fn test_request_shadows_session() {
        let session = ScopeMap::new();
        session.put("who", Value::from("session"));

        let resolver = resolver_with_beans(Some(session), BeanMap::new());
        resolver.request_scope().put("who", Value::from("request"));

        assert_eq!(resolver.get_value(None, "who").unwrap(), Value::from("request"));
    }

    #[test]
    fn test_unresolved_is_not_found() {
        let resolver = resolver_with_beans(None, BeanMap::new());
        assert!(matches!(
            resolver.get_value(None, "nobody"),
            Err(ElError::NotFound { .. })
        ));
    }

    #[test]
    fn test_bean_created_once_per_session() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut registry = ClassRegistry::new();
        registry.register(
            "CounterBean",
            Arc::new(|| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Value::object()
            }),
        );
        let mut beans = BeanMap::new();
        beans.bind("counter", Scope::Session, "CounterBean", &registry).unwrap();
        let beans = Arc::new(beans);

        let session = ScopeMap::new();

        // Two separate requests sharing one session
        let first = ScopedResolver::new(
            ScopeMap::new(),
            Some(session.clone()),
            ScopeMap::new(),
            beans.clone(),
        );
        let a = first.get_value(None, "counter").unwrap();

        let second = ScopedResolver::new(
            ScopeMap::new(),
            Some(session.clone()),
            ScopeMap::new(),
            beans,
        );
        let b = second.get_value(None, "counter").unwrap();

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_session_bean_without_session_is_fault() {
        let mut registry = ClassRegistry::new();
        registry.register("UserBean", Arc::new(Value::object));
        let mut beans = BeanMap::new();
        beans.bind("user", Scope::Session, "UserBean", &registry).unwrap();

        let resolver = resolver_with_beans(None, beans);
        assert!(matches!(
            resolver.get_value(None, "user"),
            Err(ElError::Fault(_))
        ));
    }

    #[test]
    fn test_top_level_write_lands_in_request_scope() {
        let resolver = resolver_with_beans(None, BeanMap::new());
        resolver.set_value(None, "flag", Value::Bool(true)).unwrap();

        assert_eq!(resolver.request_scope().get("flag"), Some(Value::Bool(true)));
    }
}
