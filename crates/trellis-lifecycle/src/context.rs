//! Lifecycle Context
//!
//! Per-request state: the request seam, the scoped attribute stores, the
//! resolver built over them, the render short-circuit flag and the queued
//! per-field messages. Lifetime is exactly one request.

use std::collections::HashMap;

use trellis_el::{ScopeMap, ScopedResolver};

use crate::{EngineConfig, Message, Request, Severity};

/// Per-request lifecycle state
pub struct LifecycleContext<'r> {
    request: &'r dyn Request,
    request_scope: ScopeMap,
    session: Option<ScopeMap>,
    resolver: ScopedResolver,
    render_requested: bool,
    messages: HashMap<String, Vec<Message>>,
}

impl<'r> LifecycleContext<'r> {
    /// Build the context for one request
    ///
    /// `session` is the shared per-session attribute store, or none when
    /// the request carries no session.
    pub fn new(config: &EngineConfig, request: &'r dyn Request, session: Option<ScopeMap>) -> Self {
        let request_scope = ScopeMap::new();

        let params: HashMap<String, String> = request
            .parameter_names()
            .into_iter()
            .filter_map(|name| {
                request.parameter(name).map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        let headers: HashMap<String, String> = request
            .header_names()
            .into_iter()
            .filter_map(|name| {
                request.header(name).map(|value| (name.to_string(), value.to_string()))
            })
            .collect();

        let resolver = ScopedResolver::new(
            request_scope.clone(),
            session.clone(),
            config.application().clone(),
            config.beans(),
        )
        .with_params(&params)
        .with_headers(&headers)
        .with_init_params(config.init_params());

        Self {
            request,
            request_scope,
            session,
            resolver,
            render_requested: false,
            messages: HashMap::new(),
        }
    }

    /// The decoded request
    pub fn request(&self) -> &dyn Request {
        self.request
    }

    /// The resolver expressions evaluate against
    pub fn resolver(&self) -> &ScopedResolver {
        &self.resolver
    }

    /// The per-request attribute store
    pub fn request_scope(&self) -> &ScopeMap {
        &self.request_scope
    }

    /// The session attribute store, if a session exists
    pub fn session(&self) -> Option<&ScopeMap> {
        self.session.as_ref()
    }

    /// Request an immediate jump to Render Response
    pub fn render_response(&mut self) {
        self.render_requested = true;
    }

    /// Whether a jump to Render Response was requested
    pub fn is_render_requested(&self) -> bool {
        self.render_requested
    }

    /// Queue a message against a field's client id
    pub fn add_message(&mut self, client_id: &str, message: Message) {
        self.messages.entry(client_id.to_string()).or_default().push(message);
    }

    /// Messages queued against one client id
    pub fn messages(&self, client_id: &str) -> &[Message] {
        self.messages.get(client_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any error-severity message was queued
    pub fn has_error_messages(&self) -> bool {
        self.messages
            .values()
            .flatten()
            .any(|m| m.severity >= Severity::Error)
    }
}
