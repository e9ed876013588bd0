//! Lifecycle Engine
//!
//! Drives the ordered phase sequence over a component tree: apply request
//! values, process validations, update model values, invoke application,
//! render response. Any validation or conversion failure requests an
//! immediate jump to rendering, so partial submissions never reach the
//! model.

use std::collections::HashMap;
use std::sync::Arc;

use trellis_el::{BeanMap, ClassRegistry, ElResult, ScopeMap, Value};
use trellis_tree::{
    attr_names, AttrValue, Component, ComponentId, ComponentKind, ComponentTree, Event, TagSet,
    Validator, DEFAULT_CLIENT_ID,
};

use crate::event::broadcast;
use crate::message::keys;
use crate::render::{encode_component, ResponseWriter, SUBMIT_MARKER_SUFFIX};
use crate::{ActionListener, LifecycleContext, LifecycleResult, Message, MessageBundle};

/// Application-startup configuration
///
/// Built once, owned by the engine, passed by reference into every phase.
/// There is no global mutable state behind it.
#[derive(Default)]
pub struct EngineConfig {
    bundle: MessageBundle,
    classes: ClassRegistry,
    beans: Arc<BeanMap>,
    action_listener: Option<Arc<dyn ActionListener>>,
    application: ScopeMap,
    init_params: HashMap<String, String>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the bean registries (builder style)
    pub fn with_beans(mut self, classes: ClassRegistry, beans: BeanMap) -> Self {
        self.classes = classes;
        self.beans = Arc::new(beans);
        self
    }

    /// Register the application's action listener
    pub fn with_action_listener(mut self, listener: Arc<dyn ActionListener>) -> Self {
        self.action_listener = Some(listener);
        self
    }

    /// Override a message template
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.bundle.set(key, template);
        self
    }

    /// Add an application init parameter
    pub fn with_init_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.init_params.insert(name.into(), value.into());
        self
    }

    pub fn bundle(&self) -> &MessageBundle {
        &self.bundle
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn beans(&self) -> Arc<BeanMap> {
        self.beans.clone()
    }

    pub fn action_listener(&self) -> Option<&Arc<dyn ActionListener>> {
        self.action_listener.as_ref()
    }

    /// The application-lifetime attribute store
    pub fn application(&self) -> &ScopeMap {
        &self.application
    }

    pub fn init_params(&self) -> &HashMap<String, String> {
        &self.init_params
    }
}

/// The per-request phase driver
pub struct LifecycleEngine {
    config: EngineConfig,
}

impl LifecycleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one request end-to-end
    ///
    /// The tree was already materialized by view restoration. After each
    /// phase the short-circuit flag is checked; once set, control jumps
    /// straight to Render Response.
    pub fn execute(
        &self,
        tree: &mut ComponentTree,
        root: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
        writer: &mut dyn ResponseWriter,
    ) -> LifecycleResult<()> {
        tree.init(root, tags, ctx.resolver())?;

        tracing::debug!("phase: apply request values");
        self.apply_request_values(tree, root, tags, ctx)?;

        if !ctx.is_render_requested() {
            tracing::debug!("phase: process validations");
            self.process_validations(tree, root, tags, ctx)?;
        }

        if !ctx.is_render_requested() {
            tracing::debug!("phase: update model values");
            self.update_model_values(tree, root, tags, ctx)?;
        }

        if !ctx.is_render_requested() {
            tracing::debug!("phase: invoke application");
            self.invoke_application(tree, root, ctx);
        }

        tracing::debug!("phase: render response");
        encode_component(tree, root, tags, ctx, writer)
    }

    // ------------------------------------------------------------------
    // Apply Request Values
    // ------------------------------------------------------------------

    fn apply_request_values(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
    ) -> LifecycleResult<()> {
        if !tree.is_rendered(id, tags, ctx.resolver())? {
            return Ok(());
        }

        // A form decodes its submission marker before its children; the
        // children of a non-submitted form never decode.
        if tree.get(id).is_some_and(Component::is_form) {
            self.decode_form(tree, id, ctx);
            let submitted = tree
                .get(id)
                .and_then(Component::as_form)
                .is_some_and(|form| form.submitted);
            if !submitted {
                return Ok(());
            }
            for child in tree.children(id).collect::<Vec<_>>() {
                self.apply_request_values(tree, child, tags, ctx)?;
            }
            return Ok(());
        }

        // Default ordering: children decode before the node itself.
        for child in tree.children(id).collect::<Vec<_>>() {
            self.apply_request_values(tree, child, tags, ctx)?;
        }
        self.decode(tree, id, tags, ctx)
    }

    fn decode_form(&self, tree: &mut ComponentTree, id: ComponentId, ctx: &LifecycleContext<'_>) {
        let client_id = client_id_of(tree, id);
        let marker = format!("{client_id}{SUBMIT_MARKER_SUFFIX}");
        let submitted = ctx.request().parameter(&marker).is_some();

        if submitted {
            tracing::debug!("form '{}' submitted", client_id);
        }
        if let Some(form) = tree.get_mut(id).and_then(Component::as_form_mut) {
            form.submitted = submitted;
        }
    }

    fn decode(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
    ) -> LifecycleResult<()> {
        let is_input = tree.get(id).is_some_and(|c| c.as_input().is_some());
        if is_input {
            return self.decode_input(tree, id, tags, ctx);
        }

        let is_command = tree
            .get(id)
            .is_some_and(|c| matches!(c.kind, ComponentKind::Command));
        if is_command {
            self.decode_command(tree, id, tags, ctx);
        }
        Ok(())
    }

    fn decode_input(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
    ) -> LifecycleResult<()> {
        let client_id = client_id_of(tree, id);
        // A plain parameter, or the filename of an uploaded part; absence
        // of both means the field was not submitted.
        let raw = match ctx.request().parameter(&client_id).map(str::to_string) {
            Some(raw) => Some(raw),
            None => {
                let mut uploaded = None;
                ctx.request().process_part(&client_id, &mut |part| {
                    uploaded = Some(part.filename.clone().unwrap_or_default());
                });
                uploaded
            }
        };
        let Some(raw) = raw else {
            return Ok(());
        };

        let converter = tree
            .get(id)
            .and_then(Component::as_input)
            .and_then(|input| input.converter().cloned());

        let converted = match &converter {
            Some(converter) => converter.to_value(&raw),
            None => Ok(Value::String(raw.clone())),
        };

        match converted {
            Ok(value) => {
                if let Some(input) = tree.get_mut(id).and_then(Component::as_input_mut) {
                    input.submitted = Some(raw);
                    input.local = Some(value);
                }
            }
            Err(err) => {
                tracing::warn!("conversion failed for '{}' (raw '{}'): {}", client_id, raw, err);
                let label = self.field_label(tree, id, tags, ctx)?;
                let summary = self.config.bundle().format(keys::CONVERSION, &label, &[]);
                if let Some(input) = tree.get_mut(id).and_then(Component::as_input_mut) {
                    input.submitted = Some(raw);
                    input.local = None;
                    input.valid = false;
                }
                ctx.add_message(&client_id, Message::error(summary));
                ctx.render_response();
            }
        }
        Ok(())
    }

    fn decode_command(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &LifecycleContext<'_>,
    ) {
        let client_id = client_id_of(tree, id);
        if ctx.request().parameter(&client_id).is_none() {
            return;
        }

        let action = tree
            .attr_source(id, tags, attr_names::ACTION)
            .and_then(AttrValue::as_expr)
            .cloned();
        tracing::debug!("command '{}' activated", client_id);
        tree.queue_event(id, Event::action(id, action));
    }

    // ------------------------------------------------------------------
    // Process Validations
    // ------------------------------------------------------------------

    fn process_validations(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
    ) -> LifecycleResult<()> {
        if !tree.is_rendered(id, tags, ctx.resolver())? {
            return Ok(());
        }

        if tree.get(id).and_then(Component::as_input).is_some() {
            self.validate_input(tree, id, tags, ctx)?;
        }
        for child in tree.children(id).collect::<Vec<_>>() {
            self.process_validations(tree, child, tags, ctx)?;
        }
        Ok(())
    }

    fn validate_input(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
    ) -> LifecycleResult<()> {
        let Some((submitted, local, valid)) = tree
            .get(id)
            .and_then(Component::as_input)
            .map(|input| (input.submitted.clone(), input.local.clone(), input.valid))
        else {
            return Ok(());
        };

        // Field absent from the submission: nothing to validate.
        let Some(raw) = submitted else {
            return Ok(());
        };
        let value = local.unwrap_or(Value::String(raw));
        let client_id = client_id_of(tree, id);

        if value.is_empty() {
            let required = tree
                .attribute(id, tags, ctx.resolver(), attr_names::REQUIRED)?
                .map_or(true, |v| v.as_bool());
            if required && valid {
                tracing::debug!("required value missing for '{}'", client_id);
                let label = self.field_label(tree, id, tags, ctx)?;
                let summary = self.config.bundle().format(keys::REQUIRED, &label, &[]);
                if let Some(input) = tree.get_mut(id).and_then(Component::as_input_mut) {
                    input.valid = false;
                }
                ctx.add_message(&client_id, Message::error(summary));
                ctx.render_response();
            }
            return Ok(());
        }

        if !valid {
            return Ok(());
        }

        let validators: Vec<Arc<dyn Validator>> = tree
            .get(id)
            .and_then(Component::as_input)
            .map(|input| input.validators().cloned().collect())
            .unwrap_or_default();

        for validator in validators {
            if let Err(failure) = validator.validate(&value) {
                tracing::debug!("validation failed for '{}': {}", client_id, failure.message_key);
                let label = self.field_label(tree, id, tags, ctx)?;
                let summary = self
                    .config
                    .bundle()
                    .format(failure.message_key, &label, &failure.args);
                if let Some(input) = tree.get_mut(id).and_then(Component::as_input_mut) {
                    input.valid = false;
                }
                ctx.add_message(&client_id, Message::error(summary));
                ctx.render_response();
                // One error message per field per request
                break;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Update Model Values
    // ------------------------------------------------------------------

    fn update_model_values(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
    ) -> LifecycleResult<()> {
        if !tree.is_rendered(id, tags, ctx.resolver())? {
            return Ok(());
        }

        for child in tree.children(id).collect::<Vec<_>>() {
            self.update_model_values(tree, child, tags, ctx)?;
        }
        self.update_input(tree, id, tags, ctx)
    }

    fn update_input(
        &self,
        tree: &mut ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &mut LifecycleContext<'_>,
    ) -> LifecycleResult<()> {
        let Some(local) = tree
            .get(id)
            .and_then(Component::as_input)
            .filter(|input| input.valid)
            .and_then(|input| input.local.clone())
        else {
            return Ok(());
        };

        let Some(expr) = tree
            .attr_source(id, tags, attr_names::VALUE)
            .and_then(AttrValue::as_expr)
            .cloned()
        else {
            // Literal or missing "value": nothing to commit.
            return Ok(());
        };

        let client_id = client_id_of(tree, id);
        match expr.set_value(ctx.resolver(), local) {
            Ok(()) => {
                tracing::debug!("committed '{}' to {}", client_id, expr.text());
                if let Some(input) = tree.get_mut(id).and_then(Component::as_input_mut) {
                    input.submitted = None;
                    input.local = None;
                }
            }
            Err(err) => {
                tracing::error!("model update failed for '{}': {}", client_id, err);
                let label = self.field_label(tree, id, tags, ctx)?;
                let summary = self.config.bundle().format(keys::CONVERSION, &label, &[]);
                if let Some(input) = tree.get_mut(id).and_then(Component::as_input_mut) {
                    input.valid = false;
                }
                ctx.add_message(&client_id, Message::error(summary));
                ctx.render_response();
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Invoke Application
    // ------------------------------------------------------------------

    fn invoke_application(
        &self,
        tree: &mut ComponentTree,
        root: ComponentId,
        ctx: &mut LifecycleContext<'_>,
    ) {
        for event in tree.drain_events(root) {
            broadcast(tree, &event, ctx, &self.config);
        }
    }

    // ------------------------------------------------------------------

    /// The label used in user-facing messages: the "label" attribute,
    /// falling back to the client id
    fn field_label(
        &self,
        tree: &ComponentTree,
        id: ComponentId,
        tags: &TagSet,
        ctx: &LifecycleContext<'_>,
    ) -> ElResult<String> {
        let label = tree.attribute(id, tags, ctx.resolver(), attr_names::LABEL)?;
        Ok(match label {
            Some(value) if !value.is_empty() => value.coerce_string(),
            _ => tree
                .get(id)
                .and_then(Component::client_id)
                .unwrap_or(DEFAULT_CLIENT_ID)
                .to_string(),
        })
    }
}

fn client_id_of(tree: &ComponentTree, id: ComponentId) -> String {
    tree.get(id)
        .and_then(Component::client_id)
        .unwrap_or(DEFAULT_CLIENT_ID)
        .to_string()
}
