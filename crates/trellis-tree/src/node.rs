//! Component Nodes
//!
//! One node per rendered or decoded UI element. Kinds form a closed set;
//! every kind shares the sibling links, the tag reference, the client id
//! and the attribute overlay.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use trellis_el::Value;

use crate::{AttrOverlay, ComponentId, Converter, Event, TagId, Validator};

/// Validator slot capacity per input
pub const MAX_VALIDATORS: usize = 5;

/// One node in the component tree
#[derive(Debug)]
pub struct Component {
    /// Parent component (NONE if root)
    pub parent: ComponentId,
    /// First child
    pub first_child: ComponentId,
    /// Last child (for O(1) append)
    pub last_child: ComponentId,
    /// Previous sibling
    pub prev_sibling: ComponentId,
    /// Next sibling
    pub next_sibling: ComponentId,
    /// The tag definition that created this component
    pub tag: TagId,
    /// Instance attribute overrides
    pub attrs: AttrOverlay,
    /// Kind-specific data
    pub kind: ComponentKind,
    client_id: Option<String>,
}

impl Component {
    pub fn new(tag: TagId, kind: ComponentKind) -> Self {
        Self {
            parent: ComponentId::NONE,
            first_child: ComponentId::NONE,
            last_child: ComponentId::NONE,
            prev_sibling: ComponentId::NONE,
            next_sibling: ComponentId::NONE,
            tag,
            attrs: AttrOverlay::new(),
            kind,
            client_id: None,
        }
    }

    /// Assigned client identifier, if initialization ran
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub(crate) fn set_client_id(&mut self, id: String) {
        self.client_id = Some(id);
    }

    #[inline]
    pub fn is_view(&self) -> bool {
        matches!(self.kind, ComponentKind::View(_))
    }

    #[inline]
    pub fn is_form(&self) -> bool {
        matches!(self.kind, ComponentKind::Form(_))
    }

    #[inline]
    pub fn as_input(&self) -> Option<&InputState> {
        match &self.kind {
            ComponentKind::Input(input) => Some(input),
            _ => None,
        }
    }

    #[inline]
    pub fn as_input_mut(&mut self) -> Option<&mut InputState> {
        match &mut self.kind {
            ComponentKind::Input(input) => Some(input),
            _ => None,
        }
    }

    #[inline]
    pub fn as_form(&self) -> Option<&FormState> {
        match &self.kind {
            ComponentKind::Form(form) => Some(form),
            _ => None,
        }
    }

    #[inline]
    pub fn as_form_mut(&mut self) -> Option<&mut FormState> {
        match &mut self.kind {
            ComponentKind::Form(form) => Some(form),
            _ => None,
        }
    }

    #[inline]
    pub fn as_view_mut(&mut self) -> Option<&mut ViewState> {
        match &mut self.kind {
            ComponentKind::View(view) => Some(view),
            _ => None,
        }
    }
}

/// Kind-specific component data
#[derive(Debug)]
pub enum ComponentKind {
    /// Tree root; owns the event queue
    View(ViewState),
    /// Form: decodes its submission marker before its children
    Form(FormState),
    /// Editable input with converter and validator slots
    Input(InputState),
    /// Action source (button)
    Command,
    /// Display-only value holder
    Output,
    /// Generic container with no phase behavior of its own
    Panel,
}

/// View root state
#[derive(Debug, Default)]
pub struct ViewState {
    pub(crate) events: VecDeque<Event>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

/// Form state
#[derive(Debug, Default)]
pub struct FormState {
    /// Whether this form's submission marker was present in the request
    pub submitted: bool,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Editable input state
pub struct InputState {
    /// Raw submitted string, if the field was present in the request
    pub submitted: Option<String>,
    /// Converted local value, pending model commit
    pub local: Option<Value>,
    /// Cleared by conversion or validation failure
    pub valid: bool,
    converter: Option<Arc<dyn Converter>>,
    validators: [Option<Arc<dyn Validator>>; MAX_VALIDATORS],
}

impl InputState {
    pub fn new() -> Self {
        Self {
            submitted: None,
            local: None,
            valid: true,
            converter: None,
            validators: [None, None, None, None, None],
        }
    }

    /// Register a validator in the next free slot
    ///
    /// Slots fill left-to-right; registering past capacity is a logged
    /// configuration error and the validator is discarded, never invoked.
    pub fn add_validator(&mut self, validator: Arc<dyn Validator>) {
        for slot in self.validators.iter_mut() {
            if slot.is_none() {
                *slot = Some(validator);
                return;
            }
        }
        tracing::error!(
            "validator capacity ({}) exceeded, discarding validator",
            MAX_VALIDATORS
        );
    }

    /// Iterate registered validators in slot order
    pub fn validators(&self) -> impl Iterator<Item = &Arc<dyn Validator>> {
        self.validators.iter().filter_map(Option::as_ref)
    }

    pub fn validator_count(&self) -> usize {
        self.validators().count()
    }

    pub fn set_converter(&mut self, converter: Arc<dyn Converter>) {
        self.converter = Some(converter);
    }

    pub fn converter(&self) -> Option<&Arc<dyn Converter>> {
        self.converter.as_ref()
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputState")
            .field("submitted", &self.submitted)
            .field("local", &self.local)
            .field("valid", &self.valid)
            .field("validators", &self.validator_count())
            .finish()
    }
}
