//! Trellis Tree - Component tree implementation
//!
//! Arena-based tree of polymorphic UI components: tag definitions supply
//! immutable attribute defaults, instance overlays shadow them, and the
//! tree drives attribute resolution (including the "rendered" pruning
//! predicate) through the expression resolver seam.

mod tag;
mod attr;
mod node;
mod tree;
mod event;
mod convert;
mod validate;

pub use tag::{TagDefinition, TagId, TagSet};
pub use attr::{AttrOverlay, AttrValue};
pub use node::{
    Component, ComponentKind, FormState, InputState, ViewState, MAX_VALIDATORS,
};
pub use tree::{Ancestors, Children, ComponentTree, DEFAULT_CLIENT_ID};
pub use event::{Event, EventKind};
pub use convert::{BoolConverter, ConvertError, Converter, IntConverter, NumberConverter};
pub use validate::{LengthValidator, NumberRangeValidator, RangeValidator, Validator, ValidatorError};

/// Well-known attribute names
pub mod attr_names {
    pub const ID: &str = "id";
    pub const RENDERED: &str = "rendered";
    pub const REQUIRED: &str = "required";
    pub const VALUE: &str = "value";
    pub const LABEL: &str = "label";
    pub const ACTION: &str = "action";
}

/// Component identifier (index into the tree arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    /// Sentinel for "no component"
    pub const NONE: ComponentId = ComponentId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Tree operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("component not found")]
    NotFound,
}
