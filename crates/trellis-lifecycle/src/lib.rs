//! Trellis Lifecycle - Request processing engine
//!
//! Drives a component tree through the fixed per-request phase sequence:
//! apply request values (decode), process validations, update model
//! values, invoke application (event dispatch), render response. A
//! validation or conversion failure short-circuits straight to rendering,
//! so invalid submissions never touch the model.
//!
//! # Example
//! ```rust,ignore
//! use trellis_lifecycle::{EngineConfig, LifecycleContext, LifecycleEngine, BufferWriter};
//!
//! let engine = LifecycleEngine::new(EngineConfig::new());
//! let mut ctx = LifecycleContext::new(engine.config(), &request, Some(session));
//! let mut writer = BufferWriter::new();
//! engine.execute(&mut tree, root, &tags, &mut ctx, &mut writer)?;
//! ```

mod request;
mod message;
mod context;
mod event;
mod render;
mod engine;

pub use request::{MockRequest, Part, Request};
pub use message::{keys, Message, MessageBundle, Severity};
pub use context::LifecycleContext;
pub use event::{ActionEvent, ActionListener, DefaultActionListener};
pub use render::{
    encode_component, BufferWriter, RenderError, RenderResult, ResponseWriter,
    SUBMIT_MARKER_SUFFIX,
};
pub use engine::{EngineConfig, LifecycleEngine};

// Re-export sub-crates for embedders
pub use trellis_el as el;
pub use trellis_tree as tree;

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Lifecycle errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Tree(#[from] trellis_tree::TreeError),

    #[error(transparent)]
    El(#[from] trellis_el::ElError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
