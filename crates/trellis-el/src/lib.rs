//! Trellis EL - Expression evaluation and scoped resolution
//!
//! Evaluates pre-parsed property-path expressions against a resolver seam,
//! and provides the production resolver: pseudo-scopes, request/session/
//! application attribute stores, and lazily-instantiated managed beans.
//!
//! Expression *parsing* is a template-compiler concern; this crate only
//! evaluates paths that are already split into segments.

mod value;
mod expr;
mod resolver;
mod scope;
mod beans;
mod scoped;

pub use value::{ObjectRef, Value};
pub use expr::Expression;
pub use resolver::{MapResolver, Resolver};
pub use scope::{Scope, ScopeMap};
pub use beans::{BeanBinding, BeanFactory, BeanMap, ClassRegistry};
pub use scoped::{ScopedResolver, HEADER_SCOPE, INIT_PARAM_SCOPE, PARAM_SCOPE};

/// Result type for expression evaluation and resolution
pub type ElResult<T> = Result<T, ElError>;

/// Expression evaluation errors
///
/// `NotFound` is the expected "no value" outcome; reads treat it as null.
/// `Fault` is a real misuse (property access on a number, assignment through
/// an unresolved path) and is surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElError {
    #[error("'{name}' could not be resolved")]
    NotFound { name: String },

    #[error("expression fault: {0}")]
    Fault(String),
}
