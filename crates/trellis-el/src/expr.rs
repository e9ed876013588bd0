//! Property-Path Expressions
//!
//! An `Expression` is the pre-parsed form of a value binding: its source
//! text plus the property path. Evaluation folds the path through the
//! resolver seam; the first segment is a free variable name.

use crate::{ElError, ElResult, Resolver, Value};

/// Pre-parsed property-path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    text: String,
    path: Vec<String>,
}

impl Expression {
    /// Create an expression from its source text and pre-split path
    pub fn new(text: impl Into<String>, path: Vec<String>) -> Self {
        Self { text: text.into(), path }
    }

    /// Split a dotted path out of `#{...}` delimiters
    ///
    /// A loader convenience, not an EL parser: no operators, no literals,
    /// just `#{bean.prop.sub}` or a bare `bean.prop`.
    pub fn parse(text: &str) -> ElResult<Self> {
        let inner = text
            .strip_prefix("#{")
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(text);

        let path: Vec<String> = inner
            .split('.')
            .map(str::trim)
            .map(str::to_string)
            .collect();

        if path.iter().any(String::is_empty) {
            return Err(ElError::Fault(format!("malformed expression '{text}'")));
        }

        Ok(Self::new(text, path))
    }

    /// Source text of the expression
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Path segments
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Evaluate the expression against a resolver
    ///
    /// An unresolved name or missing property is not an error: the read
    /// yields null. A property access on a non-object value is a fault.
    pub fn evaluate(&self, resolver: &dyn Resolver) -> ElResult<Value> {
        let Some(first) = self.path.first() else {
            return Err(ElError::Fault(format!("empty expression '{}'", self.text)));
        };
        let mut current = match resolver.get_value(None, first) {
            Ok(value) => value,
            Err(ElError::NotFound { .. }) => return Ok(Value::Null),
            Err(fault) => return Err(fault),
        };

        for segment in &self.path[1..] {
            if current.is_null() {
                return Ok(Value::Null);
            }
            current = match resolver.get_value(Some(&current), segment) {
                Ok(value) => value,
                Err(ElError::NotFound { .. }) => return Ok(Value::Null),
                Err(fault) => return Err(fault),
            };
        }

        Ok(current)
    }

    /// Assign a value through the expression
    ///
    /// A single-segment path writes the top-level name through the
    /// resolver; a longer path evaluates everything but the last segment
    /// and delegates the final set to that base object. Assignment through
    /// an unresolved intermediate is a fault, unlike the read path.
    pub fn set_value(&self, resolver: &dyn Resolver, value: Value) -> ElResult<()> {
        let Some((last, base_path)) = self.path.split_last() else {
            return Err(ElError::Fault(format!("empty expression '{}'", self.text)));
        };

        if base_path.is_empty() {
            return resolver.set_value(None, last, value);
        }

        let mut base = resolver.get_value(None, &base_path[0]).map_err(|e| match e {
            ElError::NotFound { name } => {
                ElError::Fault(format!("cannot assign '{}': '{name}' is unresolved", self.text))
            }
            fault => fault,
        })?;

        for segment in &base_path[1..] {
            base = resolver.get_value(Some(&base), segment).map_err(|e| match e {
                ElError::NotFound { name } => ElError::Fault(format!(
                    "cannot assign '{}': '{name}' is unresolved",
                    self.text
                )),
                fault => fault,
            })?;
        }

        resolver.set_value(Some(&base), last, value)
    }
}
