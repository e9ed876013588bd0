//! Attribute Overlay
//!
//! Per-component instance attributes shadowing the tag's static defaults.
//! An entry holds either a literal or an unevaluated expression; setting
//! one form replaces the other.

use trellis_el::{ElResult, Expression, Resolver, Value};

/// A literal value or an unevaluated expression
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Literal(Value),
    Expr(Expression),
}

impl AttrValue {
    /// Resolve to a value: literals as-is, expressions through the resolver
    pub fn resolve(&self, resolver: &dyn Resolver) -> ElResult<Value> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Expr(expr) => expr.evaluate(resolver),
        }
    }

    /// The expression, if this entry holds one
    pub fn as_expr(&self) -> Option<&Expression> {
        match self {
            Self::Expr(expr) => Some(expr),
            Self::Literal(_) => None,
        }
    }
}

/// Instance override list, searched before the tag defaults
///
/// At most one entry per name. `set` updates in place when the name is
/// already overridden, else prepends, so lookup order is
/// most-recently-set-first.
#[derive(Debug, Clone, Default)]
pub struct AttrOverlay {
    entries: Vec<(String, AttrValue)>,
}

impl AttrOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// First matching override
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Override an attribute, replacing any previous literal or expression
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.insert(0, (name, value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate overrides, most-recently-set first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}
