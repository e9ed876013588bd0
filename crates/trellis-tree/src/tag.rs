//! Tag Definitions
//!
//! Immutable template metadata produced by the (external) template
//! compiler: a tag's name plus its static attribute defaults. Trees hold
//! `TagId` references; the tag set must outlive every tree built from it.

use crate::AttrValue;
use std::collections::HashMap;

/// Tag identifier (index into the tag set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(pub(crate) u32);

/// One tag definition: name and static attribute defaults
#[derive(Debug, Clone)]
pub struct TagDefinition {
    name: String,
    attributes: HashMap<String, AttrValue>,
}

impl TagDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
        }
    }

    /// Add a static attribute default (builder style)
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Static default for an attribute, literal or expression
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Iterate the static attribute defaults
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Arena of tag definitions
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    tags: Vec<TagDefinition>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag definition
    pub fn register(&mut self, tag: TagDefinition) -> TagId {
        let id = TagId(self.tags.len() as u32);
        self.tags.push(tag);
        id
    }

    /// Get a tag definition by id
    pub fn get(&self, id: TagId) -> Option<&TagDefinition> {
        self.tags.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_el::Value;

    #[test]
    fn test_register_and_get() {
        let mut tags = TagSet::new();
        let id = tags.register(
            TagDefinition::new("input").with_attribute("size", AttrValue::Literal(Value::Int(20))),
        );

        let tag = tags.get(id).unwrap();
        assert_eq!(tag.name(), "input");
        assert!(tag.attribute("size").is_some());
        assert!(tag.attribute("missing").is_none());
    }
}
