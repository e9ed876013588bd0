//! Component Tree (arena-based allocation)
//!
//! Nodes are addressed by stable `ComponentId` indices; parent, child and
//! sibling relations are index fields. Removal vacates slots onto a
//! free-list, so a stale id is a defined miss rather than a dangling
//! pointer.

use trellis_el::{ElResult, Expression, Resolver, Value};

use crate::{
    attr_names, AttrValue, Component, ComponentId, Event, TagSet, TreeError, TreeResult,
};

/// Placeholder client id assigned when no static "id" attribute is present;
/// the surrounding view layer uniquifies it.
pub const DEFAULT_CLIENT_ID: &str = "_id_";

/// Arena-based component tree
#[derive(Debug, Default)]
pub struct ComponentTree {
    slots: Vec<Option<Component>>,
    free: Vec<u32>,
}

impl ComponentTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a component, reusing a vacated slot when one exists
    pub fn create(&mut self, component: Component) -> ComponentId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(component);
                ComponentId(index)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Some(component));
                ComponentId(index)
            }
        }
    }

    /// Get a component by id
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        if id.is_none() {
            return None;
        }
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Get a mutable component by id
    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        if id.is_none() {
            return None;
        }
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Number of live components
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Check if the tree has no live components
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Attach `child` as the last child of `parent`
    ///
    /// O(1) via the maintained last-child index. Fails only when the
    /// parent id does not address a live component.
    pub fn append_child(&mut self, parent: ComponentId, child: ComponentId) -> TreeResult<()> {
        if self.get(parent).is_none() {
            return Err(TreeError::NotFound);
        }
        if self.get(child).is_none() {
            return Err(TreeError::NotFound);
        }

        let prev_last = self.get(parent).map(|p| p.last_child).unwrap_or(ComponentId::NONE);

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = prev_last;
            node.next_sibling = ComponentId::NONE;
        }

        if prev_last.is_some() {
            if let Some(last) = self.get_mut(prev_last) {
                last.next_sibling = child;
            }
        }

        if let Some(node) = self.get_mut(parent) {
            if node.first_child.is_none() {
                node.first_child = child;
            }
            node.last_child = child;
        }

        Ok(())
    }

    /// Recursively remove a subtree
    ///
    /// Children are vacated bottom-up, then the node itself; sibling and
    /// parent links of the survivors are repaired. Safe on `NONE` and on
    /// an already-vacant id (no-op, including a second remove of the same
    /// id).
    pub fn remove(&mut self, id: ComponentId) {
        if self.get(id).is_none() {
            return;
        }
        self.unlink(id);
        self.vacate_subtree(id);
    }

    fn unlink(&mut self, id: ComponentId) {
        let (parent, prev, next) = match self.get(id) {
            Some(node) => (node.parent, node.prev_sibling, node.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(node) = self.get_mut(prev) {
                node.next_sibling = next;
            }
        } else if let Some(node) = self.get_mut(parent) {
            node.first_child = next;
        }

        if next.is_some() {
            if let Some(node) = self.get_mut(next) {
                node.prev_sibling = prev;
            }
        } else if let Some(node) = self.get_mut(parent) {
            node.last_child = prev;
        }
    }

    fn vacate_subtree(&mut self, id: ComponentId) {
        let children: Vec<ComponentId> = self.children(id).collect();
        for child in children {
            self.vacate_subtree(child);
        }
        if let Some(slot) = self.slots.get_mut(id.0 as usize) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    /// Iterate the direct children of a component
    pub fn children(&self, id: ComponentId) -> Children<'_> {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(ComponentId::NONE);
        Children { tree: self, next: first }
    }

    /// Iterate ancestors, starting from the parent
    pub fn ancestors(&self, id: ComponentId) -> Ancestors<'_> {
        let parent = self.get(id).map(|n| n.parent).unwrap_or(ComponentId::NONE);
        Ancestors { tree: self, next: parent }
    }

    // ------------------------------------------------------------------
    // Attribute resolution
    // ------------------------------------------------------------------

    /// The literal-or-expression source for an attribute: instance
    /// overrides first, then the tag's static default
    pub fn attr_source<'a>(
        &'a self,
        id: ComponentId,
        tags: &'a TagSet,
        name: &str,
    ) -> Option<&'a AttrValue> {
        let node = self.get(id)?;
        if let Some(value) = node.attrs.get(name) {
            return Some(value);
        }
        tags.get(node.tag)?.attribute(name)
    }

    /// Resolve an attribute to a value
    ///
    /// Literals are returned as-is; expressions are evaluated through the
    /// resolver. `None` means neither the overlay nor the tag defines the
    /// attribute.
    pub fn attribute(
        &self,
        id: ComponentId,
        tags: &TagSet,
        resolver: &dyn Resolver,
        name: &str,
    ) -> ElResult<Option<Value>> {
        match self.attr_source(id, tags, name) {
            Some(source) => source.resolve(resolver).map(Some),
            None => Ok(None),
        }
    }

    /// Override an attribute with a literal, clearing any expression
    pub fn set_attribute_value(&mut self, id: ComponentId, name: &str, value: Value) {
        if let Some(node) = self.get_mut(id) {
            node.attrs.set(name, AttrValue::Literal(value));
        }
    }

    /// Override an attribute with an expression, clearing any literal
    pub fn set_attribute_expr(&mut self, id: ComponentId, name: &str, expr: Expression) {
        if let Some(node) = self.get_mut(id) {
            node.attrs.set(name, AttrValue::Expr(expr));
        }
    }

    /// The pruning predicate applied by every phase
    ///
    /// Absence of the "rendered" attribute defaults to true.
    pub fn is_rendered(
        &self,
        id: ComponentId,
        tags: &TagSet,
        resolver: &dyn Resolver,
    ) -> ElResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let rendered = self.attribute(id, tags, resolver, attr_names::RENDERED)?;
        Ok(rendered.map_or(true, |value| value.as_bool()))
    }

    /// Assign client identifiers across a subtree
    ///
    /// A static "id" attribute is evaluated to a string; otherwise the
    /// deterministic placeholder is assigned. Already-assigned ids are
    /// kept.
    pub fn init(
        &mut self,
        id: ComponentId,
        tags: &TagSet,
        resolver: &dyn Resolver,
    ) -> ElResult<()> {
        if self.get(id).is_none() {
            return Ok(());
        }

        let needs_id = self.get(id).is_some_and(|node| node.client_id().is_none());
        if needs_id {
            let assigned = match self.attr_source(id, tags, attr_names::ID) {
                Some(source) => source.resolve(resolver)?.coerce_string(),
                None => DEFAULT_CLIENT_ID.to_string(),
            };
            if let Some(node) = self.get_mut(id) {
                node.set_client_id(assigned);
            }
        }

        let children: Vec<ComponentId> = self.children(id).collect();
        for child in children {
            self.init(child, tags, resolver)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event queue
    // ------------------------------------------------------------------

    /// Queue an event at the view root
    ///
    /// The queuing notification delegates up the parent chain; only the
    /// view root retains events. A detached component's event is dropped
    /// with a diagnostic.
    pub fn queue_event(&mut self, from: ComponentId, event: Event) {
        let mut current = from;
        while current.is_some() {
            let is_view = self.get(current).is_some_and(Component::is_view);
            if is_view {
                if let Some(view) = self.get_mut(current).and_then(Component::as_view_mut) {
                    view.events.push_back(event);
                }
                return;
            }
            current = self.get(current).map(|n| n.parent).unwrap_or(ComponentId::NONE);
        }
        tracing::warn!("event queued on a detached component, dropping");
    }

    /// Drain the root's queued events in FIFO enqueue order
    pub fn drain_events(&mut self, root: ComponentId) -> Vec<Event> {
        match self.get_mut(root).and_then(Component::as_view_mut) {
            Some(view) => view.events.drain(..).collect(),
            None => Vec::new(),
        }
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a ComponentTree,
    next: ComponentId,
}

impl Iterator for Children<'_> {
    type Item = ComponentId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let current = self.next;
        self.next = self
            .tree
            .get(current)
            .map(|n| n.next_sibling)
            .unwrap_or(ComponentId::NONE);
        Some(current)
    }
}

/// Iterator over ancestors
pub struct Ancestors<'a> {
    tree: &'a ComponentTree,
    next: ComponentId,
}

impl Iterator for Ancestors<'_> {
    type Item = ComponentId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let current = self.next;
        self.next = self
            .tree
            .get(current)
            .map(|n| n.parent)
            .unwrap_or(ComponentId::NONE);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentKind, TagDefinition, ViewState};
    use trellis_el::MapResolver;

    fn tag_set() -> (TagSet, crate::TagId) {
        let mut tags = TagSet::new();
        let tag = tags.register(TagDefinition::new("panel"));
        (tags, tag)
    }

    fn panel(tag: crate::TagId) -> Component {
        Component::new(tag, ComponentKind::Panel)
    }

    #[test]
    fn test_append_maintains_sibling_links() {
        let (_, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let root = tree.create(panel(tag));
        let a = tree.create(panel(tag));
        let b = tree.create(panel(tag));
        let c = tree.create(panel(tag));

        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.append_child(root, c).unwrap();

        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children, vec![a, b, c]);
        assert_eq!(tree.get(root).unwrap().last_child, c);
        assert_eq!(tree.get(b).unwrap().prev_sibling, a);
    }

    #[test]
    fn test_append_to_missing_parent_fails() {
        let (_, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let child = tree.create(panel(tag));

        assert_eq!(
            tree.append_child(ComponentId::NONE, child),
            Err(TreeError::NotFound)
        );
    }

    #[test]
    fn test_remove_subtree() {
        let (_, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let root = tree.create(panel(tag));
        let child = tree.create(panel(tag));
        let grandchild = tree.create(panel(tag));
        tree.append_child(root, child).unwrap();
        tree.append_child(child, grandchild).unwrap();

        tree.remove(root);

        assert!(tree.is_empty());
        assert!(tree.get(root).is_none());
        assert!(tree.get(grandchild).is_none());
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let (_, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let root = tree.create(panel(tag));
        let child = tree.create(panel(tag));
        tree.append_child(root, child).unwrap();

        tree.remove(child);
        tree.remove(child);
        tree.remove(ComponentId::NONE);

        assert_eq!(tree.len(), 1);
        assert!(tree.children(root).next().is_none());
        assert_eq!(tree.get(root).unwrap().last_child, ComponentId::NONE);
    }

    #[test]
    fn test_remove_middle_sibling_repairs_links() {
        let (_, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let root = tree.create(panel(tag));
        let a = tree.create(panel(tag));
        let b = tree.create(panel(tag));
        let c = tree.create(panel(tag));
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.append_child(root, c).unwrap();

        tree.remove(b);

        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children, vec![a, c]);
        assert_eq!(tree.get(c).unwrap().prev_sibling, a);
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let (_, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let root = tree.create(panel(tag));
        let child = tree.create(panel(tag));
        tree.append_child(root, child).unwrap();
        tree.remove(child);

        let replacement = tree.create(panel(tag));
        assert_eq!(replacement, child); // vacated slot is reused
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_instance_literal_wins_over_tag_default() {
        let mut tags = TagSet::new();
        let tag = tags.register(
            TagDefinition::new("input")
                .with_attribute("size", AttrValue::Literal(Value::Int(20))),
        );
        let mut tree = ComponentTree::new();
        let resolver = MapResolver::new();
        let node = tree.create(Component::new(tag, ComponentKind::Panel));

        assert_eq!(
            tree.attribute(node, &tags, &resolver, "size").unwrap(),
            Some(Value::Int(20))
        );

        tree.set_attribute_value(node, "size", Value::Int(40));
        assert_eq!(
            tree.attribute(node, &tags, &resolver, "size").unwrap(),
            Some(Value::Int(40))
        );
    }

    #[test]
    fn test_attribute_expression_resolution() {
        let (tags, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let resolver = MapResolver::new();
        resolver.insert("width", Value::Int(80));

        let node = tree.create(panel(tag));
        tree.set_attribute_expr(node, "size", Expression::parse("#{width}").unwrap());

        assert_eq!(
            tree.attribute(node, &tags, &resolver, "size").unwrap(),
            Some(Value::Int(80))
        );
        // Idempotent without intervening writes
        assert_eq!(
            tree.attribute(node, &tags, &resolver, "size").unwrap(),
            Some(Value::Int(80))
        );
    }

    #[test]
    fn test_rendered_defaults_true() {
        let (tags, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let resolver = MapResolver::new();
        let node = tree.create(panel(tag));

        assert!(tree.is_rendered(node, &tags, &resolver).unwrap());

        tree.set_attribute_value(node, attr_names::RENDERED, Value::Bool(false));
        assert!(!tree.is_rendered(node, &tags, &resolver).unwrap());
    }

    #[test]
    fn test_init_assigns_client_ids() {
        let (tags, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let resolver = MapResolver::new();

        let root = tree.create(panel(tag));
        let named = tree.create(panel(tag));
        let anonymous = tree.create(panel(tag));
        tree.append_child(root, named).unwrap();
        tree.append_child(root, anonymous).unwrap();
        tree.set_attribute_value(named, attr_names::ID, Value::from("login"));

        tree.init(root, &tags, &resolver).unwrap();

        assert_eq!(tree.get(named).unwrap().client_id(), Some("login"));
        assert_eq!(tree.get(anonymous).unwrap().client_id(), Some(DEFAULT_CLIENT_ID));
    }

    #[test]
    fn test_event_queue_bubbles_to_root() {
        let (_, tag) = tag_set();
        let mut tree = ComponentTree::new();
        let root = tree.create(Component::new(tag, ComponentKind::View(ViewState::new())));
        let form = tree.create(Component::new(tag, ComponentKind::Form(Default::default())));
        let button = tree.create(Component::new(tag, ComponentKind::Command));
        tree.append_child(root, form).unwrap();
        tree.append_child(form, button).unwrap();

        tree.queue_event(button, Event::action(button, None));
        tree.queue_event(form, Event::action(form, None));

        let events = tree.drain_events(root);
        assert_eq!(events.len(), 2);
        // FIFO enqueue order
        assert_eq!(events[0].target, button);
        assert_eq!(events[1].target, form);
        assert!(tree.drain_events(root).is_empty());
    }
}
