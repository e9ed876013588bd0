//! Render Seam and Markup Encoding
//!
//! The writer interface is the boundary to the real serialization layer
//! (escaping included); `BufferWriter` is the in-memory implementation
//! used by tests. Encoding walks the tree pre-order, applying each node's
//! own rendered check before descending.

use trellis_el::Value;
use trellis_tree::{attr_names, ComponentId, ComponentKind, ComponentTree, TagSet};

use crate::{LifecycleContext, LifecycleResult};

/// Result type for writer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Markup writer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("write failed: {0}")]
    Write(String),

    #[error("writer state: {0}")]
    State(String),
}

/// Markup writer consumed by Render Response
///
/// Escaping and actual transport are the implementation's concern; the
/// lifecycle only calls this interface.
pub trait ResponseWriter {
    fn start_element(&mut self, name: &str) -> RenderResult<()>;
    fn write_attribute(&mut self, name: &str, value: &str) -> RenderResult<()>;
    fn write_text(&mut self, text: &str) -> RenderResult<()>;
    fn end_element(&mut self, name: &str) -> RenderResult<()>;
}

/// Writer collecting markup into a string
#[derive(Debug, Default)]
pub struct BufferWriter {
    buffer: String,
    open: bool,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn close_start_tag(&mut self) {
        if self.open {
            self.buffer.push('>');
            self.open = false;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(mut self) -> String {
        self.close_start_tag();
        self.buffer
    }
}

impl ResponseWriter for BufferWriter {
    fn start_element(&mut self, name: &str) -> RenderResult<()> {
        self.close_start_tag();
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.open = true;
        Ok(())
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> RenderResult<()> {
        if !self.open {
            return Err(RenderError::State(format!(
                "attribute '{name}' written outside a start tag"
            )));
        }
        self.buffer.push(' ');
        self.buffer.push_str(name);
        self.buffer.push_str("=\"");
        self.buffer.push_str(value);
        self.buffer.push('"');
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> RenderResult<()> {
        self.close_start_tag();
        self.buffer.push_str(text);
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> RenderResult<()> {
        self.close_start_tag();
        self.buffer.push_str("</");
        self.buffer.push_str(name);
        self.buffer.push('>');
        Ok(())
    }
}

/// Suffix of the reserved hidden field marking a form submission
pub const SUBMIT_MARKER_SUFFIX: &str = "_SUBMIT";

/// Encode a subtree
///
/// Every node applies its own rendered check here, independent of the
/// pruning the earlier phases performed.
pub fn encode_component(
    tree: &ComponentTree,
    id: ComponentId,
    tags: &TagSet,
    ctx: &LifecycleContext<'_>,
    writer: &mut dyn ResponseWriter,
) -> LifecycleResult<()> {
    if !tree.is_rendered(id, tags, ctx.resolver())? {
        return Ok(());
    }
    let Some(component) = tree.get(id) else {
        return Ok(());
    };
    let client_id = component.client_id().unwrap_or_default().to_string();

    match &component.kind {
        ComponentKind::View(_) => encode_children(tree, id, tags, ctx, writer)?,
        ComponentKind::Panel => {
            writer.start_element("span")?;
            writer.write_attribute("id", &client_id)?;
            encode_children(tree, id, tags, ctx, writer)?;
            writer.end_element("span")?;
        }
        ComponentKind::Form(_) => {
            writer.start_element("form")?;
            writer.write_attribute("id", &client_id)?;
            writer.write_attribute("method", "post")?;
            encode_children(tree, id, tags, ctx, writer)?;
            // Reserved hidden field carrying the submission marker
            writer.start_element("input")?;
            writer.write_attribute("type", "hidden")?;
            writer.write_attribute("name", &format!("{client_id}{SUBMIT_MARKER_SUFFIX}"))?;
            writer.write_attribute("value", "1")?;
            writer.end_element("input")?;
            writer.end_element("form")?;
        }
        ComponentKind::Input(input) => {
            // A pending submitted value is re-displayed verbatim; otherwise
            // the bound value goes through the converter.
            let display = match &input.submitted {
                Some(raw) => raw.clone(),
                None => {
                    let bound = tree
                        .attribute(id, tags, ctx.resolver(), attr_names::VALUE)?
                        .unwrap_or(Value::Null);
                    match input.converter() {
                        Some(converter) => converter.to_string(&bound),
                        None => bound.coerce_string(),
                    }
                }
            };
            writer.start_element("input")?;
            writer.write_attribute("type", "text")?;
            writer.write_attribute("id", &client_id)?;
            writer.write_attribute("name", &client_id)?;
            writer.write_attribute("value", &display)?;
            writer.end_element("input")?;
        }
        ComponentKind::Command => {
            let label = tree
                .attribute(id, tags, ctx.resolver(), attr_names::LABEL)?
                .map(|v| v.coerce_string())
                .unwrap_or_else(|| client_id.clone());
            writer.start_element("input")?;
            writer.write_attribute("type", "submit")?;
            writer.write_attribute("id", &client_id)?;
            writer.write_attribute("name", &client_id)?;
            writer.write_attribute("value", &label)?;
            writer.end_element("input")?;
        }
        ComponentKind::Output => {
            let bound = tree
                .attribute(id, tags, ctx.resolver(), attr_names::VALUE)?
                .unwrap_or(Value::Null);
            writer.write_text(&bound.coerce_string())?;
        }
    }

    Ok(())
}

fn encode_children(
    tree: &ComponentTree,
    id: ComponentId,
    tags: &TagSet,
    ctx: &LifecycleContext<'_>,
    writer: &mut dyn ResponseWriter,
) -> LifecycleResult<()> {
    for child in tree.children(id) {
        encode_component(tree, child, tags, ctx, writer)?;
    }
    Ok(())
}
