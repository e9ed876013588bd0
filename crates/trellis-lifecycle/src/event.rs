//! Event Broadcast
//!
//! Queued events are drained once per lifecycle pass, after Update Model
//! Values, in FIFO enqueue order. Each event is delivered to exactly the
//! component that queued it; an event nothing handles is a logged
//! diagnostic, never fatal.

use trellis_el::Expression;
use trellis_tree::{ComponentKind, ComponentTree, Event, EventKind};

use crate::{EngineConfig, LifecycleContext};

/// An action event delivered to the application's action listener
#[derive(Debug, Clone)]
pub struct ActionEvent {
    /// Client id of the command that fired
    pub client_id: String,
    /// The command's bound action expression, if any
    pub action: Option<Expression>,
}

/// Application hook invoked for command activations
///
/// The returned outcome feeds the surrounding navigation logic, which is
/// outside this core.
pub trait ActionListener: Send + Sync {
    fn process_action(&self, event: &ActionEvent, ctx: &mut LifecycleContext<'_>) -> Option<String>;
}

/// Listener that evaluates the command's bound action expression and
/// returns its string outcome
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultActionListener;

impl ActionListener for DefaultActionListener {
    fn process_action(&self, event: &ActionEvent, ctx: &mut LifecycleContext<'_>) -> Option<String> {
        let action = event.action.as_ref()?;
        match action.evaluate(ctx.resolver()) {
            Ok(outcome) if !outcome.is_null() => Some(outcome.coerce_string()),
            Ok(_) => None,
            Err(err) => {
                tracing::error!("action '{}' failed: {}", action.text(), err);
                None
            }
        }
    }
}

/// Dispatch one event to its target component's listeners
pub(crate) fn broadcast(
    tree: &ComponentTree,
    event: &Event,
    ctx: &mut LifecycleContext<'_>,
    config: &EngineConfig,
) {
    let Some(target) = tree.get(event.target) else {
        tracing::error!("event target no longer in tree, dropping");
        return;
    };

    match (&target.kind, &event.kind) {
        (ComponentKind::Command, EventKind::Action { action }) => {
            let Some(listener) = config.action_listener() else {
                tracing::error!(
                    "no action listener registered, event from '{}' unhandled",
                    target.client_id().unwrap_or("?")
                );
                return;
            };
            let action_event = ActionEvent {
                client_id: target.client_id().unwrap_or_default().to_string(),
                action: action.clone(),
            };
            let outcome = listener.process_action(&action_event, ctx);
            tracing::debug!(
                "action from '{}' produced outcome {:?}",
                action_event.client_id,
                outcome
            );
        }
        _ => {
            tracing::error!(
                "event broadcast to '{}' was not handled",
                target.client_id().unwrap_or("?")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockRequest;
    use trellis_el::Value;

    #[test]
    fn test_default_listener_evaluates_action() {
        let config = EngineConfig::new();
        let request = MockRequest::new();
        let mut ctx = LifecycleContext::new(&config, &request, None);
        ctx.request_scope().put("save", Value::from("saved"));

        let event = ActionEvent {
            client_id: "btn".to_string(),
            action: Some(Expression::parse("#{save}").unwrap()),
        };
        assert_eq!(
            DefaultActionListener.process_action(&event, &mut ctx),
            Some("saved".to_string())
        );
    }

    #[test]
    fn test_default_listener_without_binding() {
        let config = EngineConfig::new();
        let request = MockRequest::new();
        let mut ctx = LifecycleContext::new(&config, &request, None);

        let event = ActionEvent { client_id: "btn".to_string(), action: None };
        assert_eq!(DefaultActionListener.process_action(&event, &mut ctx), None);
    }
}
