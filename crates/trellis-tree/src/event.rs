//! Component Events
//!
//! Events queued at the view root during a lifecycle pass. The queuing
//! notification bubbles to the root; dispatch targets exactly the
//! component that queued the event.

use trellis_el::Expression;

use crate::ComponentId;

/// A queued component event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The component that queued the event (dispatch target)
    pub target: ComponentId,
    pub kind: EventKind,
}

impl Event {
    /// Create an action event for a command component
    pub fn action(target: ComponentId, action: Option<Expression>) -> Self {
        Self {
            target,
            kind: EventKind::Action { action },
        }
    }
}

/// Event kinds
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A command component was activated; carries its bound action
    /// expression, if any
    Action { action: Option<Expression> },
}
