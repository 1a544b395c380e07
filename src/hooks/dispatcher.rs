//! Priority-ordered hook dispatch

use std::sync::Arc;

use anyhow::Result;

use super::{HookContext, HookEvent, HookHandler};

pub const DEFAULT_HOOK_PRIORITY: i32 = 100;

/// A handler bound to an event
#[derive(Clone)]
pub struct HookRegistration {
    pub event: HookEvent,
    /// Lower runs first
    pub priority: i32,
    pub handler: Arc<dyn HookHandler>,
}

impl HookRegistration {
    pub fn new(event: HookEvent, handler: Arc<dyn HookHandler>) -> Self {
        Self {
            event,
            priority: DEFAULT_HOOK_PRIORITY,
            handler,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl std::fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistration")
            .field("event", &self.event)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Registered hooks of one generator
#[derive(Debug, Clone, Default)]
pub struct HookDispatcher {
    hooks: Vec<HookRegistration>,
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, registration: HookRegistration) {
        tracing::debug!(
            "Registered hook for {} with priority {}",
            registration.event,
            registration.priority
        );
        self.hooks.push(registration);
    }

    /// Run the handlers for `event` in ascending priority
    ///
    /// Equal priorities keep registration order. Each handler receives the
    /// previous handler's output, and the first error is returned as is.
    pub async fn dispatch(&self, event: HookEvent, context: HookContext) -> Result<HookContext> {
        let mut handlers: Vec<&HookRegistration> =
            self.hooks.iter().filter(|h| h.event == event).collect();
        if handlers.is_empty() {
            return Ok(context);
        }
        handlers.sort_by_key(|h| h.priority);

        tracing::debug!("Dispatching {} to {} hook(s)", event, handlers.len());

        let mut context = context;
        for registration in handlers {
            context = registration.handler.handle(context).await?;
        }
        Ok(context)
    }

    pub fn has_hooks(&self, event: HookEvent) -> bool {
        self.hooks.iter().any(|h| h.event == event)
    }

    /// Events with at least one handler, sorted
    pub fn list_events(&self) -> Vec<HookEvent> {
        let mut events: Vec<HookEvent> = self.hooks.iter().map(|h| h.event).collect();
        events.sort();
        events.dedup();
        events
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
