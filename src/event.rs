//! Lifecycle notifications emitted by the container
//!
//! The container only relies on the [Dispatcher] contract. [Listeners] is a small
//! dispatcher calling closures registered per [EventKind].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::Service;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Binded,
    Resolved,
    Tagged,
    Aliased,
}

#[derive(Clone, Debug)]
pub enum ContainerEvent {
    Binded {
        service: String,
    },
    Resolved {
        service: String,
        resolved_service: Service,
        initialized: bool,
    },
    Tagged {
        service: String,
        tag: String,
    },
    Aliased {
        service: String,
        alias: String,
    },
}

impl ContainerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ContainerEvent::Binded { .. } => EventKind::Binded,
            ContainerEvent::Resolved { .. } => EventKind::Resolved,
            ContainerEvent::Tagged { .. } => EventKind::Tagged,
            ContainerEvent::Aliased { .. } => EventKind::Aliased,
        }
    }

    pub fn service(&self) -> &str {
        match self {
            ContainerEvent::Binded { service }
            | ContainerEvent::Resolved { service, .. }
            | ContainerEvent::Tagged { service, .. }
            | ContainerEvent::Aliased { service, .. } => service,
        }
    }

    pub fn resolved_service(&self) -> Option<&Service> {
        match self {
            ContainerEvent::Resolved {
                resolved_service, ..
            } => Some(resolved_service),
            _ => None,
        }
    }
}

/// Receive lifecycle events
///
/// The returned event replaces the dispatched one: for [ContainerEvent::Resolved], the
/// container continues with the returned `resolved_service`.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, event: ContainerEvent) -> ContainerEvent;
}

type Listener = Arc<dyn Fn(ContainerEvent) -> ContainerEvent + Send + Sync>;

/// Closure-based [Dispatcher]
#[derive(Default)]
pub struct Listeners {
    listeners: RwLock<HashMap<EventKind, Vec<Listener>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener returning the (possibly replaced) event.
    pub fn listen<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(ContainerEvent) -> ContainerEvent + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(listener));
    }

    /// Register a listener that only observes events.
    pub fn observe<F>(&self, kind: EventKind, observer: F)
    where
        F: Fn(&ContainerEvent) + Send + Sync + 'static,
    {
        self.listen(kind, move |event| {
            observer(&event);
            event
        });
    }
}

impl Dispatcher for Listeners {
    fn dispatch(&self, event: ContainerEvent) -> ContainerEvent {
        let listeners = self
            .listeners
            .read()
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();
        listeners
            .iter()
            .fold(event, |event, listener| listener(event))
    }
}
