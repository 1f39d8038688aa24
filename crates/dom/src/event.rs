use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::document::NodeId;
use crate::error::ListenerError;
use crate::page::Page;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    DomContentLoaded,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Click => "click",
            EventType::DomContentLoaded => "DOMContentLoaded",
            EventType::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capturing,
    AtTarget,
    Bubbling,
}

/// What a listener sees while it runs.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    /// Node the event was dispatched at.
    pub target: NodeId,
    /// Node whose listener is currently running.
    pub current_target: NodeId,
    pub phase: Phase,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            phase: Phase::AtTarget,
            propagation_stopped: Cell::new(false),
        }
    }

    /// Let the remaining listeners on the current node run, then stop.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

pub type Listener = Rc<dyn Fn(&mut Page, &Event) -> Result<(), ListenerError>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ListenerKey {
    node: NodeId,
    event_type: EventType,
    capture: bool,
}

#[derive(Clone)]
struct Entry {
    id: ListenerId,
    name: Option<&'static str>,
    listener: Listener,
}

/// Listeners keyed by node, event type and phase, in registration order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    by_key: HashMap<ListenerKey, Vec<Entry>>,
    index: HashMap<ListenerId, ListenerKey>,
}

impl ListenerRegistry {
    pub(crate) fn add(
        &mut self,
        node: NodeId,
        event_type: EventType,
        capture: bool,
        name: Option<&'static str>,
        listener: Listener,
    ) -> ListenerId {
        let key = ListenerKey {
            node,
            event_type,
            capture,
        };
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_key
            .entry(key.clone())
            .or_default()
            .push(Entry { id, name, listener });
        self.index.insert(id, key);
        id
    }

    pub(crate) fn has_named(
        &self,
        node: NodeId,
        event_type: &EventType,
        capture: bool,
        name: &str,
    ) -> bool {
        let key = ListenerKey {
            node,
            event_type: event_type.clone(),
            capture,
        };
        self.by_key
            .get(&key)
            .is_some_and(|entries| entries.iter().any(|e| e.name == Some(name)))
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let Some(key) = self.index.remove(&id) else {
            return false;
        };
        if let Some(entries) = self.by_key.get_mut(&key) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                self.by_key.remove(&key);
            }
        }
        true
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Snapshot of the listeners for one node and phase. Listeners added while
    /// these run are not part of the snapshot.
    pub(crate) fn snapshot(
        &self,
        node: NodeId,
        event_type: &EventType,
        capture: bool,
    ) -> Vec<(ListenerId, Listener)> {
        let key = ListenerKey {
            node,
            event_type: event_type.clone(),
            capture,
        };
        self.by_key
            .get(&key)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| (e.id, Rc::clone(&e.listener)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node: NodeId, event_type: &EventType) -> usize {
        [false, true]
            .into_iter()
            .map(|capture| {
                let key = ListenerKey {
                    node,
                    event_type: event_type.clone(),
                    capture,
                };
                self.by_key.get(&key).map_or(0, Vec::len)
            })
            .sum()
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }
}

/// A listener that returned an error. Dispatch reports it and keeps going.
#[derive(Debug)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub event_type: EventType,
    pub current_target: NodeId,
    pub error: ListenerError,
}

#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Number of listener invocations, failed ones included.
    pub invoked: usize,
    pub failures: Vec<ListenerFailure>,
}

impl DispatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: DispatchOutcome) {
        self.invoked += other.invoked;
        self.failures.extend(other.failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(listener: u64, message: &str) -> ListenerFailure {
        ListenerFailure {
            listener: ListenerId(listener),
            event_type: EventType::Click,
            current_target: NodeId::DOCUMENT,
            error: message.into(),
        }
    }

    #[test]
    fn merge_adds_invocations_and_keeps_failure_order() {
        let mut total = DispatchOutcome {
            invoked: 2,
            failures: vec![failure(1, "first")],
        };
        total.merge(DispatchOutcome {
            invoked: 3,
            failures: vec![failure(4, "second")],
        });
        total.merge(DispatchOutcome::default());
        assert_eq!(total.invoked, 5);
        assert!(!total.is_ok());
        let messages: Vec<String> = total.failures.iter().map(|f| f.error.to_string()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn event_type_names() {
        assert_eq!(EventType::Click.to_string(), "click");
        assert_eq!(EventType::DomContentLoaded.as_str(), "DOMContentLoaded");
        assert_eq!(EventType::Custom("toggle".into()).as_str(), "toggle");
        assert_eq!(ListenerId(7).to_string(), "listener-7");
    }
}
