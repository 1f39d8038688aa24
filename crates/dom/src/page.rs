use std::rc::Rc;

use crate::document::{Document, NodeId};
use crate::error::{DispatchError, ListenerError};
use crate::event::{
    DispatchOutcome, Event, EventType, Listener, ListenerFailure, ListenerId, ListenerRegistry,
    Phase,
};
use crate::selector::Selector;
use crate::serialize::node_label;

/// A document together with its listeners and readiness.
///
/// Everything that reacts to events receives the page explicitly; there is no
/// global document. Dispatch takes `&mut self`, so two dispatches never overlap.
pub struct Page {
    document: Document,
    listeners: ListenerRegistry,
    ready: bool,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: ListenerRegistry::default(),
            ready: false,
        }
    }

    pub fn parse(input: &str) -> Self {
        Self::new(Document::parse(input))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn register(
        &mut self,
        node: NodeId,
        event_type: EventType,
        capture: bool,
        name: Option<&'static str>,
        listener: Listener,
    ) -> Result<ListenerId, DispatchError> {
        self.document.kind(node)?;
        log::trace!(
            target: "dom.event",
            "[listen] {event_type} on {} capture={capture}",
            node_label(&self.document, node)
        );
        Ok(self.listeners.add(node, event_type, capture, name, listener))
    }

    /// Register a target/bubble-phase listener on `node`.
    pub fn add_event_listener<F>(
        &mut self,
        node: NodeId,
        event_type: EventType,
        listener: F,
    ) -> Result<ListenerId, DispatchError>
    where
        F: Fn(&mut Page, &Event) -> Result<(), ListenerError> + 'static,
    {
        self.register(node, event_type, false, None, Rc::new(listener))
    }

    /// Register a capture-phase listener on `node`.
    pub fn add_capture_listener<F>(
        &mut self,
        node: NodeId,
        event_type: EventType,
        listener: F,
    ) -> Result<ListenerId, DispatchError>
    where
        F: Fn(&mut Page, &Event) -> Result<(), ListenerError> + 'static,
    {
        self.register(node, event_type, true, None, Rc::new(listener))
    }

    /// Register a bubble-phase listener identified by `name`. Registering the
    /// same name twice on one node and event type is a no-op returning `None`,
    /// the way the DOM ignores a second registration of the same callback.
    pub fn add_named_listener<F>(
        &mut self,
        node: NodeId,
        event_type: EventType,
        name: &'static str,
        listener: F,
    ) -> Result<Option<ListenerId>, DispatchError>
    where
        F: Fn(&mut Page, &Event) -> Result<(), ListenerError> + 'static,
    {
        self.document.kind(node)?;
        if self.listeners.has_named(node, &event_type, false, name) {
            log::debug!(
                target: "dom.event",
                "{event_type} listener {name:?} already registered on {}",
                node_label(&self.document, node)
            );
            return Ok(None);
        }
        self.register(node, event_type, false, Some(name), Rc::new(listener))
            .map(Some)
    }

    /// Returns false if `id` was not registered.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self, node: NodeId, event_type: &EventType) -> usize {
        self.listeners.count(node, event_type)
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Dispatch `event_type` at `target`.
    ///
    /// The propagation path is fixed before any listener runs: capture from the
    /// root down to the target's parent, listeners on the target, then bubble
    /// from the parent up to the root. A failing listener is logged and recorded
    /// in the outcome; the others still run.
    pub fn dispatch(
        &mut self,
        target: NodeId,
        event_type: EventType,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.document.kind(target)?;
        let ancestors: Vec<NodeId> = self.document.ancestors(target).collect();
        let mut event = Event::new(event_type, target);
        let mut outcome = DispatchOutcome::default();

        log::trace!(
            target: "dom.event",
            "[dispatch] {} target={}",
            event.event_type,
            node_label(&self.document, target)
        );

        event.phase = Phase::Capturing;
        for &node in ancestors.iter().rev() {
            event.current_target = node;
            self.invoke(&event, true, &mut outcome);
            if event.propagation_stopped() {
                return Ok(outcome);
            }
        }

        event.phase = Phase::AtTarget;
        event.current_target = target;
        self.invoke(&event, true, &mut outcome);
        if !event.propagation_stopped() {
            self.invoke(&event, false, &mut outcome);
        }
        if event.propagation_stopped() {
            return Ok(outcome);
        }

        event.phase = Phase::Bubbling;
        for &node in &ancestors {
            event.current_target = node;
            self.invoke(&event, false, &mut outcome);
            if event.propagation_stopped() {
                break;
            }
        }

        Ok(outcome)
    }

    fn invoke(&mut self, event: &Event, capture: bool, outcome: &mut DispatchOutcome) {
        let listeners = self.listeners.snapshot(event.current_target, &event.event_type, capture);
        for (id, listener) in listeners {
            // Removed by an earlier listener of this same dispatch.
            if !self.listeners.contains(id) {
                continue;
            }
            log::trace!(
                target: "dom.event",
                "[event] {} {id} target={} current={} phase={:?}",
                event.event_type,
                node_label(&self.document, event.target),
                node_label(&self.document, event.current_target),
                event.phase
            );
            outcome.invoked += 1;
            if let Err(error) = listener(self, event) {
                log::error!(
                    target: "dom.event",
                    "uncaught error in {} listener {id} on {}: {error}",
                    event.event_type,
                    node_label(&self.document, event.current_target)
                );
                outcome.failures.push(ListenerFailure {
                    listener: id,
                    event_type: event.event_type.clone(),
                    current_target: event.current_target,
                    error,
                });
            }
        }
    }

    pub fn click(&mut self, target: NodeId) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch(target, EventType::Click)
    }

    /// Click the first element matching `selector`.
    pub fn click_selector(&mut self, selector: &str) -> Result<DispatchOutcome, DispatchError> {
        let parsed = Selector::parse(selector)?;
        let target = self
            .document
            .query_selector(self.document.root(), &parsed)
            .ok_or_else(|| DispatchError::NoMatch(selector.to_string()))?;
        self.click(target)
    }

    /// Fire `DOMContentLoaded` on the document node. Only the first call
    /// dispatches; later calls return `Ok(None)`.
    pub fn fire_ready(&mut self) -> Result<Option<DispatchOutcome>, DispatchError> {
        if self.ready {
            log::debug!(target: "dom.event", "document already ready");
            return Ok(None);
        }
        self.ready = true;
        self.dispatch(NodeId::DOCUMENT, EventType::DomContentLoaded)
            .map(Some)
    }
}
