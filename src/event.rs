//! Collision Event System
//!
//! Every colliding pair walks the lifecycle `start -> active... -> end`,
//! derived each step by diffing the current pair-key set against the
//! previous frame's. Handlers subscribe through an [`EventEmitter`] — the
//! world owns one for world-wide listeners and every body owns one of its
//! own. End events carry no manifold; the contact has already dissolved.
//!
//! Events carry body *ids*, never references, so a handler can observe the
//! collision without aliasing world storage. Handlers run synchronously in
//! the middle of the step (after detection, before resolution) and therefore
//! cannot reach back into the stepping world; hosts that need to add or
//! remove bodies in response to an event queue the change and drain the
//! queue after `step` returns.

use hashbrown::HashMap;

use crate::body::BodyId;
use crate::narrow_phase::Manifold;

// ============================================================================
// Event Types
// ============================================================================

/// Lifecycle stage of a collision event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionEventKind {
    /// First frame two bodies touch.
    Start,
    /// The pair was already touching last frame and still is.
    Active,
    /// The pair touched last frame and no longer does.
    End,
}

/// Payload delivered to collision handlers.
#[derive(Clone, Debug)]
pub struct CollisionEvent {
    /// Id of the first body (smaller id of the pair).
    pub body_a: BodyId,
    /// Id of the second body.
    pub body_b: BodyId,
    /// Whether either body is a sensor.
    pub is_sensor: bool,
    /// Contact data. Present on start/active, absent on end.
    pub manifold: Option<Manifold>,
}

/// Opaque handle returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Boxed collision handler.
pub type CollisionHandler = Box<dyn FnMut(&CollisionEvent)>;

// ============================================================================
// EventEmitter
// ============================================================================

/// Typed publish/subscribe registry for collision events.
///
/// Emission with zero registered handlers is a single map lookup; the event
/// payload is only borrowed, never cloned per handler.
#[derive(Default)]
pub struct EventEmitter {
    handlers: HashMap<CollisionEventKind, Vec<(HandlerId, CollisionHandler)>>,
    next_id: u64,
}

impl EventEmitter {
    /// Create an emitter with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to an event kind. Handlers for one kind run in
    /// subscription order.
    pub fn on<F>(&mut self, kind: CollisionEventKind, handler: F) -> HandlerId
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Unsubscribe a handler. Returns `true` when something was removed.
    pub fn off(&mut self, kind: CollisionEventKind, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(h, _)| *h != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(&kind);
        }
        removed
    }

    /// Drop every handler of `kind`, or every handler of every kind when
    /// `kind` is `None`.
    pub fn remove_all_listeners(&mut self, kind: Option<CollisionEventKind>) {
        match kind {
            Some(kind) => {
                self.handlers.remove(&kind);
            }
            None => self.handlers.clear(),
        }
    }

    /// Whether any handler is subscribed to `kind`.
    #[inline]
    #[must_use]
    pub fn has_listeners(&self, kind: CollisionEventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Invoke every handler subscribed to `kind`.
    pub fn emit(&mut self, kind: CollisionEventKind, event: &CollisionEvent) {
        if let Some(list) = self.handlers.get_mut(&kind) {
            for (_, handler) in list.iter_mut() {
                handler(event);
            }
        }
    }
}

impl core::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut counts: Vec<(CollisionEventKind, usize)> = self
            .handlers
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        counts.sort_by_key(|(_, n)| *n);
        f.debug_struct("EventEmitter")
            .field("handlers", &counts)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event() -> CollisionEvent {
        CollisionEvent {
            body_a: 1,
            body_b: 2,
            is_sensor: false,
            manifold: None,
        }
    }

    #[test]
    fn test_on_emit() {
        let mut emitter = EventEmitter::new();
        let seen = Rc::new(RefCell::new(0));

        let seen_in = Rc::clone(&seen);
        emitter.on(CollisionEventKind::Start, move |_| {
            *seen_in.borrow_mut() += 1;
        });

        emitter.emit(CollisionEventKind::Start, &event());
        emitter.emit(CollisionEventKind::Start, &event());
        assert_eq!(*seen.borrow(), 2);

        // Other kinds do not trigger the handler
        emitter.emit(CollisionEventKind::End, &event());
        assert_eq!(*seen.borrow(), 2);
    }

    #[test]
    fn test_off() {
        let mut emitter = EventEmitter::new();
        let seen = Rc::new(RefCell::new(0));

        let seen_in = Rc::clone(&seen);
        let id = emitter.on(CollisionEventKind::Start, move |_| {
            *seen_in.borrow_mut() += 1;
        });

        assert!(emitter.off(CollisionEventKind::Start, id));
        assert!(!emitter.off(CollisionEventKind::Start, id), "already removed");

        emitter.emit(CollisionEventKind::Start, &event());
        assert_eq!(*seen.borrow(), 0);
        assert!(!emitter.has_listeners(CollisionEventKind::Start));
    }

    #[test]
    fn test_handler_order() {
        let mut emitter = EventEmitter::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order_in = Rc::clone(&order);
            emitter.on(CollisionEventKind::Active, move |_| {
                order_in.borrow_mut().push(tag);
            });
        }

        emitter.emit(CollisionEventKind::Active, &event());
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_all_listeners() {
        let mut emitter = EventEmitter::new();
        emitter.on(CollisionEventKind::Start, |_| {});
        emitter.on(CollisionEventKind::End, |_| {});

        emitter.remove_all_listeners(Some(CollisionEventKind::Start));
        assert!(!emitter.has_listeners(CollisionEventKind::Start));
        assert!(emitter.has_listeners(CollisionEventKind::End));

        emitter.remove_all_listeners(None);
        assert!(!emitter.has_listeners(CollisionEventKind::End));
    }

    #[test]
    fn test_distinct_handler_ids() {
        let mut emitter = EventEmitter::new();
        let a = emitter.on(CollisionEventKind::Start, |_| {});
        let b = emitter.on(CollisionEventKind::Start, |_| {});
        assert_ne!(a, b);

        // Removing one leaves the other subscribed
        assert!(emitter.off(CollisionEventKind::Start, a));
        assert!(emitter.has_listeners(CollisionEventKind::Start));
    }
}
