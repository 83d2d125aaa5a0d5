//! Scene event queue
//! Key principles:
//! - Handlers subscribe per event kind, optionally for a single entity
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Events are queued during the frame and dispatched FIFO per kind

use std::collections::{HashMap, VecDeque};

use log::trace;

use crate::ecs::Entity;
use crate::foundation::math::Vec3;

/// Event kind identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Trigger overlap started or ended
    Collision,
}

impl EventKind {
    /// Every kind, in dispatch order
    pub const ALL: [Self; 1] = [Self::Collision];
}

/// Trigger overlap notification, delivered to each participant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// `true` when the overlap begins, `false` when it ends
    pub is_enter: bool,
    /// The other participant
    pub collided_entity: Entity,
    /// Outward normal of the static box face nearest the dynamic entity
    pub normal: Vec3,
    /// Point on the static box closest to the dynamic entity's centre
    pub point: Vec3,
}

/// Event data
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Payload of [`EventKind::Collision`]
    Collision(CollisionEvent),
}

impl EventPayload {
    /// Collision data, if this is a collision payload
    pub fn as_collision(&self) -> Option<&CollisionEvent> {
        match self {
            Self::Collision(collision) => Some(collision),
        }
    }
}

/// Queued event addressed to one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Kind of event
    pub kind: EventKind,
    /// Entity the event concerns
    pub entity: Entity,
    /// Event data
    pub payload: EventPayload,
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &Event) -> bool;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> bool,
{
    fn on_event(&mut self, event: &Event) -> bool {
        self(event)
    }
}

/// Handler registered for one entity, or every entity when `entity` is NONE
struct Subscription {
    entity: Entity,
    handler: Box<dyn EventHandler>,
}

impl Subscription {
    fn wants(&self, entity: Entity) -> bool {
        self.entity.is_none() || self.entity == entity
    }
}

/// Event queue with per-kind subscriptions
pub struct EventQueue {
    queues: HashMap<EventKind, VecDeque<Event>>,
    handlers: HashMap<EventKind, Vec<Subscription>>,
}

impl EventQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for events of `kind` about `entity`
    ///
    /// Passing [`Entity::NONE`] subscribes to every entity. Handlers run in
    /// subscription order.
    pub fn subscribe(&mut self, kind: EventKind, entity: Entity, handler: impl EventHandler + 'static) {
        self.handlers.entry(kind).or_default().push(Subscription {
            entity,
            handler: Box::new(handler),
        });
    }

    /// Queue an event for the next [`dispatch`](Self::dispatch)
    pub fn queue_event(&mut self, kind: EventKind, entity: Entity, payload: EventPayload) {
        self.queues.entry(kind).or_default().push_back(Event { kind, entity, payload });
    }

    /// Queued events of `kind`, oldest first
    pub fn queued(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.queues.get(&kind).into_iter().flatten()
    }

    /// Number of events waiting for dispatch
    pub fn pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Deliver every queued event, returning how many were dispatched
    ///
    /// Kinds are drained in [`EventKind::ALL`] order, each FIFO. Delivery to
    /// an event stops at the first handler that consumes it.
    pub fn dispatch(&mut self) -> usize {
        let mut dispatched = 0;
        for kind in EventKind::ALL {
            let Some(queue) = self.queues.get_mut(&kind) else {
                continue;
            };
            let events = std::mem::take(queue);
            dispatched += events.len();

            let Some(handlers) = self.handlers.get_mut(&kind) else {
                continue;
            };
            for event in &events {
                for subscription in handlers.iter_mut().filter(|s| s.wants(event.entity)) {
                    if subscription.handler.on_event(event) {
                        trace!("{:?} event for {} consumed", event.kind, event.entity);
                        break;
                    }
                }
            }
        }
        dispatched
    }

    /// Drop all queued events without delivering them
    pub fn clear(&mut self) {
        self.queues.values_mut().for_each(VecDeque::clear);
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending())
            .field("subscriptions", &self.handlers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
