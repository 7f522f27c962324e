//! Core aggregate and domain event abstractions.

use chrono::{DateTime, Utc};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Send + Sync + Clone {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns when the event was raised.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Result of a successful mutating operation on an aggregate.
///
/// Operations never touch the aggregate they are called on; they hand back
/// the new state together with the events describing what happened. An
/// empty event list means the operation was a no-op.
#[derive(Debug, Clone)]
pub struct Change<A, E> {
    /// The aggregate after the operation.
    pub aggregate: A,

    /// The events raised by the operation, in order.
    pub events: Vec<E>,
}

impl<A, E> Change<A, E> {
    /// Creates a change carrying the given events.
    pub fn new(aggregate: A, events: Vec<E>) -> Self {
        Self { aggregate, events }
    }

    /// Creates a change that raised no events.
    pub fn unchanged(aggregate: A) -> Self {
        Self {
            aggregate,
            events: Vec::new(),
        }
    }

    /// Returns true if the operation raised no events.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }

    /// Splits the change into the new state and its events.
    pub fn into_parts(self) -> (A, Vec<E>) {
        (self.aggregate, self.events)
    }

    /// Maps the aggregate, keeping the events.
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Change<B, E> {
        Change {
            aggregate: f(self.aggregate),
            events: self.events,
        }
    }
}
