//! Command handling infrastructure.

use common::{OrderId, Version};

use crate::aggregate::DomainEvent;
use crate::error::DomainError;
use crate::order::{Order, OrderChange, OrderError, OrderEvent};
use crate::repository::{OrderRepository, RepositoryError};

/// Result of command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The order as stored after the command.
    pub aggregate: Order,

    /// The events raised by the command, in order.
    pub events: Vec<OrderEvent>,

    /// The stored version after the command.
    pub new_version: Version,
}

impl CommandResult {
    fn unchanged(order: Order) -> Self {
        Self {
            new_version: order.version(),
            aggregate: order,
            events: vec![],
        }
    }
}

/// Trait for commands that target an existing order.
///
/// Commands carry the version the caller last read; the write is rejected
/// if storage has moved past it.
pub trait Command: Send + Sync {
    /// Returns the ID of the order this command targets.
    fn order_id(&self) -> OrderId;

    /// Returns the version the caller expects storage to hold.
    fn expected_version(&self) -> Version;
}

/// Handler for executing commands against stored orders.
///
/// The handler is responsible for:
/// 1. Loading the order from the repository
/// 2. Running the operation to produce the new order and its events
/// 3. Saving the new order with a compare-and-swap on the expected version
/// 4. Publishing the events once the save succeeded
pub struct CommandHandler<R: OrderRepository> {
    repository: R,
}

impl<R: OrderRepository> CommandHandler<R> {
    /// Creates a new command handler with the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Loads an order, failing with `NotFound` if it doesn't exist.
    pub async fn load(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.repository
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(order_id.to_string()).into())
    }

    /// Inserts a freshly created order and publishes its events.
    pub async fn insert(&self, change: OrderChange) -> Result<CommandResult, DomainError> {
        let (order, events) = change.into_parts();
        let stored = self.repository.add(&order).await?;

        metrics::counter!("orders_saved_total").increment(1);
        publish(&events);

        Ok(CommandResult {
            new_version: stored.version(),
            aggregate: stored,
            events,
        })
    }

    /// Executes an operation against a stored order and saves the result.
    ///
    /// The operation receives the current order and returns the new order
    /// with its events, or an error. A change without events is not saved.
    pub async fn execute<F>(
        &self,
        order_id: OrderId,
        expected_version: Version,
        command_fn: F,
    ) -> Result<CommandResult, DomainError>
    where
        F: FnOnce(&Order) -> Result<OrderChange, OrderError>,
    {
        let current = self.load(order_id).await?;

        let (order, events) = command_fn(&current)?.into_parts();
        if events.is_empty() {
            return Ok(CommandResult::unchanged(order));
        }

        let stored = match self.repository.update(&order, expected_version).await {
            Ok(stored) => stored,
            Err(err @ RepositoryError::ConcurrencyConflict { .. }) => {
                metrics::counter!("orders_concurrency_conflicts_total").increment(1);
                tracing::warn!(
                    order_id = %order_id,
                    expected_version = %expected_version,
                    error = %err,
                    "Order update rejected"
                );
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        metrics::counter!("orders_saved_total").increment(1);
        tracing::info!(
            order_id = %order_id,
            new_version = %stored.version(),
            "Order saved"
        );
        publish(&events);

        Ok(CommandResult {
            new_version: stored.version(),
            aggregate: stored,
            events,
        })
    }
}

/// Emits saved events to the log and metrics.
fn publish(events: &[OrderEvent]) {
    for event in events {
        let summary = event.summary();
        metrics::counter!("order_domain_events_total", "event_type" => event.event_type())
            .increment(1);
        tracing::info!(
            event_type = event.event_type(),
            order_id = %summary.order_id,
            order_code = %summary.order_code,
            status = %summary.status,
            version = %summary.version,
            occurred_at = %event.occurred_at(),
            "Order event"
        );
    }
}
