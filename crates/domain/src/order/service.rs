//! Order service providing a simplified API for order operations.

use common::OrderId;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::repository::{OrderQuery, OrderRepository, RepositoryError};

use super::{
    AddItem, ApplyCoupon, CancelOrder, ChangeStatus, CreateOrder, Order, OrderDetails, OrderError,
    RemoveItem, ReplaceOrder, UpdateDeliveryFee,
};

/// Service for managing orders.
///
/// Every mutating method loads the order, runs the aggregate operation and
/// saves the result conditioned on the caller's expected version.
pub struct OrderService<R: OrderRepository> {
    handler: CommandHandler<R>,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a new order service with the given repository.
    pub fn new(repository: R) -> Self {
        Self {
            handler: CommandHandler::new(repository),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<R> {
        &self.handler
    }

    /// Places a new order.
    #[tracing::instrument(skip(self, cmd), fields(code = %cmd.details.code))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<CommandResult, DomainError> {
        let change = Order::create(cmd.details)?;
        self.handler.insert(change).await
    }

    /// Loads an order by ID, failing with `NotFound` if it doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.handler.load(order_id).await
    }

    /// Loads an order by code, failing with `NotFound` if it doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_code(&self, code: &str) -> Result<Order, DomainError> {
        self.handler
            .repository()
            .get_by_code(code)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(code.to_string()).into())
    }

    /// Lists orders matching the query.
    #[tracing::instrument(skip(self))]
    pub async fn search_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, DomainError> {
        Ok(self.handler.repository().search(query).await?)
    }

    /// Overwrites the editable fields of an order.
    ///
    /// Always saves, even if nothing differs, so the stored version advances.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn replace_order(&self, cmd: ReplaceOrder) -> Result<CommandResult, DomainError> {
        let order_id = cmd.order_id();
        let expected_version = cmd.expected_version();

        self.handler
            .execute(order_id, expected_version, move |current| {
                if !current.status().is_modifiable() {
                    return Err(OrderError::NotModifiable {
                        status: current.status(),
                    });
                }

                let details = OrderDetails {
                    code: current.code().to_string(),
                    created_at: current.created_at(),
                    customer: cmd.customer,
                    restaurant: cmd.restaurant,
                    order_type: cmd.order_type,
                    delivery_fee: cmd.delivery_fee,
                    items: cmd.items,
                    coupon: cmd.coupon,
                };
                let order =
                    Order::rehydrate(current.id(), details, current.status(), expected_version)?;
                Ok(order.mark_updated())
            })
            .await
    }

    /// Moves an order to another status.
    #[tracing::instrument(skip(self))]
    pub async fn change_status(&self, cmd: ChangeStatus) -> Result<CommandResult, DomainError> {
        let status = cmd.status;

        self.handler
            .execute(cmd.order_id(), cmd.expected_version(), |order| {
                order.change_status(status)
            })
            .await
    }

    /// Cancels an order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, cmd: CancelOrder) -> Result<CommandResult, DomainError> {
        self.handler
            .execute(cmd.order_id(), cmd.expected_version(), |order| order.cancel())
            .await
    }

    /// Adds an item to an order.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(&self, cmd: AddItem) -> Result<CommandResult, DomainError> {
        let (order_id, expected_version) = (cmd.order_id(), cmd.expected_version());
        let item = cmd.item;

        self.handler
            .execute(order_id, expected_version, |order| order.add_item(item))
            .await
    }

    /// Removes the first item for a product from an order.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, cmd: RemoveItem) -> Result<CommandResult, DomainError> {
        let product_id = cmd.product_id.clone();

        self.handler
            .execute(cmd.order_id(), cmd.expected_version(), |order| {
                order.remove_item_by_product_id(&product_id)
            })
            .await
    }

    /// Attaches a coupon to an order.
    #[tracing::instrument(skip(self))]
    pub async fn apply_coupon(&self, cmd: ApplyCoupon) -> Result<CommandResult, DomainError> {
        let (order_id, expected_version) = (cmd.order_id(), cmd.expected_version());
        let coupon = cmd.coupon;

        self.handler
            .execute(order_id, expected_version, |order| order.apply_coupon(coupon))
            .await
    }

    /// Changes the delivery fee of an order.
    #[tracing::instrument(skip(self))]
    pub async fn update_delivery_fee(
        &self,
        cmd: UpdateDeliveryFee,
    ) -> Result<CommandResult, DomainError> {
        let delivery_fee = cmd.delivery_fee;

        self.handler
            .execute(cmd.order_id(), cmd.expected_version(), |order| {
                order.update_delivery_fee(delivery_fee)
            })
            .await
    }

    /// Deletes an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), DomainError> {
        self.handler.repository().delete(order_id).await?;
        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    /// Deletes an order by code.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order_by_code(&self, code: &str) -> Result<(), DomainError> {
        self.handler.repository().delete_by_code(code).await?;
        tracing::info!(code, "Order deleted");
        Ok(())
    }
}
