//! Domain layer for the food-order system.
//!
//! This crate provides the core domain abstractions including:
//! - The Order aggregate with its pricing rules and status machine
//! - DomainEvent trait and the order events returned by each operation
//! - The OrderRepository contract with optimistic concurrency
//! - Command trait, CommandHandler and OrderService for load/mutate/save

pub mod aggregate;
pub mod command;
pub mod error;
pub mod order;
pub mod repository;

pub use aggregate::{Change, DomainEvent};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
pub use order::{
    AddItem, ApplyCoupon, CancelOrder, ChangeStatus, Coupon, CreateOrder, CustomerSnapshot, Money,
    Order, OrderChange, OrderDetails, OrderError, OrderEvent, OrderItem, OrderService,
    OrderStatus, OrderType, PriceBreakdown, ProductSnapshot, RemoveItem, ReplaceOrder,
    RestaurantSnapshot, UpdateDeliveryFee,
};
pub use repository::{OrderQuery, OrderRepository, RepositoryError};
