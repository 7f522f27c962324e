//! Storage implementations of the order repository.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;

pub use error::Result;
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use record::{CouponRecord, ItemRecord, OrderRecord, PartyRecord};
