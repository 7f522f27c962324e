//! Order status machine and order type.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Confirmed ──► InPreparation ──► Ready ──► Delivered
///    │            │               │             │
///    └────────────┴───────────────┴─────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order was placed and awaits confirmation.
    #[default]
    Pending,

    /// Restaurant accepted the order.
    Confirmed,

    /// Kitchen is preparing the order.
    InPreparation,

    /// Order is ready for pickup or dispatch.
    Ready,

    /// Order reached the customer (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InPreparation,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns the statuses reachable from this one in a single step.
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::InPreparation, OrderStatus::Cancelled],
            OrderStatus::InPreparation => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// Returns true if the order may move from this status to `target`.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if items, coupon and fee may still change.
    pub fn is_modifiable(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::InPreparation => "InPreparation",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Delivery,
    Pickup,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Delivery => "Delivery",
            OrderType::Pickup => "Pickup",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "delivery" => Ok(OrderType::Delivery),
            "pickup" => Ok(OrderType::Pickup),
            _ => Err(format!("unknown order type: {s}")),
        }
    }
}
