use serde::{Deserialize, Serialize};

/// Order lifecycle status as tracked by a venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Order accepted and resting in the waiting list
    New,
    /// Order has been completely filled
    Filled,
    /// Order has been canceled by the user
    Canceled,
    /// Order was not executed (insufficient buying power or liquidity)
    Rejected,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }

    /// Returns true if the order is still resting
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::New)
    }
}
