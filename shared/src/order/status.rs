//! Order status state machine
//!
//! ```text
//! pending → processing → ready_for_pickup → picked_up   (terminal)
//! pending|processing|ready_for_pickup → cancelled         (terminal)
//! ```
//!
//! Every allowed move is listed in [`OrderStatus::allowed_targets`]. Anything
//! not listed (backward moves, self moves, leaving a terminal state) is denied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::{AppError, ErrorCode};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    ReadyForPickup,
    PickedUp,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::ReadyForPickup,
        OrderStatus::PickedUp,
        OrderStatus::Cancelled,
    ];

    pub const TERMINAL: [OrderStatus; 2] = [OrderStatus::PickedUp, OrderStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::PickedUp | OrderStatus::Cancelled)
    }

    /// Transition table: the statuses reachable from `self` in one step
    pub fn allowed_targets(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Processing, OrderStatus::Cancelled],
            OrderStatus::Processing => &[OrderStatus::ReadyForPickup, OrderStatus::Cancelled],
            OrderStatus::ReadyForPickup => &[OrderStatus::PickedUp, OrderStatus::Cancelled],
            OrderStatus::PickedUp | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Validate a move against the transition table
    pub fn check_transition(&self, target: OrderStatus) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal { current: *self });
        }
        if !self.can_transition_to(target) {
            return Err(TransitionError::NotAllowed {
                from: *self,
                to: target,
            });
        }
        Ok(())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl From<UnknownStatus> for AppError {
    fn from(err: UnknownStatus) -> Self {
        AppError::new(ErrorCode::InvalidOrderStatus).with_detail("status", err.0)
    }
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Order is already {current}")]
    Terminal { current: OrderStatus },

    #[error("Cannot change order status from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },
}

impl TransitionError {
    pub fn current(&self) -> OrderStatus {
        match self {
            TransitionError::Terminal { current } => *current,
            TransitionError::NotAllowed { from, .. } => *from,
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        let code = match err {
            TransitionError::Terminal { .. } => ErrorCode::OrderAlreadyTerminal,
            TransitionError::NotAllowed { .. } => ErrorCode::OrderInvalidTransition,
        };
        AppError::with_message(code, err.to_string())
            .with_detail("current_status", err.current().as_str())
    }
}

/// Fulfilment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderType {
    #[default]
    Pickup,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Pickup => "pickup",
            OrderType::Delivery => "delivery",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(OrderType::Pickup),
            "delivery" => Ok(OrderType::Delivery),
            other => Err(AppError::new(ErrorCode::InvalidOrderType).with_detail("order_type", other)),
        }
    }
}
