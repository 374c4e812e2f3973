//! Order status state machine.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown order status name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid order status: {0}")]
pub struct OrderStatusError(pub String);

/// Lifecycle status of an order, stored in the `order_statuses` lookup table.
///
/// Every order starts `IN PROCESS` and may move to exactly one of the two
/// terminal states:
///
/// ```text
/// IN PROCESS ──▶ COMPLETE
///           └──▶ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed but not yet fulfilled or cancelled.
    InProcess,
    /// Fulfilled. Terminal.
    Complete,
    /// Cancelled. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in bootstrap order.
    pub const ALL: [Self; 3] = [Self::InProcess, Self::Complete, Self::Cancelled];

    /// The database/name form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProcess => "IN PROCESS",
            Self::Complete => "COMPLETE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether no further transition is allowed out of this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }

    /// Whether an order in this status may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(self, Self::InProcess) && matches!(next, Self::Complete | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderStatusError;

    /// Status names are matched case-insensitively ("in process" is accepted
    /// from clients), but always stored and reported in their canonical
    /// upper-case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IN PROCESS" => Ok(Self::InProcess),
            "COMPLETE" => Ok(Self::Complete),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(OrderStatusError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_names() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            "in process".parse::<OrderStatus>().unwrap(),
            OrderStatus::InProcess
        );
        assert_eq!(
            "Cancelled".parse::<OrderStatus>().unwrap(),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_transitions() {
        use OrderStatus::{Cancelled, Complete, InProcess};

        assert!(InProcess.can_transition_to(Complete));
        assert!(InProcess.can_transition_to(Cancelled));
        assert!(!InProcess.can_transition_to(InProcess));

        // Terminal states accept nothing
        for terminal in [Complete, Cancelled] {
            assert!(terminal.is_terminal());
            for next in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
