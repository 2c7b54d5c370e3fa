use crate::orders::OrderStatus;

/// Service for managing order status transitions
///
/// The lifecycle is a strict linear chain
/// pending → confirmed → preparing → ready → delivering → delivered,
/// with `cancelled` as an absorbing state reachable from any
/// non-terminal status. The guarded `advance` moves exactly one step
/// along the chain; the admin manual override bypasses it entirely and
/// lives in the service layer.
pub struct StatusMachine;

impl StatusMachine {
    /// The strict linear successor of a status
    ///
    /// Returns None for the terminal states (`delivered`, `cancelled`),
    /// which have no next step.
    pub fn next_status(current: OrderStatus) -> Option<OrderStatus> {
        match current {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivering),
            OrderStatus::Delivering => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
            OrderStatus::Cancelled => None,
        }
    }

    /// Whether a status ends the lifecycle
    pub fn is_terminal(status: OrderStatus) -> bool {
        matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether an order in this status may still be cancelled
    pub fn can_cancel(status: OrderStatus) -> bool {
        !Self::is_terminal(status)
    }

    /// Attempt the guarded one-step advance
    ///
    /// # Returns
    /// `Ok(next)` along the linear chain, `Err(message)` at a terminal
    pub fn advance(current: OrderStatus) -> Result<OrderStatus, String> {
        Self::next_status(current)
            .ok_or_else(|| format!("Order in status {} has no next status", current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_advances_to_confirmed() {
        assert_eq!(
            StatusMachine::next_status(OrderStatus::Pending),
            Some(OrderStatus::Confirmed)
        );
    }

    #[test]
    fn test_confirmed_advances_to_preparing() {
        assert_eq!(
            StatusMachine::next_status(OrderStatus::Confirmed),
            Some(OrderStatus::Preparing)
        );
    }

    #[test]
    fn test_preparing_advances_to_ready() {
        assert_eq!(
            StatusMachine::next_status(OrderStatus::Preparing),
            Some(OrderStatus::Ready)
        );
    }

    #[test]
    fn test_ready_advances_to_delivering() {
        assert_eq!(
            StatusMachine::next_status(OrderStatus::Ready),
            Some(OrderStatus::Delivering)
        );
    }

    #[test]
    fn test_delivering_advances_to_delivered() {
        assert_eq!(
            StatusMachine::next_status(OrderStatus::Delivering),
            Some(OrderStatus::Delivered)
        );
    }

    #[test]
    fn test_delivered_has_no_next() {
        assert_eq!(StatusMachine::next_status(OrderStatus::Delivered), None);
    }

    #[test]
    fn test_cancelled_has_no_next() {
        assert_eq!(StatusMachine::next_status(OrderStatus::Cancelled), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(StatusMachine::is_terminal(OrderStatus::Delivered));
        assert!(StatusMachine::is_terminal(OrderStatus::Cancelled));
        assert!(!StatusMachine::is_terminal(OrderStatus::Pending));
        assert!(!StatusMachine::is_terminal(OrderStatus::Delivering));
    }

    #[test]
    fn test_can_cancel_any_non_terminal() {
        assert!(StatusMachine::can_cancel(OrderStatus::Pending));
        assert!(StatusMachine::can_cancel(OrderStatus::Confirmed));
        assert!(StatusMachine::can_cancel(OrderStatus::Preparing));
        assert!(StatusMachine::can_cancel(OrderStatus::Ready));
        assert!(StatusMachine::can_cancel(OrderStatus::Delivering));
        assert!(!StatusMachine::can_cancel(OrderStatus::Delivered));
        assert!(!StatusMachine::can_cancel(OrderStatus::Cancelled));
    }

    #[test]
    fn test_advance_valid() {
        let result = StatusMachine::advance(OrderStatus::Pending);
        assert_eq!(result.unwrap(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_advance_from_terminal_fails() {
        let result = StatusMachine::advance(OrderStatus::Delivered);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("no next status"));

        assert!(StatusMachine::advance(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn test_full_chain_runs_pending_to_delivered() {
        let mut status = OrderStatus::Pending;
        let mut steps = 0;

        while let Some(next) = StatusMachine::next_status(status) {
            status = next;
            steps += 1;
        }

        assert_eq!(status, OrderStatus::Delivered);
        assert_eq!(steps, 5);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn order_status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::Confirmed),
            Just(OrderStatus::Preparing),
            Just(OrderStatus::Ready),
            Just(OrderStatus::Delivering),
            Just(OrderStatus::Delivered),
            Just(OrderStatus::Cancelled),
        ]
    }

    /// next_status and is_terminal agree: only terminals lack a successor
    #[test]
    fn prop_next_consistent_with_terminal() {
        proptest!(|(status in order_status_strategy())| {
            let has_next = StatusMachine::next_status(status).is_some();
            prop_assert_eq!(has_next, !StatusMachine::is_terminal(status));
        });
    }

    /// advance and next_status are two views of the same table
    #[test]
    fn prop_advance_consistency() {
        proptest!(|(status in order_status_strategy())| {
            match StatusMachine::next_status(status) {
                Some(next) => {
                    let advanced = StatusMachine::advance(status);
                    prop_assert!(advanced.is_ok());
                    prop_assert_eq!(advanced.unwrap(), next);
                }
                None => {
                    prop_assert!(StatusMachine::advance(status).is_err());
                }
            }
        });
    }

    /// Repeated advancing always reaches delivered in at most five steps
    /// from any status on the linear chain
    #[test]
    fn prop_chain_terminates() {
        proptest!(|(start in order_status_strategy())| {
            let mut status = start;
            let mut steps = 0;

            while let Some(next) = StatusMachine::next_status(status) {
                status = next;
                steps += 1;
                prop_assert!(steps <= 5, "chain must terminate within five steps");
            }

            prop_assert!(StatusMachine::is_terminal(status));
            if start != OrderStatus::Cancelled {
                prop_assert_eq!(status, OrderStatus::Delivered);
            }
        });
    }
}
