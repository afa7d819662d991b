//! Order status flow
//!
//! Each shop owns a configurable state machine for its orders. The flow is
//! data, not code: an ordered list of statuses, each carrying its outgoing
//! transitions. The first entry is the initial status of new orders.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// One allowed edge out of a status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusTransition {
    /// User-visible action name, e.g. "accept"
    pub name: String,
    pub next_status: i32,
    pub next_status_label: String,
}

/// One status within a flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusConfig {
    /// Numeric status value stored on orders
    pub value: i32,
    /// Display label, e.g. "pending"
    pub label: String,
    /// Free-form category hint for clients
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub transitions: Vec<StatusTransition>,
}

/// A shop's complete order status state machine.
///
/// Stored as JSON on the shop row; orders reference statuses by `value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusFlow {
    pub statuses: Vec<OrderStatusConfig>,
}

impl Default for OrderStatusFlow {
    /// pending -> accepted -> shipped -> completed, with reject and cancel
    /// branches out of pending.
    fn default() -> Self {
        fn edge(name: &str, next_status: i32, next_status_label: &str) -> StatusTransition {
            StatusTransition {
                name: name.to_string(),
                next_status,
                next_status_label: next_status_label.to_string(),
            }
        }

        Self {
            statuses: vec![
                OrderStatusConfig {
                    value: 1,
                    label: "pending".to_string(),
                    kind: "open".to_string(),
                    is_final: false,
                    transitions: vec![
                        edge("accept", 2, "accepted"),
                        edge("reject", 3, "rejected"),
                        edge("cancel", -1, "canceled"),
                    ],
                },
                OrderStatusConfig {
                    value: 2,
                    label: "accepted".to_string(),
                    kind: "open".to_string(),
                    is_final: false,
                    transitions: vec![edge("ship", 4, "shipped")],
                },
                OrderStatusConfig {
                    value: 3,
                    label: "rejected".to_string(),
                    kind: "closed".to_string(),
                    is_final: true,
                    transitions: vec![],
                },
                OrderStatusConfig {
                    value: 4,
                    label: "shipped".to_string(),
                    kind: "open".to_string(),
                    is_final: false,
                    transitions: vec![edge("complete", 10, "completed")],
                },
                OrderStatusConfig {
                    value: 10,
                    label: "completed".to_string(),
                    kind: "closed".to_string(),
                    is_final: true,
                    transitions: vec![],
                },
                OrderStatusConfig {
                    value: -1,
                    label: "canceled".to_string(),
                    kind: "closed".to_string(),
                    is_final: true,
                    transitions: vec![],
                },
            ],
        }
    }
}

impl OrderStatusFlow {
    /// Initial status for new orders: the first configured entry.
    pub fn initial_status(&self) -> AppResult<&OrderStatusConfig> {
        self.statuses
            .first()
            .ok_or_else(|| AppError::new(ErrorCode::InvalidStatusFlow))
    }

    /// Look up a status by its numeric value.
    pub fn config(&self, value: i32) -> Option<&OrderStatusConfig> {
        self.statuses.iter().find(|s| s.value == value)
    }

    /// Check whether a transition from `current` to `next` is allowed.
    ///
    /// Fails with `StatusNotInFlow` when `current` is unknown, with
    /// `TerminalState` when `current` is final, and with `InvalidTransition`
    /// when no configured edge leads to `next`.
    pub fn check_transition(&self, current: i32, next: i32) -> AppResult<&StatusTransition> {
        let config = self
            .config(current)
            .ok_or_else(|| AppError::new(ErrorCode::StatusNotInFlow).with_detail("status", current))?;

        if config.is_final {
            return Err(AppError::new(ErrorCode::TerminalState)
                .with_detail("status", current)
                .with_detail("label", config.label.clone()));
        }

        config
            .transitions
            .iter()
            .find(|t| t.next_status == next)
            .ok_or_else(|| {
                AppError::new(ErrorCode::InvalidTransition)
                    .with_detail("from", current)
                    .with_detail("to", next)
            })
    }

    /// Validate the flow before persisting it on a shop.
    ///
    /// Rules: at least one status, no duplicate values, every transition
    /// target resolves within the flow, and every non-final status has at
    /// least one outgoing transition.
    pub fn validate(&self) -> AppResult<()> {
        if self.statuses.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusFlow,
                "Flow must contain at least one status",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for status in &self.statuses {
            if !seen.insert(status.value) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidStatusFlow,
                    format!("Duplicate status value {}", status.value),
                ));
            }
        }

        for status in &self.statuses {
            if !status.is_final && status.transitions.is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::InvalidStatusFlow,
                    format!("Non-final status {} has no transitions", status.value),
                ));
            }
            for transition in &status.transitions {
                if self.config(transition.next_status).is_none() {
                    return Err(AppError::with_message(
                        ErrorCode::InvalidStatusFlow,
                        format!(
                            "Transition \"{}\" targets unknown status {}",
                            transition.name, transition.next_status
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flow_is_valid() {
        let flow = OrderStatusFlow::default();
        assert!(flow.validate().is_ok());
        assert_eq!(flow.initial_status().unwrap().value, 1);
    }

    #[test]
    fn default_flow_edges() {
        let flow = OrderStatusFlow::default();

        assert_eq!(flow.check_transition(1, 2).unwrap().name, "accept");
        assert_eq!(flow.check_transition(1, 3).unwrap().name, "reject");
        assert_eq!(flow.check_transition(1, -1).unwrap().name, "cancel");
        assert_eq!(flow.check_transition(2, 4).unwrap().name, "ship");
        assert_eq!(flow.check_transition(4, 10).unwrap().name, "complete");
    }

    #[test]
    fn transition_not_in_flow_is_rejected() {
        let flow = OrderStatusFlow::default();

        // pending cannot jump straight to shipped
        let err = flow.check_transition(1, 4).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        // accepted cannot be canceled in the default flow
        let err = flow.check_transition(2, -1).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn terminal_states_reject_everything() {
        let flow = OrderStatusFlow::default();

        for terminal in [3, 10, -1] {
            let err = flow.check_transition(terminal, 1).unwrap_err();
            assert_eq!(err.code, ErrorCode::TerminalState, "status {terminal}");
        }

        // completed -> shipped specifically
        let err = flow.check_transition(10, 4).unwrap_err();
        assert_eq!(err.code, ErrorCode::TerminalState);
    }

    #[test]
    fn unknown_current_status_is_rejected() {
        let flow = OrderStatusFlow::default();
        let err = flow.check_transition(99, 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::StatusNotInFlow);
    }

    #[test]
    fn empty_flow_is_invalid() {
        let flow = OrderStatusFlow { statuses: vec![] };
        assert_eq!(
            flow.validate().unwrap_err().code,
            ErrorCode::InvalidStatusFlow
        );
        assert!(flow.initial_status().is_err());
    }

    #[test]
    fn duplicate_status_values_are_invalid() {
        let mut flow = OrderStatusFlow::default();
        flow.statuses.push(OrderStatusConfig {
            value: 1,
            label: "dup".to_string(),
            kind: String::new(),
            is_final: true,
            transitions: vec![],
        });
        assert_eq!(
            flow.validate().unwrap_err().code,
            ErrorCode::InvalidStatusFlow
        );
    }

    #[test]
    fn dangling_transition_target_is_invalid() {
        let mut flow = OrderStatusFlow::default();
        flow.statuses[0].transitions.push(StatusTransition {
            name: "warp".to_string(),
            next_status: 77,
            next_status_label: "nowhere".to_string(),
        });
        assert_eq!(
            flow.validate().unwrap_err().code,
            ErrorCode::InvalidStatusFlow
        );
    }

    #[test]
    fn non_final_status_without_transitions_is_invalid() {
        let flow = OrderStatusFlow {
            statuses: vec![OrderStatusConfig {
                value: 1,
                label: "stuck".to_string(),
                kind: String::new(),
                is_final: false,
                transitions: vec![],
            }],
        };
        assert_eq!(
            flow.validate().unwrap_err().code,
            ErrorCode::InvalidStatusFlow
        );
    }

    #[test]
    fn flow_round_trips_through_json() {
        let flow = OrderStatusFlow::default();
        let json = serde_json::to_string(&flow).unwrap();
        let parsed: OrderStatusFlow = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, flow);
    }
}
