//! Order status lifecycle.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult};

/// Order status. `Pending` is set at creation; `Success` and `Failed` are the
/// outcomes a seller records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Success,
    Failed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Success => "Success",
            OrderStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Success" => Ok(OrderStatus::Success),
            "Failed" => Ok(OrderStatus::Failed),
            other => Err(DomainError::invalid_field(
                "status",
                format!("expected one of Pending, Success, Failed (got {other:?})"),
            )),
        }
    }
}

/// Which status changes a seller may perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any status may be set from any status.
    #[default]
    Permissive,
    /// Only `Pending -> Success | Failed`.
    Strict,
}

impl TransitionPolicy {
    pub fn check(self, from: OrderStatus, to: OrderStatus) -> DomainResult<()> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict => {
                if from == OrderStatus::Pending && to.is_terminal() {
                    Ok(())
                } else {
                    Err(DomainError::invariant(format!(
                        "order status cannot change from {from} to {to}"
                    )))
                }
            }
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(DomainError::validation(format!(
                "unknown order status policy {other:?}"
            ))),
        }
    }
}
