//! Leasing orders and their status timeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BrokerId, CompanyId, OrderId, UserId, VehicleId};

/// Returned when a status string is not one of the known steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {value}")]
pub struct UnknownOrderStatus {
    pub value: String,
}

/// Fixed processing steps of a leasing order, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    CreditCheckStarted,
    CreditCheckApproved,
    ContractCreated,
    ContractSigned,
    VehicleOrdered,
    Delivered,
}

impl OrderStatus {
    /// Every step in timeline order.
    pub const ALL: [Self; 6] = [
        Self::CreditCheckStarted,
        Self::CreditCheckApproved,
        Self::ContractCreated,
        Self::ContractSigned,
        Self::VehicleOrdered,
        Self::Delivered,
    ];

    /// Zero-based position in [`OrderStatus::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::CreditCheckStarted => 0,
            Self::CreditCheckApproved => 1,
            Self::ContractCreated => 2,
            Self::ContractSigned => 3,
            Self::VehicleOrdered => 4,
            Self::Delivered => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditCheckStarted => "credit_check_started",
            Self::CreditCheckApproved => "credit_check_approved",
            Self::ContractCreated => "contract_created",
            Self::ContractSigned => "contract_signed",
            Self::VehicleOrdered => "vehicle_ordered",
            Self::Delivered => "delivered",
        }
    }

    /// German label shown in the order timeline.
    pub fn label(self) -> &'static str {
        match self {
            Self::CreditCheckStarted => "Bonitätsprüfung gestartet",
            Self::CreditCheckApproved => "Bonitätsprüfung erfolgreich",
            Self::ContractCreated => "Vertrag erstellt",
            Self::ContractSigned => "Vertrag unterschrieben",
            Self::VehicleOrdered => "Fahrzeug bestellt",
            Self::Delivered => "Fahrzeug ausgeliefert",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownOrderStatus {
                value: s.to_owned(),
            })
    }
}

/// Display state of one timeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

/// One rendered timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub label: String,
    pub state: StepState,
    /// When the order reached this step, if it has.
    pub reached_at: Option<DateTime<Utc>>,
}

/// Status change recorded on the order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
}

/// Step states for an order currently at `current`.
///
/// Steps before `current` are completed, `current` itself is current and
/// later steps are upcoming. A delivered order has every step completed.
///
/// # Examples
/// ```
/// use fleet_backend::domain::{step_states, OrderStatus, StepState};
///
/// let states = step_states(OrderStatus::ContractCreated);
/// assert_eq!(states[1], (OrderStatus::CreditCheckApproved, StepState::Completed));
/// assert_eq!(states[2], (OrderStatus::ContractCreated, StepState::Current));
/// assert_eq!(states[3], (OrderStatus::ContractSigned, StepState::Upcoming));
/// ```
pub fn step_states(current: OrderStatus) -> Vec<(OrderStatus, StepState)> {
    let current_index = current.index();
    OrderStatus::ALL
        .into_iter()
        .map(|status| {
            let state = if current == OrderStatus::Delivered || status.index() < current_index {
                StepState::Completed
            } else if status.index() == current_index {
                StepState::Current
            } else {
                StepState::Upcoming
            };
            (status, state)
        })
        .collect()
}

/// Leasing order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub vehicle_id: VehicleId,
    pub ordered_by: UserId,
    pub company_id: Option<CompanyId>,
    pub broker_id: Option<BrokerId>,
    pub duration_months: u16,
    pub annual_mileage_km: u32,
    pub monthly_rate_cents: i64,
    pub status: OrderStatus,
    pub status_history: Vec<StatusChange>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Render the timeline, attaching the latest timestamp per reached step.
    pub fn timeline(&self) -> Vec<TimelineStep> {
        step_states(self.status)
            .into_iter()
            .map(|(status, state)| TimelineStep {
                status,
                label: status.label().to_owned(),
                state,
                reached_at: self
                    .status_history
                    .iter()
                    .rev()
                    .find(|change| change.status == status)
                    .map(|change| change.at),
            })
            .collect()
    }

    /// Move to `status`, appending to the history.
    pub fn advance(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        self.status = status;
        self.status_history.push(StatusChange { status, at });
        self.updated_at = at;
    }
}
