//! Appointment transition table and role-gated planning.
//!
//! [`plan_transition`] is a pure function: given the freshly read record,
//! the requested target status and the actor, it either rejects the
//! request or returns the exact patch to write. The service layer owns
//! the read and the conditional write around it.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Appointment, AppointmentStatus, BookingType, DepositStatus, UserId};
use crate::error::RentalError;

/// Participant role relative to a specific appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The identity that created the appointment.
    Tenant,
    /// The identity owning the referenced room.
    Host,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tenant => f.write_str("tenant"),
            Self::Host => f.write_str("host"),
        }
    }
}

/// Named event behind each edge of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEvent {
    /// Host accepts the request.
    Approve,
    /// Host declines a pending request.
    Reject,
    /// Tenant attaches the transfer receipt.
    SubmitPayment,
    /// Host confirms the deposit arrived.
    ConfirmFunds,
    /// Host marks a confirmed viewing as done.
    CompleteViewing,
    /// Either participant withdraws.
    Cancel,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::SubmitPayment => "submit payment evidence",
            Self::ConfirmFunds => "confirm funds received",
            Self::CompleteViewing => "complete viewing",
            Self::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

struct Edge {
    from: AppointmentStatus,
    to: AppointmentStatus,
    event: TransitionEvent,
    roles: &'static [Role],
    /// `None` applies to every booking type.
    booking_type: Option<BookingType>,
}

const HOST: &[Role] = &[Role::Host];
const TENANT: &[Role] = &[Role::Tenant];
const EITHER: &[Role] = &[Role::Host, Role::Tenant];

// `pending -> cancelled` is the host-only reject edge; tenants withdraw
// only once the host has responded.
const EDGES: &[Edge] = &[
    Edge {
        from: AppointmentStatus::Pending,
        to: AppointmentStatus::Confirmed,
        event: TransitionEvent::Approve,
        roles: HOST,
        booking_type: Some(BookingType::View),
    },
    Edge {
        from: AppointmentStatus::Pending,
        to: AppointmentStatus::WaitingDeposit,
        event: TransitionEvent::Approve,
        roles: HOST,
        booking_type: Some(BookingType::Deposit),
    },
    Edge {
        from: AppointmentStatus::Pending,
        to: AppointmentStatus::Cancelled,
        event: TransitionEvent::Reject,
        roles: HOST,
        booking_type: None,
    },
    Edge {
        from: AppointmentStatus::WaitingDeposit,
        to: AppointmentStatus::Confirmed,
        event: TransitionEvent::SubmitPayment,
        roles: TENANT,
        booking_type: Some(BookingType::Deposit),
    },
    Edge {
        from: AppointmentStatus::Confirmed,
        to: AppointmentStatus::Contracted,
        event: TransitionEvent::ConfirmFunds,
        roles: HOST,
        booking_type: Some(BookingType::Deposit),
    },
    Edge {
        from: AppointmentStatus::Confirmed,
        to: AppointmentStatus::Completed,
        event: TransitionEvent::CompleteViewing,
        roles: HOST,
        booking_type: Some(BookingType::View),
    },
    Edge {
        from: AppointmentStatus::WaitingDeposit,
        to: AppointmentStatus::Cancelled,
        event: TransitionEvent::Cancel,
        roles: EITHER,
        booking_type: None,
    },
    Edge {
        from: AppointmentStatus::Confirmed,
        to: AppointmentStatus::Cancelled,
        event: TransitionEvent::Cancel,
        roles: EITHER,
        booking_type: None,
    },
];

/// Receipt the tenant attaches when paying a deposit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentEvidence {
    /// Image of the transfer receipt.
    pub bill_image: Option<String>,
    /// Free-form note for the host.
    pub note: Option<String>,
}

/// Field changes produced by an accepted edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPatch {
    /// Status the decision was based on; the write is conditional on it.
    pub from: AppointmentStatus,
    /// New status.
    pub to: AppointmentStatus,
    /// Event that was applied.
    pub event: TransitionEvent,
    /// New deposit bookkeeping value, if it changes.
    pub deposit_status: Option<DepositStatus>,
    /// Receipt to store, if supplied.
    pub bill_image: Option<String>,
    /// Note to store, if supplied.
    pub note: Option<String>,
}

/// Outcome of planning a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPlan {
    /// The record is already in the target status; nothing to write.
    NoOp,
    /// Write this patch.
    Apply(StatusPatch),
}

/// Roles `actor` holds on `appointment`.
#[must_use]
pub fn roles_of(appointment: &Appointment, actor: &UserId) -> Vec<Role> {
    let mut roles = Vec::with_capacity(2);
    if appointment.host_id == *actor {
        roles.push(Role::Host);
    }
    if appointment.tenant_id == *actor {
        roles.push(Role::Tenant);
    }
    roles
}

/// Statuses reachable from `status` for a booking of type `booking_type`.
#[must_use]
pub fn next_statuses(status: AppointmentStatus, booking_type: BookingType) -> Vec<AppointmentStatus> {
    EDGES
        .iter()
        .filter(|e| e.from == status && applies_to(e, booking_type))
        .map(|e| e.to)
        .collect()
}

fn applies_to(edge: &Edge, booking_type: BookingType) -> bool {
    edge.booking_type.is_none_or(|t| t == booking_type)
}

fn holds_any(held: &[Role], required: &[Role]) -> bool {
    held.iter().any(|r| required.contains(r))
}

fn describe_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Validates `current status -> target` for `actor` and returns the patch.
///
/// Check order: terminal status, idempotent re-send, edge lookup, role,
/// precondition.
///
/// # Errors
///
/// - [`RentalError::InvalidTransition`] if the record is terminal or the
///   edge is not in the table for its status and type.
/// - [`RentalError::Forbidden`] if `actor` does not hold the edge's role.
/// - [`RentalError::Validation`] if payment evidence lacks a bill image.
pub fn plan_transition(
    appointment: &Appointment,
    target: AppointmentStatus,
    actor: &UserId,
    evidence: Option<&PaymentEvidence>,
) -> Result<TransitionPlan, RentalError> {
    let current = appointment.status;
    let invalid = RentalError::InvalidTransition {
        from: current,
        to: target,
    };

    if current.is_terminal() {
        return Err(invalid);
    }

    let held = roles_of(appointment, actor);

    if current == target {
        let mut into_target = EDGES.iter().filter(|e| e.to == target).peekable();
        if into_target.peek().is_none() {
            return Err(invalid);
        }
        if into_target.any(|e| holds_any(&held, e.roles)) {
            return Ok(TransitionPlan::NoOp);
        }
        return Err(RentalError::Forbidden(format!(
            "{actor} may not set status {target} on appointment {}",
            appointment.id
        )));
    }

    let Some(edge) = EDGES
        .iter()
        .find(|e| e.from == current && e.to == target && applies_to(e, appointment.booking_type))
    else {
        return Err(invalid);
    };

    if !holds_any(&held, edge.roles) {
        return Err(RentalError::Forbidden(format!(
            "{} requires the {} of appointment {}",
            edge.event,
            describe_roles(edge.roles),
            appointment.id
        )));
    }

    let mut patch = StatusPatch {
        from: current,
        to: target,
        event: edge.event,
        deposit_status: None,
        bill_image: None,
        note: None,
    };

    match edge.event {
        TransitionEvent::SubmitPayment => {
            let supplied = evidence
                .and_then(|ev| ev.bill_image.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty());
            if supplied.is_none() && appointment.bill_image.is_none() {
                return Err(RentalError::Validation(
                    "bill image is required to submit payment evidence".to_string(),
                ));
            }
            patch.bill_image = supplied.map(ToString::to_string);
            patch.note = evidence
                .and_then(|ev| ev.note.clone())
                .filter(|n| !n.trim().is_empty());
            patch.deposit_status = Some(DepositStatus::PendingApproval);
        }
        TransitionEvent::ConfirmFunds => {
            patch.deposit_status = Some(DepositStatus::Paid);
        }
        TransitionEvent::Approve
        | TransitionEvent::Reject
        | TransitionEvent::CompleteViewing
        | TransitionEvent::Cancel => {}
    }

    Ok(TransitionPlan::Apply(patch))
}
