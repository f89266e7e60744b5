//! Appointment service: booking creation, transitions, and participant reads.

use std::sync::Arc;

use super::feed::{ParticipantFeed, Snapshot, SubscriptionHandle};
use crate::domain::lifecycle::{plan_transition, roles_of};
use crate::domain::{
    Appointment, AppointmentEvent, AppointmentId, AppointmentStatus, BookingType, DepositQr,
    EventBus, NewAppointment, PaymentAccount, PaymentEvidence, Role, RoomId, TenantInfo,
    TransitionPlan, UserId, deposit,
};
use crate::error::RentalError;
use crate::identity::Session;
use crate::persistence::{AppointmentStore, RoomCatalog, StoreError};

/// Input for [`AppointmentService::create_booking`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Room to book.
    pub room_id: RoomId,
    /// Tenant the booking is for; must be the caller when present.
    pub tenant_id: Option<UserId>,
    /// Tenant contact details.
    pub tenant_info: TenantInfo,
    /// Viewing or deposit.
    pub booking_type: BookingType,
    /// Reservation start, required for deposits.
    pub start_date: Option<String>,
    /// Reservation end, required for deposits.
    pub end_date: Option<String>,
    /// Deposit amount, required for deposits.
    pub deposit_amount: Option<u64>,
}

/// Result of [`AppointmentService::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The record after the call.
    pub appointment: Appointment,
    /// `false` when the record already had the target status.
    pub applied: bool,
}

/// Orchestrates the appointment lifecycle.
///
/// Every mutation follows the same pattern: read the record, plan the
/// change with the pure transition table, write it conditionally, emit
/// an [`AppointmentEvent`], return the stored record.
#[derive(Debug, Clone)]
pub struct AppointmentService {
    store: Arc<dyn AppointmentStore>,
    rooms: Arc<dyn RoomCatalog>,
    event_bus: EventBus,
    payment_account: PaymentAccount,
}

fn required_text(value: Option<&str>, field: &str) -> Result<String, RentalError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| RentalError::Validation(format!("{field} is required for deposit bookings")))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl AppointmentService {
    /// Creates a new `AppointmentService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        rooms: Arc<dyn RoomCatalog>,
        event_bus: EventBus,
        payment_account: PaymentAccount,
    ) -> Self {
        Self {
            store,
            rooms,
            event_bus,
            payment_account,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Creates a `pending` booking for the caller.
    ///
    /// Reads the room once to snapshot its title and image and to take
    /// the host. A failed write is reported, never retried.
    ///
    /// # Errors
    ///
    /// - [`RentalError::Forbidden`] if `tenant_id` names someone else.
    /// - [`RentalError::Validation`] for blank contact details, missing
    ///   deposit fields, a room closed for booking, or booking one's own
    ///   room.
    /// - [`RentalError::NotFound`] if the room does not exist.
    /// - [`RentalError::Dependency`] if storage fails.
    pub async fn create_booking(
        &self,
        session: &Session,
        request: BookingRequest,
    ) -> Result<Appointment, RentalError> {
        let tenant_id = session.user_id().clone();
        if let Some(requested) = &request.tenant_id
            && *requested != tenant_id
        {
            return Err(RentalError::Forbidden(format!(
                "{tenant_id} may not book on behalf of {requested}"
            )));
        }

        let mut tenant_info = request.tenant_info;
        tenant_info.full_name = tenant_info.full_name.trim().to_string();
        tenant_info.phone_number = tenant_info.phone_number.trim().to_string();
        if tenant_info.full_name.is_empty() {
            return Err(RentalError::Validation("tenant full name is required".to_string()));
        }
        if tenant_info.phone_number.is_empty() {
            return Err(RentalError::Validation("tenant phone number is required".to_string()));
        }
        tenant_info.id_card = optional_text(tenant_info.id_card);

        let (start_date, end_date, deposit_amount) = match request.booking_type {
            BookingType::Deposit => {
                let amount = request.deposit_amount.ok_or_else(|| {
                    RentalError::Validation(
                        "deposit amount is required for deposit bookings".to_string(),
                    )
                })?;
                let start = required_text(request.start_date.as_deref(), "start date")?;
                let end = required_text(request.end_date.as_deref(), "end date")?;
                (Some(start), Some(end), Some(amount))
            }
            BookingType::View => (
                optional_text(request.start_date),
                optional_text(request.end_date),
                None,
            ),
        };

        let room = self.rooms.get(request.room_id).await?;
        if !room.available {
            return Err(RentalError::Validation(format!(
                "room {} is not open for booking",
                room.id
            )));
        }
        if room.host_id == tenant_id {
            return Err(RentalError::Validation(
                "hosts cannot book their own room".to_string(),
            ));
        }

        let appointment = self
            .store
            .insert(NewAppointment {
                room_id: room.id,
                room_title: room.title,
                room_image: room.image,
                tenant_id,
                host_id: room.host_id,
                booking_type: request.booking_type,
                start_date,
                end_date,
                deposit_amount,
                tenant_info,
            })
            .await?;

        let _ = self.event_bus.publish(AppointmentEvent::AppointmentCreated {
            appointment_id: appointment.id,
            tenant_id: appointment.tenant_id.clone(),
            host_id: appointment.host_id.clone(),
            booking_type: appointment.booking_type,
            timestamp: appointment.created_at,
        });

        tracing::info!(
            appointment_id = %appointment.id,
            room_id = %appointment.room_id,
            booking_type = %appointment.booking_type,
            "booking created"
        );
        Ok(appointment)
    }

    /// Moves an appointment to `target` on behalf of the caller.
    ///
    /// Re-sending the current status is a successful no-op for a
    /// participant entitled to set it. If the record changes between the
    /// read and the write, it is re-read and re-planned once: the fresh
    /// plan is applied if its edge is still open.
    ///
    /// # Errors
    ///
    /// - [`RentalError::NotFound`] if the appointment does not exist.
    /// - [`RentalError::InvalidTransition`] if the edge is not allowed.
    /// - [`RentalError::Forbidden`] if the caller lacks the edge's role.
    /// - [`RentalError::Validation`] if payment evidence has no bill image.
    /// - [`RentalError::Dependency`] if storage fails, or if the record
    ///   changed again during the second write.
    pub async fn transition(
        &self,
        id: AppointmentId,
        target: AppointmentStatus,
        session: &Session,
        evidence: Option<PaymentEvidence>,
    ) -> Result<TransitionOutcome, RentalError> {
        let actor = session.user_id();
        let mut current = self.get_by_id(id).await?;
        let mut replanned = false;

        let (patch, updated) = loop {
            let patch = match plan_transition(&current, target, actor, evidence.as_ref())? {
                TransitionPlan::NoOp => {
                    tracing::debug!(appointment_id = %id, status = %target, "transition is a no-op");
                    return Ok(TransitionOutcome {
                        appointment: current,
                        applied: false,
                    });
                }
                TransitionPlan::Apply(patch) => patch,
            };

            match self.store.update_status(id, &patch).await {
                Ok(updated) => break (patch, updated),
                Err(StoreError::StatusConflict { actual, .. }) if !replanned => {
                    tracing::warn!(
                        appointment_id = %id,
                        expected = %patch.from,
                        actual = %actual,
                        "status changed concurrently; re-checking"
                    );
                    replanned = true;
                    current = self.get_by_id(id).await?;
                }
                Err(StoreError::StatusConflict { .. }) => {
                    return Err(RentalError::Dependency(format!(
                        "appointment {id} is changing concurrently; retry"
                    )));
                }
                Err(StoreError::NotFound { .. }) => {
                    return Err(RentalError::appointment_not_found(id));
                }
                Err(e) => return Err(e.into()),
            }
        };

        let _ = self.event_bus.publish(AppointmentEvent::StatusChanged {
            appointment_id: id,
            tenant_id: updated.tenant_id.clone(),
            host_id: updated.host_id.clone(),
            from: patch.from,
            to: patch.to,
            event: patch.event,
            actor: actor.clone(),
            timestamp: updated.updated_at,
        });

        tracing::info!(
            appointment_id = %id,
            from = %patch.from,
            to = %patch.to,
            event = %patch.event,
            actor = %actor,
            "appointment transitioned"
        );
        Ok(TransitionOutcome {
            appointment: updated,
            applied: true,
        })
    }

    /// Loads an appointment without any access check.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] or [`RentalError::Dependency`].
    pub async fn get_by_id(&self, id: AppointmentId) -> Result<Appointment, RentalError> {
        self.store.get(id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => RentalError::appointment_not_found(id),
            other => other.into(),
        })
    }

    /// Loads an appointment the caller takes part in.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Forbidden`] for non-participants, plus the
    /// errors of [`Self::get_by_id`].
    pub async fn get_for_participant(
        &self,
        id: AppointmentId,
        session: &Session,
    ) -> Result<Appointment, RentalError> {
        let appointment = self.get_by_id(id).await?;
        if !appointment.is_participant(session.user_id()) {
            return Err(RentalError::Forbidden(format!(
                "{} is not a participant of appointment {id}",
                session.user_id()
            )));
        }
        Ok(appointment)
    }

    /// The caller's appointments, newest first, optionally narrowed to
    /// the ones where they hold `role`.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Dependency`] if storage fails.
    pub async fn list_for_participant(
        &self,
        session: &Session,
        role: Option<Role>,
    ) -> Result<Vec<Appointment>, RentalError> {
        let user = session.user_id();
        let mut list = self.store.list_by_participant(user).await?;
        if let Some(role) = role {
            list.retain(|a| roles_of(a, user).contains(&role));
        }
        Ok(list)
    }

    /// Payment QR for a deposit appointment the caller takes part in.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] if no payment is due, plus the
    /// errors of [`Self::get_for_participant`].
    pub async fn deposit_qr(
        &self,
        id: AppointmentId,
        session: &Session,
    ) -> Result<DepositQr, RentalError> {
        let appointment = self.get_for_participant(id, session).await?;
        deposit::deposit_qr(&self.payment_account, &appointment)
    }

    /// Opens a pull-style feed of `user`'s appointments.
    #[must_use]
    pub fn feed(&self, user: UserId) -> ParticipantFeed {
        ParticipantFeed::new(Arc::clone(&self.store), &self.event_bus, user)
    }

    /// Pushes `user`'s full appointment list to `callback` now and after
    /// every change to one of their records, until the handle is
    /// cancelled or dropped. Must be called inside a Tokio runtime.
    pub fn subscribe_by_participant<F>(&self, user: UserId, callback: F) -> SubscriptionHandle
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        SubscriptionHandle::spawn(self.feed(user), callback)
    }
}
