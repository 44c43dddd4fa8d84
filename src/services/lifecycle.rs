use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{
    non_blank, Appointment, AppointmentPatch, AppointmentStatus, Customer, NewAppointment,
    SlotTime,
};
use crate::services::notification::{Delivery, NotificationDispatcher, StatusNotice};
use crate::store::Store;

/// What happened to the customer email after a status change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// The new status does not notify, or the status did not change.
    NotRequired,
    /// The customer has no email address on file.
    Skipped,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub appointment: Appointment,
    pub notification: NotificationOutcome,
}

/// Owns the appointment status lifecycle.
///
/// Concurrent transitions of the same appointment are last-write-wins: the
/// edge is validated against the status read at the start of the call.
pub struct AppointmentService {
    store: Arc<dyn Store>,
    notifier: Arc<NotificationDispatcher>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<NotificationDispatcher>) -> Self {
        Self { store, notifier }
    }

    pub async fn list(&self) -> Result<Vec<Appointment>, AppError> {
        self.store.list_appointments().await
    }

    pub async fn get(&self, id: &str) -> Result<Appointment, AppError> {
        self.store
            .get_appointment(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))
    }

    pub async fn create(&self, request: NewAppointment) -> Result<Appointment, AppError> {
        self.create_at(request, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        request: NewAppointment,
        now: DateTime<Utc>,
    ) -> Result<Appointment, AppError> {
        let date_str = non_blank(request.date)
            .ok_or_else(|| AppError::validation("date is required"))?;
        let time_str = non_blank(request.time)
            .ok_or_else(|| AppError::validation("time is required"))?;

        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|_| AppError::validation(format!("invalid date '{date_str}', expected YYYY-MM-DD")))?;
        let time = SlotTime::parse(&time_str).map_err(AppError::Validation)?;

        let customer =
            self.resolve_customer(non_blank(request.customer_id), non_blank(request.customer_name))
                .await?;

        let appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: customer.id,
            customer_name: customer.name,
            date,
            time,
            comment: request.comment.unwrap_or_default(),
            image_url: non_blank(request.image_url),
            status: AppointmentStatus::Pending,
            created_at: now,
            seen_by_admin: false,
            confirmed_by_customer: false,
        };

        self.store.create_appointment(&appointment).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            customer = %appointment.customer_name,
            date = %appointment.date,
            time = %appointment.time,
            "appointment requested"
        );
        Ok(appointment)
    }

    /// Finds the booking customer by id, or by name, creating a customer
    /// record the first time an unknown name books.
    async fn resolve_customer(
        &self,
        customer_id: Option<String>,
        customer_name: Option<String>,
    ) -> Result<Customer, AppError> {
        if let Some(id) = customer_id {
            return self
                .store
                .get_customer_by_id(&id)
                .await?
                .ok_or_else(|| AppError::validation(format!("unknown customer '{id}'")));
        }

        let name = customer_name
            .ok_or_else(|| AppError::validation("customer reference is required"))?;

        if let Some(existing) = self.store.get_customer_by_name(&name).await? {
            return Ok(existing);
        }

        let customer = Customer {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email: None,
            phone: None,
        };
        self.store.create_customer(&customer).await?;
        tracing::info!(customer_id = %customer.id, name = %customer.name, "customer created on first booking");
        Ok(customer)
    }

    pub async fn transition(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<TransitionOutcome, AppError> {
        self.transition_at(id, status, Local::now().naive_local()).await
    }

    /// Moves an appointment to `status`. `now` is the studio's local wall
    /// clock, used to decide whether a confirmed appointment may complete.
    pub async fn transition_at(
        &self,
        id: &str,
        status: AppointmentStatus,
        now: NaiveDateTime,
    ) -> Result<TransitionOutcome, AppError> {
        let current = self.get(id).await?;

        if current.status == status {
            return Ok(TransitionOutcome {
                appointment: current,
                notification: NotificationOutcome::NotRequired,
            });
        }

        if current.status.is_terminal() {
            return Err(AppError::validation(format!(
                "appointment is {} and can no longer change",
                current.status
            )));
        }

        if !current.status.can_transition_to(status) {
            return Err(AppError::validation(format!(
                "cannot change appointment from {} to {}",
                current.status, status
            )));
        }

        if status == AppointmentStatus::Completed && current.starts_at() >= now {
            return Err(AppError::validation(
                "only appointments that have already taken place can be completed",
            ));
        }

        let appointment = self
            .store
            .update_appointment(id, &AppointmentPatch::status(status))
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))?;

        tracing::info!(
            appointment_id = %id,
            from = %current.status,
            to = %status,
            "appointment status changed"
        );

        let notification = if status.notifies_customer() {
            self.notify(&appointment).await
        } else {
            NotificationOutcome::NotRequired
        };

        Ok(TransitionOutcome {
            appointment,
            notification,
        })
    }

    /// Best effort: the status change is already committed, so every failure
    /// here is logged and reported, never returned as an error.
    async fn notify(&self, appointment: &Appointment) -> NotificationOutcome {
        let customer = match self.customer_for(appointment).await {
            Ok(customer) => customer,
            Err(e) => {
                tracing::warn!(appointment_id = %appointment.id, error = %e, "could not load customer for notification");
                return NotificationOutcome::Failed(e.to_string());
            }
        };

        let Some(email) = customer.and_then(|c| non_blank(c.email)) else {
            tracing::debug!(appointment_id = %appointment.id, "customer has no email, notification skipped");
            return NotificationOutcome::Skipped;
        };

        let notice = StatusNotice {
            to: email,
            customer_name: appointment.customer_name.clone(),
            date: appointment.date,
            time: appointment.time,
            status: appointment.status,
            comment: Some(appointment.comment.clone()).filter(|c| !c.is_empty()),
        };

        match self.notifier.dispatch(&notice).await {
            Ok(Delivery::Sent) => NotificationOutcome::Sent,
            Ok(Delivery::Disabled) => NotificationOutcome::Skipped,
            Err(e) => {
                tracing::warn!(appointment_id = %appointment.id, error = %e, "status notification failed");
                NotificationOutcome::Failed(e.to_string())
            }
        }
    }

    async fn customer_for(&self, appointment: &Appointment) -> Result<Option<Customer>, AppError> {
        if let Some(customer) = self.store.get_customer_by_id(&appointment.customer_id).await? {
            return Ok(Some(customer));
        }
        self.store.get_customer_by_name(&appointment.customer_name).await
    }

    pub async fn mark_seen(&self, id: &str) -> Result<Appointment, AppError> {
        let current = self.get(id).await?;
        if current.seen_by_admin {
            return Ok(current);
        }

        let patch = AppointmentPatch {
            seen_by_admin: Some(true),
            ..Default::default()
        };
        self.store
            .update_appointment(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))
    }

    pub async fn confirm_by_customer(&self, id: &str) -> Result<Appointment, AppError> {
        let current = self.get(id).await?;
        if matches!(
            current.status,
            AppointmentStatus::Rejected | AppointmentStatus::Cancelled
        ) {
            return Err(AppError::validation(format!(
                "a {} appointment cannot be confirmed",
                current.status
            )));
        }
        if current.confirmed_by_customer {
            return Ok(current);
        }

        let patch = AppointmentPatch {
            confirmed_by_customer: Some(true),
            ..Default::default()
        };
        self.store
            .update_appointment(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.store.delete_appointment(id).await? {
            tracing::info!(appointment_id = %id, "appointment deleted");
            Ok(())
        } else {
            Err(AppError::not_found(format!("appointment {id}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::services::notification::{EmailSender, OutgoingEmail};
    use crate::store::MemoryStore;

    struct MockSender {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for MockSender {
        async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail {
                anyhow::bail!("smtp relay down");
            }
            Ok(())
        }
    }

    struct Harness {
        service: AppointmentService,
        store: Arc<MemoryStore>,
        sender: Arc<MockSender>,
    }

    fn harness_with(fail: bool) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(MockSender {
            sent: Mutex::new(vec![]),
            fail,
        });
        let notifier = Arc::new(NotificationDispatcher::new(
            Some(sender.clone()),
            "studio@example.com".to_string(),
            "Studio".to_string(),
        )
        .unwrap());
        Harness {
            service: AppointmentService::new(store.clone(), notifier),
            store,
            sender,
        }
    }

    fn harness() -> Harness {
        harness_with(false)
    }

    fn request(name: &str, date: &str, time: &str) -> NewAppointment {
        NewAppointment {
            customer_name: Some(name.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            ..Default::default()
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    async fn add_customer(store: &MemoryStore, name: &str, email: Option<&str>) -> Customer {
        let customer = Customer {
            id: format!("cust-{name}"),
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: None,
        };
        store.create_customer(&customer).await.unwrap();
        customer
    }

    #[tokio::test]
    async fn test_create_assigns_defaults() {
        let h = harness();
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();

        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert!(!appt.seen_by_admin);
        assert!(!appt.confirmed_by_customer);
        assert_eq!(appt.customer_name, "Anna");
        assert_eq!(appt.comment, "");
    }

    #[tokio::test]
    async fn test_create_unknown_name_creates_customer() {
        let h = harness();
        let appt = h.service.create(request("Bea", "2025-06-10", "10:00")).await.unwrap();

        let customer = h.store.get_customer_by_name("Bea").await.unwrap().unwrap();
        assert_eq!(appt.customer_id, customer.id);
    }

    #[tokio::test]
    async fn test_create_reuses_existing_customer() {
        let h = harness();
        let anna = add_customer(&h.store, "Anna", None).await;
        let appt = h.service.create(request("Anna", "2025-06-10", "10:00")).await.unwrap();

        assert_eq!(appt.customer_id, anna.id);
        assert_eq!(h.store.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_by_customer_id_uses_stored_name() {
        let h = harness();
        let anna = add_customer(&h.store, "Anna", None).await;
        let appt = h
            .service
            .create(NewAppointment {
                customer_id: Some(anna.id.clone()),
                date: Some("2025-06-10".to_string()),
                time: Some("11:30".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(appt.customer_name, "Anna");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let h = harness();

        let missing_date = NewAppointment {
            date: None,
            ..request("Anna", "", "14:00")
        };
        assert!(matches!(
            h.service.create(missing_date).await,
            Err(AppError::Validation(_))
        ));

        let missing_time = request("Anna", "2025-06-10", " ");
        assert!(matches!(
            h.service.create(missing_time).await,
            Err(AppError::Validation(_))
        ));

        let missing_customer = NewAppointment {
            customer_name: None,
            ..request("", "2025-06-10", "14:00")
        };
        assert!(matches!(
            h.service.create(missing_customer).await,
            Err(AppError::Validation(_))
        ));

        let unknown_id = NewAppointment {
            customer_id: Some("ghost".to_string()),
            ..request("Anna", "2025-06-10", "14:00")
        };
        assert!(matches!(
            h.service.create(unknown_id).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_off_slot_time_and_bad_date() {
        let h = harness();
        assert!(matches!(
            h.service.create(request("Anna", "2025-06-10", "14:10")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            h.service.create(request("Anna", "10.06.2025", "14:00")).await,
            Err(AppError::Validation(_))
        ));
        assert!(h.store.list_appointments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_sends_exactly_one_email() {
        let h = harness();
        add_customer(&h.store, "Anna", Some("anna@example.com")).await;
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();

        let outcome = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Confirmed, at("2025-06-01 09:00"))
            .await
            .unwrap();
        assert_eq!(outcome.appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(outcome.notification, NotificationOutcome::Sent);

        // Re-setting the same status is a no-op.
        let again = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Confirmed, at("2025-06-01 09:05"))
            .await
            .unwrap();
        assert_eq!(again.notification, NotificationOutcome::NotRequired);

        let sent = h.sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "anna@example.com");
        assert!(sent[0].subject.contains("confirmed"));
    }

    #[tokio::test]
    async fn test_no_email_skips_notification() {
        let h = harness();
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();

        let outcome = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Rejected, at("2025-06-01 09:00"))
            .await
            .unwrap();
        assert_eq!(outcome.notification, NotificationOutcome::Skipped);
        assert!(h.sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_transition() {
        let h = harness_with(true);
        add_customer(&h.store, "Anna", Some("anna@example.com")).await;
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();

        let outcome = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Cancelled, at("2025-06-01 09:00"))
            .await
            .unwrap();
        assert!(matches!(outcome.notification, NotificationOutcome::Failed(_)));

        let stored = h.service.get(&appt.id).await.unwrap();
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_illegal_edges_are_validation_errors() {
        let h = harness();
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();

        // pending -> completed skips confirmation
        assert!(matches!(
            h.service
                .transition_at(&appt.id, AppointmentStatus::Completed, at("2025-07-01 09:00"))
                .await,
            Err(AppError::Validation(_))
        ));

        h.service
            .transition_at(&appt.id, AppointmentStatus::Confirmed, at("2025-06-01 09:00"))
            .await
            .unwrap();
        h.service
            .transition_at(&appt.id, AppointmentStatus::Completed, at("2025-07-01 09:00"))
            .await
            .unwrap();

        // completed is terminal
        let err = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Pending, at("2025-07-01 09:00"))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, AppError::Validation(msg) if msg == "appointment is completed and can no longer change"),
            "{err}"
        );
        assert_eq!(
            h.service.get(&appt.id).await.unwrap().status,
            AppointmentStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_complete_requires_past_appointment() {
        let h = harness();
        add_customer(&h.store, "Anna", Some("anna@example.com")).await;
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);

        let outcome = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Confirmed, at("2025-06-01 09:00"))
            .await
            .unwrap();
        assert_eq!(outcome.notification, NotificationOutcome::Sent);

        let err = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Completed, at("2025-06-10 13:30"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let done = h
            .service
            .transition_at(&appt.id, AppointmentStatus::Completed, at("2025-06-10 15:00"))
            .await
            .unwrap();
        assert_eq!(done.appointment.status, AppointmentStatus::Completed);
        assert_eq!(done.notification, NotificationOutcome::NotRequired);
        assert_eq!(h.sender.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transition_unknown_id() {
        let h = harness();
        let err = h
            .service
            .transition("missing", AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_seen_is_idempotent() {
        let h = harness();
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();

        let first = h.service.mark_seen(&appt.id).await.unwrap();
        assert!(first.seen_by_admin);
        let second = h.service.mark_seen(&appt.id).await.unwrap();
        assert!(second.seen_by_admin);
        assert_eq!(second.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_by_customer() {
        let h = harness();
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();

        let confirmed = h.service.confirm_by_customer(&appt.id).await.unwrap();
        assert!(confirmed.confirmed_by_customer);
        assert_eq!(confirmed.status, AppointmentStatus::Pending);

        h.service
            .transition_at(&appt.id, AppointmentStatus::Rejected, at("2025-06-01 09:00"))
            .await
            .unwrap();
        assert!(matches!(
            h.service.confirm_by_customer(&appt.id).await,
            Err(AppError::Validation(_))
        ));

        let other = h.service.create(request("Anna", "2025-06-11", "14:00")).await.unwrap();
        h.service
            .transition_at(&other.id, AppointmentStatus::Cancelled, at("2025-06-01 09:00"))
            .await
            .unwrap();
        assert!(matches!(
            h.service.confirm_by_customer(&other.id).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let h = harness();
        let appt = h.service.create(request("Anna", "2025-06-10", "14:00")).await.unwrap();
        h.service.delete(&appt.id).await.unwrap();
        assert!(matches!(
            h.service.delete(&appt.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_round_trip_through_list() {
        let h = harness();
        let created = h
            .service
            .create(NewAppointment {
                comment: Some("almond, nude".to_string()),
                ..request("Anna", "2025-06-10", "14:00")
            })
            .await
            .unwrap();

        let all = h.service.list().await.unwrap();
        let matching: Vec<_> = all
            .iter()
            .filter(|a| {
                a.customer_name == "Anna"
                    && a.date == created.date
                    && a.time == created.time
                    && a.comment == "almond, nude"
            })
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0], &created);
    }
}
