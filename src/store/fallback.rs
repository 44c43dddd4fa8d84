use std::sync::Arc;

use async_trait::async_trait;

use super::{MemoryStore, Store};
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentPatch, Customer, CustomerPatch};

/// Best-effort durable storage that degrades to process-lifetime storage.
///
/// Every call goes to the primary first. Successful writes are copied into
/// the mirror and successful list reads reseed it. When the primary fails the
/// call is answered by the mirror instead and the failure is only logged, so
/// writes made during an outage are lost on restart.
pub struct FallbackStore {
    primary: Arc<dyn Store>,
    mirror: MemoryStore,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn Store>) -> Self {
        Self {
            primary,
            mirror: MemoryStore::new(),
        }
    }

    fn degrade(&self, op: &'static str, err: &AppError) {
        tracing::warn!(
            op,
            primary = self.primary.backend(),
            error = %err,
            "primary store failed, serving from in-memory mirror"
        );
    }
}

#[async_trait]
impl Store for FallbackStore {
    fn backend(&self) -> &'static str {
        "fallback"
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        match self.primary.list_customers().await {
            Ok(customers) => {
                self.mirror.replace_customers(customers.clone());
                Ok(customers)
            }
            Err(e) => {
                self.degrade("list_customers", &e);
                self.mirror.list_customers().await
            }
        }
    }

    async fn get_customer_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        match self.primary.get_customer_by_id(id).await {
            Ok(customer) => Ok(customer),
            Err(e) => {
                self.degrade("get_customer_by_id", &e);
                self.mirror.get_customer_by_id(id).await
            }
        }
    }

    async fn get_customer_by_name(&self, name: &str) -> Result<Option<Customer>, AppError> {
        match self.primary.get_customer_by_name(name).await {
            Ok(customer) => Ok(customer),
            Err(e) => {
                self.degrade("get_customer_by_name", &e);
                self.mirror.get_customer_by_name(name).await
            }
        }
    }

    async fn create_customer(&self, customer: &Customer) -> Result<(), AppError> {
        if let Err(e) = self.primary.create_customer(customer).await {
            self.degrade("create_customer", &e);
        }
        self.mirror.upsert_customer(customer.clone());
        Ok(())
    }

    async fn update_customer(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, AppError> {
        match self.primary.update_customer(id, patch).await {
            Ok(Some(customer)) => {
                self.mirror.upsert_customer(customer.clone());
                Ok(Some(customer))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.degrade("update_customer", &e);
                self.mirror.update_customer(id, patch).await
            }
        }
    }

    async fn delete_customer(&self, id: &str) -> Result<bool, AppError> {
        let mirrored = self.mirror.delete_customer(id).await?;
        match self.primary.delete_customer(id).await {
            Ok(existed) => Ok(existed),
            Err(e) => {
                self.degrade("delete_customer", &e);
                Ok(mirrored)
            }
        }
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        match self.primary.list_appointments().await {
            Ok(appointments) => {
                self.mirror.replace_appointments(appointments.clone());
                Ok(appointments)
            }
            Err(e) => {
                self.degrade("list_appointments", &e);
                self.mirror.list_appointments().await
            }
        }
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AppError> {
        match self.primary.get_appointment(id).await {
            Ok(appointment) => Ok(appointment),
            Err(e) => {
                self.degrade("get_appointment", &e);
                self.mirror.get_appointment(id).await
            }
        }
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<(), AppError> {
        if let Err(e) = self.primary.create_appointment(appointment).await {
            self.degrade("create_appointment", &e);
        }
        self.mirror.upsert_appointment(appointment.clone());
        Ok(())
    }

    async fn update_appointment(
        &self,
        id: &str,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, AppError> {
        match self.primary.update_appointment(id, patch).await {
            Ok(Some(appointment)) => {
                self.mirror.upsert_appointment(appointment.clone());
                Ok(Some(appointment))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.degrade("update_appointment", &e);
                self.mirror.update_appointment(id, patch).await
            }
        }
    }

    async fn delete_appointment(&self, id: &str) -> Result<bool, AppError> {
        let mirrored = self.mirror.delete_appointment(id).await?;
        match self.primary.delete_appointment(id).await {
            Ok(existed) => Ok(existed),
            Err(e) => {
                self.degrade("delete_appointment", &e);
                Ok(mirrored)
            }
        }
    }
}
