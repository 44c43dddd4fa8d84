use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::Store;
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentPatch, Customer, CustomerPatch};

#[derive(Default)]
struct Collections {
    customers: Vec<Customer>,
    appointments: Vec<Appointment>,
}

/// Process-lifetime store. Everything is gone on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn upsert_customer(&self, customer: Customer) {
        let mut data = self.lock();
        match data.customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer,
            None => data.customers.push(customer),
        }
    }

    pub fn upsert_appointment(&self, appointment: Appointment) {
        let mut data = self.lock();
        match data.appointments.iter_mut().find(|a| a.id == appointment.id) {
            Some(existing) => *existing = appointment,
            None => data.appointments.push(appointment),
        }
    }

    pub fn replace_customers(&self, customers: Vec<Customer>) {
        self.lock().customers = customers;
    }

    pub fn replace_appointments(&self, appointments: Vec<Appointment>) {
        self.lock().appointments = appointments;
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.lock().customers.clone())
    }

    async fn get_customer_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        Ok(self.lock().customers.iter().find(|c| c.id == id).cloned())
    }

    async fn get_customer_by_name(&self, name: &str) -> Result<Option<Customer>, AppError> {
        Ok(self.lock().customers.iter().find(|c| c.name == name).cloned())
    }

    async fn create_customer(&self, customer: &Customer) -> Result<(), AppError> {
        self.lock().customers.push(customer.clone());
        Ok(())
    }

    async fn update_customer(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, AppError> {
        let mut data = self.lock();
        Ok(data.customers.iter_mut().find(|c| c.id == id).map(|c| {
            patch.apply(c);
            c.clone()
        }))
    }

    async fn delete_customer(&self, id: &str) -> Result<bool, AppError> {
        let mut data = self.lock();
        let before = data.customers.len();
        data.customers.retain(|c| c.id != id);
        Ok(data.customers.len() != before)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        let mut appointments = self.lock().appointments.clone();
        appointments.sort_by_key(|a| (a.date, a.time));
        Ok(appointments)
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AppError> {
        Ok(self.lock().appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<(), AppError> {
        self.lock().appointments.push(appointment.clone());
        Ok(())
    }

    async fn update_appointment(
        &self,
        id: &str,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, AppError> {
        let mut data = self.lock();
        Ok(data.appointments.iter_mut().find(|a| a.id == id).map(|a| {
            patch.apply(a);
            a.clone()
        }))
    }

    async fn delete_appointment(&self, id: &str) -> Result<bool, AppError> {
        let mut data = self.lock();
        let before = data.appointments.len();
        data.appointments.retain(|a| a.id != id);
        Ok(data.appointments.len() != before)
    }
}
