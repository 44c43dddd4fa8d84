use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rusqlite::Connection;

use super::Store;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentPatch, Customer, CustomerPatch};

/// Durable store backed by a single SQLite connection.
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(queries::list_customers(&self.conn())?)
    }

    async fn get_customer_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        Ok(queries::get_customer_by_id(&self.conn(), id)?)
    }

    async fn get_customer_by_name(&self, name: &str) -> Result<Option<Customer>, AppError> {
        Ok(queries::get_customer_by_name(&self.conn(), name)?)
    }

    async fn create_customer(&self, customer: &Customer) -> Result<(), AppError> {
        Ok(queries::insert_customer(&self.conn(), customer)?)
    }

    async fn update_customer(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, AppError> {
        Ok(queries::update_customer(&self.conn(), id, patch)?)
    }

    async fn delete_customer(&self, id: &str) -> Result<bool, AppError> {
        Ok(queries::delete_customer(&self.conn(), id)?)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        Ok(queries::list_appointments(&self.conn())?)
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AppError> {
        Ok(queries::get_appointment(&self.conn(), id)?)
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<(), AppError> {
        Ok(queries::insert_appointment(&self.conn(), appointment)?)
    }

    async fn update_appointment(
        &self,
        id: &str,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, AppError> {
        Ok(queries::update_appointment(&self.conn(), id, patch)?)
    }

    async fn delete_appointment(&self, id: &str) -> Result<bool, AppError> {
        Ok(queries::delete_appointment(&self.conn(), id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{AppointmentStatus, SlotTime};
    use chrono::{NaiveDate, Utc};

    fn store() -> SqliteStore {
        let conn = db::init_db(":memory:").unwrap();
        SqliteStore::new(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_create_then_list_round_trip() {
        let store = store();
        let appt = Appointment {
            id: "a1".to_string(),
            customer_id: "c1".to_string(),
            customer_name: "Anna".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            time: SlotTime::parse("14:00").unwrap(),
            comment: "almond shape".to_string(),
            image_url: Some("data:image/jpeg;base64,AAAA".to_string()),
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
            seen_by_admin: false,
            confirmed_by_customer: false,
        };
        store.create_appointment(&appt).await.unwrap();

        let all = store.list_appointments().await.unwrap();
        assert_eq!(all.len(), 1);
        let stored = &all[0];
        assert_eq!(stored.customer_name, "Anna");
        assert_eq!(stored.image_url, appt.image_url);
        assert_eq!(stored.created_at.timestamp(), appt.created_at.timestamp());
        assert_eq!(store.backend(), "sqlite");
    }
}
