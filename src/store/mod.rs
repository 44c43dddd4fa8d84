pub mod fallback;
pub mod memory;
pub mod sqlite;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::db;
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentPatch, Customer, CustomerPatch};

pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence for customers and appointments.
///
/// Records are created with their ids already assigned. `update_*` returns
/// `None` for unknown ids and `delete_*` reports whether a record existed.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name of the backing tier, for health output and logs.
    fn backend(&self) -> &'static str;

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;
    async fn get_customer_by_id(&self, id: &str) -> Result<Option<Customer>, AppError>;
    async fn get_customer_by_name(&self, name: &str) -> Result<Option<Customer>, AppError>;
    async fn create_customer(&self, customer: &Customer) -> Result<(), AppError>;
    async fn update_customer(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, AppError>;
    async fn delete_customer(&self, id: &str) -> Result<bool, AppError>;

    /// All appointments, ordered by date then time.
    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError>;
    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AppError>;
    async fn create_appointment(&self, appointment: &Appointment) -> Result<(), AppError>;
    async fn update_appointment(
        &self,
        id: &str,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, AppError>;
    async fn delete_appointment(&self, id: &str) -> Result<bool, AppError>;
}

/// Picks the storage tier from configuration. Without a database the
/// in-process store is the only store and data lives as long as the process.
pub fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.database_url.as_deref() {
        Some(url) => {
            let conn = db::init_db(url)?;
            tracing::info!(database = %url, "using sqlite store with in-memory fallback");
            let primary: Arc<dyn Store> = Arc::new(SqliteStore::new(Arc::new(Mutex::new(conn))));
            Ok(Arc::new(FallbackStore::new(primary)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data is kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
