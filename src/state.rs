use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::customers::CustomerService;
use crate::services::lifecycle::AppointmentService;
use crate::services::notification::NotificationDispatcher;
use crate::store::Store;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn Store>,
    pub appointments: AppointmentService,
    pub customers: CustomerService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            appointments: AppointmentService::new(Arc::clone(&store), notifier),
            customers: CustomerService::new(Arc::clone(&store)),
            config,
            store,
        }
    }
}
