pub mod resend;
pub mod template;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{AppointmentStatus, SlotTime};

use template::EmailTemplates;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()>;
}

/// Everything the customer needs to know about a status change.
#[derive(Debug, Clone)]
pub struct StatusNotice {
    pub to: String,
    pub customer_name: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub status: AppointmentStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No sender configured; treated as success.
    Disabled,
}

/// Renders status-change emails and hands them to the configured sender.
/// At most one message per call, no retries.
pub struct NotificationDispatcher {
    sender: Option<Arc<dyn EmailSender>>,
    templates: EmailTemplates,
    from: String,
    studio_name: String,
}

impl NotificationDispatcher {
    pub fn new(
        sender: Option<Arc<dyn EmailSender>>,
        from: String,
        studio_name: String,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            sender,
            templates: EmailTemplates::load()?,
            from,
            studio_name,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    pub async fn dispatch(&self, notice: &StatusNotice) -> Result<Delivery, AppError> {
        if !notice.status.notifies_customer() {
            return Err(AppError::Notification(format!(
                "no email template for status '{}'",
                notice.status
            )));
        }

        let Some(sender) = &self.sender else {
            tracing::info!(status = %notice.status, "email sending not configured, notification skipped");
            return Ok(Delivery::Disabled);
        };

        let html = self
            .templates
            .status_body(notice, &self.studio_name)
            .map_err(|e| AppError::Notification(format!("{e:#}")))?;

        let email = OutgoingEmail {
            from: self.from.clone(),
            to: notice.to.clone(),
            subject: template::subject(notice),
            html,
        };

        sender
            .send(&email)
            .await
            .map_err(|e| AppError::Notification(format!("{e:#}")))?;

        tracing::info!(to = %notice.to, status = %notice.status, "status email sent");
        Ok(Delivery::Sent)
    }
}
