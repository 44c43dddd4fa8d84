use anyhow::Context as _;
use tera::{Context, Tera};

use crate::models::AppointmentStatus;

use super::StatusNotice;

const STATUS_EMAIL: &str = "status_email.html";

pub fn subject(notice: &StatusNotice) -> String {
    let emoji = notice.status.presentation().emoji;
    match notice.status {
        AppointmentStatus::Confirmed => format!(
            "{emoji} Appointment confirmed - {} at {}",
            notice.date, notice.time
        ),
        AppointmentStatus::Cancelled => format!(
            "{emoji} Appointment cancelled - {} at {}",
            notice.date, notice.time
        ),
        _ => format!("{emoji} Appointment not possible"),
    }
}

/// Compiled email templates. Values are HTML-escaped on render.
pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn load() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            STATUS_EMAIL,
            include_str!("../../../templates/status_email.html"),
        )
        .context("failed to load status email template")?;
        Ok(Self { tera })
    }

    pub fn status_body(&self, notice: &StatusNotice, studio_name: &str) -> anyhow::Result<String> {
        let presentation = notice.status.presentation();
        let comment = notice
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let mut context = Context::new();
        context.insert("studio", studio_name);
        context.insert("name", &notice.customer_name);
        context.insert("status", notice.status.as_str());
        context.insert("date", &notice.date.format("%A, %-d %B %Y").to_string());
        context.insert("time", &notice.time.to_string());
        context.insert("comment", &comment);
        context.insert("badge", presentation.badge);
        context.insert("emoji", presentation.emoji);
        context.insert("label", presentation.label);

        self.tera
            .render(STATUS_EMAIL, &context)
            .context("failed to render status email")
    }
}
