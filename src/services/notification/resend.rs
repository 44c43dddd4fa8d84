use anyhow::Context;
use async_trait::async_trait;

use super::{EmailSender, OutgoingEmail};

/// Sends mail through the Resend HTTP API.
pub struct ResendEmailSender {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ResendEmailSender {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            api_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .context("failed to reach email API")?
            .error_for_status()
            .context("email API returned error")?;

        Ok(())
    }
}
