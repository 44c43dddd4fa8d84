use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    /// SQLite path. Unset means in-memory storage only.
    pub database_url: Option<String>,
    pub admin_token: String,
    /// Transactional email API key. Unset (or "demo") disables sending.
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub from_email: String,
    pub studio_name: String,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            resend_api_key: env::var("RESEND_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty() && v != "demo"),
            resend_api_url: env::var("RESEND_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
            from_email: env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@studiobook.local".to_string()),
            studio_name: env::var("STUDIO_NAME").unwrap_or_else(|_| "Studio".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}
