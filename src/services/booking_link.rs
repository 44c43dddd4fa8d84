use serde::Serialize;

/// Shareable links for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLinks {
    pub booking_url: String,
    pub customer_page_url: String,
}

impl CustomerLinks {
    pub fn for_name(base_url: &str, name: &str) -> Self {
        Self {
            booking_url: booking_url(base_url, name),
            customer_page_url: customer_page_url(base_url, name),
        }
    }
}

pub fn booking_url(base_url: &str, name: &str) -> String {
    link(base_url, "book", name)
}

pub fn customer_page_url(base_url: &str, name: &str) -> String {
    link(base_url, "customer", name)
}

fn link(base_url: &str, section: &str, name: &str) -> String {
    format!(
        "{}/{section}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(name)
    )
}
