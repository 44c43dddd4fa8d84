use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{non_blank, Customer, CustomerPatch};
use crate::store::Store;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterAction {
    Created,
    Updated,
}

/// Customer records. Names are unique: registering a known name updates
/// that customer instead of creating a second one.
pub struct CustomerService {
    store: Arc<dyn Store>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.store.list_customers().await
    }

    pub async fn get(&self, id: &str) -> Result<Customer, AppError> {
        self.store
            .get_customer_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("customer {id}")))
    }

    pub async fn by_name(&self, name: &str) -> Result<Customer, AppError> {
        self.store
            .get_customer_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("customer '{name}'")))
    }

    pub async fn register(
        &self,
        input: CustomerInput,
    ) -> Result<(Customer, RegisterAction), AppError> {
        let name = non_blank(input.name.map(|n| n.trim().to_string()))
            .ok_or_else(|| AppError::validation("name is required"))?;
        let email = non_blank(input.email);
        let phone = non_blank(input.phone);

        if let Some(existing) = self.store.get_customer_by_name(&name).await? {
            // Only contact fields that were sent overwrite the stored ones.
            let patch = CustomerPatch {
                name: None,
                email: email.map(Some),
                phone: phone.map(Some),
            };
            let updated = self
                .store
                .update_customer(&existing.id, &patch)
                .await?
                .ok_or_else(|| AppError::not_found(format!("customer {}", existing.id)))?;
            tracing::info!(customer_id = %updated.id, name = %updated.name, "customer updated by name");
            return Ok((updated, RegisterAction::Updated));
        }

        let customer = Customer {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            phone,
        };
        self.store.create_customer(&customer).await?;
        tracing::info!(customer_id = %customer.id, name = %customer.name, "customer created");
        Ok((customer, RegisterAction::Created))
    }

    pub async fn update(&self, id: &str, input: CustomerInput) -> Result<Customer, AppError> {
        let current = self.get(id).await?;

        let name = match input.name {
            Some(n) => Some(
                non_blank(Some(n.trim().to_string()))
                    .ok_or_else(|| AppError::validation("name cannot be blank"))?,
            ),
            None => None,
        };

        if let Some(new_name) = name.as_deref().filter(|n| *n != current.name) {
            if let Some(other) = self.store.get_customer_by_name(new_name).await? {
                if other.id != current.id {
                    return Err(AppError::validation(format!(
                        "a customer named '{new_name}' already exists"
                    )));
                }
            }
        }

        let patch = CustomerPatch {
            name,
            email: input.email.map(|e| non_blank(Some(e))),
            phone: input.phone.map(|p| non_blank(Some(p))),
        };
        if patch.is_empty() {
            return Ok(current);
        }

        self.store
            .update_customer(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("customer {id}")))
    }

    /// Removes the customer record only; their appointments stay.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.store.delete_customer(id).await? {
            tracing::info!(customer_id = %id, "customer deleted");
            Ok(())
        } else {
            Err(AppError::not_found(format!("customer {id}")))
        }
    }
}
