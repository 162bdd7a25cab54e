use super::ids::{AdminId, CustomerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub username: String,
    /// PHC-formatted digest, never the password itself.
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub password_hash: String,
}

/// Proof that a customer logged in.
///
/// Only obtainable from a successful login, and passed explicitly to every
/// cart and checkout operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSession {
    customer_id: CustomerId,
    username: String,
}

impl CustomerSession {
    pub(crate) fn new(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id,
            username: customer.username.clone(),
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Proof that an administrator logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    admin_id: AdminId,
    username: String,
}

impl AdminSession {
    pub(crate) fn new(admin: &Admin) -> Self {
        Self {
            admin_id: admin.id,
            username: admin.username.clone(),
        }
    }

    pub fn admin_id(&self) -> AdminId {
        self.admin_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
