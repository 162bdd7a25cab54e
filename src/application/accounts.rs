use crate::domain::account::{Admin, AdminSession, Customer, CustomerSession};
use crate::domain::catalog::validate_name;
use crate::domain::credentials::CredentialHasher;
use crate::domain::ids::{AdminId, CustomerId};
use crate::domain::ports::{AccountStore, StorageHandle};
use crate::error::{Result, StoreError};
use std::sync::Arc;
use tracing::{info, warn};

/// Registration, login, and administration of customer and admin accounts.
///
/// Passwords go through the configured [`CredentialHasher`] on a blocking
/// thread; the store only ever sees digests.
#[derive(Clone)]
pub struct AccountService {
    storage: StorageHandle,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountService {
    pub fn new(storage: StorageHandle, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { storage, hasher }
    }

    async fn hash(&self, password: &str) -> Result<String> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| StoreError::InternalError(Box::new(e)))?
    }

    async fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| StoreError::InternalError(Box::new(e)))?
    }

    pub async fn register_customer(&self, username: &str, password: &str) -> Result<Customer> {
        let username = validate_name("Username", username)?;
        if self.storage.customer_by_username(&username).await?.is_some() {
            return Err(StoreError::DuplicateName(username));
        }
        let digest = self.hash(password).await?;
        let customer = self.storage.insert_customer(&username, digest).await?;
        info!(customer = %customer.id, username = %customer.username, "registered customer");
        Ok(customer)
    }

    pub async fn login_customer(&self, username: &str, password: &str) -> Result<CustomerSession> {
        let customer = self
            .storage
            .customer_by_username(username.trim())
            .await?
            .ok_or(StoreError::InvalidCredentials)?;
        if self.verify(password, &customer.password_hash).await? {
            Ok(CustomerSession::new(&customer))
        } else {
            warn!(username = %customer.username, "customer login rejected");
            Err(StoreError::InvalidCredentials)
        }
    }

    pub async fn login_admin(&self, username: &str, password: &str) -> Result<AdminSession> {
        let admin = self
            .storage
            .admin_by_username(username.trim())
            .await?
            .ok_or(StoreError::InvalidCredentials)?;
        if self.verify(password, &admin.password_hash).await? {
            Ok(AdminSession::new(&admin))
        } else {
            warn!(username = %admin.username, "admin login rejected");
            Err(StoreError::InvalidCredentials)
        }
    }

    /// Creates the bootstrap admin unless an admin with that name already exists.
    pub async fn ensure_default_admin(&self, username: &str, password: &str) -> Result<Admin> {
        let username = validate_name("Username", username)?;
        if let Some(admin) = self.storage.admin_by_username(&username).await? {
            return Ok(admin);
        }
        let digest = self.hash(password).await?;
        let admin = self.storage.insert_admin(&username, digest).await?;
        info!(admin = %admin.id, username = %admin.username, "created default admin");
        Ok(admin)
    }

    /// Confirms the session still belongs to an existing admin.
    pub async fn authorize(&self, session: &AdminSession) -> Result<()> {
        authorize_admin(&self.storage, session).await
    }

    pub async fn create_admin(
        &self,
        session: &AdminSession,
        username: &str,
        password: &str,
    ) -> Result<Admin> {
        self.authorize(session).await?;
        let username = validate_name("Username", username)?;
        if self.storage.admin_by_username(&username).await?.is_some() {
            return Err(StoreError::DuplicateName(username));
        }
        let digest = self.hash(password).await?;
        let admin = self.storage.insert_admin(&username, digest).await?;
        info!(admin = %admin.id, by = %session.username(), "created admin");
        Ok(admin)
    }

    /// Deletes an admin. The first admin can never be deleted.
    pub async fn delete_admin(&self, session: &AdminSession, id: AdminId) -> Result<()> {
        self.authorize(session).await?;
        let admins = self.storage.admins().await?;
        if admins.first().is_some_and(|first| first.id == id) {
            return Err(StoreError::ProtectedAdmin);
        }
        self.storage.delete_admin(id).await?;
        info!(admin = %id, by = %session.username(), "deleted admin");
        Ok(())
    }

    pub async fn admins(&self, session: &AdminSession) -> Result<Vec<Admin>> {
        self.authorize(session).await?;
        self.storage.admins().await
    }

    pub async fn customers(&self, session: &AdminSession) -> Result<Vec<Customer>> {
        self.authorize(session).await?;
        self.storage.customers().await
    }

    pub async fn delete_customer(&self, session: &AdminSession, id: CustomerId) -> Result<()> {
        self.authorize(session).await?;
        self.storage.delete_customer(id).await?;
        info!(customer = %id, by = %session.username(), "deleted customer");
        Ok(())
    }
}

pub(crate) async fn authorize_admin(storage: &StorageHandle, session: &AdminSession) -> Result<()> {
    let admins = storage.admins().await?;
    if admins.iter().any(|admin| admin.id == session.admin_id()) {
        Ok(())
    } else {
        Err(StoreError::Unauthorized)
    }
}
