//! Shared fixtures for the application tests.

use super::storefront::Storefront;
use super::{AccountService, CartEngine, CatalogService, CheckoutOrchestrator};
use crate::domain::account::{AdminSession, CustomerSession};
use crate::domain::catalog::{Price, Product, ProductDraft};
use crate::domain::credentials::{Argon2Hasher, CredentialHasher, HashCost};
use crate::domain::ports::StorageHandle;
use crate::infrastructure::in_memory::InMemoryStore;
use crate::infrastructure::uploads::UploadDir;
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

pub fn memory_storage() -> StorageHandle {
    Arc::new(InMemoryStore::new())
}

pub fn cheap_hasher() -> Arc<dyn CredentialHasher> {
    Arc::new(
        Argon2Hasher::new(HashCost {
            memory_kib: 8,
            iterations: 1,
        })
        .unwrap(),
    )
}

pub struct Fixture {
    pub storage: StorageHandle,
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub cart: CartEngine,
    pub checkout: CheckoutOrchestrator,
    _uploads: TempDir,
}

impl Fixture {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let storage = memory_storage();
        let storefront = Storefront::new(
            Arc::clone(&storage),
            cheap_hasher(),
            UploadDir::new(uploads.path()),
        );
        storefront
            .accounts
            .ensure_default_admin("admin", "admin")
            .await
            .unwrap();

        Self {
            storage,
            accounts: storefront.accounts,
            catalog: storefront.catalog,
            cart: storefront.cart,
            checkout: storefront.checkout,
            _uploads: uploads,
        }
    }

    pub async fn admin(&self) -> AdminSession {
        self.accounts.login_admin("admin", "admin").await.unwrap()
    }

    pub async fn customer(&self, username: &str) -> CustomerSession {
        self.accounts
            .register_customer(username, "password")
            .await
            .unwrap();
        self.accounts
            .login_customer(username, "password")
            .await
            .unwrap()
    }

    pub async fn product(&self, name: &str, price: Decimal) -> Product {
        let admin = self.admin().await;
        self.catalog
            .create_product(&admin, ProductDraft::new(name, Price::new(price).unwrap()))
            .await
            .unwrap()
    }
}
