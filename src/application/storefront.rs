use super::{AccountService, CartEngine, CatalogService, CheckoutOrchestrator};
use crate::domain::credentials::CredentialHasher;
use crate::domain::ports::StorageHandle;
use crate::infrastructure::uploads::UploadDir;
use std::sync::Arc;

/// Every storefront service, sharing one storage backend.
#[derive(Clone)]
pub struct Storefront {
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub cart: CartEngine,
    pub checkout: CheckoutOrchestrator,
}

impl Storefront {
    pub fn new(
        storage: StorageHandle,
        hasher: Arc<dyn CredentialHasher>,
        uploads: UploadDir,
    ) -> Self {
        let cart = CartEngine::new(Arc::clone(&storage));
        Self {
            accounts: AccountService::new(Arc::clone(&storage), hasher),
            catalog: CatalogService::new(Arc::clone(&storage), uploads),
            checkout: CheckoutOrchestrator::new(storage, cart.clone()),
            cart,
        }
    }
}
