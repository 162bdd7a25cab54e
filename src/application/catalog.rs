use super::accounts::authorize_admin;
use crate::domain::account::AdminSession;
use crate::domain::catalog::{Category, Product, ProductDraft, validate_name};
use crate::domain::ids::{CategoryId, ProductId};
use crate::domain::ports::{CatalogStore, StorageHandle};
use crate::error::{Result, StoreError};
use crate::infrastructure::uploads::UploadDir;
use tracing::{info, warn};

/// Read access to the catalog for shoppers, and its administration.
#[derive(Clone)]
pub struct CatalogService {
    storage: StorageHandle,
    uploads: UploadDir,
}

impl CatalogService {
    pub fn new(storage: StorageHandle, uploads: UploadDir) -> Self {
        Self { storage, uploads }
    }

    pub fn uploads(&self) -> &UploadDir {
        &self.uploads
    }

    pub async fn lookup_product(&self, id: ProductId) -> Result<Product> {
        self.storage
            .product(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))
    }

    pub async fn products(&self) -> Result<Vec<Product>> {
        self.storage.products().await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.storage.categories().await
    }

    pub async fn products_by_category(&self, id: CategoryId) -> Result<Vec<Product>> {
        if self.storage.category(id).await?.is_none() {
            return Err(StoreError::CategoryNotFound(id));
        }
        self.storage.products_in_category(id).await
    }

    /// Case-insensitive substring search over product name, description and
    /// category name. An empty query matches every product.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        let categories = self.storage.categories().await?;
        let products = self.storage.products().await?;

        let category_matches = |id: Option<CategoryId>| {
            id.and_then(|id| categories.iter().find(|c| c.id == id))
                .is_some_and(|c| c.name.to_lowercase().contains(&needle))
        };

        Ok(products
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || category_matches(p.category_id)
            })
            .collect())
    }

    pub async fn create_category(&self, session: &AdminSession, name: &str) -> Result<Category> {
        authorize_admin(&self.storage, session).await?;
        let name = validate_name("Category name", name)?;
        let category = self.storage.insert_category(&name).await?;
        info!(category = %category.id, name = %category.name, "created category");
        Ok(category)
    }

    pub async fn rename_category(
        &self,
        session: &AdminSession,
        id: CategoryId,
        name: &str,
    ) -> Result<Category> {
        authorize_admin(&self.storage, session).await?;
        let name = validate_name("Category name", name)?;
        self.storage.rename_category(id, &name).await
    }

    /// Refused while any product still belongs to the category.
    pub async fn delete_category(&self, session: &AdminSession, id: CategoryId) -> Result<()> {
        authorize_admin(&self.storage, session).await?;
        self.storage.delete_category(id).await?;
        info!(category = %id, "deleted category");
        Ok(())
    }

    pub async fn create_product(
        &self,
        session: &AdminSession,
        draft: ProductDraft,
    ) -> Result<Product> {
        authorize_admin(&self.storage, session).await?;
        let draft = ProductDraft {
            name: validate_name("Product name", &draft.name)?,
            ..draft
        };
        let product = self.storage.insert_product(draft).await?;
        info!(
            product = %product.id,
            name = %product.name,
            price = %product.price.value(),
            "created product"
        );
        Ok(product)
    }

    /// Replaces a product's editable fields. Cart lines keep the price they
    /// were added at. A replaced image file is removed.
    pub async fn edit_product(
        &self,
        session: &AdminSession,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product> {
        authorize_admin(&self.storage, session).await?;
        let previous = self.lookup_product(id).await?;
        let draft = ProductDraft {
            name: validate_name("Product name", &draft.name)?,
            ..draft
        };
        let product = self.storage.update_product(id, draft).await?;

        if let Some(old) = previous.image_path
            && product.image_path.as_deref() != Some(old.as_str())
        {
            self.discard_image(&old).await;
        }
        info!(product = %product.id, "updated product");
        Ok(product)
    }

    pub async fn delete_product(&self, session: &AdminSession, id: ProductId) -> Result<()> {
        authorize_admin(&self.storage, session).await?;
        let product = self.storage.delete_product(id).await?;
        if let Some(image) = &product.image_path {
            self.discard_image(image).await;
        }
        info!(product = %id, "deleted product");
        Ok(())
    }

    /// The product row is already gone, so a failure here only leaves an orphaned file.
    async fn discard_image(&self, name: &str) {
        if let Err(e) = self.uploads.remove(name).await {
            warn!(file = %name, error = %e, "failed to remove product image");
        }
    }
}
