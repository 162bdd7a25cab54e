use super::csv::request_reader::RequestReader;
use super::request::{ProductFields, Request};
use crate::application::CartUpdate;
use crate::application::storefront::Storefront;
use crate::domain::account::{AdminSession, CustomerSession};
use crate::domain::catalog::ProductDraft;
use crate::error::{Result, StoreError};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};

/// How many script rows succeeded and failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Replays a request script against a [`Storefront`].
///
/// Each request either succeeds with a short confirmation or fails with a
/// user-facing message. Failures never stop the run. Customer and admin
/// sessions live in separate maps keyed by username, so the same name can be
/// logged in once in each role.
pub struct ScriptRunner {
    storefront: Storefront,
    customers: HashMap<String, CustomerSession>,
    admins: HashMap<String, AdminSession>,
}

impl ScriptRunner {
    pub fn new(storefront: Storefront) -> Self {
        Self {
            storefront,
            customers: HashMap::new(),
            admins: HashMap::new(),
        }
    }

    pub fn customer_session(&self, user: &str) -> Option<&CustomerSession> {
        self.customers.get(user)
    }

    pub fn admin_session(&self, user: &str) -> Option<&AdminSession> {
        self.admins.get(user)
    }

    pub async fn run<R: Read>(&mut self, reader: RequestReader<R>) -> RunSummary {
        let mut summary = RunSummary::default();
        for (index, record) in reader.requests().enumerate() {
            let row = index + 1;
            let outcome = match record.and_then(Request::try_from) {
                Ok(request) => self.handle(request).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(message) => {
                    summary.succeeded += 1;
                    info!(row, "{message}");
                }
                Err(e) => {
                    summary.failed += 1;
                    if e.is_user_facing() {
                        warn!(row, "{}", e.user_message());
                    } else {
                        error!(row, error = %e, "{}", e.user_message());
                    }
                }
            }
        }
        summary
    }

    fn customer(&self, user: &str) -> Result<&CustomerSession> {
        self.customer_session(user).ok_or(StoreError::Unauthorized)
    }

    fn admin(&self, user: &str) -> Result<&AdminSession> {
        self.admin_session(user).ok_or(StoreError::Unauthorized)
    }

    /// Copies an image into the upload directory, returning the stored name.
    async fn store_image(&self, source: Option<String>) -> Result<Option<String>> {
        match source {
            Some(source) => {
                let uploads = self.storefront.catalog.uploads();
                Ok(Some(uploads.import(Path::new(&source)).await?))
            }
            None => Ok(None),
        }
    }

    /// Removes an image stored by a request that then failed.
    async fn discard_image(&self, stored: Option<String>) {
        if let Some(name) = stored
            && let Err(e) = self.storefront.catalog.uploads().remove(&name).await
        {
            warn!(file = %name, error = %e, "failed to remove uploaded image");
        }
    }

    /// Executes one request, returning the confirmation shown to its user.
    pub async fn handle(&mut self, request: Request) -> Result<String> {
        let shop = &self.storefront;
        match request {
            Request::Register { username, password } => {
                let customer = shop.accounts.register_customer(&username, &password).await?;
                Ok(format!("Account created for {}. Please log in.", customer.username))
            }
            Request::Login { username, password } => {
                let session = shop.accounts.login_customer(&username, &password).await?;
                let name = session.username().to_string();
                self.customers.insert(name.clone(), session);
                Ok(format!("Welcome back, {name}!"))
            }
            Request::AdminLogin { username, password } => {
                let session = shop.accounts.login_admin(&username, &password).await?;
                let name = session.username().to_string();
                self.admins.insert(name.clone(), session);
                Ok(format!("Logged in as administrator {name}."))
            }
            Request::Logout { user } => {
                let customer = self.customers.remove(&user);
                let admin = self.admins.remove(&user);
                if customer.is_none() && admin.is_none() {
                    return Err(StoreError::Unauthorized);
                }
                Ok(format!("{user} logged out."))
            }
            Request::CreateAdmin { user, username, password } => {
                let admin = shop
                    .accounts
                    .create_admin(self.admin(&user)?, &username, &password)
                    .await?;
                Ok(format!("Administrator {} created.", admin.username))
            }
            Request::DeleteAdmin { user, admin_id } => {
                shop.accounts.delete_admin(self.admin(&user)?, admin_id).await?;
                Ok(format!("Administrator {admin_id} deleted."))
            }
            Request::DeleteCustomer { user, customer_id } => {
                shop.accounts
                    .delete_customer(self.admin(&user)?, customer_id)
                    .await?;
                Ok(format!("Customer {customer_id} deleted."))
            }
            Request::CreateCategory { user, name } => {
                let category = shop.catalog.create_category(self.admin(&user)?, &name).await?;
                Ok(format!("Category '{}' created with id {}.", category.name, category.id))
            }
            Request::RenameCategory { user, category_id, name } => {
                let category = shop
                    .catalog
                    .rename_category(self.admin(&user)?, category_id, &name)
                    .await?;
                Ok(format!("Category {} renamed to '{}'.", category.id, category.name))
            }
            Request::DeleteCategory { user, category_id } => {
                shop.catalog.delete_category(self.admin(&user)?, category_id).await?;
                Ok(format!("Category {category_id} deleted."))
            }
            Request::CreateProduct { user, fields, image } => {
                let session = self.admin(&user)?;
                shop.accounts.authorize(session).await?;
                let stored = self.store_image(image).await?;
                let mut draft = draft_from(fields);
                if let Some(name) = &stored {
                    draft = draft.with_image(name);
                }
                match shop.catalog.create_product(session, draft).await {
                    Ok(product) => {
                        Ok(format!("Product '{}' created with id {}.", product.name, product.id))
                    }
                    Err(e) => {
                        self.discard_image(stored).await;
                        Err(e)
                    }
                }
            }
            Request::EditProduct { user, product_id, fields, image } => {
                let session = self.admin(&user)?;
                shop.accounts.authorize(session).await?;
                let existing = shop.catalog.lookup_product(product_id).await?;
                let stored = self.store_image(image).await?;
                let mut draft = draft_from(fields);
                if let Some(name) = stored.as_ref().or(existing.image_path.as_ref()) {
                    draft = draft.with_image(name);
                }
                match shop.catalog.edit_product(session, product_id, draft).await {
                    Ok(product) => Ok(format!("Product {} updated.", product.id)),
                    Err(e) => {
                        self.discard_image(stored).await;
                        Err(e)
                    }
                }
            }
            Request::DeleteProduct { user, product_id } => {
                shop.catalog.delete_product(self.admin(&user)?, product_id).await?;
                Ok(format!("Product {product_id} deleted."))
            }
            Request::AddToCart { user, product_id, quantity } => {
                let session = self.customer(&user)?;
                let item = shop.cart.add_item(session, product_id, quantity).await?;
                let product = shop.catalog.lookup_product(product_id).await?;
                Ok(format!(
                    "{} added to cart ({} in cart).",
                    product.name,
                    item.quantity.value()
                ))
            }
            Request::UpdateCart { user, item_id, quantity } => {
                let session = self.customer(&user)?;
                match shop.cart.update_item_quantity(session, item_id, quantity).await? {
                    CartUpdate::Updated(item) => {
                        Ok(format!("Cart updated: quantity now {}.", item.quantity.value()))
                    }
                    CartUpdate::Removed => Ok("Item removed from cart.".to_string()),
                }
            }
            Request::RemoveFromCart { user, item_id } => {
                shop.cart.remove_item(self.customer(&user)?, item_id).await?;
                Ok("Item removed from cart.".to_string())
            }
            Request::Checkout { user, address, phone_number } => {
                let session = self.customer(&user)?;
                let orders = shop.checkout.checkout(session, &address, &phone_number).await?;
                Ok(format!("Order placed successfully! ({} lines)", orders.len()))
            }
        }
    }
}

fn draft_from(fields: ProductFields) -> ProductDraft {
    let mut draft = ProductDraft::new(fields.name, fields.price);
    if let Some(category_id) = fields.category_id {
        draft = draft.in_category(category_id);
    }
    if let Some(description) = fields.description {
        draft = draft.with_description(description);
    }
    draft
}
