use super::account::{Admin, Customer};
use super::cart::{Cart, CartItem, Quantity};
use super::catalog::{Category, Product, ProductDraft};
use super::ids::{AdminId, CartId, CartItemId, CategoryId, CustomerId, ProductId};
use super::order::{NewOrder, Order};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fails with `DuplicateName` when the name is taken.
    async fn insert_category(&self, name: &str) -> Result<Category>;
    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category>;
    /// Refused with `InUse` while any product references the category.
    async fn delete_category(&self, id: CategoryId) -> Result<()>;
    async fn category(&self, id: CategoryId) -> Result<Option<Category>>;
    async fn categories(&self) -> Result<Vec<Category>>;

    async fn insert_product(&self, draft: ProductDraft) -> Result<Product>;
    async fn update_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product>;
    /// Removes the product and any cart lines holding it. Refused with `InUse`
    /// while an order references it.
    async fn delete_product(&self, id: ProductId) -> Result<Product>;
    async fn product(&self, id: ProductId) -> Result<Option<Product>>;
    async fn products(&self) -> Result<Vec<Product>>;
    async fn products_in_category(&self, id: CategoryId) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_customer(&self, username: &str, password_hash: String) -> Result<Customer>;
    async fn customer_by_username(&self, username: &str) -> Result<Option<Customer>>;
    async fn customers(&self) -> Result<Vec<Customer>>;
    /// Removes the customer with their cart. Refused with `InUse` while they have orders.
    async fn delete_customer(&self, id: CustomerId) -> Result<()>;

    async fn insert_admin(&self, username: &str, password_hash: String) -> Result<Admin>;
    async fn admin_by_username(&self, username: &str) -> Result<Option<Admin>>;
    /// Ordered by id, so the first entry is the bootstrap admin.
    async fn admins(&self) -> Result<Vec<Admin>>;
    async fn delete_admin(&self, id: AdminId) -> Result<()>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn cart_for(&self, customer_id: CustomerId) -> Result<Option<Cart>>;
    /// Returns the customer's cart, creating it if needed. Never creates a second cart.
    async fn get_or_create_cart(&self, customer_id: CustomerId) -> Result<Cart>;
    /// Increments the cart's line for `product` or inserts one priced at the
    /// product's current price, as a single atomic step.
    async fn add_item(&self, cart_id: CartId, product: &Product, quantity: Quantity)
    -> Result<CartItem>;
    async fn cart_item(&self, cart_id: CartId, item_id: CartItemId) -> Result<Option<CartItem>>;
    async fn set_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem>;
    async fn remove_item(&self, cart_id: CartId, item_id: CartItemId) -> Result<()>;
    /// Lines in insertion order.
    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>>;
    /// Returns the number of lines removed.
    async fn clear_cart(&self, cart_id: CartId) -> Result<usize>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists `orders` and empties the cart in one atomic write.
    ///
    /// Fails with `CartChanged`, writing nothing, unless the cart still holds
    /// exactly the `snapshot` lines.
    async fn commit_checkout(
        &self,
        cart_id: CartId,
        snapshot: &[CartItem],
        orders: Vec<NewOrder>,
    ) -> Result<Vec<Order>>;
    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;
    async fn orders(&self) -> Result<Vec<Order>>;
}

/// Everything the storefront needs from a backend.
pub trait Storage: CatalogStore + AccountStore + CartStore + OrderStore {}

impl<T> Storage for T where T: CatalogStore + AccountStore + CartStore + OrderStore {}

pub type StorageHandle = Arc<dyn Storage>;
