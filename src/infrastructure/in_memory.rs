use crate::domain::account::{Admin, Customer};
use crate::domain::cart::{Cart, CartItem, Quantity};
use crate::domain::catalog::{Category, Product, ProductDraft};
use crate::domain::ids::{AdminId, CartId, CartItemId, CategoryId, CustomerId, OrderId, ProductId};
use crate::domain::order::{NewOrder, Order};
use crate::domain::ports::{AccountStore, CartStore, CatalogStore, OrderStore};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Row storage plus the id sequence shared by every table.
#[derive(Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    admins: BTreeMap<AdminId, Admin>,
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    /// Keyed by owner, which makes a second cart per customer unrepresentable.
    carts: BTreeMap<CustomerId, Cart>,
    cart_items: BTreeMap<CartItemId, CartItem>,
    orders: BTreeMap<OrderId, Order>,
    sequence: u32,
}

impl Tables {
    /// Ids come from one shared sequence, so they also reflect insertion order.
    fn next_id(&mut self) -> u32 {
        self.sequence += 1;
        self.sequence
    }

    fn items_in(&self, cart_id: CartId) -> impl Iterator<Item = &CartItem> {
        self.cart_items
            .values()
            .filter(move |item| item.cart_id == cart_id)
    }

    fn check_category(&self, category_id: Option<CategoryId>) -> Result<()> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(StoreError::CategoryNotFound(id)),
            _ => Ok(()),
        }
    }
}

/// A thread-safe in-memory backend for every storefront port.
///
/// All tables live behind one `RwLock`, so each multi-row operation (cart
/// lookup-or-create, line increment-or-insert, checkout) is serialized and
/// atomic. Ideal for testing or single-process runs where persistence is not
/// required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_category(&self, name: &str) -> Result<Category> {
        let mut tables = self.tables.write().await;
        if tables.categories.values().any(|c| c.name == name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        let category = Category {
            id: CategoryId(tables.next_id()),
            name: name.to_string(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.name == name && c.id != id)
        {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(StoreError::CategoryNotFound(id))?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&id) {
            return Err(StoreError::CategoryNotFound(id));
        }
        if tables
            .products
            .values()
            .any(|p| p.category_id == Some(id))
        {
            return Err(StoreError::InUse(
                "Category cannot be deleted as it has associated products.".to_string(),
            ));
        }
        tables.categories.remove(&id);
        Ok(())
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.get(&id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().cloned().collect())
    }

    async fn insert_product(&self, draft: ProductDraft) -> Result<Product> {
        let mut tables = self.tables.write().await;
        tables.check_category(draft.category_id)?;
        let product = draft.into_product(ProductId(tables.next_id()));
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product> {
        let mut tables = self.tables.write().await;
        tables.check_category(draft.category_id)?;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;
        *product = draft.into_product(id);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<Product> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&id) {
            return Err(StoreError::ProductNotFound(id));
        }
        if tables.orders.values().any(|o| o.product_id == id) {
            return Err(StoreError::InUse(
                "Product cannot be deleted as it has been ordered.".to_string(),
            ));
        }
        tables.cart_items.retain(|_, item| item.product_id != id);
        tables
            .products
            .remove(&id)
            .ok_or(StoreError::ProductNotFound(id))
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn products_in_category(&self, id: CategoryId) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.category_id == Some(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn insert_customer(&self, username: &str, password_hash: String) -> Result<Customer> {
        let mut tables = self.tables.write().await;
        if tables.customers.values().any(|c| c.username == username) {
            return Err(StoreError::DuplicateName(username.to_string()));
        }
        let customer = Customer {
            id: CustomerId(tables.next_id()),
            username: username.to_string(),
            password_hash,
        };
        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn customer_by_username(&self, username: &str) -> Result<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.username == username)
            .cloned())
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.values().cloned().collect())
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&id) {
            return Err(StoreError::CustomerNotFound(id));
        }
        if tables.orders.values().any(|o| o.customer_id == id) {
            return Err(StoreError::InUse(
                "Customer cannot be deleted as they have placed orders.".to_string(),
            ));
        }
        if let Some(cart) = tables.carts.remove(&id) {
            tables.cart_items.retain(|_, item| item.cart_id != cart.id);
        }
        tables.customers.remove(&id);
        Ok(())
    }

    async fn insert_admin(&self, username: &str, password_hash: String) -> Result<Admin> {
        let mut tables = self.tables.write().await;
        if tables.admins.values().any(|a| a.username == username) {
            return Err(StoreError::DuplicateName(username.to_string()));
        }
        let admin = Admin {
            id: AdminId(tables.next_id()),
            username: username.to_string(),
            password_hash,
        };
        tables.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let tables = self.tables.read().await;
        Ok(tables
            .admins
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn admins(&self) -> Result<Vec<Admin>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.values().cloned().collect())
    }

    async fn delete_admin(&self, id: AdminId) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .admins
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::AdminNotFound(id))
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn cart_for(&self, customer_id: CustomerId) -> Result<Option<Cart>> {
        let tables = self.tables.read().await;
        Ok(tables.carts.get(&customer_id).copied())
    }

    async fn get_or_create_cart(&self, customer_id: CustomerId) -> Result<Cart> {
        let mut tables = self.tables.write().await;
        if let Some(cart) = tables.carts.get(&customer_id) {
            return Ok(*cart);
        }
        if !tables.customers.contains_key(&customer_id) {
            return Err(StoreError::CustomerNotFound(customer_id));
        }
        let cart = Cart {
            id: CartId(tables.next_id()),
            customer_id,
        };
        tables.carts.insert(customer_id, cart);
        Ok(cart)
    }

    async fn add_item(
        &self,
        cart_id: CartId,
        product: &Product,
        quantity: Quantity,
    ) -> Result<CartItem> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&product.id) {
            return Err(StoreError::ProductNotFound(product.id));
        }
        let existing = tables
            .items_in(cart_id)
            .find(|item| item.product_id == product.id)
            .map(|item| item.id);

        if let Some(item_id) = existing
            && let Some(item) = tables.cart_items.get_mut(&item_id)
        {
            item.quantity = item.quantity.checked_add(quantity)?;
            return Ok(item.clone());
        }

        let item = CartItem {
            id: CartItemId(tables.next_id()),
            cart_id,
            product_id: product.id,
            quantity,
            unit_price: product.price,
        };
        tables.cart_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn cart_item(&self, cart_id: CartId, item_id: CartItemId) -> Result<Option<CartItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_items
            .get(&item_id)
            .filter(|item| item.cart_id == cart_id)
            .cloned())
    }

    async fn set_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem> {
        let mut tables = self.tables.write().await;
        let item = tables
            .cart_items
            .get_mut(&item_id)
            .filter(|item| item.cart_id == cart_id)
            .ok_or(StoreError::CartItemNotFound(item_id))?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    async fn remove_item(&self, cart_id: CartId, item_id: CartItemId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .cart_items
            .get(&item_id)
            .is_some_and(|item| item.cart_id == cart_id);
        if !owned {
            return Err(StoreError::CartItemNotFound(item_id));
        }
        tables.cart_items.remove(&item_id);
        Ok(())
    }

    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let tables = self.tables.read().await;
        Ok(tables.items_in(cart_id).cloned().collect())
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_items.len();
        tables.cart_items.retain(|_, item| item.cart_id != cart_id);
        Ok(before - tables.cart_items.len())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn commit_checkout(
        &self,
        cart_id: CartId,
        snapshot: &[CartItem],
        orders: Vec<NewOrder>,
    ) -> Result<Vec<Order>> {
        let mut tables = self.tables.write().await;
        let current: Vec<&CartItem> = tables.items_in(cart_id).collect();
        if current.len() != snapshot.len() || current.iter().zip(snapshot).any(|(a, b)| *a != b) {
            return Err(StoreError::CartChanged);
        }

        let placed: Vec<Order> = orders
            .into_iter()
            .map(|order| order.with_id(OrderId(tables.next_id())))
            .collect();
        for order in &placed {
            tables.orders.insert(order.id, order.clone());
        }
        tables.cart_items.retain(|_, item| item.cart_id != cart_id);
        Ok(placed)
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn orders(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.values().cloned().collect())
    }
}
