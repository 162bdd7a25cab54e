use crate::domain::account::{Admin, Customer};
use crate::domain::cart::{Cart, CartItem, Quantity};
use crate::domain::catalog::{Category, Product, ProductDraft};
use crate::domain::ids::{AdminId, CartId, CartItemId, CategoryId, CustomerId, OrderId, ProductId};
use crate::domain::order::{NewOrder, Order};
use crate::domain::ports::{AccountStore, CartStore, CatalogStore, OrderStore};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CF_CUSTOMERS: &str = "customers";
pub const CF_ADMINS: &str = "admins";
pub const CF_CATEGORIES: &str = "categories";
pub const CF_PRODUCTS: &str = "products";
/// Carts keyed by owning customer id.
pub const CF_CARTS: &str = "carts";
/// Cart lines keyed by cart id followed by item id.
pub const CF_CART_ITEMS: &str = "cart_items";
pub const CF_ORDERS: &str = "orders";
/// Bookkeeping such as the id sequence.
pub const CF_META: &str = "meta";

const COLUMN_FAMILIES: [&str; 8] = [
    CF_CUSTOMERS,
    CF_ADMINS,
    CF_CATEGORIES,
    CF_PRODUCTS,
    CF_CARTS,
    CF_CART_ITEMS,
    CF_ORDERS,
    CF_META,
];

const SEQUENCE_KEY: &[u8] = b"sequence";

fn item_key(cart_id: CartId, item_id: CartItemId) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&cart_id.to_be_bytes());
    key[4..].copy_from_slice(&item_id.to_be_bytes());
    key
}

/// A persistent store implementation using RocksDB.
///
/// Each table lives in its own Column Family, with big-endian id keys so
/// iteration follows insertion order. Every mutation is staged in a
/// `WriteBatch` and applied atomically while holding the writer lock, which
/// serializes read-check-write sequences such as cart creation and checkout.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating any
    /// missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }

    fn handle(&self, cf: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(cf)
            .ok_or_else(|| StoreError::internal(format!("Column family '{cf}' not found")))
    }

    fn get<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.handle(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        self.scan_prefix(cf, &[])
    }

    fn scan_prefix<T: DeserializeOwned>(&self, cf: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let iter = self.db.iterator_cf(
            self.handle(cf)?,
            IteratorMode::From(prefix, Direction::Forward),
        );

        let mut rows = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    fn put<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf: &str,
        key: &[u8],
        value: &T,
    ) -> Result<()> {
        batch.put_cf(self.handle(cf)?, key, serde_json::to_vec(value)?);
        Ok(())
    }

    fn delete(&self, batch: &mut WriteBatch, cf: &str, key: &[u8]) -> Result<()> {
        batch.delete_cf(self.handle(cf)?, key);
        Ok(())
    }

    /// Reserves `count` consecutive ids and records the new high-water mark in `batch`.
    ///
    /// Must be called with the writer lock held.
    fn reserve_ids(&self, batch: &mut WriteBatch, count: u32) -> Result<u32> {
        let current = match self.db.get_cf(self.handle(CF_META)?, SEQUENCE_KEY)? {
            Some(bytes) => {
                let raw: [u8; 4] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::internal("Corrupt id sequence"))?;
                u32::from_be_bytes(raw)
            }
            None => 0,
        };
        let last = current
            .checked_add(count)
            .ok_or_else(|| StoreError::internal("Id sequence exhausted"))?;
        batch.put_cf(self.handle(CF_META)?, SEQUENCE_KEY, last.to_be_bytes());
        Ok(current + 1)
    }

    fn next_id(&self, batch: &mut WriteBatch) -> Result<u32> {
        self.reserve_ids(batch, 1)
    }
}

#[async_trait]
impl CatalogStore for RocksDBStore {
    async fn insert_category(&self, name: &str) -> Result<Category> {
        let _guard = self.writer.lock().await;
        let existing: Vec<Category> = self.scan(CF_CATEGORIES)?;
        if existing.iter().any(|c| c.name == name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let mut batch = WriteBatch::default();
        let category = Category {
            id: CategoryId(self.next_id(&mut batch)?),
            name: name.to_string(),
        };
        self.put(&mut batch, CF_CATEGORIES, &category.id.to_be_bytes(), &category)?;
        self.db.write(batch)?;
        Ok(category)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category> {
        let _guard = self.writer.lock().await;
        let existing: Vec<Category> = self.scan(CF_CATEGORIES)?;
        if existing.iter().any(|c| c.name == name && c.id != id) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        let mut category = existing
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::CategoryNotFound(id))?;
        category.name = name.to_string();

        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_CATEGORIES, &id.to_be_bytes(), &category)?;
        self.db.write(batch)?;
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let _guard = self.writer.lock().await;
        if self
            .get::<Category>(CF_CATEGORIES, &id.to_be_bytes())?
            .is_none()
        {
            return Err(StoreError::CategoryNotFound(id));
        }
        let products: Vec<Product> = self.scan(CF_PRODUCTS)?;
        if products.iter().any(|p| p.category_id == Some(id)) {
            return Err(StoreError::InUse(
                "Category cannot be deleted as it has associated products.".to_string(),
            ));
        }

        let mut batch = WriteBatch::default();
        self.delete(&mut batch, CF_CATEGORIES, &id.to_be_bytes())?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        self.get(CF_CATEGORIES, &id.to_be_bytes())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.scan(CF_CATEGORIES)
    }

    async fn insert_product(&self, draft: ProductDraft) -> Result<Product> {
        let _guard = self.writer.lock().await;
        if let Some(category_id) = draft.category_id
            && self
                .get::<Category>(CF_CATEGORIES, &category_id.to_be_bytes())?
                .is_none()
        {
            return Err(StoreError::CategoryNotFound(category_id));
        }

        let mut batch = WriteBatch::default();
        let product = draft.into_product(ProductId(self.next_id(&mut batch)?));
        self.put(&mut batch, CF_PRODUCTS, &product.id.to_be_bytes(), &product)?;
        self.db.write(batch)?;
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product> {
        let _guard = self.writer.lock().await;
        if let Some(category_id) = draft.category_id
            && self
                .get::<Category>(CF_CATEGORIES, &category_id.to_be_bytes())?
                .is_none()
        {
            return Err(StoreError::CategoryNotFound(category_id));
        }
        if self.get::<Product>(CF_PRODUCTS, &id.to_be_bytes())?.is_none() {
            return Err(StoreError::ProductNotFound(id));
        }

        let product = draft.into_product(id);
        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_PRODUCTS, &id.to_be_bytes(), &product)?;
        self.db.write(batch)?;
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> Result<Product> {
        let _guard = self.writer.lock().await;
        let product: Product = self
            .get(CF_PRODUCTS, &id.to_be_bytes())?
            .ok_or(StoreError::ProductNotFound(id))?;
        let orders: Vec<Order> = self.scan(CF_ORDERS)?;
        if orders.iter().any(|o| o.product_id == id) {
            return Err(StoreError::InUse(
                "Product cannot be deleted as it has been ordered.".to_string(),
            ));
        }

        let mut batch = WriteBatch::default();
        let items: Vec<CartItem> = self.scan(CF_CART_ITEMS)?;
        for item in items.iter().filter(|item| item.product_id == id) {
            self.delete(&mut batch, CF_CART_ITEMS, &item_key(item.cart_id, item.id))?;
        }
        self.delete(&mut batch, CF_PRODUCTS, &id.to_be_bytes())?;
        self.db.write(batch)?;
        Ok(product)
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        self.get(CF_PRODUCTS, &id.to_be_bytes())
    }

    async fn products(&self) -> Result<Vec<Product>> {
        self.scan(CF_PRODUCTS)
    }

    async fn products_in_category(&self, id: CategoryId) -> Result<Vec<Product>> {
        let products: Vec<Product> = self.scan(CF_PRODUCTS)?;
        Ok(products
            .into_iter()
            .filter(|p| p.category_id == Some(id))
            .collect())
    }
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn insert_customer(&self, username: &str, password_hash: String) -> Result<Customer> {
        let _guard = self.writer.lock().await;
        let existing: Vec<Customer> = self.scan(CF_CUSTOMERS)?;
        if existing.iter().any(|c| c.username == username) {
            return Err(StoreError::DuplicateName(username.to_string()));
        }

        let mut batch = WriteBatch::default();
        let customer = Customer {
            id: CustomerId(self.next_id(&mut batch)?),
            username: username.to_string(),
            password_hash,
        };
        self.put(&mut batch, CF_CUSTOMERS, &customer.id.to_be_bytes(), &customer)?;
        self.db.write(batch)?;
        Ok(customer)
    }

    async fn customer_by_username(&self, username: &str) -> Result<Option<Customer>> {
        let customers: Vec<Customer> = self.scan(CF_CUSTOMERS)?;
        Ok(customers.into_iter().find(|c| c.username == username))
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        self.scan(CF_CUSTOMERS)
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let _guard = self.writer.lock().await;
        if self
            .get::<Customer>(CF_CUSTOMERS, &id.to_be_bytes())?
            .is_none()
        {
            return Err(StoreError::CustomerNotFound(id));
        }
        let orders: Vec<Order> = self.scan(CF_ORDERS)?;
        if orders.iter().any(|o| o.customer_id == id) {
            return Err(StoreError::InUse(
                "Customer cannot be deleted as they have placed orders.".to_string(),
            ));
        }

        let mut batch = WriteBatch::default();
        if let Some(cart) = self.get::<Cart>(CF_CARTS, &id.to_be_bytes())? {
            let items: Vec<CartItem> = self.scan_prefix(CF_CART_ITEMS, &cart.id.to_be_bytes())?;
            for item in &items {
                self.delete(&mut batch, CF_CART_ITEMS, &item_key(cart.id, item.id))?;
            }
            self.delete(&mut batch, CF_CARTS, &id.to_be_bytes())?;
        }
        self.delete(&mut batch, CF_CUSTOMERS, &id.to_be_bytes())?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn insert_admin(&self, username: &str, password_hash: String) -> Result<Admin> {
        let _guard = self.writer.lock().await;
        let existing: Vec<Admin> = self.scan(CF_ADMINS)?;
        if existing.iter().any(|a| a.username == username) {
            return Err(StoreError::DuplicateName(username.to_string()));
        }

        let mut batch = WriteBatch::default();
        let admin = Admin {
            id: AdminId(self.next_id(&mut batch)?),
            username: username.to_string(),
            password_hash,
        };
        self.put(&mut batch, CF_ADMINS, &admin.id.to_be_bytes(), &admin)?;
        self.db.write(batch)?;
        Ok(admin)
    }

    async fn admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let admins: Vec<Admin> = self.scan(CF_ADMINS)?;
        Ok(admins.into_iter().find(|a| a.username == username))
    }

    async fn admins(&self) -> Result<Vec<Admin>> {
        self.scan(CF_ADMINS)
    }

    async fn delete_admin(&self, id: AdminId) -> Result<()> {
        let _guard = self.writer.lock().await;
        if self.get::<Admin>(CF_ADMINS, &id.to_be_bytes())?.is_none() {
            return Err(StoreError::AdminNotFound(id));
        }
        let mut batch = WriteBatch::default();
        self.delete(&mut batch, CF_ADMINS, &id.to_be_bytes())?;
        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for RocksDBStore {
    async fn cart_for(&self, customer_id: CustomerId) -> Result<Option<Cart>> {
        self.get(CF_CARTS, &customer_id.to_be_bytes())
    }

    async fn get_or_create_cart(&self, customer_id: CustomerId) -> Result<Cart> {
        let _guard = self.writer.lock().await;
        if let Some(cart) = self.get(CF_CARTS, &customer_id.to_be_bytes())? {
            return Ok(cart);
        }
        if self
            .get::<Customer>(CF_CUSTOMERS, &customer_id.to_be_bytes())?
            .is_none()
        {
            return Err(StoreError::CustomerNotFound(customer_id));
        }

        let mut batch = WriteBatch::default();
        let cart = Cart {
            id: CartId(self.next_id(&mut batch)?),
            customer_id,
        };
        self.put(&mut batch, CF_CARTS, &customer_id.to_be_bytes(), &cart)?;
        self.db.write(batch)?;
        Ok(cart)
    }

    async fn add_item(
        &self,
        cart_id: CartId,
        product: &Product,
        quantity: Quantity,
    ) -> Result<CartItem> {
        let _guard = self.writer.lock().await;
        if self
            .get::<Product>(CF_PRODUCTS, &product.id.to_be_bytes())?
            .is_none()
        {
            return Err(StoreError::ProductNotFound(product.id));
        }
        let items: Vec<CartItem> = self.scan_prefix(CF_CART_ITEMS, &cart_id.to_be_bytes())?;

        let mut batch = WriteBatch::default();
        let item = match items.into_iter().find(|item| item.product_id == product.id) {
            Some(mut item) => {
                item.quantity = item.quantity.checked_add(quantity)?;
                item
            }
            None => CartItem {
                id: CartItemId(self.next_id(&mut batch)?),
                cart_id,
                product_id: product.id,
                quantity,
                unit_price: product.price,
            },
        };
        self.put(&mut batch, CF_CART_ITEMS, &item_key(cart_id, item.id), &item)?;
        self.db.write(batch)?;
        Ok(item)
    }

    async fn cart_item(&self, cart_id: CartId, item_id: CartItemId) -> Result<Option<CartItem>> {
        self.get(CF_CART_ITEMS, &item_key(cart_id, item_id))
    }

    async fn set_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem> {
        let _guard = self.writer.lock().await;
        let key = item_key(cart_id, item_id);
        let mut item: CartItem = self
            .get(CF_CART_ITEMS, &key)?
            .ok_or(StoreError::CartItemNotFound(item_id))?;
        item.quantity = quantity;

        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_CART_ITEMS, &key, &item)?;
        self.db.write(batch)?;
        Ok(item)
    }

    async fn remove_item(&self, cart_id: CartId, item_id: CartItemId) -> Result<()> {
        let _guard = self.writer.lock().await;
        let key = item_key(cart_id, item_id);
        if self.get::<CartItem>(CF_CART_ITEMS, &key)?.is_none() {
            return Err(StoreError::CartItemNotFound(item_id));
        }
        let mut batch = WriteBatch::default();
        self.delete(&mut batch, CF_CART_ITEMS, &key)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        self.scan_prefix(CF_CART_ITEMS, &cart_id.to_be_bytes())
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<usize> {
        let _guard = self.writer.lock().await;
        let items: Vec<CartItem> = self.scan_prefix(CF_CART_ITEMS, &cart_id.to_be_bytes())?;
        let mut batch = WriteBatch::default();
        for item in &items {
            self.delete(&mut batch, CF_CART_ITEMS, &item_key(cart_id, item.id))?;
        }
        self.db.write(batch)?;
        Ok(items.len())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn commit_checkout(
        &self,
        cart_id: CartId,
        snapshot: &[CartItem],
        orders: Vec<NewOrder>,
    ) -> Result<Vec<Order>> {
        let _guard = self.writer.lock().await;
        let current: Vec<CartItem> = self.scan_prefix(CF_CART_ITEMS, &cart_id.to_be_bytes())?;
        if current.as_slice() != snapshot {
            return Err(StoreError::CartChanged);
        }

        let mut batch = WriteBatch::default();
        let count = u32::try_from(orders.len())
            .map_err(|_| StoreError::internal("Too many orders in one checkout"))?;
        let first = self.reserve_ids(&mut batch, count)?;

        let placed: Vec<Order> = orders
            .into_iter()
            .zip(first..)
            .map(|(order, id)| order.with_id(OrderId(id)))
            .collect();
        for order in &placed {
            self.put(&mut batch, CF_ORDERS, &order.id.to_be_bytes(), order)?;
        }
        for item in &current {
            self.delete(&mut batch, CF_CART_ITEMS, &item_key(cart_id, item.id))?;
        }
        self.db.write(batch)?;
        Ok(placed)
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let orders: Vec<Order> = self.scan(CF_ORDERS)?;
        Ok(orders
            .into_iter()
            .filter(|o| o.customer_id == customer_id)
            .collect())
    }

    async fn orders(&self) -> Result<Vec<Order>> {
        self.scan(CF_ORDERS)
    }
}
