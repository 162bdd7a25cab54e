use crate::domain::account::CustomerSession;
use crate::domain::cart::{Cart, CartItem, CartLine, Quantity, QuantityChange, cart_total};
use crate::domain::ids::{CartId, CartItemId, ProductId};
use crate::domain::ports::{CartStore, CatalogStore, StorageHandle};
use crate::error::{Result, StoreError};
use rust_decimal::Decimal;
use tracing::debug;

/// What an explicit quantity update did to a cart line.
#[derive(Debug, Clone, PartialEq)]
pub enum CartUpdate {
    Updated(CartItem),
    Removed,
}

/// Per-customer cart state: `NoCart`, then a cart that moves between empty
/// and holding items. The cart row itself is never deleted here.
#[derive(Clone)]
pub struct CartEngine {
    storage: StorageHandle,
}

impl CartEngine {
    pub fn new(storage: StorageHandle) -> Self {
        Self { storage }
    }

    pub async fn get_or_create_cart(&self, session: &CustomerSession) -> Result<Cart> {
        self.storage.get_or_create_cart(session.customer_id()).await
    }

    /// Adds `quantity` units of a product, freezing its current price on first add.
    pub async fn add_item(
        &self,
        session: &CustomerSession,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem> {
        let product = self
            .storage
            .product(product_id)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))?;
        let cart = self.get_or_create_cart(session).await?;
        let item = self.storage.add_item(cart.id, &product, quantity).await?;
        debug!(
            customer = %session.customer_id(),
            product = %product_id,
            quantity = item.quantity.value(),
            "added to cart"
        );
        Ok(item)
    }

    /// Sets a line's quantity exactly. A non-positive request removes the line.
    pub async fn update_item_quantity(
        &self,
        session: &CustomerSession,
        item_id: CartItemId,
        requested: i64,
    ) -> Result<CartUpdate> {
        let cart = self.owned_cart(session, item_id).await?;
        match QuantityChange::from_requested(requested)? {
            QuantityChange::Remove => {
                self.storage.remove_item(cart.id, item_id).await?;
                debug!(customer = %session.customer_id(), item = %item_id, "removed from cart");
                Ok(CartUpdate::Removed)
            }
            QuantityChange::Set(quantity) => {
                let item = self
                    .storage
                    .set_item_quantity(cart.id, item_id, quantity)
                    .await?;
                debug!(
                    customer = %session.customer_id(),
                    item = %item_id,
                    quantity = quantity.value(),
                    "updated cart"
                );
                Ok(CartUpdate::Updated(item))
            }
        }
    }

    pub async fn remove_item(&self, session: &CustomerSession, item_id: CartItemId) -> Result<()> {
        let cart = self.owned_cart(session, item_id).await?;
        self.storage.remove_item(cart.id, item_id).await?;
        debug!(customer = %session.customer_id(), item = %item_id, "removed from cart");
        Ok(())
    }

    /// Lines of a cart with their products resolved, in insertion order.
    pub async fn list_items(&self, cart_id: CartId) -> Result<Vec<CartLine>> {
        let items = self.storage.cart_items(cart_id).await?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .storage
                .product(item.product_id)
                .await?
                .ok_or(StoreError::ProductNotFound(item.product_id))?;
            lines.push(CartLine { item, product });
        }
        Ok(lines)
    }

    /// The session's cart lines; empty when the customer has no cart yet.
    pub async fn lines_for(&self, session: &CustomerSession) -> Result<Vec<CartLine>> {
        match self.storage.cart_for(session.customer_id()).await? {
            Some(cart) => self.list_items(cart.id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Total at the prices captured when each line was added.
    pub fn total(&self, lines: &[CartLine]) -> Decimal {
        cart_total(lines.iter().map(|line| &line.item))
    }

    /// Empties the customer's cart. Without a cart this does nothing.
    pub async fn clear(&self, session: &CustomerSession) -> Result<usize> {
        match self.storage.cart_for(session.customer_id()).await? {
            Some(cart) => self.storage.clear_cart(cart.id).await,
            None => Ok(0),
        }
    }

    /// The session's cart, provided `item_id` is one of its lines.
    async fn owned_cart(&self, session: &CustomerSession, item_id: CartItemId) -> Result<Cart> {
        let cart = self
            .storage
            .cart_for(session.customer_id())
            .await?
            .ok_or(StoreError::CartItemNotFound(item_id))?;
        match self.storage.cart_item(cart.id, item_id).await? {
            Some(_) => Ok(cart),
            None => Err(StoreError::CartItemNotFound(item_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use crate::domain::catalog::{Price, ProductDraft};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_get_or_create_cart_is_stable() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;

        let first = fx.cart.get_or_create_cart(&alice).await.unwrap();
        let second = fx.cart.get_or_create_cart(&alice).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_concurrent_first_adds_create_one_cart_and_line() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let apple_id = fx.product("Apple", dec!(0.40)).await.id;

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let cart = fx.cart.clone();
                let alice = alice.clone();
                tokio::spawn(async move { cart.add_item(&alice, apple_id, Quantity::ONE).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let lines = fx.cart.lines_for(&alice).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item.quantity.value(), 10);
    }

    #[tokio::test]
    async fn test_repeat_add_increments_and_keeps_first_price() {
        let fx = Fixture::new().await;
        let admin = fx.admin().await;
        let alice = fx.customer("alice").await;
        let apple = fx.product("Apple", dec!(0.50)).await;

        fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();
        fx.catalog
            .edit_product(
                &admin,
                apple.id,
                ProductDraft::new("Apple", Price::new(dec!(0.75)).unwrap()),
            )
            .await
            .unwrap();
        let item = fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();

        assert_eq!(item.quantity.value(), 2);
        assert_eq!(item.unit_price.value(), dec!(0.50));

        let lines = fx.cart.lines_for(&alice).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.price.value(), dec!(0.75));
        assert_eq!(fx.cart.total(&lines), dec!(1.00));
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails_without_creating_cart() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;

        let result = fx.cart.add_item(&alice, ProductId(404), Quantity::ONE).await;
        assert!(matches!(result, Err(StoreError::ProductNotFound(_))));
        assert!(fx.storage.cart_for(alice.customer_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_sets_exact_quantity() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        let item = fx
            .cart
            .add_item(&alice, apple.id, Quantity::new(3).unwrap())
            .await
            .unwrap();

        let update = fx.cart.update_item_quantity(&alice, item.id, 5).await.unwrap();
        match update {
            CartUpdate::Updated(item) => assert_eq!(item.quantity.value(), 5),
            CartUpdate::Removed => panic!("expected the line to stay"),
        }
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        let pear = fx.product("Pear", dec!(0.60)).await;
        let apple_item = fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();
        fx.cart.add_item(&alice, pear.id, Quantity::ONE).await.unwrap();

        let update = fx.cart.update_item_quantity(&alice, apple_item.id, 0).await.unwrap();
        assert_eq!(update, CartUpdate::Removed);

        let lines = fx.cart.lines_for(&alice).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.id, pear.id);
    }

    #[tokio::test]
    async fn test_update_or_remove_missing_item() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;

        assert!(matches!(
            fx.cart.update_item_quantity(&alice, CartItemId(9), 2).await,
            Err(StoreError::CartItemNotFound(_))
        ));
        assert!(matches!(
            fx.cart.remove_item(&alice, CartItemId(9)).await,
            Err(StoreError::CartItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cannot_touch_another_customers_line() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let bob = fx.customer("bob").await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        let item = fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();
        fx.cart.get_or_create_cart(&bob).await.unwrap();

        assert!(matches!(
            fx.cart.remove_item(&bob, item.id).await,
            Err(StoreError::CartItemNotFound(_))
        ));
        assert!(matches!(
            fx.cart.update_item_quantity(&bob, item.id, 0).await,
            Err(StoreError::CartItemNotFound(_))
        ));
        assert!(matches!(
            fx.cart.update_item_quantity(&bob, item.id, 5).await,
            Err(StoreError::CartItemNotFound(_))
        ));
        let lines = fx.cart.lines_for(&alice).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item.quantity, Quantity::ONE);
    }

    #[tokio::test]
    async fn test_lines_keep_insertion_order() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let zucchini = fx.product("Zucchini", dec!(1.00)).await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        fx.cart.add_item(&alice, zucchini.id, Quantity::ONE).await.unwrap();
        fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();
        fx.cart.add_item(&alice, zucchini.id, Quantity::ONE).await.unwrap();

        let names: Vec<String> = fx
            .cart
            .lines_for(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|line| line.product.name)
            .collect();
        assert_eq!(names, vec!["Zucchini".to_string(), "Apple".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_keeps_cart_row() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let bob = fx.customer("bob").await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();
        let cart = fx.cart.get_or_create_cart(&alice).await.unwrap();

        assert_eq!(fx.cart.clear(&alice).await.unwrap(), 1);
        assert!(fx.cart.list_items(cart.id).await.unwrap().is_empty());
        assert_eq!(fx.cart.get_or_create_cart(&alice).await.unwrap().id, cart.id);

        // No cart yet is not an error.
        assert_eq!(fx.cart.clear(&bob).await.unwrap(), 0);
    }
}
