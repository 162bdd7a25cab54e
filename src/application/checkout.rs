use super::accounts::authorize_admin;
use super::cart::CartEngine;
use crate::domain::account::{AdminSession, CustomerSession};
use crate::domain::order::{DeliveryDetails, NewOrder, Order};
use crate::domain::ports::{CartStore, OrderStore, StorageHandle};
use crate::error::{Result, StoreError};
use tracing::{error, info};

/// Turns a customer's cart into orders.
///
/// Orders are written and the cart emptied in one atomic store write; either
/// both happen or neither does.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    storage: StorageHandle,
    cart: CartEngine,
}

impl CheckoutOrchestrator {
    pub fn new(storage: StorageHandle, cart: CartEngine) -> Self {
        Self { storage, cart }
    }

    /// Places one order per cart line for delivery to `address`.
    ///
    /// Fails with `EmptyCart`, creating nothing, when there is no cart or it
    /// holds no items.
    pub async fn checkout(
        &self,
        session: &CustomerSession,
        address: &str,
        phone_number: &str,
    ) -> Result<Vec<Order>> {
        let customer_id = session.customer_id();
        let cart = self
            .storage
            .cart_for(customer_id)
            .await?
            .ok_or(StoreError::EmptyCart)?;
        let lines = self.cart.list_items(cart.id).await?;
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        let delivery = DeliveryDetails::new(address, phone_number)?;

        let snapshot: Vec<_> = lines.into_iter().map(|line| line.item).collect();
        let orders = snapshot
            .iter()
            .map(|item| NewOrder::from_cart_item(item, customer_id, &delivery))
            .collect();

        let placed = self
            .storage
            .commit_checkout(cart.id, &snapshot, orders)
            .await
            .inspect_err(|e| {
                if !e.is_user_facing() {
                    error!(customer = %customer_id, error = %e, "checkout aborted");
                }
            })?;
        info!(customer = %customer_id, orders = placed.len(), "order placed");
        Ok(placed)
    }

    pub async fn order_history(&self, session: &CustomerSession) -> Result<Vec<Order>> {
        self.storage.orders_for_customer(session.customer_id()).await
    }

    pub async fn all_orders(&self, session: &AdminSession) -> Result<Vec<Order>> {
        authorize_admin(&self.storage, session).await?;
        self.storage.orders().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use crate::domain::cart::Quantity;
    use crate::domain::ids::CartItemId;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_checkout_without_cart_is_empty_cart() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;

        assert!(matches!(
            fx.checkout.checkout(&alice, "1 Main St", "555").await,
            Err(StoreError::EmptyCart)
        ));
        assert!(fx.storage.orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_with_emptied_cart_is_empty_cart() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        let item = fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();
        fx.cart.remove_item(&alice, item.id).await.unwrap();

        assert!(matches!(
            fx.checkout.checkout(&alice, "1 Main St", "555").await,
            Err(StoreError::EmptyCart)
        ));
        assert!(fx.storage.orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_fans_lines_into_orders_and_empties_cart() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let product_a = fx.product("Eggs", dec!(3.00)).await;
        let product_b = fx.product("Butter", dec!(5.00)).await;
        fx.cart
            .add_item(&alice, product_a.id, Quantity::new(2).unwrap())
            .await
            .unwrap();
        fx.cart.add_item(&alice, product_b.id, Quantity::ONE).await.unwrap();
        let cart = fx.cart.get_or_create_cart(&alice).await.unwrap();

        let lines = fx.cart.list_items(cart.id).await.unwrap();
        assert_eq!(fx.cart.total(&lines), dec!(11.00));

        let orders = fx
            .checkout
            .checkout(&alice, "1 Main St", "555-0100")
            .await
            .unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].product_id, product_a.id);
        assert_eq!(orders[0].quantity.value(), 2);
        assert_eq!(orders[1].product_id, product_b.id);
        assert_eq!(orders[1].quantity.value(), 1);
        for order in &orders {
            assert_eq!(order.address, "1 Main St");
            assert_eq!(order.phone_number, "555-0100");
            assert_eq!(order.customer_id, alice.customer_id());
        }

        assert!(fx.cart.list_items(cart.id).await.unwrap().is_empty());
        assert_eq!(
            fx.storage.cart_for(alice.customer_id()).await.unwrap(),
            Some(cart)
        );
        assert_eq!(fx.checkout.order_history(&alice).await.unwrap(), orders);
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_delivery_details() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();

        assert!(matches!(
            fx.checkout.checkout(&alice, "", "555").await,
            Err(StoreError::ValidationError(_))
        ));
        assert_eq!(fx.cart.lines_for(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_order_history_is_per_customer() {
        let fx = Fixture::new().await;
        let admin = fx.admin().await;
        let alice = fx.customer("alice").await;
        let bob = fx.customer("bob").await;
        let apple = fx.product("Apple", dec!(0.50)).await;

        fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();
        fx.checkout.checkout(&alice, "1 Main St", "555").await.unwrap();
        fx.cart.add_item(&bob, apple.id, Quantity::ONE).await.unwrap();
        fx.checkout.checkout(&bob, "2 Side St", "556").await.unwrap();

        assert_eq!(fx.checkout.order_history(&alice).await.unwrap().len(), 1);
        assert_eq!(fx.checkout.all_orders(&admin).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_second_checkout_after_success_is_empty() {
        let fx = Fixture::new().await;
        let alice = fx.customer("alice").await;
        let apple = fx.product("Apple", dec!(0.50)).await;
        fx.cart.add_item(&alice, apple.id, Quantity::ONE).await.unwrap();

        fx.checkout.checkout(&alice, "1 Main St", "555").await.unwrap();
        assert!(matches!(
            fx.checkout.checkout(&alice, "1 Main St", "555").await,
            Err(StoreError::EmptyCart)
        ));
        assert_eq!(fx.storage.orders().await.unwrap().len(), 1);
        assert!(matches!(
            fx.cart.remove_item(&alice, CartItemId(1)).await,
            Err(StoreError::CartItemNotFound(_))
        ));
    }
}
