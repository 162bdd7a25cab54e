use super::cart::{CartItem, Quantity};
use super::ids::{CustomerId, OrderId, ProductId};
use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Where and to whom a checkout is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDetails {
    address: String,
    phone_number: String,
}

impl DeliveryDetails {
    pub fn new(address: &str, phone_number: &str) -> Result<Self, StoreError> {
        let address = address.trim();
        let phone_number = phone_number.trim();
        if address.is_empty() {
            return Err(StoreError::ValidationError(
                "Delivery address is required".to_string(),
            ));
        }
        if phone_number.is_empty() {
            return Err(StoreError::ValidationError(
                "Phone number is required".to_string(),
            ));
        }
        Ok(Self {
            address: address.to_string(),
            phone_number: phone_number.to_string(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }
}

/// An order row before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub address: String,
    pub phone_number: String,
    pub customer_id: CustomerId,
}

impl NewOrder {
    /// Copies a cart line verbatim into an order for `customer_id`.
    pub fn from_cart_item(
        item: &CartItem,
        customer_id: CustomerId,
        delivery: &DeliveryDetails,
    ) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            address: delivery.address.clone(),
            phone_number: delivery.phone_number.clone(),
            customer_id,
        }
    }

    pub fn with_id(self, id: OrderId) -> Order {
        Order {
            id,
            product_id: self.product_id,
            quantity: self.quantity,
            address: self.address,
            phone_number: self.phone_number,
            customer_id: self.customer_id,
        }
    }
}

/// An immutable record of one purchased product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub address: String,
    pub phone_number: String,
    pub customer_id: CustomerId,
}
