use super::catalog::{Price, Product};
use super::ids::{CartId, CartItemId, CustomerId, ProductId};
use crate::error::StoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A strictly positive number of units on a cart line or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Self = Self(1);

    pub fn new(value: u32) -> Result<Self, StoreError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(StoreError::ValidationError(
                "Quantity must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, StoreError> {
        self.0.checked_add(rhs.0).map(Self).ok_or_else(|| {
            StoreError::ValidationError("Quantity is too large".to_string())
        })
    }
}

impl TryFrom<u32> for Quantity {
    type Error = StoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

/// The outcome of asking for a line to hold `requested` units.
///
/// A non-positive request is a removal, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Set(Quantity),
    Remove,
}

impl QuantityChange {
    pub fn from_requested(requested: i64) -> Result<Self, StoreError> {
        if requested <= 0 {
            return Ok(Self::Remove);
        }
        let value = u32::try_from(requested).map_err(|_| {
            StoreError::ValidationError("Quantity is too large".to_string())
        })?;
        Quantity::new(value).map(Self::Set)
    }
}

/// A customer's single, long-lived container of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
}

/// One product line in a cart, priced at the moment it was first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Price,
}

impl CartItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.value() * Decimal::from(self.quantity.value())
    }
}

/// A cart item joined with its catalog product, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

/// Sums the snapshot prices of the given items.
///
/// The live catalog price is never consulted.
pub fn cart_total<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a CartItem>,
{
    items.into_iter().map(CartItem::subtotal).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(id: u32, price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId(id),
            cart_id: CartId(1),
            product_id: ProductId(id),
            quantity: Quantity::new(quantity).unwrap(),
            unit_price: Price::new(price).unwrap(),
        }
    }

    #[test]
    fn test_cart_total_is_exact() {
        let items = vec![item(1, dec!(3.00), 2), item(2, dec!(5.00), 1)];
        assert_eq!(cart_total(&items), dec!(11.00));
    }

    #[test]
    fn test_cart_total_of_nothing_is_zero() {
        let items: Vec<CartItem> = Vec::new();
        assert_eq!(cart_total(&items), Decimal::ZERO);
    }

    #[test]
    fn test_cart_total_avoids_float_drift() {
        let items: Vec<CartItem> = (1..=10).map(|i| item(i, dec!(0.10), 1)).collect();
        assert_eq!(cart_total(&items), dec!(1.00));
    }

    #[test]
    fn test_quantity_validation() {
        assert!(Quantity::new(1).is_ok());
        assert!(matches!(
            Quantity::new(0),
            Err(StoreError::ValidationError(_))
        ));
        assert!(Quantity::new(u32::MAX).unwrap().checked_add(Quantity::ONE).is_err());
    }

    #[test]
    fn test_quantity_change_from_requested() {
        assert_eq!(
            QuantityChange::from_requested(0).unwrap(),
            QuantityChange::Remove
        );
        assert_eq!(
            QuantityChange::from_requested(-3).unwrap(),
            QuantityChange::Remove
        );
        assert_eq!(
            QuantityChange::from_requested(4).unwrap(),
            QuantityChange::Set(Quantity::new(4).unwrap())
        );
        assert!(QuantityChange::from_requested(i64::MAX).is_err());
    }
}
