use crate::domain::ids::{AdminId, CartItemId, CategoryId, CustomerId, ProductId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Message shown for failures the caller cannot act on.
pub const GENERIC_FAILURE: &str = "An error occurred. Please try again later.";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),
    #[error("Category {0} not found")]
    CategoryNotFound(CategoryId),
    #[error("Cart item {0} not found")]
    CartItemNotFound(CartItemId),
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("Admin {0} not found")]
    AdminNotFound(AdminId),
    #[error("'{0}' already exists")]
    DuplicateName(String),
    #[error("Your cart is empty. Add products to your cart before checking out.")]
    EmptyCart,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("{0}")]
    InUse(String),
    #[error("Cannot delete the first admin")]
    ProtectedAdmin,
    #[error("Login failed. Please check your username and password.")]
    InvalidCredentials,
    #[error("Please log in to continue")]
    Unauthorized,
    #[error("Your cart changed during checkout. Please review it and try again.")]
    CartChanged,
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Whether the error describes something the requester can correct.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::CsvError(_)
                | Self::IoError(_)
                | Self::SerializationError(_)
                | Self::InternalError(_)
        ) && !self.is_backend()
    }

    #[cfg(feature = "storage-rocksdb")]
    fn is_backend(&self) -> bool {
        matches!(self, Self::RocksDbError(_))
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    fn is_backend(&self) -> bool {
        false
    }

    /// The message surfaced at the request boundary.
    pub fn user_message(&self) -> String {
        if self.is_user_facing() {
            self.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}
