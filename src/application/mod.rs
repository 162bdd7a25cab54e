//! Application layer: the storefront use cases.
//!
//! Each service owns a handle to the shared store and takes the caller's
//! identity as an explicit session argument. [`storefront::Storefront`]
//! wires them together over one backend.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod storefront;
#[cfg(test)]
mod testing;

pub use accounts::AccountService;
pub use cart::{CartEngine, CartUpdate};
pub use catalog::CatalogService;
pub use checkout::CheckoutOrchestrator;
