//! Storefront entities, their invariants, and the storage ports.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod credentials;
pub mod ids;
pub mod image;
pub mod order;
pub mod ports;
