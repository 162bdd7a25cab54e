//! Storage backends for the storefront ports, plus image file storage.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod uploads;
