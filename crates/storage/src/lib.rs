#![forbid(unsafe_code)]

pub mod bank;
pub mod json;
pub mod repository;

pub use repository::{Storage, StorageError};
