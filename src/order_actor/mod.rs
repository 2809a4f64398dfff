//! Order ledger domain logic and the order placement error taxonomy.

pub mod entity;
pub mod error;

pub use error::*;
