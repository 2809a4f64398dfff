//! Store contracts consumed by the services.
//!
//! The services are generic over these traits and receive implementations at
//! construction. [`crate::clients`] implements them on top of resource actors.

use async_trait::async_trait;

use crate::customer_actor::CustomerError;
use crate::domain::{Customer, CustomerCreate, Order, OrderItem, OrderLineItem, Product, ProductCreate};
use crate::order_actor::LedgerError;
use crate::product_actor::ProductError;

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, CustomerError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerError>;

    /// Fails with [`CustomerError::AlreadyExists`] if the email is taken.
    async fn create(&self, params: CustomerCreate) -> Result<Customer, CustomerError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the products that exist among the requested ids.
    ///
    /// Missing ids are absent from the result and the result order is
    /// unspecified; callers match by id.
    async fn find_all_by_id(&self, items: &[OrderItem]) -> Result<Vec<Product>, ProductError>;

    /// Decrements each product's stock by the item quantity.
    ///
    /// All or nothing: if any product is missing or short of stock the call
    /// fails and no quantity changes. Repeated ids are applied cumulatively.
    async fn update_quantity(&self, items: &[OrderItem]) -> Result<(), ProductError>;

    /// Returns stock; the inverse of [`ProductCatalog::update_quantity`].
    async fn restock(&self, items: &[OrderItem]) -> Result<(), ProductError>;

    async fn create(&self, params: ProductCreate) -> Result<Product, ProductError>;
}

#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn create(&self, customer: &Customer, line_items: Vec<OrderLineItem>) -> Result<Order, LedgerError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, LedgerError>;

    /// Removes an order whose placement was rolled back.
    async fn discard(&self, id: &str) -> Result<(), LedgerError>;
}
