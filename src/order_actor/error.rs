use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::customer_actor::CustomerError;
use crate::domain::Order;
use crate::product_actor::ProductError;

/// Errors raised by the order ledger itself.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<LedgerError>> for LedgerError {
    fn from(err: FrameworkError<LedgerError>) -> Self {
        match err {
            FrameworkError::Rejected(e) => e,
            FrameworkError::NotFound(id) => LedgerError::NotFound(id),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                LedgerError::ActorCommunicationError(e.to_string())
            }
        }
    }
}

/// Errors that can occur while placing an order.
///
/// The first five variants are business-rule failures: nothing was recorded
/// and no stock moved. [`OrderError::PartialFailure`] means the order was
/// recorded but its stock was not taken, and needs reconciliation. The
/// remaining variants pass store failures through unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Customer does not exist: {0}")]
    CustomerNotFound(String),
    #[error("Could not find any products")]
    NoProductsFound,
    #[error("Product {0} does not exist")]
    ProductNotFound(String),
    #[error("Not enough quantity of product {0}")]
    InsufficientStock(String),
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(String),
    #[error("Order {} was recorded but stock was not decremented: {source}", .order.id)]
    PartialFailure { order: Box<Order>, source: ProductError },
    #[error(transparent)]
    Customer(#[from] CustomerError),
    #[error(transparent)]
    Catalog(#[from] ProductError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl OrderError {
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, OrderError::PartialFailure { .. })
    }

    /// The order left in the ledger by a partial failure.
    pub fn recorded_order(&self) -> Option<&Order> {
        match self {
            OrderError::PartialFailure { order, .. } => Some(&**order),
            _ => None,
        }
    }
}
