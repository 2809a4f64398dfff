//! # Order Placement
//!
//! Customers, a product catalog and an order ledger, each held by an in-memory
//! resource actor, plus the services that register customers and products and
//! place orders against them.
//!
//! - **Actor framework** - one generic actor per entity type, serving requests
//!   one at a time → [`actor_framework::ResourceActor`]
//! - **Store contracts** - async traits the services depend on →
//!   [`repositories::CustomerDirectory`], [`repositories::ProductCatalog`],
//!   [`repositories::OrderLedger`]
//! - **Clients** - typed handles implementing those contracts →
//!   [`clients::CustomerClient`], [`clients::ProductClient`], [`clients::OrderClient`]
//! - **Services** - the order placement workflow and registration →
//!   [`services::OrderPlacementService`]
//! - **System** - startup, wiring, config and shutdown → [`app_system::OrderSystem`]
//!
//! ```no_run
//! use order_placement::app_system::OrderSystem;
//! use order_placement::domain::{CustomerCreate, OrderItem, PlaceOrder, ProductCreate};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let system = OrderSystem::new();
//! let customer = system.customers.register(CustomerCreate::new("Alice", "alice@example.com")).await?;
//! let pen = system.products.register(ProductCreate::new("Pen", 10.0, 5)).await?;
//!
//! let order = system
//!     .placement
//!     .place_order(PlaceOrder::new(customer.id, vec![OrderItem::new(pen.id, 2)]))
//!     .await?;
//! assert_eq!(order.total(), 20.0);
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod customer_actor;
pub mod domain;
pub mod order_actor;
pub mod product_actor;
pub mod repositories;
pub mod services;

#[cfg(test)]
mod mock_framework;
