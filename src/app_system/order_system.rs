use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::clients::{CustomerClient, OrderClient, ProductClient};
use crate::domain::{Customer, Order, Product};
use crate::services::{CustomerRegistrationService, OrderPlacementService, ProductRegistrationService};

use super::SystemConfig;

pub type OrderPlacement = OrderPlacementService<CustomerClient, ProductClient, OrderClient>;

/// Generates `prefix_1`, `prefix_2`, ...
fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

/// The main application system that orchestrates all actors.
///
/// Responsible for starting the three store actors, wiring the services to
/// their clients, and handling shutdown.
pub struct OrderSystem {
    pub placement: OrderPlacement,
    pub customers: CustomerRegistrationService<CustomerClient>,
    pub products: ProductRegistrationService<ProductClient>,
    pub customer_client: CustomerClient,
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl OrderSystem {
    pub fn new() -> Self {
        Self::from_config(&SystemConfig::default())
    }

    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &SystemConfig) -> Self {
        let capacity = config.actors.mailbox_capacity;
        info!(mailbox_capacity = capacity, "Starting order system");

        // 1. Customer directory
        let (customer_actor, customer_inner) = ResourceActor::<Customer>::new(capacity, sequential_ids("customer"));
        let customer_client = CustomerClient::new(customer_inner);
        let customer_handle = tokio::spawn(customer_actor.run());

        // 2. Product catalog
        let (product_actor, product_inner) = ResourceActor::<Product>::new(capacity, sequential_ids("product"));
        let product_client = ProductClient::new(product_inner);
        let product_handle = tokio::spawn(product_actor.run());

        // 3. Order ledger
        let (order_actor, order_inner) = ResourceActor::<Order>::new(capacity, sequential_ids("order"));
        let order_client = OrderClient::new(order_inner);
        let order_handle = tokio::spawn(order_actor.run());

        Self {
            placement: OrderPlacementService::new(
                customer_client.clone(),
                product_client.clone(),
                order_client.clone(),
            ),
            customers: CustomerRegistrationService::new(customer_client.clone()),
            products: ProductRegistrationService::new(product_client.clone()),
            customer_client,
            product_client,
            order_client,
            handles: vec![customer_handle, product_handle, order_handle],
            shutdown_timeout: Duration::from_millis(config.actors.shutdown_timeout_ms),
        }
    }

    /// Drops every client, which closes the mailboxes, then waits for each
    /// actor to drain and stop.
    ///
    /// An actor stays up while any clone of its client is alive, including
    /// clones held inside services the caller cloned from this system. Drop
    /// those first; otherwise this fails once `shutdown_timeout_ms` elapses.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        let Self {
            placement,
            customers,
            products,
            customer_client,
            product_client,
            order_client,
            handles,
            shutdown_timeout,
        } = self;
        drop((placement, customers, products));
        drop((customer_client, product_client, order_client));

        let join_all = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    error!("Actor task failed: {:?}", e);
                    return Err(format!("Actor task failed: {:?}", e));
                }
            }
            Ok(())
        };

        match tokio::time::timeout(shutdown_timeout, join_all).await {
            Ok(joined) => joined?,
            Err(_) => {
                error!(timeout = ?shutdown_timeout, "Actors still running, a client is still held");
                return Err(format!("Shutdown timed out after {:?}", shutdown_timeout));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

impl Default for OrderSystem {
    fn default() -> Self {
        Self::new()
    }
}
