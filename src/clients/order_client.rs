use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Customer, Order, OrderCreate, OrderLineItem};
use crate::order_actor::LedgerError;
use crate::repositories::OrderLedger;

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, LedgerError, order);

#[async_trait]
impl OrderLedger for OrderClient {
    #[instrument(skip(self, customer, line_items), fields(customer_id = %customer.id, line_count = line_items.len()))]
    async fn create(&self, customer: &Customer, line_items: Vec<OrderLineItem>) -> Result<Order, LedgerError> {
        debug!("Sending request");
        let params = OrderCreate {
            customer_id: customer.id.clone(),
            line_items,
        };
        self.inner.create(params).await.map_err(LedgerError::from)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, LedgerError> {
        self.get_order(id.to_string()).await
    }

    #[instrument(skip(self))]
    async fn discard(&self, id: &str) -> Result<(), LedgerError> {
        debug!("Sending request");
        self.inner.delete(id.to_string()).await.map_err(LedgerError::from)
    }
}
