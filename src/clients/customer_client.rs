use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::customer_actor::CustomerError;
use crate::domain::{Customer, CustomerCreate};
use crate::repositories::CustomerDirectory;

/// Client for interacting with the Customer actor.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
}

impl_basic_client!(CustomerClient, Customer, CustomerError, customer);

#[async_trait]
impl CustomerDirectory for CustomerClient {
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, CustomerError> {
        self.get_customer(id.to_string()).await
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerError> {
        debug!("Sending request");
        let email = email.to_string();
        self.inner
            .find(move |customer: &Customer| customer.has_email(&email))
            .await
            .map_err(CustomerError::from)
    }

    #[instrument(skip(self, params), fields(customer_email = %params.email))]
    async fn create(&self, params: CustomerCreate) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(CustomerError::from)
    }
}
