use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{OrderItem, Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use crate::repositories::ProductCatalog;

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(ProductError::ActorCommunicationError(format!("Unexpected result: {:?}", other))),
        }
    }

    /// Edits name and/or price. Existing orders keep their snapshot prices.
    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    async fn apply_batch(
        &self,
        items: &[OrderItem],
        action: impl Fn(u32) -> ProductAction,
    ) -> Result<Vec<ProductActionResult>, ProductError> {
        let actions = items
            .iter()
            .map(|item| (item.id.clone(), action(item.quantity)))
            .collect();
        self.inner.perform_batch(actions).await.map_err(ProductError::from)
    }
}

#[async_trait]
impl ProductCatalog for ProductClient {
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    async fn find_all_by_id(&self, items: &[OrderItem]) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let ids = items.iter().map(|item| item.id.clone()).collect();
        self.inner.get_many(ids).await.map_err(ProductError::from)
    }

    #[instrument(skip(self, items), fields(item_count = items.len()))]
    async fn update_quantity(&self, items: &[OrderItem]) -> Result<(), ProductError> {
        debug!("Sending request");
        let results = self.apply_batch(items, ProductAction::Decrement).await?;
        info!(?results, "Stock decremented");
        Ok(())
    }

    #[instrument(skip(self, items), fields(item_count = items.len()))]
    async fn restock(&self, items: &[OrderItem]) -> Result<(), ProductError> {
        debug!("Sending request");
        let results = self.apply_batch(items, ProductAction::Restock).await?;
        info!(?results, "Stock returned");
        Ok(())
    }

    #[instrument(skip(self, params), fields(product_name = %params.name))]
    async fn create(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(ProductError::from)
    }
}
