use tracing::{info, instrument};

use crate::domain::{Product, ProductCreate};
use crate::product_actor::ProductError;
use crate::repositories::ProductCatalog;

/// Adds products to the catalog.
#[derive(Clone)]
pub struct ProductRegistrationService<C> {
    catalog: C,
}

impl<C: ProductCatalog> ProductRegistrationService<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    #[instrument(skip(self, params), fields(product_name = %params.name, price = params.price, quantity = params.quantity))]
    pub async fn register(&self, params: ProductCreate) -> Result<Product, ProductError> {
        let product = self.catalog.create(params).await?;
        info!(product_id = %product.id, "Product registered");
        Ok(product)
    }
}
