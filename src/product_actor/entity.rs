use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};
use super::actions::{ProductAction, ProductActionResult};
use super::ProductError;

fn validate_name(name: &str) -> Result<&str, ProductError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProductError::ValidationError("Name required".to_string()));
    }
    Ok(name)
}

fn validate_price(price: f64) -> Result<f64, ProductError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ProductError::InvalidPrice(price))
    }
}

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Rejection = ProductError;

    const KIND: &'static str = "product";

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Errors
    /// Rejects an empty name and a negative or non-finite price.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        let name = validate_name(&params.name)?;
        let price = validate_price(params.price)?;
        Ok(Self::new(id, name, price, params.quantity))
    }

    /// Updates the product's name and/or price.
    ///
    /// Orders already placed keep the price they were placed at. Names are
    /// trimmed and must not be blank, as on creation.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(price) = patch.price {
            self.price = validate_price(price)?;
        }
        if let Some(name) = patch.name {
            self.name = validate_name(&name)?.to_string();
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Errors
    /// `Decrement` fails if the amount exceeds available stock; `Restock`
    /// fails if the level would overflow.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.quantity)),
            ProductAction::Decrement(amount) => {
                if self.quantity >= amount {
                    self.quantity -= amount;
                    Ok(ProductActionResult::Decrement(self.quantity))
                } else {
                    Err(ProductError::InsufficientStock {
                        id: self.id.clone(),
                        requested: amount,
                        available: self.quantity,
                    })
                }
            }
            ProductAction::Restock(amount) => {
                self.quantity = self.quantity.checked_add(amount).ok_or_else(|| {
                    ProductError::ValidationError(format!("Stock overflow for product {}", self.id))
                })?;
                Ok(ProductActionResult::Restock(self.quantity))
            }
        }
    }
}
