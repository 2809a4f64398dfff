use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate};
use super::LedgerError;

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Rejection = LedgerError;

    const KIND: &'static str = "order";

    fn id(&self) -> &String {
        &self.id
    }

    /// Records a new Order with its already-priced line items.
    ///
    /// # Errors
    /// Rejects an order without line items or with a zero-quantity line.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, LedgerError> {
        if params.line_items.is_empty() {
            return Err(LedgerError::ValidationError("Order has no line items".to_string()));
        }
        if let Some(line) = params.line_items.iter().find(|line| line.quantity == 0) {
            return Err(LedgerError::ValidationError(format!(
                "Zero quantity for product {}",
                line.product_id
            )));
        }
        Ok(Self {
            id,
            customer_id: params.customer_id,
            line_items: params.line_items,
        })
    }

    /// Orders are immutable once recorded.
    fn on_update(&mut self, _patch: ()) -> Result<(), LedgerError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), LedgerError> {
        Ok(())
    }
}
