use crate::actor_framework::Entity;
use crate::domain::{Customer, CustomerCreate};
use super::CustomerError;

impl Entity for Customer {
    type Id = String;
    type CreateParams = CustomerCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Rejection = CustomerError;

    const KIND: &'static str = "customer";

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Customer from registration parameters.
    ///
    /// # Errors
    /// Rejects an empty name or an email without an `@`.
    fn from_create_params(id: String, params: CustomerCreate) -> Result<Self, CustomerError> {
        let name = params.name.trim();
        let email = params.email.trim();
        if name.is_empty() {
            return Err(CustomerError::ValidationError("Name required".to_string()));
        }
        if !email.contains('@') {
            return Err(CustomerError::ValidationError(format!("Invalid email: {}", email)));
        }
        Ok(Self::new(id, name, email))
    }

    /// Emails are unique across the directory.
    fn conflicts_with(&self, existing: &Self) -> Option<CustomerError> {
        existing
            .has_email(&self.email)
            .then(|| CustomerError::AlreadyExists(self.email.clone()))
    }

    /// Customers are immutable once registered.
    fn on_update(&mut self, _patch: ()) -> Result<(), CustomerError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), CustomerError> {
        Ok(())
    }
}
