use tracing::{info, instrument, warn};

use crate::customer_actor::CustomerError;
use crate::domain::{Customer, CustomerCreate};
use crate::repositories::CustomerDirectory;

/// Registers customers, keeping emails unique.
#[derive(Clone)]
pub struct CustomerRegistrationService<D> {
    directory: D,
}

impl<D: CustomerDirectory> CustomerRegistrationService<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// The lookup gives a fast answer for the common case; the directory
    /// re-checks uniqueness when it inserts, so concurrent registrations of
    /// one email still produce a single customer.
    #[instrument(skip(self, params), fields(customer_email = %params.email))]
    pub async fn register(&self, params: CustomerCreate) -> Result<Customer, CustomerError> {
        if self.directory.find_by_email(&params.email).await?.is_some() {
            warn!("Email already registered");
            return Err(CustomerError::AlreadyExists(params.email));
        }

        let customer = self.directory.create(params).await?;
        info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }
}
