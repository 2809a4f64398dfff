//! Application services. Each one receives its stores at construction.

pub mod place_order;
pub mod register_customer;
pub mod register_product;

pub use place_order::OrderPlacementService;
pub use register_customer::CustomerRegistrationService;
pub use register_product::ProductRegistrationService;
