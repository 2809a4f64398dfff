use super::OrderItem;

/// An order recorded in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub line_items: Vec<OrderLineItem>,
}

/// One priced product within an order.
///
/// `price` is the catalog price when the order was validated, not a live
/// reference to the product.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItem {
    pub product_id: String,
    pub quantity: u32,
    pub price: f64,
}

/// Payload for recording a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_id: String,
    pub line_items: Vec<OrderLineItem>,
}

/// A request to place an order for a customer.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer_id: String,
    pub products: Vec<OrderItem>,
}

impl Order {
    pub fn total(&self) -> f64 {
        self.line_items.iter().map(OrderLineItem::subtotal).sum()
    }
}

impl OrderLineItem {
    pub fn new(product_id: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl PlaceOrder {
    pub fn new(customer_id: impl Into<String>, products: Vec<OrderItem>) -> Self {
        Self {
            customer_id: customer_id.into(),
            products,
        }
    }
}
