use std::collections::HashMap;

use tracing::{error, info, instrument, warn};

use crate::domain::{Order, OrderItem, OrderLineItem, PlaceOrder, Product};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::repositories::{CustomerDirectory, OrderLedger, ProductCatalog};

/// Validates, prices, records and fulfils one order.
///
/// The three stores are injected at construction, so production wiring and
/// tests differ only in what they pass to [`OrderPlacementService::new`].
///
/// Stock is checked twice. The check while pricing gives deterministic errors
/// in request order; the catalog's conditional batch decrement after the order
/// is recorded is authoritative. If another placement took the stock in
/// between, the recorded order is discarded and the caller gets the same
/// error a serial run would have produced.
#[derive(Clone)]
pub struct OrderPlacementService<D, C, L> {
    customers: D,
    catalog: C,
    ledger: L,
}

impl<D, C, L> OrderPlacementService<D, C, L>
where
    D: CustomerDirectory,
    C: ProductCatalog,
    L: OrderLedger,
{
    pub fn new(customers: D, catalog: C, ledger: L) -> Self {
        Self {
            customers,
            catalog,
            ledger,
        }
    }

    #[instrument(
        skip(self, request),
        fields(customer_id = %request.customer_id, product_count = request.products.len())
    )]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order, OrderError> {
        info!("Processing place_order request");
        let PlaceOrder { customer_id, products } = request;

        // Step 1: Resolve customer
        let Some(customer) = self.customers.find_by_id(&customer_id).await? else {
            warn!("Customer not found");
            return Err(OrderError::CustomerNotFound(customer_id));
        };

        if products.is_empty() {
            warn!("Order has no products");
            return Err(OrderError::NoProductsFound);
        }

        // Step 2: Resolve products
        let resolved = self.catalog.find_all_by_id(&products).await?;
        if resolved.is_empty() {
            warn!("None of the requested products exist");
            return Err(OrderError::NoProductsFound);
        }

        // Step 3: Validate and price in request order
        let line_items = price_line_items(&products, &resolved)?;

        // Step 4: Record the order
        let order = self.ledger.create(&customer, line_items).await?;
        info!(order_id = %order.id, total = order.total(), "Order recorded");

        // Step 5: Take the stock
        match self.catalog.update_quantity(&products).await {
            Ok(()) => {
                info!(order_id = %order.id, "Order placed successfully");
                Ok(order)
            }
            Err(e) => Err(self.roll_back(order, e).await),
        }
    }

    /// Undoes a recorded order whose stock could not be taken.
    async fn roll_back(&self, order: Order, cause: ProductError) -> OrderError {
        let rejection = match &cause {
            ProductError::InsufficientStock { id, .. } => OrderError::InsufficientStock(id.clone()),
            ProductError::NotFound(id) => OrderError::ProductNotFound(id.clone()),
            _ => {
                error!(order_id = %order.id, error = %cause, "Stock decrement failed, order needs reconciliation");
                return OrderError::PartialFailure { order: Box::new(order), source: cause };
            }
        };

        match self.ledger.discard(&order.id).await {
            Ok(()) => {
                warn!(order_id = %order.id, error = %cause, "Stock changed during placement, order discarded");
                rejection
            }
            Err(e) => {
                error!(
                    order_id = %order.id,
                    error = %cause,
                    discard_error = %e,
                    "Could not discard order after failed stock decrement, order needs reconciliation"
                );
                OrderError::PartialFailure { order: Box::new(order), source: cause }
            }
        }
    }
}

/// Matches each requested item to its product and snapshots the price.
///
/// Fails on the first item, in request order, that is missing, asks for
/// zero units, or is short of stock. Line items keep the request order.
fn price_line_items(requested: &[OrderItem], resolved: &[Product]) -> Result<Vec<OrderLineItem>, OrderError> {
    let by_id: HashMap<&str, &Product> = resolved.iter().map(|p| (p.id.as_str(), p)).collect();

    requested
        .iter()
        .map(|item| {
            let product = by_id.get(item.id.as_str()).ok_or_else(|| {
                warn!(product_id = %item.id, "Product not found");
                OrderError::ProductNotFound(item.id.clone())
            })?;
            if item.quantity == 0 {
                warn!(product_id = %item.id, "Zero quantity requested");
                return Err(OrderError::InvalidQuantity(item.id.clone()));
            }
            if product.quantity < item.quantity {
                warn!(
                    product_id = %item.id,
                    requested = item.quantity,
                    available = product.quantity,
                    "Insufficient stock"
                );
                return Err(OrderError::InsufficientStock(item.id.clone()));
            }
            Ok(OrderLineItem::new(item.id.clone(), item.quantity, product.price))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{CustomerClient, OrderClient, ProductClient};
    use crate::customer_actor::CustomerError;
    use crate::domain::{Customer, OrderCreate};
    use crate::mock_framework::{create_mock_client, expect_batch, expect_create, expect_delete, expect_get, expect_get_many};
    use crate::order_actor::LedgerError;
    use crate::product_actor::{ProductAction, ProductActionResult};
    use crate::actor_framework::{FrameworkError, ResourceRequest};
    use tokio::sync::mpsc;

    type Service = OrderPlacementService<CustomerClient, ProductClient, OrderClient>;

    struct Mocks {
        customers: mpsc::Receiver<ResourceRequest<Customer>>,
        products: mpsc::Receiver<ResourceRequest<Product>>,
        orders: mpsc::Receiver<ResourceRequest<Order>>,
    }

    fn mocked_service() -> (Service, Mocks) {
        let (customer_inner, customers) = create_mock_client::<Customer>(10);
        let (product_inner, products) = create_mock_client::<Product>(10);
        let (order_inner, orders) = create_mock_client::<Order>(10);
        let service = OrderPlacementService::new(
            CustomerClient::new(customer_inner),
            ProductClient::new(product_inner),
            OrderClient::new(order_inner),
        );
        (service, Mocks { customers, products, orders })
    }

    fn alice() -> Customer {
        Customer::new("c1", "Alice", "alice@example.com")
    }

    fn catalog() -> Vec<Product> {
        vec![Product::new("p1", "Pen", 10.0, 5), Product::new("p2", "Pad", 20.0, 0)]
    }

    fn record(params: OrderCreate) -> Order {
        Order {
            id: "order_1".into(),
            customer_id: params.customer_id,
            line_items: params.line_items,
        }
    }

    #[test]
    fn test_pricing_follows_request_order() {
        let resolved = vec![Product::new("p2", "Pad", 20.0, 3), Product::new("p1", "Pen", 10.0, 5)];
        let requested = vec![OrderItem::new("p1", 2), OrderItem::new("p2", 1)];
        let lines = price_line_items(&requested, &resolved).unwrap();
        assert_eq!(
            lines,
            vec![OrderLineItem::new("p1", 2, 10.0), OrderLineItem::new("p2", 1, 20.0)]
        );
    }

    #[test]
    fn test_pricing_reports_first_violation_in_request_order() {
        let requested = vec![
            OrderItem::new("p1", 9),
            OrderItem::new("missing", 1),
            OrderItem::new("p2", 1),
        ];
        let err = price_line_items(&requested, &catalog()).unwrap_err();
        assert_eq!(err, OrderError::InsufficientStock("p1".into()));

        let requested = vec![OrderItem::new("missing", 1), OrderItem::new("p2", 1)];
        let err = price_line_items(&requested, &catalog()).unwrap_err();
        assert_eq!(err, OrderError::ProductNotFound("missing".into()));
    }

    #[tokio::test]
    async fn test_unknown_customer_touches_nothing_else() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service.place_order(PlaceOrder::new("ghost", vec![OrderItem::new("p1", 1)])).await
        });

        let (id, responder) = expect_get(&mut mocks.customers).await.expect("Expected Customer Get");
        assert_eq!(id, "ghost");
        responder.send(Ok(None)).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::CustomerNotFound("ghost".into())));
        assert!(mocks.products.try_recv().is_err());
        assert!(mocks.orders.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_no_products_found() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service
                .place_order(PlaceOrder::new("c1", vec![OrderItem::new("x", 1), OrderItem::new("y", 2)]))
                .await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();

        let (ids, responder) = expect_get_many(&mut mocks.products).await.expect("Expected Product GetMany");
        assert_eq!(ids, vec!["x".to_string(), "y".to_string()]);
        responder.send(Ok(vec![])).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::NoProductsFound));
        assert!(mocks.orders.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_insufficient_stock_creates_no_order() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            let request = PlaceOrder::new("c1", vec![OrderItem::new("p1", 2), OrderItem::new("p2", 1)]);
            service.place_order(request).await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (_, responder) = expect_get_many(&mut mocks.products).await.unwrap();
        responder.send(Ok(catalog())).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::InsufficientStock("p2".into())));
        assert!(mocks.orders.try_recv().is_err());
        assert!(mocks.products.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_successful_flow_records_then_decrements() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service.place_order(PlaceOrder::new("c1", vec![OrderItem::new("p1", 2)])).await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (_, responder) = expect_get_many(&mut mocks.products).await.unwrap();
        responder.send(Ok(catalog())).unwrap();

        let (params, responder) = expect_create(&mut mocks.orders).await.expect("Expected Order Create");
        assert_eq!(params.customer_id, "c1");
        assert_eq!(params.line_items, vec![OrderLineItem::new("p1", 2, 10.0)]);
        responder.send(Ok(record(params))).unwrap();

        let (actions, responder) = expect_batch(&mut mocks.products).await.expect("Expected Product Batch");
        assert_eq!(actions, vec![("p1".to_string(), ProductAction::Decrement(2))]);
        responder.send(Ok(vec![ProductActionResult::Decrement(3)])).unwrap();

        let order = task.await.unwrap().unwrap();
        assert_eq!(order.id, "order_1");
        assert_eq!(order.line_items, vec![OrderLineItem::new("p1", 2, 10.0)]);
    }

    #[tokio::test]
    async fn test_lost_stock_race_discards_order() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service.place_order(PlaceOrder::new("c1", vec![OrderItem::new("p1", 2)])).await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (_, responder) = expect_get_many(&mut mocks.products).await.unwrap();
        responder.send(Ok(catalog())).unwrap();
        let (params, responder) = expect_create(&mut mocks.orders).await.unwrap();
        responder.send(Ok(record(params))).unwrap();

        let (_, responder) = expect_batch(&mut mocks.products).await.unwrap();
        responder
            .send(Err(FrameworkError::Rejected(ProductError::InsufficientStock {
                id: "p1".into(),
                requested: 2,
                available: 1,
            })))
            .unwrap();

        let (id, responder) = expect_delete(&mut mocks.orders).await.expect("Expected Order Delete");
        assert_eq!(id, "order_1");
        responder.send(Ok(())).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::InsufficientStock("p1".into())));
    }

    #[tokio::test]
    async fn test_decrement_fault_is_partial_failure() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service.place_order(PlaceOrder::new("c1", vec![OrderItem::new("p1", 1)])).await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (_, responder) = expect_get_many(&mut mocks.products).await.unwrap();
        responder.send(Ok(catalog())).unwrap();
        let (params, responder) = expect_create(&mut mocks.orders).await.unwrap();
        responder.send(Ok(record(params))).unwrap();

        // Catalog goes away before answering the decrement.
        let (_, responder) = expect_batch(&mut mocks.products).await.unwrap();
        drop(responder);

        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_partial_failure());
        assert_eq!(err.recorded_order().map(|o| o.id.as_str()), Some("order_1"));
        assert!(mocks.orders.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_discard_is_partial_failure() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service.place_order(PlaceOrder::new("c1", vec![OrderItem::new("p1", 1)])).await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (_, responder) = expect_get_many(&mut mocks.products).await.unwrap();
        responder.send(Ok(catalog())).unwrap();
        let (params, responder) = expect_create(&mut mocks.orders).await.unwrap();
        responder.send(Ok(record(params))).unwrap();
        let (_, responder) = expect_batch(&mut mocks.products).await.unwrap();
        responder
            .send(Err(FrameworkError::Rejected(ProductError::NotFound("p1".into()))))
            .unwrap();
        let (_, responder) = expect_delete(&mut mocks.orders).await.unwrap();
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_partial_failure());
    }

    #[tokio::test]
    async fn test_store_faults_propagate_unchanged() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service.place_order(PlaceOrder::new("c1", vec![OrderItem::new("p1", 1)])).await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (_, responder) = expect_get_many(&mut mocks.products).await.unwrap();
        responder.send(Ok(catalog())).unwrap();
        let (_, responder) = expect_create(&mut mocks.orders).await.unwrap();
        responder
            .send(Err(FrameworkError::Rejected(LedgerError::ValidationError("bad".into()))))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(OrderError::Ledger(LedgerError::ValidationError("bad".into())))
        );
        assert!(mocks.products.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_directory_is_customer_fault() {
        let (service, mocks) = mocked_service();
        drop(mocks);
        let err = service
            .place_order(PlaceOrder::new("c1", vec![OrderItem::new("p1", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Customer(CustomerError::ActorCommunicationError(_))));
    }

    #[test]
    fn test_zero_quantity_is_reported_in_request_order() {
        let requested = vec![OrderItem::new("missing", 1), OrderItem::new("p1", 0)];
        let err = price_line_items(&requested, &catalog()).unwrap_err();
        assert_eq!(err, OrderError::ProductNotFound("missing".into()));

        let requested = vec![OrderItem::new("p1", 0), OrderItem::new("p2", 1)];
        let err = price_line_items(&requested, &catalog()).unwrap_err();
        assert_eq!(err, OrderError::InvalidQuantity("p1".into()));
    }

    #[tokio::test]
    async fn test_zero_quantity_of_unknown_product_is_no_products_found() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service.place_order(PlaceOrder::new("c1", vec![OrderItem::new("nope", 0)])).await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (ids, responder) = expect_get_many(&mut mocks.products).await.expect("Expected Product GetMany");
        assert_eq!(ids, vec!["nope".to_string()]);
        responder.send(Ok(vec![])).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::NoProductsFound));
        assert!(mocks.orders.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_zero_quantity_creates_no_order() {
        let (service, mut mocks) = mocked_service();
        let task = tokio::spawn(async move {
            service
                .place_order(PlaceOrder::new("c1", vec![OrderItem::new("p1", 1), OrderItem::new("p1", 0)]))
                .await
        });

        let (_, responder) = expect_get(&mut mocks.customers).await.unwrap();
        responder.send(Ok(Some(alice()))).unwrap();
        let (_, responder) = expect_get_many(&mut mocks.products).await.unwrap();
        responder.send(Ok(catalog())).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::InvalidQuantity("p1".into())));
        assert!(mocks.orders.try_recv().is_err());
        assert!(mocks.products.try_recv().is_err());
    }
}
