use order_placement::app_system::{setup_tracing, OrderSystem, SystemConfig};
use order_placement::domain::{CustomerCreate, OrderItem, PlaceOrder, ProductCreate};
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = SystemConfig::load().map_err(|e| e.to_string())?;

    // Setup tracing once for the entire application
    setup_tracing(&config.logging);

    info!("Starting application with complete order system");

    // Create the entire order system (starts all actors)
    let system = OrderSystem::from_config(&config);

    let span = tracing::info_span!("customer_registration");
    let customer = async {
        info!("Registering test customer");
        system
            .customers
            .register(CustomerCreate::new("Alice", "alice@example.com"))
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(customer_id = %customer.id, "Customer registered successfully");

    let pen = system
        .products
        .register(ProductCreate::new("Pen", 10.0, 5))
        .await
        .map_err(|e| e.to_string())?;
    let pad = system
        .products
        .register(ProductCreate::new("Pad", 20.0, 0))
        .await
        .map_err(|e| e.to_string())?;

    info!(pen_id = %pen.id, pad_id = %pad.id, "Products registered successfully");

    // Rejected: the pad is out of stock, so nothing is recorded or taken
    let span = tracing::info_span!("order_processing", attempt = 1);
    let rejected = async {
        let request = PlaceOrder::new(
            customer.id.clone(),
            vec![OrderItem::new(pen.id.clone(), 2), OrderItem::new(pad.id.clone(), 1)],
        );
        system.placement.place_order(request).await
    }
    .instrument(span)
    .await;

    match rejected {
        Ok(order) => warn!(order_id = %order.id, "Order unexpectedly placed"),
        Err(e) => info!(error = %e, "Order rejected as expected"),
    }

    let span = tracing::info_span!("order_processing", attempt = 2);
    let placed = async {
        let request = PlaceOrder::new(customer.id.clone(), vec![OrderItem::new(pen.id.clone(), 2)]);
        system.placement.place_order(request).await
    }
    .instrument(span)
    .await;

    match placed {
        Ok(order) => info!(order_id = %order.id, total = order.total(), "Order processed successfully"),
        Err(e) if e.is_partial_failure() => error!(error = %e, "Order needs reconciliation"),
        Err(e) => error!(error = %e, "Order processing failed"),
    }

    let remaining = system
        .product_client
        .check_stock(pen.id.clone())
        .await
        .map_err(|e| e.to_string())?;
    info!(product_id = %pen.id, remaining, "Stock after ordering");

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
