/// Custom actions for Product entities.
///
/// Stock levels are owned by the catalog actor and change only through these
/// actions, each of which runs to completion inside the actor.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Removes units from stock.
    ///
    /// # Errors
    /// Fails without changing anything if the amount exceeds available stock.
    Decrement(u32),
    /// Returns units to stock.
    Restock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction.
/// Each carries the stock level after the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    Decrement(u32),
    Restock(u32),
}
