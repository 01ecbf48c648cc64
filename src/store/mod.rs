pub mod memory;

pub use memory::InMemoryOrderStore;

use crate::orderbook::{LocalOrderUpdate, Side};
use crate::types::{Price, Size, Symbol, Timestamp};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side of one of our orders as the order store records it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl From<OrderSide> for Side {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Side::Bid,
            OrderSide::Sell => Side::Ask,
        }
    }
}

/// Lifecycle state of a stored order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Open,
    Cancelled,
    Completed,
}

/// One of our orders as held by the order store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub id: String,
    pub symbol: Symbol,
    pub price: Price,
    pub size: Size,
    pub side: OrderSide,
    pub timestamp: Timestamp,
    pub state: OrderState,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}

/// Source of our own resting orders, read once when a book is created.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Every order currently stored for `symbol`, any state.
    async fn open_orders(&self, symbol: &Symbol) -> Result<Vec<OpenOrder>, StoreError>;
}

/// Turn stored orders into the `Add` batch that seeds a local book.
///
/// Only `Open` orders are kept, oldest first. Orders may share a timestamp;
/// load the batch with [`AggregatedBook::from_resting_orders`] so none of
/// them is dropped as stale.
///
/// [`AggregatedBook::from_resting_orders`]: crate::orderbook::AggregatedBook::from_resting_orders
pub fn seed_updates(mut orders: Vec<OpenOrder>) -> Vec<LocalOrderUpdate> {
    let stored = orders.len();
    orders.retain(|order| order.state == OrderState::Open);
    orders.sort_by_key(|order| order.timestamp);
    debug!("Seeding {} of {} stored orders", orders.len(), stored);

    orders
        .into_iter()
        .map(|order| {
            LocalOrderUpdate::add(order.timestamp, order.side.into(), order.price, order.size)
        })
        .collect()
}
