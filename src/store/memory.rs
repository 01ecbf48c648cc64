use crate::store::{OpenOrder, OrderStore, StoreError};
use crate::types::Symbol;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory order store for tests and file replays
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Symbol, Vec<OpenOrder>>>>,
    unavailable: Arc<RwLock<bool>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: OpenOrder) {
        let mut orders = self.orders.write().await;
        orders.entry(order.symbol.clone()).or_default().push(order);
    }

    /// Make every subsequent read fail, to exercise error paths
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn open_orders(&self, symbol: &Symbol) -> Result<Vec<OpenOrder>, StoreError> {
        if *self.unavailable.read().await {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        let orders = self.orders.read().await;
        Ok(orders.get(symbol).cloned().unwrap_or_default())
    }
}
