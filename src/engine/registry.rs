use crate::engine::worker::{BookHandle, BookWorker, WorkerSettings};
use crate::error::AggregatorError;
use crate::orderbook::AggregatedBook;
use crate::store::{seed_updates, OrderStore};
use crate::types::{ExchangeId, Symbol};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Key of a tracked book
pub type BookKey = (ExchangeId, Symbol);

struct TrackedBook {
    handle: BookHandle,
    worker: JoinHandle<AggregatedBook>,
}

/// Every tracked instrument, each on its own worker.
///
/// Books share nothing, so the registry only hands out handles; all book
/// state stays inside the workers.
pub struct BookRegistry<S: OrderStore> {
    store: Arc<S>,
    settings: WorkerSettings,
    books: DashMap<BookKey, TrackedBook>,
}

impl<S: OrderStore> BookRegistry<S> {
    pub fn new(store: Arc<S>, settings: WorkerSettings) -> Self {
        Self {
            store,
            settings,
            books: DashMap::new(),
        }
    }

    /// Seed a book from the order store and start its worker.
    pub async fn track(
        &self,
        exchange: &str,
        symbol: &Symbol,
    ) -> Result<BookHandle, AggregatorError> {
        let key: BookKey = (exchange.to_string(), symbol.clone());
        if self.books.contains_key(&key) {
            return Err(already_tracked(key));
        }

        let orders = self.store.open_orders(symbol).await?;
        let updates = seed_updates(orders);
        let book = AggregatedBook::from_resting_orders(symbol.clone(), &updates)?.with_exchange(exchange);
        let (handle, worker) = BookWorker::spawn(book, self.settings);

        let tracked = TrackedBook {
            handle: handle.clone(),
            worker,
        };
        // Another caller may have tracked the same key while we were seeding
        let raced = match self.books.entry(key.clone()) {
            Entry::Occupied(_) => Some(tracked),
            Entry::Vacant(entry) => {
                entry.insert(tracked);
                None
            }
        };
        if let Some(duplicate) = raced {
            duplicate.handle.shutdown().await?;
            return Err(already_tracked(key));
        }

        info!(
            "Tracking {} {} with {} seeded own orders",
            exchange,
            symbol,
            updates.len()
        );
        Ok(handle)
    }

    pub fn handle(&self, exchange: &str, symbol: &Symbol) -> Option<BookHandle> {
        let key: BookKey = (exchange.to_string(), symbol.clone());
        self.books.get(&key).map(|tracked| tracked.handle.clone())
    }

    pub fn tracked(&self) -> Vec<BookKey> {
        let mut keys: Vec<BookKey> = self.books.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Stop tracking: drains the worker's queue and returns its final book.
    pub async fn untrack(
        &self,
        exchange: &str,
        symbol: &Symbol,
    ) -> Result<AggregatedBook, AggregatorError> {
        let key: BookKey = (exchange.to_string(), symbol.clone());
        let Some((key, tracked)) = self.books.remove(&key) else {
            return Err(AggregatorError::NotTracked {
                exchange: key.0,
                symbol: key.1,
            });
        };

        if let Err(err) = tracked.handle.shutdown().await {
            warn!("Worker for {} {} already gone: {}", key.0, key.1, err);
        }
        let book = tracked.worker.await.map_err(|_| AggregatorError::WorkerClosed {
            exchange: key.0.clone(),
            symbol: key.1.clone(),
        })?;
        info!("Stopped tracking {} {}", key.0, key.1);
        Ok(book)
    }

    /// Stop every worker
    pub async fn shutdown(&self) {
        for (exchange, symbol) in self.tracked() {
            if let Err(err) = self.untrack(&exchange, &symbol).await {
                warn!("Failed to stop {} {}: {}", exchange, symbol, err);
            }
        }
    }
}

fn already_tracked((exchange, symbol): BookKey) -> AggregatorError {
    AggregatorError::AlreadyTracked { exchange, symbol }
}
