use crate::config::ConfigError;
use crate::feed::FeedError;
use crate::orderbook::OrderBookError;
use crate::store::StoreError;
use crate::types::{ExchangeId, Symbol};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error(transparent)]
    OrderBook(#[from] OrderBookError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot initialise logging: {0}")]
    Logging(String),

    #[error("{exchange} {symbol} is already tracked")]
    AlreadyTracked { exchange: ExchangeId, symbol: Symbol },

    #[error("{exchange} {symbol} is not tracked")]
    NotTracked { exchange: ExchangeId, symbol: Symbol },

    #[error("book worker for {exchange} {symbol} has stopped")]
    WorkerClosed { exchange: ExchangeId, symbol: Symbol },
}
