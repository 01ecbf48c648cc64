pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod logging;
pub mod orderbook;
pub mod store;
pub mod types;

pub use config::{AggregatorConfig, ConfigError, ReplayConfig};
pub use engine::{BookHandle, BookKey, BookRegistry, BookWorker, WorkerSettings};
pub use error::AggregatorError;
pub use feed::{DepthMessage, FeedError};
pub use logging::init_logging;
pub use orderbook::{
    AggregatedBook, LevelChanges, LocalOrderUpdate, Operation, OrderBookError, PriceLevel,
    PriceLevelBook, QuoteStream, Side, SideBook, Snapshot, SortOrder,
};
pub use store::{InMemoryOrderStore, OpenOrder, OrderSide, OrderState, OrderStore, StoreError};
pub use types::{ExchangeId, Price, Size, Symbol, Timestamp};
