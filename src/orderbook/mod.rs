pub mod aggregated;
pub mod error;
pub mod levels;
pub mod ordering;
pub mod side_book;
pub mod types;

pub use aggregated::AggregatedBook;
pub use error::OrderBookError;
pub use levels::{Levels, PriceLevelBook};
pub use ordering::SortOrder;
pub use side_book::{LevelChanges, SideBook};
pub use types::{LocalOrderUpdate, Operation, PriceLevel, QuoteStream, Side, Snapshot};
