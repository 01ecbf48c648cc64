use crate::orderbook::types::Side;
use crate::types::{Price, Size};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderBookError {
    /// A delete asked for more than we hold at the level (including nothing).
    #[error("invalid local order state: cannot delete {requested} at {side} {price}, holding {held}")]
    InvalidLocalOrderState {
        side: Side,
        price: Price,
        held: Size,
        requested: Size,
    },

    #[error("invalid quantity {size} at {side} {price}")]
    InvalidQuantity { side: Side, price: Price, size: Size },
}
