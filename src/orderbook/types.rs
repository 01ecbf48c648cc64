use crate::types::{ExchangeId, Price, Size, Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Bid, Side::Ask];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// What a [`LocalOrderUpdate`] does to the resting size at its price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Delete,
}

/// Order book level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub size: Size,
}

impl PriceLevel {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

impl From<(Price, Size)> for PriceLevel {
    fn from((price, size): (Price, Size)) -> Self {
        Self { price, size }
    }
}

/// One change to our own resting liquidity at a price.
///
/// `size` is always positive; `operation` decides whether it is added to or
/// taken from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOrderUpdate {
    pub timestamp: Timestamp,
    pub side: Side,
    pub price: Price,
    pub size: Size,
    pub operation: Operation,
}

impl LocalOrderUpdate {
    pub fn new(
        timestamp: Timestamp,
        side: Side,
        price: Price,
        size: Size,
        operation: Operation,
    ) -> Self {
        Self {
            timestamp,
            side,
            price,
            size,
            operation,
        }
    }

    pub fn add(timestamp: Timestamp, side: Side, price: Price, size: Size) -> Self {
        Self::new(timestamp, side, price, size, Operation::Add)
    }

    pub fn delete(timestamp: Timestamp, side: Side, price: Price, size: Size) -> Self {
        Self::new(timestamp, side, price, size, Operation::Delete)
    }
}

/// Full statement of observed depth at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub exchange_id: ExchangeId,
    pub symbol: Symbol,
    pub timestamp: Timestamp,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl Snapshot {
    pub fn new(
        exchange_id: impl Into<ExchangeId>,
        symbol: impl Into<Symbol>,
        timestamp: Timestamp,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            symbol: symbol.into(),
            timestamp,
            bids,
            asks,
        }
    }

    pub fn levels(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }
}

/// Incremental depth update.
///
/// Each level carries the new absolute size at its price; a zero size means
/// the level is gone. Emitted deltas use the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteStream {
    pub exchange_id: ExchangeId,
    pub symbol: Symbol,
    pub timestamp: Timestamp,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl QuoteStream {
    pub fn new(
        exchange_id: impl Into<ExchangeId>,
        symbol: impl Into<Symbol>,
        timestamp: Timestamp,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            symbol: symbol.into(),
            timestamp,
            bids,
            asks,
        }
    }

    pub fn levels(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
