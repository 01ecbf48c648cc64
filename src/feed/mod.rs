//! Translation of venue depth messages into [`Snapshot`] and [`QuoteStream`].
//!
//! The venue sends
//! `{"action": "partial" | "update", "data": [{"bids": [...], "asks": [...]}]}`
//! where every level is an array of strings whose first two entries are
//! price and quantity. Trailing entries (order counts, venue sequence) are
//! ignored.

use crate::orderbook::{PriceLevel, QuoteStream, Snapshot};
use crate::types::{ExchangeId, Price, Size, Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed depth message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field} {value:?}: {source}")]
    InvalidDecimal {
        field: &'static str,
        value: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("level has {0} fields, price and quantity are required")]
    ShortLevel(usize),
}

/// Depth message as published by the venue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthMessage {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub data: Vec<DepthData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthData {
    #[serde(default)]
    pub asks: Vec<Vec<String>>,
    #[serde(default)]
    pub bids: Vec<Vec<String>>,
}

impl DepthMessage {
    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, FeedError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read the message as a full snapshot
    pub fn to_snapshot(
        &self,
        exchange_id: impl Into<ExchangeId>,
        symbol: impl Into<Symbol>,
        timestamp: Timestamp,
    ) -> Result<Snapshot, FeedError> {
        let (bids, asks) = self.levels()?;
        Ok(Snapshot::new(exchange_id, symbol, timestamp, bids, asks))
    }

    /// Read the message as an incremental update
    pub fn to_quote_stream(
        &self,
        exchange_id: impl Into<ExchangeId>,
        symbol: impl Into<Symbol>,
        timestamp: Timestamp,
    ) -> Result<QuoteStream, FeedError> {
        let (bids, asks) = self.levels()?;
        Ok(QuoteStream::new(exchange_id, symbol, timestamp, bids, asks))
    }

    fn levels(&self) -> Result<(Vec<PriceLevel>, Vec<PriceLevel>), FeedError> {
        let mut bids = Vec::new();
        let mut asks = Vec::new();
        for data in &self.data {
            for raw in &data.bids {
                bids.push(parse_level(raw)?);
            }
            for raw in &data.asks {
                asks.push(parse_level(raw)?);
            }
        }
        Ok((bids, asks))
    }
}

fn parse_level(raw: &[String]) -> Result<PriceLevel, FeedError> {
    let [price, quantity, ..] = raw else {
        return Err(FeedError::ShortLevel(raw.len()));
    };
    let price = Price::from_str(price).map_err(|source| FeedError::InvalidDecimal {
        field: "price",
        value: price.clone(),
        source,
    })?;
    let size = Size::from_str(quantity).map_err(|source| FeedError::InvalidDecimal {
        field: "quantity",
        value: quantity.clone(),
        source,
    })?;
    Ok(PriceLevel::new(price, size))
}
