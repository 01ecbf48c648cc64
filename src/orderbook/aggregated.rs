use crate::orderbook::error::OrderBookError;
use crate::orderbook::side_book::{SideBook, Staleness};
use crate::orderbook::types::{LocalOrderUpdate, PriceLevel, QuoteStream, Side, Snapshot};
use crate::types::{ExchangeId, Price, Size, Symbol, Timestamp};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;

/// Public depth merged with our own resting orders for one instrument.
///
/// `local` holds only our orders. `aggregated` holds, per price, the venue's
/// size plus ours. The venue's own depth is never stored separately: it is
/// implied by `aggregated - local`.
///
/// Not thread-safe. Every mutating call and every read that must be
/// consistent has to go through one serializer per instrument, such as the
/// [`BookWorker`](crate::engine::BookWorker) or a mutex around the book.
#[derive(Debug, Clone)]
pub struct AggregatedBook {
    exchange: ExchangeId,
    symbol: Symbol,
    timestamp: Timestamp,
    local: SideBook,
    aggregated: SideBook,
    has_snapshot: bool,
}

impl AggregatedBook {
    /// Build the local book from an initial batch of our own orders.
    /// The merged view stays empty until the first snapshot.
    pub fn create(
        symbol: impl Into<Symbol>,
        initial_local_orders: &[LocalOrderUpdate],
    ) -> Result<Self, OrderBookError> {
        let mut local = SideBook::new();
        local.apply_order_updates(initial_local_orders)?;
        Ok(Self::with_local(symbol.into(), local))
    }

    /// Build the local book from the resting orders an order store reports.
    ///
    /// Unlike [`create`](Self::create), orders sharing a timestamp are all
    /// kept: they are distinct orders that rest together, not replays.
    pub fn from_resting_orders(
        symbol: impl Into<Symbol>,
        resting_orders: &[LocalOrderUpdate],
    ) -> Result<Self, OrderBookError> {
        let mut local = SideBook::new();
        local.seed_order_updates(resting_orders)?;
        Ok(Self::with_local(symbol.into(), local))
    }

    fn with_local(symbol: Symbol, local: SideBook) -> Self {
        info!(
            "Created aggregated book for {} with {} own bid levels and {} own ask levels",
            symbol,
            local.bids().len(),
            local.asks().len()
        );
        Self {
            exchange: ExchangeId::new(),
            symbol,
            timestamp: local.last_applied().unwrap_or(0),
            local,
            aggregated: SideBook::new(),
            has_snapshot: false,
        }
    }

    pub fn with_exchange(mut self, exchange: impl Into<ExchangeId>) -> Self {
        self.exchange = exchange.into();
        self
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Timestamp of the last event that changed either book
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn has_snapshot(&self) -> bool {
        self.has_snapshot
    }

    pub fn local(&self) -> &SideBook {
        &self.local
    }

    pub fn aggregated(&self) -> &SideBook {
        &self.aggregated
    }

    /// Rebuild the merged view from a full snapshot, then fold our own
    /// orders back in. Emits nothing.
    ///
    /// A snapshot whose merged sizes leave the decimal range is dropped and
    /// the previous merged view is kept.
    pub fn ingest_snapshot(&mut self, snapshot: &Snapshot) {
        let mut aggregated = SideBook::new();
        aggregated.replace_from_snapshot(snapshot);
        if let Err(err) = aggregated.fold_in(&self.local) {
            error!(
                "Dropping snapshot for {} {} at {}: {}",
                snapshot.exchange_id, self.symbol, snapshot.timestamp, err
            );
            return;
        }

        if !snapshot.exchange_id.is_empty() {
            self.exchange = snapshot.exchange_id.clone();
        }
        self.timestamp = snapshot.timestamp;
        self.aggregated = aggregated;
        self.has_snapshot = true;

        info!(
            "Resynchronized {} {} from snapshot at {}: {} bid levels, {} ask levels",
            self.exchange,
            self.symbol,
            snapshot.timestamp,
            self.aggregated.bids().len(),
            self.aggregated.asks().len()
        );
    }

    /// Apply an incremental venue update carrying absolute sizes.
    ///
    /// The whole stream is discarded when its timestamp does not advance the
    /// merged view, or when no snapshot has been applied yet. Otherwise every
    /// touched level is emitted with its merged size, zero included.
    pub fn ingest_quote_stream(
        &mut self,
        stream: &QuoteStream,
    ) -> Result<Option<QuoteStream>, OrderBookError> {
        if !self.has_snapshot {
            debug!(
                "Discarding quote stream for {} at {}: no snapshot yet",
                self.symbol, stream.timestamp
            );
            return Ok(None);
        }
        if self.aggregated.is_stale(stream.timestamp) {
            debug!(
                "Discarding stale quote stream for {} at {} (last applied {:?})",
                self.symbol,
                stream.timestamp,
                self.aggregated.last_applied()
            );
            return Ok(None);
        }

        for side in Side::BOTH {
            if let Some(level) = stream.levels(side).iter().find(|l| l.size.is_negative()) {
                warn!(
                    "Rejecting quote stream for {} at {}: negative size {} at {} {}",
                    self.symbol, stream.timestamp, level.size, side, level.price
                );
                return Err(OrderBookError::InvalidQuantity {
                    side,
                    price: level.price,
                    size: level.size,
                });
            }
        }

        let mut emitted = QuoteStream::new(
            self.exchange.clone(),
            self.symbol.clone(),
            stream.timestamp,
            Vec::with_capacity(stream.bids.len()),
            Vec::with_capacity(stream.asks.len()),
        );
        for side in Side::BOTH {
            let out = match side {
                Side::Bid => &mut emitted.bids,
                Side::Ask => &mut emitted.asks,
            };
            for level in stream.levels(side) {
                let own = self.local.quantity(side, &level.price).unwrap_or(Size::ZERO);
                let merged = level.size.checked_add(own).ok_or(OrderBookError::InvalidQuantity {
                    side,
                    price: level.price,
                    size: level.size,
                })?;
                out.push(PriceLevel::new(level.price, merged));
            }
        }

        // Every merged size is known, nothing below can fail
        self.aggregated.set_last_applied(stream.timestamp);
        self.timestamp = stream.timestamp;
        for side in Side::BOTH {
            for level in emitted.levels(side) {
                self.aggregated.book_mut(side).write(level.price, level.size);
            }
        }

        Ok(Some(emitted))
    }

    /// Apply a batch of our own order changes to both books.
    ///
    /// The local book decides which updates are stale; exactly those it
    /// accepts are replayed onto the merged view. Either both books change
    /// or neither does. Returns `None` when nothing observable changed.
    pub fn ingest_local_order_updates(
        &mut self,
        orders: &[LocalOrderUpdate],
    ) -> Result<Option<QuoteStream>, OrderBookError> {
        let staged_local = self
            .local
            .stage(orders, Staleness::Enforce)
            .inspect_err(|err| warn!("Rejecting local order batch for {}: {}", self.symbol, err))?;

        if !self.has_snapshot {
            // The next snapshot folds the local book in
            let latest = staged_local.latest_timestamp();
            self.local.commit(staged_local);
            if let Some(latest) = latest {
                self.timestamp = self.timestamp.max(latest);
            }
            return Ok(None);
        }

        let staged_aggregated = self
            .aggregated
            .stage(staged_local.accepted(), Staleness::Ignore)
            .inspect_err(|err| {
                warn!(
                    "Merged view for {} out of step with local book: {}",
                    self.symbol, err
                )
            })?;

        let latest = staged_local.latest_timestamp();
        self.local.commit(staged_local);
        let changes = self.aggregated.commit(staged_aggregated);

        let Some(latest) = latest else {
            return Ok(None);
        };
        self.timestamp = self.timestamp.max(latest);
        if changes.is_empty() {
            return Ok(None);
        }

        Ok(Some(QuoteStream::new(
            self.exchange.clone(),
            self.symbol.clone(),
            latest,
            changes.bids,
            changes.asks,
        )))
    }

    /// Point-in-time read of the merged view, best prices first.
    pub fn current_aggregated_snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.exchange.clone(),
            self.symbol.clone(),
            self.timestamp,
            self.aggregated.bids().to_levels(),
            self.aggregated.asks().to_levels(),
        )
    }

    /// The venue's own size at a level: merged minus ours.
    pub fn external_quantity(&self, side: Side, price: &Price) -> Size {
        let merged = self.aggregated.quantity(side, price).unwrap_or(Size::ZERO);
        let own = self.local.quantity(side, price).unwrap_or(Size::ZERO);
        merged - own
    }

    pub fn best_bid(&self) -> Option<(Price, Size)> {
        self.aggregated.bids().best()
    }

    pub fn best_ask(&self) -> Option<(Price, Size)> {
        self.aggregated.asks().best()
    }

    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => bid.checked_add(ask).map(|sum| sum / Decimal::TWO),
            _ => None,
        }
    }

    /// Cumulative merged size at or better than `limit` on one side
    pub fn depth_to(&self, side: Side, limit: &Price) -> Size {
        self.aggregated.book(side).depth_to(limit)
    }
}
