use crate::orderbook::error::OrderBookError;
use crate::orderbook::levels::{Levels, PriceLevelBook};
use crate::orderbook::types::{LocalOrderUpdate, Operation, PriceLevel, Side, Snapshot};
use crate::types::{Price, Size, Timestamp};
use log::{debug, warn};
use std::collections::HashMap;

/// Per-side lists of levels touched by an update, in application order.
/// Every entry carries the level's new absolute size; zero means removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelChanges {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl LevelChanges {
    pub fn push(&mut self, side: Side, level: PriceLevel) {
        match side {
            Side::Bid => self.bids.push(level),
            Side::Ask => self.asks.push(level),
        }
    }

    pub fn side(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Whether staging drops updates that do not advance `last_applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Staleness {
    Enforce,
    Ignore,
}

/// A fully validated batch of own-order updates, not yet written.
#[derive(Debug)]
pub(crate) struct StagedOrders {
    accepted: Vec<LocalOrderUpdate>,
    changes: LevelChanges,
    last_applied: Option<Timestamp>,
}

impl StagedOrders {
    pub(crate) fn accepted(&self) -> &[LocalOrderUpdate] {
        &self.accepted
    }

    pub(crate) fn latest_timestamp(&self) -> Option<Timestamp> {
        self.accepted.iter().map(|order| order.timestamp).max()
    }
}

/// Bid and ask levels plus the timestamp of the last update applied.
///
/// Used both for our own resting orders and for the merged view.
#[derive(Debug, Clone)]
pub struct SideBook {
    bids: PriceLevelBook,
    asks: PriceLevelBook,
    last_applied: Option<Timestamp>,
}

impl Default for SideBook {
    fn default() -> Self {
        Self::new()
    }
}

impl SideBook {
    pub fn new() -> Self {
        Self {
            bids: PriceLevelBook::new(Side::Bid),
            asks: PriceLevelBook::new(Side::Ask),
            last_applied: None,
        }
    }

    pub fn book(&self, side: Side) -> &PriceLevelBook {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    pub(crate) fn book_mut(&mut self, side: Side) -> &mut PriceLevelBook {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    pub fn bids(&self) -> &PriceLevelBook {
        &self.bids
    }

    pub fn asks(&self) -> &PriceLevelBook {
        &self.asks
    }

    pub fn levels(&self, side: Side) -> Levels<'_> {
        self.book(side).iter()
    }

    pub fn quantity(&self, side: Side, price: &Price) -> Option<Size> {
        self.book(side).quantity(price)
    }

    pub fn last_applied(&self) -> Option<Timestamp> {
        self.last_applied
    }

    pub(crate) fn set_last_applied(&mut self, timestamp: Timestamp) {
        self.last_applied = Some(timestamp);
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// True when `timestamp` does not advance `last_applied`.
    pub fn is_stale(&self, timestamp: Timestamp) -> bool {
        self.last_applied.is_some_and(|last| timestamp <= last)
    }

    /// Upsert every level the snapshot states.
    ///
    /// Levels already held but absent from the snapshot are kept. Zero-size
    /// levels are skipped, negative ones are skipped with a warning.
    pub fn replace_from_snapshot(&mut self, snapshot: &Snapshot) {
        for side in Side::BOTH {
            for level in snapshot.levels(side) {
                if level.size.is_zero() {
                    continue;
                }
                if let Err(err) = self.book_mut(side).upsert(level.price, level.size) {
                    warn!(
                        "Skipping snapshot level for {} {}: {}",
                        snapshot.exchange_id, snapshot.symbol, err
                    );
                }
            }
        }
        self.last_applied = Some(snapshot.timestamp);
    }

    /// Apply own-order updates in sequence order.
    ///
    /// Updates whose timestamp does not advance `last_applied` are skipped.
    /// The batch is atomic: if any update is invalid nothing is written.
    pub fn apply_order_updates(
        &mut self,
        orders: &[LocalOrderUpdate],
    ) -> Result<LevelChanges, OrderBookError> {
        let staged = self.stage(orders, Staleness::Enforce)?;
        Ok(self.commit(staged))
    }

    /// Load a seed batch of resting orders.
    ///
    /// Resting orders often share a timestamp, so none is skipped as stale.
    /// `last_applied` ends at the newest seed timestamp.
    pub fn seed_order_updates(
        &mut self,
        orders: &[LocalOrderUpdate],
    ) -> Result<LevelChanges, OrderBookError> {
        let staged = self.stage(orders, Staleness::Ignore)?;
        let latest = staged.latest_timestamp();
        let changes = self.commit(staged);
        if let Some(latest) = latest {
            self.last_applied = Some(self.last_applied.map_or(latest, |last| last.max(latest)));
        }
        Ok(changes)
    }

    /// Validate a batch against the current levels without writing anything.
    pub(crate) fn stage(
        &self,
        orders: &[LocalOrderUpdate],
        staleness: Staleness,
    ) -> Result<StagedOrders, OrderBookError> {
        // Sizes written earlier in this batch shadow the stored levels
        let mut pending: HashMap<(Side, Price), Size> = HashMap::new();
        let mut staged = StagedOrders {
            accepted: Vec::with_capacity(orders.len()),
            changes: LevelChanges::default(),
            last_applied: self.last_applied,
        };

        for order in orders {
            if staleness == Staleness::Enforce
                && staged.last_applied.is_some_and(|last| order.timestamp <= last)
            {
                debug!(
                    "Skipping stale local order at {} {} (ts {})",
                    order.side, order.price, order.timestamp
                );
                continue;
            }

            if !order.size.is_positive() {
                return Err(OrderBookError::InvalidQuantity {
                    side: order.side,
                    price: order.price,
                    size: order.size,
                });
            }

            let key = (order.side, order.price);
            let held = pending
                .get(&key)
                .copied()
                .or_else(|| self.quantity(order.side, &order.price))
                .filter(Size::is_positive);

            let updated = match order.operation {
                Operation::Add => held
                    .unwrap_or(Size::ZERO)
                    .checked_add(order.size)
                    .ok_or(OrderBookError::InvalidQuantity {
                        side: order.side,
                        price: order.price,
                        size: order.size,
                    })?,
                Operation::Delete => {
                    let remaining = held.and_then(|held| held.checked_sub(order.size));
                    match remaining {
                        Some(remaining) if !remaining.is_negative() => remaining,
                        _ => {
                            return Err(OrderBookError::InvalidLocalOrderState {
                                side: order.side,
                                price: order.price,
                                held: held.unwrap_or(Size::ZERO),
                                requested: order.size,
                            })
                        }
                    }
                }
            };

            pending.insert(key, updated);
            staged
                .changes
                .push(order.side, PriceLevel::new(order.price, updated));
            staged.accepted.push(*order);
            if staleness == Staleness::Enforce {
                staged.last_applied = Some(order.timestamp);
            }
        }

        Ok(staged)
    }

    /// Write a staged batch. Cannot fail.
    pub(crate) fn commit(&mut self, staged: StagedOrders) -> LevelChanges {
        for side in Side::BOTH {
            for level in staged.changes.side(side) {
                self.book_mut(side).write(level.price, level.size);
            }
        }
        self.last_applied = staged.last_applied;
        staged.changes
    }

    /// Add every level of `other` onto the matching level here.
    ///
    /// Fails without writing anything if a sum leaves the decimal range.
    pub(crate) fn fold_in(&mut self, other: &SideBook) -> Result<(), OrderBookError> {
        let mut sums = Vec::new();
        for side in Side::BOTH {
            for (price, size) in other.levels(side) {
                let held = self.quantity(side, &price).unwrap_or(Size::ZERO);
                let merged = held
                    .checked_add(size)
                    .ok_or(OrderBookError::InvalidQuantity { side, price, size })?;
                sums.push((side, price, merged));
            }
        }
        for (side, price, merged) in sums {
            self.book_mut(side).write(price, merged);
        }
        Ok(())
    }
}
