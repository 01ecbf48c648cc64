use crate::orderbook::types::Side;
use crate::types::Price;
use std::cmp::Ordering;

/// Direction a side's levels are ranked in, best price first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Lowest price first (asks)
    Ascending,
    /// Highest price first (bids)
    Descending,
}

impl SortOrder {
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::Bid => SortOrder::Descending,
            Side::Ask => SortOrder::Ascending,
        }
    }

    /// `Less` when `a` ranks ahead of `b`.
    pub fn compare(self, a: &Price, b: &Price) -> Ordering {
        match self {
            SortOrder::Ascending => a.cmp(b),
            SortOrder::Descending => b.cmp(a),
        }
    }

    /// True when `a` ranks strictly ahead of `b`.
    pub fn is_better(self, a: &Price, b: &Price) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}
