use crate::orderbook::error::OrderBookError;
use crate::orderbook::ordering::SortOrder;
use crate::orderbook::types::{PriceLevel, Side};
use crate::types::{Price, Size};
use smallvec::SmallVec;
use std::collections::btree_set;
use std::collections::{BTreeSet, HashMap};

/// Price levels for one side of a book.
///
/// Prices are kept in a `BTreeSet` for ordered walks and sizes in a
/// `HashMap` for point lookups. Both are private so they cannot drift apart,
/// and no level is ever stored with a zero size.
#[derive(Debug, Clone)]
pub struct PriceLevelBook {
    side: Side,
    order: SortOrder,
    prices: BTreeSet<Price>,
    sizes: HashMap<Price, Size>,
}

impl PriceLevelBook {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            order: SortOrder::for_side(side),
            prices: BTreeSet::new(),
            sizes: HashMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order
    }

    /// Insert or overwrite the level at `price`.
    ///
    /// Sizes that are not strictly positive are rejected and the book is left
    /// unchanged.
    pub fn upsert(&mut self, price: Price, size: Size) -> Result<(), OrderBookError> {
        if !size.is_positive() {
            return Err(OrderBookError::InvalidQuantity {
                side: self.side,
                price,
                size,
            });
        }
        self.prices.insert(price);
        self.sizes.insert(price, size);
        Ok(())
    }

    /// Remove the level at `price`. Absent levels are ignored.
    pub fn remove(&mut self, price: &Price) -> Option<Size> {
        self.prices.remove(price);
        self.sizes.remove(price)
    }

    /// Write a size already known to be non-negative: zero removes the level.
    pub(crate) fn write(&mut self, price: Price, size: Size) {
        if size.is_positive() {
            self.prices.insert(price);
            self.sizes.insert(price, size);
        } else {
            self.remove(&price);
        }
    }

    pub fn quantity(&self, price: &Price) -> Option<Size> {
        self.sizes.get(price).copied()
    }

    pub fn contains(&self, price: &Price) -> bool {
        self.sizes.contains_key(price)
    }

    /// Levels best price first. Each call starts a fresh walk.
    pub fn iter(&self) -> Levels<'_> {
        Levels {
            prices: self.prices.iter(),
            sizes: &self.sizes,
            order: self.order,
        }
    }

    pub fn best(&self) -> Option<(Price, Size)> {
        self.iter().next()
    }

    /// Top N levels. Uses SmallVec so the common shallow read stays on the stack.
    pub fn top(&self, n: usize) -> SmallVec<[(Price, Size); 20]> {
        self.iter().take(n).collect()
    }

    /// Cumulative size of every level at or better than `limit`.
    pub fn depth_to(&self, limit: &Price) -> Size {
        self.iter()
            .take_while(|(price, _)| !self.order.is_better(limit, price))
            .map(|(_, size)| size)
            .sum()
    }

    pub fn total_size(&self) -> Size {
        self.sizes.values().copied().sum()
    }

    pub fn to_levels(&self) -> Vec<PriceLevel> {
        self.iter().map(PriceLevel::from).collect()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
        self.sizes.clear();
    }
}

/// Ordered walk over a [`PriceLevelBook`], best price first.
#[derive(Debug, Clone)]
pub struct Levels<'a> {
    prices: btree_set::Iter<'a, Price>,
    sizes: &'a HashMap<Price, Size>,
    order: SortOrder,
}

impl<'a> Levels<'a> {
    fn lookup(&self, price: &Price) -> Option<(Price, Size)> {
        self.sizes.get(price).map(|size| (*price, *size))
    }
}

impl<'a> Iterator for Levels<'a> {
    type Item = (Price, Size);

    fn next(&mut self) -> Option<Self::Item> {
        let price = match self.order {
            SortOrder::Ascending => self.prices.next(),
            SortOrder::Descending => self.prices.next_back(),
        }?;
        self.lookup(price)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.prices.size_hint()
    }
}

impl<'a> DoubleEndedIterator for Levels<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let price = match self.order {
            SortOrder::Ascending => self.prices.next_back(),
            SortOrder::Descending => self.prices.next(),
        }?;
        self.lookup(price)
    }
}

impl<'a> ExactSizeIterator for Levels<'a> {}

impl<'a> IntoIterator for &'a PriceLevelBook {
    type Item = (Price, Size);
    type IntoIter = Levels<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
