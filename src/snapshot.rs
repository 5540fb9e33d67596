//! Read-only aggregated depth view of the book.

use crate::book::Book;
use crate::order::Price;

/// Total remaining quantity at one price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthLevel {
    pub price: Price,
    pub qty: u64,
}

/// Aggregated book depth: bid levels best-first (descending price) and
/// ask levels best-first (ascending price). Empty levels never appear.
#[derive(Clone, Debug, Default)]
pub struct BookSnapshot {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl Book {
    /// Aggregate the current book depth. Never mutates book state.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: self
                .bids
                .iter()
                .rev()
                .map(|(&price, level)| DepthLevel {
                    price,
                    qty: level.depth(),
                })
                .collect(),
            asks: self
                .asks
                .iter()
                .map(|(&price, level)| DepthLevel {
                    price,
                    qty: level.depth(),
                })
                .collect(),
        }
    }
}
