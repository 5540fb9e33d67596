//! Book - the central limit order book.
//!
//! Two price-sorted side maps (bids best = highest, asks best = lowest)
//! hold FIFO queues of arena nodes, and a hash index maps order IDs to
//! their node for O(1) cancellation. All public operations leave the book
//! uncrossed: `best_bid < best_ask` whenever both sides are non-empty.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::arena::{Arena, ArenaIndex};
use crate::order::{LimitOrder, OrderId, Price, Qty, Side, Trade};
use crate::price_level::PriceLevel;

/// Central limit order book with price-time priority matching.
pub struct Book {
    pub(crate) arena: Arena,
    /// Bid levels; `last_key_value` is the best (highest) bid
    pub(crate) bids: BTreeMap<Price, PriceLevel>,
    /// Ask levels; `first_key_value` is the best (lowest) ask
    pub(crate) asks: BTreeMap<Price, PriceLevel>,
    /// Resting orders by ID
    pub(crate) index: FxHashMap<OrderId, ArenaIndex>,
}

impl Book {
    /// Create an empty book.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: FxHashMap::default(),
        }
    }

    /// Create an empty book with storage pre-sized for `orders` resting
    /// orders.
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            arena: Arena::with_capacity(orders),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: FxHashMap::with_capacity_and_hasher(orders, Default::default()),
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Highest-priced resting bid.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.last_key_value().map(|(&price, _)| price)
    }

    /// Lowest-priced resting ask.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(&price, _)| price)
    }

    /// Number of resting orders across both sides.
    #[inline]
    pub fn size(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether an order with this ID is currently resting.
    #[inline]
    pub fn contains(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    /// Remaining quantity of a resting order, if present.
    pub fn remaining_qty(&self, id: OrderId) -> Option<Qty> {
        self.index.get(&id).map(|&idx| self.arena.get(idx).remaining)
    }

    // ========================================================================
    // Mutating operations (submit lives in matching.rs)
    // ========================================================================

    /// Remove a resting order.
    ///
    /// Unknown IDs are a silent no-op. Never produces trades.
    pub fn cancel(&mut self, id: OrderId) {
        let Some(idx) = self.index.remove(&id) else {
            debug!(id, "cancel ignored, order not resting");
            return;
        };

        let node = self.arena.get(idx);
        let (side, price, remaining) = (node.side, node.price, node.remaining);

        let level = match side {
            Side::Bid => self.bids.get_mut(&price),
            Side::Ask => self.asks.get_mut(&price),
        };
        let emptied = level
            .expect("resting order must have a level")
            .unlink(&mut self.arena, idx);
        if emptied {
            match side {
                Side::Bid => self.bids.remove(&price),
                Side::Ask => self.asks.remove(&price),
            };
        }
        self.arena.free(idx);

        debug!(id, ?side, price, remaining, "order cancelled");
    }

    /// Replace a resting order with new parameters, preserving its
    /// original time-in-force.
    ///
    /// Semantically cancel-and-resubmit: the replacement joins the tail of
    /// its new level, so the original time priority is lost. Returns the
    /// trades produced by the re-submission. Unknown IDs and invalid
    /// parameters are a no-op returning no trades - validation happens
    /// before the cancel, so a malformed amend leaves the original order
    /// resting untouched.
    pub fn amend(&mut self, id: OrderId, side: Side, price: Price, qty: Qty) -> Vec<Trade> {
        if price <= 0 || qty == 0 {
            debug!(id, price, qty, "amend rejected, invalid parameters");
            return Vec::new();
        }
        let Some(&idx) = self.index.get(&id) else {
            debug!(id, "amend ignored, order not resting");
            return Vec::new();
        };
        let tif = self.arena.get(idx).tif;

        self.cancel(id);
        self.submit(LimitOrder {
            id,
            side,
            tif,
            price,
            qty,
        })
    }

    // ========================================================================
    // Internal plumbing shared with the matching engine
    // ========================================================================

    /// Rest an order at the tail of its level, creating the level if
    /// absent, and register it in the order index.
    pub(crate) fn insert_resting(&mut self, order: &LimitOrder) -> ArenaIndex {
        let idx = self.arena.alloc();
        let node = self.arena.get_mut(idx);
        node.order_id = order.id;
        node.side = order.side;
        node.tif = order.tif;
        node.price = order.price;
        node.remaining = order.qty;
        node.initial = order.qty;

        let level = match order.side {
            Side::Bid => self.bids.entry(order.price).or_default(),
            Side::Ask => self.asks.entry(order.price).or_default(),
        };
        level.push_back(&mut self.arena, idx);
        self.index.insert(order.id, idx);
        idx
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Book")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("orders", &self.index.len())
            .finish()
    }
}
