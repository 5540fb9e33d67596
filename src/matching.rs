//! Matching engine - top-of-book uncrossing with price-time priority.
//!
//! After every insertion the book is uncrossed: while the best bid price
//! is at or above the best ask price, the head orders of the two best
//! levels trade against each other at `min` of their remaining
//! quantities. Each trade records both legs at the participating order's
//! own limit price; the two prices differ when the aggressor improved on
//! the resting price.

use tracing::{debug, trace};

use crate::book::Book;
use crate::order::{LimitOrder, Price, Qty, Side, TimeInForce, Trade, TradeLeg};

impl Book {
    /// Submit a new order, matching it immediately where possible.
    ///
    /// Returns the trades produced, oldest first. Rejections are silent
    /// and leave the book untouched:
    /// - non-positive price or zero quantity,
    /// - an order ID that is currently resting,
    /// - a FOK order whose full quantity is not immediately executable.
    ///
    /// A GTC order with unfilled quantity rests at the tail of its level;
    /// an accepted FOK order is always fully consumed by matching.
    pub fn submit(&mut self, order: LimitOrder) -> Vec<Trade> {
        if order.price <= 0 || order.qty == 0 {
            debug!(
                id = order.id,
                price = order.price,
                qty = order.qty,
                "submit rejected, invalid parameters"
            );
            return Vec::new();
        }
        if self.contains(order.id) {
            debug!(id = order.id, "submit rejected, order ID already resting");
            return Vec::new();
        }
        if order.tif == TimeInForce::Fok && !self.fok_fillable(order.side, order.price, order.qty)
        {
            debug!(
                id = order.id,
                side = ?order.side,
                price = order.price,
                qty = order.qty,
                "FOK discarded, insufficient marketable quantity"
            );
            return Vec::new();
        }

        self.insert_resting(&order);
        debug!(
            id = order.id,
            side = ?order.side,
            tif = ?order.tif,
            price = order.price,
            qty = order.qty,
            "order accepted"
        );

        let trades = self.uncross();

        // The exact preflight guarantees an accepted FOK never rests.
        debug_assert!(
            order.tif != TimeInForce::Fok || !self.contains(order.id),
            "FOK order left resting after matching"
        );
        trades
    }

    /// Decide whether a FOK order can be filled in full right now.
    ///
    /// Walks the opposite side in price priority, summing remaining
    /// quantity over every marketable level until the order quantity is
    /// covered or the next level is no longer marketable. Only the
    /// complete sum justifies acceptance; checking the best price alone
    /// would admit orders that end up partially resting.
    fn fok_fillable(&self, side: Side, limit: Price, qty: Qty) -> bool {
        let target = u64::from(qty);
        let mut available = 0u64;

        match side {
            Side::Bid => {
                for (&price, level) in self.asks.iter() {
                    if price > limit {
                        break;
                    }
                    available += level.depth();
                    if available >= target {
                        return true;
                    }
                }
            }
            Side::Ask => {
                for (&price, level) in self.bids.iter().rev() {
                    if price < limit {
                        break;
                    }
                    available += level.depth();
                    if available >= target {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Trade the two best levels against each other until the book is
    /// one-sided or no longer crossed.
    fn uncross(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let Some((&bid_price, _)) = self.bids.last_key_value() else {
                break;
            };
            let Some((&ask_price, _)) = self.asks.first_key_value() else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            // Drain the two head queues against each other; when either
            // level empties, re-read the best prices from the maps.
            while let Some(trade) = self.cross_heads(bid_price, ask_price) {
                trades.push(trade);
            }
        }

        if !trades.is_empty() {
            debug!(count = trades.len(), "matching complete");
        }
        trades
    }

    /// Execute one trade between the head orders of the given bid and ask
    /// levels. Returns `None` once either level is gone.
    fn cross_heads(&mut self, bid_price: Price, ask_price: Price) -> Option<Trade> {
        let bid_idx = match self.bids.get(&bid_price) {
            Some(level) if !level.is_empty() => level.front(),
            _ => return None,
        };
        let ask_idx = match self.asks.get(&ask_price) {
            Some(level) if !level.is_empty() => level.front(),
            _ => return None,
        };

        let (bid_id, bid_remaining) = {
            let node = self.arena.get(bid_idx);
            (node.order_id, node.remaining)
        };
        let (ask_id, ask_remaining) = {
            let node = self.arena.get(ask_idx);
            (node.order_id, node.remaining)
        };

        let qty = bid_remaining.min(ask_remaining);

        trace!(
            bid = bid_id,
            ask = ask_id,
            bid_price,
            ask_price,
            qty,
            "trade executed"
        );

        // A fully filled head is unlinked while it still carries its
        // pre-trade remaining, so the level's depth drops by the whole
        // traded amount; a partial fill decrements the node and the
        // level aggregate by the trade quantity.
        if bid_remaining == qty {
            let level = self
                .bids
                .get_mut(&bid_price)
                .expect("crossed bid level must exist");
            let popped = level.pop_front(&mut self.arena);
            debug_assert_eq!(popped, Some(bid_idx));
            if level.is_empty() {
                self.bids.remove(&bid_price);
            }
            self.index.remove(&bid_id);
            self.arena.free(bid_idx);
        } else {
            self.arena.get_mut(bid_idx).remaining -= qty;
            self.bids
                .get_mut(&bid_price)
                .expect("crossed bid level must exist")
                .reduce(qty);
        }

        if ask_remaining == qty {
            let level = self
                .asks
                .get_mut(&ask_price)
                .expect("crossed ask level must exist");
            let popped = level.pop_front(&mut self.arena);
            debug_assert_eq!(popped, Some(ask_idx));
            if level.is_empty() {
                self.asks.remove(&ask_price);
            }
            self.index.remove(&ask_id);
            self.arena.free(ask_idx);
        } else {
            self.arena.get_mut(ask_idx).remaining -= qty;
            self.asks
                .get_mut(&ask_price)
                .expect("crossed ask level must exist")
                .reduce(qty);
        }

        Some(Trade {
            bid: TradeLeg {
                order_id: bid_id,
                price: bid_price,
                qty,
            },
            ask: TradeLeg {
                order_id: ask_id,
                price: ask_price,
                qty,
            },
        })
    }
}
