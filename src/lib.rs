//! # Matchbook
//!
//! A single-instrument central limit order book with price-time-priority
//! matching.
//!
//! ## Design
//!
//! - **Single-Writer**: the book is owned exclusively by its caller;
//!   public operations run to completion with no interleaving
//! - **Price-time priority**: better price matches first, FIFO within a
//!   price level
//! - **Intrusive storage**: orders live in an index-addressed arena and
//!   are linked into per-price FIFO queues, so cancel is O(1) once the
//!   order ID is resolved
//!
//! ## Order lifetimes
//!
//! `GTC` orders rest until filled or cancelled. `FOK` orders trade in
//! full immediately or are discarded without touching the book; the
//! preflight walks the opposite side and sums marketable quantity before
//! accepting.

pub mod arena;
pub mod batch;
pub mod book;
pub mod matching;
pub mod menu;
pub mod order;
pub mod price_level;
pub mod snapshot;

// Re-exports for convenience
pub use arena::{Arena, ArenaIndex, OrderNode, NULL_INDEX};
pub use batch::{BatchSummary, Command, CommandError};
pub use book::Book;
pub use order::{LimitOrder, OrderId, Price, Qty, Side, TimeInForce, Trade, TradeLeg};
pub use price_level::PriceLevel;
pub use snapshot::{BookSnapshot, DepthLevel};
