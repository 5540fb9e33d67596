//! Core vocabulary: prices, quantities, order identity and trade records.

/// Price in minor currency units (e.g. cents). Strictly positive for any
/// order accepted by the book.
pub type Price = i32;

/// Order quantity in units. Strictly positive on submission and
/// non-increasing over an order's life.
pub type Qty = u32;

/// Opaque client-assigned order identifier.
pub type OrderId = u64;

/// Order side (bid = buy, ask = sell)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Bid = 0,
    /// Sell side (asks)
    Ask = 1,
}

/// Order lifetime policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TimeInForce {
    /// Good-till-cancelled: rests until filled or cancelled (default)
    #[default]
    Gtc = 0,
    /// Fill-or-kill: the entire quantity must trade at submission time,
    /// otherwise the order is discarded without trading
    Fok = 1,
}

/// A limit order as submitted to the book.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitOrder {
    /// Client-assigned order ID
    pub id: OrderId,
    /// Order side (bid/ask)
    pub side: Side,
    /// Lifetime policy (GTC or FOK)
    pub tif: TimeInForce,
    /// Limit price in minor units
    pub price: Price,
    /// Initial quantity
    pub qty: Qty,
}

impl LimitOrder {
    /// Create a good-till-cancelled order (most common case)
    #[inline]
    pub const fn gtc(id: OrderId, side: Side, price: Price, qty: Qty) -> Self {
        Self {
            id,
            side,
            tif: TimeInForce::Gtc,
            price,
            qty,
        }
    }

    /// Create a fill-or-kill order
    #[inline]
    pub const fn fok(id: OrderId, side: Side, price: Price, qty: Qty) -> Self {
        Self {
            id,
            side,
            tif: TimeInForce::Fok,
            price,
            qty,
        }
    }
}

/// One side of an executed trade.
///
/// `price` is the participating order's own limit price. The two legs of a
/// [`Trade`] may carry different prices when the book was crossed; price
/// selection is left to consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TradeLeg {
    pub order_id: OrderId,
    pub price: Price,
    pub qty: Qty,
}

/// A single matching event between a resting bid and a resting ask.
///
/// Both legs always carry the same executed quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trade {
    /// Buyer side of the execution
    pub bid: TradeLeg,
    /// Seller side of the execution
    pub ask: TradeLeg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_constructors() {
        let gtc = LimitOrder::gtc(1, Side::Bid, 100, 50);
        assert_eq!(gtc.tif, TimeInForce::Gtc);
        assert_eq!(gtc.price, 100);

        let fok = LimitOrder::fok(2, Side::Ask, 101, 25);
        assert_eq!(fok.tif, TimeInForce::Fok);
        assert_eq!(fok.side, Side::Ask);
    }

    #[test]
    fn test_tif_default() {
        assert_eq!(TimeInForce::default(), TimeInForce::Gtc);
    }

    #[test]
    fn test_trade_legs_share_qty() {
        let trade = Trade {
            bid: TradeLeg {
                order_id: 1,
                price: 101,
                qty: 10,
            },
            ask: TradeLeg {
                order_id: 2,
                price: 100,
                qty: 10,
            },
        };
        assert_eq!(trade.bid.qty, trade.ask.qty);
        assert_ne!(trade.bid.price, trade.ask.price);
    }
}
