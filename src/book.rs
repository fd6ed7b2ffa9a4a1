// src/book.rs
//! Limit order book with a continuous price-time priority matching engine.
//!
//! This module is the core of the crate: a single-instrument, in-memory book
//! that ingests order submissions, cancellations, and quantity modifications
//! and deterministically produces a stream of executed trades plus a
//! two-sided book state queryable for top-of-book and depth.
//!
//! ## Key properties
//!
//! - **Price-time priority**: best price matches first; within a price level
//!   orders fill strictly FIFO.
//! - **Maker-price execution**: trades print at the resting order's price.
//! - **Three consistent indices**: the bid/ask ladders (`BTreeMap`), the
//!   per-level FIFO queues, and the order-id index agree after every
//!   operation; `assert_invariants` verifies this in tests.
//! - **No hidden clock**: timestamps are caller-supplied nanoseconds.
//!
//! ## Performance characteristics
//!
//! - Submit/cancel: O(log P) ladder access where P is the number of distinct
//!   price levels, plus O(queue) for in-level removal on cancel.
//! - Top-of-book queries: O(log P) or better.
//! - Depth counts and spread: O(1) over cached structures.
//!
//! ## Example
//!
//! ```rust
//! use matchbook::book::{OrderBook, Side};
//!
//! let mut book = OrderBook::new();
//! book.submit(10050, 100, Side::Buy, 1);
//! book.submit(10055, 120, Side::Sell, 2);
//! assert_eq!(book.spread(), 5);
//!
//! // Cross the spread: the trade prints at the resting ask's price.
//! book.submit(10060, 120, Side::Buy, 3);
//! assert_eq!(book.trades().len(), 1);
//! assert_eq!(book.trades()[0].price, 10055);
//! ```

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

pub type OrderId = u64;

/// Returned by [`OrderBook::submit`] when pre-validation rejects the input.
/// Accepted orders always receive ids starting at 1.
pub const NULL_ORDER_ID: OrderId = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    PartialFill,
    Filled,
    Cancelled,
    Rejected,
}

/// One order: immutable identity plus mutable fill/status state.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub timestamp: u64,
    pub price: u32,
    pub quantity: u32,
    pub filled: u32,
    pub side: Side,
    pub status: OrderStatus,
}

impl Order {
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.quantity - self.filled
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled >= self.quantity
    }

    #[inline]
    fn fill(&mut self, qty: u32) {
        self.filled += qty;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartialFill
        };
    }
}

/// An executed trade. Immutable once emitted; the trade log preserves
/// execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    /// Execution price: always the resting (maker) order's price.
    pub price: u32,
    pub quantity: u32,
    /// Inherited from the aggressor's submission timestamp.
    pub timestamp: u64,
}

/// One price level of the depth view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    pub price: u32,
    pub qty: u64,
}

#[derive(Debug, Default)]
struct PriceLevel {
    // Cached sum of remaining quantities; keeps depth queries off the queue.
    total_qty: u64,
    queue: VecDeque<Order>,
}

impl PriceLevel {
    fn push_back(&mut self, order: Order) {
        self.total_qty += u64::from(order.remaining());
        self.queue.push_back(order);
    }

    fn remove(&mut self, id: OrderId) -> Option<Order> {
        let pos = self.queue.iter().position(|o| o.id == id)?;
        let order = self.queue.remove(pos)?;
        self.total_qty -= u64::from(order.remaining());
        Some(order)
    }
}

// Side + price are enough to reach the owning price level, since the ladders
// are keyed by price.
#[derive(Clone, Copy, Debug)]
struct Locator {
    side: Side,
    price: u32,
}

/// Single-instrument limit order book.
///
/// Single-threaded by contract: every operation runs to completion before
/// the next begins. All mutating calls route through the matching loop;
/// queries are pure.
pub struct OrderBook {
    bids: BTreeMap<u32, PriceLevel>,
    asks: BTreeMap<u32, PriceLevel>,
    orders: hashbrown::HashMap<OrderId, Locator>,
    trades: Vec<Trade>,
    next_id: OrderId,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: hashbrown::HashMap::new(),
            trades: Vec::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn reserve_orders(&mut self, n: usize) {
        self.orders.reserve(n);
    }

    /// Submit a day limit order.
    ///
    /// Matches against the opposite ladder first; any residual rests at the
    /// tail of its own side's FIFO at `price`. Returns the minted id even if
    /// the order filled completely on entry. Malformed input (zero price or
    /// quantity) mutates nothing and returns [`NULL_ORDER_ID`].
    pub fn submit(&mut self, price: u32, quantity: u32, side: Side, timestamp: u64) -> OrderId {
        if price == 0 || quantity == 0 {
            return NULL_ORDER_ID;
        }

        let id = self.next_id;
        self.next_id += 1;

        let mut order = Order {
            id,
            timestamp,
            price,
            quantity,
            filled: 0,
            side,
            status: OrderStatus::New,
        };

        match side {
            Side::Buy => self.match_against_asks(&mut order),
            Side::Sell => self.match_against_bids(&mut order),
        }

        if !order.is_filled() {
            self.rest(order);
        }

        id
    }

    /// Cancel a resting order. Returns `true` iff the id was resting; a
    /// terminal or unknown id is a no-op returning `false`.
    pub fn cancel(&mut self, id: OrderId) -> bool {
        let Some(loc) = self.orders.remove(&id) else {
            return false;
        };

        let ladder = match loc.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        let Some(level) = ladder.get_mut(&loc.price) else {
            debug_assert!(false, "order index points at a missing level (px={})", loc.price);
            return false;
        };

        let removed = level.remove(id).is_some();
        debug_assert!(removed, "order index points at a level that lacks the order");

        if level.queue.is_empty() {
            ladder.remove(&loc.price);
        }

        removed
    }

    /// Change an order's original quantity in place, preserving queue
    /// position (no cancel-replace, no re-crossing).
    ///
    /// If `new_quantity` does not exceed the filled quantity, the order
    /// becomes filled and leaves the book without synthesising a trade.
    /// Returns `false` for unknown or terminal ids.
    pub fn modify(&mut self, id: OrderId, new_quantity: u32) -> bool {
        let Some(&loc) = self.orders.get(&id) else {
            return false;
        };

        let ladder = match loc.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        let Some(level) = ladder.get_mut(&loc.price) else {
            debug_assert!(false, "order index points at a missing level (px={})", loc.price);
            return false;
        };

        let Some(pos) = level.queue.iter().position(|o| o.id == id) else {
            debug_assert!(false, "order index points at a level that lacks the order");
            return false;
        };

        let filled = level.queue[pos].filled;
        if new_quantity <= filled {
            // Shrinking to or below the filled quantity drains the remainder;
            // the order is done without a trade.
            let remaining = level.queue[pos].remaining();
            level.total_qty -= u64::from(remaining);
            level.queue.remove(pos);
            self.orders.remove(&id);
            if level.queue.is_empty() {
                ladder.remove(&loc.price);
            }
        } else {
            let order = &mut level.queue[pos];
            let old = order.quantity;
            order.quantity = new_quantity;
            if new_quantity >= old {
                level.total_qty += u64::from(new_quantity - old);
            } else {
                level.total_qty -= u64::from(old - new_quantity);
            }
        }

        true
    }

    /// Read-only view of a resting order; `None` for unknown or terminal ids.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        let loc = self.orders.get(&id)?;
        let ladder = match loc.side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        ladder.get(&loc.price)?.queue.iter().find(|o| o.id == id)
    }

    /// Best bid price, or 0 when the bid ladder is empty.
    #[inline]
    pub fn best_bid(&self) -> u32 {
        self.bids.last_key_value().map(|(&px, _)| px).unwrap_or(0)
    }

    /// Best ask price, or 0 when the ask ladder is empty.
    #[inline]
    pub fn best_ask(&self) -> u32 {
        self.asks.first_key_value().map(|(&px, _)| px).unwrap_or(0)
    }

    /// Bid-ask spread in ticks, or -1 when either side is empty.
    #[inline]
    pub fn spread(&self) -> i32 {
        if self.bids.is_empty() || self.asks.is_empty() {
            return -1;
        }
        self.best_ask() as i32 - self.best_bid() as i32
    }

    /// Number of distinct bid price levels.
    #[inline]
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[inline]
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    /// Number of orders currently resting on either side.
    #[inline]
    pub fn open_orders(&self) -> usize {
        self.orders.len()
    }

    /// All trades executed over the book's lifetime, in execution order.
    #[inline]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Price/quantity pairs best-first. `depth == 0` means full depth.
    pub fn levels(&self, side: Side, depth: usize) -> Vec<DepthLevel> {
        let ladder = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };

        let take_n = if depth == 0 { ladder.len() } else { depth.min(ladder.len()) };
        let mut out = Vec::with_capacity(take_n);

        match side {
            Side::Buy => {
                for (&px, lvl) in ladder.iter().rev().take(take_n) {
                    out.push(DepthLevel { price: px, qty: lvl.total_qty });
                }
            }
            Side::Sell => {
                for (&px, lvl) in ladder.iter().take(take_n) {
                    out.push(DepthLevel { price: px, qty: lvl.total_qty });
                }
            }
        }

        out
    }

    fn match_against_asks(&mut self, taker: &mut Order) {
        while !taker.is_filled() {
            let Some(mut entry) = self.asks.first_entry() else {
                break;
            };
            let best = *entry.key();
            if taker.price < best {
                break;
            }

            Self::drain_level(taker, best, entry.get_mut(), &mut self.orders, &mut self.trades);

            if entry.get().queue.is_empty() {
                entry.remove();
            }
        }
    }

    fn match_against_bids(&mut self, taker: &mut Order) {
        while !taker.is_filled() {
            let Some(mut entry) = self.bids.last_entry() else {
                break;
            };
            let best = *entry.key();
            if taker.price > best {
                break;
            }

            Self::drain_level(taker, best, entry.get_mut(), &mut self.orders, &mut self.trades);

            if entry.get().queue.is_empty() {
                entry.remove();
            }
        }
    }

    // Fills the taker against one crossed level in FIFO order. Static so the
    // level borrow stays disjoint from the index and trade-log borrows.
    fn drain_level(
        taker: &mut Order,
        price: u32,
        level: &mut PriceLevel,
        index: &mut hashbrown::HashMap<OrderId, Locator>,
        trades: &mut Vec<Trade>,
    ) {
        while !taker.is_filled() {
            let Some(maker) = level.queue.front_mut() else {
                break;
            };

            let qty = taker.remaining().min(maker.remaining());
            taker.fill(qty);
            maker.fill(qty);
            level.total_qty -= u64::from(qty);

            let maker_id = maker.id;
            let maker_done = maker.is_filled();

            let (buy_order_id, sell_order_id) = match taker.side {
                Side::Buy => (taker.id, maker_id),
                Side::Sell => (maker_id, taker.id),
            };
            trades.push(Trade {
                buy_order_id,
                sell_order_id,
                price,
                quantity: qty,
                timestamp: taker.timestamp,
            });

            if maker_done {
                level.queue.pop_front();
                index.remove(&maker_id);
            }
        }
    }

    fn rest(&mut self, mut order: Order) {
        order.status = if order.filled == 0 {
            OrderStatus::New
        } else {
            OrderStatus::PartialFill
        };

        self.orders.insert(
            order.id,
            Locator { side: order.side, price: order.price },
        );

        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        ladder.entry(order.price).or_default().push_back(order);
    }
}

impl OrderBook {
    /// Full cross-index consistency sweep. Test/debug aid, not hot-path.
    pub fn assert_invariants(&self) {
        // 1) levels: non-empty queues, cached totals match, keys match orders
        for (side, ladder) in [(Side::Buy, &self.bids), (Side::Sell, &self.asks)] {
            for (&px, lvl) in ladder.iter() {
                assert!(!lvl.queue.is_empty(), "empty level left at px={px}");
                let sum: u64 = lvl.queue.iter().map(|o| u64::from(o.remaining())).sum();
                assert_eq!(lvl.total_qty, sum, "level total mismatch at px={px}");
                for o in lvl.queue.iter() {
                    assert_eq!(o.price, px, "order px disagrees with level key");
                    assert_eq!(o.side, side, "order side disagrees with ladder");
                    assert!(o.remaining() > 0, "fully filled order left resting");
                    assert!(
                        matches!(o.status, OrderStatus::New | OrderStatus::PartialFill),
                        "terminal order left resting"
                    );
                    let loc = self.orders.get(&o.id).expect("queued order missing from index");
                    assert_eq!(loc.price, px, "index locator px mismatch");
                    assert_eq!(loc.side, side, "index locator side mismatch");
                }
            }
        }

        // 2) index has no strays: every entry resolves into exactly one queue
        let queued: usize = self
            .bids
            .values()
            .chain(self.asks.values())
            .map(|l| l.queue.len())
            .sum();
        assert_eq!(self.orders.len(), queued, "index size disagrees with queues");

        // 3) no locked or crossed book
        if !self.bids.is_empty() && !self.asks.is_empty() {
            assert!(self.best_bid() < self.best_ask(), "locked/crossed book");
        }

        // 4) trades well-formed
        for t in &self.trades {
            assert!(t.quantity > 0, "zero-quantity trade");
        }
    }
}
