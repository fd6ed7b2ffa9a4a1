//! # matchbook: single-instrument limit order book
//!
//! An in-memory limit order book with a continuous matching engine
//! implementing price-time priority (FIFO at each price level). The engine
//! ingests order submissions, cancellations, and quantity modifications and
//! deterministically produces a stream of executed trades plus an
//! always-consistent two-sided book state.
//!
//! ## Architecture
//!
//! - **book**: the matching engine and its indices (the dual-sided price
//!   ladder, per-level FIFO queues, and the order-id index), plus the query
//!   surface for top-of-book, spread, depth, and trades.
//! - **script**: NDJSON op scripts for deterministic replay and a JSON
//!   summary of the resulting book state.
//! - **render**: fixed-depth textual ladder snapshots for inspection.
//!
//! ## Example
//!
//! ```rust
//! use matchbook::book::{OrderBook, Side};
//!
//! let mut book = OrderBook::new();
//!
//! let bid = book.submit(10050, 100, Side::Buy, 1);
//! let ask = book.submit(10055, 120, Side::Sell, 2);
//! assert!(bid > 0 && ask > bid);
//!
//! assert_eq!(book.best_bid(), 10050);
//! assert_eq!(book.best_ask(), 10055);
//! assert_eq!(book.spread(), 5);
//! assert!(book.trades().is_empty());
//! ```
pub mod book;
pub mod render;
pub mod script;
