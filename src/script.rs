// src/script.rs
//! NDJSON op scripts: one JSON object per line, applied to a book in order.
//!
//! Scripts are the deterministic-replay surface: two books fed the same
//! script produce identical trade logs and summaries. Lines look like
//!
//! ```text
//! {"type":"submit","side":"buy","px":10050,"qty":100,"ts_ns":1}
//! {"type":"cancel","id":1}
//! {"type":"modify","id":2,"qty":50}
//! ```

use crate::book::{OrderBook, Side, NULL_ORDER_ID};
use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use std::io::{BufRead, BufReader, Read};

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ScriptOp {
    #[serde(rename = "submit")]
    Submit {
        side: String,
        px: u32,
        qty: u32,
        ts_ns: u64,
    },
    #[serde(rename = "cancel")]
    Cancel { id: u64 },
    #[serde(rename = "modify")]
    Modify { id: u64, qty: u32 },
}

/// Per-op outcome counts accumulated over one replay.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplayStats {
    pub submitted: u64,
    pub rejected: u64,
    pub cancels: u64,
    pub cancel_misses: u64,
    pub modifies: u64,
    pub modify_misses: u64,
}

/// Apply every op in the script to `book`, in file order.
pub fn replay_reader<R: Read>(r: R, book: &mut OrderBook) -> Result<ReplayStats> {
    let mut br = BufReader::new(r);
    let mut line = String::new();
    let mut stats = ReplayStats::default();

    loop {
        line.clear();
        if br.read_line(&mut line)? == 0 {
            break;
        }

        let s = line.trim();
        if s.is_empty() {
            continue;
        }

        let op: ScriptOp = serde_json::from_str(s)?;

        match op {
            ScriptOp::Submit { side, px, qty, ts_ns } => {
                let Some(side) = parse_side(&side) else {
                    stats.rejected += 1;
                    continue;
                };
                if book.submit(px, qty, side, ts_ns) == NULL_ORDER_ID {
                    stats.rejected += 1;
                } else {
                    stats.submitted += 1;
                }
            }
            ScriptOp::Cancel { id } => {
                if book.cancel(id) {
                    stats.cancels += 1;
                } else {
                    stats.cancel_misses += 1;
                }
            }
            ScriptOp::Modify { id, qty } => {
                if book.modify(id, qty) {
                    stats.modifies += 1;
                } else {
                    stats.modify_misses += 1;
                }
            }
        }
    }

    Ok(stats)
}

fn parse_side(s: &str) -> Option<Side> {
    match s {
        "buy" | "Buy" => Some(Side::Buy),
        "sell" | "Sell" => Some(Side::Sell),
        _ => None,
    }
}

/// Final book state plus replay counts as a JSON document.
pub fn summary_json(book: &OrderBook, stats: &ReplayStats, depth: usize) -> String {
    let volume: u64 = book.trades().iter().map(|t| u64::from(t.quantity)).sum();

    json!({
        "type": "summary",
        "submitted": stats.submitted,
        "rejected": stats.rejected,
        "cancels": stats.cancels,
        "cancel_misses": stats.cancel_misses,
        "modifies": stats.modifies,
        "modify_misses": stats.modify_misses,
        "trades": book.trades().len(),
        "volume": volume,
        "open_orders": book.open_orders(),
        "best_bid": book.best_bid(),
        "best_ask": book.best_ask(),
        "spread": book.spread(),
        "bid_depth": book.bid_depth(),
        "ask_depth": book.ask_depth(),
        "bids": book.levels(Side::Buy, depth),
        "asks": book.levels(Side::Sell, depth),
    })
    .to_string()
}
