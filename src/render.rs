// src/render.rs
//! Fixed-depth textual rendering of the two-sided book.

use itoa::Buffer;

use crate::book::{OrderBook, Side};

const PRICE_W: usize = 8;
const QTY_W: usize = 12;

#[inline(always)]
fn push_padded(out: &mut String, buf: &mut Buffer, v: u64, width: usize) {
    let s = buf.format(v);
    for _ in s.len()..width {
        out.push(' ');
    }
    out.push_str(s);
}

/// Two-sided ladder snapshot: asks on top (best ask adjacent to the spread
/// line), bids below, best-first. `depth == 0` renders all levels.
pub fn render_book(book: &OrderBook, depth: usize) -> String {
    let asks = book.levels(Side::Sell, depth);
    let bids = book.levels(Side::Buy, depth);

    let mut out = String::with_capacity(160 + (asks.len() + bids.len()) * (PRICE_W + QTY_W + 1));
    let mut b = Buffer::new();

    out.push_str("========== ORDER BOOK ==========\n");
    out.push_str("   ASKS (sell)\n");
    out.push_str("   price         qty\n");
    for lv in asks.iter().rev() {
        push_padded(&mut out, &mut b, u64::from(lv.price), PRICE_W);
        push_padded(&mut out, &mut b, lv.qty, QTY_W);
        out.push('\n');
    }

    out.push_str("\nspread: ");
    let spread = book.spread();
    if spread < 0 {
        out.push_str("n/a");
    } else {
        out.push_str(b.format(spread));
    }
    out.push_str("\n\n");

    for lv in bids.iter() {
        push_padded(&mut out, &mut b, u64::from(lv.price), PRICE_W);
        push_padded(&mut out, &mut b, lv.qty, QTY_W);
        out.push('\n');
    }
    out.push_str("   BIDS (buy)\n");
    out.push_str("================================\n");

    out
}
