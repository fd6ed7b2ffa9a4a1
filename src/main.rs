// src/main.rs
mod stats;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    fs::File,
    path::PathBuf,
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tracing::info;

use crate::stats::LatencyStats;
use matchbook::{
    book::{OrderBook, Side},
    render, script,
};

#[derive(Parser, Debug)]
#[command(name = "matchbook", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Seed a small book, cross the spread, cancel, and print each step.
    Demo,
    /// Apply an NDJSON op script and write a JSON summary.
    Replay {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "summary.json")]
        out: PathBuf,
        /// Depth=0 means full depth (all price levels).
        #[arg(long, default_value_t = 5)]
        depth: usize,
    },
    /// Per-operation latency suite over seeded deterministic workloads.
    Bench {
        #[arg(long, default_value_t = 100_000)]
        orders: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Demo => {
            demo();
            Ok(())
        }
        Cmd::Replay { file, out, depth } => replay(file, out, depth),
        Cmd::Bench { orders } => {
            bench(orders);
            Ok(())
        }
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn demo() {
    println!("=== Limit Order Book Demo ===\n");
    let mut book = OrderBook::new();

    println!("1. Adding initial orders...");
    book.submit(10050, 100, Side::Buy, now_ns());
    book.submit(10048, 200, Side::Buy, now_ns());
    book.submit(10045, 150, Side::Buy, now_ns());
    book.submit(10055, 120, Side::Sell, now_ns());
    book.submit(10058, 180, Side::Sell, now_ns());
    book.submit(10060, 100, Side::Sell, now_ns());
    print!("{}", render::render_book(&book, 5));

    println!("\n2. Buy order crossing the spread...");
    book.submit(10056, 150, Side::Buy, now_ns());
    print!("{}", render::render_book(&book, 5));

    println!("\nTrades executed:");
    for t in book.trades() {
        println!(
            "  buy #{} x sell #{} | px {} | qty {}",
            t.buy_order_id, t.sell_order_id, t.price, t.quantity
        );
    }

    println!("\n3. Cancelling order 5...");
    if book.cancel(5) {
        println!("  order 5 cancelled");
    }
    print!("{}", render::render_book(&book, 5));

    println!("\n4. Aggressive sell order...");
    book.submit(10047, 250, Side::Sell, now_ns());
    print!("{}", render::render_book(&book, 5));

    println!("\n=== Statistics ===");
    println!("best bid:  {}", book.best_bid());
    println!("best ask:  {}", book.best_ask());
    println!("spread:    {} ticks", book.spread());
    println!("bid depth: {} levels", book.bid_depth());
    println!("ask depth: {} levels", book.ask_depth());
    println!("trades:    {}", book.trades().len());
}

fn replay(file: PathBuf, out: PathBuf, depth: usize) -> Result<()> {
    let f = File::open(&file).with_context(|| format!("open script {:?}", file))?;
    let mut book = OrderBook::new();
    book.reserve_orders(250_000);

    let t0 = Instant::now();
    let st = script::replay_reader(f, &mut book)?;
    info!(
        "replay: {} submits ({} rejected), {} cancels, {} modifies, {} trades in {:?}",
        st.submitted,
        st.rejected,
        st.cancels,
        st.modifies,
        book.trades().len(),
        t0.elapsed()
    );

    let summary = script::summary_json(&book, &st, depth);
    std::fs::write(&out, summary).with_context(|| format!("write summary {:?}", out))?;
    info!("wrote summary to {:?}", out);
    Ok(())
}

fn bench(orders: usize) {
    println!("===================================");
    println!("  matchbook latency bench");
    println!("===================================");

    bench_submission(orders);
    bench_cancellation(orders.min(10_000));
    bench_matching(10_000);
    bench_queries();
}

fn bench_submission(n: usize) {
    println!("\n--- order submission ---");
    let mut rng = StdRng::seed_from_u64(42);
    let mut book = OrderBook::new();
    book.reserve_orders(n);
    let mut lat = LatencyStats::with_capacity(n);

    for _ in 0..n {
        let px: u32 = rng.gen_range(9_900..=10_100);
        let qty: u32 = rng.gen_range(1..=1_000);
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let ts = now_ns();

        let t0 = Instant::now();
        book.submit(px, qty, side, ts);
        lat.record(t0.elapsed());
    }

    lat.report("order submission");
}

fn bench_cancellation(n: usize) {
    println!("\n--- order cancellation ---");
    let mut rng = StdRng::seed_from_u64(42);
    let mut book = OrderBook::new();
    book.reserve_orders(n);

    let mut ids = Vec::with_capacity(n);
    for _ in 0..n {
        let px: u32 = rng.gen_range(9_900..=10_100);
        let qty: u32 = rng.gen_range(1..=1_000);
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        ids.push(book.submit(px, qty, side, now_ns()));
    }

    let mut lat = LatencyStats::with_capacity(n);
    for id in ids {
        let t0 = Instant::now();
        book.cancel(id);
        lat.record(t0.elapsed());
    }

    lat.report("order cancellation");
}

fn bench_matching(n: usize) {
    println!("\n--- order matching (crossing) ---");
    let mut book = OrderBook::new();
    book.reserve_orders(n + 2_000);

    for i in 0..1_000u32 {
        book.submit(10_000 - i, 100, Side::Buy, now_ns());
        book.submit(10_100 + i, 100, Side::Sell, now_ns());
    }

    let mut lat = LatencyStats::with_capacity(n);
    for i in 0..n {
        let (px, side) = if i % 2 == 0 {
            (10_200, Side::Buy)
        } else {
            (9_900, Side::Sell)
        };

        let t0 = Instant::now();
        book.submit(px, 50, side, now_ns());
        lat.record(t0.elapsed());
    }

    lat.report("order matching");
    println!("total trades executed: {}", book.trades().len());
}

fn bench_queries() {
    println!("\n--- top-of-book queries ---");
    let mut rng = StdRng::seed_from_u64(42);
    let mut book = OrderBook::new();
    book.reserve_orders(5_000);

    for _ in 0..5_000 {
        let px: u32 = rng.gen_range(9_900..=10_100);
        let qty: u32 = rng.gen_range(1..=1_000);
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        book.submit(px, qty, side, now_ns());
    }

    let iterations = 1_000_000u64;
    let t0 = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(book.best_bid());
        std::hint::black_box(book.best_ask());
        std::hint::black_box(book.spread());
    }
    let total = t0.elapsed();

    println!("iterations: {iterations}");
    println!(
        "average latency: {:.1} ns per query triple",
        total.as_nanos() as f64 / iterations as f64
    );
    println!(
        "throughput: {:.0} query triples/second",
        iterations as f64 / total.as_secs_f64()
    );
}
