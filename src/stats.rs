// src/stats.rs
use std::time::Duration;

/// Latency sample sink with percentile reporting for the bench subcommand.
pub struct LatencyStats {
    samples_ns: Vec<u64>,
}

impl LatencyStats {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples_ns: Vec::with_capacity(n),
        }
    }

    #[inline]
    pub fn record(&mut self, dur: Duration) {
        self.samples_ns.push(dur.as_nanos() as u64);
    }

    pub fn report(&mut self, operation: &str) {
        if self.samples_ns.is_empty() {
            return;
        }

        self.samples_ns.sort_unstable();
        let n = self.samples_ns.len();
        let sum: u64 = self.samples_ns.iter().sum();

        let pct = |q: f64| self.samples_ns[((n as f64 * q) as usize).min(n - 1)];

        println!("\n{operation} statistics:");
        println!("  operations: {n}");
        println!("  mean:   {:.0} ns", sum as f64 / n as f64);
        println!("  min:    {} ns", self.samples_ns[0]);
        println!("  p50:    {} ns", pct(0.50));
        println!("  p95:    {} ns", pct(0.95));
        println!("  p99:    {} ns", pct(0.99));
        println!("  max:    {} ns", self.samples_ns[n - 1]);
        println!("  throughput: {:.0} ops/sec", n as f64 * 1e9 / sum as f64);
    }
}
