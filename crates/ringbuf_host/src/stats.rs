//! Service-time statistics for ring buffer transfers.

const BUCKETS: usize = 20;
const BUCKET_NS: u64 = 500;

/// Min/avg/max and a coarse histogram of per-call latencies.
///
/// Buckets are 500 ns wide; the last one collects everything slower.
#[derive(Debug, Clone)]
pub struct LatencyStats {
    pub min: u64,
    pub max: u64,
    pub sum: u64,
    pub count: u64,
    pub buckets: [u64; BUCKETS],
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyStats {
    pub fn new() -> Self {
        Self {
            min: u64::MAX,
            max: 0,
            sum: 0,
            count: 0,
            buckets: [0; BUCKETS],
        }
    }

    /// Records one measurement in nanoseconds.
    pub fn update(&mut self, nanos: u64) {
        self.min = self.min.min(nanos);
        self.max = self.max.max(nanos);
        self.sum += nanos;
        self.count += 1;

        let idx = (nanos / BUCKET_NS).min(BUCKETS as u64 - 1) as usize;
        self.buckets[idx] += 1;
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn print_report(&self, title: &str) {
        println!("\n{title}");
        println!("Count: {}", self.count);
        if self.count == 0 {
            return;
        }

        let avg_ns = self.avg();
        if avg_ns < 1000.0 {
            println!("Min:   {:.2} ns", self.min as f64);
            println!("Avg:   {:.2} ns", avg_ns);
            println!("Max:   {:.2} ns", self.max as f64);
        } else {
            println!("Min:   {:.2} us", self.min as f64 / 1000.0);
            println!("Avg:   {:.2} us", avg_ns / 1000.0);
            println!("Max:   {:.2} us", self.max as f64 / 1000.0);
        }

        println!("Distribution ({BUCKET_NS}ns buckets):");
        for (i, &count) in self.buckets.iter().enumerate() {
            if count > 0 {
                let open = if i == BUCKETS - 1 { ">" } else { "" };
                let lower = i as u64 * BUCKET_NS;
                let upper = lower + BUCKET_NS;
                println!("[{lower:5}-{upper:5}{open} ns]: {count}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_extremes_and_mean() {
        let mut stats = LatencyStats::new();
        for nanos in [300, 100, 1_400] {
            stats.update(nanos);
        }
        assert_eq!(stats.min, 100);
        assert_eq!(stats.max, 1_400);
        assert_eq!(stats.count, 3);
        assert!((stats.avg() - 600.0).abs() < f64::EPSILON);
        assert_eq!(stats.buckets[0], 2);
        assert_eq!(stats.buckets[2], 1);
    }

    #[test]
    fn slow_samples_land_in_the_last_bucket() {
        let mut stats = LatencyStats::default();
        stats.update(u64::MAX / 2);
        assert_eq!(stats.buckets[BUCKETS - 1], 1);
        assert_eq!(stats.avg(), (u64::MAX / 2) as f64);
    }
}
