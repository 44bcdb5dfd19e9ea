// ── Download speed sampling ──
//
// Debounced throughput estimate fed by the read loop. A new rate is
// published at most once per second, covering everything accumulated
// since the previous publication.

use std::time::Duration;

use tokio::time::Instant;

/// Minimum elapsed time before a new rate is published.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Rolling throughput estimator.
///
/// Uses `tokio::time::Instant` so paused test clocks drive it.
#[derive(Debug, Clone)]
pub struct SpeedSampler {
    last_sample: Instant,
    accumulated: u64,
    rate: f64,
}

impl Default for SpeedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedSampler {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            last_sample: now,
            accumulated: 0,
            rate: 0.0,
        }
    }

    /// Account for `bytes` read just now. Returns the newly published
    /// rate in bytes per second, if this call crossed a sample boundary.
    pub fn record(&mut self, bytes: usize) -> Option<f64> {
        self.record_at(bytes, Instant::now())
    }

    /// [`record`](Self::record) with an explicit clock reading.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn record_at(&mut self, bytes: usize, now: Instant) -> Option<f64> {
        self.accumulated = self
            .accumulated
            .saturating_add(u64::try_from(bytes).unwrap_or(u64::MAX));

        let elapsed = now.saturating_duration_since(self.last_sample);
        if elapsed <= SAMPLE_INTERVAL {
            return None;
        }

        self.rate = self.accumulated as f64 / elapsed.as_secs_f64();
        self.accumulated = 0;
        self.last_sample = now;
        Some(self.rate)
    }

    /// Last published rate in bytes per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Last published rate in KiB per second.
    pub fn rate_kibps(&self) -> f64 {
        to_kibps(self.rate)
    }

    /// Bytes read since the last publication.
    pub fn pending_bytes(&self) -> u64 {
        self.accumulated
    }

    /// Zero the accumulator and the published rate.
    pub fn reset(&mut self) {
        *self = Self::starting_at(Instant::now());
    }
}

/// Convert bytes per second to KiB per second.
pub fn to_kibps(bytes_per_sec: f64) -> f64 {
    bytes_per_sec / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn nothing_published_within_first_second() {
        let start = Instant::now();
        let mut sampler = SpeedSampler::starting_at(start);

        assert_eq!(sampler.record_at(8192, start + ms(200)), None);
        assert_eq!(sampler.record_at(8192, start + ms(600)), None);
        assert_eq!(sampler.record_at(8192, start + ms(1000)), None);

        assert_eq!(sampler.pending_bytes(), 3 * 8192);
        assert!(sampler.rate().abs() < f64::EPSILON);
    }

    #[test]
    fn publishes_after_threshold_and_resets_accumulator() {
        let start = Instant::now();
        let mut sampler = SpeedSampler::starting_at(start);

        sampler.record_at(1000, start + ms(500));
        let rate = sampler.record_at(1000, start + ms(2000)).unwrap();

        assert!((rate - 1000.0).abs() < 1e-9, "rate was {rate}");
        assert_eq!(sampler.pending_bytes(), 0);
        assert!((sampler.rate_kibps() - 1000.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn zero_byte_reads_still_advance_the_window() {
        let start = Instant::now();
        let mut sampler = SpeedSampler::starting_at(start);

        sampler.record_at(4096, start + ms(300));
        let rate = sampler.record_at(0, start + ms(2048)).unwrap();

        assert!((rate - 2000.0).abs() < 1e-9, "rate was {rate}");
    }

    #[test]
    fn converges_on_constant_feed() {
        let start = Instant::now();
        let mut sampler = SpeedSampler::starting_at(start);
        let rate_per_sec = 64 * 1024;
        let mut published = Vec::new();

        // 8 KiB every 125 ms for three seconds.
        for tick in 1..=24u64 {
            if let Some(rate) = sampler.record_at(rate_per_sec / 8, start + ms(tick * 125)) {
                published.push(rate);
            }
        }

        assert!(published.len() >= 2, "published: {published:?}");
        for rate in published {
            let error = (rate - 65536.0).abs() / 65536.0;
            assert!(error < 0.15, "rate {rate} too far from 65536");
        }
    }

    #[test]
    fn reset_zeroes_rate_and_accumulator() {
        let start = Instant::now();
        let mut sampler = SpeedSampler::starting_at(start);

        sampler.record_at(1000, start + ms(100));
        sampler.record_at(1000, start + ms(1500));
        sampler.record_at(500, start + ms(1600));
        sampler.reset();

        assert!(sampler.rate().abs() < f64::EPSILON);
        assert_eq!(sampler.pending_bytes(), 0);
    }
}
