use std::fmt;
use std::time::Duration;

/// Handshake latency statistics for the successful attempts of one phase.
///
/// `std_dev` is the sample standard deviation and is only present with at
/// least two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub count: usize,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    pub std_dev: Option<Duration>,
}

impl LatencyStats {
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let min = *samples.iter().min()?;
        let max = *samples.iter().max()?;

        // Integer mean keeps min <= mean <= max exact.
        let total: Duration = samples.iter().sum();
        let mean = u32::try_from(samples.len())
            .map(|n| total / n)
            .unwrap_or_else(|_| Duration::from_secs_f64(total.as_secs_f64() / samples.len() as f64))
            .clamp(min, max);

        let std_dev = if samples.len() >= 2 {
            let secs: Vec<f64> = samples.iter().map(Duration::as_secs_f64).collect();
            let std = statistical::standard_deviation(&secs, None);
            std.is_finite().then(|| Duration::from_secs_f64(std.max(0.)))
        } else {
            None
        };

        Some(Self {
            count: samples.len(),
            mean,
            min,
            max,
            std_dev,
        })
    }
}

fn ms(dur: Duration) -> f64 {
    dur.as_secs_f64() * 1_000.
}

impl fmt::Display for LatencyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean={:.2}ms, min={:.2}ms, max={:.2}ms",
            ms(self.mean),
            ms(self.min),
            ms(self.max)
        )?;
        if let Some(std) = self.std_dev {
            write!(f, ", std={:.2}ms", ms(std))?;
        }
        Ok(())
    }
}
