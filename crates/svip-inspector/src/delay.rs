use std::time::Duration;

use rand::Rng;

/// Simulated downstream processing cost applied after a successful decode.
///
/// The delay stands in for real per-image compute the service does not
/// perform; it is injected at construction so tests can run with
/// [`ProcessingDelay::None`] and never sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingDelay {
    /// No delay. Deterministic; the test configuration.
    None,
    /// Sleep for a duration sampled uniformly from `[min, max)` milliseconds.
    UniformMs { min: u64, max: u64 },
}

impl ProcessingDelay {
    /// Build a delay strategy from configured bounds.
    ///
    /// A degenerate range (`max <= min`) disables the delay.
    #[must_use]
    pub fn from_bounds(min_ms: u64, max_ms: u64) -> Self {
        if max_ms > min_ms {
            Self::UniformMs {
                min: min_ms,
                max: max_ms,
            }
        } else {
            Self::None
        }
    }

    /// Await the simulated processing cost.
    pub async fn wait(self) {
        let millis = match self {
            Self::None => return,
            // Sample before suspending so the RNG never lives across an await.
            Self::UniformMs { min, max } => rand::rng().random_range(min..max),
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
