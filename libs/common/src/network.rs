//! Simulated network conditions
//!
//! The mock backend pretends to sit behind a remote API: every call waits for a
//! fixed latency and some calls fail at random. Both the delay and the random
//! source are injected so tests can run instantly and force either outcome.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Round-trip latency used when nothing else is configured
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(350);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Latency and randomness shared by all backend operations
#[derive(Debug, Clone)]
pub struct SimulatedNetwork {
    latency: Duration,
    rng: Arc<Mutex<StdRng>>,
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl SimulatedNetwork {
    /// Network seeded from OS entropy
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Deterministic network for reproducible runs
    pub fn seeded(latency: Duration, seed: u64) -> Self {
        Self {
            latency,
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Zero-latency deterministic network
    pub fn instant(seed: u64) -> Self {
        Self::seeded(Duration::ZERO, seed)
    }

    /// Suspend for the simulated round trip
    pub async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Returns true with the given probability
    ///
    /// Probabilities at or below 0 never fire and at or above 1 always fire.
    pub fn roll(&self, probability: f64) -> bool {
        let sample: f64 = self.rng().r#gen();
        sample < probability
    }

    /// Random lowercase base-36 string of `len` characters
    pub fn random_token(&self, len: usize) -> String {
        let mut rng = self.rng();
        (0..len)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect()
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
