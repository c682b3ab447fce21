//! Shared plumbing handed to every mock backend service

use std::sync::Arc;

use crate::clock::{Clock, ManualClock};
use crate::network::SimulatedNetwork;
use crate::store::{KeyValueStore, MemoryStore};

/// Store, network simulation and clock used by the backend services
#[derive(Debug, Clone)]
pub struct BackendContext {
    pub store: Arc<dyn KeyValueStore>,
    pub network: SimulatedNetwork,
    pub clock: Arc<dyn Clock>,
}

impl BackendContext {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        network: SimulatedNetwork,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            network,
            clock,
        }
    }

    /// Zero-latency context over a fresh memory store, for tests and demos
    pub fn in_memory(seed: u64, clock: ManualClock) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            SimulatedNetwork::instant(seed),
            Arc::new(clock),
        )
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Time-derived id such as `t_1700000000000`
    ///
    /// If the id is already taken the timestamp part is bumped until it is
    /// free, so records created within the same millisecond stay distinct.
    pub fn next_id(&self, prefix: &str, is_taken: impl Fn(&str) -> bool) -> String {
        let mut stamp = self.now_millis();
        loop {
            let id = format!("{}{}", prefix, stamp);
            if !is_taken(&id) {
                return id;
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_uses_clock() {
        let ctx = BackendContext::in_memory(1, ManualClock::new(1_700_000_000_000));
        assert_eq!(ctx.next_id("t_", |_| false), "t_1700000000000");
    }

    #[test]
    fn test_next_id_skips_taken_stamps() {
        let ctx = BackendContext::in_memory(1, ManualClock::new(10));
        let taken = ["u_10", "u_11"];
        assert_eq!(ctx.next_id("u_", |id| taken.contains(&id)), "u_12");
    }
}
