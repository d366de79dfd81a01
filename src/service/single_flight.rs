//! Per-key load coalescing.
//!
//! Each key in flight owns an async mutex. The first misser takes it and runs
//! the loader; later missers queue on the same mutex and, once they get it,
//! re-check the cache before loading themselves. The map entry is dropped
//! once no caller holds or waits for the key.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Calls = Arc<Mutex<HashMap<String, Slot>>>;

#[derive(Debug)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    /// Callers holding or waiting for `lock`
    holders: usize,
}

#[derive(Debug, Default)]
pub struct SingleFlight {
    calls: Calls,
}

/// Held while a caller is allowed to load `key`.
pub struct FlightGuard {
    key: String,
    calls: Calls,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds `key`, then takes it.
    ///
    /// Dropping the returned future while it waits gives up the place in
    /// the queue.
    pub async fn acquire(&self, key: &str) -> FlightGuard {
        let lock = {
            let mut calls = self.calls.lock();
            let slot = calls.entry(key.to_string()).or_insert_with(|| Slot {
                lock: Arc::new(AsyncMutex::new(())),
                holders: 0,
            });
            slot.holders += 1;
            slot.lock.clone()
        };

        // registered before waiting, so a cancelled wait still deregisters
        let mut flight = FlightGuard {
            key: key.to_string(),
            calls: self.calls.clone(),
            guard: None,
        };
        flight.guard = Some(lock.lock_owned().await);
        flight
    }

    /// Number of keys currently held or waited on.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        // release first so waiters can proceed
        self.guard.take();

        let mut calls = self.calls.lock();
        if let Some(slot) = calls.get_mut(&self.key) {
            slot.holders -= 1;
            if slot.holders == 0 {
                calls.remove(&self.key);
            }
        }
    }
}
