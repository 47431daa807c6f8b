//! Periodic tick counter.
//!
//! Increments a shared value on a background thread at a fixed interval.
//! Hosts use it as a liveness heartbeat next to the sampler.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

struct Ticker {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct TickCounter {
    value: Arc<AtomicU64>,
    ticker: Mutex<Option<Ticker>>,
}

impl TickCounter {
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
            ticker: Mutex::new(None),
        }
    }

    /// Start ticking every `interval`. A no-op if already ticking.
    pub fn start(&self, interval: Duration) -> io::Result<()> {
        if interval.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "counter interval must be non-zero",
            ));
        }
        let mut ticker = self.ticker.lock();
        if ticker.is_some() {
            return Ok(());
        }

        let (stop, stopped) = mpsc::channel::<()>();
        let value = Arc::clone(&self.value);
        let handle = thread::Builder::new()
            .name("meerkat-counter".to_string())
            .spawn(move || {
                // Disconnect and an explicit stop both end the loop.
                while let Err(mpsc::RecvTimeoutError::Timeout) = stopped.recv_timeout(interval) {
                    let now = value.fetch_add(1, Ordering::AcqRel) + 1;
                    log::debug!("COUNTER_TICK value={}", now);
                }
            })?;

        log::trace!("COUNTER_START interval_ms={}", interval.as_millis());
        *ticker = Some(Ticker { stop, handle });
        Ok(())
    }

    /// Stop ticking and join the thread. Idempotent.
    pub fn stop(&self) {
        let ticker = self.ticker.lock().take();
        if let Some(ticker) = ticker {
            let _ = ticker.stop.send(());
            if ticker.handle.join().is_err() {
                log::error!("COUNTER_THREAD_PANICKED");
            }
            log::trace!("COUNTER_STOP value={}", self.value());
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.lock().is_some()
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Manual bump, independent of the timer.
    pub fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TickCounter {
    fn drop(&mut self) {
        self.stop();
    }
}
