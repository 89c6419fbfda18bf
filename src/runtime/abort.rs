//=====================================================
// File: abort.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Cooperative script cancellation
// Objective: Record user abort requests on a process-wide logical clock so
//            frames started before a request stop at their next checkpoint
//            while frames started afterwards run normally
//=====================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Default)]
struct AbortState {
    clock: AtomicU64,
    requested_at: AtomicU64,
}

/// Shared by every execution context of one runtime. Cloning shares state.
#[derive(Clone, Default)]
pub struct AbortSignal {
    state: Arc<AbortState>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next tick of the logical clock. Frames record one at creation.
    pub fn stamp(&self) -> u64 {
        self.state.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Asks every frame created so far to stop.
    pub fn request(&self) {
        let at = self.stamp();
        self.state.requested_at.store(at, Ordering::SeqCst);
        info!(tick = at, "script abort requested");
    }

    pub fn requested_at(&self) -> u64 {
        self.state.requested_at.load(Ordering::SeqCst)
    }

    /// True when an abort was requested after the frame stamped `created_at`
    /// began.
    pub fn aborts(&self, created_at: u64) -> bool {
        self.requested_at() > created_at
    }

    /// Sleeps for `duration` in slices of `poll`, returning early with
    /// `false` once `should_stop` reports an abort. A duration past the
    /// clock's range sleeps until stopped.
    pub fn sleep_polling(
        duration: Duration,
        poll: Duration,
        mut should_stop: impl FnMut() -> bool,
    ) -> bool {
        let deadline = Instant::now().checked_add(duration);
        loop {
            if should_stop() {
                return false;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    poll.min(deadline - now)
                }
                None => poll,
            };
            thread::sleep(slice);
        }
    }
}


//=====================================================
// End of file
//=====================================================
