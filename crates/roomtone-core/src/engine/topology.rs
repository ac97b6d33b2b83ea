//! Lock-free topology event channel
//!
//! The host reports port connections on its notification thread, while the
//! connection counter lives in the engine on the audio thread. The sending
//! side only bumps one of two monotonic counters; the receiving side keeps
//! how many of each it has already handed out and replays the rest at the
//! start of every block.
//!
//! Both sides are wait-free and never allocate. There is no capacity: a
//! burst of any size between two blocks is replayed in full.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A port connection change reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyEvent {
    /// `true` for a new connection, `false` for a disconnection
    pub connected: bool,
}

impl TopologyEvent {
    pub fn connected() -> Self {
        Self { connected: true }
    }

    pub fn disconnected() -> Self {
        Self { connected: false }
    }
}

/// Running totals shared by both ends
///
/// Each counter is a single word with no dependent data, so `Relaxed` is
/// enough.
#[derive(Debug, Default)]
struct TopologyCounters {
    connects: AtomicU64,
    disconnects: AtomicU64,
}

/// Sending side, owned by the notification handler
///
/// `Sync`, so it can live in a handler shared across host threads.
#[derive(Debug)]
pub struct TopologySender {
    counters: Arc<TopologyCounters>,
}

impl TopologySender {
    /// Record an event (wait-free, never fails)
    #[inline]
    pub fn send(&self, event: TopologyEvent) {
        let counter = if event.connected {
            &self.counters.connects
        } else {
            &self.counters.disconnects
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Receiving side, owned by the audio thread
#[derive(Debug)]
pub struct TopologyReceiver {
    counters: Arc<TopologyCounters>,
    seen_connects: u64,
    seen_disconnects: u64,
}

impl TopologyReceiver {
    /// Next event not yet handed out
    ///
    /// Disconnections come first: any of them is fatal, so there is no
    /// point in replaying connections ahead of one.
    #[inline]
    pub fn pop(&mut self) -> Option<TopologyEvent> {
        if self.seen_disconnects < self.counters.disconnects.load(Ordering::Relaxed) {
            self.seen_disconnects += 1;
            return Some(TopologyEvent::disconnected());
        }
        if self.seen_connects < self.counters.connects.load(Ordering::Relaxed) {
            self.seen_connects += 1;
            return Some(TopologyEvent::connected());
        }
        None
    }
}

/// Create a connected sender/receiver pair
pub fn topology_channel() -> (TopologySender, TopologyReceiver) {
    let counters = Arc::new(TopologyCounters::default());
    let tx = TopologySender {
        counters: Arc::clone(&counters),
    };
    let rx = TopologyReceiver {
        counters,
        seen_connects: 0,
        seen_disconnects: 0,
    };
    (tx, rx)
}
