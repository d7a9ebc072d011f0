//! Per-SA timer queue driving the `Completion.timer` contract
//!
//! `ike-core`'s Completion Path only says which [TimeoutEvent] to arm for a
//! given SA (spec §4.8); the cadence and the actual tokio timer plumbing
//! live here, grounded in the same `tokio::time::{interval, sleep}`
//! primitives the teacher's `ikebuster::scan` loop uses for its own pacing.
//! SPEC_FULL's retransmission supplement is the backoff policy implemented
//! in [TimerWheel::retry_retransmit].

use crate::config::RetransmitConfig;
use ike_core::sa::SaSerial;
use ike_core::transition::TimeoutEvent;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

/// How long an established SA is allowed to live before it must be replaced
const SA_LIFETIME: Duration = Duration::from_secs(3600);
/// Grace period an `IkesaDel`/`ChildsaDel` SA is kept around to absorb peer retransmits
const DISCARD_GRACE: Duration = Duration::from_secs(10);

/// What the event loop should do once a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Resend the last packet held by this SA; the next attempt number if it fires again
    Retransmit {
        /// 1-based attempt number this firing represents
        attempt: u32,
    },
    /// Begin a rekey for this SA
    Replace,
    /// Remove this SA from the table outright
    Discard,
}

struct Entry {
    sa: SaSerial,
    expiry: Expiry,
}

/// A lazy-deletion timer wheel: one live timer per SA
///
/// Re-arming a SA's timer doesn't walk the heap to cancel the old entry; it
/// just changes which key [TimerWheel::current] considers live for that SA,
/// so a stale heap entry is silently skipped when it eventually surfaces.
#[derive(Default)]
pub struct TimerWheel {
    heap: BinaryHeap<Reverse<(Instant, u64)>>,
    live: HashMap<u64, Entry>,
    current: HashMap<SaSerial, u64>,
    next_key: u64,
    retransmit: RetransmitConfig,
}

impl TimerWheel {
    /// A wheel using the given retransmit backoff policy
    pub fn new(retransmit: RetransmitConfig) -> Self {
        Self {
            retransmit,
            ..Self::default()
        }
    }

    /// Arm the timer named by a [TimeoutEvent], replacing this SA's current timer
    pub fn arm(&mut self, sa: SaSerial, event: TimeoutEvent) {
        match event {
            TimeoutEvent::Retransmit => self.arm_at(sa, self.retransmit.initial_backoff, Expiry::Retransmit { attempt: 1 }),
            TimeoutEvent::SaReplace => self.arm_at(sa, SA_LIFETIME, Expiry::Replace),
            TimeoutEvent::Discard => self.arm_at(sa, DISCARD_GRACE, Expiry::Discard),
            TimeoutEvent::Retain => {}
            TimeoutEvent::None => self.cancel(sa),
        }
    }

    /// Re-arm a retransmit at the next backoff step, or report the retry budget is exhausted
    pub fn retry_retransmit(&mut self, sa: SaSerial, attempt: u32) -> bool {
        if attempt > self.retransmit.max_retries {
            return false;
        }
        let delay = self.retransmit.initial_backoff * self.retransmit.backoff_factor.saturating_pow(attempt);
        self.arm_at(sa, delay, Expiry::Retransmit { attempt: attempt + 1 });
        true
    }

    /// Drop whatever timer this SA currently holds
    pub fn cancel(&mut self, sa: SaSerial) {
        self.current.remove(&sa);
    }

    fn arm_at(&mut self, sa: SaSerial, delay: Duration, expiry: Expiry) {
        let key = self.next_key;
        self.next_key += 1;
        let deadline = Instant::now() + delay;
        self.heap.push(Reverse((deadline, key)));
        self.live.insert(key, Entry { sa, expiry });
        self.current.insert(sa, key);
    }

    /// Wait for the next still-live timer to fire
    ///
    /// Safe to call repeatedly from a `tokio::select!` loop: with nothing
    /// armed, it simply never resolves, leaving the other branches to drive
    /// the loop until a timer exists again.
    pub async fn next_fired(&mut self) -> (SaSerial, Expiry) {
        loop {
            match self.heap.peek().copied() {
                None => std::future::pending::<()>().await,
                Some(Reverse((deadline, key))) => {
                    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                    self.heap.pop();
                    if let Some(entry) = self.live.remove(&key) {
                        if self.current.get(&entry.sa) == Some(&key) {
                            self.current.remove(&entry.sa);
                            return (entry.sa, entry.expiry);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn re_arming_discards_the_stale_timer() {
        let mut wheel = TimerWheel::new(RetransmitConfig {
            initial_backoff: Duration::from_millis(5),
            backoff_factor: 2,
            max_retries: 3,
        });
        let sa_serial: SaSerial = 1;
        wheel.arm(sa_serial, TimeoutEvent::Retransmit);
        wheel.arm(sa_serial, TimeoutEvent::Discard);
        let (sa, expiry) = wheel.next_fired().await;
        assert_eq!(sa, sa_serial);
        assert_eq!(expiry, Expiry::Discard);
    }

    #[tokio::test]
    async fn retry_budget_is_enforced() {
        let mut wheel = TimerWheel::new(RetransmitConfig {
            initial_backoff: Duration::from_millis(1),
            backoff_factor: 1,
            max_retries: 1,
        });
        let sa_serial: SaSerial = 1;
        assert!(wheel.retry_retransmit(sa_serial, 1));
        assert!(!wheel.retry_retransmit(sa_serial, 2));
    }
}
