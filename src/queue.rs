//! The ProposalQueue: a FIFO of players awaiting a verdict, and the single
//! mutex that is simultaneously the "exclusivity token" gating both
//! proposal submission and a player's own input-queue admission.
//!
//! Reusing one `Mutex` for both roles is deliberate, not incidental: it is
//! what prevents a fresh key event from mutating a player's tokens in the
//! window between that player queueing a proposal and the dealer validating
//! it.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::domain::PlayerId;
use crate::error::GameError;
use crate::shutdown::ShutdownToken;

pub struct ProposalQueue {
    inner: Mutex<VecDeque<PlayerId>>,
    dealer_wake: Condvar,
}

impl ProposalQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            dealer_wake: Condvar::new(),
        }
    }

    /// Blocks until the exclusivity token is acquired. Used by a player's own
    /// main loop (which holds it across draining its input queue and, if a
    /// proposal is formed, submitting it) and by the dealer's drain.
    pub fn lock_exclusive(&self) -> ProposalQueueGuard<'_> {
        ProposalQueueGuard {
            fifo: self.inner.lock(),
            queue: self,
        }
    }

    /// Non-blocking variant for `key_pressed`: if another thread holds the
    /// token (the owning player mid-loop, or the dealer mid-drain), the
    /// event is simply dropped rather than waiting.
    pub fn try_lock_exclusive(&self) -> Option<ProposalQueueGuard<'_>> {
        self.inner.try_lock().map(|fifo| ProposalQueueGuard { fifo, queue: self })
    }

    /// Convenience wrapper around `lock_exclusive` + `submit` for callers
    /// that do not already hold the token.
    pub fn submit(&self, player: PlayerId, shutdown: &ShutdownToken) -> Result<(), GameError> {
        if shutdown.is_cancelled() {
            return Err(GameError::ShuttingDown);
        }
        self.lock_exclusive().submit(player);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// The dealer's sleep primitive: blocks for up to `timeout`, waking early
    /// if a player submits a proposal in the meantime. Returns whether the
    /// queue is non-empty when it returns.
    pub fn wait_for_work(&self, timeout: Duration) -> bool {
        let mut fifo = self.inner.lock();
        if fifo.is_empty() {
            self.dealer_wake.wait_for(&mut fifo, timeout);
        }
        !fifo.is_empty()
    }
}

pub struct ProposalQueueGuard<'a> {
    fifo: MutexGuard<'a, VecDeque<PlayerId>>,
    queue: &'a ProposalQueue,
}

impl<'a> ProposalQueueGuard<'a> {
    pub fn submit(&mut self, player: PlayerId) {
        self.fifo.push_back(player);
        self.queue.dealer_wake.notify_one();
    }

    pub fn pop(&mut self) -> Option<PlayerId> {
        self.fifo.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }
}
