//! Player agent: drains its input queue, toggles tokens, submits a
//! proposal on the `F`-th token, and sleeps for a verdict.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::domain::{PlayerId, PlayerInfo, Slot, TokenOutcome, Verdict};
use crate::grid::Grid;
use crate::queue::ProposalQueue;
use crate::shutdown::ShutdownToken;
use crate::ui::Ui;

/// How often a sleeping player re-checks the shutdown flag. Matches the
/// dealer's own `BREAK_MILLIS` granularity so no thread in the table takes
/// meaningfully longer than another to notice termination.
const CANCEL_POLL_MILLIS: u64 = 25;

const LOG_TARGET: &str = "set_table::player";

pub struct Player {
    pub info: Arc<PlayerInfo>,
    grid: Arc<Grid>,
    queue: Arc<ProposalQueue>,
    ui: Arc<dyn Ui>,
    shutdown: Arc<ShutdownToken>,
    feature_size: usize,
    point_freeze: Duration,
    penalty_freeze: Duration,

    input_queue: Mutex<VecDeque<Slot>>,
    input_capacity: usize,

    key_wake_pending: Mutex<bool>,
    key_wake: Condvar,

    verdict_slot: Mutex<Option<Verdict>>,
    verdict_wake: Condvar,

    /// Set by the dealer while redealing; `key_pressed` drops events while
    /// this is `true`.
    dealing: Arc<AtomicBool>,

    exited: AtomicBool,
}

impl Player {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PlayerId,
        human: bool,
        grid: Arc<Grid>,
        queue: Arc<ProposalQueue>,
        ui: Arc<dyn Ui>,
        shutdown: Arc<ShutdownToken>,
        dealing: Arc<AtomicBool>,
        feature_size: usize,
        table_size: usize,
        point_freeze: Duration,
        penalty_freeze: Duration,
    ) -> Self {
        // Bots never need more pending input than the set size; humans are
        // bounded by how many slots exist on the table.
        let input_capacity = if human { table_size } else { feature_size };
        Self {
            info: Arc::new(PlayerInfo::new(id, human)),
            grid,
            queue,
            ui,
            shutdown,
            feature_size,
            point_freeze,
            penalty_freeze,
            input_queue: Mutex::new(VecDeque::with_capacity(input_capacity)),
            input_capacity,
            key_wake_pending: Mutex::new(false),
            key_wake: Condvar::new(),
            verdict_slot: Mutex::new(None),
            verdict_wake: Condvar::new(),
            dealing,
            exited: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.info.id
    }

    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Called by an input source or a `BotDriver`.
    pub fn key_pressed(&self, slot: Slot) {
        if self.dealing.load(Ordering::Acquire) {
            return;
        }
        if let Some(_guard) = self.queue.try_lock_exclusive() {
            let mut pending = self.input_queue.lock();
            if pending.len() < self.input_capacity {
                pending.push_back(slot);
            }
        }
        self.wake_key();
    }

    fn wake_key(&self) {
        let mut pending = self.key_wake_pending.lock();
        *pending = true;
        self.key_wake.notify_one();
    }

    /// Delivers a verdict and wakes the player if it is sleeping on one.
    /// Called by the dealer under `ProposalQueue` exclusivity, following the
    /// lock order queue token, then slot monitor, then verdict monitor.
    pub fn deliver_verdict(&self, verdict: Verdict) {
        let mut slot = self.verdict_slot.lock();
        *slot = Some(verdict);
        self.verdict_wake.notify_all();
    }

    /// Wakes any sleep this player is currently in so it notices shutdown
    /// promptly instead of waiting out its poll interval.
    pub fn interrupt(&self) {
        self.wake_key();
        self.verdict_wake.notify_all();
    }

    /// The player's main loop. Intended to run on its own thread.
    pub fn run(&self) {
        loop {
            if !self.sleep_for_input() {
                break;
            }
            if self.shutdown.is_cancelled() {
                break;
            }

            let submitted = self.drain_input_and_maybe_submit();

            if submitted {
                let verdict = self.wait_for_verdict();
                match verdict {
                    Verdict::Legal => self.point(),
                    Verdict::Illegal => self.penalty(),
                    Verdict::Neutral => {}
                }
                // Stale inputs queued during the pre-verdict window are
                // discarded.
                self.input_queue.lock().clear();
            }

            if self.shutdown.is_cancelled() {
                break;
            }
        }
        tracing::debug!(target: LOG_TARGET, player = self.id(), "player loop exiting");
        self.exited.store(true, Ordering::Release);
    }

    /// Blocks until `key_wake` is signalled or shutdown. Returns `false` on
    /// shutdown.
    fn sleep_for_input(&self) -> bool {
        let mut pending = self.key_wake_pending.lock();
        loop {
            if *pending {
                *pending = false;
                return true;
            }
            if self.shutdown.is_cancelled() {
                return false;
            }
            self.key_wake
                .wait_for(&mut pending, Duration::from_millis(CANCEL_POLL_MILLIS));
        }
    }

    /// Drains the input queue under the queue's exclusivity token, placing
    /// tokens, and submits a proposal if the `F`-th token just landed.
    /// Returns whether a proposal was submitted.
    fn drain_input_and_maybe_submit(&self) -> bool {
        let mut guard = self.queue.lock_exclusive();
        let mut submitted = false;
        loop {
            if submitted {
                break;
            }
            let next = self.input_queue.lock().pop_front();
            let slot = match next {
                Some(slot) => slot,
                None => break,
            };

            let outcome = self.grid.place_token(self.id(), slot);
            if outcome == TokenOutcome::Placed
                && self.grid.tokens_for_player(self.id()) as usize == self.feature_size
            {
                submitted = true;
                guard.submit(self.id());
            }
        }
        submitted
    }

    fn wait_for_verdict(&self) -> Verdict {
        let mut slot = self.verdict_slot.lock();
        loop {
            if let Some(verdict) = slot.take() {
                return verdict;
            }
            if self.shutdown.is_cancelled() {
                return Verdict::Neutral;
            }
            self.verdict_wake
                .wait_for(&mut slot, Duration::from_millis(CANCEL_POLL_MILLIS));
        }
    }

    fn point(&self) {
        let score = self.info.add_point();
        self.ui.set_score(self.id(), score);
        self.ui.set_freeze(self.id(), self.point_freeze.as_millis() as u64);
        self.shutdown.sleep(self.point_freeze);
        self.ui.set_freeze(self.id(), 0);
    }

    fn penalty(&self) {
        self.ui.set_freeze(self.id(), self.penalty_freeze.as_millis() as u64);
        self.shutdown.sleep(self.penalty_freeze);
        self.ui.set_freeze(self.id(), 0);
    }
}
