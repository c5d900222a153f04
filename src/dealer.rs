//! The Dealer: owns the deck, the turn timer, and the game lifecycle. Deal,
//! run the timer, drain and validate proposals, reshuffle, announce the
//! winner, terminate. Runs on its own thread and starts/joins the player
//! and bot threads it owns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::bot::BotDriver;
use crate::config::GameConfig;
use crate::domain::{Card, PlayerId, Slot, Verdict};
use crate::grid::Grid;
use crate::oracle::Oracle;
use crate::player::Player;
use crate::queue::ProposalQueue;
use crate::shutdown::ShutdownToken;
use crate::ui::Ui;

/// The dealer's own sleep granularity: how often `timer_loop` wakes up even
/// absent a proposal, to refresh the timer display and re-check shutdown.
const BREAK_MILLIS: u64 = 25;

const LOG_TARGET: &str = "set_table::dealer";

/// Final tally handed back once the table shuts down.
#[derive(Debug, Clone)]
pub struct GameResult {
    pub winners: Vec<PlayerId>,
    pub scores: Vec<(PlayerId, u32)>,
}

struct PlayerHandle {
    player: Arc<Player>,
    thread: JoinHandle<()>,
    bot_thread: Option<JoinHandle<()>>,
}

impl PlayerHandle {
    fn join(self) {
        let id = self.player.id();
        if let Err(err) = self.thread.join() {
            tracing::error!(target: LOG_TARGET, player = id, ?err, "player thread panicked");
        }
        if let Some(bot) = self.bot_thread {
            if let Err(err) = bot.join() {
                tracing::error!(target: LOG_TARGET, player = id, ?err, "bot thread panicked");
            }
        }
        debug_assert!(self.player.has_exited(), "player thread returned without marking itself exited");
    }
}

pub struct Dealer {
    config: GameConfig,
    grid: Arc<Grid>,
    queue: Arc<ProposalQueue>,
    oracle: Arc<dyn Oracle>,
    ui: Arc<dyn Ui>,
    shutdown: Arc<ShutdownToken>,
    dealing: Arc<AtomicBool>,
    players: Vec<Arc<Player>>,
    deck: Vec<Card>,
    rng: StdRng,
    reshuffle_deadline: Option<Instant>,
    hint_time: Option<Instant>,
    last_action: Instant,
}

impl Dealer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GameConfig,
        grid: Arc<Grid>,
        queue: Arc<ProposalQueue>,
        oracle: Arc<dyn Oracle>,
        ui: Arc<dyn Ui>,
        shutdown: Arc<ShutdownToken>,
        dealing: Arc<AtomicBool>,
        players: Vec<Arc<Player>>,
        rng_seed: u64,
    ) -> Self {
        let deck = (0..config.deck_size).collect();
        Self {
            config,
            grid,
            queue,
            oracle,
            ui,
            shutdown,
            dealing,
            players,
            deck,
            rng: StdRng::seed_from_u64(rng_seed),
            reshuffle_deadline: None,
            hint_time: None,
            last_action: Instant::now(),
        }
    }

    /// Main loop. Spawns every player (and, for bots, their driver) thread
    /// in id order before looping, and tears them all down in reverse id
    /// order once the game ends.
    pub fn run(mut self) -> GameResult {
        self.dealing.store(true, Ordering::Release);
        let mut handles = self.spawn_players();

        while !self.should_finish() {
            self.place_cards_on_table();
            self.arm_timer();
            self.timer_loop();
            self.remove_all_cards_from_table();
        }

        let result = self.compute_result();
        self.terminate(&mut handles);
        self.ui.announce_winner(&result.winners);
        result
    }

    fn spawn_players(&self) -> Vec<PlayerHandle> {
        let mut handles = Vec::with_capacity(self.players.len());
        for (index, player) in self.players.iter().enumerate() {
            let thread_player = player.clone();
            let thread = std::thread::Builder::new()
                .name(format!("set-player-{}", player.id()))
                .spawn(move || thread_player.run())
                .expect("failed to spawn player thread");

            let bot_thread = if !player.info.human {
                let bot = BotDriver::new(
                    player.clone(),
                    self.grid.clone(),
                    self.shutdown.clone(),
                    self.rng_seed_for(index),
                );
                Some(
                    std::thread::Builder::new()
                        .name(format!("set-bot-{}", player.id()))
                        .spawn(move || bot.run())
                        .expect("failed to spawn bot thread"),
                )
            } else {
                None
            };

            handles.push(PlayerHandle { player: player.clone(), thread, bot_thread });
        }
        handles
    }

    fn rng_seed_for(&self, index: usize) -> u64 {
        // Deterministic per-player seed derived from the dealer's own seed,
        // so a seeded game is fully reproducible end to end.
        self.deck.len() as u64 ^ (index as u64).wrapping_mul(0x9E3779B97F4A7C15)
    }

    /// The game ends once the remaining deck can no longer extend it, even
    /// if the live grid still happens to hold a playable set.
    fn should_finish(&self) -> bool {
        self.shutdown.is_cancelled() || self.oracle.find_sets(&self.deck, 1).is_empty()
    }

    fn timer_loop(&mut self) {
        while !self.shutdown.is_cancelled() && self.within_deadline() && self.grid.count_cards() > 0 {
            self.queue.wait_for_work(Duration::from_millis(BREAK_MILLIS));
            self.update_timer_display();
            self.drain_and_validate();
            self.place_cards_on_table();
        }
    }

    fn within_deadline(&self) -> bool {
        match self.reshuffle_deadline {
            Some(deadline) => Instant::now() < deadline,
            None => true,
        }
    }

    fn arm_timer(&mut self) {
        let now = Instant::now();
        self.reshuffle_deadline = self.config.turn_timeout().map(|timeout| now + timeout);
        self.last_action = now;
        self.hint_time = if self.config.hints {
            let delay = match self.config.turn_timeout() {
                Some(timeout) => timeout / 3,
                None => Duration::from_secs(30),
            };
            Some(now + delay)
        } else {
            None
        };
    }

    fn update_timer_display(&mut self) {
        if self.config.turn_timeout_millis > 0 {
            if let Some(deadline) = self.reshuffle_deadline {
                let remaining = deadline.saturating_duration_since(Instant::now()).as_millis() as u64;
                let warn = remaining < self.config.turn_timeout_warning_millis;
                self.ui.set_countdown(remaining, warn);
            }
        } else if self.config.is_elapsed_mode() {
            let elapsed = Instant::now().saturating_duration_since(self.last_action).as_millis() as u64;
            self.ui.set_elapsed(elapsed);
        }

        if let Some(hint_at) = self.hint_time {
            if Instant::now() >= hint_at {
                self.emit_hint();
                self.hint_time = None;
            }
        }
    }

    fn emit_hint(&self) {
        let sets = self.oracle.find_sets(&self.grid.cards_on_table(), 1);
        if let Some(set) = sets.first() {
            self.ui.hint(set);
        }
    }

    /// Holds the `ProposalQueue` exclusivity token for the whole drain,
    /// following the lock order queue token, then slot monitor, then
    /// verdict monitor.
    fn drain_and_validate(&mut self) {
        let mut guard = self.queue.lock_exclusive();
        while let Some(player_id) = guard.pop() {
            self.validate_one(player_id);
        }
    }

    fn validate_one(&mut self, player_id: PlayerId) {
        let Some(player) = self.player_by_id(player_id) else {
            return;
        };
        let proposal = self.grid.player_proposal(player_id);
        if proposal.len() != self.config.feature_size {
            // A racing `remove_card` invalidated the proposal; deliver a
            // silent neutral verdict, but still wake the player so it does
            // not deadlock.
            player.deliver_verdict(Verdict::Neutral);
            return;
        }

        let cards: Vec<Card> = proposal.iter().map(|&(_, card)| card).collect();
        if self.oracle.test_set(&cards) {
            for &(slot, _) in &proposal {
                self.grid.remove_card(slot);
            }
            player.deliver_verdict(Verdict::Legal);
            self.last_action = Instant::now();
            self.arm_timer();
        } else {
            player.deliver_verdict(Verdict::Illegal);
        }
    }

    fn player_by_id(&self, id: PlayerId) -> Option<&Arc<Player>> {
        self.players.iter().find(|p| p.id() == id)
    }

    fn shuffle_deck(&mut self) {
        self.deck.shuffle(&mut self.rng);
    }

    fn place_cards_on_table(&mut self) {
        // Gate `key_pressed` for the whole call, not just the explicit
        // teardown in `remove_all_cards_from_table`: no new inputs should be
        // accepted while any `place_cards_on_table` is in flight, including
        // the mid-round refills `timer_loop` triggers after a scored set.
        self.dealing.store(true, Ordering::Release);
        self.shuffle_deck();
        for slot in self.grid.empty_slots() {
            match self.deck.pop() {
                Some(card) => {
                    self.grid.place_card(card, slot);
                }
                None => break,
            }
        }

        if self.config.is_elapsed_mode()
            && self.oracle.find_sets(&self.grid.cards_on_table(), 1).is_empty()
        {
            self.rebuild_table_with_set();
        }

        self.dealing.store(false, Ordering::Release);
    }

    /// Rebuilds the table so it holds at least one legal set: reserves the
    /// oracle's chosen set first, then fills the remaining slots, rather
    /// than pulling from the deck twice.
    fn rebuild_table_with_set(&mut self) {
        for slot in 0..self.grid.table_size() as Slot {
            if let Some(card) = self.grid.remove_card(slot) {
                self.deck.push(card);
            }
        }

        let Some(set) = self.oracle.find_sets(&self.deck, 1).into_iter().next() else {
            tracing::warn!(target: LOG_TARGET, "no legal set remains anywhere; ending the game");
            self.shutdown.cancel();
            return;
        };

        self.deck.retain(|card| !set.contains(card));
        self.shuffle_deck();

        let table_size = self.grid.table_size();
        let mut ordered = set;
        ordered.append(&mut self.deck);

        for (slot, &card) in ordered.iter().enumerate().take(table_size) {
            self.grid.place_card(card, slot as Slot);
        }

        self.deck = if ordered.len() > table_size {
            ordered.split_off(table_size)
        } else {
            Vec::new()
        };
    }

    fn remove_all_cards_from_table(&mut self) {
        self.dealing.store(true, Ordering::Release);
        for slot in 0..self.grid.table_size() as Slot {
            if let Some(card) = self.grid.remove_card(slot) {
                self.deck.push(card);
            }
        }
    }

    fn compute_result(&self) -> GameResult {
        let scores: Vec<(PlayerId, u32)> = self.players.iter().map(|p| (p.id(), p.info.score())).collect();
        let max = scores.iter().map(|&(_, score)| score).max().unwrap_or(0);
        let mut winners: Vec<PlayerId> = scores
            .iter()
            .filter(|&&(_, score)| score == max)
            .map(|&(id, _)| id)
            .collect();
        winners.sort_unstable();
        GameResult { winners, scores }
    }

    /// Players are interrupted and joined in reverse id order, each fully
    /// exited before the next is touched.
    fn terminate(&mut self, handles: &mut Vec<PlayerHandle>) {
        self.shutdown.cancel();
        while let Some(handle) = handles.pop() {
            handle.player.interrupt();
            handle.join();
        }
    }
}
