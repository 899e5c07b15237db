/// WorldState: the complete snapshot of a running game.
///
/// ## Phases
///
///   Home ──start_run──▶ Playing ──rug──────▶ GameOver ───┐
///                          │                              ├─ end delay ─▶ Home
///                          └──last quota──▶ RouteCompleted┘
///
/// `GameOver` / `RouteCompleted` are reached only through `end_game`, which
/// latches: once a run has ended, nothing in the same run can end it again.

use rand::rngs::StdRng;

use crate::config::Tuning;
use crate::domain::entity::{Faller, Player, CAT_START};
use crate::domain::levels::{self, Level, LEVELS};
use crate::domain::timer::{Delay, Repeater};
use crate::domain::toast::Toast;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Home,
    Playing,
    GameOver,
    RouteCompleted,
}

impl Phase {
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::GameOver | Phase::RouteCompleted)
    }
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub coins: Vec<Faller>,
    pub rugs: Vec<Faller>,

    // ── Run tracking ──
    pub phase: Phase,
    pub score: u32,
    pub level_coins: u32,
    pub current_level: usize,
    pub best_score: u32,
    /// The game-over latch. Set once by `end_game`, cleared by `start_run`.
    pub game_over: bool,

    // ── Timers ──
    pub coin_timer: Repeater,
    pub rug_timer: Repeater,
    pub end_delay: Delay,

    // ── UI ──
    pub comment: Option<Toast>,
    pub paused: bool,
    pub anim_tick: u32,

    // ── Config / randomness ──
    pub tuning: Tuning,
    pub rng: StdRng,
}

impl WorldState {
    pub fn new(tuning: Tuning, rng: StdRng) -> Self {
        WorldState {
            player: Player::standing_at(CAT_START.0),
            coins: vec![],
            rugs: vec![],
            phase: Phase::Home,
            score: 0,
            level_coins: 0,
            current_level: 0,
            best_score: 0,
            game_over: false,
            coin_timer: Repeater::stopped(),
            rug_timer: Repeater::stopped(),
            end_delay: Delay::disarmed(),
            comment: None,
            paused: false,
            anim_tick: 0,
            tuning,
            rng,
        }
    }

    /// Begin a fresh run from the first level.
    pub fn start_run(&mut self) {
        self.score = 0;
        self.level_coins = 0;
        self.current_level = 0;
        self.game_over = false;
        self.paused = false;
        self.anim_tick = 0;
        self.coins.clear();
        self.rugs.clear();
        self.player = Player::new(CAT_START.0, CAT_START.1);
        self.end_delay = Delay::disarmed();

        let first = &LEVELS[0];
        self.coin_timer.restart(first.coin_interval_ms);
        self.rug_timer.restart(first.rug_interval_ms);
        self.show_comment(first.comment);
        self.phase = Phase::Playing;
        tracing::info!(level = first.name, "run started");
    }

    /// Replace the current comment (the old one is dropped immediately).
    pub fn show_comment(&mut self, text: &str) {
        self.comment = Some(Toast::new(text, self.tuning.comment_ms));
    }

    /// Data for the level being played. Clamped to the last level once the
    /// route is complete so the final screen keeps its backdrop.
    pub fn level(&self) -> &'static Level {
        levels::level(self.current_level).unwrap_or(&LEVELS[levels::LEVEL_COUNT - 1])
    }

    /// Back to the home screen, keeping config and best score.
    pub fn return_home(&mut self) {
        self.phase = Phase::Home;
        self.paused = false;
        self.comment = None;
        self.coins.clear();
        self.rugs.clear();
        self.coin_timer.stop();
        self.rug_timer.stop();
        self.end_delay = Delay::disarmed();
        self.anim_tick = 0;
    }
}

#[cfg(test)]
pub fn test_world(seed: u64) -> WorldState {
    use rand::SeedableRng;
    WorldState::new(Tuning::default(), StdRng::seed_from_u64(seed))
}
