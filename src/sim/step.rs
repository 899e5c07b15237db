/// The step function: advances the world by one frame.
///
/// Processing order (Playing):
///   1. Comment fade
///   2. Spawners (coins, then rugs)
///   3. Player: walk → jump → gravity → floor / bounds
///   4. Fallers move, off-screen ones are culled
///   5. Coin pickup (score, quota, level transition)
///   6. Rug contact (loss)
///
/// Coins resolve before rugs, so a frame that both completes the route and
/// touches a rug is a win: `end_game` latches on the first call.
///
/// Finished runs (GameOver / RouteCompleted) are frozen; only the comment
/// and the return-home delay keep ticking.

use rand::Rng;

use crate::domain::entity::{Faller, FrameInput, MoveDir, CAT_H, CAT_W};
use crate::domain::geometry::{FLOOR_TOP, WORLD_W};
use crate::domain::levels::{self, FIRST_COIN_COMMENT};
use crate::domain::timer::Delay;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

/// Longest frame the physics will integrate in one go.
pub const MAX_DT_MS: u32 = 100;

const COIN_X_RANGE: (f32, f32) = (80.0, 820.0);
const RUG_X_RANGE: (f32, f32) = (120.0, 800.0);

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, dt_ms: u32) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if world.paused { return events; }
    let dt_ms = dt_ms.min(MAX_DT_MS);

    match world.phase {
        Phase::Home => return events,
        phase if phase.is_finished() => {
            resolve_comment(world, dt_ms);
            if world.end_delay.tick(dt_ms) {
                world.return_home();
                events.push(GameEvent::ReturnedHome);
            }
            return events;
        }
        _ => {}
    }

    world.anim_tick = world.anim_tick.wrapping_add(1);
    let dt_s = dt_ms as f32 / 1000.0;

    resolve_comment(world, dt_ms);
    resolve_spawns(world, dt_ms);
    resolve_player(world, input, dt_s, &mut events);
    resolve_fallers(world, dt_s);
    resolve_coin_pickup(world, &mut events);
    resolve_rug_contact(world, &mut events);

    events
}

/// Retry from the first level (same as starting from home).
pub fn restart_run(world: &mut WorldState) {
    world.start_run();
}

// ══════════════════════════════════════════════════════════════
// Comment
// ══════════════════════════════════════════════════════════════

fn resolve_comment(world: &mut WorldState, dt_ms: u32) {
    if let Some(toast) = world.comment.as_mut() {
        toast.tick(dt_ms);
        if toast.expired() {
            world.comment = None;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Spawners
// ══════════════════════════════════════════════════════════════

fn resolve_spawns(world: &mut WorldState, dt_ms: u32) {
    let coin_speed = world.tuning.coin_speed;
    for _ in 0..world.coin_timer.tick(dt_ms) {
        let x = world.rng.gen_range(COIN_X_RANGE.0..=COIN_X_RANGE.1);
        world.coins.push(Faller::coin(x, coin_speed));
    }

    let rug_speed = world.tuning.rug_speed;
    for _ in 0..world.rug_timer.tick(dt_ms) {
        let x = world.rng.gen_range(RUG_X_RANGE.0..=RUG_X_RANGE.1);
        world.rugs.push(Faller::rug(x, rug_speed));
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, input: FrameInput, dt_s: f32, events: &mut Vec<GameEvent>) {
    let t = &world.tuning;
    let p = &mut world.player;

    p.vx = match input.movement {
        Some(MoveDir::Left) => -t.run_speed,
        Some(MoveDir::Right) => t.run_speed,
        None => 0.0,
    };

    if input.jump && p.on_ground {
        p.vy = -t.jump_velocity;
        p.on_ground = false;
        events.push(GameEvent::Jumped);
    }

    p.vy += t.gravity * dt_s;
    p.x += p.vx * dt_s;
    p.y += p.vy * dt_s;

    // Floor spans the whole field: anything at or below its top lands.
    let half_h = CAT_H / 2.0;
    if p.y + half_h >= FLOOR_TOP && p.vy >= 0.0 {
        p.y = FLOOR_TOP - half_h;
        p.vy = 0.0;
        p.on_ground = true;
    } else {
        p.on_ground = false;
    }

    // World bounds
    let half_w = CAT_W / 2.0;
    p.x = p.x.clamp(half_w, WORLD_W - half_w);
    if p.y - half_h < 0.0 {
        p.y = half_h;
        p.vy = p.vy.max(0.0);
    }
}

// ══════════════════════════════════════════════════════════════
// Coins & rugs
// ══════════════════════════════════════════════════════════════

fn resolve_fallers(world: &mut WorldState, dt_s: f32) {
    for f in world.coins.iter_mut().chain(world.rugs.iter_mut()) {
        f.advance(dt_s);
    }
    world.coins.retain(|c| !c.off_screen());
    world.rugs.retain(|r| !r.off_screen());
}

fn resolve_coin_pickup(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let cat = world.player.rect();
    let inset = world.tuning.coin_hitbox_inset;

    let mut touched = 0u32;
    world.coins.retain(|c| {
        let hit = cat.overlaps(&c.rect().inset(inset));
        if hit { touched += 1; }
        !hit
    });

    for _ in 0..touched {
        if world.game_over { break; }
        collect_coin(world, events);
    }
}

fn collect_coin(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.score += 1;
    world.level_coins += 1;
    events.push(GameEvent::CoinCollected { score: world.score });

    if world.level_coins == 1 {
        world.show_comment(FIRST_COIN_COMMENT);
        events.push(GameEvent::CommentShown);
    }

    if world.level_coins >= world.tuning.coins_per_level {
        next_level(world, events);
    }
}

fn next_level(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.current_level += 1;
    world.level_coins = 0;

    let level = match levels::level(world.current_level) {
        Some(l) => l,
        None => {
            end_game(world, true, events);
            return;
        }
    };

    world.coin_timer.set_interval(level.coin_interval_ms);
    world.rug_timer.set_interval(level.rug_interval_ms);
    world.show_comment(level.comment);
    events.push(GameEvent::LevelAdvanced { level: world.current_level });
    events.push(GameEvent::CommentShown);
    tracing::info!(
        level = level.name,
        score = world.score,
        coin_ms = world.coin_timer.interval_ms(),
        rug_ms = world.rug_timer.interval_ms(),
        "level advanced"
    );
}

fn resolve_rug_contact(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let cat = world.player.rect();
    let inset = world.tuning.rug_hitbox_inset;
    if world.rugs.iter().any(|r| cat.overlaps(&r.rect().inset(inset))) {
        end_game(world, false, events);
    }
}

// ══════════════════════════════════════════════════════════════
// End of run
// ══════════════════════════════════════════════════════════════

fn end_game(world: &mut WorldState, win: bool, events: &mut Vec<GameEvent>) {
    if world.game_over { return; }
    world.game_over = true;

    world.coin_timer.stop();
    world.rug_timer.stop();

    if win {
        world.phase = Phase::RouteCompleted;
        events.push(GameEvent::RouteCompleted);
    } else {
        world.phase = Phase::GameOver;
        events.push(GameEvent::PlayerHit);
    }

    if world.score > world.best_score {
        world.best_score = world.score;
        events.push(GameEvent::NewBest { score: world.score });
    }

    world.end_delay = Delay::new(world.tuning.end_delay_ms);
    tracing::info!(win, score = world.score, level = world.current_level, "run ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Player, CAT_START};
    use crate::domain::levels::LEVELS;
    use crate::sim::world::test_world;

    const IDLE: FrameInput = FrameInput { movement: None, jump: false };

    /// A started run with the cat already standing on the floor.
    fn playing_world() -> WorldState {
        let mut w = test_world(7);
        w.start_run();
        w.player = Player::standing_at(CAT_START.0);
        w
    }

    fn coin_on_cat(w: &mut WorldState) {
        let (x, y) = (w.player.x, w.player.y);
        let mut c = Faller::coin(x, 0.0);
        c.y = y;
        w.coins.push(c);
    }

    fn rug_at(w: &mut WorldState, x: f32, y: f32) {
        let mut r = Faller::rug(x, 0.0);
        r.y = y;
        w.rugs.push(r);
    }

    fn rug_on_cat(w: &mut WorldState) {
        let (x, y) = (w.player.x, w.player.y);
        rug_at(w, x, y);
    }

    // ── Phases ──

    #[test]
    fn home_and_pause_do_nothing() {
        let mut w = test_world(1);
        assert!(step(&mut w, IDLE, 16).is_empty());
        assert_eq!(w.phase, Phase::Home);

        let mut w = playing_world();
        w.paused = true;
        let y = w.player.y;
        for _ in 0..50 { step(&mut w, IDLE, 100); }
        assert!(w.coins.is_empty());
        assert_eq!(w.player.y, y);
    }

    // ── Spawning ──

    #[test]
    fn coin_spawns_every_900ms_and_rug_every_1800ms() {
        let mut w = playing_world();
        for _ in 0..8 { step(&mut w, IDLE, 100); }
        assert!(w.coins.is_empty());
        step(&mut w, IDLE, 100);
        assert_eq!(w.coins.len(), 1);
        assert!(w.rugs.is_empty());

        for _ in 0..9 { step(&mut w, IDLE, 100); }
        assert_eq!(w.coins.len(), 2);
        assert_eq!(w.rugs.len(), 1);
    }

    #[test]
    fn spawn_columns_stay_in_range() {
        let mut w = playing_world();
        resolve_spawns(&mut w, 90_000);
        assert_eq!(w.coins.len(), 100);
        assert_eq!(w.rugs.len(), 50);
        assert!(w.coins.iter().all(|c| (80.0f32..=820.0).contains(&c.x) && c.y == -30.0));
        assert!(w.rugs.iter().all(|r| (120.0f32..=800.0).contains(&r.x) && r.y == -40.0));
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut w = playing_world();
        let left = FrameInput { movement: Some(MoveDir::Left), jump: false };
        step(&mut w, left, 5_000);
        assert!(w.coins.is_empty());
        // 100ms at 240 units/s, not 5s
        assert!((w.player.x - (CAT_START.0 - 24.0)).abs() < 1e-3);

        // spawner saw 100ms too: the first coin is due 800ms later
        for _ in 0..7 { step(&mut w, IDLE, 100); }
        step(&mut w, IDLE, 99);
        assert!(w.coins.is_empty());
        step(&mut w, IDLE, 1);
        assert_eq!(w.coins.len(), 1);
    }

    #[test]
    fn fallers_are_culled_below_the_field() {
        let mut w = playing_world();
        let mut c = Faller::coin(700.0, 300.0);
        c.y = 590.0;
        w.coins.push(c);
        step(&mut w, IDLE, 100);
        assert!(w.coins.is_empty());
    }

    // ── Player ──

    #[test]
    fn jump_only_from_the_ground() {
        let mut w = playing_world();
        let events = step(&mut w, FrameInput { movement: None, jump: true }, 16);
        assert!(events.contains(&GameEvent::Jumped));
        assert!(!w.player.on_ground);
        assert!(w.player.vy < 0.0);

        let vy = w.player.vy;
        let events = step(&mut w, FrameInput { movement: None, jump: true }, 16);
        assert!(!events.contains(&GameEvent::Jumped));
        assert!(w.player.vy > vy); // gravity only
    }

    #[test]
    fn jump_lands_back_on_floor() {
        let mut w = playing_world();
        let rest_y = w.player.y;
        step(&mut w, FrameInput { movement: None, jump: true }, 16);
        for _ in 0..100 { step(&mut w, IDLE, 16); }
        assert!(w.player.on_ground);
        assert_eq!(w.player.y, rest_y);
    }

    #[test]
    fn spawn_drop_settles_on_floor() {
        let mut w = test_world(3);
        w.start_run();
        assert!(!w.player.on_ground);
        for _ in 0..30 { step(&mut w, IDLE, 16); }
        assert!(w.player.on_ground);
        assert_eq!(w.player.rect().bottom(), FLOOR_TOP);
    }

    #[test]
    fn walking_is_clamped_to_the_field() {
        let mut w = playing_world();
        let left = FrameInput { movement: Some(MoveDir::Left), jump: false };
        step(&mut w, left, 100);
        assert!((w.player.x - (CAT_START.0 - 24.0)).abs() < 1e-3);
        for _ in 0..10 { step(&mut w, left, 100); }
        assert_eq!(w.player.x, CAT_W / 2.0);

        step(&mut w, IDLE, 100);
        assert_eq!(w.player.vx, 0.0);
    }

    // ── Coins & levels ──

    #[test]
    fn first_coin_scores_and_comments() {
        let mut w = playing_world();
        coin_on_cat(&mut w);
        let events = step(&mut w, IDLE, 16);

        assert_eq!(w.score, 1);
        assert_eq!(w.level_coins, 1);
        assert!(w.coins.is_empty());
        assert!(events.contains(&GameEvent::CoinCollected { score: 1 }));
        assert_eq!(w.comment.as_ref().map(|c| c.text.as_str()), Some(FIRST_COIN_COMMENT));
    }

    #[test]
    fn quota_advances_level_and_retunes_spawners() {
        let mut w = playing_world();
        w.level_coins = 9;
        w.score = 9;
        coin_on_cat(&mut w);
        let events = step(&mut w, IDLE, 16);

        assert_eq!(w.current_level, 1);
        assert_eq!(w.level_coins, 0);
        assert_eq!(w.score, 10);
        assert!(events.contains(&GameEvent::LevelAdvanced { level: 1 }));
        assert_eq!(w.level().name, "Batu Caves");
        assert_eq!(w.coin_timer.interval_ms(), LEVELS[1].coin_interval_ms);
        assert_eq!(w.rug_timer.interval_ms(), LEVELS[1].rug_interval_ms);
        assert_eq!(w.comment.as_ref().map(|c| c.text.as_str()), Some(LEVELS[1].comment));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn several_coins_in_one_frame_carry_into_next_level() {
        let mut w = playing_world();
        w.level_coins = 9;
        w.score = 9;
        coin_on_cat(&mut w);
        coin_on_cat(&mut w);
        step(&mut w, IDLE, 16);
        assert_eq!(w.score, 11);
        assert_eq!(w.current_level, 1);
        assert_eq!(w.level_coins, 1);
    }

    #[test]
    fn clearing_last_quota_completes_route() {
        let mut w = playing_world();
        w.current_level = 3;
        w.level_coins = 9;
        w.score = 39;
        coin_on_cat(&mut w);
        let events = step(&mut w, IDLE, 16);

        assert_eq!(w.phase, Phase::RouteCompleted);
        assert!(w.game_over);
        assert!(!w.coin_timer.is_running());
        assert!(!w.rug_timer.is_running());
        assert!(events.contains(&GameEvent::RouteCompleted));
        assert!(events.contains(&GameEvent::NewBest { score: 40 }));
        assert_eq!(w.best_score, 40);
    }

    #[test]
    fn extra_coins_after_route_completion_do_not_score() {
        let mut w = playing_world();
        w.current_level = 3;
        w.level_coins = 9;
        w.score = 39;
        for _ in 0..3 { coin_on_cat(&mut w); }
        let events = step(&mut w, IDLE, 16);

        assert_eq!(w.score, 40);
        assert_eq!(w.phase, Phase::RouteCompleted);
        assert!(w.coins.is_empty());
        let collected = events.iter()
            .filter(|e| matches!(e, GameEvent::CoinCollected { .. }))
            .count();
        assert_eq!(collected, 1);
    }

    #[test]
    fn full_route_with_small_quota() {
        let mut w = playing_world();
        w.tuning.coins_per_level = 2;
        for _ in 0..8 {
            assert_eq!(w.phase, Phase::Playing);
            coin_on_cat(&mut w);
            step(&mut w, IDLE, 1);
        }
        assert_eq!(w.phase, Phase::RouteCompleted);
        assert_eq!(w.score, 8);
    }

    // ── Rugs & latch ──

    #[test]
    fn rug_contact_ends_run() {
        let mut w = playing_world();
        w.score = 5;
        rug_on_cat(&mut w);
        let events = step(&mut w, IDLE, 16);

        assert_eq!(w.phase, Phase::GameOver);
        assert!(events.contains(&GameEvent::PlayerHit));
        assert!(events.contains(&GameEvent::NewBest { score: 5 }));
        assert!(!w.coin_timer.is_running());
    }

    #[test]
    fn grazing_rug_is_forgiven_by_inset() {
        let mut w = playing_world();
        let (cat_x, cat_top) = (w.player.x, w.player.rect().top());
        // full box overlaps by 3 units, inset box does not
        rug_at(&mut w, cat_x, cat_top + 3.0 - 20.0);
        step(&mut w, IDLE, 1);
        assert_eq!(w.phase, Phase::Playing);

        w.rugs.clear();
        rug_at(&mut w, cat_x, cat_top + 15.0 - 20.0);
        step(&mut w, IDLE, 1);
        assert_eq!(w.phase, Phase::GameOver);
    }

    #[test]
    fn win_and_rug_in_same_frame_stays_a_win() {
        let mut w = playing_world();
        w.current_level = 3;
        w.level_coins = 9;
        coin_on_cat(&mut w);
        rug_on_cat(&mut w);
        let events = step(&mut w, IDLE, 16);

        assert_eq!(w.phase, Phase::RouteCompleted);
        assert!(!events.contains(&GameEvent::PlayerHit));
    }

    #[test]
    fn best_score_only_grows() {
        let mut w = playing_world();
        w.best_score = 50;
        w.score = 5;
        rug_on_cat(&mut w);
        let events = step(&mut w, IDLE, 16);
        assert_eq!(w.best_score, 50);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::NewBest { .. })));
    }

    // ── After the run ──

    #[test]
    fn finished_run_is_frozen_then_returns_home() {
        let mut w = playing_world();
        rug_on_cat(&mut w);
        step(&mut w, IDLE, 16);
        assert_eq!(w.phase, Phase::GameOver);

        let rug_y = w.rugs[0].y;
        for _ in 0..24 {
            assert!(step(&mut w, IDLE, 100).is_empty());
        }
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.rugs[0].y, rug_y);
        assert!(w.coins.is_empty());

        let events = step(&mut w, IDLE, 100);
        assert_eq!(events, vec![GameEvent::ReturnedHome]);
        assert_eq!(w.phase, Phase::Home);
        assert!(w.rugs.is_empty());
    }

    #[test]
    fn restart_after_loss_clears_latch() {
        let mut w = playing_world();
        rug_on_cat(&mut w);
        step(&mut w, IDLE, 16);
        restart_run(&mut w);
        assert_eq!(w.phase, Phase::Playing);
        assert!(!w.game_over);
        assert!(w.rugs.is_empty());
        assert!(w.coin_timer.is_running());
    }
}
