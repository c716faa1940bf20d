/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Commands (restart → undo → skip), each ends the tick
///   2. Entity pass in declaration order:
///        - timers (skeleton, ice, explosion), switch → door state
///        - player: declare move, snapshot + count + broadcast once, move
///        - armed rogue / mage take their step
///   3. Collect exploded entities and spent explosions
///   4. Commit spawns and removals
///   5. Death check, then all-targets check
///
/// The entity list is never resized during the pass; indices taken in
/// step 2 stay valid until step 4.

use tracing::{debug, info};

use crate::domain::ai;
use crate::domain::entity::{Effect, Entity, EntityId, EntityKind, Unit, Variant};
use crate::domain::position::{Direction, Position};
use crate::domain::rules::{self, MoveOutcome};
use crate::domain::tile::Terrain;
use crate::domain::undo::{BlockSnapshot, PlayerSnapshot};
use super::event::GameEvent;
use super::world::{Phase, WorldState};

/// One tick of driver input. Movement is edge-triggered by the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub delta_ms: u32,
    pub movement: Option<Direction>,
    pub restart: bool,
    pub undo: bool,
    pub skip: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if matches!(world.phase, Phase::LevelComplete | Phase::GameComplete) { return events; }
    world.tick += 1;

    if resolve_commands(world, &input, &mut events) { return events; }

    let movement = if world.phase == Phase::Playing { input.movement } else { None };
    resolve_entities(world, input.delta_ms, movement, &mut events);
    let (spawns, removals) = collect_destroyed(world);
    commit(world, spawns, removals, &mut events);

    if world.phase == Phase::Playing {
        if !resolve_death(world, &mut events) {
            resolve_win(world, &mut events);
        }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════

/// Returns true if a command consumed the tick.
fn resolve_commands(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) -> bool {
    if input.restart {
        restart_level(world);
        events.push(GameEvent::Restarted);
        return true;
    }
    // A dead player can only restart.
    if world.phase != Phase::Playing { return false; }

    if input.undo {
        if undo_turn(world) { events.push(GameEvent::Undone); }
        return true;
    }
    if input.skip {
        info!(level = world.level_index, "level skipped");
        world.phase = Phase::LevelComplete;
        events.push(GameEvent::Skipped);
        return true;
    }
    false
}

/// Rebuild the level from its data: move count 0, no history.
pub fn restart_level(world: &mut WorldState) {
    info!(level = world.level_index, moves = world.move_count, "level restarted");
    world.reset_level();
}

// ══════════════════════════════════════════════════════════════
// Undo
// ══════════════════════════════════════════════════════════════

enum Restore {
    Player(PlayerSnapshot),
    Block(BlockSnapshot),
}

/// Roll back one player turn. No-op (false) at turn zero.
///
/// Coverings are released for every block before any is re-established,
/// so blocks that swapped goals within the turn restore cleanly.
pub fn undo_turn(world: &mut WorldState) -> bool {
    if world.move_count == 0 { return false; }
    world.move_count -= 1;

    let mut restores: Vec<(usize, Restore)> = vec![];
    for (i, e) in world.entities.iter_mut().enumerate() {
        match &mut e.kind {
            EntityKind::Block(b) => {
                if let Some(s) = b.history.pop() { restores.push((i, Restore::Block(s))); }
            }
            EntityKind::Unit(Unit::Player(p)) => {
                if let Some(s) = p.history.pop() { restores.push((i, Restore::Player(s))); }
            }
            _ => {}
        }
    }

    for (i, r) in &restores {
        if let Restore::Block(_) = r { rules::release_covering(&mut world.entities, *i); }
    }
    for (i, r) in restores {
        match r {
            Restore::Player(s) => world.entities[i].pos = s.pos,
            Restore::Block(s) => {
                world.entities[i].pos = s.pos;
                rules::cover(&mut world.entities, i, s.covering);
                rules::halt_ice(&mut world.entities, i);
            }
        }
    }

    debug!(moves = world.move_count, "turn undone");
    true
}

/// Push one snapshot onto every participant's stack.
fn save_turn(world: &mut WorldState) {
    for e in world.entities.iter_mut() {
        let pos = e.pos;
        match &mut e.kind {
            EntityKind::Block(b) => {
                let snap = b.snapshot(pos);
                b.history.push(snap);
            }
            EntityKind::Unit(Unit::Player(p)) => p.history.push(PlayerSnapshot { pos }),
            EntityKind::Terrain(_) | EntityKind::Unit(_) | EntityKind::Effect(_) => {}
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Entity pass
// ══════════════════════════════════════════════════════════════

fn resolve_entities(
    world: &mut WorldState,
    delta_ms: u32,
    movement: Option<Direction>,
    events: &mut Vec<GameEvent>,
) {
    let mut turn_taken = false;
    for i in 0..world.entities.len() {
        match world.entities[i].variant() {
            Variant::Player => {
                if let Some(dir) = movement {
                    player_turn(world, i, dir, &mut turn_taken, events);
                }
            }
            Variant::Skeleton => skeleton_update(world, i, delta_ms),
            Variant::Rogue => rogue_update(world, i, events),
            Variant::Mage => mage_update(world, i),
            Variant::Ice => {
                let ctx = world.move_ctx();
                rules::slide_ice(&mut world.entities, i, delta_ms, ctx);
            }
            Variant::Switch => {
                if let Some(t) = world.entities[i].terrain() { world.door_open = t.is_covered(); }
            }
            Variant::Door => {
                let open_now = world.door_open;
                if let EntityKind::Terrain(Terrain::Door { open }) = &mut world.entities[i].kind {
                    *open = open_now;
                }
            }
            Variant::Explosion => {
                if let EntityKind::Effect(Effect::Explosion { age_ms }) = &mut world.entities[i].kind {
                    *age_ms = age_ms.saturating_add(delta_ms);
                }
            }
            Variant::Floor
            | Variant::Wall
            | Variant::CrackedWall
            | Variant::Target
            | Variant::Stone
            | Variant::Tnt
            | Variant::Blood => {}
        }
    }
}

/// The first player to move records the turn, then every player moves.
fn player_turn(
    world: &mut WorldState,
    i: usize,
    dir: Direction,
    turn_taken: &mut bool,
    events: &mut Vec<GameEvent>,
) {
    if !*turn_taken {
        *turn_taken = true;
        let target = world.entities[i].pos.step(dir, world.bounds);
        save_turn(world);
        world.move_count += 1;
        broadcast_player_moved(world, target);
        events.push(GameEvent::PlayerMoved);
    }

    let ctx = world.move_ctx();
    if let MoveOutcome::Pushed(id) = rules::make_push_move(&mut world.entities, i, dir, ctx) {
        events.push(GameEvent::BlockPushed { id });
    }
}

/// Arm the turn-driven units. Mages remember the gap to the player's target.
fn broadcast_player_moved(world: &mut WorldState, target: Position) {
    for e in world.entities.iter_mut() {
        let pos = e.pos;
        match &mut e.kind {
            EntityKind::Unit(Unit::Rogue { armed, .. }) => *armed = true,
            EntityKind::Unit(Unit::Mage { armed, toward }) => {
                *armed = true;
                *toward = (target.x() - pos.x(), target.y() - pos.y());
            }
            _ => {}
        }
    }
}

fn skeleton_update(world: &mut WorldState, i: usize, delta_ms: u32) {
    let threshold = world.timing.skeleton_step_ms;
    let due = match &mut world.entities[i].kind {
        EntityKind::Unit(Unit::Skeleton { since_step_ms, .. }) => {
            if *since_step_ms >= threshold {
                *since_step_ms = 0;
                true
            } else {
                *since_step_ms = since_step_ms.saturating_add(delta_ms);
                false
            }
        }
        _ => false,
    };
    if due { ai::skeleton_step(&mut world.entities, i, world.bounds); }
}

fn rogue_update(world: &mut WorldState, i: usize, events: &mut Vec<GameEvent>) {
    let was_armed = match &mut world.entities[i].kind {
        EntityKind::Unit(Unit::Rogue { armed, .. }) => std::mem::replace(armed, false),
        _ => false,
    };
    if !was_armed { return; }
    let ctx = world.move_ctx();
    if let MoveOutcome::Pushed(id) = ai::rogue_step(&mut world.entities, i, ctx) {
        events.push(GameEvent::BlockPushed { id });
    }
}

fn mage_update(world: &mut WorldState, i: usize) {
    let was_armed = match &mut world.entities[i].kind {
        EntityKind::Unit(Unit::Mage { armed, .. }) => std::mem::replace(armed, false),
        _ => false,
    };
    if was_armed { ai::mage_step(&mut world.entities, i, world.bounds); }
}

// ══════════════════════════════════════════════════════════════
// Destruction
// ══════════════════════════════════════════════════════════════

/// Exploding entities and spent explosions. A cracked wall leaves an explosion behind.
fn collect_destroyed(world: &WorldState) -> (Vec<Position>, Vec<EntityId>) {
    let lifetime = world.timing.explosion_ms;
    let mut spawns = vec![];
    let mut removals = vec![];
    for e in &world.entities {
        if e.is_exploding() {
            removals.push(e.id);
            if e.variant() == Variant::CrackedWall { spawns.push(e.pos); }
        } else if let EntityKind::Effect(Effect::Explosion { age_ms }) = e.kind {
            if age_ms >= lifetime { removals.push(e.id); }
        }
    }
    (spawns, removals)
}

fn commit(world: &mut WorldState, spawns: Vec<Position>, removals: Vec<EntityId>, events: &mut Vec<GameEvent>) {
    for at in spawns {
        let boom = world.spawn(Variant::Explosion, at);
        world.entities.push(boom);
        debug!(x = at.x(), y = at.y(), "cracked wall destroyed");
        events.push(GameEvent::Exploded { at });
    }
    for id in removals {
        let Some(i) = world.index_of(id) else { continue };
        debug!(variant = world.entities[i].variant().name(), "entity removed");
        rules::release_covering(&mut world.entities, i);
        world.entities.remove(i);
    }
}

// ══════════════════════════════════════════════════════════════
// Terminal conditions
// ══════════════════════════════════════════════════════════════

/// Any player sharing a tile with another unit dies. Returns true on death.
fn resolve_death(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let victim = world.entities.iter().position(|p| {
        p.is_player() && world.entities.iter().any(|u| u.is_unit() && !u.is_player() && u.pos == p.pos)
    });
    let Some(i) = victim else { return false };

    let player: Entity = world.entities.remove(i);
    let blood = world.spawn(Variant::Blood, player.pos);
    let slot = world.entities.iter().position(Entity::is_unit).unwrap_or(world.entities.len());
    world.entities.insert(slot, blood);
    world.phase = Phase::PlayerDead;

    info!(x = player.pos.x(), y = player.pos.y(), moves = world.move_count, "player killed");
    events.push(GameEvent::PlayerKilled { at: player.pos });
    true
}

fn resolve_win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.all_targets_covered() { return; }
    info!(level = world.level_index, moves = world.move_count, "level cleared");
    world.phase = Phase::LevelComplete;
    events.push(GameEvent::LevelCleared);
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::domain::entity::BlockKind;
    use crate::sim::level::{EntityRecord, LevelData};

    fn world(rows: &[&str]) -> WorldState {
        let mut w = WorldState::new(TimingConfig::default());
        w.start_level(LevelData::from_ascii("test", rows), 0);
        w
    }

    fn go(dir: Direction) -> FrameInput {
        FrameInput { movement: Some(dir), ..Default::default() }
    }

    fn wait(delta_ms: u32) -> FrameInput {
        FrameInput { delta_ms, ..Default::default() }
    }

    fn undo() -> FrameInput {
        FrameInput { undo: true, ..Default::default() }
    }

    fn xy(p: Position) -> (i32, i32) {
        (p.x(), p.y())
    }

    fn pos_of(w: &WorldState, v: Variant) -> Option<(i32, i32)> {
        w.entities.iter().find(|e| e.variant() == v).map(|e| xy(e.pos))
    }

    fn count(w: &WorldState, v: Variant) -> usize {
        w.entities.iter().filter(|e| e.variant() == v).count()
    }

    /// Positions and coverings, the state undo has to bring back.
    fn layout(w: &WorldState) -> Vec<(EntityId, (i32, i32), Option<EntityId>, bool)> {
        w.entities.iter()
            .map(|e| (
                e.id,
                xy(e.pos),
                e.block().and_then(|b| b.covering),
                e.terrain().map_or(false, |t| t.is_covered()),
            ))
            .collect()
    }

    // ── Player turns ──

    #[test]
    fn player_move_counts_a_turn() {
        let mut w = world(&["@  "]);
        let events = step(&mut w, go(Direction::Right));
        assert_eq!(pos_of(&w, Variant::Player), Some((1, 0)));
        assert_eq!(w.move_count, 1);
        assert!(events.contains(&GameEvent::PlayerMoved));
    }

    #[test]
    fn blocked_move_still_counts() {
        let mut w = world(&["@#"]);
        step(&mut w, go(Direction::Right));
        assert_eq!(pos_of(&w, Variant::Player), Some((0, 0)));
        assert_eq!(w.move_count, 1);
    }

    #[test]
    fn idle_tick_is_not_a_turn() {
        let mut w = world(&["@ ."]);
        assert!(step(&mut w, wait(16)).is_empty());
        assert_eq!(w.move_count, 0);
    }

    #[test]
    fn push_reports_block() {
        let mut w = world(&["@o "]);
        let stone = w.entities.iter().find(|e| e.variant() == Variant::Stone).unwrap().id;
        let events = step(&mut w, go(Direction::Right));
        assert!(events.contains(&GameEvent::BlockPushed { id: stone }));
        assert_eq!(pos_of(&w, Variant::Stone), Some((2, 0)));
    }

    #[test]
    fn two_players_one_snapshot() {
        let mut w = world(&[
            "@  ",
            "@  ",
        ]);
        step(&mut w, go(Direction::Right));
        assert_eq!(w.move_count, 1);
        let moved = w.entities.iter().filter(|e| e.is_player() && e.pos.x() == 1).count();
        assert_eq!(moved, 2);
        assert!(undo_turn(&mut w));
        assert!(w.entities.iter().filter(|e| e.is_player()).all(|e| e.pos.x() == 0));
    }

    // ── Undo ──

    #[test]
    fn undo_n_turns_restores_start() {
        let mut w = world(&[
            "      ",
            " @o . ",
            "   o  ",
            ".     ",
        ]);
        let start = layout(&w);
        let turns = [Direction::Right, Direction::Right, Direction::Up, Direction::Right, Direction::Down];
        for d in turns {
            step(&mut w, go(d));
        }
        assert_eq!(w.move_count, turns.len() as u32);
        assert_ne!(layout(&w), start);

        for _ in 0..turns.len() {
            step(&mut w, undo());
        }
        assert_eq!(layout(&w), start);
        assert_eq!(w.move_count, 0);

        // Extra undos change nothing.
        let events = step(&mut w, undo());
        assert!(events.is_empty());
        assert_eq!(layout(&w), start);
    }

    #[test]
    fn undo_uncovers_target() {
        let mut w = world(&["@o. "]);
        step(&mut w, go(Direction::Right));
        assert_eq!(w.phase, Phase::LevelComplete);

        let mut w = world(&["@o. .o"]);
        step(&mut w, go(Direction::Right));
        assert!(!w.all_targets_covered());
        let covered = |w: &WorldState| w.entities.iter().filter(|e| e.is_target() && e.terrain().unwrap().is_covered()).count();
        assert_eq!(covered(&w), 1);
        step(&mut w, undo());
        assert_eq!(covered(&w), 0);
    }

    #[test]
    fn undo_at_turn_zero_is_noop() {
        let mut w = world(&["@o "]);
        let before = layout(&w);
        assert!(!undo_turn(&mut w));
        assert_eq!(layout(&w), before);
    }

    // ── Ice ──

    #[test]
    fn ice_slides_on_its_own_then_rests() {
        let mut w = world(&[
            "@i   #",
            "     .",
        ]);
        step(&mut w, go(Direction::Right));
        // Ice is listed before the player, so its first slide is next tick.
        assert_eq!(pos_of(&w, Variant::Ice), Some((1, 0)));
        assert_eq!(pos_of(&w, Variant::Player), Some((1, 0)));

        step(&mut w, wait(16));
        assert_eq!(pos_of(&w, Variant::Ice), Some((2, 0)));
        step(&mut w, wait(100));
        assert_eq!(pos_of(&w, Variant::Ice), Some((2, 0)));
        step(&mut w, wait(150));
        assert_eq!(pos_of(&w, Variant::Ice), Some((3, 0)));
        step(&mut w, wait(250));
        assert_eq!(pos_of(&w, Variant::Ice), Some((4, 0)));
        step(&mut w, wait(250));
        assert_eq!(pos_of(&w, Variant::Ice), Some((4, 0)));

        let ice = w.entities.iter().find(|e| e.variant() == Variant::Ice).unwrap();
        match &ice.block().unwrap().kind {
            BlockKind::Ice(s) => {
                assert_eq!(s.direction, None);
                assert_eq!(xy(s.rest), (4, 0));
            }
            other => panic!("expected ice, got {other:?}"),
        }
        assert_eq!(w.move_count, 1);
    }

    #[test]
    fn undo_mid_slide_returns_ice_to_rest() {
        let mut w = world(&[
            "@i    #",
            "      .",
        ]);
        step(&mut w, go(Direction::Right));
        step(&mut w, wait(16));
        step(&mut w, wait(250));
        assert_eq!(pos_of(&w, Variant::Ice), Some((3, 0)));

        step(&mut w, undo());
        assert_eq!(pos_of(&w, Variant::Ice), Some((1, 0)));
        assert_eq!(pos_of(&w, Variant::Player), Some((0, 0)));

        // Slide was cancelled.
        step(&mut w, wait(1000));
        assert_eq!(pos_of(&w, Variant::Ice), Some((1, 0)));
    }

    // ── Tnt ──

    #[test]
    fn tnt_blows_cracked_wall() {
        let mut w = world(&[
            "@t% ",
            "   .",
        ]);
        let events = step(&mut w, go(Direction::Right));

        assert_eq!(count(&w, Variant::Tnt), 0);
        assert_eq!(count(&w, Variant::CrackedWall), 0);
        assert_eq!(count(&w, Variant::Explosion), 1);
        assert_eq!(pos_of(&w, Variant::Explosion), Some((2, 0)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Exploded { .. })));

        step(&mut w, wait(399));
        assert_eq!(count(&w, Variant::Explosion), 1);
        step(&mut w, wait(1));
        assert_eq!(count(&w, Variant::Explosion), 0);

        // The gap is open now.
        step(&mut w, go(Direction::Right));
        assert_eq!(pos_of(&w, Variant::Player), Some((2, 0)));
    }

    #[test]
    fn tnt_leaving_a_target_uncovers_it() {
        let mut data = LevelData::from_ascii("test", &["@t% "]);
        data.records.push(EntityRecord { variant: Variant::Target, x: 1, y: 0 });
        let mut w = WorldState::new(TimingConfig::default());
        w.start_level(data, 0);
        assert!(w.all_targets_covered());

        step(&mut w, go(Direction::Right));

        assert_eq!(count(&w, Variant::Tnt), 0);
        assert_eq!(w.phase, Phase::Playing);
        assert!(!w.all_targets_covered());
        let target = w.entities.iter().find(|e| e.variant() == Variant::Target).unwrap();
        assert_eq!(target.terrain().map(|t| t.is_covered()), Some(false));
        for covered in w.entities.iter().filter_map(|e| e.block()?.covering) {
            assert!(w.entities.iter().any(|e| e.id == covered));
        }
    }

    // ── Switch and door ──

    #[test]
    fn switch_opens_door_next_tick() {
        let mut w = world(&[
            "@o_ .",
            "#D#  ",
        ]);
        let door_open = |w: &WorldState| w.entities.iter()
            .any(|e| matches!(e.kind, EntityKind::Terrain(Terrain::Door { open: true })));

        step(&mut w, go(Direction::Right));
        assert!(!door_open(&w));
        step(&mut w, wait(16));
        assert!(door_open(&w));

        step(&mut w, undo());
        step(&mut w, wait(16));
        assert!(!door_open(&w));
    }

    fn door_is_open(w: &WorldState) -> bool {
        w.entities.iter()
            .any(|e| matches!(e.kind, EntityKind::Terrain(Terrain::Door { open: true })))
    }

    #[test]
    fn last_switch_decides_door() {
        let mut w = world(&["@o_ _D."]);
        step(&mut w, go(Direction::Right));
        step(&mut w, wait(16));

        // The first switch is covered, the second one is processed after it.
        assert!(!w.door_open);
        assert!(!door_is_open(&w));
        let door = w.entities.iter().find(|e| e.variant() == Variant::Door).unwrap();
        assert!(door.stops_movement());
    }

    #[test]
    fn door_listed_before_switch_lags_a_tick() {
        let mut w = world(&[
            "  D  ",
            "@o_ .",
        ]);
        step(&mut w, go(Direction::Right));
        step(&mut w, wait(16));
        assert!(w.door_open);
        assert!(!door_is_open(&w));

        step(&mut w, wait(16));
        assert!(door_is_open(&w));
    }

    // ── Enemies ──

    #[test]
    fn skeleton_waits_for_its_interval() {
        let mut w = world(&[
            " .",
            "S ",
        ]);
        step(&mut w, wait(600));
        step(&mut w, wait(600));
        assert_eq!(pos_of(&w, Variant::Skeleton), Some((0, 1)));
        step(&mut w, wait(0));
        assert_eq!(pos_of(&w, Variant::Skeleton), Some((0, 0)));
    }

    #[test]
    fn mage_answers_player_turn() {
        let mut w = world(&[
            "M   @",
            "    .",
        ]);
        step(&mut w, go(Direction::Left));
        // Mage is listed first: armed this tick, moves on the next.
        assert_eq!(pos_of(&w, Variant::Mage), Some((0, 0)));
        step(&mut w, wait(16));
        assert_eq!(pos_of(&w, Variant::Mage), Some((1, 0)));
        // No new turn, no new step.
        step(&mut w, wait(16));
        assert_eq!(pos_of(&w, Variant::Mage), Some((1, 0)));
    }

    #[test]
    fn rogue_moves_once_per_turn() {
        let mut w = world(&[
            "@    R",
            "     .",
        ]);
        step(&mut w, go(Direction::Down));
        assert_eq!(pos_of(&w, Variant::Rogue), Some((4, 0)));
        step(&mut w, wait(5000));
        assert_eq!(pos_of(&w, Variant::Rogue), Some((4, 0)));
    }

    // ── Death and restart ──

    #[test]
    fn walking_into_skeleton_kills_player() {
        let mut w = world(&["@S "]);
        let events = step(&mut w, go(Direction::Right));

        assert_eq!(w.phase, Phase::PlayerDead);
        assert_eq!(count(&w, Variant::Player), 0);
        assert_eq!(pos_of(&w, Variant::Blood), Some((1, 0)));
        assert!(events.contains(&GameEvent::PlayerKilled { at: Position::new(1, 0, w.bounds) }));

        let blood = w.entities.iter().position(|e| e.variant() == Variant::Blood).unwrap();
        let first_unit = w.entities.iter().position(Entity::is_unit).unwrap();
        assert_eq!(blood + 1, first_unit);
    }

    #[test]
    fn dead_player_accepts_only_restart() {
        let mut w = world(&["@S "]);
        step(&mut w, go(Direction::Right));
        let dead = layout(&w);

        step(&mut w, undo());
        step(&mut w, FrameInput { skip: true, ..Default::default() });
        step(&mut w, go(Direction::Left));
        assert_eq!(w.phase, Phase::PlayerDead);
        assert_eq!(layout(&w), dead);

        let events = step(&mut w, FrameInput { restart: true, ..Default::default() });
        assert_eq!(events, vec![GameEvent::Restarted]);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.move_count, 0);
        assert_eq!(pos_of(&w, Variant::Player), Some((0, 0)));
        assert_eq!(count(&w, Variant::Blood), 0);
    }

    // ── Level flow ──

    #[test]
    fn covering_last_target_completes_level() {
        let mut w = world(&["@o. "]);
        let events = step(&mut w, go(Direction::Right));
        assert_eq!(w.phase, Phase::LevelComplete);
        assert!(events.contains(&GameEvent::LevelCleared));
        // Further ticks do nothing until the driver advances.
        assert!(step(&mut w, go(Direction::Right)).is_empty());
    }

    #[test]
    fn level_without_targets_completes_at_once() {
        let mut w = world(&["@ "]);
        step(&mut w, wait(16));
        assert_eq!(w.phase, Phase::LevelComplete);
    }

    #[test]
    fn skip_ends_the_level() {
        let mut w = world(&["@o. "]);
        let events = step(&mut w, FrameInput { skip: true, movement: Some(Direction::Right), ..Default::default() });
        assert_eq!(events, vec![GameEvent::Skipped]);
        assert_eq!(w.phase, Phase::LevelComplete);
        assert_eq!(w.move_count, 0);
    }

    #[test]
    fn restart_wins_over_undo() {
        let mut w = world(&["@  ."]);
        step(&mut w, go(Direction::Right));
        step(&mut w, go(Direction::Right));
        let events = step(&mut w, FrameInput { restart: true, undo: true, ..Default::default() });
        assert_eq!(events, vec![GameEvent::Restarted]);
        assert_eq!(w.move_count, 0);
    }
}
