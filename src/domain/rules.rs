/// Push rules and unit movement primitives, truth-table driven.
///
/// Functions here mutate the entity list directly but never add or
/// remove entities; removal of exploded things is the turn controller's job.
/// A refused move is a `false` / `MoveOutcome::Blocked`, never an error.
///
/// ## Push Truth Table
///
/// `next` = tile one step beyond the block, `sig` = significant entity there.
///
/// ### Stone (base rule)
/// ┌──────────────────────────────┬─────────┬──────────────────────┐
/// │ Condition                     │ Result  │ Notes                │
/// ├──────────────────────────────┼─────────┼──────────────────────┤
/// │ sig stops movement            │ DENY    │ wall, closed door    │
/// │ sig is a block                │ DENY    │ no chain pushes      │
/// │ no entity at next             │ DENY    │ malformed level      │
/// │ sig is Switch/Target          │ ALLOW   │ covers it            │
/// │ Otherwise                     │ ALLOW   │ uncovers old goal    │
/// └──────────────────────────────┴─────────┴──────────────────────┘
///
/// ### Tnt
/// ┌──────────────────────────────┬─────────┬──────────────────────┐
/// │ sig is CrackedWall            │ ALLOW   │ both flagged, Tnt    │
/// │                               │         │ moves into the wall  │
/// │ Otherwise                     │ Stone   │                      │
/// └──────────────────────────────┴─────────┴──────────────────────┘
///
/// ### Ice
/// ┌──────────────────────────────┬─────────┬──────────────────────┐
/// │ base rule would deny          │ DENY    │ disarm, record rest  │
/// │ Otherwise                     │ ALLOW   │ arm slide, no move   │
/// └──────────────────────────────┴─────────┴──────────────────────┘
///
/// ### Unit moves
/// ┌──────────────────────────────┬────────────────┬──────────────────┐
/// │ sig                           │ make_push_move │ make_move        │
/// ├──────────────────────────────┼────────────────┼──────────────────┤
/// │ stops movement                │ DENY           │ DENY             │
/// │ block, push succeeds          │ ALLOW (push)   │ DENY             │
/// │ block, push fails             │ DENY           │ DENY             │
/// │ anything else                 │ ALLOW          │ ALLOW            │
/// └──────────────────────────────┴────────────────┴──────────────────┘

use tracing::{debug, warn};

use super::entity::{BlockKind, Entity, EntityId, EntityKind, Slide};
use super::occupancy::{index_of, refuses_entry, significant_at};
use super::position::{Bounds, Direction, Position};
use super::tile::Terrain;

/// What movement rules need to know about the level.
#[derive(Clone, Copy, Debug)]
pub struct MoveCtx {
    pub bounds: Bounds,
    pub ice_step_ms: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Blocked,
    Walked,
    Pushed(EntityId),
}

impl MoveOutcome {
    pub fn moved(self) -> bool {
        self != MoveOutcome::Blocked
    }
}

// ══════════════════════════════════════════════════════════════
// Covering protocol
// ══════════════════════════════════════════════════════════════

/// Drop the block's covering link and un-mark that goal.
pub fn release_covering(entities: &mut [Entity], idx: usize) {
    let goal = match entities[idx].block_mut() {
        Some(b) => b.covering.take(),
        None => return,
    };
    if let Some(g) = goal.and_then(|id| index_of(entities, id)) {
        if let EntityKind::Terrain(t) = &mut entities[g].kind { t.set_covered(false); }
    }
}

/// Link the block to `goal` (if any) and mark it covered.
/// Callers release the previous link first.
pub fn cover(entities: &mut [Entity], idx: usize, goal: Option<EntityId>) {
    if let Some(b) = entities[idx].block_mut() { b.covering = goal; }
    if let Some(g) = goal.and_then(|id| index_of(entities, id)) {
        if let EntityKind::Terrain(t) = &mut entities[g].kind { t.set_covered(true); }
    }
}

/// Move a block and swap its covering in one go.
pub fn relocate_block(entities: &mut [Entity], idx: usize, to: Position, goal: Option<EntityId>) {
    release_covering(entities, idx);
    cover(entities, idx, goal);
    entities[idx].pos = to;
}

/// Link every block to the goal it starts on. Ice adopts that as its rest state.
pub fn settle_coverings(entities: &mut [Entity]) {
    for i in 0..entities.len() {
        if !entities[i].is_block() { continue; }
        let pos = entities[i].pos;
        let goal = entities.iter().find(|e| e.pos == pos && e.is_goal()).map(|e| e.id);
        release_covering(entities, i);
        cover(entities, i, goal);
        if let Some(slide) = slide_mut(&mut entities[i]) {
            slide.rest = pos;
            slide.rest_covering = goal;
        }
    }
}

fn slide_mut(e: &mut Entity) -> Option<&mut Slide> {
    match e.block_mut() {
        Some(b) => match &mut b.kind {
            BlockKind::Ice(slide) => Some(slide),
            _ => None,
        },
        None => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Push resolver
// ══════════════════════════════════════════════════════════════

/// Push the block at `idx` one tile in `dir`, dispatching on its kind.
pub fn push(entities: &mut [Entity], idx: usize, dir: Direction, ctx: MoveCtx) -> bool {
    let kind = match entities[idx].block() {
        Some(b) => b.kind.clone(),
        None => return false,
    };
    match kind {
        BlockKind::Stone => step_block(entities, idx, dir, ctx.bounds),
        BlockKind::Tnt { .. } => push_tnt(entities, idx, dir, ctx.bounds),
        BlockKind::Ice(_) => arm_ice(entities, idx, dir, ctx),
    }
}

/// Base rule: one tile, only onto something that neither blocks nor is a block.
pub fn step_block(entities: &mut [Entity], idx: usize, dir: Direction, bounds: Bounds) -> bool {
    let next = entities[idx].pos.step(dir, bounds);
    let sig = match significant_at(entities, next) {
        Some(s) => s,
        None => {
            warn!(x = next.x(), y = next.y(), "no entity on tile, treating as blocked");
            return false;
        }
    };
    if refuses_entry(&entities[sig]) { return false; }
    let goal = entities[sig].is_goal().then_some(entities[sig].id);
    relocate_block(entities, idx, next, goal);
    true
}

fn push_tnt(entities: &mut [Entity], idx: usize, dir: Direction, bounds: Bounds) -> bool {
    let next = entities[idx].pos.step(dir, bounds);
    if let Some(w) = significant_at(entities, next) {
        if let EntityKind::Terrain(Terrain::CrackedWall { exploding }) = &mut entities[w].kind {
            *exploding = true;
            if let Some(b) = entities[idx].block_mut() { b.kind = BlockKind::Tnt { exploding: true }; }
            relocate_block(entities, idx, next, None);
            debug!(x = next.x(), y = next.y(), "tnt hit cracked wall");
            return true;
        }
    }
    step_block(entities, idx, dir, bounds)
}

fn arm_ice(entities: &mut [Entity], idx: usize, dir: Direction, ctx: MoveCtx) -> bool {
    let pos = entities[idx].pos;
    let next = pos.step(dir, ctx.bounds);
    let clear = significant_at(entities, next).map_or(false, |s| !refuses_entry(&entities[s]));
    let covering = entities[idx].block().and_then(|b| b.covering);
    let slide = match slide_mut(&mut entities[idx]) {
        Some(s) => s,
        None => return false,
    };
    if !clear {
        slide.direction = None;
        slide.rest = pos;
        slide.rest_covering = covering;
        return false;
    }
    slide.direction = Some(dir);
    slide.since_step_ms = ctx.ice_step_ms;
    true
}

/// Per-tick Ice update. Returns true if the ice moved a tile.
pub fn slide_ice(entities: &mut [Entity], idx: usize, delta_ms: u32, ctx: MoveCtx) -> bool {
    let dir = match slide_mut(&mut entities[idx]) {
        Some(slide) => {
            slide.since_step_ms = slide.since_step_ms.saturating_add(delta_ms);
            match slide.direction {
                Some(d) if slide.since_step_ms >= ctx.ice_step_ms => d,
                _ => return false,
            }
        }
        None => return false,
    };
    let moved = step_block(entities, idx, dir, ctx.bounds);
    let pos = entities[idx].pos;
    let covering = entities[idx].block().and_then(|b| b.covering);
    if let Some(slide) = slide_mut(&mut entities[idx]) {
        if !moved {
            slide.direction = None;
            slide.rest = pos;
            slide.rest_covering = covering;
        }
        slide.since_step_ms = 0;
    }
    moved
}

/// Cancel any slide and make the current state the rest state.
pub fn halt_ice(entities: &mut [Entity], idx: usize) {
    let pos = entities[idx].pos;
    let covering = entities[idx].block().and_then(|b| b.covering);
    if let Some(slide) = slide_mut(&mut entities[idx]) {
        slide.direction = None;
        slide.since_step_ms = 0;
        slide.rest = pos;
        slide.rest_covering = covering;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit movement
// ══════════════════════════════════════════════════════════════

/// Step one tile, pushing a block out of the way if there is one.
pub fn make_push_move(entities: &mut [Entity], idx: usize, dir: Direction, ctx: MoveCtx) -> MoveOutcome {
    let next = entities[idx].pos.step(dir, ctx.bounds);
    let sig = match significant_at(entities, next) {
        Some(s) => s,
        None => {
            warn!(x = next.x(), y = next.y(), "no entity on tile, treating as blocked");
            return MoveOutcome::Blocked;
        }
    };
    if entities[sig].stops_movement() { return MoveOutcome::Blocked; }
    if entities[sig].is_block() {
        let pushed = entities[sig].id;
        if !push(entities, sig, dir, ctx) { return MoveOutcome::Blocked; }
        entities[idx].pos = next;
        return MoveOutcome::Pushed(pushed);
    }
    entities[idx].pos = next;
    MoveOutcome::Walked
}

/// Step onto `target` only if nothing there blocks; never pushes.
pub fn make_move(entities: &mut [Entity], idx: usize, target: Position) -> bool {
    match significant_at(entities, target) {
        Some(s) if !refuses_entry(&entities[s]) => {
            entities[idx].pos = target;
            true
        }
        _ => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
