/// WorldState: the complete state of a running level.
///
/// ## Entity list
///
/// `entities` is kept in level-declaration order. That order is the
/// update order for every tick and the draw order for the renderer.
/// Entities are only added or removed between update passes.
///
/// ## Level data
///
/// `level` is the data the current level was built from. It is
/// **never mutated** after load; restart rebuilds `entities` from it.

use crate::config::TimingConfig;
use crate::domain::entity::{Entity, EntityId, Variant};
use crate::domain::occupancy;
use crate::domain::position::{Bounds, Position};
use crate::domain::rules::MoveCtx;
use crate::domain::tile::Terrain;
use crate::sim::level::LevelData;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    PlayerDead,
    LevelComplete,
    GameComplete,
}

pub struct WorldState {
    // ── Level ──
    pub level: LevelData,
    pub level_index: usize,
    pub bounds: Bounds,

    // ── Entities ──
    pub entities: Vec<Entity>,
    next_id: u32,

    // ── Turn state ──
    pub phase: Phase,
    pub move_count: u32,
    /// Derived each tick from the switch; doors copy it when updated.
    pub door_open: bool,
    pub tick: u64,

    // ── Config ──
    pub timing: TimingConfig,
}

impl WorldState {
    pub fn new(timing: TimingConfig) -> Self {
        WorldState {
            level: LevelData::empty(),
            level_index: 0,
            bounds: Bounds::new(0, 0),
            entities: vec![],
            next_id: 0,
            phase: Phase::Playing,
            move_count: 0,
            door_open: false,
            tick: 0,
            timing,
        }
    }

    /// Replace the current level. Undo history goes with the old entities.
    pub fn start_level(&mut self, data: LevelData, index: usize) {
        self.level = data;
        self.level_index = index;
        self.reset_level();
    }

    /// Rebuild everything from the stored level data.
    pub fn reset_level(&mut self) {
        self.bounds = self.level.bounds();
        self.entities = self.level.spawn();
        self.next_id = self.entities.len() as u32;
        self.phase = Phase::Playing;
        self.move_count = 0;
        self.door_open = false;
        self.tick = 0;
    }

    /// New entity with a fresh id; the caller decides where it goes in the list.
    pub fn spawn(&mut self, variant: Variant, pos: Position) -> Entity {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        Entity::spawn(id, variant, pos)
    }

    pub fn move_ctx(&self) -> MoveCtx {
        MoveCtx { bounds: self.bounds, ice_step_ms: self.timing.ice_step_ms }
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        occupancy::index_of(&self.entities, id)
    }

    /// True when every Target is covered, including when there are none.
    pub fn all_targets_covered(&self) -> bool {
        self.entities.iter()
            .filter(|e| e.is_target())
            .filter_map(Entity::terrain)
            .all(Terrain::is_covered)
    }

    pub fn level_name(&self) -> &str {
        &self.level.name
    }
}
