/// Occupancy resolver: which single entity decides what happens on a tile.
///
/// ## Priority
///
/// ┌────────────────────────────────────┬──────────┬────────────────────┐
/// │ Entity on the tile                  │ Tier     │ Resolution         │
/// ├────────────────────────────────────┼──────────┼────────────────────┤
/// │ Wall, CrackedWall, closed Door      │ Blocking │ first match wins   │
/// │ Stone, Ice, Tnt                     │ Blocking │ first match wins   │
/// │ Switch, Target                      │ Goal     │ last seen, fallback│
/// │ Floor, open Door, units, effects    │ Passive  │ last seen, fallback│
/// └────────────────────────────────────┴──────────┴────────────────────┘
///
/// Iteration follows declaration order, so stacked authoring mistakes
/// resolve the same way every time.

use super::entity::{Entity, EntityId};
use super::position::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Occupancy {
    Blocking,
    Goal,
    Passive,
}

pub fn occupancy(e: &Entity) -> Occupancy {
    if e.stops_movement() || e.is_block() {
        Occupancy::Blocking
    } else if e.is_goal() {
        Occupancy::Goal
    } else {
        Occupancy::Passive
    }
}

/// Index of the significant entity at `pos`.
/// `None` only for a tile with no entity at all, which a well-formed
/// level never produces.
pub fn significant_at(entities: &[Entity], pos: Position) -> Option<usize> {
    let mut goal = None;
    let mut passive = None;
    for (i, e) in entities.iter().enumerate() {
        if e.pos != pos { continue; }
        match occupancy(e) {
            Occupancy::Blocking => return Some(i),
            Occupancy::Goal => goal = Some(i),
            Occupancy::Passive => passive = Some(i),
        }
    }
    goal.or(passive)
}

/// Would a block or unit be refused at this entity?
pub fn refuses_entry(e: &Entity) -> bool {
    occupancy(e) == Occupancy::Blocking
}

pub fn index_of(entities: &[Entity], id: EntityId) -> Option<usize> {
    entities.iter().position(|e| e.id == id)
}
