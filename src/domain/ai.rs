/// Enemy movement policies.
///
/// Three patrol styles:
///   1. **Skeleton**: up/down on its own timer, plain moves only.
///   2. **Rogue**: left/right once per player turn, shoves blocks.
///   3. **Mage**: one step per player turn toward the player,
///      along the axis with the larger gap first.
///
/// Timers and arming live in the turn controller; these functions only
/// choose and attempt the step.

use super::entity::{Entity, EntityKind, Unit};
use super::position::{Bounds, Direction};
use super::rules::{self, MoveCtx, MoveOutcome};

/// One skeleton step; reverses and retries once when blocked.
pub fn skeleton_step(entities: &mut [Entity], idx: usize, bounds: Bounds) -> bool {
    let facing = match &entities[idx].kind {
        EntityKind::Unit(Unit::Skeleton { facing, .. }) => *facing,
        _ => return false,
    };
    let ahead = entities[idx].pos.step(facing, bounds);
    if rules::make_move(entities, idx, ahead) { return true; }

    let back = facing.opposite();
    set_facing(&mut entities[idx], back);
    let behind = entities[idx].pos.step(back, bounds);
    rules::make_move(entities, idx, behind)
}

/// One rogue step; reverses and retries once when blocked.
pub fn rogue_step(entities: &mut [Entity], idx: usize, ctx: MoveCtx) -> MoveOutcome {
    let facing = match &entities[idx].kind {
        EntityKind::Unit(Unit::Rogue { facing, .. }) => *facing,
        _ => return MoveOutcome::Blocked,
    };
    let out = rules::make_push_move(entities, idx, facing, ctx);
    if out.moved() { return out; }

    let back = facing.opposite();
    set_facing(&mut entities[idx], back);
    rules::make_push_move(entities, idx, back, ctx)
}

/// Sign with zero counted as positive.
fn toward_sign(v: i32) -> i32 {
    if v < 0 { -1 } else { 1 }
}

/// Axes to try, in order, for a gap of (dx, dy).
pub fn mage_plan(dx: i32, dy: i32) -> Vec<(i32, i32)> {
    let vertical = (0, toward_sign(dy));
    if dx.abs() > dy.abs() {
        vec![(toward_sign(dx), 0), vertical]
    } else {
        vec![vertical]
    }
}

/// One mage step toward the gap recorded at arm time.
pub fn mage_step(entities: &mut [Entity], idx: usize, bounds: Bounds) -> bool {
    let (dx, dy) = match &entities[idx].kind {
        EntityKind::Unit(Unit::Mage { toward, .. }) => *toward,
        _ => return false,
    };
    for (sx, sy) in mage_plan(dx, dy) {
        let target = entities[idx].pos.offset(sx, sy, bounds);
        if rules::make_move(entities, idx, target) { return true; }
    }
    false
}

fn set_facing(e: &mut Entity, dir: Direction) {
    match &mut e.kind {
        EntityKind::Unit(Unit::Skeleton { facing, .. }) | EntityKind::Unit(Unit::Rogue { facing, .. }) => {
            *facing = dir;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Variant;
    use crate::domain::fixture::map_from;

    fn find(ents: &[Entity], v: Variant) -> usize {
        ents.iter().position(|e| e.variant() == v).unwrap()
    }

    fn xy(e: &Entity) -> (i32, i32) {
        (e.pos.x(), e.pos.y())
    }

    fn facing(e: &Entity) -> Direction {
        match &e.kind {
            EntityKind::Unit(Unit::Skeleton { facing, .. }) => *facing,
            EntityKind::Unit(Unit::Rogue { facing, .. }) => *facing,
            _ => panic!("not a patrolling unit"),
        }
    }

    #[test]
    fn skeleton_walks_up_first() {
        let (mut ents, b) = map_from(&[
            " ",
            "S",
        ]);
        let s = find(&ents, Variant::Skeleton);
        assert!(skeleton_step(&mut ents, s, b));
        assert_eq!(xy(&ents[s]), (0, 0));
    }

    #[test]
    fn skeleton_reverses_at_wall() {
        let (mut ents, b) = map_from(&[
            "#",
            "S",
            " ",
        ]);
        let s = find(&ents, Variant::Skeleton);
        assert!(skeleton_step(&mut ents, s, b));
        assert_eq!(xy(&ents[s]), (0, 2));
        assert_eq!(facing(&ents[s]), Direction::Down);
    }

    #[test]
    fn skeleton_does_not_push() {
        let (mut ents, b) = map_from(&[
            " ",
            "o",
            "S",
            "#",
        ]);
        let s = find(&ents, Variant::Skeleton);
        assert!(!skeleton_step(&mut ents, s, b));
        assert_eq!(xy(&ents[s]), (0, 2));
    }

    #[test]
    fn rogue_pushes_stone_left() {
        let (mut ents, b) = map_from(&[" oR"]);
        let r = find(&ents, Variant::Rogue);
        let ctx = MoveCtx { bounds: b, ice_step_ms: 250 };
        assert!(matches!(rogue_step(&mut ents, r, ctx), MoveOutcome::Pushed(_)));
        assert_eq!(xy(&ents[r]), (1, 0));
    }

    #[test]
    fn rogue_turns_around_when_stuck() {
        let (mut ents, b) = map_from(&["#R "]);
        let r = find(&ents, Variant::Rogue);
        let ctx = MoveCtx { bounds: b, ice_step_ms: 250 };
        assert_eq!(rogue_step(&mut ents, r, ctx), MoveOutcome::Walked);
        assert_eq!(xy(&ents[r]), (2, 0));
        assert_eq!(facing(&ents[r]), Direction::Right);
    }

    #[test]
    fn mage_plan_prefers_larger_gap() {
        assert_eq!(mage_plan(3, 1), vec![(1, 0), (0, 1)]);
        assert_eq!(mage_plan(-3, -1), vec![(-1, 0), (0, -1)]);
        // Tie goes vertical only.
        assert_eq!(mage_plan(2, -2), vec![(0, -1)]);
        // Zero gap counts as positive.
        assert_eq!(mage_plan(0, 0), vec![(0, 1)]);
    }

    #[test]
    fn mage_falls_back_to_vertical() {
        let (mut ents, b) = map_from(&[
            "M# ",
            "   ",
        ]);
        let m = find(&ents, Variant::Mage);
        if let EntityKind::Unit(Unit::Mage { toward, .. }) = &mut ents[m].kind { *toward = (2, 1); }
        assert!(mage_step(&mut ents, m, b));
        assert_eq!(xy(&ents[m]), (0, 1));
    }
}
