/// Entities: terrain, pushable blocks, units and transient effects.
///
/// One closed variant type; rules dispatch with exhaustive `match`
/// instead of asking an entity what it is at runtime.
/// Cross-entity links (a block covering a target) use `EntityId`,
/// which stays valid while the entity list shifts around removals.

use super::position::{Direction, Position};
use super::tile::Terrain;
use super::undo::{BlockSnapshot, PlayerSnapshot, SaveStack};

/// Stable identity, unique within one level build.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EntityId(pub u32);

/// Flat variant tag: level-file names, glyph lookup, logging.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Variant {
    Floor,
    Wall,
    CrackedWall,
    Door,
    Switch,
    Target,
    Stone,
    Ice,
    Tnt,
    Player,
    Skeleton,
    Rogue,
    Mage,
    Blood,
    Explosion,
}

impl Variant {
    /// Level-file name lookup. Transients have no file name.
    pub fn from_name(name: &str) -> Option<Variant> {
        let v = match name {
            "floor" => Variant::Floor,
            "wall" => Variant::Wall,
            "cracked" => Variant::CrackedWall,
            "door" => Variant::Door,
            "switch" => Variant::Switch,
            "target" => Variant::Target,
            "stone" => Variant::Stone,
            "ice" => Variant::Ice,
            "tnt" => Variant::Tnt,
            "player" => Variant::Player,
            "skeleton" => Variant::Skeleton,
            "rogue" => Variant::Rogue,
            "mage" => Variant::Mage,
            _ => return None,
        };
        Some(v)
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Floor => "floor",
            Variant::Wall => "wall",
            Variant::CrackedWall => "cracked",
            Variant::Door => "door",
            Variant::Switch => "switch",
            Variant::Target => "target",
            Variant::Stone => "stone",
            Variant::Ice => "ice",
            Variant::Tnt => "tnt",
            Variant::Player => "player",
            Variant::Skeleton => "skeleton",
            Variant::Rogue => "rogue",
            Variant::Mage => "mage",
            Variant::Blood => "blood",
            Variant::Explosion => "explosion",
        }
    }
}

/// Ice motion. `rest` / `rest_covering` are what undo snapshots see,
/// never a mid-slide position.
#[derive(Clone, PartialEq, Debug)]
pub struct Slide {
    pub direction: Option<Direction>,
    pub since_step_ms: u32,
    pub rest: Position,
    pub rest_covering: Option<EntityId>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum BlockKind {
    Stone,
    Ice(Slide),
    Tnt { exploding: bool },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Block {
    pub kind: BlockKind,
    /// The Switch/Target under this block, if any.
    pub covering: Option<EntityId>,
    pub history: SaveStack<BlockSnapshot>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Block { kind, covering: None, history: SaveStack::new() }
    }

    /// State captured for undo. Ice reports its rest state.
    pub fn snapshot(&self, pos: Position) -> BlockSnapshot {
        match &self.kind {
            BlockKind::Ice(slide) => BlockSnapshot { pos: slide.rest, covering: slide.rest_covering },
            BlockKind::Stone | BlockKind::Tnt { .. } => BlockSnapshot { pos, covering: self.covering },
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct PlayerState {
    pub history: SaveStack<PlayerSnapshot>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Unit {
    Player(PlayerState),
    Skeleton { facing: Direction, since_step_ms: u32 },
    Rogue { facing: Direction, armed: bool },
    /// `toward` = player target tile minus mage tile, taken at arm time.
    Mage { armed: bool, toward: (i32, i32) },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Effect {
    Blood,
    Explosion { age_ms: u32 },
}

#[derive(Clone, PartialEq, Debug)]
pub enum EntityKind {
    Terrain(Terrain),
    Block(Block),
    Unit(Unit),
    Effect(Effect),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Position,
    pub kind: EntityKind,
}

impl Entity {
    pub fn spawn(id: EntityId, variant: Variant, pos: Position) -> Self {
        let kind = match variant {
            Variant::Floor => EntityKind::Terrain(Terrain::Floor),
            Variant::Wall => EntityKind::Terrain(Terrain::Wall),
            Variant::CrackedWall => EntityKind::Terrain(Terrain::CrackedWall { exploding: false }),
            Variant::Door => EntityKind::Terrain(Terrain::Door { open: false }),
            Variant::Switch => EntityKind::Terrain(Terrain::Switch { covered: false }),
            Variant::Target => EntityKind::Terrain(Terrain::Target { covered: false }),
            Variant::Stone => EntityKind::Block(Block::new(BlockKind::Stone)),
            Variant::Ice => EntityKind::Block(Block::new(BlockKind::Ice(Slide {
                direction: None,
                since_step_ms: 0,
                rest: pos,
                rest_covering: None,
            }))),
            Variant::Tnt => EntityKind::Block(Block::new(BlockKind::Tnt { exploding: false })),
            Variant::Player => EntityKind::Unit(Unit::Player(PlayerState::default())),
            Variant::Skeleton => EntityKind::Unit(Unit::Skeleton { facing: Direction::Up, since_step_ms: 0 }),
            Variant::Rogue => EntityKind::Unit(Unit::Rogue { facing: Direction::Left, armed: false }),
            Variant::Mage => EntityKind::Unit(Unit::Mage { armed: false, toward: (0, 0) }),
            Variant::Blood => EntityKind::Effect(Effect::Blood),
            Variant::Explosion => EntityKind::Effect(Effect::Explosion { age_ms: 0 }),
        };
        Entity { id, pos, kind }
    }

    pub fn variant(&self) -> Variant {
        match &self.kind {
            EntityKind::Terrain(t) => match t {
                Terrain::Floor => Variant::Floor,
                Terrain::Wall => Variant::Wall,
                Terrain::CrackedWall { .. } => Variant::CrackedWall,
                Terrain::Door { .. } => Variant::Door,
                Terrain::Switch { .. } => Variant::Switch,
                Terrain::Target { .. } => Variant::Target,
            },
            EntityKind::Block(b) => match b.kind {
                BlockKind::Stone => Variant::Stone,
                BlockKind::Ice(_) => Variant::Ice,
                BlockKind::Tnt { .. } => Variant::Tnt,
            },
            EntityKind::Unit(u) => match u {
                Unit::Player(_) => Variant::Player,
                Unit::Skeleton { .. } => Variant::Skeleton,
                Unit::Rogue { .. } => Variant::Rogue,
                Unit::Mage { .. } => Variant::Mage,
            },
            EntityKind::Effect(Effect::Blood) => Variant::Blood,
            EntityKind::Effect(Effect::Explosion { .. }) => Variant::Explosion,
        }
    }

    pub fn terrain(&self) -> Option<Terrain> {
        match &self.kind {
            EntityKind::Terrain(t) => Some(*t),
            _ => None,
        }
    }

    pub fn block(&self) -> Option<&Block> {
        match &self.kind {
            EntityKind::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn block_mut(&mut self) -> Option<&mut Block> {
        match &mut self.kind {
            EntityKind::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn stops_movement(&self) -> bool {
        self.terrain().map_or(false, Terrain::stops_movement)
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, EntityKind::Block(_))
    }

    pub fn is_goal(&self) -> bool {
        self.terrain().map_or(false, Terrain::is_goal)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, EntityKind::Unit(_))
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Unit(Unit::Player(_)))
    }

    pub fn is_target(&self) -> bool {
        matches!(self.kind, EntityKind::Terrain(Terrain::Target { .. }))
    }

    /// Flagged for removal at the end of this tick.
    pub fn is_exploding(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Terrain(Terrain::CrackedWall { exploding: true })
                | EntityKind::Block(Block { kind: BlockKind::Tnt { exploding: true }, .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Bounds;

    fn at(x: i32, y: i32) -> Position {
        Position::new(x, y, Bounds::new(10, 10))
    }

    #[test]
    fn names_round_trip_for_loadable_variants() {
        for name in ["floor", "wall", "cracked", "door", "switch", "target", "stone",
                     "ice", "tnt", "player", "skeleton", "rogue", "mage"] {
            let v = Variant::from_name(name).unwrap();
            assert_eq!(v.name(), name);
        }
        assert_eq!(Variant::from_name("blood"), None);
        assert_eq!(Variant::from_name("dragon"), None);
    }

    #[test]
    fn spawn_matches_variant() {
        for v in [Variant::Floor, Variant::Door, Variant::Ice, Variant::Tnt,
                  Variant::Mage, Variant::Blood, Variant::Explosion] {
            assert_eq!(Entity::spawn(EntityId(1), v, at(2, 3)).variant(), v);
        }
    }

    #[test]
    fn ice_snapshot_reports_rest_state() {
        let mut e = Entity::spawn(EntityId(4), Variant::Ice, at(1, 1));
        e.pos = at(3, 1);
        let snap = e.block().unwrap().snapshot(e.pos);
        assert_eq!(snap.pos, at(1, 1));
        assert_eq!(snap.covering, None);
    }

    #[test]
    fn exploding_flags() {
        let mut wall = Entity::spawn(EntityId(1), Variant::CrackedWall, at(0, 0));
        assert!(!wall.is_exploding());
        wall.kind = EntityKind::Terrain(Terrain::CrackedWall { exploding: true });
        assert!(wall.is_exploding());

        let mut tnt = Entity::spawn(EntityId(2), Variant::Tnt, at(0, 0));
        if let Some(b) = tnt.block_mut() { b.kind = BlockKind::Tnt { exploding: true }; }
        assert!(tnt.is_exploding());
    }

    #[test]
    fn tiers_of_each_kind() {
        let player = Entity::spawn(EntityId(1), Variant::Player, at(0, 0));
        assert!(player.is_unit() && player.is_player() && !player.is_block());
        assert!(Entity::spawn(EntityId(2), Variant::Stone, at(0, 0)).is_block());
        assert!(Entity::spawn(EntityId(3), Variant::Target, at(0, 0)).is_target());
        assert!(!Entity::spawn(EntityId(4), Variant::Skeleton, at(0, 0)).is_player());
    }
}
