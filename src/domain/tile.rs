/// Terrain variants and their properties.
/// Properties are queried via methods, not stored as flags,
/// so terrain semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Terrain {
    Floor,
    Wall,
    CrackedWall { exploding: bool }, // Blocks until blown up by Tnt
    Door { open: bool },             // Follows the level's switch
    Switch { covered: bool },
    Target { covered: bool },
}

impl Terrain {
    /// Does this terrain refuse entry to units and blocks?
    pub fn stops_movement(self) -> bool {
        match self {
            Terrain::Wall | Terrain::CrackedWall { .. } => true,
            Terrain::Door { open } => !open,
            Terrain::Floor | Terrain::Switch { .. } | Terrain::Target { .. } => false,
        }
    }

    /// Switch or Target: passable, but a block landing here covers it.
    pub fn is_goal(self) -> bool {
        matches!(self, Terrain::Switch { .. } | Terrain::Target { .. })
    }

    pub fn is_covered(self) -> bool {
        matches!(self, Terrain::Switch { covered: true } | Terrain::Target { covered: true })
    }

    /// Flip the covered flag; no effect on non-goal terrain.
    pub fn set_covered(&mut self, value: bool) {
        match self {
            Terrain::Switch { covered } | Terrain::Target { covered } => *covered = value,
            _ => {}
        }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Terrain::Floor
    }
}
