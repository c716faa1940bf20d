/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels_dir` from config (individual `{n}.lvl` files, numbered from 0)
///   2. Built-in embedded levels, when that directory does not exist
///
/// ## Level file format (`.lvl`):
///   ```
///   width,height[,title]
///   name,x,y
///   name,x,y
///   ...
///   ```
///
/// Records are kept in file order, which is also draw order and the
/// order the turn controller updates entities in.
/// An unknown name spawns a Player there; a record that cannot be read
/// at all is skipped. Both are logged.
///
/// ## Embedded map legend:
///   '#' = Wall           '%' = Cracked wall     'D' = Door
///   '_' = Switch         '.' = Target           '*' = Stone on target
///   'o' = Stone          'i' = Ice              't' = Tnt
///   '@' = Player         'S' = Skeleton         'R' = Rogue
///   'M' = Mage           ' ' = Floor

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::entity::{Entity, EntityId, Variant};
use crate::domain::position::{Bounds, Position};
use crate::domain::rules;
use crate::error::{LevelError, Result};
use crate::sim::world::{Phase, WorldState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EntityRecord {
    pub variant: Variant,
    pub x: i32,
    pub y: i32,
}

/// Static description of a level; the world rebuilds from this on restart.
#[derive(Clone, PartialEq, Debug)]
pub struct LevelData {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub records: Vec<EntityRecord>,
}

impl LevelData {
    pub fn empty() -> Self {
        LevelData { name: String::new(), width: 0, height: 0, records: vec![] }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Fresh entity list in record order, ids counting from 0,
    /// with every block already covering the goal it starts on.
    pub fn spawn(&self) -> Vec<Entity> {
        let bounds = self.bounds();
        let mut entities: Vec<Entity> = self.records.iter()
            .enumerate()
            .map(|(i, r)| Entity::spawn(EntityId(i as u32), r.variant, Position::new(r.x, r.y, bounds)))
            .collect();
        rules::settle_coverings(&mut entities);
        entities
    }

    /// Parse `.lvl` text.
    pub fn parse(name: &str, text: &str) -> Result<LevelData> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let header = lines.next()
            .ok_or_else(|| LevelError::MissingHeader { name: name.to_string() })?;
        let (width, height, title) = parse_header(header)
            .ok_or_else(|| LevelError::BadHeader { name: name.to_string(), line: header.to_string() })?;

        let mut records = vec![];
        for (n, line) in lines.enumerate() {
            let Some((tag, x, y)) = parse_record(line) else {
                warn!(level = name, record = n + 1, line, "unreadable record skipped");
                continue;
            };
            let variant = Variant::from_name(tag).unwrap_or_else(|| {
                warn!(level = name, name = tag, x, y, "unknown entity, spawning a player");
                Variant::Player
            });
            records.push(EntityRecord { variant, x, y });
        }

        let name = title.unwrap_or(name).to_string();
        Ok(LevelData { name, width, height, records })
    }

    /// Build level data from ASCII rows (see legend above).
    /// Every cell gets a Floor; then terrain, blocks and units in row order.
    pub fn from_ascii(name: &str, rows: &[&str]) -> LevelData {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;

        let cells: Vec<(i32, i32, char)> = rows.iter()
            .enumerate()
            .flat_map(|(y, row)| row.chars().enumerate().map(move |(x, ch)| (x as i32, y as i32, ch)))
            .collect();

        let mut records = vec![];
        for y in 0..height {
            for x in 0..width {
                records.push(EntityRecord { variant: Variant::Floor, x, y });
            }
        }
        let layers: [fn(char) -> Option<Variant>; 3] = [terrain_glyph, block_glyph, unit_glyph];
        for layer in layers {
            for &(x, y, ch) in &cells {
                if let Some(variant) = layer(ch) {
                    records.push(EntityRecord { variant, x, y });
                }
            }
        }

        LevelData { name: name.to_string(), width, height, records }
    }
}

/// `width,height` with an optional display title after them.
fn parse_header(line: &str) -> Option<(i32, i32, Option<&str>)> {
    let mut parts = line.splitn(3, ',').map(str::trim);
    let width: i32 = parts.next()?.parse().ok()?;
    let height: i32 = parts.next()?.parse().ok()?;
    if width <= 0 || height <= 0 { return None; }
    let title = parts.next().filter(|t| !t.is_empty());
    Some((width, height, title))
}

fn parse_record(line: &str) -> Option<(&str, i32, i32)> {
    let mut parts = line.split(',').map(str::trim);
    let tag = parts.next()?;
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    Some((tag, x, y))
}

fn terrain_glyph(ch: char) -> Option<Variant> {
    match ch {
        '#' => Some(Variant::Wall),
        '%' => Some(Variant::CrackedWall),
        'D' => Some(Variant::Door),
        '_' => Some(Variant::Switch),
        '.' | '*' => Some(Variant::Target),
        _ => None,
    }
}

fn block_glyph(ch: char) -> Option<Variant> {
    match ch {
        'o' | '*' => Some(Variant::Stone),
        'i' => Some(Variant::Ice),
        't' => Some(Variant::Tnt),
        _ => None,
    }
}

fn unit_glyph(ch: char) -> Option<Variant> {
    match ch {
        '@' => Some(Variant::Player),
        'S' => Some(Variant::Skeleton),
        'R' => Some(Variant::Rogue),
        'M' => Some(Variant::Mage),
        _ => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Sources
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub enum LevelSource {
    Directory { dir: PathBuf, final_level: usize },
    Embedded,
}

impl LevelSource {
    pub fn from_config(config: &GameConfig) -> Self {
        if config.levels_dir.is_dir() {
            info!(dir = %config.levels_dir.display(), "using level directory");
            LevelSource::Directory { dir: config.levels_dir.clone(), final_level: config.final_level }
        } else {
            info!(dir = %config.levels_dir.display(), "level directory not found, using built-in levels");
            LevelSource::Embedded
        }
    }

    /// Index of the last level; finishing it ends the game.
    pub fn final_level(&self) -> usize {
        match self {
            LevelSource::Directory { final_level, .. } => *final_level,
            LevelSource::Embedded => EMBEDDED.len().saturating_sub(1),
        }
    }

    pub fn load(&self, index: usize) -> Result<LevelData> {
        match self {
            LevelSource::Directory { dir, .. } => load_file(dir, index),
            LevelSource::Embedded => EMBEDDED.get(index)
                .map(|(name, rows)| LevelData::from_ascii(name, rows))
                .ok_or(LevelError::NoSuchLevel(index)),
        }
    }
}

fn load_file(dir: &Path, index: usize) -> Result<LevelData> {
    let path = dir.join(format!("{index}.lvl"));
    let text = std::fs::read_to_string(&path)
        .map_err(|source| LevelError::Io { path: path.clone(), source })?;
    LevelData::parse(&index.to_string(), &text)
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load level `index` into the world. On error the world is untouched.
pub fn load_level(world: &mut WorldState, index: usize, source: &LevelSource) -> Result<()> {
    let data = source.load(index)?;
    info!(level = index, name = %data.name, entities = data.records.len(), "level loaded");
    world.start_level(data, index);
    Ok(())
}

/// Move on after a cleared level, or end the game after the final one.
pub fn advance_level(world: &mut WorldState, source: &LevelSource) -> Result<()> {
    if world.level_index >= source.final_level() {
        info!(level = world.level_index, "final level cleared");
        world.phase = Phase::GameComplete;
        return Ok(());
    }
    load_level(world, world.level_index + 1, source)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED: &[(&str, &[&str])] = &[
    ("Antechamber", &[
        "#########",
        "#       #",
        "# @ o  .#",
        "#       #",
        "#########",
    ]),
    ("Frozen Hall", &[
        "##########",
        "#        #",
        "#@i     .#",
        "#        #",
        "#  o   . #",
        "#        #",
        "##########",
    ]),
    ("Switchback", &[
        "###########",
        "#   #     #",
        "# @ D  o. #",
        "#   #     #",
        "# o_#  S  #",
        "#   #     #",
        "###########",
    ]),
    ("Blasting Room", &[
        "############",
        "#     %    #",
        "# @ t %  . #",
        "#     %  o #",
        "#  R  %   M#",
        "############",
    ]),
];
