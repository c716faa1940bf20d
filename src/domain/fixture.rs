/// Test helper: build an entity list from ASCII rows (level legend).

use super::entity::Entity;
use super::position::Bounds;
use crate::sim::level::LevelData;

pub fn map_from(rows: &[&str]) -> (Vec<Entity>, Bounds) {
    let data = LevelData::from_ascii("test", rows);
    (data.spawn(), data.bounds())
}
