/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and logging.

use crate::domain::entity::EntityId;
use crate::domain::position::Position;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    PlayerMoved,
    BlockPushed { id: EntityId },
    Exploded { at: Position },
    PlayerKilled { at: Position },
    LevelCleared,
    Undone,
    Restarted,
    Skipped,
}
