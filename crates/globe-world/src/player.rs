//! Connected players as seen by the world

use globe_core::{block_pos, ChunkKey, EntityId, IVec3, Vec3};

/// A connected player
#[derive(Debug, Clone)]
pub struct Player {
    pub id: EntityId,
    pub name: String,
    /// World-space position (feet)
    pub position: Vec3,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            position,
        }
    }

    /// Block the player is standing in
    pub fn block_pos(&self) -> IVec3 {
        block_pos(self.position.x, self.position.y, self.position.z)
    }

    pub fn chunk(&self) -> ChunkKey {
        ChunkKey::from_block(self.block_pos())
    }
}
