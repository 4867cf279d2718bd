//! Core types used throughout the Globe server

use glam::IVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Width of a chunk along X and Z, in blocks
pub const CHUNK_WIDTH: i32 = 16;

/// Number of columns in one chunk (16 x 16)
pub const CHUNK_COLUMNS: u16 = 256;

/// Unique identifier for players and other entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Packed chunk coordinate pair.
///
/// The low 32 bits hold `cx`, the high 32 bits hold `cz`, so the key is a
/// single `u64` that hashes and compares cheaply.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey(u64);

impl ChunkKey {
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self((cx as u32 as u64) | ((cz as u32 as u64) << 32))
    }

    /// Chunk containing the given block position
    pub fn from_block(pos: IVec3) -> Self {
        Self::new(pos.x >> 4, pos.z >> 4)
    }

    pub const fn x(self) -> i32 {
        self.0 as u32 as i32
    }

    pub const fn z(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    pub const fn packed(self) -> u64 {
        self.0
    }

    pub const fn from_packed(packed: u64) -> Self {
        Self(packed)
    }

    /// Block X of the chunk's minimum corner
    pub const fn min_block_x(self) -> i32 {
        self.x() * CHUNK_WIDTH
    }

    /// Block Z of the chunk's minimum corner
    pub const fn min_block_z(self) -> i32 {
        self.z() * CHUNK_WIDTH
    }

    /// Block Z at the middle of the chunk (`cz * 16 + 8`)
    pub const fn center_block_z(self) -> i32 {
        self.min_block_z() + CHUNK_WIDTH / 2
    }

    /// Offset this key by whole chunks
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x() + dx, self.z() + dz)
    }

    /// Chebyshev distance to another chunk
    pub fn distance(self, other: ChunkKey) -> u32 {
        (self.x() - other.x())
            .unsigned_abs()
            .max((self.z() - other.z()).unsigned_abs())
    }
}

impl std::fmt::Debug for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChunkKey({}, {})", self.x(), self.z())
    }
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x(), self.z())
    }
}

/// Column index within a chunk: `local_z * 16 + local_x`
pub const fn column_index(local_x: i32, local_z: i32) -> u16 {
    (local_z * CHUNK_WIDTH + local_x) as u16
}

/// Decode a column index back into `(local_x, local_z)`
pub const fn column_local(index: u16) -> (i32, i32) {
    let i = index as i32;
    (i & (CHUNK_WIDTH - 1), i >> 4)
}

/// Floor a world-space position to the block that contains it
pub fn block_pos(x: f32, y: f32, z: f32) -> IVec3 {
    IVec3::new(x.floor() as i32, y.floor() as i32, z.floor() as i32)
}
