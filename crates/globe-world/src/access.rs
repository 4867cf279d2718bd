//! The world capability the polar pass runs against
//!
//! The scrubber never owns terrain. It reads heights and blocks, writes blocks,
//! asks for chunks to be resident, and enumerates players, all through this
//! trait. `ChunkManager` is the in-process implementation; a host server can
//! provide its own.

use globe_core::{ChunkKey, IVec3};

use crate::block::BlockState;

/// Side effects requested alongside a block write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    /// Write silently
    pub const NONE: Self = Self(0);
    /// Trigger neighbor block updates
    pub const NOTIFY_NEIGHBORS: Self = Self(1);
    /// Tell listeners (clients, mesh rebuilds) the block changed
    pub const NOTIFY_LISTENERS: Self = Self(2);
    pub const NOTIFY_ALL: Self = Self(3);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for UpdateFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// World queries and mutations needed by terrain post-processing.
///
/// Every method must be safe to call for any coordinate: positions in chunks
/// that are not resident read as air, report `bottom_y()` as their height, and
/// reject writes.
pub trait WorldAccess {
    /// Lowest buildable Y (world floor)
    fn bottom_y(&self) -> i32;

    /// One above the top block counted by the "motion blocking, no leaves"
    /// heightmap, or `bottom_y()` for an empty column.
    fn top_solid_height(&self, x: i32, z: i32) -> i32;

    fn block_state(&self, pos: IVec3) -> BlockState;

    /// Returns `true` if the write landed
    fn set_block_state(&mut self, pos: IVec3, state: BlockState, flags: UpdateFlags) -> bool;

    /// Make the chunk resident, generating it if needed.
    ///
    /// Returns `false` when the chunk cannot be made available.
    fn load_chunk(&mut self, key: ChunkKey) -> bool;

    /// Block positions of connected players, in a stable order
    fn player_positions(&self) -> Vec<IVec3>;

    /// Vegetation tag predicate
    fn is_vegetation(&self, state: BlockState) -> bool {
        state.is_vegetation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_flags() {
        let flags = UpdateFlags::NOTIFY_NEIGHBORS | UpdateFlags::NOTIFY_LISTENERS;
        assert_eq!(flags, UpdateFlags::NOTIFY_ALL);
        assert!(flags.contains(UpdateFlags::NOTIFY_LISTENERS));
        assert!(!UpdateFlags::NOTIFY_LISTENERS.contains(UpdateFlags::NOTIFY_NEIGHBORS));
        assert_eq!(UpdateFlags::NONE.bits(), 0);
    }
}
