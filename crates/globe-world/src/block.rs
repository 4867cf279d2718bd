//! Block states and the tags the polar pass cares about

use serde::{Deserialize, Serialize};

/// A block state in the world.
///
/// Stored as one byte per block inside a chunk.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    #[default]
    Air,
    Bedrock,
    Stone,
    Dirt,
    GrassBlock,
    Sand,
    Gravel,
    Water,
    Ice,
    PackedIce,
    SnowBlock,
    OakLog,
    OakLeaves,
    SpruceLog,
    SpruceLeaves,
    Sapling,
    ShortGrass,
    TallGrass,
    Fern,
    Dandelion,
    Poppy,
    Wheat,
    Vine,
}

impl BlockState {
    pub fn is_air(self) -> bool {
        self == Self::Air
    }

    pub fn is_leaves(self) -> bool {
        matches!(self, Self::OakLeaves | Self::SpruceLeaves)
    }

    /// Vegetation tag: leaves, logs, saplings, flowers, crops, the grass
    /// family, ferns and vines.
    pub fn is_vegetation(self) -> bool {
        matches!(
            self,
            Self::OakLog
                | Self::OakLeaves
                | Self::SpruceLog
                | Self::SpruceLeaves
                | Self::Sapling
                | Self::ShortGrass
                | Self::TallGrass
                | Self::Fern
                | Self::Dandelion
                | Self::Poppy
                | Self::Wheat
                | Self::Vine
        )
    }

    /// Whether this block stops movement. Fluids count, plants do not.
    pub fn blocks_motion(self) -> bool {
        match self {
            Self::Air
            | Self::Sapling
            | Self::ShortGrass
            | Self::TallGrass
            | Self::Fern
            | Self::Dandelion
            | Self::Poppy
            | Self::Wheat
            | Self::Vine => false,
            _ => true,
        }
    }

    /// Counted by the "motion blocking, no leaves" heightmap
    pub fn is_surface_solid(self) -> bool {
        self.blocks_motion() && !self.is_leaves()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vegetation_tag() {
        for block in [
            BlockState::OakLeaves,
            BlockState::SpruceLog,
            BlockState::Sapling,
            BlockState::Poppy,
            BlockState::Wheat,
            BlockState::ShortGrass,
            BlockState::Fern,
            BlockState::Vine,
        ] {
            assert!(block.is_vegetation(), "{block:?} should be vegetation");
        }
        for block in [BlockState::GrassBlock, BlockState::Water, BlockState::Stone, BlockState::Air] {
            assert!(!block.is_vegetation(), "{block:?} should not be vegetation");
        }
    }

    #[test]
    fn test_heightmap_predicate() {
        assert!(BlockState::Water.is_surface_solid());
        assert!(BlockState::OakLog.is_surface_solid());
        assert!(!BlockState::OakLeaves.is_surface_solid());
        assert!(!BlockState::TallGrass.is_surface_solid());
        assert!(!BlockState::Air.is_surface_solid());
    }
}
