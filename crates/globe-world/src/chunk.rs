//! Chunk storage and player-driven chunk streaming
//!
//! `ChunkManager` keeps a grid of 16x16 block columns resident around every
//! connected player, parks unloaded chunks in a region store so edits survive
//! load/unload churn, and exposes the whole thing through `WorldAccess`.

use std::collections::HashMap;

use globe_core::{ChunkKey, EntityId, IVec3, Vec3, CHUNK_WIDTH};
use tracing::debug;

use crate::access::{UpdateFlags, WorldAccess};
use crate::block::BlockState;
use crate::error::WorldError;
use crate::player::Player;
use crate::terrain::{TerrainConfig, TerrainGenerator};

/// Configuration for the chunk system
#[derive(Clone, Debug)]
pub struct ChunkConfig {
    /// Lowest block Y (world floor)
    pub min_y: i32,
    /// Number of block layers above `min_y`
    pub height: u32,
    /// Radius in chunks around each player to keep loaded
    pub load_radius: u32,
    /// Radius beyond which chunks are unloaded (hysteresis)
    pub unload_radius: u32,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_y: -64,
            height: 384,
            load_radius: 2,
            unload_radius: 3,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.height == 0 {
            return Err(WorldError::InvalidChunkConfig("height must be positive".into()));
        }
        if self.unload_radius < self.load_radius {
            return Err(WorldError::InvalidChunkConfig(format!(
                "unload radius {} is inside load radius {}",
                self.unload_radius, self.load_radius
            )));
        }
        Ok(())
    }
}

/// A single 16 x height x 16 block chunk
#[derive(Clone)]
pub struct Chunk {
    /// Grid coordinate of this chunk
    pub key: ChunkKey,
    min_y: i32,
    height: u32,
    /// Blocks, indexed `(y * 16 + z) * 16 + x`
    blocks: Vec<BlockState>,
    /// Whether the chunk changed since it was generated or last saved
    pub dirty: bool,
}

impl Chunk {
    pub fn new(key: ChunkKey, min_y: i32, height: u32) -> Self {
        let len = (CHUNK_WIDTH * CHUNK_WIDTH) as usize * height as usize;
        Self {
            key,
            min_y,
            height,
            blocks: vec![BlockState::Air; len],
            dirty: false,
        }
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    /// One above the highest block layer
    pub fn max_y(&self) -> i32 {
        self.min_y + self.height as i32
    }

    fn index(&self, lx: i32, y: i32, lz: i32) -> Option<usize> {
        if !(0..CHUNK_WIDTH).contains(&lx) || !(0..CHUNK_WIDTH).contains(&lz) {
            return None;
        }
        if y < self.min_y || y >= self.max_y() {
            return None;
        }
        let ly = (y - self.min_y) as usize;
        Some((ly * CHUNK_WIDTH as usize + lz as usize) * CHUNK_WIDTH as usize + lx as usize)
    }

    /// Block at chunk-local X/Z and absolute Y. Out of range reads as air.
    pub fn get_local(&self, lx: i32, y: i32, lz: i32) -> BlockState {
        self.index(lx, y, lz)
            .map_or(BlockState::Air, |i| self.blocks[i])
    }

    /// Returns `false` for out-of-range positions
    pub fn set_local(&mut self, lx: i32, y: i32, lz: i32, state: BlockState) -> bool {
        match self.index(lx, y, lz) {
            Some(i) => {
                self.blocks[i] = state;
                true
            }
            None => false,
        }
    }

    /// "Motion blocking, no leaves" height: one above the top counted block,
    /// or `min_y` for an empty column.
    pub fn top_solid_height(&self, lx: i32, lz: i32) -> i32 {
        (self.min_y..self.max_y())
            .rev()
            .find(|&y| self.get_local(lx, y, lz).is_surface_solid())
            .map_or(self.min_y, |y| y + 1)
    }

    /// Compare block contents with another chunk
    pub fn same_blocks(&self, other: &Chunk) -> bool {
        self.min_y == other.min_y && self.height == other.height && self.blocks == other.blocks
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("key", &self.key)
            .field("min_y", &self.min_y)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .finish()
    }
}

fn local(coord: i32) -> i32 {
    coord & (CHUNK_WIDTH - 1)
}

/// Manages loading/unloading of chunks around connected players
pub struct ChunkManager {
    /// Chunk configuration
    pub config: ChunkConfig,
    generator: TerrainGenerator,
    /// Currently loaded chunks
    loaded_chunks: HashMap<ChunkKey, Chunk>,
    /// Unloaded chunks kept so edits survive a reload
    region_store: HashMap<ChunkKey, Chunk>,
    players: Vec<Player>,
    /// Chunks loaded during the last `update` (or forced by `load_chunk`)
    pub newly_loaded: Vec<ChunkKey>,
    /// Chunks unloaded during the last `update`
    pub newly_unloaded: Vec<ChunkKey>,
    write_count: u64,
}

impl ChunkManager {
    /// Create a new chunk manager
    pub fn new(config: ChunkConfig, terrain_config: TerrainConfig) -> Result<Self, WorldError> {
        config.validate()?;
        Ok(Self {
            config,
            generator: TerrainGenerator::new(terrain_config),
            loaded_chunks: HashMap::new(),
            region_store: HashMap::new(),
            players: Vec::new(),
            newly_loaded: Vec::new(),
            newly_unloaded: Vec::new(),
            write_count: 0,
        })
    }

    pub fn add_player(&mut self, player: Player) -> EntityId {
        let id = player.id;
        self.players.push(player);
        id
    }

    pub fn remove_player(&mut self, id: EntityId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    pub fn move_player(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.position = position;
                true
            }
            None => false,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_loaded(&self, key: ChunkKey) -> bool {
        self.loaded_chunks.contains_key(&key)
    }

    /// Number of currently loaded chunks
    pub fn loaded_count(&self) -> usize {
        self.loaded_chunks.len()
    }

    /// Number of chunks parked in the region store
    pub fn stored_count(&self) -> usize {
        self.region_store.len()
    }

    /// Block writes accepted since creation
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Update chunk loading/unloading based on player positions.
    /// Call this once per tick.
    pub fn update(&mut self) {
        self.newly_loaded.clear();
        self.newly_unloaded.clear();

        let centers: Vec<ChunkKey> = self.players.iter().map(Player::chunk).collect();

        // Unload chunks that no player is near
        let unload_radius = self.config.unload_radius;
        let to_unload: Vec<ChunkKey> = self
            .loaded_chunks
            .keys()
            .filter(|key| centers.iter().all(|c| key.distance(*c) > unload_radius))
            .copied()
            .collect();

        for key in to_unload {
            self.unload(key);
        }

        // Load nearby chunks
        let radius = self.config.load_radius as i32;
        for center in centers {
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    self.ensure_loaded(center.offset(dx, dz));
                }
            }
        }
    }

    /// Unload every chunk into the region store
    pub fn unload_all(&mut self) {
        let keys: Vec<ChunkKey> = self.loaded_chunks.keys().copied().collect();
        for key in keys {
            self.unload(key);
        }
    }

    fn ensure_loaded(&mut self, key: ChunkKey) {
        if self.loaded_chunks.contains_key(&key) {
            return;
        }
        let chunk = match self.region_store.remove(&key) {
            Some(chunk) => chunk,
            None => self
                .generator
                .generate(key, self.config.min_y, self.config.height),
        };
        self.loaded_chunks.insert(key, chunk);
        self.newly_loaded.push(key);
    }

    fn unload(&mut self, key: ChunkKey) {
        if let Some(mut chunk) = self.loaded_chunks.remove(&key) {
            if chunk.dirty {
                debug!("Saving edited chunk {} to region store", key);
            }
            chunk.dirty = false;
            self.region_store.insert(key, chunk);
            self.newly_unloaded.push(key);
        }
    }

    fn chunk_at(&self, x: i32, z: i32) -> Option<&Chunk> {
        self.loaded_chunks.get(&ChunkKey::new(x >> 4, z >> 4))
    }
}

impl WorldAccess for ChunkManager {
    fn bottom_y(&self) -> i32 {
        self.config.min_y
    }

    fn top_solid_height(&self, x: i32, z: i32) -> i32 {
        self.chunk_at(x, z)
            .map_or(self.config.min_y, |chunk| chunk.top_solid_height(local(x), local(z)))
    }

    fn block_state(&self, pos: IVec3) -> BlockState {
        self.chunk_at(pos.x, pos.z)
            .map_or(BlockState::Air, |chunk| chunk.get_local(local(pos.x), pos.y, local(pos.z)))
    }

    fn set_block_state(&mut self, pos: IVec3, state: BlockState, _flags: UpdateFlags) -> bool {
        let key = ChunkKey::new(pos.x >> 4, pos.z >> 4);
        let Some(chunk) = self.loaded_chunks.get_mut(&key) else {
            return false;
        };
        if !chunk.set_local(local(pos.x), pos.y, local(pos.z), state) {
            return false;
        }
        chunk.dirty = true;
        self.write_count += 1;
        true
    }

    fn load_chunk(&mut self, key: ChunkKey) -> bool {
        self.ensure_loaded(key);
        true
    }

    fn player_positions(&self) -> Vec<IVec3> {
        self.players.iter().map(Player::block_pos).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ChunkConfig {
        ChunkConfig {
            min_y: 0,
            height: 64,
            load_radius: 1,
            unload_radius: 2,
        }
    }

    #[test]
    fn test_chunk_bounds() {
        let mut chunk = Chunk::new(ChunkKey::new(0, 0), -8, 16);
        assert!(chunk.set_local(0, -8, 0, BlockState::Stone));
        assert!(!chunk.set_local(0, 8, 0, BlockState::Stone));
        assert!(!chunk.set_local(16, 0, 0, BlockState::Stone));
        assert_eq!(chunk.get_local(0, -9, 0), BlockState::Air);
        assert_eq!(chunk.get_local(0, -8, 0), BlockState::Stone);
    }

    #[test]
    fn test_heightmap_ignores_leaves_and_plants() {
        let mut chunk = Chunk::new(ChunkKey::new(0, 0), 0, 32);
        chunk.set_local(3, 10, 4, BlockState::GrassBlock);
        chunk.set_local(3, 11, 4, BlockState::ShortGrass);
        chunk.set_local(3, 15, 4, BlockState::OakLeaves);
        assert_eq!(chunk.top_solid_height(3, 4), 11);

        chunk.set_local(3, 12, 4, BlockState::OakLog);
        assert_eq!(chunk.top_solid_height(3, 4), 13);

        assert_eq!(chunk.top_solid_height(0, 0), 0);
    }

    #[test]
    fn test_chunk_manager_load_unload() {
        let mut manager = ChunkManager::new(small_config(), TerrainConfig::flat(20)).unwrap();
        manager.add_player(Player::new("a", Vec3::new(0.0, 21.0, 0.0)));

        manager.update();
        // Should have (2*1+1)^2 = 9 chunks loaded
        assert_eq!(manager.loaded_count(), 9);
        assert_eq!(manager.newly_loaded.len(), 9);

        // Move far away - old chunks should unload, new ones load
        let id = manager.players()[0].id;
        manager.move_player(id, Vec3::new(500.0, 21.0, 500.0));
        manager.update();

        assert!(!manager.is_loaded(ChunkKey::new(0, 0)));
        assert!(manager.is_loaded(ChunkKey::new(31, 31)));
        assert_eq!(manager.newly_unloaded.len(), 9);
        assert_eq!(manager.stored_count(), 9);
    }

    #[test]
    fn test_edits_survive_reload() {
        let mut manager = ChunkManager::new(small_config(), TerrainConfig::flat(20)).unwrap();
        let id = manager.add_player(Player::new("a", Vec3::new(8.0, 21.0, 8.0)));
        manager.update();

        let pos = IVec3::new(5, 20, 5);
        assert!(manager.set_block_state(pos, BlockState::SnowBlock, UpdateFlags::NOTIFY_LISTENERS));

        manager.move_player(id, Vec3::new(2000.0, 21.0, 2000.0));
        manager.update();
        assert!(!manager.is_loaded(ChunkKey::new(0, 0)));
        assert_eq!(manager.block_state(pos), BlockState::Air);

        manager.move_player(id, Vec3::new(8.0, 21.0, 8.0));
        manager.update();
        assert_eq!(manager.block_state(pos), BlockState::SnowBlock);
    }

    #[test]
    fn test_unloaded_reads_are_safe() {
        let mut manager = ChunkManager::new(small_config(), TerrainConfig::flat(20)).unwrap();
        let pos = IVec3::new(100, 20, 100);
        assert_eq!(manager.block_state(pos), BlockState::Air);
        assert_eq!(manager.top_solid_height(100, 100), 0);
        assert!(!manager.set_block_state(pos, BlockState::Stone, UpdateFlags::NONE));
        assert_eq!(manager.write_count(), 0);

        assert!(manager.load_chunk(ChunkKey::new(6, 6)));
        assert_eq!(manager.top_solid_height(100, 100), 21);
    }

    #[test]
    fn test_player_positions_follow_insertion_order() {
        let mut manager = ChunkManager::new(small_config(), TerrainConfig::flat(20)).unwrap();
        manager.add_player(Player::new("a", Vec3::new(1.0, 21.0, 2.0)));
        let b = manager.add_player(Player::new("b", Vec3::new(-3.5, 21.0, 4.0)));
        assert_eq!(
            manager.player_positions(),
            vec![IVec3::new(1, 21, 2), IVec3::new(-4, 21, 4)]
        );
        manager.remove_player(b);
        assert_eq!(manager.player_positions().len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        let config = ChunkConfig {
            load_radius: 3,
            unload_radius: 1,
            ..small_config()
        };
        assert!(matches!(
            ChunkManager::new(config, TerrainConfig::default()),
            Err(WorldError::InvalidChunkConfig(_))
        ));
    }
}
