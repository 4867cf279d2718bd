//! Base terrain generation using Perlin noise
//!
//! Produces ordinary temperate terrain (grass, water, trees) everywhere. The
//! polar look is applied afterwards by the scrubber, never here.

use globe_core::{ChunkKey, CHUNK_WIDTH};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::block::BlockState;
use crate::chunk::Chunk;

/// Terrain generation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Random seed for generation
    pub seed: u32,
    /// Surface height where the noise sits at its midpoint
    pub base_height: i32,
    /// Amplitude of terrain features in blocks (0 gives flat terrain)
    pub max_height: f32,
    /// Water fills up to this Y
    pub sea_level: i32,
    /// Noise scale (smaller = larger features)
    pub noise_scale: f32,
    /// Number of octaves for fractal noise
    pub octaves: u32,
    /// Persistence for fractal noise (amplitude decrease per octave)
    pub persistence: f32,
    /// Lacunarity for fractal noise (frequency increase per octave)
    pub lacunarity: f32,
    /// Chance per grass column of a tree, out of 1000
    pub tree_per_mille: u32,
    /// Chance per grass column of a small plant, out of 1000
    pub plant_per_mille: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            base_height: 68,
            max_height: 24.0,
            sea_level: 63,
            noise_scale: 0.01,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            tree_per_mille: 12,
            plant_per_mille: 120,
        }
    }
}

impl TerrainConfig {
    /// Flat, bare terrain at `height` with no water or plants
    pub fn flat(height: i32) -> Self {
        Self {
            base_height: height,
            max_height: 0.0,
            sea_level: i32::MIN,
            tree_per_mille: 0,
            plant_per_mille: 0,
            ..Default::default()
        }
    }
}

/// Fills freshly created chunks with base terrain
pub struct TerrainGenerator {
    config: TerrainConfig,
    perlin: Perlin,
}

impl TerrainGenerator {
    pub fn new(config: TerrainConfig) -> Self {
        let perlin = Perlin::new(config.seed);
        Self { config, perlin }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Surface Y (topmost terrain block) for a column
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        if self.config.max_height == 0.0 {
            return self.config.base_height;
        }
        let n = fractal_noise(
            &self.perlin,
            (x as f32 * self.config.noise_scale) as f64,
            (z as f32 * self.config.noise_scale) as f64,
            self.config.octaves,
            self.config.persistence,
            self.config.lacunarity,
        );
        self.config.base_height + ((n - 0.5) * 2.0 * self.config.max_height).round() as i32
    }

    /// Generate the full contents of one chunk
    pub fn generate(&self, key: ChunkKey, min_y: i32, height: u32) -> Chunk {
        let mut chunk = Chunk::new(key, min_y, height);
        let max_y = chunk.max_y();

        for lz in 0..CHUNK_WIDTH {
            for lx in 0..CHUNK_WIDTH {
                let x = key.min_block_x() + lx;
                let z = key.min_block_z() + lz;
                let surface = self.surface_height(x, z).clamp(min_y, max_y - 1);
                let underwater = surface < self.config.sea_level;

                for y in min_y..=surface {
                    let block = if y == min_y {
                        BlockState::Bedrock
                    } else if y < surface - 3 {
                        BlockState::Stone
                    } else if underwater {
                        if y == surface {
                            BlockState::Sand
                        } else {
                            BlockState::Gravel
                        }
                    } else if y == surface {
                        BlockState::GrassBlock
                    } else {
                        BlockState::Dirt
                    };
                    chunk.set_local(lx, y, lz, block);
                }

                if underwater {
                    let top = self.config.sea_level.min(max_y - 1);
                    for y in (surface + 1)..=top {
                        chunk.set_local(lx, y, lz, BlockState::Water);
                    }
                    continue;
                }

                self.decorate_column(&mut chunk, lx, lz, x, z, surface);
            }
        }

        chunk
    }

    /// Plants and trees on top of a grass column. Trees are clipped to their
    /// own chunk so generation stays chunk-local.
    fn decorate_column(&self, chunk: &mut Chunk, lx: i32, lz: i32, x: i32, z: i32, surface: i32) {
        let roll = column_hash(self.config.seed, x, z) % 1000;
        let roll = roll as u32;

        if roll < self.config.tree_per_mille {
            let trunk = 4 + (roll % 3) as i32;
            let (log, leaves) = if roll % 2 == 0 {
                (BlockState::OakLog, BlockState::OakLeaves)
            } else {
                (BlockState::SpruceLog, BlockState::SpruceLeaves)
            };
            let top = surface + trunk;
            for dy in -2..=1 {
                let radius = if dy == 1 { 1 } else { 2 };
                for dz in -radius..=radius {
                    for dx in -radius..=radius {
                        let (tx, tz) = (lx + dx, lz + dz);
                        if !(0..CHUNK_WIDTH).contains(&tx) || !(0..CHUNK_WIDTH).contains(&tz) {
                            continue;
                        }
                        if chunk.get_local(tx, top + dy, tz).is_air() {
                            chunk.set_local(tx, top + dy, tz, leaves);
                        }
                    }
                }
            }
            for y in (surface + 1)..=top {
                chunk.set_local(lx, y, lz, log);
            }
        } else if roll < self.config.tree_per_mille + self.config.plant_per_mille {
            let plant = match roll % 5 {
                0 | 1 => BlockState::ShortGrass,
                2 => BlockState::Fern,
                3 => BlockState::Dandelion,
                _ => BlockState::Poppy,
            };
            if chunk.get_local(lx, surface + 1, lz).is_air() {
                chunk.set_local(lx, surface + 1, lz, plant);
            }
        }
    }
}

fn column_hash(seed: u32, x: i32, z: i32) -> u64 {
    let mut h = seed as u64 ^ 0x7A3E_21B5_D4C1_F7A9;
    h ^= (x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= (z as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h = (h ^ (h >> 33)).wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h = (h ^ (h >> 33)).wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    h ^ (h >> 33)
}

/// Generate fractal (multi-octave) Perlin noise in 0..1
fn fractal_noise(
    perlin: &Perlin,
    x: f64,
    z: f64,
    octaves: u32,
    persistence: f32,
    lacunarity: f32,
) -> f32 {
    let mut total = 0.0f32;
    let mut amplitude = 1.0f32;
    let mut frequency = 1.0f32;
    let mut max_value = 0.0f32;

    for _ in 0..octaves {
        let value = perlin.get([x * frequency as f64, z * frequency as f64]) as f32;
        total += value * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_value == 0.0 {
        return 0.5;
    }
    // Normalize to -1 to 1 range, then shift to 0 to 1
    (total / max_value + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_terrain() {
        let generator = TerrainGenerator::new(TerrainConfig::flat(40));
        let chunk = generator.generate(ChunkKey::new(3, -2), 0, 64);
        assert_eq!(chunk.get_local(0, 0, 0), BlockState::Bedrock);
        assert_eq!(chunk.get_local(7, 40, 9), BlockState::GrassBlock);
        assert_eq!(chunk.get_local(7, 39, 9), BlockState::Dirt);
        assert_eq!(chunk.get_local(7, 20, 9), BlockState::Stone);
        assert_eq!(chunk.get_local(7, 41, 9), BlockState::Air);
        assert_eq!(chunk.top_solid_height(7, 9), 41);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = TerrainGenerator::new(TerrainConfig::default());
        let a = generator.generate(ChunkKey::new(800, 800), -64, 384);
        let b = generator.generate(ChunkKey::new(800, 800), -64, 384);
        assert!(a.same_blocks(&b));
    }

    #[test]
    fn test_default_terrain_has_vegetation() {
        let generator = TerrainGenerator::new(TerrainConfig::default());
        let mut vegetation = 0;
        for cx in 0..6 {
            for cz in 0..6 {
                let chunk = generator.generate(ChunkKey::new(cx, cz), -64, 384);
                for lz in 0..CHUNK_WIDTH {
                    for lx in 0..CHUNK_WIDTH {
                        let top = chunk.top_solid_height(lx, lz);
                        if (top..top + 8).any(|y| chunk.get_local(lx, y, lz).is_vegetation()) {
                            vegetation += 1;
                        }
                    }
                }
            }
        }
        assert!(vegetation > 0, "expected some plants");
    }
}
