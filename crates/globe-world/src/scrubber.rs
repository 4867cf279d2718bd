//! Incremental polar-cap terrain scrubbing
//!
//! Rewrites already generated terrain inside the polar band into snow, stone
//! and packed ice and strips vegetation, a few columns at a time. Each tick
//! every player in the band advances at most one nearby chunk by at most
//! `budget` columns, so the cost per tick stays flat no matter how large the
//! world is. Progress is keyed by chunk, so players coming and going or
//! teleporting never corrupt it.
//!
//! Nothing here returns an error. Columns that cannot be processed are
//! skipped and still count as visited.

use globe_core::{column_local, ChunkKey, IVec3, CHUNK_COLUMNS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::{UpdateFlags, WorldAccess};
use crate::block::BlockState;
use crate::classifier::SurfaceVariant;
use crate::error::WorldError;
use crate::latitude::PolarBand;
use crate::progress::ChunkProgressTracker;

/// Player's own chunk first, then the ring in row-major order
const NEIGHBOR_SCAN_ORDER: [(i32, i32); 9] = [
    (0, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Tuning for the scrub pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Columns advanced per player per tick
    pub budget: u16,
    /// Blocks above the surface checked for vegetation (surface included)
    pub vertical_window: i32,
    /// Slack past the world border still treated as inside
    pub border_margin: i32,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            budget: 16,
            vertical_window: 24,
            border_margin: 32,
        }
    }
}

impl ScrubConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.budget == 0 || self.budget > CHUNK_COLUMNS {
            return Err(WorldError::InvalidBudget(self.budget));
        }
        if self.vertical_window < 1 {
            return Err(WorldError::EmptyVerticalWindow);
        }
        Ok(())
    }
}

/// What one `tick` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Players inside the polar band
    pub players_in_band: u32,
    /// Chunks that received a pass
    pub chunks_advanced: u32,
    /// Columns visited, skipped ones included
    pub columns_processed: u32,
    /// Block writes issued
    pub blocks_written: u32,
    /// Chunks that reached completion this tick
    pub chunks_completed: u32,
}

/// Result of one incremental pass over a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub columns_processed: u16,
    /// Columns that received at least one write
    pub columns_changed: u16,
    pub blocks_written: u32,
    pub completed: bool,
}

/// Owns the scrub state for one world. Create it when the polar preset
/// activates and drop it on shutdown; progress is not persisted, so a new
/// instance simply rescrubs and finds nothing left to change.
pub struct PolarCapScrubber {
    band: PolarBand,
    config: ScrubConfig,
    progress: ChunkProgressTracker,
}

impl PolarCapScrubber {
    pub fn new(band: PolarBand, config: ScrubConfig) -> Result<Self, WorldError> {
        config.validate()?;
        info!(
            "Polar scrubber active: radius={} polarStart={} budget={} window={}",
            band.radius(),
            band.start_abs_z(),
            config.budget,
            config.vertical_window
        );
        Ok(Self {
            band,
            config,
            progress: ChunkProgressTracker::new(),
        })
    }

    pub fn band(&self) -> &PolarBand {
        &self.band
    }

    pub fn config(&self) -> &ScrubConfig {
        &self.config
    }

    pub fn progress(&self) -> &ChunkProgressTracker {
        &self.progress
    }

    /// Run once per simulation tick
    pub fn tick<W: WorldAccess>(&mut self, world: &mut W) -> TickReport {
        let mut report = TickReport::default();

        for pos in world.player_positions() {
            if !self.band.contains_z(pos.z) {
                continue;
            }
            report.players_in_band += 1;

            let Some(key) = self.select_chunk(ChunkKey::from_block(pos)) else {
                continue;
            };
            if !world.load_chunk(key) {
                continue;
            }

            let pass = self.scrub_chunk_surface(world, key);
            report.chunks_advanced += 1;
            report.columns_processed += pass.columns_processed as u32;
            report.blocks_written += pass.blocks_written;
            if pass.completed {
                report.chunks_completed += 1;
            }
        }

        report
    }

    /// First chunk around `center` that still needs work and whose middle
    /// lies inside the band
    pub fn select_chunk(&self, center: ChunkKey) -> Option<ChunkKey> {
        NEIGHBOR_SCAN_ORDER
            .iter()
            .map(|&(dx, dz)| center.offset(dx, dz))
            .find(|&key| {
                !self.progress.is_completed(key) && self.band.contains_z(key.center_block_z())
            })
    }

    /// Advance one chunk by up to `budget` columns from its stored cursor
    pub fn scrub_chunk_surface<W: WorldAccess>(
        &mut self,
        world: &mut W,
        key: ChunkKey,
    ) -> PassReport {
        let mut pass = PassReport::default();
        let cursor = self.progress.cursor_for(key);
        if cursor >= CHUNK_COLUMNS {
            pass.completed = true;
            return pass;
        }

        let end = CHUNK_COLUMNS.min(cursor.saturating_add(self.config.budget));
        for index in cursor..end {
            let (lx, lz) = column_local(index);
            let x = key.min_block_x() + lx;
            let z = key.min_block_z() + lz;

            let writes = self.scrub_column(world, x, z);
            if writes > 0 {
                pass.columns_changed += 1;
                pass.blocks_written += writes;
            }
            pass.columns_processed += 1;
        }

        self.progress.advance(key, cursor + pass.columns_processed);
        pass.completed = self.progress.is_completed(key);

        if pass.completed {
            debug!("Polar scrub finished chunk {}", key);
        } else {
            debug!(
                "Polar scrub advanced chunk {} to column {} ({} writes)",
                key,
                self.progress.cursor_for(key),
                pass.blocks_written
            );
        }
        pass
    }

    /// Dress a single column; returns the number of writes
    fn scrub_column<W: WorldAccess>(&self, world: &mut W, x: i32, z: i32) -> u32 {
        if !self.band.contains_z(z)
            || self.band.beyond_border(x, self.config.border_margin)
            || self.band.beyond_border(z, self.config.border_margin)
        {
            return 0;
        }

        let height = world.top_solid_height(x, z);
        let bottom = world.bottom_y();
        if height <= bottom {
            return 0;
        }

        // Logs count for the heightmap; step down through the whole trunk
        let mut ground = height - 1;
        while ground > bottom && world.is_vegetation(world.block_state(IVec3::new(x, ground, z))) {
            ground -= 1;
        }
        let surface = IVec3::new(x, ground, z);
        let mut writes = 0;

        // The window covers the trunk too, so nothing counted by the
        // heightmap is left above the dressed ground
        let reach = self.config.vertical_window.max(height - ground);
        for dy in 0..reach {
            let pos = surface + IVec3::Y * dy;
            let state = world.block_state(pos);
            if world.is_vegetation(state)
                && world.set_block_state(pos, BlockState::Air, UpdateFlags::NOTIFY_LISTENERS)
            {
                writes += 1;
            }
        }

        let current = world.block_state(surface);
        let target = match current {
            BlockState::Water | BlockState::Ice => BlockState::Ice,
            // Vegetation all the way down to the floor
            BlockState::Air => return writes,
            _ => SurfaceVariant::classify(x, z).block(),
        };

        if current != target && world.set_block_state(surface, target, UpdateFlags::NOTIFY_LISTENERS) {
            writes += 1;
        }
        writes
    }
}
