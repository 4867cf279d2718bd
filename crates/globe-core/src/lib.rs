//! Globe Core - Shared types for the Globe server
//!
//! This crate provides the small set of types every other crate agrees on:
//! - `ChunkKey`, the packed chunk identity used as a map/set key
//! - Column index helpers for the 16x16 column grid of a chunk
//! - `EntityId` for players
//! - `TickClock`, the fixed-rate simulation clock

pub mod time;
pub mod types;

pub use glam::{IVec3, Vec3};
pub use time::{TickClock, TickConfig};
pub use types::{
    block_pos, column_index, column_local, ChunkKey, EntityId, CHUNK_COLUMNS, CHUNK_WIDTH,
};
