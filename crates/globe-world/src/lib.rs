//! Globe World - World access, chunk streaming and polar terrain dressing
//!
//! Provides the `WorldAccess` capability, an in-memory chunk manager that
//! streams terrain around players, and the incremental polar-cap scrubber
//! that turns already generated terrain near the poles into snow and ice.

pub mod access;
pub mod block;
pub mod chunk;
pub mod classifier;
pub mod error;
pub mod latitude;
pub mod player;
pub mod progress;
pub mod scrubber;
pub mod terrain;

pub use access::{UpdateFlags, WorldAccess};
pub use block::BlockState;
pub use chunk::{Chunk, ChunkConfig, ChunkManager};
pub use classifier::SurfaceVariant;
pub use error::WorldError;
pub use latitude::{PolarBand, WorldPreset, DEFAULT_POLAR_START_FRACTION};
pub use player::Player;
pub use progress::ChunkProgressTracker;
pub use scrubber::{PassReport, PolarCapScrubber, ScrubConfig, TickReport};
pub use terrain::{TerrainConfig, TerrainGenerator};
