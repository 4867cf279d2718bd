//! Globe - headless world server with incremental polar-cap dressing
//!
//! Streams chunks around simulated players and, on globe presets, runs the
//! polar scrubber once per tick.

mod settings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use globe_core::{EntityId, TickClock, TickConfig, Vec3};
use globe_world::{ChunkManager, Player, PolarBand, PolarCapScrubber, TickReport, WorldAccess};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use settings::ServerSettings;

/// Ticks between progress summaries
const SUMMARY_INTERVAL: u64 = 200;

/// Largest step a wandering player takes per tick, in blocks
const WANDER_STEP: f32 = 0.25;

/// Running totals for the summary lines
#[derive(Debug, Default)]
struct Totals {
    columns: u64,
    blocks: u64,
    chunks_completed: u64,
}

impl Totals {
    fn add(&mut self, report: &TickReport) {
        self.columns += report.columns_processed as u64;
        self.blocks += report.blocks_written as u64;
        self.chunks_completed += report.chunks_completed as u64;
    }
}

/// Server state
struct GlobeServer {
    world: ChunkManager,
    scrubber: Option<PolarCapScrubber>,
    wanderers: Vec<EntityId>,
    rng: StdRng,
    totals: Totals,
}

impl GlobeServer {
    fn new(settings: &ServerSettings) -> Result<Self> {
        let world_settings = &settings.world;
        let mut world = ChunkManager::new(
            world_settings.chunk_config(),
            world_settings.terrain_config(),
        )
        .context("Failed to create chunk manager")?;

        let preset = world_settings.preset;
        let scrubber = if preset.is_globe() {
            let band = PolarBand::for_preset(preset, settings.polar.start_fraction)
                .context("Failed to derive polar band")?;
            info!(
                "World border set: preset={} radius={} diameter={} center=0,0 polar start={}",
                preset,
                band.radius(),
                band.radius() * 2,
                band.start_abs_z()
            );
            if settings.polar.enabled {
                Some(
                    PolarCapScrubber::new(band, settings.polar.scrub_config())
                        .context("Failed to create polar scrubber")?,
                )
            } else {
                info!("Polar scrubber disabled");
                None
            }
        } else {
            info!("Preset {} has no globe features", preset);
            None
        };

        let mut wanderers = Vec::new();
        for spawn in &settings.simulation.players {
            let mut player = Player::new(spawn.name.clone(), Vec3::new(spawn.x, 0.0, spawn.z));
            let feet = player.block_pos();
            world.load_chunk(player.chunk());
            player.position.y = world.top_solid_height(feet.x, feet.z) as f32;
            info!(
                "Player {} joined at ({:.1}, {:.1}, {:.1})",
                player.name, player.position.x, player.position.y, player.position.z
            );
            let id = world.add_player(player);
            if spawn.wander {
                wanderers.push(id);
            }
        }

        Ok(Self {
            world,
            scrubber,
            wanderers,
            rng: StdRng::seed_from_u64(world_settings.seed as u64),
            totals: Totals::default(),
        })
    }

    /// One server tick: move players, stream chunks, then dress the poles
    fn tick(&mut self, tick: u64) {
        self.wander();
        self.world.update();

        if !self.world.newly_loaded.is_empty() || !self.world.newly_unloaded.is_empty() {
            debug!(
                "Tick {}: loaded {} chunks, unloaded {}",
                tick,
                self.world.newly_loaded.len(),
                self.world.newly_unloaded.len()
            );
        }

        if let Some(scrubber) = self.scrubber.as_mut() {
            let report = scrubber.tick(&mut self.world);
            self.totals.add(&report);
        }
    }

    fn wander(&mut self) {
        for &id in &self.wanderers {
            let Some(player) = self.world.players().iter().find(|p| p.id == id) else {
                continue;
            };
            let dx = self.rng.gen_range(-WANDER_STEP..=WANDER_STEP);
            let dz = self.rng.gen_range(-WANDER_STEP..=WANDER_STEP);
            let target = player.position + Vec3::new(dx, 0.0, dz);
            self.world.move_player(id, target);
        }
    }

    fn log_summary(&self, tick: u64) {
        match &self.scrubber {
            Some(scrubber) => info!(
                "Tick {}: {} chunks loaded, {} stored, polar columns={} blocks={} chunks done={} in progress={}",
                tick,
                self.world.loaded_count(),
                self.world.stored_count(),
                self.totals.columns,
                self.totals.blocks,
                self.totals.chunks_completed,
                scrubber.progress().in_progress_count()
            ),
            None => info!(
                "Tick {}: {} chunks loaded, {} stored",
                tick,
                self.world.loaded_count(),
                self.world.stored_count()
            ),
        }
    }

    fn shutdown(&mut self) {
        if let Some(scrubber) = self.scrubber.take() {
            info!(
                "Dropping polar scrubber: {} chunks completed, {} in progress",
                scrubber.progress().completed_count(),
                scrubber.progress().in_progress_count()
            );
        }
        self.world.unload_all();
        info!(
            "World stopped: {} block writes, {} chunks stored",
            self.world.write_count(),
            self.world.stored_count()
        );
    }
}

fn main() -> Result<()> {
    let settings_arg = std::env::args().nth(1).map(PathBuf::from);

    // Scoped subscriber so load warnings show before the verbosity is known
    let settings = {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || load_settings(settings_arg.as_deref()))
    };

    let level = if settings.simulation.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Globe server...");

    let mut server = GlobeServer::new(&settings)?;
    let mut clock = TickClock::new(TickConfig {
        ticks_per_second: settings.simulation.tps,
        ..Default::default()
    });
    let limit = settings.simulation.ticks;

    if settings.simulation.realtime {
        let tick_length = Duration::from_secs_f32(clock.config.tick_length());
        let mut last_frame = Instant::now();
        while limit == 0 || clock.tick_count < limit {
            std::thread::sleep(tick_length);
            let now = Instant::now();
            clock.update(now.duration_since(last_frame).as_secs_f32());
            last_frame = now;

            let due = clock.due_ticks() as u64;
            let first = clock.tick_count - due;
            for tick in (first + 1)..=clock.tick_count {
                server.tick(tick);
                if tick % SUMMARY_INTERVAL == 0 {
                    server.log_summary(tick);
                }
            }
        }
    } else {
        while limit == 0 || clock.tick_count < limit {
            clock.step();
            server.tick(clock.tick_count);
            if clock.every(SUMMARY_INTERVAL) {
                server.log_summary(clock.tick_count);
            }
        }
    }

    if !clock.every(SUMMARY_INTERVAL) {
        server.log_summary(clock.tick_count);
    }
    server.shutdown();
    Ok(())
}

fn load_settings(path: Option<&std::path::Path>) -> ServerSettings {
    match path {
        Some(path) => ServerSettings::load_from(path),
        None => {
            let settings = ServerSettings::load();
            let missing = ServerSettings::settings_path().is_some_and(|p| !p.exists());
            if missing {
                if let Err(e) = settings.save() {
                    warn!("Could not write default settings: {}", e);
                }
            }
            settings
        }
    }
}
