#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting sphere spawn commands.
//!
//! The system keeps a single pending spawn whose due time is measured against
//! a clock advanced exclusively by [`Event::TimeAdvanced`]. Each released
//! spawn schedules its successor after a delay that shrinks geometrically, so
//! later spheres arrive much faster than earlier ones.

use std::time::Duration;

use memory_spheres_core::{Command, Event, GridCell, Position, MAX_SPHERES, PALETTE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Delay preceding the first decay step, in milliseconds.
pub const INITIAL_DELAY_MS: f64 = 1_000.0;
/// Factor applied to the delay after every spawn.
pub const DELAY_DECAY: f64 = 0.9;
/// Maximum random offset applied along each horizontal grid axis.
pub const JITTER: f32 = 0.25;

const HORIZONTAL_SPREAD: f32 = 30.0;
const VERTICAL_SPREAD: f32 = 15.0;
const LAYER_STEP: f32 = 1.5;
const HORIZONTAL_ORIGIN: f32 = 2.25;
const VERTICAL_ORIGIN: f32 = 2.0;
const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding jitter and color draws.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }

    /// Seed used for jitter and color draws.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Progression state that places successive spheres on the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnCursor {
    spawned: u32,
    delay_ms: f64,
}

impl SpawnCursor {
    /// Creates a cursor positioned at the first grid cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            spawned: 0,
            delay_ms: INITIAL_DELAY_MS,
        }
    }

    /// Grid cell the next sphere will occupy.
    #[must_use]
    pub const fn cell(&self) -> GridCell {
        GridCell::from_spawn_index(self.spawned)
    }

    /// Number of spheres created so far.
    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Current inter-spawn delay in milliseconds.
    #[must_use]
    pub const fn delay_millis(&self) -> f64 {
        self.delay_ms
    }

    /// Reports whether the spawn cap has been reached.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.spawned >= MAX_SPHERES
    }

    /// Records a spawn, moving to the next cell and shrinking the delay.
    pub fn advance(&mut self) {
        self.spawned = self.spawned.saturating_add(1);
        self.delay_ms = (self.delay_ms * DELAY_DECAY).max(f64::MIN_POSITIVE);
    }
}

impl Default for SpawnCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the single spawn awaiting its due time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSpawn {
    due_ms: f64,
}

impl PendingSpawn {
    /// Clock reading, in milliseconds, at which the spawn is released.
    #[must_use]
    pub const fn due_millis(&self) -> f64 {
        self.due_ms
    }
}

/// Pure system that deterministically emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
    cursor: SpawnCursor,
    clock: Duration,
    pending: Option<PendingSpawn>,
}

impl Spawning {
    /// Creates a new spawning system whose first spawn is due immediately.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            cursor: SpawnCursor::new(),
            clock: Duration::ZERO,
            pending: Some(PendingSpawn { due_ms: 0.0 }),
        }
    }

    /// Progression state of the grid cursor.
    #[must_use]
    pub fn cursor(&self) -> &SpawnCursor {
        &self.cursor
    }

    /// Spawn currently awaiting its due time, if any.
    #[must_use]
    pub fn pending(&self) -> Option<PendingSpawn> {
        self.pending
    }

    /// Simulated time observed by the system.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock
    }

    /// Drops the pending spawn so no further spheres are emitted.
    ///
    /// Returns `true` when a spawn was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Consumes events and emits one spawn command per elapsed due time.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        let mut tick_observed = false;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
                tick_observed = true;
            }
        }

        if !tick_observed {
            return;
        }

        self.clock = self.clock.saturating_add(accumulated);
        let now_ms = self.clock.as_nanos() as f64 / NANOS_PER_MILLI;

        while let Some(pending) = self.pending {
            if pending.due_ms > now_ms {
                break;
            }
            out.push(self.release(pending));
        }
    }

    fn release(&mut self, pending: PendingSpawn) -> Command {
        let cell = self.cursor.cell();
        let jitter_x = self.rng.gen_range(-JITTER..JITTER);
        let jitter_z = self.rng.gen_range(-JITTER..JITTER);
        let color = PALETTE[self.rng.gen_range(0..PALETTE.len())];

        self.cursor.advance();
        self.pending = if self.cursor.is_exhausted() {
            info!(spawned = self.cursor.spawned(), "spawning finished");
            None
        } else {
            Some(PendingSpawn {
                due_ms: pending.due_ms + self.cursor.delay_millis(),
            })
        };

        debug!(
            spawned = self.cursor.spawned(),
            column = cell.column(),
            depth = cell.depth(),
            layer = cell.layer(),
            next_delay_ms = self.cursor.delay_millis(),
            "sphere scheduled"
        );

        Command::SpawnSphere {
            cell,
            position: cell_position(cell, jitter_x, jitter_z),
            color,
        }
    }
}

/// Converts a grid cell and horizontal jitter into a world-space sphere centre.
#[must_use]
pub fn cell_position(cell: GridCell, jitter_x: f32, jitter_z: f32) -> Position {
    Position::new(
        (cell.column() as f32 - HORIZONTAL_ORIGIN + jitter_x) * HORIZONTAL_SPREAD,
        (cell.layer() as f32 * LAYER_STEP - VERTICAL_ORIGIN) * VERTICAL_SPREAD,
        (cell.depth() as f32 - HORIZONTAL_ORIGIN + jitter_z) * HORIZONTAL_SPREAD,
    )
}
