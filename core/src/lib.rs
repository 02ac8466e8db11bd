#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the BioCrowds simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure stage systems. Adapters submit [`Command`]
//! values describing desired control changes, the world executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values describing
//! what happened. Stage systems never see the world directly: they receive
//! immutable slices and grids and return freshly materialized buffers, which is
//! what allows the [`Substrate`] to run every cell of a stage independently.

pub mod geometry;

mod config;
mod grid;
mod owner;
mod substrate;

use glam::Vec2;

pub use config::{ConfigError, CrowdConfig, DEFAULT_SCENE_SEED, MAX_AGENT_COUNT};
pub use grid::{FloorDimensions, Grid, PixelCoord};
pub use owner::{color_to_index, encode_channel, Owner, AMBIGUOUS_CHANNEL, INDEX_TOLERANCE};
pub use substrate::Substrate;

/// Number of agents simulated by the default configuration.
pub const NUM_PARTICLES: u32 = 64;
/// Width of the default floor grid in pixels.
pub const FLOOR_WIDTH: u32 = 700;
/// Height of the default floor grid in pixels.
pub const FLOOR_HEIGHT: u32 = 700;
/// Half-width, in pixels, of the square window each agent aggregates markers from.
pub const AGENT_VIS_RADIUS: f32 = 80.0;
/// Half-width of the ambiguity band around the Voronoi bisector, as a distance ratio.
pub const PIXEL_BUFFER_RAD: f32 = 0.05;
/// Distance, in normalized floor units, an agent travels per tick.
pub const STEP_SIZE: f32 = 0.01;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Enters or leaves the paused state.
    SetPaused {
        /// Whether subsequent ticks should be skipped.
        paused: bool,
    },
    /// Requests that the next executed tick re-seeds the scene before running.
    RequestReset,
    /// Keeps agents in place while the stage pipeline continues to run.
    HoldPositions {
        /// Whether positions should be frozen.
        hold: bool,
    },
    /// Advances the simulation by a single tick.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Announces that the paused state changed.
    PauseChanged {
        /// Pause state after processing the command.
        paused: bool,
    },
    /// Confirms that agents were restored to their initial scene placement.
    SimulationReset {
        /// Number of agents placed by the scene.
        agent_count: u32,
    },
    /// Reports that a tick was requested while paused and therefore skipped.
    TickSkipped {
        /// Tick counter value, unchanged by the skip.
        tick: u64,
    },
    /// Confirms that the stage pipeline produced a new frame.
    FrameAdvanced {
        /// Index of the frame that was just produced. Frame 0 is the scene placement.
        tick: u64,
        /// Number of agents whose movement vector vanished and therefore stayed put.
        stalled_agents: u32,
    },
}

/// States of the frame driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverPhase {
    /// The scene has not been seeded yet, or a reset is waiting to be applied.
    Reset,
    /// Ticks run the full stage pipeline.
    Running,
    /// Ticks are skipped and all state is left untouched.
    Paused,
}

/// Stable index identifying one agent for the lifetime of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentIndex(u32);

impl AgentIndex {
    /// Creates a new agent index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the agent inside per-agent arrays.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.0 as usize
    }
}

/// Read-only view of the frame handed to the renderer once per tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    /// Index of the frame the view describes. Frame 0 is the scene placement.
    pub tick: u64,
    /// Agent positions in normalized floor space.
    pub positions: &'a [Vec2],
    /// Unnormalized displacement between this frame and the previous one.
    pub velocities: &'a [Vec2],
}

/// Intermediate buffers produced by one pass of the stage pipeline.
///
/// None of these buffers carry state into the next tick; the world keeps the
/// most recent set around purely so adapters can inspect it.
#[derive(Clone, Debug, PartialEq)]
pub struct TickBuffers {
    /// Encoded owner per pixel, or [`AMBIGUOUS_CHANNEL`] for border pixels.
    pub owners: Grid<f32>,
    /// Marker weight per pixel.
    pub marker_weights: Grid<f32>,
    /// Total marker weight gathered by each agent.
    pub summed_weights: Vec<f32>,
    /// Normalized displacement contribution per pixel.
    pub directional_weights: Grid<Vec2>,
    /// Raw movement vector gathered by each agent, in pixel units.
    pub summed_directional_weights: Vec<Vec2>,
}

#[cfg(test)]
mod tests {
    use super::{AgentIndex, CrowdConfig, FLOOR_HEIGHT, FLOOR_WIDTH, NUM_PARTICLES};

    #[test]
    fn agent_index_exposes_slot() {
        let index = AgentIndex::new(17);
        assert_eq!(index.get(), 17);
        assert_eq!(index.slot(), 17);
    }

    #[test]
    fn default_configuration_uses_reference_constants() {
        let config = CrowdConfig::default();
        assert_eq!(config.agent_count, NUM_PARTICLES);
        assert_eq!(config.floor_width, FLOOR_WIDTH);
        assert_eq!(config.floor_height, FLOOR_HEIGHT);
        assert!(config.validate().is_ok());
    }
}
