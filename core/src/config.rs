use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    FloorDimensions, Substrate, AGENT_VIS_RADIUS, FLOOR_HEIGHT, FLOOR_WIDTH, NUM_PARTICLES,
    PIXEL_BUFFER_RAD, STEP_SIZE,
};

/// Seed used by the scene when none is configured.
pub const DEFAULT_SCENE_SEED: u64 = 0x5eed_b10c_c0d5_0001;

/// Largest agent count whose owner channels still decode exactly.
///
/// Channels are stored as `f32`; above this count the rounding error of
/// `index / count` can exceed the resolver tolerance.
pub const MAX_AGENT_COUNT: u32 = 256;

/// Static configuration for a crowd simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrowdConfig {
    /// Number of agents, fixed for the lifetime of a run.
    pub agent_count: u32,
    /// Floor width in pixels.
    pub floor_width: u32,
    /// Floor height in pixels.
    pub floor_height: u32,
    /// Half-width in pixels of the per-agent aggregation window.
    pub agent_vis_radius: f32,
    /// Half-width of the ambiguous band around Voronoi borders, as a ratio.
    pub pixel_buffer_radius: f32,
    /// Normalized distance travelled by an agent per tick.
    pub step_size: f32,
    /// Seed for the scene's random initial placement.
    pub seed: u64,
    /// Execution strategy used to run each stage.
    pub substrate: Substrate,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            agent_count: NUM_PARTICLES,
            floor_width: FLOOR_WIDTH,
            floor_height: FLOOR_HEIGHT,
            agent_vis_radius: AGENT_VIS_RADIUS,
            pixel_buffer_radius: PIXEL_BUFFER_RAD,
            step_size: STEP_SIZE,
            seed: DEFAULT_SCENE_SEED,
            substrate: Substrate::default(),
        }
    }
}

impl CrowdConfig {
    /// Checks that the configuration describes a runnable simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count < 2 {
            return Err(ConfigError::TooFewAgents {
                agent_count: self.agent_count,
            });
        }
        if self.agent_count > MAX_AGENT_COUNT {
            return Err(ConfigError::TooManyAgents {
                agent_count: self.agent_count,
            });
        }
        if self.floor_width == 0 || self.floor_height == 0 {
            return Err(ConfigError::EmptyFloor {
                width: self.floor_width,
                height: self.floor_height,
            });
        }
        if !self.agent_vis_radius.is_finite() || self.agent_vis_radius <= 0.0 {
            return Err(ConfigError::InvalidVisRadius(self.agent_vis_radius));
        }
        if !(0.0..=0.5).contains(&self.pixel_buffer_radius) {
            return Err(ConfigError::InvalidBufferRadius(self.pixel_buffer_radius));
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(ConfigError::InvalidStepSize(self.step_size));
        }
        Ok(())
    }

    /// Dimensions of the floor grid described by the configuration.
    #[must_use]
    pub const fn floor(&self) -> FloorDimensions {
        FloorDimensions::new(self.floor_width, self.floor_height)
    }
}

/// Reasons a configuration is rejected before the first tick.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Tessellation needs a closest and a second-closest agent.
    #[error("at least two agents are required (received {agent_count})")]
    TooFewAgents {
        /// Agent count that failed validation.
        agent_count: u32,
    },
    /// Owner channels would no longer decode back to their agent.
    #[error("at most {max} agents are supported (received {agent_count})", max = MAX_AGENT_COUNT)]
    TooManyAgents {
        /// Agent count that failed validation.
        agent_count: u32,
    },
    /// The floor grid has no pixels.
    #[error("floor dimensions must be positive (received {width}x{height})")]
    EmptyFloor {
        /// Configured floor width.
        width: u32,
        /// Configured floor height.
        height: u32,
    },
    /// The aggregation window radius is unusable.
    #[error("agent_vis_radius must be finite and positive (received {0})")]
    InvalidVisRadius(f32),
    /// The ambiguity band ratio is outside the meaningful range.
    #[error("pixel_buffer_radius must lie within 0.0..=0.5 (received {0})")]
    InvalidBufferRadius(f32),
    /// The per-tick step is unusable.
    #[error("step_size must be finite and positive (received {0})")]
    InvalidStepSize(f32),
    /// A supplied scene does not describe exactly one entry per agent.
    #[error("scene provides {scene_agents} agents but the configuration expects {agent_count}")]
    SceneSizeMismatch {
        /// Agent count from the configuration.
        agent_count: u32,
        /// Number of agents described by the scene.
        scene_agents: usize,
    },
}
