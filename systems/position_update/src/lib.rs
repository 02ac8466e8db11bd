#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Position update stage advancing every agent by a fixed step.
//!
//! Only the direction of the aggregated movement vector matters. Agents whose
//! movement vector has no usable direction stay where they are for the tick.

use biocrowds_core::{geometry, CrowdConfig, Substrate};
use glam::Vec2;

/// Stage that writes the next position buffer.
#[derive(Clone, Copy, Debug)]
pub struct PositionUpdate {
    agent_count: u32,
    step_size: f32,
}

/// Output of one position update.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionUpdateOutcome {
    /// Positions for the next tick, indexed by agent.
    pub positions: Vec<Vec2>,
    /// Number of agents that could not move this tick.
    pub stalled_agents: u32,
}

impl PositionUpdate {
    /// Creates the stage for the provided configuration.
    #[must_use]
    pub fn new(config: &CrowdConfig) -> Self {
        Self {
            agent_count: config.agent_count,
            step_size: config.step_size,
        }
    }

    /// Advances every agent along its movement vector.
    pub fn run(
        &self,
        substrate: Substrate,
        positions: &[Vec2],
        movements: &[Vec2],
    ) -> PositionUpdateOutcome {
        let steps = substrate.map_agents(self.agent_count, |agent| {
            let position = positions.get(agent.slot()).copied().unwrap_or_default();
            let movement = movements.get(agent.slot()).copied().unwrap_or_default();
            advance(position, movement, self.step_size)
        });

        let stalled_agents = steps.iter().filter(|step| step.is_stalled()).count() as u32;
        PositionUpdateOutcome {
            positions: steps.into_iter().map(Step::position).collect(),
            stalled_agents,
        }
    }
}

/// Result of moving a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// The agent moved to the contained position.
    Moved(Vec2),
    /// The movement vector had no direction; the agent stays at the contained position.
    Stalled(Vec2),
}

impl Step {
    /// Position of the agent after the step.
    #[must_use]
    pub const fn position(self) -> Vec2 {
        match self {
            Self::Moved(position) | Self::Stalled(position) => position,
        }
    }

    /// Reports whether the agent stayed in place.
    #[must_use]
    pub const fn is_stalled(&self) -> bool {
        matches!(self, Self::Stalled(_))
    }
}

/// Moves `position` by `step_size` along the direction of `movement`.
///
/// The result is clamped to the unit square per axis. A zero-length or
/// non-finite movement vector leaves the agent in place.
#[must_use]
pub fn advance(position: Vec2, movement: Vec2, step_size: f32) -> Step {
    let speed = movement.length();
    if speed == 0.0 || !speed.is_finite() {
        return Step::Stalled(position);
    }
    let next = geometry::clamp_unit(position + movement / speed * step_size);
    if next.is_finite() {
        Step::Moved(next)
    } else {
        Step::Stalled(position)
    }
}
