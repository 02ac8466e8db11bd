#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Marker weight stage scoring each pixel as a movement cue for its owner.
//!
//! A marker is worth more when it is close to its agent and lies in the
//! direction of the agent's target. Pixels in the ambiguous band carry no
//! weight at all.

use biocrowds_core::{geometry, CrowdConfig, FloorDimensions, Grid, Owner, PixelCoord, Substrate};
use glam::Vec2;

/// Stage that produces the per-pixel marker weight.
#[derive(Clone, Copy, Debug)]
pub struct MarkerWeights {
    floor: FloorDimensions,
    agent_count: u32,
}

impl MarkerWeights {
    /// Creates the stage for the provided configuration.
    #[must_use]
    pub fn new(config: &CrowdConfig) -> Self {
        Self {
            floor: config.floor(),
            agent_count: config.agent_count,
        }
    }

    /// Computes the marker weight of every pixel.
    ///
    /// `positions` and `targets` are normalized and indexed by agent; `owners`
    /// is the tessellation output for the same positions.
    pub fn run(
        &self,
        substrate: Substrate,
        positions: &[Vec2],
        targets: &[Vec2],
        owners: &Grid<f32>,
    ) -> Grid<f32> {
        substrate.map_grid(self.floor, |pixel| {
            self.pixel_weight(pixel, positions, targets, owners)
        })
    }

    /// Computes the marker weight of a single pixel.
    #[must_use]
    pub fn pixel_weight(
        &self,
        pixel: PixelCoord,
        positions: &[Vec2],
        targets: &[Vec2],
        owners: &Grid<f32>,
    ) -> f32 {
        let Some(channel) = owners.value(pixel) else {
            return 0.0;
        };
        let Owner::Agent(agent) = Owner::decode(channel, self.agent_count) else {
            return 0.0;
        };
        let (Some(position), Some(target)) =
            (positions.get(agent.slot()), targets.get(agent.slot()))
        else {
            return 0.0;
        };

        marker_weight(
            self.floor.to_pixel_space(*position),
            pixel.to_vec2(),
            self.floor.to_pixel_space(*target),
        )
    }
}

/// Scores `marker` for an agent standing at `agent` and heading to `target`.
///
/// The score is `(1 + cos θ) / (1 + |agent - marker|)`, where θ is the angle
/// between `agent - marker` and `agent - target`. When the marker sits on the
/// agent, or the agent already stands on its target, the angle is undefined
/// and `cos θ` is taken as zero. Non-finite scores are reported as zero.
#[must_use]
pub fn marker_weight(agent: Vec2, marker: Vec2, target: Vec2) -> f32 {
    let agent_to_marker = agent - marker;
    let agent_to_target = agent - target;
    let marker_distance = agent_to_marker.length();
    let target_distance = agent_to_target.length();
    let cos_theta = geometry::cos_theta(
        agent_to_marker,
        agent_to_target,
        marker_distance,
        target_distance,
    )
    .unwrap_or(0.0);

    let weight = (1.0 + cos_theta) / (1.0 + marker_distance);
    if weight.is_finite() {
        weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_markers_outweigh_opposed_markers() {
        let agent = Vec2::new(50.0, 50.0);
        let target = Vec2::new(150.0, 50.0);
        let toward = marker_weight(agent, Vec2::new(60.0, 50.0), target);
        let away = marker_weight(agent, Vec2::new(40.0, 50.0), target);
        assert!(toward > away);
        assert!(away.abs() < 1e-6);
    }

    #[test]
    fn aligned_weight_matches_closed_form() {
        let agent = Vec2::new(0.0, 0.0);
        let target = Vec2::new(0.0, 30.0);
        let weight = marker_weight(agent, Vec2::new(0.0, 4.0), target);
        assert!((weight - 2.0 / 5.0).abs() < 1e-6);
    }

    #[test]
    fn marker_on_agent_uses_zero_cosine() {
        let agent = Vec2::new(12.0, 7.0);
        let weight = marker_weight(agent, agent, Vec2::new(80.0, 7.0));
        assert_eq!(weight, 1.0);
    }

    #[test]
    fn agent_on_target_uses_zero_cosine() {
        let agent = Vec2::new(12.0, 7.0);
        let weight = marker_weight(agent, Vec2::new(15.0, 11.0), agent);
        assert!((weight - 1.0 / 6.0).abs() < 1e-6);
    }
}
