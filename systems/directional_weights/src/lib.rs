#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Directional weighting stage.
//!
//! Each owned pixel contributes its offset from the owning agent, scaled by
//! the pixel's share of the agent's total marker weight. Summing those
//! contributions per agent yields the weighted centroid offset of the agent's
//! markers, which is the raw movement vector.

use biocrowds_core::{CrowdConfig, FloorDimensions, Grid, Owner, PixelCoord, Substrate};
use glam::Vec2;

/// Stage that produces the per-pixel displacement contribution.
#[derive(Clone, Copy, Debug)]
pub struct DirectionalWeights {
    floor: FloorDimensions,
    agent_count: u32,
}

impl DirectionalWeights {
    /// Creates the stage for the provided configuration.
    #[must_use]
    pub fn new(config: &CrowdConfig) -> Self {
        Self {
            floor: config.floor(),
            agent_count: config.agent_count,
        }
    }

    /// Computes the displacement contribution of every pixel.
    pub fn run(
        &self,
        substrate: Substrate,
        positions: &[Vec2],
        owners: &Grid<f32>,
        marker_weights: &Grid<f32>,
        summed_weights: &[f32],
    ) -> Grid<Vec2> {
        substrate.map_grid(self.floor, |pixel| {
            self.pixel_contribution(pixel, positions, owners, marker_weights, summed_weights)
        })
    }

    /// Computes the displacement contribution of a single pixel.
    #[must_use]
    pub fn pixel_contribution(
        &self,
        pixel: PixelCoord,
        positions: &[Vec2],
        owners: &Grid<f32>,
        marker_weights: &Grid<f32>,
        summed_weights: &[f32],
    ) -> Vec2 {
        let Some(Owner::Agent(agent)) = owners
            .value(pixel)
            .map(|channel| Owner::decode(channel, self.agent_count))
        else {
            return Vec2::ZERO;
        };
        let (Some(position), Some(summed), Some(weight)) = (
            positions.get(agent.slot()),
            summed_weights.get(agent.slot()),
            marker_weights.value(pixel),
        ) else {
            return Vec2::ZERO;
        };

        directional_weight(
            self.floor.to_pixel_space(*position),
            pixel.to_vec2(),
            weight,
            *summed,
        )
    }
}

/// Offset of `marker` from `agent`, scaled by `weight / summed_weight`.
///
/// Returns [`Vec2::ZERO`] whenever the normalized weight is not finite, which
/// covers agents that gathered no weight at all.
#[must_use]
pub fn directional_weight(agent: Vec2, marker: Vec2, weight: f32, summed_weight: f32) -> Vec2 {
    if summed_weight == 0.0 {
        return Vec2::ZERO;
    }
    let share = weight / summed_weight;
    if !share.is_finite() {
        return Vec2::ZERO;
    }
    let contribution = (marker - agent) * share;
    if contribution.is_finite() {
        contribution
    } else {
        Vec2::ZERO
    }
}
