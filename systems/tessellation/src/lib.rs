#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Voronoi tessellation stage that assigns every floor pixel to an agent.
//!
//! Every agent is modelled as a cone of height 2 and radius 1 standing on the
//! floor; the depth of a cone at a pixel ranks the agents, which is the same
//! ordering as plain distance but resolves ties the way a depth test does: the
//! first agent reaching a depth keeps it. Pixels whose closest and
//! second-closest agents are nearly equidistant form a buffer band between
//! cells and are written as [`AMBIGUOUS_CHANNEL`].

use biocrowds_core::{
    geometry, AgentIndex, CrowdConfig, FloorDimensions, Grid, PixelCoord, Substrate,
    AMBIGUOUS_CHANNEL,
};
use glam::Vec2;

/// Height-to-radius ratio of every agent cone.
pub const CONE_SLOPE: f32 = 2.0;

/// Stage that produces the per-pixel owner channel.
#[derive(Clone, Copy, Debug)]
pub struct Tessellation {
    floor: FloorDimensions,
    buffer_radius: f32,
}

impl Tessellation {
    /// Creates the stage for the provided configuration.
    #[must_use]
    pub fn new(config: &CrowdConfig) -> Self {
        Self {
            floor: config.floor(),
            buffer_radius: config.pixel_buffer_radius,
        }
    }

    /// Computes the owner channel of every pixel.
    ///
    /// `positions` are normalized agent positions and `channels` the encoded
    /// identifier of each agent, both indexed by agent.
    pub fn run(&self, substrate: Substrate, positions: &[Vec2], channels: &[f32]) -> Grid<f32> {
        let apexes: Vec<Vec2> = positions
            .iter()
            .map(|position| self.floor.to_pixel_space(*position))
            .collect();
        substrate.map_grid(self.floor, |pixel| {
            self.owner_channel(pixel, &apexes, channels)
        })
    }

    /// Computes the owner channel of a single pixel given cone apexes in pixel space.
    #[must_use]
    pub fn owner_channel(&self, pixel: PixelCoord, apexes: &[Vec2], channels: &[f32]) -> f32 {
        let point = pixel.to_vec2();
        let Some(pair) = nearest_pair(point, apexes) else {
            return AMBIGUOUS_CHANNEL;
        };

        let closest = apexes[pair.closest.slot()];
        let second = apexes[pair.second.slot()];
        if is_ambiguous(point, closest, second, self.buffer_radius) {
            return AMBIGUOUS_CHANNEL;
        }

        channels
            .get(pair.closest.slot())
            .copied()
            .unwrap_or(AMBIGUOUS_CHANNEL)
    }
}

/// Closest and second-closest agents to a pixel, ranked by cone depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NearestPair {
    /// Agent whose cone is lowest at the pixel.
    pub closest: AgentIndex,
    /// Agent whose cone is second lowest at the pixel.
    pub second: AgentIndex,
}

/// Height of the cone standing at `apex`, measured at `point`.
#[must_use]
pub fn cone_depth(point: Vec2, apex: Vec2) -> f32 {
    geometry::distance(point, apex) * CONE_SLOPE
}

/// Finds the two agents with the lowest cone depth at `point`.
///
/// Agents are visited in index order and only a strictly lower depth displaces
/// a candidate, so among equidistant agents the lowest index wins. Returns
/// `None` when fewer than two agents produce a comparable depth.
#[must_use]
pub fn nearest_pair(point: Vec2, apexes: &[Vec2]) -> Option<NearestPair> {
    let mut closest_depth = f32::MAX;
    let mut closest = None;
    let mut second_depth = f32::MAX;
    let mut second = None;

    for (index, apex) in apexes.iter().enumerate() {
        let depth = cone_depth(point, *apex);
        if depth < closest_depth {
            second_depth = closest_depth;
            second = closest;
            closest_depth = depth;
            closest = Some(index);
        } else if depth < second_depth {
            second_depth = depth;
            second = Some(index);
        }
    }

    Some(NearestPair {
        closest: AgentIndex::new(u32::try_from(closest?).ok()?),
        second: AgentIndex::new(u32::try_from(second?).ok()?),
    })
}

/// Reports whether `point` lies in the buffer band between two agents.
///
/// Uses squared Euclidean distance rather than cone depth: the pixel is
/// ambiguous when `d1² / (d1² + d2²)` is within `buffer_radius` of one half.
/// Two agents sharing the pixel's exact position make it ambiguous as well.
#[must_use]
pub fn is_ambiguous(point: Vec2, closest: Vec2, second: Vec2, buffer_radius: f32) -> bool {
    let closest_dist2 = (point - closest).length_squared();
    let second_dist2 = (point - second).length_squared();
    let total = closest_dist2 + second_dist2;
    if total == 0.0 {
        return true;
    }
    (closest_dist2 / total - 0.5).abs() < buffer_radius
}
