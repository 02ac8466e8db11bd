#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-agent aggregation of pixel buffers.
//!
//! Each agent only inspects a square window centred on its own pixel
//! position. Pixels outside that window are skipped even when the
//! tessellation assigned them to the agent; the window is a bound on the work
//! per agent and is allowed to under-count very large cells.

use std::ops::{AddAssign, Range};

use biocrowds_core::{
    geometry, AgentIndex, CrowdConfig, FloorDimensions, Grid, Owner, PixelCoord, Substrate,
};
use glam::Vec2;

/// Square region of the floor visited while aggregating one agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    columns: Range<u32>,
    rows: Range<u32>,
}

impl SearchWindow {
    /// Builds the window of half-width `radius` around `center`, given in pixel space.
    ///
    /// Each axis is clamped to the floor and covers the pixels `p` with
    /// `center - radius <= p < center + radius`.
    #[must_use]
    pub fn around(center: Vec2, radius: f32, floor: FloorDimensions) -> Self {
        Self {
            columns: axis_range(center.x, radius, floor.width()),
            rows: axis_range(center.y, radius, floor.height()),
        }
    }

    /// Columns visited by the window.
    #[must_use]
    pub fn columns(&self) -> Range<u32> {
        self.columns.clone()
    }

    /// Rows visited by the window.
    #[must_use]
    pub fn rows(&self) -> Range<u32> {
        self.rows.clone()
    }

    /// Reports whether the pixel lies inside the window.
    #[must_use]
    pub fn contains(&self, pixel: PixelCoord) -> bool {
        self.columns.contains(&pixel.x()) && self.rows.contains(&pixel.y())
    }

    /// Number of pixels inside the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    /// Reports whether the window covers no pixels at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the window's pixels row by row.
    pub fn pixels(&self) -> impl Iterator<Item = PixelCoord> + '_ {
        self.rows()
            .flat_map(move |y| self.columns().map(move |x| PixelCoord::new(x, y)))
    }
}

fn axis_range(center: f32, radius: f32, extent: u32) -> Range<u32> {
    let limit = extent as f32;
    let start = geometry::clamp_number(center - radius, 0.0, limit).ceil() as u32;
    let end = geometry::clamp_number(center + radius, 0.0, limit).ceil() as u32;
    start..end.max(start)
}

/// Stage that folds pixel buffers back onto the agents that own them.
#[derive(Clone, Copy, Debug)]
pub struct Aggregation {
    floor: FloorDimensions,
    agent_count: u32,
    radius: f32,
}

impl Aggregation {
    /// Creates the stage for the provided configuration.
    #[must_use]
    pub fn new(config: &CrowdConfig) -> Self {
        Self {
            floor: config.floor(),
            agent_count: config.agent_count,
            radius: config.agent_vis_radius,
        }
    }

    /// Window visited for an agent at the normalized `position`.
    #[must_use]
    pub fn window(&self, position: Vec2) -> SearchWindow {
        SearchWindow::around(self.floor.to_pixel_space(position), self.radius, self.floor)
    }

    /// Sums each agent's marker weights.
    pub fn sum_weights(
        &self,
        substrate: Substrate,
        positions: &[Vec2],
        owners: &Grid<f32>,
        weights: &Grid<f32>,
    ) -> Vec<f32> {
        self.run(substrate, positions, owners, weights)
    }

    /// Sums each agent's directional weights into its raw movement vector.
    pub fn sum_directional_weights(
        &self,
        substrate: Substrate,
        positions: &[Vec2],
        owners: &Grid<f32>,
        directional_weights: &Grid<Vec2>,
    ) -> Vec<Vec2> {
        self.run(substrate, positions, owners, directional_weights)
    }

    fn run<T>(
        &self,
        substrate: Substrate,
        positions: &[Vec2],
        owners: &Grid<f32>,
        values: &Grid<T>,
    ) -> Vec<T>
    where
        T: Copy + Default + AddAssign + Send + Sync,
    {
        substrate.map_agents(self.agent_count, |agent| {
            positions
                .get(agent.slot())
                .map(|position| self.agent_sum(agent, &self.window(*position), owners, values))
                .unwrap_or_default()
        })
    }

    /// Sums `values` over the pixels of `window` owned by `agent`.
    #[must_use]
    pub fn agent_sum<T>(
        &self,
        agent: AgentIndex,
        window: &SearchWindow,
        owners: &Grid<f32>,
        values: &Grid<T>,
    ) -> T
    where
        T: Copy + Default + AddAssign,
    {
        let mut sum = T::default();
        for pixel in window.pixels() {
            let Some(channel) = owners.value(pixel) else {
                continue;
            };
            if Owner::decode(channel, self.agent_count) != Owner::Agent(agent) {
                continue;
            }
            if let Some(value) = values.value(pixel) {
                sum += value;
            }
        }
        sum
    }
}
