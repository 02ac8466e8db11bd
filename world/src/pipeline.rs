use std::time::Instant;

use biocrowds_core::{CrowdConfig, Substrate, TickBuffers};
use biocrowds_system_aggregation::Aggregation;
use biocrowds_system_directional_weights::DirectionalWeights;
use biocrowds_system_marker_weights::MarkerWeights;
use biocrowds_system_position_update::PositionUpdate;
use biocrowds_system_tessellation::Tessellation;
use glam::Vec2;
use tracing::debug;

/// Fixed sequence of stages executed once per tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Pipeline {
    substrate: Substrate,
    tessellation: Tessellation,
    marker_weights: MarkerWeights,
    aggregation: Aggregation,
    directional_weights: DirectionalWeights,
    position_update: PositionUpdate,
}

/// Everything one pass of the pipeline produced.
#[derive(Debug)]
pub(crate) struct PipelineOutput {
    pub(crate) buffers: TickBuffers,
    /// `None` when positions are held and the update stage was skipped.
    pub(crate) next_positions: Option<Vec<Vec2>>,
    pub(crate) stalled_agents: u32,
}

impl Pipeline {
    pub(crate) fn new(config: &CrowdConfig) -> Self {
        Self {
            substrate: config.substrate,
            tessellation: Tessellation::new(config),
            marker_weights: MarkerWeights::new(config),
            aggregation: Aggregation::new(config),
            directional_weights: DirectionalWeights::new(config),
            position_update: PositionUpdate::new(config),
        }
    }

    /// Runs every stage against `positions`, which no stage writes to.
    pub(crate) fn run(
        &self,
        tick: u64,
        positions: &[Vec2],
        targets: &[Vec2],
        channels: &[f32],
        hold_positions: bool,
    ) -> PipelineOutput {
        let substrate = self.substrate;

        let started = Instant::now();
        let owners = self.tessellation.run(substrate, positions, channels);
        let tessellation_time = started.elapsed();

        let started = Instant::now();
        let marker_weights = self
            .marker_weights
            .run(substrate, positions, targets, &owners);
        let marker_time = started.elapsed();

        let started = Instant::now();
        let summed_weights =
            self.aggregation
                .sum_weights(substrate, positions, &owners, &marker_weights);
        let aggregation_time = started.elapsed();

        let started = Instant::now();
        let directional_weights = self.directional_weights.run(
            substrate,
            positions,
            &owners,
            &marker_weights,
            &summed_weights,
        );
        let directional_time = started.elapsed();

        let started = Instant::now();
        let summed_directional_weights = self.aggregation.sum_directional_weights(
            substrate,
            positions,
            &owners,
            &directional_weights,
        );
        let directional_aggregation_time = started.elapsed();

        let started = Instant::now();
        let (next_positions, stalled_agents) = if hold_positions {
            (None, 0)
        } else {
            let outcome =
                self.position_update
                    .run(substrate, positions, &summed_directional_weights);
            (Some(outcome.positions), outcome.stalled_agents)
        };
        let update_time = started.elapsed();

        debug!(
            tick,
            ?substrate,
            ?tessellation_time,
            ?marker_time,
            ?aggregation_time,
            ?directional_time,
            ?directional_aggregation_time,
            ?update_time,
            "stage pipeline finished"
        );

        PipelineOutput {
            buffers: TickBuffers {
                owners,
                marker_weights,
                summed_weights,
                directional_weights,
                summed_directional_weights,
            },
            next_positions,
            stalled_agents,
        }
    }
}
