use biocrowds_core::{encode_channel, geometry, AgentIndex, CrowdConfig};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Smallest draw radius handed to the renderer.
const MIN_DRAW_RADIUS: f32 = 0.3;
/// Exclusive upper bound of the renderer draw radius.
const MAX_DRAW_RADIUS: f32 = 0.7;
/// Draw radius used for scenes assembled by hand.
const DEFAULT_DRAW_RADIUS: f32 = 0.5;

/// Initial placement of every agent, read once per reset.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    positions: Vec<Vec2>,
    targets: Vec<Vec2>,
    channels: Vec<f32>,
    radii: Vec<f32>,
}

impl Scene {
    /// Generates the default scene from the configuration's seed.
    ///
    /// Agents are scattered uniformly over the floor. Even agents head for the
    /// column at three quarters of the floor width, odd agents for the column
    /// at one quarter, each at the height `index / count`.
    #[must_use]
    pub fn generate(config: &CrowdConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let count = config.agent_count;

        let positions = (0..count)
            .map(|_| Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()))
            .collect();
        let targets = (0..count)
            .map(|index| {
                let column = if index % 2 == 0 { 0.75 } else { 0.25 };
                Vec2::new(column, index as f32 / count as f32)
            })
            .collect();
        let radii = (0..count)
            .map(|_| rng.gen_range(MIN_DRAW_RADIUS..MAX_DRAW_RADIUS))
            .collect();

        Self {
            positions,
            targets,
            channels: channels_for(count),
            radii,
        }
    }

    /// Assembles a scene from explicit normalized positions and targets.
    ///
    /// Both lists are truncated to the shorter of the two and clamped to the
    /// unit square.
    #[must_use]
    pub fn from_placements(positions: &[Vec2], targets: &[Vec2]) -> Self {
        let count = positions.len().min(targets.len());
        let positions: Vec<Vec2> = positions[..count]
            .iter()
            .map(|position| geometry::clamp_unit(*position))
            .collect();
        let targets = targets[..count]
            .iter()
            .map(|target| geometry::clamp_unit(*target))
            .collect();
        let agent_count = u32::try_from(count).unwrap_or(u32::MAX);

        Self {
            positions,
            targets,
            channels: channels_for(agent_count),
            radii: vec![DEFAULT_DRAW_RADIUS; count],
        }
    }

    /// Number of agents described by the scene.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    /// Initial normalized positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Static normalized targets.
    #[must_use]
    pub fn targets(&self) -> &[Vec2] {
        &self.targets
    }

    /// Encoded identifier of every agent.
    #[must_use]
    pub fn channels(&self) -> &[f32] {
        &self.channels
    }

    /// Renderer draw radius of every agent.
    #[must_use]
    pub fn radii(&self) -> &[f32] {
        &self.radii
    }
}

fn channels_for(count: u32) -> Vec<f32> {
    (0..count)
        .map(|index| encode_channel(AgentIndex::new(index), count))
        .collect()
}
