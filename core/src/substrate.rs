use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{AgentIndex, FloorDimensions, Grid, PixelCoord};

/// Execution strategy used to evaluate a stage once per output element.
///
/// Each call returns only after every element has been written, which gives
/// the stage pipeline its barrier: a stage never observes a partially written
/// buffer. Kernels receive their element index explicitly and must not depend
/// on evaluation order, so both variants produce identical buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Substrate {
    /// Evaluates elements one after another on the calling thread.
    Sequential,
    /// Evaluates elements on the rayon thread pool.
    #[default]
    Parallel,
}

impl Substrate {
    /// Runs `kernel` once per floor pixel and collects the results into a grid.
    pub fn map_grid<T, F>(self, dimensions: FloorDimensions, kernel: F) -> Grid<T>
    where
        T: Send,
        F: Fn(PixelCoord) -> T + Sync + Send,
    {
        let count = dimensions.cell_count();
        let cells = match self {
            Self::Sequential => (0..count)
                .map(|index| kernel(dimensions.coord(index)))
                .collect(),
            Self::Parallel => (0..count)
                .into_par_iter()
                .map(|index| kernel(dimensions.coord(index)))
                .collect(),
        };
        Grid::from_raw(dimensions, cells)
    }

    /// Runs `kernel` once per agent and collects the results in index order.
    pub fn map_agents<T, F>(self, agent_count: u32, kernel: F) -> Vec<T>
    where
        T: Send,
        F: Fn(AgentIndex) -> T + Sync + Send,
    {
        match self {
            Self::Sequential => (0..agent_count)
                .map(|index| kernel(AgentIndex::new(index)))
                .collect(),
            Self::Parallel => (0..agent_count)
                .into_par_iter()
                .map(|index| kernel(AgentIndex::new(index)))
                .collect(),
        }
    }
}
