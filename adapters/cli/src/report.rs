use biocrowds_core::{DriverPhase, Event};
use biocrowds_world::{query, World};
use glam::Vec2;
use serde::Serialize;

/// Counters accumulated from the events of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct RunStats {
    pub(crate) frames_advanced: u64,
    pub(crate) ticks_skipped: u64,
    pub(crate) resets: u64,
    pub(crate) stalled_agent_ticks: u64,
}

impl RunStats {
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::FrameAdvanced { stalled_agents, .. } => {
                    self.frames_advanced += 1;
                    self.stalled_agent_ticks += u64::from(*stalled_agents);
                }
                Event::TickSkipped { .. } => self.ticks_skipped += 1,
                Event::SimulationReset { .. } => self.resets += 1,
                Event::PauseChanged { .. } => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct AgentReport {
    index: usize,
    position: Vec2,
    velocity: Vec2,
    target: Vec2,
    distance_to_target: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct RunReport {
    tick: u64,
    phase: &'static str,
    agent_count: u32,
    stats: RunStats,
    mean_distance_to_target: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    agents: Vec<AgentReport>,
}

impl RunReport {
    /// Captures the world's final frame; per-agent rows are kept only when requested.
    pub(crate) fn capture(world: &World, stats: RunStats, include_agents: bool) -> Self {
        let frame = query::frame(world);
        let targets = query::agents(world).targets;
        let agents: Vec<AgentReport> = frame
            .positions
            .iter()
            .zip(frame.velocities)
            .zip(targets)
            .enumerate()
            .map(|(index, ((position, velocity), target))| AgentReport {
                index,
                position: *position,
                velocity: *velocity,
                target: *target,
                distance_to_target: position.distance(*target),
            })
            .collect();

        let mean_distance_to_target = if agents.is_empty() {
            0.0
        } else {
            agents
                .iter()
                .map(|agent| agent.distance_to_target)
                .sum::<f32>()
                / agents.len() as f32
        };

        Self {
            tick: frame.tick,
            phase: phase_name(query::phase(world)),
            agent_count: query::config(world).agent_count,
            stats,
            mean_distance_to_target,
            agents: if include_agents { agents } else { Vec::new() },
        }
    }

    pub(crate) fn print_summary(&self) {
        println!("tick                 {}", self.tick);
        println!("phase                {}", self.phase);
        println!("agents               {}", self.agent_count);
        println!("frames advanced      {}", self.stats.frames_advanced);
        println!("ticks skipped        {}", self.stats.ticks_skipped);
        println!("resets               {}", self.stats.resets);
        println!("stalled agent ticks  {}", self.stats.stalled_agent_ticks);
        println!("mean target distance {:.4}", self.mean_distance_to_target);
    }
}

fn phase_name(phase: DriverPhase) -> &'static str {
    match phase {
        DriverPhase::Reset => "reset",
        DriverPhase::Running => "running",
        DriverPhase::Paused => "paused",
    }
}
