#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative frame driver for the BioCrowds simulation.
//!
//! The world owns the only state that survives a tick: the agent position
//! buffer. Everything else is rebuilt by the stage pipeline from that buffer,
//! the scene's static targets and the configuration.

mod pipeline;
mod scene;

use biocrowds_core::{Command, ConfigError, CrowdConfig, DriverPhase, Event, TickBuffers};
use glam::Vec2;
use tracing::{info, warn};

use crate::pipeline::Pipeline;

pub use scene::Scene;

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    config: CrowdConfig,
    scene: Scene,
    pipeline: Pipeline,
    current: Vec<Vec2>,
    previous: Vec<Vec2>,
    velocities: Vec<Vec2>,
    buffers: Option<TickBuffers>,
    tick_index: u64,
    paused: bool,
    reset_pending: bool,
    hold_positions: bool,
}

impl World {
    /// Creates a world whose scene is generated from the configuration's seed.
    pub fn new(config: CrowdConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scene = Scene::generate(&config);
        Self::with_scene(config, scene)
    }

    /// Creates a world around an explicit scene.
    ///
    /// The scene must describe exactly `config.agent_count` agents. Agents are
    /// placed immediately, but the first tick still performs the reset.
    pub fn with_scene(config: CrowdConfig, scene: Scene) -> Result<Self, ConfigError> {
        config.validate()?;
        if scene.agent_count() != config.agent_count as usize {
            return Err(ConfigError::SceneSizeMismatch {
                agent_count: config.agent_count,
                scene_agents: scene.agent_count(),
            });
        }

        info!(
            agent_count = config.agent_count,
            floor_width = config.floor_width,
            floor_height = config.floor_height,
            substrate = ?config.substrate,
            seed = config.seed,
            "crowd world created"
        );

        let current = scene.positions().to_vec();
        Ok(Self {
            pipeline: Pipeline::new(&config),
            previous: current.clone(),
            velocities: vec![Vec2::ZERO; current.len()],
            current,
            buffers: None,
            tick_index: 0,
            paused: false,
            reset_pending: true,
            hold_positions: false,
            scene,
            config,
        })
    }

    fn phase(&self) -> DriverPhase {
        if self.paused {
            DriverPhase::Paused
        } else if self.reset_pending {
            DriverPhase::Reset
        } else {
            DriverPhase::Running
        }
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.reset_pending = false;
        self.current.clear();
        self.current.extend_from_slice(self.scene.positions());
        self.previous.clone_from(&self.current);
        self.velocities.iter_mut().for_each(|velocity| *velocity = Vec2::ZERO);
        self.buffers = None;
        self.tick_index = 0;

        info!(agent_count = self.config.agent_count, "simulation reset");
        out_events.push(Event::SimulationReset {
            agent_count: self.config.agent_count,
        });
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        if self.paused {
            out_events.push(Event::TickSkipped {
                tick: self.tick_index,
            });
            return;
        }
        if self.reset_pending {
            self.reset(out_events);
        }

        let output = self.pipeline.run(
            self.tick_index,
            &self.current,
            self.scene.targets(),
            self.scene.channels(),
            self.hold_positions,
        );

        match output.next_positions {
            Some(next) => {
                let displacements = next.iter().zip(&self.current);
                for (velocity, (new, old)) in self.velocities.iter_mut().zip(displacements) {
                    *velocity = *new - *old;
                }
                // The retired buffer becomes `previous`; nothing is copied.
                self.previous = std::mem::replace(&mut self.current, next);
            }
            None => {
                self.velocities.iter_mut().for_each(|velocity| *velocity = Vec2::ZERO);
                self.previous.clone_from(&self.current);
            }
        }
        self.buffers = Some(output.buffers);
        self.tick_index = self.tick_index.saturating_add(1);

        if output.stalled_agents > 0 {
            warn!(
                tick = self.tick_index,
                stalled_agents = output.stalled_agents,
                "agents had no movement direction and stayed in place"
            );
        }
        out_events.push(Event::FrameAdvanced {
            tick: self.tick_index,
            stalled_agents: output.stalled_agents,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        Command::RequestReset => {
            world.reset_pending = true;
        }
        Command::HoldPositions { hold } => {
            world.hold_positions = hold;
        }
        Command::Tick => world.tick(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use biocrowds_core::{CrowdConfig, DriverPhase, FrameView, TickBuffers};
    use glam::Vec2;

    use super::World;

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &CrowdConfig {
        &world.config
    }

    /// Number of frames produced since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Current state of the frame driver.
    #[must_use]
    pub fn phase(world: &World) -> DriverPhase {
        world.phase()
    }

    /// Reports whether ticks keep agents in place.
    #[must_use]
    pub fn holding_positions(world: &World) -> bool {
        world.hold_positions
    }

    /// Latest positions and velocities, as handed to the renderer.
    #[must_use]
    pub fn frame(world: &World) -> FrameView<'_> {
        FrameView {
            tick: world.tick_index,
            positions: &world.current,
            velocities: &world.velocities,
        }
    }

    /// Positions the latest frame started from.
    #[must_use]
    pub fn previous_positions(world: &World) -> &[Vec2] {
        &world.previous
    }

    /// Static per-agent attributes supplied by the scene.
    #[must_use]
    pub fn agents(world: &World) -> AgentsView<'_> {
        AgentsView {
            targets: world.scene.targets(),
            channels: world.scene.channels(),
            radii: world.scene.radii(),
        }
    }

    /// Intermediate buffers of the latest tick, if a tick ran since the last reset.
    #[must_use]
    pub fn fields(world: &World) -> Option<&TickBuffers> {
        world.buffers.as_ref()
    }

    /// Read-only view of the attributes every agent keeps for a whole run.
    #[derive(Clone, Copy, Debug)]
    pub struct AgentsView<'a> {
        /// Normalized target of each agent.
        pub targets: &'a [Vec2],
        /// Encoded identifier of each agent.
        pub channels: &'a [f32],
        /// Renderer draw radius of each agent.
        pub radii: &'a [f32],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CrowdConfig {
        CrowdConfig {
            agent_count: 6,
            floor_width: 64,
            floor_height: 64,
            agent_vis_radius: 16.0,
            ..CrowdConfig::default()
        }
    }

    #[test]
    fn new_world_waits_for_its_first_reset() {
        let world = World::new(small_config()).expect("valid config");
        assert_eq!(query::phase(&world), DriverPhase::Reset);
        assert_eq!(query::tick_index(&world), 0);
        assert!(query::fields(&world).is_none());
        assert_eq!(query::frame(&world).positions.len(), 6);
    }

    #[test]
    fn first_tick_resets_then_runs_the_pipeline() {
        let mut world = World::new(small_config()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::SimulationReset { agent_count: 6 });
        assert!(matches!(events[1], Event::FrameAdvanced { tick: 1, .. }));
        assert_eq!(query::phase(&world), DriverPhase::Running);
        assert!(query::fields(&world).is_some());
    }

    #[test]
    fn repeated_pause_commands_report_once() {
        let mut world = World::new(small_config()).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        assert_eq!(events, vec![Event::PauseChanged { paused: true }]);
        assert_eq!(query::phase(&world), DriverPhase::Paused);
    }

    #[test]
    fn mismatched_scene_is_rejected() {
        let scene = Scene::from_placements(&[Vec2::ZERO, Vec2::ONE], &[Vec2::ONE, Vec2::ZERO]);
        let error = World::with_scene(small_config(), scene).expect_err("six agents expected");
        assert_eq!(
            error,
            ConfigError::SceneSizeMismatch {
                agent_count: 6,
                scene_agents: 2
            }
        );
    }
}
