use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use biocrowds_core::{Command, CrowdConfig, Event, Substrate};
use biocrowds_world::{self as world, query, World};

#[test]
fn deterministic_replay_matches_between_runs() {
    let first = replay(Substrate::Parallel, scripted_commands());
    let second = replay(Substrate::Parallel, scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn substrates_replay_identically() {
    let sequential = replay(Substrate::Sequential, scripted_commands());
    let parallel = replay(Substrate::Parallel, scripted_commands());

    assert_eq!(
        sequential.fingerprint(),
        parallel.fingerprint(),
        "substrates diverged"
    );
    assert_eq!(sequential, parallel);
}

fn replay(substrate: Substrate, commands: Vec<Command>) -> ReplayOutcome {
    let config = CrowdConfig {
        agent_count: 16,
        floor_width: 120,
        floor_height: 100,
        agent_vis_radius: 30.0,
        substrate,
        ..CrowdConfig::default()
    };
    let mut world = World::new(config).expect("valid config");
    let mut events = Vec::new();

    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let frame = query::frame(&world);
    ReplayOutcome {
        tick: frame.tick,
        positions: frame
            .positions
            .iter()
            .map(|position| (position.x.to_bits(), position.y.to_bits()))
            .collect(),
        velocities: frame
            .velocities
            .iter()
            .map(|velocity| (velocity.x.to_bits(), velocity.y.to_bits()))
            .collect(),
        events,
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    commands.extend(std::iter::repeat(Command::Tick).take(5));
    commands.push(Command::SetPaused { paused: true });
    commands.extend(std::iter::repeat(Command::Tick).take(3));
    commands.push(Command::RequestReset);
    commands.push(Command::SetPaused { paused: false });
    commands.extend(std::iter::repeat(Command::Tick).take(4));
    commands.push(Command::HoldPositions { hold: true });
    commands.extend(std::iter::repeat(Command::Tick).take(2));
    commands.push(Command::HoldPositions { hold: false });
    commands.extend(std::iter::repeat(Command::Tick).take(6));
    commands
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    tick: u64,
    positions: Vec<(u32, u32)>,
    velocities: Vec<(u32, u32)>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
