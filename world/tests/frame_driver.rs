use biocrowds_core::{Command, ConfigError, CrowdConfig, DriverPhase, Event, Owner, PixelCoord};
use biocrowds_world::{apply, query, Scene, World};
use glam::Vec2;

fn two_agent_world() -> World {
    let config = CrowdConfig {
        agent_count: 2,
        ..CrowdConfig::default()
    };
    let positions = [Vec2::new(0.25, 0.5), Vec2::new(0.75, 0.5)];
    let targets = [positions[1], positions[0]];
    World::with_scene(config, Scene::from_placements(&positions, &targets)).expect("valid world")
}

fn small_config() -> CrowdConfig {
    CrowdConfig {
        agent_count: 12,
        floor_width: 96,
        floor_height: 80,
        agent_vis_radius: 24.0,
        ..CrowdConfig::default()
    }
}

fn tick(world: &mut World, count: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..count {
        apply(world, Command::Tick, &mut events);
    }
    events
}

#[test]
fn two_agents_step_towards_each_other() {
    let mut world = two_agent_world();
    let events = tick(&mut world, 1);
    assert_eq!(
        events.last(),
        Some(&Event::FrameAdvanced {
            tick: 1,
            stalled_agents: 0
        })
    );

    let fields = query::fields(&world).expect("tick ran");
    let left = fields.owners.value(PixelCoord::new(100, 350)).expect("pixel");
    let middle = fields.owners.value(PixelCoord::new(350, 350)).expect("pixel");
    assert_eq!(Owner::decode(left, 2).agent().map(|agent| agent.get()), Some(0));
    assert_eq!(Owner::decode(middle, 2), Owner::Unowned);
    assert!(fields.summed_directional_weights[0].x > 0.0);
    assert!(fields.summed_directional_weights[1].x < 0.0);

    let frame = query::frame(&world);
    let moved_right = frame.positions[0] - Vec2::new(0.25, 0.5);
    let moved_left = frame.positions[1] - Vec2::new(0.75, 0.5);
    assert!((moved_right.x - 0.01).abs() < 1e-4, "{moved_right:?}");
    assert!(moved_right.y.abs() < 1e-3, "{moved_right:?}");
    assert!((moved_left.x + 0.01).abs() < 1e-4, "{moved_left:?}");
    assert!(moved_left.y.abs() < 1e-3, "{moved_left:?}");
    assert_eq!(frame.velocities[0], moved_right);
    assert_eq!(frame.velocities[1], moved_left);
}

#[test]
fn paused_ticks_leave_state_untouched() {
    let mut world = World::new(small_config()).expect("valid config");
    let _ = tick(&mut world, 3);
    let positions = query::frame(&world).positions.to_vec();
    let tick_index = query::tick_index(&world);

    let mut events = Vec::new();
    apply(&mut world, Command::SetPaused { paused: true }, &mut events);
    for _ in 0..10 {
        apply(&mut world, Command::Tick, &mut events);
    }

    assert_eq!(query::frame(&world).positions, positions.as_slice());
    assert_eq!(query::tick_index(&world), tick_index);
    assert_eq!(events.len(), 11);
    assert!(events[1..]
        .iter()
        .all(|event| *event == Event::TickSkipped { tick: tick_index }));
}

#[test]
fn reset_restores_the_scene_placement() {
    let mut fresh = World::new(small_config()).expect("valid config");
    let _ = tick(&mut fresh, 1);
    let after_first_tick = query::frame(&fresh).positions.to_vec();

    let mut world = World::new(small_config()).expect("valid config");
    let _ = tick(&mut world, 7);
    assert_ne!(query::frame(&world).positions, after_first_tick.as_slice());

    let mut events = Vec::new();
    apply(&mut world, Command::RequestReset, &mut events);
    assert_eq!(query::phase(&world), DriverPhase::Reset);
    apply(&mut world, Command::Tick, &mut events);

    assert_eq!(events[0], Event::SimulationReset { agent_count: 12 });
    assert_eq!(query::tick_index(&world), 1);
    assert_eq!(query::frame(&world).positions, after_first_tick.as_slice());
}

#[test]
fn pause_takes_priority_over_a_pending_reset() {
    let mut world = World::new(small_config()).expect("valid config");
    let _ = tick(&mut world, 2);

    let mut events = Vec::new();
    apply(&mut world, Command::SetPaused { paused: true }, &mut events);
    apply(&mut world, Command::RequestReset, &mut events);
    apply(&mut world, Command::Tick, &mut events);
    assert_eq!(
        events,
        vec![
            Event::PauseChanged { paused: true },
            Event::TickSkipped { tick: 2 },
        ]
    );

    events.clear();
    apply(&mut world, Command::SetPaused { paused: false }, &mut events);
    assert_eq!(query::phase(&world), DriverPhase::Reset);
    apply(&mut world, Command::Tick, &mut events);
    assert_eq!(events[1], Event::SimulationReset { agent_count: 12 });
    assert_eq!(query::tick_index(&world), 1);
}

#[test]
fn held_positions_still_refresh_fields() {
    let mut world = World::new(small_config()).expect("valid config");
    let _ = tick(&mut world, 2);
    let positions = query::frame(&world).positions.to_vec();

    let mut events = Vec::new();
    apply(&mut world, Command::HoldPositions { hold: true }, &mut events);
    apply(&mut world, Command::Tick, &mut events);

    assert!(query::holding_positions(&world));
    let frame = query::frame(&world);
    assert_eq!(frame.positions, positions.as_slice());
    assert!(frame.velocities.iter().all(|velocity| *velocity == Vec2::ZERO));
    assert_eq!(frame.tick, 3);
    assert!(query::fields(&world).is_some());

    apply(&mut world, Command::HoldPositions { hold: false }, &mut events);
    apply(&mut world, Command::Tick, &mut events);
    assert_ne!(query::frame(&world).positions, positions.as_slice());
}

#[test]
fn previous_buffer_tracks_the_last_frame() {
    let mut world = World::new(small_config()).expect("valid config");
    let _ = tick(&mut world, 4);
    let before = query::frame(&world).positions.to_vec();
    let _ = tick(&mut world, 1);

    assert_eq!(query::previous_positions(&world), before.as_slice());
    let frame = query::frame(&world);
    for ((position, velocity), old) in frame.positions.iter().zip(frame.velocities).zip(&before) {
        assert_eq!(*velocity, *position - *old);
    }
}

#[test]
fn positions_never_leave_the_floor() {
    let mut world = World::new(small_config()).expect("valid config");
    for _ in 0..60 {
        let _ = tick(&mut world, 1);
        for position in query::frame(&world).positions {
            assert!(position.is_finite());
            assert!((0.0..=1.0).contains(&position.x));
            assert!((0.0..=1.0).contains(&position.y));
        }
    }
}

#[test]
fn coincident_agents_stall_without_corrupting_positions() {
    let config = CrowdConfig {
        agent_count: 2,
        floor_width: 50,
        floor_height: 50,
        ..CrowdConfig::default()
    };
    let spot = Vec2::new(0.5, 0.5);
    let scene = Scene::from_placements(&[spot, spot], &[Vec2::ZERO, Vec2::ONE]);
    let mut world = World::with_scene(config, scene).expect("valid world");

    let events = tick(&mut world, 3);
    assert_eq!(
        events.last(),
        Some(&Event::FrameAdvanced {
            tick: 3,
            stalled_agents: 2
        })
    );
    assert_eq!(query::frame(&world).positions, &[spot, spot]);
}

#[test]
fn single_agent_configuration_fails_before_any_tick() {
    let config = CrowdConfig {
        agent_count: 1,
        ..CrowdConfig::default()
    };
    assert_eq!(
        World::new(config).err(),
        Some(ConfigError::TooFewAgents { agent_count: 1 })
    );
}

#[test]
fn agents_view_exposes_scene_attributes() {
    let world = World::new(small_config()).expect("valid config");
    let agents = query::agents(&world);
    assert_eq!(agents.targets.len(), 12);
    assert_eq!(agents.channels[6], 0.5);
    assert!(agents.radii.iter().all(|radius| (0.3..0.7).contains(radius)));
    assert_eq!(query::config(&world).agent_count, 12);
}
