use biocrowds_core::{CrowdConfig, Substrate};
use biocrowds_system_position_update::{PositionUpdate, Step};
use glam::Vec2;

fn config(agent_count: u32) -> CrowdConfig {
    CrowdConfig {
        agent_count,
        ..CrowdConfig::default()
    }
}

#[test]
fn positions_stay_inside_the_unit_square() {
    let mut positions = Vec::new();
    let mut movements = Vec::new();
    for i in 0..16 {
        for j in 0..16 {
            positions.push(Vec2::new(i as f32 / 15.0, j as f32 / 15.0));
            let angle = (i * 16 + j) as f32 * 0.37;
            movements.push(Vec2::new(angle.cos(), angle.sin()) * (1.0 + j as f32));
        }
    }
    let stage = PositionUpdate::new(&config(256));

    let mut current = positions;
    for _ in 0..50 {
        let outcome = stage.run(Substrate::Parallel, &current, &movements);
        assert_eq!(outcome.stalled_agents, 0);
        for position in &outcome.positions {
            assert!(
                (0.0..=1.0).contains(&position.x) && (0.0..=1.0).contains(&position.y),
                "{position:?} left the floor"
            );
        }
        current = outcome.positions;
    }
}

#[test]
fn stalled_agents_are_counted_and_kept_in_place() {
    let positions = [Vec2::new(0.2, 0.2), Vec2::new(0.4, 0.4), Vec2::new(0.6, 0.6)];
    let movements = [Vec2::new(0.0, 3.0), Vec2::ZERO, Vec2::new(f32::INFINITY, 0.0)];
    let outcome = PositionUpdate::new(&config(3)).run(Substrate::Sequential, &positions, &movements);

    assert_eq!(outcome.stalled_agents, 2);
    assert!((outcome.positions[0].y - 0.21).abs() < 1e-6);
    assert_eq!(outcome.positions[1], positions[1]);
    assert_eq!(outcome.positions[2], positions[2]);
}

#[test]
fn step_size_comes_from_configuration() {
    let config = CrowdConfig {
        agent_count: 2,
        step_size: 0.05,
        ..CrowdConfig::default()
    };
    let outcome = PositionUpdate::new(&config).run(
        Substrate::Sequential,
        &[Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.5)],
        &[Vec2::new(-4.0, 0.0), Vec2::new(3.0, 4.0)],
    );

    assert!((outcome.positions[0] - Vec2::new(0.45, 0.5)).length() < 1e-6);
    assert!((outcome.positions[1] - Vec2::new(0.53, 0.54)).length() < 1e-6);
    assert!(matches!(
        biocrowds_system_position_update::advance(Vec2::ZERO, Vec2::X, 0.05),
        Step::Moved(_)
    ));
}
