use biocrowds_core::{Command, CrowdConfig, PixelCoord};
use biocrowds_rendering::{render_field, Color, DebugView, RenderFrame};
use biocrowds_world::{apply, query, Scene, World};
use glam::Vec2;

fn ticked_world() -> World {
    let config = CrowdConfig {
        agent_count: 2,
        floor_width: 100,
        floor_height: 60,
        agent_vis_radius: 40.0,
        ..CrowdConfig::default()
    };
    let positions = [Vec2::new(0.25, 0.5), Vec2::new(0.75, 0.5)];
    let targets = [positions[1], positions[0]];
    let mut world = World::with_scene(config, Scene::from_placements(&positions, &targets))
        .expect("valid world");
    let mut events = Vec::new();
    apply(&mut world, Command::Tick, &mut events);
    world
}

#[test]
fn every_view_covers_the_floor() {
    let world = ticked_world();
    let buffers = query::fields(&world).expect("tick ran");
    let started_from = query::previous_positions(&world);

    for view in DebugView::ALL {
        let image = render_field(view, buffers, started_from);
        assert_eq!(image.floor(), query::config(&world).floor());
        assert_eq!(image.pixels().len(), 100 * 60);
        let ppm = image.to_ppm();
        assert!(ppm.starts_with(b"P6\n100 60\n255\n"));
        assert_eq!(ppm.len(), b"P6\n100 60\n255\n".len() + 100 * 60 * 3);
    }
}

#[test]
fn agent_id_view_marks_the_ambiguous_band() {
    let world = ticked_world();
    let buffers = query::fields(&world).expect("tick ran");
    let image = render_field(
        DebugView::AgentIds,
        buffers,
        query::previous_positions(&world),
    );

    assert_eq!(image.pixel(PixelCoord::new(50, 30)), Some(Color::rgb(1.0, 0.0, 0.0)));
    assert_eq!(image.pixel(PixelCoord::new(10, 30)), Some(Color::rgb(0.0, 0.0, 0.0)));
    assert_eq!(image.pixel(PixelCoord::new(90, 30)), Some(Color::rgb(0.5, 0.0, 0.0)));
}

#[test]
fn position_view_draws_agents_where_the_tick_started() {
    let world = ticked_world();
    let buffers = query::fields(&world).expect("tick ran");
    let image = render_field(
        DebugView::AgentPositions,
        buffers,
        query::previous_positions(&world),
    );

    assert_eq!(image.pixel(PixelCoord::new(25, 30)), Some(Color::rgb(0.25, 0.0, 0.5)));
    assert_eq!(image.pixel(PixelCoord::new(50, 5)), Some(Color::BLACK));

    let movement = render_field(
        DebugView::MovementVectors,
        buffers,
        query::previous_positions(&world),
    );
    assert_eq!(movement.pixel(PixelCoord::new(50, 5)), Some(Color::WHITE));
    let under_left_agent = movement.pixel(PixelCoord::new(25, 30)).expect("pixel");
    assert!(under_left_agent.red > 0.0);
}

#[test]
fn render_frame_follows_world_frames() {
    let world = ticked_world();
    let agents = query::agents(&world);
    let mut frame = RenderFrame::default();
    frame.update_from(query::frame(&world), agents.radii, agents.channels);

    assert_eq!(frame.tick, 1);
    assert_eq!(frame.agents.len(), 2);
    assert!(frame.agents[0].velocity.x > 0.0);
    assert!(frame.agents[1].velocity.x < 0.0);
}
