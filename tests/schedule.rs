use fogbound::{AgentSpec, Glyph, MapView, Point, Session, SightOptions, TeamId, WorldMap};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn corridor_session() -> Session {
    init();
    let options = SightOptions {
        worker_threads: 1,
        ..SightOptions::default()
    };
    Session::new(options, WorldMap::filled(10, 3, Glyph::plain('.'), '#')).unwrap()
}

fn walker(team: TeamId) -> AgentSpec {
    let mut spec = AgentSpec::scout(Point::new(0, 1), team);
    spec.glyph = Some(Glyph::plain('@'));
    spec.destination = Some(Point::new(5, 1));
    spec
}

#[test]
fn gated_passes_fire_on_their_own_intervals() {
    let mut session = corridor_session();
    let team = session.add_team("red");
    session.spawn_agent(walker(team)).unwrap();

    let fired: Vec<(bool, bool)> = (0..8)
        .map(|_| {
            let report = session.tick(0.25);
            (report.pathing_fired, report.sharing_fired)
        })
        .collect();

    let pathing: Vec<bool> = fired.iter().map(|f| f.0).collect();
    let sharing: Vec<bool> = fired.iter().map(|f| f.1).collect();
    assert_eq!(pathing, vec![false, false, true, false, false, true, false, false]);
    assert_eq!(sharing, vec![false, false, false, false, true, false, false, false]);
    assert!((session.now() - 2.0).abs() < 1e-9);
}

#[test]
fn agents_walk_one_step_per_tick_after_planning() {
    let mut session = corridor_session();
    let team = session.add_team("red");
    let agent = session.spawn_agent(walker(team)).unwrap();

    let reports: Vec<_> = (0..5).map(|_| session.tick(0.25)).collect();
    assert_eq!(reports[2].planned, 1);
    assert_eq!(reports[2].moved, 0);
    assert_eq!(reports[3].moved, 1);
    assert_eq!(reports[4].moved, 1);
    assert_eq!(reports[4].fov_recomputed, 1);
    assert_eq!(reports[4].sightings.completed, 1);

    assert_eq!(session.world().positions.get(agent).unwrap().get(), Point::new(2, 1));
    assert_eq!(session.map().read().location_of(agent), Some(Point::new(2, 1)));
}

#[test]
fn moving_glyphs_and_edits_ask_for_a_redraw() {
    let mut session = corridor_session();
    let team = session.add_team("red");
    session.spawn_agent(walker(team)).unwrap();
    assert!(session.should_redraw());

    for _ in 0..3 {
        session.reset_should_redraw();
        session.tick(0.25);
        assert!(!session.should_redraw());
    }

    session.tick(0.25);
    assert!(session.should_redraw());

    session.reset_should_redraw();
    assert!(!session.set_cell(Point::new(9, 0), Glyph::plain('.')));
    assert!(!session.should_redraw());
    session.handle_events();
    assert!(!session.should_redraw());

    assert!(session.set_cell(Point::new(9, 0), Glyph::plain('#')));
    session.handle_events();
    assert!(session.should_redraw());
}

#[test]
fn viewers_get_a_snapshot_every_tick() {
    let mut session = corridor_session();
    let team = session.add_team("red");
    let agent = session.spawn_agent(walker(team)).unwrap();
    assert!(session.snapshot().is_none());

    session.set_viewer(agent).unwrap();
    let report = session.tick(0.25);
    assert!(report.snapshot_taken);

    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.viewer, agent);
    assert_eq!(snapshot.dimensions(), (10, 3));
    let here = snapshot.cell(Point::new(0, 1)).unwrap();
    assert!(here.visible);
    assert_eq!(here.symbol(), '@');
    assert_eq!(snapshot.rows()[1], "@........ ");
}

#[test]
fn edited_cells_reach_memory_on_the_next_tick() {
    let mut session = corridor_session();
    let team = session.add_team("red");
    let agent = session.spawn_agent(AgentSpec::scout(Point::new(0, 1), team)).unwrap();

    session.tick(0.25);
    let wall = Point::new(3, 1);
    assert_eq!(session.memory_of(agent).unwrap().map.read().get_map_at(wall), Some('.'));

    assert!(session.set_cell(wall, Glyph::plain('#')));
    session.tick(0.25);
    assert_eq!(session.memory_of(agent).unwrap().map.read().get_map_at(wall), Some('#'));
}

#[test]
fn despawned_agents_leave_the_map() {
    let mut session = corridor_session();
    let team = session.add_team("red");
    let agent = session.spawn_agent(AgentSpec::scout(Point::new(0, 1), team)).unwrap();
    session.set_viewer(agent).unwrap();
    session.tick(0.25);
    assert_eq!(session.map().read().location_of(agent), Some(Point::new(0, 1)));

    session.despawn(agent).unwrap();
    assert!(session.despawn(agent).is_err());
    let report = session.tick(0.25);
    assert_eq!(report.relocated, 1);
    assert!(!report.snapshot_taken);
    assert_eq!(session.map().read().location_of(agent), None);
}

#[test]
fn forced_sharing_fires_whatever_the_interval() {
    init();
    for interval in [1.0, 2.0, 4.0, 60.0] {
        let options = SightOptions {
            worker_threads: 1,
            sharing_interval: interval,
            ..SightOptions::default()
        };
        let mut session = Session::new(options, WorldMap::filled(10, 3, Glyph::plain('.'), '#')).unwrap();
        let team = session.add_team("red");
        session.spawn_agent(AgentSpec::scout(Point::new(0, 1), team)).unwrap();

        session.force_sharing();
        let report = session.tick(0.0);
        assert!(report.sharing_fired, "interval {}", interval);
        assert_eq!(report.upload.completed, 1);
        assert!(!session.tick(0.0).sharing_fired);
    }
}
