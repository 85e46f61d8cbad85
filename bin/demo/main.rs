use fogbound::core::colors::Color;
use fogbound::gameplay::Destination;
use fogbound::map::stencil::{line, rect};
use fogbound::{AgentSpec, Entity, Glyph, MapView, Point, Session, SightOptions, TeamId, WorldMap};
use log::{error, info};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "fogbound-demo", about = "Runs two teams of scouts through a small dungeon.")]
struct Opt {
    /// RON file with sight options; written with defaults when missing.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(short, long, default_value = "40")]
    ticks: u32,

    /// Simulated seconds per tick.
    #[structopt(long, default_value = "0.25")]
    dt: f32,

    #[structopt(long, default_value = "3")]
    scouts: u16,

    /// Seed for the wandering scouts.
    #[structopt(long)]
    seed: Option<u64>,
}

fn dungeon(options: &SightOptions) -> WorldMap {
    let floor = Glyph::plain(options.floor_symbol);
    let wall = Glyph::new(options.wall_symbol, Color::WHITE, Color::DARK_GRAY);
    let mut map = WorldMap::new(48, 20, options.wall_symbol);

    let rooms = [
        rect((1, 1), 12, 8),
        rect((18, 2), 10, 7),
        rect((33, 1), 14, 9),
        rect((8, 11), 16, 8),
        rect((30, 12), 12, 7),
    ];
    for room in &rooms {
        map.carve_room(room, floor, wall);
    }

    let corridors = [
        line((12, 4), (19, 4)),
        line((27, 5), (34, 5)),
        line((10, 8), (10, 12)),
        line((23, 14), (31, 14)),
        line((38, 9), (38, 13)),
    ];
    for corridor in &corridors {
        map.paint_stencil(corridor, floor);
    }

    map
}

fn wander(session: &mut Session, agents: &[Entity]) {
    let open = session.map().read().open_region().unpack();
    if open.is_empty() {
        return;
    }

    let world = session.world_mut();
    for entity in agents {
        let idle = world.movements.get(*entity).map_or(false, |m| m.is_empty());
        if idle {
            let target = open[fastrand::usize(..open.len())];
            world.destinations.insert(*entity, Destination(target));
        }
    }
}

fn spawn_team(
    session: &mut Session,
    team: TeamId,
    at: Point,
    count: u16,
    symbol: char,
) -> fogbound::Result<Vec<Entity>> {
    let mut agents = Vec::new();
    for i in 0..count {
        let mut spec = AgentSpec::scout(at + Point::new(i as i16, 0), team);
        spec.glyph = Some(Glyph::new(symbol, Color::GREEN, Color::BLACK));
        if i == 0 {
            spec.sharing_radius = Some(3);
        }
        agents.push(session.spawn_agent(spec)?);
    }
    Ok(agents)
}

fn run(opt: Opt) -> fogbound::Result<()> {
    let options = match &opt.config {
        Some(path) => SightOptions::load_or_create(path)?,
        None => SightOptions::default(),
    };
    if let Some(seed) = opt.seed {
        fastrand::seed(seed);
    }

    let map = dungeon(&options);
    let (width, height) = map.dimensions();
    let cells = width as usize * height as usize;
    let mut session = Session::new(options, map)?;

    let red = session.add_team("red");
    let blue = session.add_team("blue");
    let mut agents = spawn_team(&mut session, red, Point::new(3, 3), opt.scouts, 'r')?;
    agents.extend(spawn_team(&mut session, blue, Point::new(36, 3), opt.scouts, 'b')?);
    session.set_viewer(agents[0])?;

    for _ in 0..opt.ticks {
        wander(&mut session, &agents);
        let report = session.tick(opt.dt);

        if report.sharing_fired {
            for id in [red, blue] {
                if let Some(team) = session.team(id) {
                    let known = team.map_snapshot(width, height).known_region().count();
                    info!(
                        "t={:>5.2} team {} knows {}/{} cells, sees {}",
                        report.now,
                        team.name(),
                        known,
                        cells,
                        team.visible(width, height).count()
                    );
                }
            }
        }

        if report.failed_tasks() > 0 {
            error!("{} agent task(s) failed at t={:.2}", report.failed_tasks(), report.now);
        }
    }

    if let Some(snapshot) = session.snapshot() {
        for row in snapshot.rows() {
            println!("{}", row);
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Opt::from_args()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
