//! Explicit application state: everything a tick needs, owned in one place
//! and handed to the passes by reference.

use crate::core::events::{EventChannel, MapEvent};
use crate::core::glyphs::Glyph;
use crate::core::options::SightOptions;
use crate::core::point::Point;
use crate::core::thread_safety::{thread_safe, ThreadSafe};
use crate::core::time::GameClock;
use crate::core::workers::build_pool;
use crate::core::world::{Entity, World};
use crate::error::{FogboundError, Result};
use crate::gameplay::components::{
    Destination, MapSharing, Memory, MovementList, Positioned, Radio, TeamMember, Visible,
};
use crate::gameplay::sight::FieldOfView;
use crate::gameplay::snapshot::ViewSnapshot;
use crate::gameplay::team::{Team, TeamId};
use crate::map::graphs::{GridPathFinder, PathFinder};
use crate::map::view::MapView;
use crate::map::world_map::WorldMap;
use crate::systems::schedule::{run_tick, Schedule, TickReport};
use crate::systems::sharing::Teams;
use log::{debug, info};
use rayon::ThreadPool;
use std::sync::Arc;

/// Everything needed to spawn one agent. Unset parts leave the component off.
#[derive(Clone, Debug, Default)]
pub struct AgentSpec {
    pub position: Point,
    pub glyph: Option<Glyph>,
    /// Sight distance; `Some(0)` uses the configured default.
    pub sight: Option<u16>,
    pub team: Option<TeamId>,
    pub radio: bool,
    pub sharing_radius: Option<u16>,
    pub memory: bool,
    pub destination: Option<Point>,
}

impl AgentSpec {
    /// A team member that sees, remembers and reports over radio.
    pub fn scout(position: Point, team: TeamId) -> Self {
        AgentSpec {
            position,
            sight: Some(0),
            team: Some(team),
            radio: true,
            memory: true,
            ..AgentSpec::default()
        }
    }
}

pub struct Session {
    pub(crate) options: SightOptions,
    pub(crate) map: ThreadSafe<WorldMap>,
    pub(crate) world: World,
    pub(crate) teams: Teams,
    pub(crate) clock: GameClock,
    pub(crate) events: EventChannel,
    pub(crate) pool: ThreadPool,
    pub(crate) finder: Box<dyn PathFinder>,
    pub(crate) schedule: Schedule,
    pub(crate) viewer: Option<Entity>,
    pub(crate) snapshot: Option<ViewSnapshot>,
    next_team: u32,
    redraw: bool,
}

impl Session {
    pub fn new(options: SightOptions, map: WorldMap) -> Result<Self> {
        let pool = build_pool(options.worker_threads)?;
        info!(
            "Session on a {}x{} map with {} worker thread(s)",
            map.width(),
            map.height(),
            pool.current_num_threads()
        );

        Ok(Session {
            schedule: Schedule::new(&options),
            options,
            map: thread_safe(map),
            world: World::default(),
            teams: Teams::new(),
            clock: GameClock::default(),
            events: EventChannel::default(),
            pool,
            finder: Box::new(GridPathFinder),
            viewer: None,
            snapshot: None,
            next_team: 0,
            redraw: true,
        })
    }

    pub fn with_path_finder(mut self, finder: impl PathFinder + 'static) -> Self {
        self.finder = Box::new(finder);
        self
    }

    pub fn options(&self) -> &SightOptions {
        &self.options
    }

    pub fn map(&self) -> ThreadSafe<WorldMap> {
        self.map.clone()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn add_team(&mut self, name: &str) -> TeamId {
        let id = TeamId(self.next_team);
        self.next_team += 1;
        self.teams.insert(id, Arc::new(Team::new(id, name)));
        debug!("Added team {:?} ({})", id, name);
        id
    }

    pub fn team(&self, id: TeamId) -> Option<Arc<Team>> {
        self.teams.get(&id).cloned()
    }

    pub fn spawn_agent(&mut self, spec: AgentSpec) -> Result<Entity> {
        let (width, height) = self.map.read().dimensions();
        let entity = self.world.spawn()?;

        self.world.positions.insert(entity, Positioned(spec.position));
        if let Some(glyph) = spec.glyph {
            self.world.glyphs.insert(entity, Visible(glyph));
        }
        if let Some(distance) = spec.sight {
            let distance = if distance == 0 {
                self.options.default_sight
            } else {
                distance
            };
            self.world.sight.insert(entity, FieldOfView::new(distance));
        }
        if let Some(team) = spec.team {
            self.world.members.insert(entity, TeamMember(team));
        }
        if spec.radio {
            self.world.radios.insert(entity, Radio::default());
        }
        if let Some(radius) = spec.sharing_radius {
            self.world.sharing.insert(entity, MapSharing { radius });
        }
        if spec.memory {
            self.world.memories.insert(entity, Memory::new(width, height));
        }
        self.world.movements.insert(entity, MovementList::default());
        if let Some(target) = spec.destination {
            self.world.destinations.insert(entity, Destination(target));
        }

        Ok(entity)
    }

    pub fn despawn(&mut self, entity: Entity) -> Result<()> {
        if self.viewer == Some(entity) {
            self.viewer = None;
            self.snapshot = None;
        }

        if self.world.despawn(entity) {
            Ok(())
        } else {
            Err(FogboundError::NoSuchEntity(entity))
        }
    }

    pub fn memory_of(&self, entity: Entity) -> Option<&Memory> {
        self.world.memories.get(entity)
    }

    /// Makes `entity` the agent whose view is captured after every tick.
    pub fn set_viewer(&mut self, entity: Entity) -> Result<()> {
        if !self.world.is_alive(entity) {
            return Err(FogboundError::NoSuchEntity(entity));
        }
        self.viewer = Some(entity);
        Ok(())
    }

    pub fn snapshot(&self) -> Option<&ViewSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn set_cell(&mut self, p: Point, glyph: Glyph) -> bool {
        let changed = self.map.write().set_glyph(p, glyph);
        if changed {
            self.events.send(MapEvent::CellChanged(p));
        }
        changed
    }

    /// Swaps in a new level. Personal memories are cleared to the new size
    /// and every team forgets what it knew.
    pub fn replace_world(&mut self, map: WorldMap) {
        let (width, height) = map.dimensions();
        *self.map.write() = map;

        for entity in self.world.query(&[self.world.memories.mask()]) {
            if let Some(memory) = self.world.memories.get(entity) {
                memory.resize(width, height);
            }
        }

        self.events.send(MapEvent::MapReplaced { width, height });
        self.handle_events();
    }

    /// Applies queued map events. Returns how many were handled.
    pub fn handle_events(&mut self) -> usize {
        let events = self.events.drain();
        for event in &events {
            match event {
                MapEvent::MapReplaced { width, height } => {
                    info!("Map replaced by a {}x{} level", width, height);
                    for team in self.teams.values() {
                        team.invalidate();
                    }
                    self.redraw = true;
                }
                MapEvent::CellChanged(_) | MapEvent::GlyphMoved { .. } => self.redraw = true,
            }
        }
        events.len()
    }

    pub fn should_redraw(&self) -> bool {
        self.redraw
    }

    pub fn reset_should_redraw(&mut self) {
        self.redraw = false;
    }

    /// Forces the gated sharing passes to run on the next tick.
    pub fn force_sharing(&mut self) {
        self.schedule.sharing.arm();
    }

    pub fn tick(&mut self, dt: f32) -> TickReport {
        let report = run_tick(self, dt);
        self.handle_events();
        report
    }
}
