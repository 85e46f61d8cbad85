use crate::core::options::SightOptions;
use crate::core::time::{IntervalGate, TickStats};
use crate::core::workers::TaskReport;
use crate::session::Session;
use crate::systems::fov::recompute_fields_of_view;
use crate::systems::location_sync::{record_sightings, sync_locations};
use crate::systems::movement::execute_movement_lists;
use crate::systems::pathing::plan_paths;
use crate::systems::sharing::{download_from_teams, reset_team_visibility, share_with_peers, upload_to_teams};
use crate::systems::snapshot::capture_view;
use log::debug;

/// Interval gates for the passes that do not run every tick.
#[derive(Debug)]
pub struct Schedule {
    pub pathing: IntervalGate,
    pub sharing: IntervalGate,
    stats: TickStats,
}

impl Schedule {
    pub fn new(options: &SightOptions) -> Self {
        Schedule {
            pathing: IntervalGate::new(options.pathing_interval),
            sharing: IntervalGate::new(options.sharing_interval),
            stats: TickStats::default(),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub now: f64,
    pub moved: usize,
    pub pathing_fired: bool,
    pub planned: usize,
    pub fov_recomputed: usize,
    pub relocated: usize,
    pub sightings: TaskReport,
    pub sharing_fired: bool,
    pub upload: TaskReport,
    pub download: TaskReport,
    pub peers: TaskReport,
    pub snapshot_taken: bool,
}

impl TickReport {
    pub fn failed_tasks(&self) -> usize {
        self.sightings.failed + self.upload.failed + self.download.failed + self.peers.failed
    }
}

/// Runs one tick: movement, pathing (gated), field of view, location sync,
/// then upload, download and peer sharing (gated together), then the view
/// snapshot. Each pass waits for all of its tasks before the next starts.
pub fn run_tick(session: &mut Session, dt: f32) -> TickReport {
    session.schedule.stats.tick_start();
    let now = session.clock.advance(dt);
    let mut report = TickReport {
        now,
        ..TickReport::default()
    };
    let events = session.events.sender();

    {
        let map = session.map.read();
        report.moved = execute_movement_lists(&mut session.world, &map, &events);

        if session.schedule.pathing.advance(dt) {
            report.pathing_fired = true;
            report.planned = plan_paths(&mut session.world, &map, session.finder.as_ref());
        }

        report.fov_recomputed =
            recompute_fields_of_view(&mut session.world, &map, &session.options, &session.pool);
    }

    report.relocated = sync_locations(&mut session.world, &mut session.map.write());

    let map = session.map.read();
    report.sightings = record_sightings(&session.world, &map, now, &session.pool);

    if session.schedule.sharing.advance(dt) {
        report.sharing_fired = true;
        reset_team_visibility(&session.teams);
        report.upload = upload_to_teams(&session.world, &map, &session.teams, &session.pool);
        report.download = download_from_teams(&mut session.world, &map, &session.teams, &session.pool);
        report.peers = share_with_peers(&session.world, &map, &session.pool);
        debug!(
            "[sharing] t={:.2} upload {:?} download {:?} peers {:?}",
            now, report.upload, report.download, report.peers
        );
    }

    if let Some(viewer) = session.viewer {
        session.snapshot = capture_view(&session.world, &map, viewer, now);
        report.snapshot_taken = session.snapshot.is_some();
    }
    drop(map);

    session.schedule.stats.tick_end(dt);
    report
}
