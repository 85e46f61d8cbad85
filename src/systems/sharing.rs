//! Team map sharing: visibility reset, upload, download and peer hand-off.
//!
//! Every pass snapshots the maps it reads before writing anywhere, so a task
//! holds at most one map lock at a time.

use crate::core::workers::{await_all, TaskReport};
use crate::core::world::{Entity, World};
use crate::gameplay::components::Memory;
use crate::gameplay::team::{Team, TeamId};
use crate::map::known_map::KnownMap;
use crate::map::region::PackedRegion;
use crate::map::view::MapView;
use crate::map::world_map::WorldMap;
use log::debug;
use rayon::ThreadPool;
use std::collections::HashMap;
use std::sync::Arc;

pub type Teams = HashMap<TeamId, Arc<Team>>;

pub fn reset_team_visibility(teams: &Teams) {
    for team in teams.values() {
        team.reset_visibility();
    }
}

fn seen_or_nothing(world: &World, entity: Entity, width: u16, height: u16) -> PackedRegion {
    world
        .sight
        .get(entity)
        .map(|fov| fov.seen().clone())
        .filter(|seen| seen.dimensions() == (width, height))
        .unwrap_or_else(|| PackedRegion::empty(width, height))
}

/// Pushes each radio-enabled agent's memory into its team, marking
/// everything seen since the last report as visible to the team.
pub fn upload_to_teams(world: &World, map: &WorldMap, teams: &Teams, pool: &ThreadPool) -> TaskReport {
    let (width, height) = map.dimensions();

    let jobs = world
        .query(&[world.radios.mask(), world.memories.mask(), world.members.mask()])
        .into_iter()
        .filter_map(|entity| {
            if !world.radios.get(entity)?.enabled {
                return None;
            }
            let team = teams.get(&world.members.get(entity)?.0)?.clone();
            let memory = world.memories.get(entity)?.clone();
            let seen = seen_or_nothing(world, entity, width, height);
            Some((entity, (team, memory, seen)))
        })
        .collect();

    await_all(pool, "upload", jobs, |entity, (team, memory, seen)| {
        let visible = memory.unreported.read().union(&seen);
        let snapshot = memory.map.read().clone();
        if team.update(&snapshot, Some(&visible)) {
            *memory.unreported.write() = PackedRegion::empty(width, height);
        } else {
            debug!("team {:?} refused a stale report from {:?}", team.id(), entity);
        }
        Ok(())
    })
}

struct Download {
    memory: Memory,
    team_map: Arc<KnownMap>,
    region: PackedRegion,
    recontact: bool,
}

/// Pulls team knowledge down into each radio-enabled agent, for every cell it
/// has not reported and cannot see itself. An agent whose radio just came back
/// first has its memory forced to the team's inside the team's horizon.
pub fn download_from_teams(world: &mut World, map: &WorldMap, teams: &Teams, pool: &ThreadPool) -> TaskReport {
    let (width, height) = map.dimensions();
    let team_maps: HashMap<TeamId, Arc<KnownMap>> = teams
        .iter()
        .map(|(id, team)| (*id, Arc::new(team.map_snapshot(width, height))))
        .collect();

    let mut jobs = Vec::new();
    for entity in world.query(&[world.radios.mask(), world.memories.mask(), world.members.mask()]) {
        let team_map = match world.members.get(entity).and_then(|m| team_maps.get(&m.0)) {
            Some(team_map) => team_map.clone(),
            None => continue,
        };

        let recontact = match world.radios.get_mut(entity) {
            Some(radio) if radio.enabled => {
                let regained = !radio.in_contact;
                radio.in_contact = true;
                regained
            }
            _ => continue,
        };

        let memory = match world.memories.get(entity) {
            Some(memory) => memory.clone(),
            None => continue,
        };

        let unseen = seen_or_nothing(world, entity, width, height).negate();
        let region = memory.unreported.read().union(&unseen);

        if recontact {
            debug!("{:?} is back in radio contact", entity);
        }

        jobs.push((
            entity,
            Download {
                memory,
                team_map,
                region,
                recontact,
            },
        ));
    }

    await_all(pool, "download", jobs, |_, job| {
        let mut known = job.memory.map.write();
        if job.recontact {
            known.restrict_from_team(&job.team_map, job.team_map.known_region());
        }
        known.ingest_from_known_map(&job.team_map, Some(&job.region), false);
        Ok(())
    })
}

/// Hands each sharing agent's memory to teammates standing within its radius.
pub fn share_with_peers(world: &World, map: &WorldMap, pool: &ThreadPool) -> TaskReport {
    let mut jobs = Vec::new();

    for entity in world.query(&[
        world.sharing.mask(),
        world.positions.mask(),
        world.memories.mask(),
        world.members.mask(),
    ]) {
        let (radius, position, team, source) = match (
            world.sharing.get(entity),
            world.positions.get(entity),
            world.members.get(entity),
            world.memories.get(entity),
        ) {
            (Some(s), Some(p), Some(m), Some(mem)) if s.radius > 0 => (s.radius, p.get(), m.0, mem),
            _ => continue,
        };

        let peers: Vec<Memory> = map
            .occupants_near(position, radius)
            .into_iter()
            .filter(|other| *other != entity)
            .filter(|other| world.members.get(*other).map_or(false, |m| m.0 == team))
            .filter_map(|other| world.memories.get(other).cloned())
            .collect();

        if !peers.is_empty() {
            jobs.push((entity, (source.clone(), peers)));
        }
    }

    await_all(pool, "peers", jobs, |_, (source, peers)| {
        let snapshot = source.map.read().clone();
        for peer in peers {
            peer.map.write().ingest_from_known_map(&snapshot, None, false);
        }
        Ok(())
    })
}
