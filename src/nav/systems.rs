use bevy::prelude::*;

use super::types::{NavPath, PathRequest};
use super::NavMesh;

pub(super) fn process_path_requests(
    mut path_requests: MessageReader<PathRequest>,
    mut commands: Commands,
    nav_mesh: Res<NavMesh>,
) {
    if path_requests.is_empty() {
        return;
    }

    let start_time = std::time::Instant::now();
    let request_count = path_requests.len();

    if nav_mesh.is_empty() {
        warn!("[PATHFINDING] {} path requests dropped, navmesh is empty", request_count);
        path_requests.clear();
        return;
    }

    let mut failed = 0;
    for request in path_requests.read() {
        let waypoints = nav_mesh.find_path(request.from, request.to);

        if waypoints.is_empty() {
            failed += 1;
            debug!(
                "[PATHFINDING] No path for {:?} from {:?} to {:?}",
                request.entity, request.from, request.to
            );
            if let Ok(mut entity) = commands.get_entity(request.entity) {
                entity.try_remove::<NavPath>();
            }
        } else if let Ok(mut entity) = commands.get_entity(request.entity) {
            entity.try_insert(NavPath::new(waypoints));
        }
    }

    if failed > 0 {
        warn!("[PATHFINDING] {}/{} path requests found no route", failed, request_count);
    }

    let total_duration = start_time.elapsed();
    if total_duration.as_millis() > 100 {
        warn!("[PATHFINDING] Slow batch processing: {:?} for {} requests", total_duration, request_count);
    }
}
