use bevy::prelude::*;

use kestrel::nav::{
    load_nav_mesh, save_nav_mesh, CostTable, NavMesh, NavMeshConfig, NavMeshData, NavPath,
    NavigationPlugin, PathRequest, NAV_MESH_CONFIG_PATH,
};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tiles per side of the demo level.
const LEVEL_TILES: usize = 16;

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "kestrel";
const KEEP_LOGS: usize = 25;

/// Log to stdout and to a timestamped file under `logs/`.
///
/// Returns the path of the new log file.
fn setup_file_logging() -> io::Result<PathBuf> {
    let log_dir = Path::new(LOG_DIR);
    fs::create_dir_all(log_dir)?;
    prune_logs(log_dir, KEEP_LOGS)?;

    let log_name = format!("{}_{}.log", LOG_PREFIX, chrono::Local::now().format("%Y%m%d_%H%M%S"));

    // One file per run, never rotated mid-run
    let file_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::NEVER, log_dir, &log_name))
        .with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(io::stdout).with_target(false);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kestrel=info")))
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_dir.join(log_name))
}

/// Delete the oldest `kestrel*.log` files so that at most `keep` remain.
fn prune_logs(log_dir: &Path, keep: usize) -> io::Result<()> {
    let mut logs: Vec<(PathBuf, Option<std::time::SystemTime>)> = fs::read_dir(log_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(".log"))
        })
        .map(|path| {
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
            (path, modified)
        })
        .collect();

    if logs.len() <= keep {
        return Ok(());
    }

    logs.sort_by_key(|(_, modified)| *modified);
    let excess = logs.len() - keep;
    for (path, _) in logs.into_iter().take(excess) {
        // A log still held open elsewhere is not worth failing startup over
        let _ = fs::remove_file(path);
    }
    Ok(())
}

/// Square tile floor centred at the origin with a wall across the middle
/// that leaves gaps at both ends.
fn build_level() -> Vec<[Vec3; 3]> {
    let half = LEVEL_TILES as f32 / 2.0;
    let wall_row = LEVEL_TILES / 2 - 1;

    let mut triangles = Vec::new();
    for tx in 0..LEVEL_TILES {
        for tz in 0..LEVEL_TILES {
            if tz == wall_row && (2..LEVEL_TILES - 2).contains(&tx) {
                continue;
            }
            let (x0, z0) = (tx as f32 - half, tz as f32 - half);
            let (x1, z1) = (x0 + 1.0, z0 + 1.0);
            triangles.push([Vec3::new(x0, 0.0, z0), Vec3::new(x0, 0.0, z1), Vec3::new(x1, 0.0, z1)]);
            triangles.push([Vec3::new(x0, 0.0, z0), Vec3::new(x1, 0.0, z1), Vec3::new(x1, 0.0, z0)]);
        }
    }
    triangles
}

fn main() {
    match setup_file_logging() {
        Ok(log_file) => println!("kestrel navigation demo, logging to {}", log_file.display()),
        Err(e) => {
            tracing_subscriber::fmt().with_env_filter(EnvFilter::new("kestrel=info")).init();
            warn!("File logging unavailable ({}), logging to stdout only", e);
        }
    }

    let config = NavMeshConfig::load(NAV_MESH_CONFIG_PATH);
    let mut nav_mesh = NavMesh::new(config);
    nav_mesh.from_polygons(build_level());

    let from = Vec3::new(0.5, 0.0, -6.5);
    let to = Vec3::new(0.5, 0.0, 6.5);
    let path = nav_mesh.find_path(from, to);
    info!("Path from {:?} to {:?}: {:?}", from, to, path);

    let current = nav_mesh.region_for_point(from, nav_mesh.config.epsilon_contains_test);
    match nav_mesh.clamp_movement(current, from, Vec3::new(0.5, 0.0, -0.5)) {
        Ok(clamped) => info!("Movement into the wall clamped to {:?}", clamped.position),
        Err(e) => warn!("Clamp failed: {}", e),
    }

    let mut cost_table = CostTable::new();
    cost_table.init(&nav_mesh);

    let file = std::env::temp_dir().join("kestrel_demo.navmesh");
    let data = NavMeshData::new(nav_mesh, Some(cost_table));
    if let Err(e) = save_nav_mesh(&file, &data) {
        error!("Failed to save navmesh: {}", e);
        return;
    }
    let nav_mesh = match load_nav_mesh(&file) {
        Ok(loaded) => loaded.nav_mesh,
        Err(e) => {
            error!("Failed to load navmesh: {}", e);
            return;
        }
    };

    // Answer one request through the plugin, the way a game would.
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(NavigationPlugin);
    app.insert_resource(nav_mesh);
    let entity = app.world_mut().spawn_empty().id();
    app.world_mut().write_message(PathRequest { entity, from, to });
    app.update();

    match app.world().get::<NavPath>(entity) {
        Some(nav_path) => info!("Plugin answered with {} waypoints", nav_path.waypoints.len()),
        None => warn!("Plugin found no path"),
    }
}
