use bevy::prelude::*;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::cost_table::CostTable;
use super::error::NavMeshFileError;
use super::NavMesh;

pub const NAV_MESH_FILE_VERSION: u32 = 1;

/// On-disk form of a baked navigation mesh.
#[derive(Serialize, Deserialize)]
pub struct NavMeshData {
    pub version: u32,
    pub nav_mesh: NavMesh,
    pub cost_table: Option<CostTable>,
}

impl NavMeshData {
    pub fn new(nav_mesh: NavMesh, cost_table: Option<CostTable>) -> Self {
        Self { version: NAV_MESH_FILE_VERSION, nav_mesh, cost_table }
    }
}

/// Write a zlib compressed bincode file.
pub fn save_nav_mesh(path: impl AsRef<Path>, data: &NavMeshData) -> Result<(), NavMeshFileError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, data)?;
    encoder.finish()?.flush()?;

    info!(
        "[NAVMESH FILE] Saved {} regions to {}",
        data.nav_mesh.region_count(),
        path.display()
    );
    Ok(())
}

/// Read a file written by [`save_nav_mesh`], rejecting other versions and
/// meshes whose ids do not line up.
pub fn load_nav_mesh(path: impl AsRef<Path>) -> Result<NavMeshData, NavMeshFileError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let data: NavMeshData = bincode::deserialize_from(&mut decoder)?;

    if data.version != NAV_MESH_FILE_VERSION {
        error!(
            "[NAVMESH FILE] {} has version {}, expected {}",
            path.display(),
            data.version,
            NAV_MESH_FILE_VERSION
        );
        return Err(NavMeshFileError::VersionMismatch {
            found: data.version,
            expected: NAV_MESH_FILE_VERSION,
        });
    }

    if let Err(e) = data.nav_mesh.validate() {
        error!("[NAVMESH FILE] {} holds an inconsistent mesh: {}", path.display(), e);
        return Err(e.into());
    }

    info!(
        "[NAVMESH FILE] Loaded {} regions from {}",
        data.nav_mesh.region_count(),
        path.display()
    );
    Ok(data)
}
