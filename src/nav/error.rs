use thiserror::Error;

/// Errors raised while building or querying a navigation mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavMeshError {
    #[error("contour has {points} points, at least 3 are required")]
    DegenerateContour { points: usize },

    #[error("contour of {points} points encloses no area")]
    ZeroAreaContour { points: usize },

    #[error("contour vertex {vertex} is not finite")]
    NonFiniteVertex { vertex: usize },

    #[error("movement left the mesh and no current region is available")]
    NoCurrentRegion,

    #[error("half-edge {edge} has links that point outside the mesh or disagree")]
    BrokenEdge { edge: usize },

    #[error("region {polygon} does not own its first edge")]
    BrokenPolygon { polygon: usize },

    #[error("{what} {index} refers to a region or edge that does not exist")]
    DanglingReference { what: &'static str, index: usize },
}

/// Errors raised while reading or writing a navigation mesh file.
#[derive(Error, Debug)]
pub enum NavMeshFileError {
    #[error("navmesh file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("navmesh encoding failed: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("navmesh file version {found} does not match expected version {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("navmesh file holds an inconsistent mesh: {0}")]
    Invalid(#[from] NavMeshError),
}
