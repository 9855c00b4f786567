use bevy::prelude::*;
use kestrel::nav::{
    load_nav_mesh, save_nav_mesh, CostTable, NavMesh, NavMeshConfig, NavMeshData, NavMeshError, NavMeshFileError,
    NavPath, NavigationPlugin, PathRequest, PolygonId, SpatialIndexConfig, NAV_MESH_FILE_VERSION,
};

fn p(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.0, z)
}

/// Unit squares at the given tile coordinates, two triangles each.
fn tiles(coords: &[(i32, i32)]) -> Vec<[Vec3; 3]> {
    let mut triangles = Vec::new();
    for &(tx, tz) in coords {
        let (x0, z0) = (tx as f32, tz as f32);
        let (x1, z1) = (x0 + 1.0, z0 + 1.0);
        triangles.push([p(x0, z0), p(x0, z1), p(x1, z1)]);
        triangles.push([p(x0, z0), p(x1, z1), p(x1, z0)]);
    }
    triangles
}

fn l_shape() -> Vec<[Vec3; 3]> {
    tiles(&[(0, 0), (1, 0), (1, 1)])
}

fn temp_file(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("kestrel_{}_{}.navmesh", name, std::process::id()))
}

fn setup_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(NavigationPlugin);
    // Runs startup, which loads the config into the NavMesh resource.
    app.update();
    app
}

#[test]
fn test_plugin_answers_path_requests() {
    let mut app = setup_app();
    assert!(app.world().contains_resource::<NavMeshConfig>());

    app.world_mut().resource_mut::<NavMesh>().from_polygons(l_shape());

    let entity = app.world_mut().spawn_empty().id();
    let from = p(0.5, 0.5);
    let to = p(1.2, 1.8);
    app.world_mut().write_message(PathRequest { entity, from, to });
    app.update();

    let nav_path = app.world().get::<NavPath>(entity).expect("path should be inserted");
    assert_eq!(nav_path.waypoints, vec![from, p(1.0, 1.0), to]);
    assert_eq!(nav_path.current_index, 0);
}

#[test]
fn test_plugin_removes_stale_path_when_unreachable() {
    let mut app = setup_app();
    let mut contours = tiles(&[(0, 0)]);
    contours.extend(tiles(&[(5, 5)]));
    app.world_mut().resource_mut::<NavMesh>().from_polygons(contours);

    let entity = app
        .world_mut()
        .spawn(NavPath::new(vec![p(0.0, 0.0), p(1.0, 1.0)]))
        .id();
    app.world_mut().write_message(PathRequest { entity, from: p(0.5, 0.5), to: p(5.5, 5.5) });
    app.update();

    assert!(app.world().get::<NavPath>(entity).is_none());
}

#[test]
fn test_plugin_ignores_despawned_entities() {
    let mut app = setup_app();
    app.world_mut().resource_mut::<NavMesh>().from_polygons(l_shape());

    let entity = app.world_mut().spawn_empty().id();
    app.world_mut().despawn(entity);
    app.world_mut().write_message(PathRequest { entity, from: p(0.5, 0.5), to: p(1.5, 1.5) });
    app.update();
}

#[test]
fn test_nav_path_advances_to_the_end() {
    let mut nav_path = NavPath::new(vec![p(0.0, 0.0), p(1.0, 0.0)]);

    assert_eq!(nav_path.current(), Some(p(0.0, 0.0)));
    assert!(nav_path.advance());
    assert_eq!(nav_path.current(), Some(p(1.0, 0.0)));
    assert_eq!(nav_path.remaining(), &[p(1.0, 0.0)]);
    assert!(!nav_path.advance());
    assert!(nav_path.remaining().is_empty());
    assert!(nav_path.is_finished());
    assert!(!nav_path.advance());
    assert_eq!(nav_path.current(), None);
}

#[test]
fn test_save_and_load_round_trip() {
    let mut nav_mesh = NavMesh::new(NavMeshConfig {
        spatial_index: Some(SpatialIndexConfig {
            width: 20.0,
            height: 4.0,
            depth: 20.0,
            cells_x: 4,
            cells_y: 1,
            cells_z: 4,
        }),
        ..default()
    });
    nav_mesh.from_polygons(l_shape());
    let mut cost_table = CostTable::new();
    cost_table.init(&nav_mesh);

    let expected_path = nav_mesh.find_path(p(0.5, 0.5), p(1.2, 1.8));
    let file = temp_file("round_trip");
    save_nav_mesh(&file, &NavMeshData::new(nav_mesh, Some(cost_table.clone()))).unwrap();

    let loaded = load_nav_mesh(&file).unwrap();
    let _ = std::fs::remove_file(&file);

    assert_eq!(loaded.version, NAV_MESH_FILE_VERSION);
    assert_eq!(loaded.cost_table, Some(cost_table));
    assert_eq!(loaded.nav_mesh.region_count(), 2);
    assert!(loaded.nav_mesh.spatial_index().is_some());
    assert_eq!(loaded.nav_mesh.find_path(p(0.5, 0.5), p(1.2, 1.8)), expected_path);
}

#[test]
fn test_load_rejects_other_versions() {
    let mut nav_mesh = NavMesh::default();
    nav_mesh.from_polygons(l_shape());
    let mut data = NavMeshData::new(nav_mesh, None);
    data.version = NAV_MESH_FILE_VERSION + 1;

    let file = temp_file("version");
    save_nav_mesh(&file, &data).unwrap();
    let result = load_nav_mesh(&file);
    let _ = std::fs::remove_file(&file);

    match result {
        Err(NavMeshFileError::VersionMismatch { found, expected }) => {
            assert_eq!(found, NAV_MESH_FILE_VERSION + 1);
            assert_eq!(expected, NAV_MESH_FILE_VERSION);
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("mismatched version was accepted"),
    }
}

#[test]
fn test_load_reports_missing_and_corrupt_files() {
    assert!(matches!(
        load_nav_mesh(temp_file("does_not_exist")),
        Err(NavMeshFileError::Io(_))
    ));

    let file = temp_file("corrupt");
    std::fs::write(&file, b"definitely not zlib").unwrap();
    let result = load_nav_mesh(&file);
    let _ = std::fs::remove_file(&file);
    assert!(result.is_err());
}

#[test]
fn test_load_rejects_inconsistent_meshes() {
    let mut nav_mesh = NavMesh::default();
    nav_mesh.from_polygons(l_shape());

    let mut value = serde_json::to_value(&nav_mesh).unwrap();
    value["mesh"]["edges"][0]["next"] = serde_json::json!(999);
    let tampered: NavMesh = serde_json::from_value(value).unwrap();

    let file = temp_file("inconsistent");
    save_nav_mesh(&file, &NavMeshData::new(tampered, None)).unwrap();
    let result = load_nav_mesh(&file);
    let _ = std::fs::remove_file(&file);

    match result {
        Err(NavMeshFileError::Invalid(e)) => assert_eq!(e, NavMeshError::BrokenEdge { edge: 0 }),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("inconsistent mesh was accepted"),
    }
}

#[test]
fn test_json_round_trip_keeps_indices_stable() {
    let mut nav_mesh = NavMesh::default();
    nav_mesh.from_polygons(tiles(&[(0, 0), (1, 0), (1, 1), (1, 2), (0, 2)]));

    let json = serde_json::to_string(&nav_mesh).unwrap();
    let restored: NavMesh = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.region_count(), nav_mesh.region_count());
    assert_eq!(restored.border_edges(), nav_mesh.border_edges());
    assert_eq!(restored.graph().edge_count(), nav_mesh.graph().edge_count());
    for point in [p(0.5, 0.5), p(1.5, 1.5), p(0.5, 2.5)] {
        assert_eq!(restored.region_for_point(point, 1.0), nav_mesh.region_for_point(point, 1.0));
    }
    assert_eq!(
        restored.find_path(p(0.5, 0.5), p(0.5, 2.5)),
        nav_mesh.find_path(p(0.5, 0.5), p(0.5, 2.5))
    );
}

#[test]
fn test_u_shaped_level_routes_around_the_gap() {
    let mut nav_mesh = NavMesh::default();
    nav_mesh.from_polygons(tiles(&[(0, 0), (1, 0), (1, 1), (1, 2), (0, 2)]));

    let from = p(0.5, 0.5);
    let to = p(0.5, 2.5);
    let path = nav_mesh.find_path(from, to);

    assert_eq!(path.first(), Some(&from));
    assert_eq!(path.last(), Some(&to));
    assert!(path.len() >= 4, "path must bend twice: {path:?}");
    for point in &path {
        assert!(
            nav_mesh.region_for_point(*point, 1e-3).is_some(),
            "{point:?} is off the mesh"
        );
    }
    let end_region = nav_mesh.region_for_point(to, 1e-3);
    assert!(matches!(end_region, Some(PolygonId(_))));
}
