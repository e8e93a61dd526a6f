use drape::vec::Vec as _;
use drape::{ClothConfig, GridLayout, NoOpStepObserver, Obstacle, ObstacleFamily, ObstacleSet, Quat, Transform, Vec2, Vec3, XpbdCloth};

#[test]
fn grid_matches_resolution() {
    let config = ClothConfig::<f32>::new().with_segments(3, 5).with_size(6.0, 10.0);
    let grid = GridLayout::build(&config, &Transform::identity());

    assert_eq!(grid.columns, 4);
    assert_eq!(grid.rows, 6);
    assert_eq!(grid.particle_count(), 24);
    assert_eq!(grid.triangle_count(), 3 * 5 * 2);
    assert!(grid.indices.iter().all(|&i| (i as usize) < grid.particle_count()));

    // Local X spans [-w/2, w/2], local Y spans [0, -h].
    assert_eq!(grid.local[0], Vec3::new(-3.0, 0.0, 0.0));
    assert_eq!(grid.local[grid.index(3, 5)], Vec3::new(3.0, -10.0, 0.0));
}

#[test]
fn uvs_run_left_to_right_and_top_down() {
    let config = ClothConfig::<f32>::new().with_segments(2, 4);
    let grid = GridLayout::build(&config, &Transform::identity());

    assert_eq!(grid.uvs[grid.index(0, 0)], Vec2::new(0.0, 1.0));
    assert_eq!(grid.uvs[grid.index(2, 0)], Vec2::new(1.0, 1.0));
    assert_eq!(grid.uvs[grid.index(1, 2)], Vec2::new(0.5, 0.5));
    assert_eq!(grid.uvs[grid.index(2, 4)], Vec2::new(1.0, 0.0));
}

#[test]
fn transform_places_particles_in_world() {
    let config = ClothConfig::<f32>::new().with_segments(2, 2).with_size(2.0, 2.0);
    let transform = Transform::from_translation(Vec3::new(5.0, 3.0, 0.0))
        .with_rotation(Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), core::f32::consts::FRAC_PI_2));
    let grid = GridLayout::build(&config, &transform);

    for (p, l) in grid.particles.iter().zip(&grid.local) {
        let back = transform.inverse_transform_point(p.pos);
        assert!(back.distance(*l) < 1e-5, "{:?} vs {:?}", back, l);
    }
    // Rotated a quarter turn about Y: local +X points along world -Z.
    let right = grid.particles[grid.index(2, 0)].pos;
    assert!((right.x - 5.0).abs() < 1e-5);
    assert!((right.z + 1.0).abs() < 1e-5);
}

#[test]
fn top_row_pinning_is_optional() {
    let config = ClothConfig::<f32>::new().with_segments(3, 3);
    let pinned = GridLayout::build(&config, &Transform::identity());
    assert!(pinned.particles[..4].iter().all(|p| p.is_pinned()));
    assert!(pinned.particles[4..].iter().all(|p| !p.is_pinned()));

    let loose = GridLayout::build(&config.with_pin_top_edge(false), &Transform::identity());
    assert!(loose.particles.iter().all(|p| !p.is_pinned()));
}

#[test]
fn mesh_tracks_particles_in_local_space() {
    let config = ClothConfig::new().with_segments(6, 6).with_size(3.0, 3.0);
    let transform = Transform::from_translation(Vec3::new(-2.0f32, 6.0, 1.0))
        .with_scale(Vec3::new(2.0, 2.0, 2.0));
    let mut world = ObstacleSet::new();
    world.insert(ObstacleFamily::Sphere, Obstacle::new(Vec3::new(-2.0, 2.0, 1.8), 1.5));

    let mut cloth = XpbdCloth::build(config, transform);
    let uvs = cloth.mesh().uvs.clone();
    let indices = cloth.mesh().indices.clone();
    for _ in 0..45 {
        cloth.tick(1.0 / 60.0, &mut world, &mut NoOpStepObserver);
    }

    let mesh = cloth.mesh();
    assert_eq!(mesh.vertex_count(), cloth.particle_count());
    assert_eq!(mesh.uvs, uvs);
    assert_eq!(mesh.indices, indices);

    for (v, p) in mesh.vertices.iter().zip(cloth.particles()) {
        let expected = transform.inverse_transform_point(p.pos);
        assert!(v.distance(expected) < 1e-5);
        assert!(mesh.bounds.contains(*v));
    }
    for n in &mesh.normals {
        assert!((n.length() - 1.0).abs() < 1e-4, "normal not unit: {:?}", n);
    }
    // The sphere bulges the cloth out of its plane.
    assert!(mesh.bounds.max.z - mesh.bounds.min.z > 0.05);
    assert_eq!(mesh.flat_vertices().len(), mesh.vertex_count() * 3);
}
