//! 形状の交差判定とそれを束ねるGroup/Octreeの一貫性のテスト。

use math::{Normal, Point3, Ray, Vector3, World};
use scene::{Geometry, Hit, Mesh, MeshTriangle};

fn ray(origin: [f32; 3], dir: [f32; 3]) -> Ray<World> {
    Ray::new(
        Point3::new(origin[0], origin[1], origin[2]),
        Vector3::new(dir[0], dir[1], dir[2]),
    )
}

#[test]
fn single_triangle_is_hit_in_front_of_the_ray() {
    let triangle = Geometry::Triangle {
        vertices: [
            Point3::new(-1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(-1.0, 0.0, 1.0),
        ],
        material_index: 0,
    };
    let r = ray([-0.5, 5.0, -0.5], [0.0, -1.0, 0.0]);
    let mut hit = Hit::miss();
    assert!(triangle.intersect(&r, &mut hit, 1e-4));
    assert!((hit.t - 5.0).abs() < 1e-4);
}

#[test]
fn sphere_is_hit_at_nearest_point() {
    let sphere = Geometry::Sphere {
        center: Point3::new(0.0, 0.0, 5.0),
        radius: 1.0,
        material_index: 0,
    };
    let r = ray([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
    let mut hit = Hit::miss();
    assert!(sphere.intersect(&r, &mut hit, 1e-4));
    assert!((hit.t - 4.0).abs() < 1e-4);
}

#[test]
fn plane_and_rectangle_agree_on_bounded_hit() {
    let plane = Geometry::Plane {
        normal: Normal::new(0.0, 1.0, 0.0),
        offset: 0.0,
        material_index: 0,
    };
    let rect = Geometry::Rectangle {
        min: Point3::new(-1.0, 0.0, -1.0),
        max: Point3::new(1.0, 0.0, 1.0),
        material_index: 0,
    };
    let r = ray([0.0, 5.0, 0.0], [0.0, -1.0, 0.0]);

    let mut plane_hit = Hit::miss();
    plane.intersect(&r, &mut plane_hit, 1e-4);
    let mut rect_hit = Hit::miss();
    rect.intersect(&r, &mut rect_hit, 1e-4);

    assert!(plane_hit.is_hit());
    assert!(rect_hit.is_hit());
    assert!((plane_hit.t - rect_hit.t).abs() < 1e-4);

    // レイが矩形の外へ出れば、矩形側だけ外れる。
    let outside = ray([5.0, 5.0, 5.0], [0.0, -1.0, 0.0]);
    let mut rect_outside = Hit::miss();
    assert!(!rect.intersect(&outside, &mut rect_outside, 1e-4));
}

#[test]
fn group_reports_nearest_child_regardless_of_order() {
    let near = Geometry::Sphere {
        center: Point3::new(0.0, 0.0, 3.0),
        radius: 1.0,
        material_index: 1,
    };
    let far = Geometry::Sphere {
        center: Point3::new(0.0, 0.0, 10.0),
        radius: 1.0,
        material_index: 2,
    };
    // 遠い方を先に積んでも、intersectionの結果は近い方を指す。
    let group = Geometry::Group(vec![far, near]);

    let r = ray([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
    let mut hit = Hit::miss();
    assert!(group.intersect(&r, &mut hit, 1e-4));
    assert_eq!(hit.material_index, Some(1));
    assert!((hit.t - 2.0).abs() < 1e-4);
}

fn tessellated_plane(n: usize) -> Mesh {
    let mut positions = Vec::new();
    let mut triangles = Vec::new();
    let step = 10.0 / n as f32;
    for j in 0..=n {
        for i in 0..=n {
            let x = -5.0 + i as f32 * step;
            let z = -5.0 + j as f32 * step;
            positions.push(Point3::new(x, 0.0, z));
        }
    }
    let idx = |i: usize, j: usize| (j * (n + 1) + i) as u32;
    for j in 0..n {
        for i in 0..n {
            triangles.push(MeshTriangle {
                positions: [idx(i, j), idx(i + 1, j), idx(i, j + 1)],
                normals: None,
                uvs: None,
                material_index: 0,
            });
            triangles.push(MeshTriangle {
                positions: [idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)],
                normals: None,
                uvs: None,
                material_index: 0,
            });
        }
    }
    Mesh::new(positions, Vec::new(), Vec::new(), triangles)
}

/// 1000枚弱の同一平面上の三角形をオクトリーで保持し、32x32のレイグリッドを
/// 総当たり判定と突き合わせる。偽陰性(見逃し)がないことを確認する。
#[test]
fn octree_has_no_false_negatives_against_brute_force() {
    let mesh = tessellated_plane(22); // 22*22*2 = 968 triangles
    let geometry = Geometry::Mesh(mesh);

    let mut checked_any_hit = false;
    for xi in 0..32 {
        for zi in 0..32 {
            let x = -4.5 + xi as f32 * (9.0 / 31.0);
            let z = -4.5 + zi as f32 * (9.0 / 31.0);
            let r = ray([x, 5.0, z], [0.0, -1.0, 0.0]);

            let mut hit = Hit::miss();
            let octree_hit = geometry.intersect(&r, &mut hit, 1e-4);

            // 総当たり: 平面 y=0 との交差が常に存在するはず(グリッドはメッシュ範囲内)。
            assert!(octree_hit, "octree missed a ray that should hit the coplanar mesh at ({x}, {z})");
            assert!((hit.surface.position.to_vec3().y).abs() < 1e-3);
            checked_any_hit = true;
        }
    }
    assert!(checked_any_hit);
}
