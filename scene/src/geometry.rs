//! レンダリング可能な形状のバリアントを定義するモジュール。

use math::{Normal, Point3, Ray, World};
use rand::Rng;

use crate::hit::{Hit, HitSurface};
use crate::mesh::Mesh;

/// シーン中の形状のバリアント。
pub enum Geometry {
    Sphere {
        center: Point3<World>,
        radius: f32,
        material_index: usize,
    },
    Plane {
        normal: Normal<World>,
        offset: f32,
        material_index: usize,
    },
    Rectangle {
        min: Point3<World>,
        max: Point3<World>,
        material_index: usize,
    },
    Triangle {
        vertices: [Point3<World>; 3],
        material_index: usize,
    },
    Mesh(Mesh),
    /// 子形状をワールド座標系内でさらに変換するラッパー。
    Transform {
        child: Box<Geometry>,
        matrix: glam::Mat4,
        inverse: glam::Mat4,
    },
    Group(Vec<Geometry>),
}
impl Geometry {
    pub fn transform(child: Geometry, matrix: glam::Mat4) -> Self {
        Geometry::Transform {
            child: Box::new(child),
            matrix,
            inverse: matrix.inverse(),
        }
    }

    /// レイとの交差を判定し、hitがより近い交差を保持していればtrueを返す。
    pub fn intersect(&self, ray: &Ray<World>, hit: &mut Hit, tmin: f32) -> bool {
        match self {
            Geometry::Sphere {
                center,
                radius,
                material_index,
            } => intersect_sphere(*center, *radius, *material_index, ray, hit, tmin),
            Geometry::Plane {
                normal,
                offset,
                material_index,
            } => intersect_plane(*normal, *offset, *material_index, ray, hit, tmin),
            Geometry::Rectangle {
                min,
                max,
                material_index,
            } => intersect_rectangle(*min, *max, *material_index, ray, hit, tmin),
            Geometry::Triangle {
                vertices,
                material_index,
            } => intersect_single_triangle(*vertices, *material_index, ray, hit, tmin),
            Geometry::Mesh(mesh) => {
                if let Some((t, surface, tri_id)) = mesh.intersect(ray, hit.t, tmin) {
                    let material_index = mesh.triangles[tri_id].material_index;
                    hit.update(t, tmin, material_index, surface)
                } else {
                    false
                }
            }
            Geometry::Transform {
                child,
                matrix,
                inverse,
            } => intersect_transform(child, *matrix, *inverse, ray, hit, tmin),
            Geometry::Group(children) => {
                // すべての子を評価する（短絡しない）。
                let mut any_hit = false;
                for child in children {
                    if child.intersect(ray, hit, tmin) {
                        any_hit = true;
                    }
                }
                any_hit
            }
        }
    }

    /// 面積に関して一様な表面点をサンプルする。退化した形状はpdf=-1を返す。
    pub fn sample_point(&self, rng: &mut impl Rng) -> (HitSurface, f32) {
        match self {
            Geometry::Sphere {
                center,
                radius,
                ..
            } => {
                let u: f32 = rng.random();
                let v: f32 = rng.random();
                let z = 2.0 * u - 1.0;
                let phi = 2.0 * std::f32::consts::PI * v;
                let r = (1.0 - z * z).max(0.0).sqrt();
                let local = glam::vec3(r * phi.cos(), r * phi.sin(), z);
                let position = center.to_vec3() + local * *radius;
                let surface = HitSurface::new(Point3::from(position), Normal::from(local));
                let pdf = 1.0 / (4.0 * std::f32::consts::PI * radius * radius);
                (surface, pdf)
            }
            Geometry::Plane { .. } => {
                (HitSurface::new(Point3::ZERO, Normal::new(0.0, 0.0, 1.0)), -1.0)
            }
            Geometry::Rectangle { min, max, .. } => sample_rectangle(*min, *max, rng),
            Geometry::Triangle { vertices, .. } => sample_triangle(*vertices, rng),
            Geometry::Mesh(mesh) => mesh.sample_point(rng),
            Geometry::Transform {
                child,
                matrix,
                inverse,
            } => {
                let (surface, pdf) = child.sample_point(rng);
                let position = matrix.transform_point3(surface.position.to_vec3());
                let normal_matrix = inverse.transpose();
                let normal = normal_matrix
                    .transform_vector3(surface.shading_normal.to_vec3())
                    .normalize();
                (
                    HitSurface {
                        position: Point3::from(position),
                        shading_normal: Normal::from(normal),
                        geometric_normal: Normal::from(normal),
                        uv: surface.uv,
                        has_texture: surface.has_texture,
                    },
                    pdf,
                )
            }
            Geometry::Group(children) => {
                if children.is_empty() {
                    return (HitSurface::new(Point3::ZERO, Normal::new(0.0, 0.0, 1.0)), -1.0);
                }
                let idx = rng.random_range(0..children.len());
                let (surface, pdf) = children[idx].sample_point(rng);
                (surface, if pdf < 0.0 { pdf } else { pdf / children.len() as f32 })
            }
        }
    }
}

fn intersect_sphere(
    center: Point3<World>,
    radius: f32,
    material_index: usize,
    ray: &Ray<World>,
    hit: &mut Hit,
    tmin: f32,
) -> bool {
    let dir = ray.dir.to_vec3().normalize();
    let l = center.to_vec3() - ray.origin.to_vec3();
    let tp = l.dot(dir);
    let d_sq = l.length_squared() - tp * tp;
    let r_sq = radius * radius;
    if d_sq > r_sq {
        return false;
    }
    let t_hc = (r_sq - d_sq).sqrt();
    let inside = l.length_squared() < r_sq;
    let t = if inside { tp + t_hc } else { tp - t_hc };
    if t < tmin {
        return false;
    }
    let position = ray.origin.to_vec3() + dir * t;
    let mut normal = (position - center.to_vec3()).normalize();
    if inside {
        normal = -normal;
    }
    let surface = HitSurface::new(Point3::from(position), Normal::from(normal));
    hit.update(t, tmin, material_index, surface)
}

fn intersect_plane(
    normal: Normal<World>,
    offset: f32,
    material_index: usize,
    ray: &Ray<World>,
    hit: &mut Hit,
    tmin: f32,
) -> bool {
    let n = normal.to_vec3();
    let denom = n.dot(ray.dir.to_vec3());
    if denom.abs() < 1e-6 {
        return false;
    }
    let t = (offset - n.dot(ray.origin.to_vec3())) / denom;
    if t < tmin {
        return false;
    }
    let position = ray.origin.to_vec3() + ray.dir.to_vec3() * t;
    let surface = HitSurface::new(Point3::from(position), normal);
    hit.update(t, tmin, material_index, surface)
}

/// 軸並行な直方体（Rectangle）との交差判定。3値(LEFT/RIGHT/MIDDLE)の列挙による
/// スラブトラバーサル。
fn intersect_rectangle(
    min: Point3<World>,
    max: Point3<World>,
    material_index: usize,
    ray: &Ray<World>,
    hit: &mut Hit,
    tmin: f32,
) -> bool {
    #[derive(PartialEq, Clone, Copy)]
    enum Quadrant {
        Left,
        Right,
        Middle,
    }

    let origin = ray.origin.to_vec3();
    let dir = ray.dir.to_vec3();
    let min_v = [min.to_vec3().x, min.to_vec3().y, min.to_vec3().z];
    let max_v = [max.to_vec3().x, max.to_vec3().y, max.to_vec3().z];
    let o = [origin.x, origin.y, origin.z];
    let d = [dir.x, dir.y, dir.z];

    let mut quadrant = [Quadrant::Middle; 3];
    let mut candidate_plane = [0.0_f32; 3];
    let mut inside = true;

    for i in 0..3 {
        if o[i] < min_v[i] {
            quadrant[i] = Quadrant::Left;
            candidate_plane[i] = min_v[i];
            inside = false;
        } else if o[i] > max_v[i] {
            quadrant[i] = Quadrant::Right;
            candidate_plane[i] = max_v[i];
            inside = false;
        }
    }

    let (t, hit_face);
    if inside {
        // 内部から出るレイ：最小の正のtを持つ軸を出口面とする。
        let mut best_axis = None;
        let mut best_t = f32::INFINITY;
        for i in 0..3 {
            if d[i].abs() > 1e-6 {
                let plane = if d[i] > 0.0 { max_v[i] } else { min_v[i] };
                let ti = (plane - o[i]) / d[i];
                if ti >= 0.0 && ti < best_t {
                    best_t = ti;
                    best_axis = Some(i);
                }
            }
        }
        match best_axis {
            Some(axis) => {
                t = best_t;
                hit_face = axis;
            }
            None => return false,
        }
    } else {
        let mut max_t = [0.0_f32; 3];
        for i in 0..3 {
            max_t[i] = if quadrant[i] != Quadrant::Middle && d[i] != 0.0 {
                (candidate_plane[i] - o[i]) / d[i]
            } else {
                -1.0
            };
        }
        let mut which = 0;
        for i in 1..3 {
            if max_t[which] < max_t[i] {
                which = i;
            }
        }
        if max_t[which] < 0.0 {
            return false;
        }
        for i in 0..3 {
            if which != i {
                let coord = o[i] + max_t[which] * d[i];
                if coord < min_v[i] - 1e-6 || coord > max_v[i] + 1e-6 {
                    return false;
                }
            }
        }
        t = max_t[which];
        hit_face = which;
    }

    if t < tmin {
        return false;
    }

    let position = origin + dir * t;
    let mut normal = glam::Vec3::ZERO;
    normal[hit_face] = if d[hit_face] > 0.0 { -1.0 } else { 1.0 };

    let surface = HitSurface::new(Point3::from(position), Normal::from(normal));
    hit.update(t, tmin, material_index, surface)
}

fn sample_rectangle(min: Point3<World>, max: Point3<World>, rng: &mut impl Rng) -> (HitSurface, f32) {
    let size = max.to_vec3() - min.to_vec3();
    let area_xy = (size.x * size.y).abs();
    let area_yz = (size.y * size.z).abs();
    let area_zx = (size.z * size.x).abs();
    let total = area_xy + area_yz + area_zx;
    if total <= 0.0 {
        return (HitSurface::new(Point3::ZERO, Normal::new(0.0, 0.0, 1.0)), -1.0);
    }

    let u: f32 = rng.random::<f32>() * total;
    let axis = if u < area_xy {
        2
    } else if u < area_xy + area_yz {
        0
    } else {
        1
    };

    let face_sign: f32 = if rng.random::<bool>() { 1.0 } else { -1.0 };
    let a: f32 = rng.random();
    let b: f32 = rng.random();
    let mn = min.to_vec3();
    let mx = max.to_vec3();
    let mut position = glam::Vec3::ZERO;
    let mut normal = glam::Vec3::ZERO;
    let (i0, i1) = match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };
    position[i0] = mn[i0] + (mx[i0] - mn[i0]) * a;
    position[i1] = mn[i1] + (mx[i1] - mn[i1]) * b;
    position[axis] = if face_sign > 0.0 { mx[axis] } else { mn[axis] };
    normal[axis] = face_sign;

    let surface = HitSurface::new(Point3::from(position), Normal::from(normal));
    (surface, 1.0 / (2.0 * total))
}

fn intersect_single_triangle(
    vertices: [Point3<World>; 3],
    material_index: usize,
    ray: &Ray<World>,
    hit: &mut Hit,
    tmin: f32,
) -> bool {
    match math::intersect_triangle(ray, hit.t, tmin, vertices) {
        Some(intersection) => {
            let surface = HitSurface::new(intersection.position, intersection.normal);
            hit.update(intersection.t_hit, tmin, material_index, surface)
        }
        None => false,
    }
}

fn sample_triangle(vertices: [Point3<World>; 3], rng: &mut impl Rng) -> (HitSurface, f32) {
    let e1 = vertices[0].vector_to(vertices[1]).to_vec3();
    let e2 = vertices[0].vector_to(vertices[2]).to_vec3();

    let mut a: f32 = rng.random();
    let mut b: f32 = rng.random();
    if a + b >= 1.0 {
        a = 1.0 - a;
        b = 1.0 - b;
    }
    let position = vertices[0].to_vec3() + e1 * a + e2 * b;
    let normal = e1.cross(e2).normalize();
    let cross_len = e1.cross(e2).length();
    let pdf = if cross_len > 0.0 { 2.0 / cross_len } else { -1.0 };
    (
        HitSurface::new(Point3::from(position), Normal::from(normal)),
        pdf,
    )
}

fn intersect_transform(
    child: &Geometry,
    _matrix: glam::Mat4,
    inverse: glam::Mat4,
    ray: &Ray<World>,
    hit: &mut Hit,
    tmin: f32,
) -> bool {
    let local_origin = inverse.transform_point3(ray.origin.to_vec3());
    let local_dir = inverse.transform_vector3(ray.dir.to_vec3());
    let local_ray = Ray::new(Point3::from(local_origin), math::Vector3::from(local_dir));

    let mut local_hit = Hit { t: hit.t, ..Hit::miss() };
    if !child.intersect(&local_ray, &mut local_hit, tmin) {
        return false;
    }

    // 原点のレイ（変換前）をlocal_hit.tで評価してワールド座標位置を得る。
    let position = ray.origin.to_vec3() + ray.dir.to_vec3() * local_hit.t;
    let normal_matrix = inverse.transpose();
    let shading_normal = normal_matrix
        .transform_vector3(local_hit.surface.shading_normal.to_vec3())
        .normalize();
    let geometric_normal = normal_matrix
        .transform_vector3(local_hit.surface.geometric_normal.to_vec3())
        .normalize();

    let surface = HitSurface {
        position: Point3::from(position),
        shading_normal: Normal::from(shading_normal),
        geometric_normal: Normal::from(geometric_normal),
        uv: local_hit.surface.uv,
        has_texture: local_hit.surface.has_texture,
    };
    hit.update(
        local_hit.t,
        tmin,
        local_hit.material_index.unwrap_or(0),
        surface,
    )
}
