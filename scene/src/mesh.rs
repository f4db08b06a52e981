//! 頂点・法線・UV配列とオクトリーを持つメッシュを定義するモジュール。

use math::{Normal, Point3, Ray, World};
use rand::Rng;

use crate::hit::HitSurface;
use crate::octree::Octree;

/// メッシュ1つの三角形が参照する頂点・法線・UVの添字と、使用するマテリアルの添字。
#[derive(Debug, Clone, Copy)]
pub struct MeshTriangle {
    pub positions: [u32; 3],
    pub normals: Option<[u32; 3]>,
    pub uvs: Option<[u32; 3]>,
    pub material_index: usize,
}

pub struct Mesh {
    pub positions: Vec<Point3<World>>,
    pub normals: Vec<Normal<World>>,
    pub uvs: Vec<glam::Vec2>,
    pub triangles: Vec<MeshTriangle>,
    octree: Octree,
}
impl Mesh {
    pub fn new(
        positions: Vec<Point3<World>>,
        normals: Vec<Normal<World>>,
        uvs: Vec<glam::Vec2>,
        triangles: Vec<MeshTriangle>,
    ) -> Self {
        let octree = Octree::build(&triangles, &positions);
        Self {
            positions,
            normals,
            uvs,
            triangles,
            octree,
        }
    }

    pub fn intersect(&self, ray: &Ray<World>, t_max: f32, t_min: f32) -> Option<(f32, HitSurface, usize)> {
        self.octree
            .intersect(ray, t_max, t_min, &self.triangles, &self.positions, &self.normals, &self.uvs)
    }

    pub fn sample_point(&self, rng: &mut impl Rng) -> (HitSurface, f32) {
        let tri_count = self.triangles.len();
        let idx = rng.random_range(0..tri_count);
        let tri = &self.triangles[idx];
        let ps = tri.positions.map(|i| self.positions[i as usize].to_vec3());
        let e1 = ps[1] - ps[0];
        let e2 = ps[2] - ps[0];
        let area = e1.cross(e2).length() / 2.0;

        let mut a: f32 = rng.random();
        let mut b: f32 = rng.random();
        if a + b >= 1.0 {
            a = 1.0 - a;
            b = 1.0 - b;
        }
        let position = ps[0] + e1 * a + e2 * b;
        let normal = e1.cross(e2).normalize();

        let surface = HitSurface::new(Point3::from(position), Normal::from(normal));
        let pdf = if area > 0.0 {
            1.0 / area / tri_count as f32
        } else {
            -1.0
        };
        (surface, pdf)
    }
}

/// メッシュ内の1つの三角形とレイの交差を判定する。
pub fn intersect_mesh_triangle(
    triangles: &[MeshTriangle],
    positions: &[Point3<World>],
    normals: &[Normal<World>],
    uvs: &[glam::Vec2],
    id: u32,
    ray: &Ray<World>,
    t_max: f32,
    t_min: f32,
) -> Option<(f32, HitSurface)> {
    let tri = &triangles[id as usize];
    let ps = tri.positions.map(|i| positions[i as usize]);

    let intersection = math::intersect_triangle(ray, t_max, t_min, ps)?;

    let shading_normal = match tri.normals {
        Some(idx) => {
            let [b0, b1, b2] = intersection.barycentric;
            let n = normals[idx[0] as usize].to_vec3() * b0
                + normals[idx[1] as usize].to_vec3() * b1
                + normals[idx[2] as usize].to_vec3() * b2;
            Normal::from(n)
        }
        None => intersection.normal,
    };

    let (uv, has_texture) = match tri.uvs {
        Some(idx) => {
            let [b0, b1, b2] = intersection.barycentric;
            (
                uvs[idx[0] as usize] * b0 + uvs[idx[1] as usize] * b1 + uvs[idx[2] as usize] * b2,
                true,
            )
        }
        None => (glam::Vec2::ZERO, false),
    };

    let surface = HitSurface {
        position: intersection.position,
        shading_normal,
        geometric_normal: intersection.normal,
        uv,
        has_texture,
    };
    Some((intersection.t_hit, surface))
}
