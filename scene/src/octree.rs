//! メッシュの三角形に対する空間分割木（オクトリー）を定義するモジュール。

use math::{Bounds, Point3, Ray, World};

use crate::mesh::MeshTriangle;

const MAX_TRIANGLES_PER_LEAF: usize = 16;
const MAX_DEPTH: u32 = 8;

pub struct Octree {
    root: OctNode,
}
enum OctNode {
    Leaf {
        bbox: Bounds<World>,
        triangle_ids: Vec<u32>,
    },
    Inner {
        bbox: Bounds<World>,
        children: Box<[OctNode; 8]>,
    },
}
impl OctNode {
    fn bbox(&self) -> &Bounds<World> {
        match self {
            OctNode::Leaf { bbox, .. } => bbox,
            OctNode::Inner { bbox, .. } => bbox,
        }
    }
}

fn triangle_bounds(triangles: &[MeshTriangle], positions: &[Point3<World>], id: u32) -> Bounds<World> {
    let tri = &triangles[id as usize];
    let ps = tri.positions.map(|i| positions[i as usize].to_vec3());
    let min = ps[0].min(ps[1]).min(ps[2]);
    let max = ps[0].max(ps[1]).max(ps[2]);
    Bounds::new(Point3::from(min), Point3::from(max))
}

fn bounds_intersect(a: &Bounds<World>, b: &Bounds<World>) -> bool {
    let amin = a.min.to_vec3();
    let amax = a.max.to_vec3();
    let bmin = b.min.to_vec3();
    let bmax = b.max.to_vec3();
    amin.x <= bmax.x
        && amax.x >= bmin.x
        && amin.y <= bmax.y
        && amax.y >= bmin.y
        && amin.z <= bmax.z
        && amax.z >= bmin.z
}

fn bounds_contains(b: &Bounds<World>, p: Point3<World>) -> bool {
    let p = p.to_vec3();
    let min = b.min.to_vec3();
    let max = b.max.to_vec3();
    (min.x - 1e-5..=max.x + 1e-5).contains(&p.x)
        && (min.y - 1e-5..=max.y + 1e-5).contains(&p.y)
        && (min.z - 1e-5..=max.z + 1e-5).contains(&p.z)
}

/// 親のバウンディングボックスを中心で8分割した、8番目(octant)の子ボックスを返す。
fn child_bounds(bbox: &Bounds<World>, octant: usize) -> Bounds<World> {
    let min = bbox.min.to_vec3();
    let max = bbox.max.to_vec3();
    let center = bbox.center().to_vec3();

    let lo = glam::vec3(
        if octant & 1 == 0 { min.x } else { center.x },
        if octant & 2 == 0 { min.y } else { center.y },
        if octant & 4 == 0 { min.z } else { center.z },
    );
    let hi = glam::vec3(
        if octant & 1 == 0 { center.x } else { max.x },
        if octant & 2 == 0 { center.y } else { max.y },
        if octant & 4 == 0 { center.z } else { max.z },
    );
    Bounds::new(Point3::from(lo), Point3::from(hi))
}

impl Octree {
    pub fn build(triangles: &[MeshTriangle], positions: &[Point3<World>]) -> Self {
        let bbox = whole_bounds(triangles, positions);
        let ids: Vec<u32> = (0..triangles.len() as u32).collect();
        let root = build_node(triangles, positions, bbox, ids, 0);
        Self { root }
    }

    pub fn intersect(
        &self,
        ray: &Ray<World>,
        t_max: f32,
        t_min: f32,
        triangles: &[MeshTriangle],
        positions: &[Point3<World>],
        normals: &[math::Normal<World>],
        uvs: &[glam::Vec2],
    ) -> Option<(f32, crate::hit::HitSurface, usize)> {
        traverse(&self.root, ray, t_max, t_min, triangles, positions, normals, uvs)
    }
}

fn whole_bounds(triangles: &[MeshTriangle], positions: &[Point3<World>]) -> Bounds<World> {
    let mut min = glam::Vec3::splat(f32::INFINITY);
    let mut max = glam::Vec3::splat(f32::NEG_INFINITY);
    for i in 0..triangles.len() as u32 {
        let b = triangle_bounds(triangles, positions, i);
        min = min.min(b.min.to_vec3());
        max = max.max(b.max.to_vec3());
    }
    Bounds::new(Point3::from(min), Point3::from(max))
}

fn build_node(
    triangles: &[MeshTriangle],
    positions: &[Point3<World>],
    bbox: Bounds<World>,
    ids: Vec<u32>,
    depth: u32,
) -> OctNode {
    if ids.len() <= MAX_TRIANGLES_PER_LEAF || depth >= MAX_DEPTH {
        return OctNode::Leaf {
            bbox,
            triangle_ids: ids,
        };
    }

    let children: Vec<OctNode> = (0..8)
        .map(|octant| {
            let child_box = child_bounds(&bbox, octant);
            let child_ids: Vec<u32> = ids
                .iter()
                .copied()
                .filter(|&id| bounds_intersect(&child_box, &triangle_bounds(triangles, positions, id)))
                .collect();
            build_node(triangles, positions, child_box, child_ids, depth + 1)
        })
        .collect();

    OctNode::Inner {
        bbox,
        children: Box::new(children.try_into().unwrap_or_else(|_| unreachable!())),
    }
}

fn traverse(
    node: &OctNode,
    ray: &Ray<World>,
    t_max: f32,
    t_min: f32,
    triangles: &[MeshTriangle],
    positions: &[Point3<World>],
    normals: &[math::Normal<World>],
    uvs: &[glam::Vec2],
) -> Option<(f32, crate::hit::HitSurface, usize)> {
    match node {
        OctNode::Leaf { triangle_ids, .. } => {
            let mut best: Option<(f32, crate::hit::HitSurface, usize)> = None;
            let mut current_t_max = t_max;
            for &id in triangle_ids {
                if let Some((t, surface)) =
                    crate::mesh::intersect_mesh_triangle(triangles, positions, normals, uvs, id, ray, current_t_max, t_min)
                {
                    current_t_max = t;
                    best = Some((t, surface, id as usize));
                }
            }
            best
        }
        OctNode::Inner { children, .. } => {
            let inv_dir = glam::vec3(1.0 / ray.dir.to_vec3().x, 1.0 / ray.dir.to_vec3().y, 1.0 / ray.dir.to_vec3().z);
            let mut candidates: Vec<(f32, usize)> = children
                .iter()
                .enumerate()
                .filter_map(|(i, c)| {
                    c.bbox()
                        .intersect(ray, t_max, inv_dir)
                        .map(|bi| (bi.t0.max(t_min), i))
                })
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut best: Option<(f32, crate::hit::HitSurface, usize)> = None;
            let mut current_t_max = t_max;
            for (_, i) in candidates {
                if let Some((t, surface, tri_id)) = traverse(
                    &children[i],
                    ray,
                    current_t_max,
                    t_min,
                    triangles,
                    positions,
                    normals,
                    uvs,
                ) {
                    current_t_max = t;
                    let hit_contained = bounds_contains(children[i].bbox(), surface.position);
                    best = Some((t, surface, tri_id));
                    if hit_contained {
                        break;
                    }
                }
            }
            best
        }
    }
}
