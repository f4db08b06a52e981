//! 空間上のレイを表す構造体を定義するモジュール。

use crate::{CoordinateSystem, Normal, Point3, Vector3};

/// Ray構造体。
/// dirは座標変換によっては正規化されていない値になりうる。
#[derive(Debug, Clone)]
pub struct Ray<C: CoordinateSystem> {
    pub origin: Point3<C>,
    pub dir: Vector3<C>,
}
impl<C: CoordinateSystem> Ray<C> {
    /// Rayを作成する。
    #[inline(always)]
    pub fn new(origin: impl AsRef<Point3<C>>, dir: impl AsRef<Vector3<C>>) -> Self {
        let origin = *origin.as_ref();
        let dir = *dir.as_ref();
        Self { origin, dir }
    }

    /// Rayの原点を少しだけdirの方向に移動させたRayを返す。
    #[inline(always)]
    pub fn move_forward(&self, distance: f32) -> Self {
        let origin = self.origin + self.dir * distance;
        Self::new(origin, self.dir)
    }
}
impl<C: CoordinateSystem> AsRef<Ray<C>> for Ray<C> {
    #[inline(always)]
    fn as_ref(&self) -> &Ray<C> {
        self
    }
}

/// 三角形の交差を表す構造体。
pub struct TriangleIntersection<C: CoordinateSystem> {
    pub t_hit: f32,
    pub position: Point3<C>,
    pub normal: Normal<C>,
    /// (1-beta-gamma, beta, gamma)の順で格納する重心座標。
    pub barycentric: [f32; 3],
}

/// Cramerの公式を使った三角形とレイの交差判定。
///
/// `Matrix3(d, e1, e2)`の行列式を`det1`とし、`|det1|`が小さすぎる場合は
/// レイが三角形の面とほぼ平行とみなして不交差を返す。
pub fn intersect_triangle<C: CoordinateSystem>(
    ray: &Ray<C>,
    t_max: f32,
    t_min: f32,
    ps: [Point3<C>; 3],
) -> Option<TriangleIntersection<C>> {
    const EPSILON: f32 = 1e-6;

    let e1 = ps[0].vector_to(ps[1]).to_vec3();
    let e2 = ps[0].vector_to(ps[2]).to_vec3();
    let d = ray.dir.to_vec3();
    let s = ray.origin.to_vec3() - ps[0].to_vec3();

    let det1 = glam::Mat3::from_cols(d, e1, e2).determinant();
    if det1.abs() < EPSILON {
        return None;
    }

    let t_hit = -glam::Mat3::from_cols(s, e1, e2).determinant() / det1;
    if t_hit < t_min || t_hit >= t_max {
        return None;
    }

    let beta = glam::Mat3::from_cols(d, s, e2).determinant() / det1;
    if !(0.0..=1.0).contains(&beta) {
        return None;
    }

    let gamma = glam::Mat3::from_cols(d, e1, s).determinant() / det1;
    if gamma < 0.0 || gamma > 1.0 || beta + gamma > 1.0 {
        return None;
    }

    let alpha = 1.0 - beta - gamma;
    let barycentric = [alpha, beta, gamma];

    let position = Point3::from(
        ps[0].to_vec3() * alpha + ps[1].to_vec3() * beta + ps[2].to_vec3() * gamma,
    );

    let normal = Normal::from(e1.cross(e2).normalize());

    Some(TriangleIntersection {
        t_hit,
        position,
        normal,
        barycentric,
    })
}
