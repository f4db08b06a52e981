//! フォトンマップ（3軸kd-tree）。フォトンパスで蓄積し、アイパスで検索する。

use math::{Point3, World};
use rayon::prelude::*;

/// シーンに蓄積された1本のフォトン。
#[derive(Debug, Clone, Copy)]
pub struct Photon {
    pub position: Point3<World>,
    /// フォトンがサーフェスに到達した入射方向（ワールド座標、シーン→サーフェス）。
    pub incoming_direction: glam::Vec3,
    pub power: glam::Vec3,
}

enum KdNode {
    Empty,
    Node {
        photon: Photon,
        axis: u8,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
}

/// フォトンマップ本体。フォトンパス中は`photons`に追記し、
/// パス終了後に一度だけ`build()`してkd-treeを構築する。
pub struct PhotonMap {
    photons: Vec<Photon>,
    tree: KdNode,
    len: usize,
}
impl PhotonMap {
    pub fn new() -> Self {
        Self {
            photons: Vec::new(),
            tree: KdNode::Empty,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// 蓄積されたフォトン配列からkd-treeを構築する。
    pub fn build(&mut self) {
        let max_workers = rayon::current_num_threads().max(1);
        let parallel_depth = (max_workers as f32).log2().ceil() as u32 + 1;
        let photons = std::mem::take(&mut self.photons);
        self.len = photons.len();
        self.tree = build_node(photons, 0, parallel_depth);
    }

    /// `center`から半径の2乗`r_sq`以内のフォトンそれぞれについて`visit`を呼ぶ。
    pub fn query_in_range(&self, center: glam::Vec3, r_sq: f32, visit: &mut impl FnMut(&Photon)) {
        query_node(&self.tree, center, r_sq, visit);
    }
}
impl Default for PhotonMap {
    fn default() -> Self {
        Self::new()
    }
}

fn axis_value(p: Point3<World>, axis: u8) -> f32 {
    let v = p.to_vec3();
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

fn build_node(mut photons: Vec<Photon>, depth: u32, parallel_depth: u32) -> KdNode {
    if photons.is_empty() {
        return KdNode::Empty;
    }
    let axis = (depth % 3) as u8;
    photons.sort_by(|a, b| axis_value(a.position, axis).total_cmp(&axis_value(b.position, axis)));

    let mid = (photons.len() - 1) / 2;
    let right_photons = photons.split_off(mid + 1);
    let photon = photons.pop().expect("median photon must exist");
    let left_photons = photons;

    let (left, right) = if depth < parallel_depth {
        rayon::join(
            || build_node(left_photons, depth + 1, parallel_depth),
            || build_node(right_photons, depth + 1, parallel_depth),
        )
    } else {
        (
            build_node(left_photons, depth + 1, parallel_depth),
            build_node(right_photons, depth + 1, parallel_depth),
        )
    };

    KdNode::Node {
        photon,
        axis,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn query_node(node: &KdNode, center: glam::Vec3, r_sq: f32, visit: &mut impl FnMut(&Photon)) {
    let KdNode::Node {
        photon,
        axis,
        left,
        right,
    } = node
    else {
        return;
    };

    let delta = center - photon.position.to_vec3();
    if delta.length_squared() < r_sq {
        visit(photon);
    }

    let axis_delta = match axis {
        0 => delta.x,
        1 => delta.y,
        _ => delta.z,
    };

    let (near, far) = if axis_delta < 0.0 {
        (left, right)
    } else {
        (right, left)
    };

    query_node(near, center, r_sq, visit);
    if axis_delta * axis_delta < r_sq {
        query_node(far, center, r_sq, visit);
    }
}

/// フォトンパスのワーカー間でフォトンを並行に蓄積するためのバッファ。
/// 各ワーカーがローカルに蓄積し、バリアで`PhotonMap`へマージする。
pub fn merge_local_buffers(map: &mut PhotonMap, buffers: Vec<Vec<Photon>>) {
    for buffer in buffers {
        map.photons.extend(buffer);
    }
}

/// `count`個の仕事をワーカー数に応じたチャンクに分割して並列実行し、
/// 各チャンクが生成したフォトンのローカルバッファを集める。
pub fn parallel_emit<F>(count: usize, chunk: usize, emit_one: F) -> Vec<Vec<Photon>>
where
    F: Fn(usize) -> Vec<Photon> + Sync,
{
    (0..count)
        .into_par_iter()
        .chunks(chunk)
        .map(|indices| indices.into_iter().flat_map(&emit_one).collect())
        .collect()
}
