//! `tobj`を使ったOBJ/MTLメッシュの読み込み。`tobj`が表面化しない
//! `illum`/`Ni`/`d`フィールドはMTLファイルを直接読み直して補う。

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use math::{Normal, Point3};

use crate::material::Material;
use crate::mesh::{Mesh, MeshTriangle};
use crate::texture::Texture;

/// OBJファイルを読み込み、メッシュと、(まだグローバル番号に変換していない)
/// そのメッシュ専用のマテリアル一覧を返す。呼び出し側がシーン全体の
/// マテリアル配列へ追記し、`material_index`をオフセットする責務を持つ。
pub fn load_obj(path: &Path) -> anyhow::Result<(Mesh, Vec<Material>)> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ..Default::default()
        },
    )
    .with_context(|| format!("failed to load obj file {}", path.display()))?;
    let materials = materials.with_context(|| format!("failed to load mtl for {}", path.display()))?;

    let extra = path
        .parent()
        .map(|dir| read_illum_extensions(dir, &materials))
        .unwrap_or_default();

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut triangles = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        let base_position = positions.len() as u32;
        for p in mesh.positions.chunks(3) {
            positions.push(Point3::from(glam::vec3(p[0], p[1], p[2])));
        }
        let base_normal = normals.len() as u32;
        for n in mesh.normals.chunks(3) {
            normals.push(Normal::from(glam::vec3(n[0], n[1], n[2])));
        }
        let base_uv = uvs.len() as u32;
        for uv in mesh.texcoords.chunks(2) {
            uvs.push(glam::vec2(uv[0], uv[1]));
        }

        let material_index = mesh.material_id.unwrap_or(0);
        for face in mesh.indices.chunks(3) {
            let positions_idx = [
                base_position + face[0],
                base_position + face[1],
                base_position + face[2],
            ];
            let normal_idx = if mesh.normal_indices.is_empty() {
                None
            } else {
                Some([
                    base_normal + mesh.normal_indices[triangle_offset(mesh, face)],
                    base_normal + mesh.normal_indices[triangle_offset(mesh, face) + 1],
                    base_normal + mesh.normal_indices[triangle_offset(mesh, face) + 2],
                ])
            };
            let uv_idx = if mesh.texcoord_indices.is_empty() {
                None
            } else {
                Some([
                    base_uv + mesh.texcoord_indices[triangle_offset(mesh, face)],
                    base_uv + mesh.texcoord_indices[triangle_offset(mesh, face) + 1],
                    base_uv + mesh.texcoord_indices[triangle_offset(mesh, face) + 2],
                ])
            };

            triangles.push(MeshTriangle {
                positions: positions_idx,
                normals: normal_idx,
                uvs: uv_idx,
                material_index,
            });
        }
    }

    let material_library = materials_to_library(&materials, &extra, path.parent().unwrap_or(Path::new(".")))?;

    Ok((Mesh::new(positions, normals, uvs, triangles), material_library))
}

fn triangle_offset(mesh: &tobj::Mesh, face: &[u32]) -> usize {
    // faceはmesh.indicesのスライスなので、そのままポインタ算術で元の添字位置を求める。
    let indices_ptr = mesh.indices.as_ptr() as usize;
    let face_ptr = face.as_ptr() as usize;
    (face_ptr - indices_ptr) / std::mem::size_of::<u32>()
}

/// `tobj`が表面化しない`illum`/`Ni`/`d`をMTLファイルから直接読み取る。
/// `materials`に実際に現れる名前だけを拾い、同名の無関係な`.mtl`に
/// 値を上書きされないようにする。
fn read_illum_extensions(dir: &Path, materials: &[tobj::Material]) -> HashMap<String, (i32, f32, f32)> {
    let known: std::collections::HashSet<&str> = materials.iter().map(|m| m.name.as_str()).collect();
    let mut out = HashMap::new();
    for entry in std::fs::read_dir(dir).into_iter().flatten().flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("mtl") {
            continue;
        }
        let Ok(text) = std::fs::read_to_string(&path) else {
            continue;
        };
        let mut current = None;
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("newmtl") => {
                    current = parts.next().filter(|name| known.contains(name)).map(str::to_string);
                }
                Some("illum") => {
                    if let (Some(name), Some(v)) = (&current, parts.next().and_then(|s| s.parse().ok())) {
                        out.entry(name.clone()).or_insert((0, 1.0, 1.0)).0 = v;
                    }
                }
                Some("Ni") => {
                    if let (Some(name), Some(v)) = (&current, parts.next().and_then(|s| s.parse().ok())) {
                        out.entry(name.clone()).or_insert((0, 1.0, 1.0)).1 = v;
                    }
                }
                Some("d") => {
                    if let (Some(name), Some(v)) = (&current, parts.next().and_then(|s| s.parse().ok())) {
                        out.entry(name.clone()).or_insert((0, 1.0, 1.0)).2 = v;
                    }
                }
                _ => {}
            }
        }
    }
    out
}

fn materials_to_library(
    materials: &[tobj::Material],
    extra: &HashMap<String, (i32, f32, f32)>,
    base_dir: &Path,
) -> anyhow::Result<Vec<Material>> {
    let mut out = Vec::with_capacity(materials.len());
    for m in materials {
        let (illum, ni, d) = extra.get(&m.name).copied().unwrap_or((0, 1.0, 1.0));
        let ka = m.ambient.map(glam::Vec3::from_array).unwrap_or(glam::Vec3::ZERO);
        let kd = m.diffuse.map(glam::Vec3::from_array).unwrap_or(glam::Vec3::ONE);
        let ks = m.specular.map(glam::Vec3::from_array).unwrap_or(glam::Vec3::ZERO);
        let ns = m.shininess.unwrap_or(0.0);
        let texture = match &m.diffuse_texture {
            Some(file) => Texture::load(base_dir.join(file)).ok(),
            None => None,
        };
        out.push(Material::General {
            ka,
            kd,
            ks,
            ns,
            ni,
            d,
            illum,
            texture,
        });
    }
    Ok(out)
}
