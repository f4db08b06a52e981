//! 波括弧区切り・空白トークン化のシーン記述ファイルを読み込むパーサ。

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use math::Point3;

use crate::geometry::Geometry;
use crate::light::Light;
use crate::material::Material;
use crate::scene::{Camera, Scene};
use crate::texture::Texture;

struct Tokens {
    items: Vec<String>,
    pos: usize,
}
impl Tokens {
    fn tokenize(text: &str) -> Self {
        let mut items = Vec::new();
        let mut chars = text.chars().peekable();
        while let Some(&c) = chars.peek() {
            match c {
                '#' => {
                    while let Some(&c) = chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                c if c.is_whitespace() => {
                    chars.next();
                }
                '{' | '}' => {
                    items.push(c.to_string());
                    chars.next();
                }
                '"' => {
                    chars.next();
                    let mut s = String::new();
                    for c in chars.by_ref() {
                        if c == '"' {
                            break;
                        }
                        s.push(c);
                    }
                    items.push(s);
                }
                _ => {
                    let mut s = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() || c == '{' || c == '}' || c == '"' || c == '#' {
                            break;
                        }
                        s.push(c);
                        chars.next();
                    }
                    items.push(s);
                }
            }
        }
        Tokens { items, pos: 0 }
    }

    fn next(&mut self) -> anyhow::Result<&str> {
        let tok = self
            .items
            .get(self.pos)
            .ok_or_else(|| anyhow::anyhow!("unexpected end of scene file"))?;
        self.pos += 1;
        Ok(tok.as_str())
    }

    fn peek(&self) -> Option<&str> {
        self.items.get(self.pos).map(|s| s.as_str())
    }

    fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let tok = self.next()?;
        if tok != expected {
            bail!("expected `{expected}`, found `{tok}`");
        }
        Ok(())
    }

    fn float(&mut self) -> anyhow::Result<f32> {
        self.next()?.parse().context("expected a number")
    }

    fn int(&mut self) -> anyhow::Result<i64> {
        self.next()?.parse().context("expected an integer")
    }

    fn vec3(&mut self) -> anyhow::Result<glam::Vec3> {
        Ok(glam::vec3(self.float()?, self.float()?, self.float()?))
    }

    fn string(&mut self) -> anyhow::Result<String> {
        Ok(self.next()?.to_string())
    }
}

/// シーンファイルを読み込み、`Scene`を構築する。
pub fn parse_scene_file(path: impl AsRef<Path>) -> anyhow::Result<Scene> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scene file {}", path.display()))?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut tokens = Tokens::tokenize(&text);
    let mut camera = None;
    let mut background = glam::Vec3::ZERO;
    let mut ambient = glam::Vec3::ZERO;
    let mut lights = Vec::new();
    let mut materials = Vec::new();
    let mut root = None;

    while let Some(tok) = tokens.peek() {
        match tok {
            "PerspectiveCamera" => {
                tokens.next()?;
                camera = Some(parse_perspective_camera(&mut tokens)?);
            }
            "LensCamera" => {
                tokens.next()?;
                camera = Some(parse_lens_camera(&mut tokens)?);
            }
            "Background" => {
                tokens.next()?;
                tokens.expect("{")?;
                tokens.expect("color")?;
                background = tokens.vec3()?;
                tokens.expect("ambient")?;
                ambient = tokens.vec3()?;
                tokens.expect("}")?;
            }
            "Lights" => {
                tokens.next()?;
                lights = parse_lights(&mut tokens, &base_dir, &mut materials)?;
            }
            "Materials" => {
                tokens.next()?;
                materials = parse_materials(&mut tokens, &base_dir)?;
            }
            "Group" => {
                tokens.next()?;
                root = Some(parse_group(&mut tokens, &base_dir, &mut materials)?);
            }
            other => bail!("unexpected top-level token `{other}`"),
        }
    }

    Ok(Scene {
        camera: camera.context("scene file is missing a camera block")?,
        lights,
        materials,
        root: root.context("scene file is missing a Group block")?,
        background,
        ambient,
    })
}

#[allow(clippy::type_complexity)]
fn parse_camera_common(
    tokens: &mut Tokens,
) -> anyhow::Result<(Point3<math::World>, glam::Vec3, glam::Vec3, u32, u32, f32, f32)> {
    tokens.expect("{")?;
    tokens.expect("center")?;
    let center = Point3::from(tokens.vec3()?);
    tokens.expect("direction")?;
    let direction = tokens.vec3()?;
    tokens.expect("up")?;
    let up = tokens.vec3()?;
    tokens.expect("angle")?;
    let angle_deg = tokens.float()?;
    tokens.expect("width")?;
    let width = tokens.int()? as u32;
    tokens.expect("height")?;
    let height = tokens.int()? as u32;
    tokens.expect("gamma")?;
    let gamma = tokens.float()?;
    Ok((center, direction, up, width, height, angle_deg.to_radians(), gamma))
}

fn parse_perspective_camera(tokens: &mut Tokens) -> anyhow::Result<Camera> {
    let (center, direction, up, width, height, angle, gamma) = parse_camera_common(tokens)?;
    tokens.expect("}")?;
    Ok(Camera::perspective(center, direction, up, width, height, angle, gamma))
}

fn parse_lens_camera(tokens: &mut Tokens) -> anyhow::Result<Camera> {
    let (center, direction, up, width, height, angle, gamma) = parse_camera_common(tokens)?;
    tokens.expect("aperture")?;
    let aperture = tokens.float()?;
    tokens.expect("focal")?;
    let focal = tokens.float()?;
    tokens.expect("}")?;
    Ok(Camera::thin_lens(
        center, direction, up, width, height, angle, aperture, focal, gamma,
    ))
}

fn parse_lights(tokens: &mut Tokens, base_dir: &Path, materials: &mut Vec<Material>) -> anyhow::Result<Vec<Light>> {
    tokens.expect("{")?;
    tokens.expect("numLights")?;
    let count = tokens.int()?;
    let mut lights = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let kind = tokens.string()?;
        tokens.expect("{")?;
        let light = match kind.as_str() {
            "PointLight" => {
                tokens.expect("position")?;
                let position = Point3::from(tokens.vec3()?);
                tokens.expect("power")?;
                let power = tokens.vec3()?;
                Light::Point { position, power }
            }
            "DirectedPointLight" => {
                tokens.expect("position")?;
                let position = Point3::from(tokens.vec3()?);
                tokens.expect("direction")?;
                let direction = tokens.vec3()?.normalize();
                tokens.expect("angle")?;
                let angle = tokens.float()?.to_radians();
                tokens.expect("power")?;
                let power = tokens.vec3()?;
                Light::DirectedPoint {
                    position,
                    direction,
                    power,
                    half_angle: angle,
                }
            }
            "AreaLight" => {
                let geometry = parse_group(tokens, base_dir, materials)?;
                tokens.expect("power")?;
                let power = tokens.vec3()?;
                Light::Area {
                    geometry: Box::new(geometry),
                    power,
                }
            }
            other => bail!("unknown light type `{other}`"),
        };
        tokens.expect("}")?;
        lights.push(light);
    }
    tokens.expect("}")?;
    Ok(lights)
}

fn parse_texture_opt(tokens: &mut Tokens, base_dir: &Path) -> anyhow::Result<Option<Texture>> {
    match tokens.peek() {
        Some("texture") | Some("map_Kd") => {
            tokens.next()?;
            let file = tokens.string()?;
            Ok(Some(Texture::load(base_dir.join(file))?))
        }
        _ => Ok(None),
    }
}

fn parse_materials(tokens: &mut Tokens, base_dir: &Path) -> anyhow::Result<Vec<Material>> {
    tokens.expect("{")?;
    tokens.expect("numMaterials")?;
    let count = tokens.int()?;
    let mut materials = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let kind = tokens.string()?;
        tokens.expect("{")?;
        let material = match kind.as_str() {
            "LambertMaterial" => {
                tokens.expect("color")?;
                let albedo = tokens.vec3()?;
                let texture = parse_texture_opt(tokens, base_dir)?;
                Material::Lambert { albedo, texture }
            }
            "PhongMaterial" => {
                tokens.expect("diffuseColor")?;
                let kd = tokens.vec3()?;
                tokens.expect("specularColor")?;
                let ks = tokens.vec3()?;
                tokens.expect("shininess")?;
                let shininess = tokens.float()?;
                let texture = parse_texture_opt(tokens, base_dir)?;
                Material::Phong {
                    kd,
                    ks,
                    shininess,
                    texture,
                }
            }
            "MirrorMaterial" => {
                tokens.expect("color")?;
                let tint = tokens.vec3()?;
                let texture = parse_texture_opt(tokens, base_dir)?;
                Material::Specular { tint, texture }
            }
            "TransparentMaterial" => {
                tokens.expect("color")?;
                let tint = tokens.vec3()?;
                tokens.expect("index")?;
                let ior = tokens.float()?;
                let texture = parse_texture_opt(tokens, base_dir)?;
                Material::Transparent { tint, ior, texture }
            }
            "GenericMaterial" => {
                tokens.expect("Ka")?;
                let ka = tokens.vec3()?;
                tokens.expect("Kd")?;
                let kd = tokens.vec3()?;
                tokens.expect("Ks")?;
                let ks = tokens.vec3()?;
                tokens.expect("Ns")?;
                let ns = tokens.float()?;
                tokens.expect("Ni")?;
                let ni = tokens.float()?;
                tokens.expect("d")?;
                let d = tokens.float()?;
                tokens.expect("illum")?;
                let illum = tokens.int()? as i32;
                let texture = parse_texture_opt(tokens, base_dir)?;
                Material::General {
                    ka,
                    kd,
                    ks,
                    ns,
                    ni,
                    d,
                    illum,
                    texture,
                }
            }
            other => bail!("unknown material type `{other}`"),
        };
        tokens.expect("}")?;
        materials.push(material);
    }
    tokens.expect("}")?;
    Ok(materials)
}

/// `numObjects`はジオメトリの数だけを数え、`MaterialIndex`の切り替えは数に入らない。
fn parse_group(tokens: &mut Tokens, base_dir: &Path, materials: &mut Vec<Material>) -> anyhow::Result<Geometry> {
    tokens.expect("{")?;
    tokens.expect("numObjects")?;
    let count = tokens.int()?;
    let mut current_material = 0usize;
    let mut objects = Vec::new();
    let mut parsed = 0i64;
    while parsed < count {
        match tokens.peek() {
            Some("MaterialIndex") => {
                tokens.next()?;
                current_material = tokens.int()? as usize;
            }
            _ => {
                let geom = parse_single_geometry(tokens, base_dir, materials)?;
                objects.push(attach_material(geom, current_material));
                parsed += 1;
            }
        }
    }
    tokens.expect("}")?;
    Ok(Geometry::Group(objects))
}

/// MaterialIndexを直接子に持たないジオメトリにはmaterial_indexが割り当て済みとみなし、
/// Mesh/Group/Transform以外の末端ジオメトリにのみ現在のマテリアルを反映する。
fn attach_material(geom: Geometry, material_index: usize) -> Geometry {
    match geom {
        Geometry::Sphere { center, radius, .. } => Geometry::Sphere {
            center,
            radius,
            material_index,
        },
        Geometry::Plane { normal, offset, .. } => Geometry::Plane {
            normal,
            offset,
            material_index,
        },
        Geometry::Rectangle { min, max, .. } => Geometry::Rectangle {
            min,
            max,
            material_index,
        },
        Geometry::Triangle { vertices, .. } => Geometry::Triangle {
            vertices,
            material_index,
        },
        other => other,
    }
}

fn parse_single_geometry(tokens: &mut Tokens, base_dir: &Path, materials: &mut Vec<Material>) -> anyhow::Result<Geometry> {
    let kind = tokens.string()?;
    tokens.expect("{")?;
    let geom = match kind.as_str() {
        "Sphere" => {
            tokens.expect("center")?;
            let center = Point3::from(tokens.vec3()?);
            tokens.expect("radius")?;
            let radius = tokens.float()?;
            Geometry::Sphere {
                center,
                radius,
                material_index: 0,
            }
        }
        "Plane" => {
            tokens.expect("normal")?;
            let normal = math::Normal::from(tokens.vec3()?.normalize());
            tokens.expect("offset")?;
            let offset = tokens.float()?;
            Geometry::Plane {
                normal,
                offset,
                material_index: 0,
            }
        }
        "Rectangle" => {
            tokens.expect("a")?;
            let a = tokens.vec3()?;
            tokens.expect("b")?;
            let b = tokens.vec3()?;
            Geometry::Rectangle {
                min: Point3::from(a.min(b)),
                max: Point3::from(a.max(b)),
                material_index: 0,
            }
        }
        "Triangle" => {
            tokens.expect("vertex0")?;
            let v0 = Point3::from(tokens.vec3()?);
            tokens.expect("vertex1")?;
            let v1 = Point3::from(tokens.vec3()?);
            tokens.expect("vertex2")?;
            let v2 = Point3::from(tokens.vec3()?);
            Geometry::Triangle {
                vertices: [v0, v1, v2],
                material_index: 0,
            }
        }
        "TriangleMesh" => {
            tokens.expect("obj_file")?;
            let file = tokens.string()?;
            let path: PathBuf = base_dir.join(file);
            let (mut mesh, extra_materials) = crate::obj_loader::load_obj(&path)?;
            let offset = materials.len();
            materials.extend(extra_materials);
            for tri in mesh.triangles.iter_mut() {
                tri.material_index += offset;
            }
            Geometry::Mesh(mesh)
        }
        "Transform" => {
            let mut matrix = glam::Mat4::IDENTITY;
            loop {
                match tokens.peek() {
                    Some("Scale") => {
                        tokens.next()?;
                        let v = tokens.vec3()?;
                        matrix *= glam::Mat4::from_scale(v);
                    }
                    Some("UniformScale") => {
                        tokens.next()?;
                        let s = tokens.float()?;
                        matrix *= glam::Mat4::from_scale(glam::Vec3::splat(s));
                    }
                    Some("Translate") => {
                        tokens.next()?;
                        let v = tokens.vec3()?;
                        matrix *= glam::Mat4::from_translation(v);
                    }
                    Some("XRotate") => {
                        tokens.next()?;
                        let a = tokens.float()?.to_radians();
                        matrix *= glam::Mat4::from_rotation_x(a);
                    }
                    Some("YRotate") => {
                        tokens.next()?;
                        let a = tokens.float()?.to_radians();
                        matrix *= glam::Mat4::from_rotation_y(a);
                    }
                    Some("ZRotate") => {
                        tokens.next()?;
                        let a = tokens.float()?.to_radians();
                        matrix *= glam::Mat4::from_rotation_z(a);
                    }
                    Some("Rotate") => {
                        tokens.next()?;
                        let axis = tokens.vec3()?.normalize();
                        let angle = tokens.float()?.to_radians();
                        matrix *= glam::Mat4::from_axis_angle(axis, angle);
                    }
                    Some("Matrix4f") => {
                        tokens.next()?;
                        // 16個の数値は列0の4行、列1の4行…の順に並ぶ(列優先)。
                        let mut m = [0.0_f32; 16];
                        for v in m.iter_mut() {
                            *v = tokens.float()?;
                        }
                        matrix *= glam::Mat4::from_cols_array(&m);
                    }
                    _ => break,
                }
            }
            let child = parse_single_geometry(tokens, base_dir, materials)?;
            Geometry::transform(child, matrix)
        }
        other => bail!("unknown geometry type `{other}`"),
    };
    tokens.expect("}")?;
    Ok(geom)
}
