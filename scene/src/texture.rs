//! マテリアルのテクスチャ参照を表すモジュール。

use std::path::Path;

use anyhow::Context;

/// RGBのテクスチャ画像。uvはタイル状に繰り返し、画素の境界はクランプする。
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<glam::Vec3>,
}
impl Texture {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::ImageReader::open(path)
            .with_context(|| format!("failed to open texture {}", path.display()))?
            .decode()
            .with_context(|| format!("failed to decode texture {}", path.display()))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| glam::vec3(p[0] as f32 / 255.0, p[1] as f32 / 255.0, p[2] as f32 / 255.0))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// uv座標の色をサンプルする。floorで折り返し、添字をwidth-1/height-1にクランプする。
    pub fn sample(&self, uv: glam::Vec2) -> glam::Vec3 {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();
        let x = ((u * self.width as f32) as i64).clamp(0, self.width as i64 - 1) as u32;
        let y = (((1.0 - v) * self.height as f32) as i64).clamp(0, self.height as i64 - 1) as u32;
        self.pixels[(y * self.width + x) as usize]
    }
}
