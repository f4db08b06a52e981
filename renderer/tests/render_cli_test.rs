//! レンダラーCLIのエンドツーエンドテスト。

use std::path::PathBuf;
use std::process::Command;

const LIT_FLOOR_SCENE: &str = r#"
PerspectiveCamera {
  center 0 3 -3
  direction 0 -1 1
  up 0 1 0
  angle 60
  width 16
  height 16
  gamma 2.2
}
Background { color 0 0 0 ambient 0.02 0.02 0.02 }
Lights { numLights 1
  AreaLight {
    { numObjects 1
      MaterialIndex 0
      Rectangle { a -1 5 -1 b 1 5 1 }
    }
    power 200 200 200
  }
}
Materials { numMaterials 1
  LambertMaterial { color 0.8 0.8 0.8 }
}
Group { numObjects 1
  MaterialIndex 0
  Rectangle { a -5 0 -5 b 5 0 5 }
}
"#;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("renderer_cli_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn lit_floor_under_area_light_lights_the_center_pixel() {
    let dir = temp_dir();
    let scene_path = dir.join("lit_floor.txt");
    std::fs::write(&scene_path, LIT_FLOOR_SCENE).unwrap();
    let output_path = dir.join("lit_floor.bmp");

    let status = Command::new(env!("CARGO_BIN_EXE_renderer"))
        .arg(&scene_path)
        .arg("--output")
        .arg(&output_path)
        .args(["--photon-num", "20000"])
        .args(["--iter", "10"])
        .args(["--depth", "4"])
        .args(["--ray-num", "4"])
        .args(["--radius", "1.0"])
        .args(["--seed", "1"])
        .status()
        .expect("failed to run renderer binary");
    assert!(status.success());

    let img = image::open(&output_path).expect("renderer should produce a decodable bmp").to_rgb8();
    let (width, height) = img.dimensions();
    assert_eq!((width, height), (16, 16));

    let center = img.get_pixel(width / 2, height / 2);
    assert!(
        center[1] as f32 / 255.0 > 0.05,
        "center pixel should show the floor lit by the overhead area light, got {center:?}"
    );

    std::fs::remove_file(&scene_path).ok();
    std::fs::remove_file(&output_path).ok();
}

#[test]
fn malformed_scene_file_exits_with_failure() {
    let dir = temp_dir();
    let scene_path = dir.join("broken.txt");
    std::fs::write(&scene_path, "PerspectiveCamera { center 0 0 0 }").unwrap();
    let output_path = dir.join("broken.bmp");

    let status = Command::new(env!("CARGO_BIN_EXE_renderer"))
        .arg(&scene_path)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("failed to run renderer binary");
    assert!(!status.success());

    std::fs::remove_file(&scene_path).ok();
}
