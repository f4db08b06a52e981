//! シーン記述ファイルのパースに関するテスト。

use scene::{Geometry, Light};

fn write_scene(name: &str, text: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("scene_parser_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn count_group_objects(geom: &Geometry) -> usize {
    match geom {
        Geometry::Group(children) => children.len(),
        _ => 1,
    }
}

const CANONICAL_SCENE: &str = r#"
PerspectiveCamera {
  center 0 0 -5
  direction 0 0 1
  up 0 1 0
  angle 60
  width 64
  height 64
  gamma 2.2
}
Background { color 0 0 0 ambient 0.1 0.1 0.1 }
Lights { numLights 1
  PointLight { position 0 5 0 power 10 10 10 }
}
Materials { numMaterials 2
  LambertMaterial { color 0.8 0.2 0.2 }
  MirrorMaterial { color 1 1 1 }
}
Group { numObjects 3
  MaterialIndex 0
  Sphere { center 0 0 0 radius 1 }
  MaterialIndex 1
  Sphere { center 3 0 0 radius 1 }
  Plane { normal 0 1 0 offset -1 }
}
"#;

#[test]
fn canonical_scene_reports_expected_counts() {
    let path = write_scene("canonical.txt", CANONICAL_SCENE);
    let scene = scene::parse_scene_file(&path).expect("canonical scene should parse");

    assert_eq!(scene.lights.len(), 1);
    assert_eq!(scene.materials.len(), 2);
    assert_eq!(count_group_objects(&scene.root), 3);
    assert!(matches!(scene.lights[0], Light::Point { .. }));
}

#[test]
fn syntax_error_on_bad_scene_is_reported_as_an_error() {
    let bad = CANONICAL_SCENE.replacen("numObjects 3", "numObjects 1", 1);
    let path = write_scene("bad.txt", &bad);
    let result = scene::parse_scene_file(&path);
    assert!(result.is_err(), "a miscounted numObjects must be a parse error, not silently accepted");
}
