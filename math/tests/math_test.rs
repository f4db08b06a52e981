//! 座標変換・反射・基底構築に関する性質のテスト。

use math::{Local, Normal, Point3, Transform, Vector3, World, reflect, generate_vertical};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec_approx(a: glam::Vec3, b: glam::Vec3, eps: f32) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

#[test]
fn reflect_is_its_own_inverse() {
    let directions = [
        glam::vec3(1.0, 0.0, 0.0),
        glam::vec3(0.3, 0.7, 0.2).normalize(),
        glam::vec3(-0.5, 0.5, 0.9).normalize(),
    ];
    let n = glam::vec3(0.1, 1.0, 0.2).normalize();

    for i in directions {
        let r = reflect(i, n);
        let back = reflect(r, n);
        assert!(vec_approx(back, i, 1e-5), "reflect(reflect(i,n),n) should equal i, got {back:?} vs {i:?}");
    }
}

#[test]
fn generate_vertical_is_orthogonal_and_unit() {
    for v in [
        glam::vec3(1.0, 0.0, 0.0),
        glam::vec3(0.0, 1.0, 0.0),
        glam::vec3(0.0, 0.0, 1.0),
        glam::vec3(0.3, 0.6, 0.74).normalize(),
    ] {
        let x = generate_vertical(v);
        assert!(approx(x.length(), 1.0, 1e-5));
        assert!(approx(x.dot(v), 0.0, 1e-5));
    }
}

#[test]
fn shading_frame_is_orthonormal() {
    let normal: Normal<World> = Normal::new(0.2, 0.9, 0.3);
    let to_local: Transform<World, Local> = Transform::from_shading_normal(&normal);
    let to_world = to_local.inverse();

    let local_x = Vector3::<Local>::new(1.0, 0.0, 0.0);
    let local_y = Vector3::<Local>::new(0.0, 1.0, 0.0);
    let local_z = Vector3::<Local>::new(0.0, 0.0, 1.0);

    let wx = (&to_world * local_x).to_vec3();
    let wy = (&to_world * local_y).to_vec3();
    let wz = (&to_world * local_z).to_vec3();

    assert!(approx(wx.length(), 1.0, 1e-5));
    assert!(approx(wy.length(), 1.0, 1e-5));
    assert!(approx(wz.length(), 1.0, 1e-5));
    assert!(approx(wx.dot(wy), 0.0, 1e-5));
    assert!(approx(wy.dot(wz), 0.0, 1e-5));
    assert!(approx(wx.dot(wz), 0.0, 1e-5));

    // +zはシェーディング法線に一致する。
    assert!(vec_approx(wz, normal.to_vec3(), 1e-5));
}

#[test]
fn transform_and_inverse_round_trip() {
    let to_local: Transform<World, Local> = Transform::from_shading_normal(&Normal::new(0.0, 0.0, 1.0));
    let to_world = to_local.inverse();

    let world_point = Point3::<World>::new(1.0, 2.0, 3.0);
    let local = &to_local * world_point;
    let back = &to_world * local;

    assert!(vec_approx(back.to_vec3(), world_point.to_vec3(), 1e-4));
}

#[test]
fn vector_componentwise_multiply_is_multiplication_not_division() {
    let a = Vector3::<World>::new(2.0, 3.0, 4.0);
    let b = Vector3::<World>::new(5.0, 6.0, 7.0);
    let product = (a * b).to_vec3();
    assert!(vec_approx(product, glam::vec3(10.0, 18.0, 28.0), 1e-6));
}
