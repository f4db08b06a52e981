//! 座標系を表すマーカー構造体を定義するモジュール。

/// 座標系のマーカー用トレイト。
pub trait CoordinateSystem: std::fmt::Debug + Clone + Copy {}

/// ワールド座標系を表すマーカー構造体。
#[derive(Debug, Clone, Copy)]
pub struct World;
impl CoordinateSystem for World {}

/// シェーディング点のローカル座標系を表すマーカー構造体。
///
/// +zがシェーディング法線に一致する、マテリアルのサンプリング・評価に使われる座標系。
#[derive(Debug, Clone, Copy)]
pub struct Local;
impl CoordinateSystem for Local {}
