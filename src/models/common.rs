/// 3次元位置を表す構造体
///
/// 高度(z)は保持のみで、運動モデルでは更新されません。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position3D {
    pub x: f64, // m
    pub y: f64, // m
    pub z: f64, // m (altitude)
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// XY平面上の点までの2次元距離を計算
    pub fn distance_to_point(&self, point: &Point2D) -> f64 {
        (self.x - point.x).hypot(self.y - point.y)
    }

    /// XY平面上の投影
    pub fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// XY平面上の点（目標地点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64, // m
    pub y: f64, // m
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    use std::f64::consts::PI;

    /// 度をラジアンに変換
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * PI / 180.0
    }

    /// ラジアンを度に変換
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * 180.0 / PI
    }

    /// 方位角を0度〜360度（360は含まない）の範囲に正規化
    ///
    /// 既に範囲内の値はそのまま返します。
    pub fn normalize_heading(angle_deg: f64) -> f64 {
        let normalized = angle_deg.rem_euclid(360.0);
        // 微小な負値は丸めで360.0になる
        if normalized >= 360.0 { 0.0 } else { normalized }
    }

    /// 角度を-180度〜180度（-180は含まない）の範囲に正規化
    pub fn normalize_angle(angle_deg: f64) -> f64 {
        let mut normalized = angle_deg % 360.0;
        if normalized > 180.0 {
            normalized -= 360.0;
        } else if normalized <= -180.0 {
            normalized += 360.0;
        }
        normalized
    }

    /// 2つの角度の差を計算（-180度〜180度の範囲）
    ///
    /// `from_deg` から `to_deg` へ向かう最短の符号付き回転量を返します。
    pub fn angle_difference(from_deg: f64, to_deg: f64) -> f64 {
        normalize_angle(to_deg - from_deg)
    }

    /// ラジアン角を-π〜π（-πは含まない）の範囲に正規化
    pub fn normalize_radians(angle_rad: f64) -> f64 {
        let wrapped = (angle_rad + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
    }
}
