use crate::models::common::{Point2D, Position3D};

/// 全てのシミュレーションエージェントが実装する基本インターフェース
pub trait IAgent {
    /// 1ティックの処理実行
    fn tick(&mut self, dt: f64, current_time: f64);

    /// エージェントIDの取得
    fn get_id(&self) -> usize;
}

/// 移動可能なエージェントのインターフェース
pub trait IMovable {
    /// 現在位置の取得
    fn get_position(&self) -> Position3D;

    /// 現在の方位角（度）の取得
    fn get_heading(&self) -> f64;

    /// 速さ（m/s）の取得
    fn get_speed(&self) -> f64;
}

/// 外部から目標地点を指示できるエージェントのインターフェース
pub trait ISteerable {
    /// 目標地点の設定
    fn set_target(&mut self, target: Point2D);

    /// 現在の目標地点の取得
    fn get_target(&self) -> Point2D;
}
