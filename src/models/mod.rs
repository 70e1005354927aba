// 基本的なデータ型と数学ユーティリティ
pub mod common;

// エージェントの基本インターフェース（trait）定義
pub mod traits;

// 航跡記録
pub mod trajectory;

// UAVの運動モデル
pub mod uav;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use trajectory::{Trajectory, TrajectorySample};
pub use uav::{FlightMode, Uav, ARRIVAL_TOLERANCE};
