//! # uavsim
//!
//! 一定速度で飛行する複数UAVの2次元運動シミュレーション。
//!
//! 各UAVは外部から与えられる目標地点コマンドに向けて、旋回半径から決まる
//! 旋回レート制限の下で方位を変えながら飛行し、目標に到達すると旋回半径で
//! 目標を周回します。シミュレーションは固定時間刻みの時間駆動型です。

pub mod commands;
pub mod logging;
pub mod models;
pub mod output;
pub mod scenario;
pub mod simulation;
