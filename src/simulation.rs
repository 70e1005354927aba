//! # Simulation モジュール
//!
//! 複数UAVの飛行シミュレーションの中核となるシミュレーションエンジンを提供します。
//!
//! このモジュールは、時間駆動シミュレーションのメインループを管理し、
//! コマンド列に従って各UAVへ目標地点を指示しながら、全UAVを同じ時間刻みで
//! 進めます。シミュレーション時刻は実時間とは無関係な離散的な累積値です。
//!
//! ## シミュレーション処理順序
//!
//! 各時間刻みにおいて、以下の順序で処理が実行されます：
//!
//! 1. **コマンド処理**: 発行時刻が現在時刻以下の未適用コマンドを全てキュー順に適用
//! 2. **UAV処理**: 全UAVをID昇順に1ティック更新
//! 3. **時刻更新**: 時刻を1刻み進める
//!
//! 終了条件は `時刻 > 終了時刻` です。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! let params = SimParams::from_file("SimParams.ini")?;
//! let commands = CommandQueue::from_file("SimCmds.txt")?;
//!
//! let mut engine = SimulationEngine::new(params, commands, 1)?;
//! engine.run();
//! engine.save_outputs("out")?;
//! ```

use crate::commands::{Command, CommandQueue};
use crate::models::*;
use crate::output::{OutputError, TrajectoryWriter};
use crate::scenario::{ScenarioError, SimParams};
use std::path::Path;
use tracing::{debug, info, trace};

/// 正常終了時に標準出力へ表示するメッセージ
pub const COMPLETION_MESSAGE: &str = "Simulation completed successfully.";

pub struct SimulationEngine {
    params: SimParams,
    commands: CommandQueue,
    /// 次に適用するコマンドの位置
    next_command: usize,
    step_count: u64,
    uavs: Vec<Uav>,
    verbose_level: u8,
}

impl SimulationEngine {
    /// シミュレーションエンジンを作成
    ///
    /// パラメータを検証し、不正な場合は `InvalidParams` を返します。
    /// 続いて全コマンドの対象UAV IDを検証し、範囲外のIDがあれば最初の1件を
    /// `ContractViolation` として返します。構築に成功した後の実行は失敗しません。
    ///
    /// # 引数
    ///
    /// * `params` - シミュレーションパラメータ
    /// * `commands` - 時刻順に整列済みのコマンド列
    /// * `verbose_level` - 詳細出力レベル
    pub fn new(
        params: SimParams,
        commands: CommandQueue,
        verbose_level: u8,
    ) -> Result<Self, SimulationError> {
        params.validate().map_err(SimulationError::InvalidParams)?;

        if let Some(command) = commands
            .iter()
            .find(|c| usize::try_from(c.uav_id).map_or(true, |id| id >= params.n_uav))
        {
            return Err(SimulationError::ContractViolation {
                command: *command,
                uav_count: params.n_uav,
            });
        }

        let initial_position = Position3D::new(params.x0, params.y0, params.z0);
        let uavs = (0..params.n_uav)
            .map(|id| Uav::new(id, initial_position, params.v0, params.azimuth, params.turn_radius))
            .collect();

        if verbose_level > 0 {
            info!("シミュレーションエンジンを初期化中...");
            info!("  UAV: {}機", params.n_uav);
            info!("  コマンド: {}件", commands.len());
        }

        Ok(Self {
            params,
            commands,
            next_command: 0,
            step_count: 0,
            uavs,
            verbose_level,
        })
    }

    /// 現在のシミュレーション時刻（秒）
    ///
    /// 刻みの累積加算による誤差を避けるため、ステップ数から求めます。
    pub fn current_time(&self) -> f64 {
        self.step_count as f64 * self.params.dt
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// 適用済みコマンド数
    pub fn applied_commands(&self) -> usize {
        self.next_command
    }

    pub fn is_finished(&self) -> bool {
        self.current_time() > self.params.time_limit
    }

    pub fn uavs(&self) -> &[Uav] {
        &self.uavs
    }

    pub fn uav(&self, id: usize) -> Option<&Uav> {
        self.uavs.get(id)
    }

    /// 終了時刻までシミュレーションを実行
    pub fn run(&mut self) {
        info!("=== シミュレーション実行開始 ===");

        while !self.is_finished() {
            self.step();

            if self.verbose_level > 2 {
                trace!("時刻: {:.2}秒 (ステップ: {})", self.current_time(), self.step_count);
            }

            if self.step_count % 100 == 0 && self.verbose_level > 0 {
                let progress = if self.params.time_limit > 0.0 {
                    (self.current_time() / self.params.time_limit).min(1.0) * 100.0
                } else {
                    100.0
                };
                info!(
                    "進行状況: {:.1}% ({:.1}/{:.1}秒)",
                    progress,
                    self.current_time(),
                    self.params.time_limit
                );
            }
        }

        info!("=== シミュレーション完了 ===");
        info!("終了時刻: {:.2}秒", self.current_time());
        info!("総ステップ数: {}", self.step_count);
        info!("適用コマンド数: {}/{}", self.next_command, self.commands.len());
    }

    /// 1ティック分の処理
    pub fn step(&mut self) {
        let current_time = self.current_time();

        self.process_commands(current_time);
        self.process_uavs(current_time);

        self.step_count += 1;
    }

    fn process_commands(&mut self, current_time: f64) {
        while let Some(command) = self.commands.get(self.next_command) {
            if command.time > current_time {
                break;
            }

            // 構築時にIDは検証済み
            if let Some(uav) = usize::try_from(command.uav_id)
                .ok()
                .and_then(|id| self.uavs.get_mut(id))
            {
                uav.set_target(Point2D::new(command.target_x, command.target_y));
            }

            if self.verbose_level > 1 {
                debug!(
                    "コマンド適用: 時刻 {:.2}秒 UAV{} -> ({:.2}, {:.2})",
                    current_time, command.uav_id, command.target_x, command.target_y
                );
            }

            self.next_command += 1;
        }
    }

    fn process_uavs(&mut self, current_time: f64) {
        let dt = self.params.dt;
        for uav in &mut self.uavs {
            uav.tick(dt, current_time);
        }
    }

    /// 各UAVの最終状態の概要
    pub fn summary(&self) -> Vec<UavSummary> {
        self.uavs
            .iter()
            .map(|uav| UavSummary {
                id: uav.get_id(),
                position: uav.get_position(),
                heading: uav.get_heading(),
                target: uav.get_target(),
                awaiting: uav.mode().is_awaiting(),
                samples: uav.trajectory().len(),
            })
            .collect()
    }

    /// 各UAVの航跡をフォルダに出力
    pub fn save_outputs<P: AsRef<Path>>(&self, folder: P) -> Result<(), OutputError> {
        let writer = TrajectoryWriter::new(folder.as_ref())?;
        for uav in &self.uavs {
            writer.write(uav.get_id(), uav.trajectory())?;
        }
        info!("航跡出力完了: {} ({}機)", folder.as_ref().display(), self.uavs.len());
        Ok(())
    }
}

/// UAVの最終状態
#[derive(Debug, Clone, PartialEq)]
pub struct UavSummary {
    pub id: usize,
    pub position: Position3D,
    pub heading: f64,
    pub target: Point2D,
    pub awaiting: bool,
    pub samples: usize,
}

/// シミュレーション構築エラー
#[derive(Debug)]
pub enum SimulationError {
    /// 実行できないパラメータ（時間刻みや旋回半径が正でない等）
    InvalidParams(ScenarioError),
    /// 範囲外のUAV IDを指すコマンド
    ContractViolation { command: Command, uav_count: usize },
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidParams(err) => write!(f, "パラメータが不正です: {}", err),
            SimulationError::ContractViolation { command, uav_count } => write!(
                f,
                "コマンドのUAV IDが範囲外です: 時刻 {} のコマンドが UAV{} を指定 (有効範囲 0..{})",
                command.time, command.uav_id, uav_count
            ),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::InvalidParams(err) => Some(err),
            SimulationError::ContractViolation { .. } => None,
        }
    }
}
