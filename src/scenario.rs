use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// パラメータファイルで必須となるキー
pub const REQUIRED_KEYS: [&str; 9] = ["Dt", "N_uav", "R", "X0", "Y0", "Z0", "V0", "Az", "TimeLim"];

/// シミュレーションパラメータ
///
/// 全UAVが同じ初期値（位置・速さ・方位角・旋回半径）で生成されます。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimParams {
    /// 時間刻み（秒）
    #[serde(rename = "Dt")]
    pub dt: f64,
    /// UAVの機数
    #[serde(rename = "N_uav")]
    pub n_uav: usize,
    /// 旋回半径（m）
    #[serde(rename = "R")]
    pub turn_radius: f64,
    /// 初期X座標（m）
    #[serde(rename = "X0")]
    pub x0: f64,
    /// 初期Y座標（m）
    #[serde(rename = "Y0")]
    pub y0: f64,
    /// 初期高度（m）
    #[serde(rename = "Z0")]
    pub z0: f64,
    /// 速さ（m/s）
    #[serde(rename = "V0")]
    pub v0: f64,
    /// 初期方位角（度）
    #[serde(rename = "Az")]
    pub azimuth: f64,
    /// シミュレーション終了時刻（秒）
    #[serde(rename = "TimeLim")]
    pub time_limit: f64,
}

impl SimParams {
    /// パラメータファイルを読み込み
    ///
    /// 拡張子が `.yaml` / `.yml` の場合はYAMLとして、それ以外は
    /// `key = value` 形式として解析します。
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        // ファイル読み込み
        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let params = if is_yaml {
            serde_yaml::from_str(&contents)
                .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?
        } else {
            Self::parse_ini(&contents)?
        };

        params.validate()?;

        Ok(params)
    }

    /// `key = value` 形式のテキストを解析
    ///
    /// `=` を含まない行は無視し、同じキーは後の値で上書きします。
    /// 未知のキーは無視されます。検証は行いません。
    pub fn parse_ini(contents: &str) -> Result<Self, ScenarioError> {
        let mut values: HashMap<&str, f64> = HashMap::new();

        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let parsed = value.parse::<f64>().map_err(|_| ScenarioError::FormatError {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            values.insert(key, parsed);
        }

        let mut required = [0.0; REQUIRED_KEYS.len()];
        for (slot, key) in required.iter_mut().zip(REQUIRED_KEYS) {
            *slot = *values
                .get(key)
                .ok_or_else(|| ScenarioError::MissingKey(key.to_string()))?;
        }
        let [dt, n_uav, turn_radius, x0, y0, z0, v0, azimuth, time_limit] = required;

        if !(n_uav >= 0.0 && n_uav.fract() == 0.0 && n_uav <= u32::MAX as f64) {
            return Err(ScenarioError::ValidationError(format!(
                "N_uav must be a non-negative integer (got {})",
                n_uav
            )));
        }

        Ok(Self {
            dt,
            n_uav: n_uav as usize,
            turn_radius,
            x0,
            y0,
            z0,
            v0,
            azimuth,
            time_limit,
        })
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let values = [
            ("Dt", self.dt),
            ("R", self.turn_radius),
            ("X0", self.x0),
            ("Y0", self.y0),
            ("Z0", self.z0),
            ("V0", self.v0),
            ("Az", self.azimuth),
            ("TimeLim", self.time_limit),
        ];
        if let Some((key, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScenarioError::ValidationError(format!("{} must be finite", key)));
        }

        // 時間設定の検証
        if self.dt <= 0.0 {
            return Err(ScenarioError::ValidationError("Dt must be positive".to_string()));
        }
        if self.time_limit < 0.0 {
            return Err(ScenarioError::ValidationError("TimeLim must not be negative".to_string()));
        }

        // 旋回半径の検証
        if self.turn_radius <= 0.0 {
            return Err(ScenarioError::ValidationError("R must be positive".to_string()));
        }

        Ok(())
    }

    /// パラメータの概要を表示
    pub fn print_summary(&self) {
        println!("=== シミュレーション設定 ===");
        println!("時間刻み: {:.3}秒", self.dt);
        println!("最大時間: {:.1}秒", self.time_limit);
        println!("UAV数: {}機", self.n_uav);
        println!();

        println!("=== UAV初期値 ===");
        println!("位置: ({:.2}, {:.2}, {:.2})", self.x0, self.y0, self.z0);
        println!("速さ: {:.2} m/s", self.v0);
        println!("方位角: {:.2}度", self.azimuth);
        println!("旋回半径: {:.2} m", self.turn_radius);
    }
}

/// パラメータ読み込みエラー
#[derive(Debug)]
pub enum ScenarioError {
    FileNotFound(PathBuf),
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    FormatError { key: String, value: String },
    MissingKey(String),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::FileNotFound(path) => {
                write!(f, "パラメータファイルが見つかりません: {}", path.display())
            }
            ScenarioError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ScenarioError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ScenarioError::FormatError { key, value } => {
                write!(f, "数値として解析できません: {} = '{}'", key, value)
            }
            ScenarioError::MissingKey(key) => {
                write!(f, "必須キーがありません: {}", key)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}
