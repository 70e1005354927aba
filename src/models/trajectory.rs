/// 航跡サンプル
///
/// 1ティックごとに1件記録される (時刻, x, y, 方位角) の組です。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// シミュレーション時刻（秒）
    pub time: f64,
    /// X座標（m）
    pub x: f64,
    /// Y座標（m）
    pub y: f64,
    /// 方位角（度、0〜360）
    pub heading: f64,
}

impl TrajectorySample {
    pub fn new(time: f64, x: f64, y: f64, heading: f64) -> Self {
        Self { time, x, y, heading }
    }
}

/// 航跡記録
///
/// 追記専用の時系列ログで、UAVが単独で所有します。
/// 一度追加されたサンプルは変更されません。
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// サンプルを末尾に追加
    pub fn record(&mut self, sample: TrajectorySample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 記録済みサンプル（時刻順）
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectorySample> {
        self.samples.iter()
    }
}

impl From<Vec<TrajectorySample>> for Trajectory {
    fn from(samples: Vec<TrajectorySample>) -> Self {
        Self { samples }
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectorySample;
    type IntoIter = std::slice::Iter<'a, TrajectorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
