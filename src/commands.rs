//! # Commands モジュール
//!
//! UAVへの目標地点指示（コマンド）の読み込みと時刻順整列を提供します。
//!
//! コマンドファイルは1行1件の空白区切りテキストです。
//!
//! ```text
//! # time id x y
//! 0   0  100.0  0.0
//! 2.5 1  -40.0  60.0
//! ```
//!
//! 読み込み後は発行時刻の昇順に安定ソートされ、同時刻のコマンドは
//! ファイル内の順序を保ちます。構築後は変更されません。

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 目標地点指示コマンド
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// 発行時刻（秒）
    pub time: f64,
    /// 対象UAVのID（範囲外の値はシミュレーション構築時に検出）
    pub uav_id: i64,
    /// 目標X座標（m）
    pub target_x: f64,
    /// 目標Y座標（m）
    pub target_y: f64,
}

impl Command {
    pub fn new(time: f64, uav_id: i64, target_x: f64, target_y: f64) -> Self {
        Self { time, uav_id, target_x, target_y }
    }

    /// 1行分のテキストを解析
    fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let time = fields.next()?.parse::<f64>().ok()?;
        let uav_id = fields.next()?.parse::<i64>().ok()?;
        let target_x = fields.next()?.parse::<f64>().ok()?;
        let target_y = fields.next()?.parse::<f64>().ok()?;

        if fields.next().is_some() || !(time.is_finite() && target_x.is_finite() && target_y.is_finite()) {
            return None;
        }

        Some(Self::new(time, uav_id, target_x, target_y))
    }
}

/// 時刻順に整列済みのコマンド列
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    /// コマンド列を発行時刻の昇順に安定ソートして構築
    ///
    /// 同時刻のコマンドは入力順を保ちます。
    pub fn new(mut commands: Vec<Command>) -> Self {
        commands.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { commands }
    }

    /// コマンドファイルを読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CommandError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| CommandError::IoError(path.to_path_buf(), e))?;

        let queue = Self::parse_str(&contents).map_err(|e| match e {
            CommandError::FormatError { line_number, line, .. } => CommandError::FormatError {
                path: Some(path.to_path_buf()),
                line_number,
                line,
            },
            other => other,
        })?;

        debug!("コマンドファイル読み込み完了: {} ({}件)", path.display(), queue.len());
        Ok(queue)
    }

    /// テキストからコマンド列を解析
    ///
    /// 空行と`#`で始まる行は読み飛ばします。
    pub fn parse_str(contents: &str) -> Result<Self, CommandError> {
        let mut commands = Vec::new();

        for (index, raw_line) in contents.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let command = Command::parse_line(line).ok_or_else(|| CommandError::FormatError {
                path: None,
                line_number: index + 1,
                line: raw_line.to_string(),
            })?;
            commands.push(command);
        }

        Ok(Self::new(commands))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// 最後のコマンドの発行時刻
    pub fn last_time(&self) -> Option<f64> {
        self.commands.last().map(|c| c.time)
    }
}

/// コマンド読み込みエラー
#[derive(Debug)]
pub enum CommandError {
    IoError(PathBuf, std::io::Error),
    FormatError {
        path: Option<PathBuf>,
        line_number: usize,
        line: String,
    },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::IoError(path, err) => {
                write!(f, "コマンドファイルを開けません {}: {}", path.display(), err)
            }
            CommandError::FormatError { path: Some(path), line_number, line } => {
                write!(f, "コマンド書式エラー {}:{}: '{}' (time id x y が必要)", path.display(), line_number, line)
            }
            CommandError::FormatError { path: None, line_number, line } => {
                write!(f, "コマンド書式エラー {}行目: '{}' (time id x y が必要)", line_number, line)
            }
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::IoError(_, err) => Some(err),
            CommandError::FormatError { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_sorts_by_time() {
        let queue = CommandQueue::parse_str("5 0 1 1\n0 1 2 2\n2.5 0 3 3\n").unwrap();
        let times: Vec<f64> = queue.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0.0, 2.5, 5.0]);
        assert_eq!(queue.get(0), Some(&Command::new(0.0, 1, 2.0, 2.0)));
        assert_eq!(queue.last_time(), Some(5.0));
    }

    #[test]
    fn test_equal_times_keep_input_order() {
        let queue = CommandQueue::parse_str("3 0 10 10\n1 0 0 0\n3 1 20 20\n3 0 30 30\n").unwrap();
        let targets: Vec<(i64, f64)> = queue.iter().map(|c| (c.uav_id, c.target_x)).collect();
        assert_eq!(targets, vec![(0, 0.0), (0, 10.0), (1, 20.0), (0, 30.0)]);
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let queue = CommandQueue::parse_str("# time id x y\n\n   \n0 0 1 2\n").unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_negative_id_is_parsed() {
        let queue = CommandQueue::parse_str("0 -1 5 5").unwrap();
        assert_eq!(queue.get(0).map(|c| c.uav_id), Some(-1));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        for bad in ["0 0 1", "0 zero 1 2", "0 1.5 1 2", "0 0 1 2 extra", "nan 0 1 2"] {
            let input = format!("0 0 1 1\n{}\n", bad);
            match CommandQueue::parse_str(&input) {
                Err(CommandError::FormatError { line_number, line, .. }) => {
                    assert_eq!(line_number, 2);
                    assert_eq!(line, bad);
                }
                other => panic!("expected format error for '{}', got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1 0 50 0").unwrap();
        writeln!(file, "0 0 -50 0").unwrap();

        let queue = CommandQueue::from_file(file.path()).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(0).map(|c| c.target_x), Some(-50.0));
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(CommandQueue::from_file(&missing), Err(CommandError::IoError(..))));

        let bad = dir.path().join("bad.txt");
        fs::write(&bad, "0 0 1 1\noops\n").unwrap();
        match CommandQueue::from_file(&bad) {
            Err(CommandError::FormatError { path, line_number, .. }) => {
                assert_eq!(path.as_deref(), Some(bad.as_path()));
                assert_eq!(line_number, 2);
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }
}
