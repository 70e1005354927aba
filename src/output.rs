//! # Output モジュール
//!
//! UAVごとの航跡ファイルの書き出しと読み込みを提供します。
//!
//! 出力先フォルダに `UAV{id}.txt` を1機につき1ファイル作成し、
//! 先頭にヘッダ行 `time x y azimuth`、以降1サンプル1行で
//! 小数点以下2桁の固定小数点表記を書き出します。
//!
//! ```text
//! time x y azimuth
//! 0.00 1.00 0.05 2.87
//! 1.00 2.00 0.10 2.90
//! ```

use crate::models::{Trajectory, TrajectorySample};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 航跡ファイルのヘッダ行
pub const TRAJECTORY_HEADER: &str = "time x y azimuth";

/// UAV IDに対応する航跡ファイル名
pub fn trajectory_file_name(uav_id: usize) -> String {
    format!("UAV{}.txt", uav_id)
}

/// 航跡ファイルの書き出し
pub struct TrajectoryWriter {
    folder: PathBuf,
}

impl TrajectoryWriter {
    /// 出力先フォルダを指定して作成
    ///
    /// フォルダが存在しない場合は作成します。
    pub fn new(folder: &Path) -> Result<Self, OutputError> {
        fs::create_dir_all(folder).map_err(|e| OutputError::IoError(folder.to_path_buf(), e))?;
        Ok(Self {
            folder: folder.to_path_buf(),
        })
    }

    /// 1機分の航跡を書き出し、作成したファイルのパスを返す
    pub fn write(&self, uav_id: usize, trajectory: &Trajectory) -> Result<PathBuf, OutputError> {
        let path = self.folder.join(trajectory_file_name(uav_id));
        let io_error = |e| OutputError::IoError(path.clone(), e);

        let mut writer = BufWriter::new(File::create(&path).map_err(io_error)?);
        writeln!(writer, "{}", TRAJECTORY_HEADER).map_err(io_error)?;
        for sample in trajectory {
            writeln!(
                writer,
                "{:.2} {:.2} {:.2} {:.2}",
                sample.time, sample.x, sample.y, sample.heading
            )
            .map_err(io_error)?;
        }
        writer.flush().map_err(io_error)?;

        debug!("航跡ファイル出力: {} ({}件)", path.display(), trajectory.len());
        Ok(path)
    }
}

/// 航跡ファイルを読み込み
///
/// 先頭のヘッダ行を読み飛ばし、空行は無視します。
pub fn read_trajectory_file<P: AsRef<Path>>(path: P) -> Result<Trajectory, OutputError> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).map_err(|e| OutputError::IoError(path.to_path_buf(), e))?;

    let mut samples = Vec::new();
    for (index, line) in contents.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<f64> = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .map_err(|_| OutputError::FormatError(path.to_path_buf(), index + 1))?;
        let &[time, x, y, heading] = values.as_slice() else {
            return Err(OutputError::FormatError(path.to_path_buf(), index + 1));
        };
        samples.push(TrajectorySample::new(time, x, y, heading));
    }

    Ok(Trajectory::from(samples))
}

/// 航跡出力エラー
#[derive(Debug)]
pub enum OutputError {
    IoError(PathBuf, std::io::Error),
    FormatError(PathBuf, usize),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::IoError(path, err) => {
                write!(f, "航跡ファイル入出力エラー {}: {}", path.display(), err)
            }
            OutputError::FormatError(path, line_number) => {
                write!(f, "航跡ファイル書式エラー {}:{}", path.display(), line_number)
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::IoError(_, err) => Some(err),
            OutputError::FormatError(..) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trajectory() -> Trajectory {
        Trajectory::from(vec![
            TrajectorySample::new(0.0, 0.998_6, 0.049_99, 2.866),
            TrajectorySample::new(1.0, 1.997, -0.1, 359.996),
        ])
    }

    #[test]
    fn test_write_format() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TrajectoryWriter::new(dir.path()).unwrap();
        let path = writer.write(4, &sample_trajectory()).unwrap();

        assert_eq!(path, dir.path().join("UAV4.txt"));
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "time x y azimuth\n0.00 1.00 0.05 2.87\n1.00 2.00 -0.10 360.00\n"
        );
    }

    #[test]
    fn test_write_empty_trajectory_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TrajectoryWriter::new(dir.path()).unwrap();
        let path = writer.write(0, &Trajectory::new()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "time x y azimuth\n");
    }

    #[test]
    fn test_writer_creates_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("runs").join("001");
        let writer = TrajectoryWriter::new(&nested).unwrap();
        writer.write(1, &sample_trajectory()).unwrap();
        assert!(nested.join("UAV1.txt").exists());
    }

    #[test]
    fn test_read_back_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TrajectoryWriter::new(dir.path()).unwrap();
        let path = writer.write(2, &sample_trajectory()).unwrap();

        let trajectory = read_trajectory_file(&path).unwrap();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.samples()[0], TrajectorySample::new(0.0, 1.0, 0.05, 2.87));
        assert_eq!(trajectory.samples()[1].y, -0.1);
    }

    #[test]
    fn test_read_rejects_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("UAV0.txt");
        fs::write(&path, "time x y azimuth\n0.00 1.00 2.00\n").unwrap();
        assert!(matches!(read_trajectory_file(&path), Err(OutputError::FormatError(_, 2))));

        fs::write(&path, "time x y azimuth\n0.00 a 2.00 3.00\n").unwrap();
        assert!(matches!(read_trajectory_file(&path), Err(OutputError::FormatError(_, 2))));
    }
}
